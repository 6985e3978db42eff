//! Filesystem access: configuration and secret files, the input table and
//! the persisted message log.

pub mod csv_table;
pub mod paths;
pub mod storage;

pub use csv_table::{CsvRecordReader, persist, read_message_log, write_answer_report};
pub use paths::TriagePaths;
pub use storage::{ConfigStorage, SecretStorage, resolve_gemini_credentials};
