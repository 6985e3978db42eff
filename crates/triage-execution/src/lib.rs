//! Batch execution: the concurrent dispatcher, the end-to-end run workflow
//! and logging setup.

pub mod dispatcher;
pub mod logging;
pub mod workflow;

pub use dispatcher::BatchDispatcher;
pub use logging::init_logging;
pub use workflow::{RunSummary, run, run_with};
