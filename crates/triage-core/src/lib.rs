//! Domain types for customer-service triage.
//!
//! - `record` / `batch`: input rows and fixed-window partitioning
//! - `roster`: participant definitions and the default roster
//! - `message`: dialogue messages and output-log rows
//! - `agent`: the chat capability participants call into
//! - `config`: `config.toml` / `secret.json` models
//! - `report`: answer-accuracy summaries

pub mod agent;
pub mod batch;
pub mod config;
pub mod error;
pub mod message;
pub mod record;
pub mod report;
pub mod roster;

// Re-export common types
pub use batch::{Batch, partition};
pub use error::{Result, TriageError};
pub use message::{MessageKind, MessageRecord, TokenUsage, TurnMessage};
pub use record::Record;
