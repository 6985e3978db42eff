//! Storage layer for configuration and credentials.

mod config_storage;
mod secret_storage;

pub use config_storage::ConfigStorage;
pub use secret_storage::{
    API_KEY_ENV, MODEL_ENV, SecretStorage, SecretStorageError, resolve_gemini_credentials,
};
