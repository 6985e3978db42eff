//! Secret configuration file storage.
//!
//! Loads API credentials from `~/.config/triage/secret.json`, falling back to
//! environment variables.

use crate::paths::TriagePaths;
use std::fs;
use std::path::PathBuf;
use triage_core::TriageError;
use triage_core::config::{GeminiConfig, SecretConfig};

pub const API_KEY_ENV: &str = "GEMINI_API_KEY";
pub const MODEL_ENV: &str = "GEMINI_MODEL_NAME";

/// Errors that can occur during secret storage operations.
#[derive(Debug)]
pub enum SecretStorageError {
    /// Configuration file not found.
    NotFound(PathBuf),
    /// File I/O error.
    IoError(std::io::Error),
    /// JSON parsing error.
    ParseError(serde_json::Error),
    /// Config directory not found.
    ConfigDirNotFound,
}

impl std::fmt::Display for SecretStorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SecretStorageError::NotFound(path) => {
                write!(f, "Secret file not found at: {}", path.display())
            }
            SecretStorageError::IoError(e) => write!(f, "I/O error: {}", e),
            SecretStorageError::ParseError(e) => write!(f, "JSON parse error: {}", e),
            SecretStorageError::ConfigDirNotFound => {
                write!(f, "Could not determine home directory")
            }
        }
    }
}

impl std::error::Error for SecretStorageError {}

impl From<std::io::Error> for SecretStorageError {
    fn from(e: std::io::Error) -> Self {
        SecretStorageError::IoError(e)
    }
}

impl From<serde_json::Error> for SecretStorageError {
    fn from(e: serde_json::Error) -> Self {
        SecretStorageError::ParseError(e)
    }
}

/// Read-only access to `secret.json`.
///
/// The file should have appropriate permissions (e.g., 600); it is plaintext.
pub struct SecretStorage {
    path: PathBuf,
}

impl SecretStorage {
    /// Creates a SecretStorage with the default path (~/.config/triage/secret.json).
    pub fn new() -> Result<Self, SecretStorageError> {
        let path = TriagePaths::secret_file().map_err(|_| SecretStorageError::ConfigDirNotFound)?;
        Ok(Self { path })
    }

    /// Creates a SecretStorage with a custom path (for testing).
    pub fn with_path(path: PathBuf) -> Self {
        Self { path }
    }

    /// Loads the secret configuration from the JSON file.
    pub fn load(&self) -> Result<SecretConfig, SecretStorageError> {
        if !self.path.exists() {
            return Err(SecretStorageError::NotFound(self.path.clone()));
        }

        let content = fs::read_to_string(&self.path)?;
        let config = serde_json::from_str(&content)?;

        Ok(config)
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

/// Resolves the Gemini credential.
///
/// Priority:
/// 1. `gemini.api_key` in secret.json (when non-empty)
/// 2. `GEMINI_API_KEY` / `GEMINI_MODEL_NAME` from `env`
///
/// # Errors
///
/// Returns [`TriageError::Configuration`] with guidance when neither source
/// provides a key.
pub fn resolve_gemini_credentials<F>(
    storage: Option<&SecretStorage>,
    env: F,
) -> Result<GeminiConfig, TriageError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(storage) = storage {
        match storage.load() {
            Ok(SecretConfig {
                gemini: Some(gemini),
            }) if !gemini.api_key.trim().is_empty() => {
                tracing::debug!(
                    path = %storage.path().display(),
                    "Using Gemini credential from secret file"
                );
                return Ok(gemini);
            }
            Ok(_) | Err(SecretStorageError::NotFound(_)) => {}
            Err(err) => {
                tracing::warn!(
                    path = %storage.path().display(),
                    error = %err,
                    "Ignoring unreadable secret file"
                );
            }
        }
    }

    let api_key = env(API_KEY_ENV)
        .filter(|key| !key.trim().is_empty())
        .ok_or_else(|| {
            let location = storage
                .map(|s| s.path().display().to_string())
                .unwrap_or_else(|| "secret.json".to_string());
            TriageError::config(format!(
                "{API_KEY_ENV} is not set. Export it or add \
                 {{\"gemini\": {{\"api_key\": \"...\"}}}} to {location}."
            ))
        })?;

    Ok(GeminiConfig {
        api_key,
        model_name: env(MODEL_ENV).filter(|m| !m.trim().is_empty()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_load_nonexistent_file() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("secret.json");
        let storage = SecretStorage::with_path(file_path.clone());

        match storage.load() {
            Err(SecretStorageError::NotFound(path)) => assert_eq!(path, file_path),
            _ => panic!("Expected NotFound error"),
        }
    }

    #[test]
    fn test_load_invalid_json() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("secret.json");
        fs::write(&file_path, r#"{ invalid json"#).unwrap();

        let storage = SecretStorage::with_path(file_path);
        assert!(matches!(storage.load(), Err(SecretStorageError::ParseError(_))));
    }

    #[test]
    fn secret_file_wins_over_environment() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("secret.json");
        fs::write(
            &file_path,
            r#"{"gemini": {"api_key": "from-file", "model_name": "gemini-pro"}}"#,
        )
        .unwrap();
        let storage = SecretStorage::with_path(file_path);

        let gemini =
            resolve_gemini_credentials(Some(&storage), env_from(&[(API_KEY_ENV, "from-env")]))
                .unwrap();
        assert_eq!(gemini.api_key, "from-file");
        assert_eq!(gemini.model_name.as_deref(), Some("gemini-pro"));
    }

    #[test]
    fn falls_back_to_environment() {
        let temp_dir = TempDir::new().unwrap();
        let storage = SecretStorage::with_path(temp_dir.path().join("secret.json"));

        let gemini = resolve_gemini_credentials(
            Some(&storage),
            env_from(&[(API_KEY_ENV, "from-env"), (MODEL_ENV, "gemini-2.0-flash-lite")]),
        )
        .unwrap();
        assert_eq!(gemini.api_key, "from-env");
        assert_eq!(gemini.model_name.as_deref(), Some("gemini-2.0-flash-lite"));
    }

    #[test]
    fn missing_credential_is_configuration_error() {
        let err = resolve_gemini_credentials(None, env_from(&[(API_KEY_ENV, "  ")])).unwrap_err();
        assert!(err.is_config());
        assert!(err.to_string().contains(API_KEY_ENV));
    }
}
