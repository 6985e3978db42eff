//! `config.toml` loading.

use std::fs;
use std::path::{Path, PathBuf};
use triage_core::TriageError;
use triage_core::config::TriageConfig;

use crate::paths::TriagePaths;

/// Read access to `config.toml`.
///
/// A missing or empty file yields the default configuration; a malformed one
/// is a configuration error.
pub struct ConfigStorage {
    path: PathBuf,
}

impl ConfigStorage {
    /// Uses the default location (`~/.config/triage/config.toml`).
    pub fn new() -> Result<Self, TriageError> {
        let path = TriagePaths::config_file().map_err(|e| TriageError::config(e.to_string()))?;
        Ok(Self { path })
    }

    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<TriageConfig, TriageError> {
        if !self.path.exists() {
            tracing::debug!(path = %self.path.display(), "No config file, using defaults");
            return Ok(TriageConfig::default());
        }

        let content = fs::read_to_string(&self.path).map_err(|e| {
            TriageError::config(format!("cannot read {}: {}", self.path.display(), e))
        })?;

        if content.trim().is_empty() {
            return Ok(TriageConfig::default());
        }

        TriageConfig::from_toml_str(&content).map_err(|e| {
            TriageError::config(format!("invalid {}: {}", self.path.display(), e))
        })
    }
}
