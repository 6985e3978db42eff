//! Configuration model.
//!
//! `TriageConfig` mirrors `config.toml`; every section and field is optional
//! and falls back to the defaults below. Credentials live separately in
//! [`SecretConfig`] (`secret.json`).

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::batch::DEFAULT_WINDOW_SIZE;
use crate::error::{Result, TriageError};
use crate::roster::{ParticipantDefinition, default_roster, validate_roster};

pub const DEFAULT_TERMINATION_PHRASE: &str = "exit";
pub const DEFAULT_MAX_TURNS: usize = 15;
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/openai";
pub const DEFAULT_INPUT_PATH: &str = "customer_queries.csv";
pub const DEFAULT_OUTPUT_PATH: &str = "customer_service_log.csv";

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq, Default)]
#[serde(default)]
pub struct TriageConfig {
    pub dispatch: DispatchConfig,
    pub io: IoConfig,
    pub model: ModelConfig,
    pub proxy: ProxyConfig,
    /// Replaces the default roster when non-empty.
    #[serde(rename = "participant", skip_serializing_if = "Vec::is_empty")]
    pub participants: Vec<ParticipantDefinition>,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct DispatchConfig {
    /// Records per batch.
    pub window_size: usize,
    /// Substring that ends a batch's conversation.
    pub termination_phrase: String,
    /// Upper bound on participant turns per batch.
    pub max_turns: usize,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            window_size: DEFAULT_WINDOW_SIZE,
            termination_phrase: DEFAULT_TERMINATION_PHRASE.to_string(),
            max_turns: DEFAULT_MAX_TURNS,
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct IoConfig {
    pub input_path: PathBuf,
    pub output_path: PathBuf,
}

impl Default for IoConfig {
    fn default() -> Self {
        Self {
            input_path: PathBuf::from(DEFAULT_INPUT_PATH),
            output_path: PathBuf::from(DEFAULT_OUTPUT_PATH),
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct ModelConfig {
    /// Model identifier. Overridden by the secret's `model_name` when set there.
    pub model: String,
    /// Base URL of an OpenAI-compatible API (without `/chat/completions`).
    pub base_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            max_tokens: None,
        }
    }
}

/// Where the customer proxy's replies come from.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ProxyMode {
    /// Reply with `auto_reply` (or the termination phrase) without asking anyone.
    #[default]
    Auto,
    /// Read one line from standard input per turn.
    Stdin,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq, Default)]
#[serde(default)]
pub struct ProxyConfig {
    pub mode: ProxyMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_reply: Option<String>,
}

impl TriageConfig {
    /// Parses a `config.toml` document.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// The roster in turn order: the configured participants, or the default roster.
    pub fn roster(&self) -> Vec<ParticipantDefinition> {
        if self.participants.is_empty() {
            default_roster()
        } else {
            self.participants.clone()
        }
    }

    /// The customer proxy's automatic reply.
    pub fn auto_reply(&self) -> String {
        self.proxy
            .auto_reply
            .clone()
            .unwrap_or_else(|| self.dispatch.termination_phrase.clone())
    }

    /// Rejects settings that would make a run meaningless, before any work starts.
    pub fn validate(&self) -> Result<()> {
        if self.dispatch.window_size == 0 {
            return Err(TriageError::config("dispatch.window_size must be greater than zero"));
        }
        if self.dispatch.termination_phrase.is_empty() {
            return Err(TriageError::config(
                "dispatch.termination_phrase must not be empty",
            ));
        }
        if self.dispatch.max_turns == 0 {
            return Err(TriageError::config("dispatch.max_turns must be greater than zero"));
        }
        if self.model.model.trim().is_empty() {
            return Err(TriageError::config("model.model must not be empty"));
        }
        validate_roster(&self.roster())
    }
}

/// Credentials loaded from `secret.json`.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct SecretConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gemini: Option<GeminiConfig>,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct GeminiConfig {
    pub api_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_name: Option<String>,
}
