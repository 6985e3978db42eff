//! The conversation capability consumed by participants.
//!
//! An [`Agent`] is a stateless chat-completion endpoint: it receives a
//! [`Payload`] and answers with an [`AgentReply`]. One agent instance is
//! shared read-only by every batch, so implementations must not keep
//! per-conversation state.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

use crate::message::TokenUsage;

/// Errors raised by an agent call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AgentError {
    /// The request could not be built or the response had no usable content.
    #[error("Agent execution failed: {0}")]
    ExecutionFailed(String),

    /// The remote endpoint returned an error or could not be reached.
    #[error("Process error (status: {status_code:?}, retryable: {is_retryable}): {message}")]
    ProcessError {
        status_code: Option<u16>,
        message: String,
        is_retryable: bool,
        retry_after: Option<Duration>,
    },

    #[error("Agent error: {0}")]
    Other(String),
}

impl AgentError {
    pub fn process_error_with_retry_after(
        status_code: u16,
        message: impl Into<String>,
        is_retryable: bool,
        retry_after: Duration,
    ) -> Self {
        Self::ProcessError {
            status_code: Some(status_code),
            message: message.into(),
            is_retryable,
            retry_after: Some(retry_after),
        }
    }

    /// Whether the remote side flagged this failure as transient.
    ///
    /// The dispatcher does not retry; this is surfaced in logs only.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::ProcessError {
                is_retryable: true,
                ..
            }
        )
    }
}

/// Input to a single agent call.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Payload {
    system: Option<String>,
    text: String,
}

impl Payload {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            system: None,
            text: text.into(),
        }
    }

    /// Attaches a system instruction sent ahead of the user text.
    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    pub fn system(&self) -> Option<&str> {
        self.system.as_deref()
    }

    pub fn to_text(&self) -> String {
        self.text.clone()
    }

    pub fn as_text(&self) -> &str {
        &self.text
    }
}

/// Output of a single agent call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentReply {
    pub content: String,
    pub usage: Option<TokenUsage>,
}

impl AgentReply {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            usage: None,
        }
    }

    pub fn with_usage(mut self, usage: TokenUsage) -> Self {
        self.usage = Some(usage);
        self
    }
}

/// A chat-completion capability.
#[async_trait]
pub trait Agent: Send + Sync {
    /// Short description used in logs.
    fn expertise(&self) -> &str;

    async fn execute(&self, payload: Payload) -> Result<AgentReply, AgentError>;
}
