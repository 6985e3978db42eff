//! Conversation message types.
//!
//! A [`TurnMessage`] is what a dialogue emits; a [`MessageRecord`] is the same
//! message tagged with the range of the batch that produced it, which is the
//! row shape of the output log.

use serde::{Deserialize, Serialize};

/// Kind of an emitted message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum MessageKind {
    /// Plain text produced by a participant or the task itself.
    #[default]
    TextMessage,
}

impl std::fmt::Display for MessageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MessageKind::TextMessage => write!(f, "TextMessage"),
        }
    }
}

/// Token accounting reported by the model for one turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

/// A single message in a batch's conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnMessage {
    /// Participant name, or `user` for the task message.
    pub source: String,
    pub content: String,
    pub kind: MessageKind,
    /// `None` when usage accounting is unavailable for this turn.
    pub usage: Option<TokenUsage>,
}

impl TurnMessage {
    pub fn text(source: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            content: content.into(),
            kind: MessageKind::TextMessage,
            usage: None,
        }
    }

    pub fn with_usage(mut self, usage: Option<TokenUsage>) -> Self {
        self.usage = usage;
        self
    }
}

/// One row of the output log.
///
/// Field order is the column order of the persisted table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageRecord {
    pub batch_start: usize,
    pub batch_end: usize,
    pub source: String,
    pub content: String,
    #[serde(rename = "type")]
    pub kind: MessageKind,
    pub prompt_tokens: Option<u32>,
    pub completion_tokens: Option<u32>,
}

impl MessageRecord {
    /// Column names in persisted order.
    pub const COLUMNS: [&'static str; 7] = [
        "batch_start",
        "batch_end",
        "source",
        "content",
        "type",
        "prompt_tokens",
        "completion_tokens",
    ];

    /// Tags a dialogue message with its batch range.
    pub fn from_turn((batch_start, batch_end): (usize, usize), turn: TurnMessage) -> Self {
        Self {
            batch_start,
            batch_end,
            source: turn.source,
            content: turn.content,
            kind: turn.kind,
            prompt_tokens: turn.usage.map(|u| u.prompt_tokens),
            completion_tokens: turn.usage.map(|u| u.completion_tokens),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_turn_splits_usage() {
        let turn = TurnMessage::text("front_desk", "訂單問題").with_usage(Some(TokenUsage {
            prompt_tokens: 120,
            completion_tokens: 30,
        }));
        let record = MessageRecord::from_turn((0, 999), turn);

        assert_eq!(record.batch_start, 0);
        assert_eq!(record.batch_end, 999);
        assert_eq!(record.source, "front_desk");
        assert_eq!(record.prompt_tokens, Some(120));
        assert_eq!(record.completion_tokens, Some(30));
    }

    #[test]
    fn missing_usage_stays_null() {
        let record = MessageRecord::from_turn((5, 9), TurnMessage::text("customer_proxy", "exit"));
        assert_eq!(record.prompt_tokens, None);
        assert_eq!(record.completion_tokens, None);
        assert_eq!(record.kind.to_string(), "TextMessage");
    }
}
