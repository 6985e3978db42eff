//! Participant roster definitions.
//!
//! The roster is static configuration: names, order and roles are fixed
//! before any batch runs. Each batch builds its own participant instances
//! from this definition, so no conversation state crosses batches.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::error::{Result, TriageError};

/// How a participant produces its turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ParticipantKind {
    /// Backed by the shared model client.
    #[default]
    Assistant,
    /// Stands in for the human customer.
    Proxy,
}

/// A named conversational role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantDefinition {
    pub name: String,
    #[serde(default)]
    pub kind: ParticipantKind,
    /// Instruction describing the role. Ignored for proxies.
    #[serde(default)]
    pub system_message: String,
}

impl ParticipantDefinition {
    pub fn assistant(name: impl Into<String>, system_message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ParticipantKind::Assistant,
            system_message: system_message.into(),
        }
    }

    pub fn proxy(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ParticipantKind::Proxy,
            system_message: String::new(),
        }
    }
}

/// Returns the default customer-service roster, in turn order.
///
/// - `front_desk` classifies each query (order, technical, general)
/// - `tech_support` answers technical questions
/// - `order_agent` answers order questions
/// - `sentiment_analyzer` flags negative sentiment for a human agent
/// - `customer_proxy` speaks for the customer
pub fn default_roster() -> Vec<ParticipantDefinition> {
    vec![
        ParticipantDefinition::assistant(
            "front_desk",
            "You are the front desk of a customer-service team. Classify each customer \
             query as an order issue, a technical issue or a general enquiry, and route it \
             to the right colleague.",
        ),
        ParticipantDefinition::assistant(
            "tech_support",
            "You are the technical support agent. Answer the technical issues the front \
             desk routed to you with concrete troubleshooting steps.",
        ),
        ParticipantDefinition::assistant(
            "order_agent",
            "You are the order handling agent. Answer order, shipping, refund and return \
             questions the front desk routed to you.",
        ),
        ParticipantDefinition::assistant(
            "sentiment_analyzer",
            "You are the sentiment analyst. Check the customer's sentiment in each query; \
             when it is negative, recommend a hand-off to a human agent.",
        ),
        ParticipantDefinition::proxy("customer_proxy"),
    ]
}

/// Checks that a roster is usable: non-empty, with unique, non-blank names.
pub fn validate_roster(roster: &[ParticipantDefinition]) -> Result<()> {
    if roster.is_empty() {
        return Err(TriageError::config("roster must contain at least one participant"));
    }

    let mut seen = HashSet::new();
    for participant in roster {
        let name = participant.name.trim();
        if name.is_empty() {
            return Err(TriageError::config("participant name must not be empty"));
        }
        if !seen.insert(name) {
            return Err(TriageError::config(format!(
                "duplicate participant name '{}'",
                name
            )));
        }
    }

    Ok(())
}
