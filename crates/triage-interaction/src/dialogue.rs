//! Round-robin dialogue with substring termination.
//!
//! Participants speak in fixed cyclic order, each seeing the whole
//! transcript. A session ends when a participant's message contains the
//! termination phrase or after `max_turns` participant turns.
//!
//! Matching is a plain case-sensitive substring test on participant turns.
//! Any participant that merely quotes the phrase (for example while echoing a
//! customer's text) ends the conversation. The task message is not checked.

use triage_core::agent::AgentError;
use triage_core::{TriageError, TurnMessage};

use crate::participant::Participant;

/// Source name of the task message that opens every session.
pub const TASK_SOURCE: &str = "user";

/// When to stop a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Termination {
    phrase: String,
    max_turns: usize,
}

impl Termination {
    pub fn new(phrase: impl Into<String>, max_turns: usize) -> Result<Self, TriageError> {
        let phrase = phrase.into();
        if phrase.is_empty() {
            return Err(TriageError::config("termination phrase must not be empty"));
        }
        if max_turns == 0 {
            return Err(TriageError::config("max turns must be greater than zero"));
        }
        Ok(Self { phrase, max_turns })
    }

    pub fn phrase(&self) -> &str {
        &self.phrase
    }

    pub fn max_turns(&self) -> usize {
        self.max_turns
    }

    pub fn is_triggered_by(&self, content: &str) -> bool {
        content.contains(&self.phrase)
    }
}

/// Why a session stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    /// A participant's message contained the termination phrase.
    TerminationPhrase { source: String },
    /// The turn limit was reached.
    MaxTurns,
}

pub struct RoundRobinDialogue {
    participants: Vec<Box<dyn Participant>>,
    termination: Termination,
}

impl RoundRobinDialogue {
    pub fn new(
        participants: Vec<Box<dyn Participant>>,
        termination: Termination,
    ) -> Result<Self, TriageError> {
        if participants.is_empty() {
            return Err(TriageError::config("dialogue needs at least one participant"));
        }
        Ok(Self {
            participants,
            termination,
        })
    }

    /// Starts a session for `task`; drive it with [`DialogueSession::next_turn`].
    pub fn partial_session(&self, task: impl Into<String>) -> DialogueSession<'_> {
        DialogueSession {
            dialogue: self,
            task: Some(task.into()),
            transcript: Vec::new(),
            turns_taken: 0,
            stop_reason: None,
            failed: false,
        }
    }
}

/// An in-progress conversation. Yields the task message first, then one
/// message per participant turn.
pub struct DialogueSession<'a> {
    dialogue: &'a RoundRobinDialogue,
    task: Option<String>,
    transcript: Vec<TurnMessage>,
    turns_taken: usize,
    stop_reason: Option<StopReason>,
    failed: bool,
}

impl DialogueSession<'_> {
    /// Produces the next message, or `None` once the session has ended.
    ///
    /// After an error the session is finished; later calls return `None`.
    pub async fn next_turn(&mut self) -> Option<Result<TurnMessage, AgentError>> {
        if self.failed || self.stop_reason.is_some() {
            return None;
        }

        if let Some(task) = self.task.take() {
            let message = TurnMessage::text(TASK_SOURCE, task);
            self.transcript.push(message.clone());
            return Some(Ok(message));
        }

        let termination = &self.dialogue.termination;
        if self.turns_taken >= termination.max_turns() {
            self.stop_reason = Some(StopReason::MaxTurns);
            return None;
        }

        let participants = &self.dialogue.participants;
        let speaker = &participants[self.turns_taken % participants.len()];

        let message = match speaker.respond(&self.transcript).await {
            Ok(message) => message,
            Err(err) => {
                self.failed = true;
                return Some(Err(err));
            }
        };

        self.turns_taken += 1;
        if termination.is_triggered_by(&message.content) {
            self.stop_reason = Some(StopReason::TerminationPhrase {
                source: message.source.clone(),
            });
        }
        self.transcript.push(message.clone());

        Some(Ok(message))
    }

    pub fn stop_reason(&self) -> Option<&StopReason> {
        self.stop_reason.as_ref()
    }

    /// Participant turns taken so far (the task message is not counted).
    pub fn turns_taken(&self) -> usize {
        self.turns_taken
    }
}
