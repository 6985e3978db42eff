//! Conversation participants and the per-batch roster factory.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::sync::Mutex;
use triage_core::TurnMessage;
use triage_core::agent::{Agent, AgentError, Payload};
use triage_core::roster::{ParticipantDefinition, ParticipantKind};

use crate::prompt::{render_participant_prompt, render_turn_prompt};

/// One seat at the round-robin table.
#[async_trait]
pub trait Participant: Send + Sync {
    fn name(&self) -> &str;

    /// Produces this participant's next message given the transcript so far.
    async fn respond(&self, transcript: &[TurnMessage]) -> Result<TurnMessage, AgentError>;
}

/// A participant backed by the shared chat agent.
pub struct AssistantParticipant {
    name: String,
    system_prompt: String,
    agent: Arc<dyn Agent>,
}

impl AssistantParticipant {
    pub fn new(
        definition: &ParticipantDefinition,
        teammates: &[String],
        agent: Arc<dyn Agent>,
    ) -> Result<Self, AgentError> {
        let system_prompt =
            render_participant_prompt(&definition.name, &definition.system_message, teammates)
                .map_err(|e| AgentError::ExecutionFailed(e.to_string()))?;
        Ok(Self {
            name: definition.name.clone(),
            system_prompt,
            agent,
        })
    }

}

#[async_trait]
impl Participant for AssistantParticipant {
    fn name(&self) -> &str {
        &self.name
    }

    async fn respond(&self, transcript: &[TurnMessage]) -> Result<TurnMessage, AgentError> {
        let turn_prompt = render_turn_prompt(&self.name, transcript)
            .map_err(|e| AgentError::ExecutionFailed(e.to_string()))?;
        let payload = Payload::text(turn_prompt).with_system(self.system_prompt.clone());

        let reply = self.agent.execute(payload).await?;
        Ok(TurnMessage::text(&self.name, reply.content).with_usage(reply.usage))
    }
}

/// Source of the customer's replies.
#[async_trait]
pub trait HumanInput: Send + Sync {
    /// Returns the customer's reply to the latest message.
    async fn reply(
        &self,
        participant: &str,
        last_message: Option<&TurnMessage>,
    ) -> Result<String, AgentError>;
}

/// Answers every turn with the same text.
#[derive(Debug, Clone)]
pub struct AutoReply {
    text: String,
}

impl AutoReply {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

#[async_trait]
impl HumanInput for AutoReply {
    async fn reply(
        &self,
        _participant: &str,
        _last_message: Option<&TurnMessage>,
    ) -> Result<String, AgentError> {
        Ok(self.text.clone())
    }
}

/// Reads one line per turn from a line-oriented source.
///
/// Concurrent batches share a single reader; the lock keeps their prompts and
/// answers from interleaving. End of input is an error for the asking batch.
pub struct LineInput<R> {
    lines: Mutex<Lines<R>>,
}

/// Customer replies typed on standard input.
pub type StdinInput = LineInput<BufReader<Stdin>>;

impl<R: AsyncBufRead + Unpin> LineInput<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: Mutex::new(reader.lines()),
        }
    }
}

impl LineInput<BufReader<Stdin>> {
    pub fn stdin() -> Self {
        Self::new(BufReader::new(tokio::io::stdin()))
    }
}

#[async_trait]
impl<R> HumanInput for LineInput<R>
where
    R: AsyncBufRead + Unpin + Send,
{
    async fn reply(
        &self,
        participant: &str,
        last_message: Option<&TurnMessage>,
    ) -> Result<String, AgentError> {
        let mut lines = self.lines.lock().await;

        if let Some(message) = last_message {
            eprintln!("[{}] => {}\n", message.source, message.content);
        }
        eprint!("{participant}> ");

        match lines.next_line().await {
            Ok(Some(line)) => Ok(line.trim_end().to_string()),
            Ok(None) => Err(AgentError::ExecutionFailed(
                "input closed while waiting for the customer".into(),
            )),
            Err(err) => Err(AgentError::ExecutionFailed(format!(
                "failed to read customer reply: {err}"
            ))),
        }
    }
}

/// A participant that relays the customer's replies. Never reports token usage.
pub struct CustomerProxy {
    name: String,
    input: Arc<dyn HumanInput>,
}

impl CustomerProxy {
    pub fn new(name: impl Into<String>, input: Arc<dyn HumanInput>) -> Self {
        Self {
            name: name.into(),
            input,
        }
    }
}

#[async_trait]
impl Participant for CustomerProxy {
    fn name(&self) -> &str {
        &self.name
    }

    async fn respond(&self, transcript: &[TurnMessage]) -> Result<TurnMessage, AgentError> {
        let content = self.input.reply(&self.name, transcript.last()).await?;
        Ok(TurnMessage::text(&self.name, content))
    }
}

/// Builds a fresh set of participants for one batch, in roster order.
///
/// The agent and the human input are shared handles; everything else is
/// owned by the returned participants.
pub fn build_roster(
    definitions: &[ParticipantDefinition],
    agent: &Arc<dyn Agent>,
    human_input: &Arc<dyn HumanInput>,
) -> Result<Vec<Box<dyn Participant>>, AgentError> {
    let names: Vec<String> = definitions.iter().map(|d| d.name.clone()).collect();

    definitions
        .iter()
        .map(|definition| -> Result<Box<dyn Participant>, AgentError> {
            match definition.kind {
                ParticipantKind::Assistant => Ok(Box::new(AssistantParticipant::new(
                    definition,
                    &names,
                    Arc::clone(agent),
                )?)),
                ParticipantKind::Proxy => Ok(Box::new(CustomerProxy::new(
                    definition.name.clone(),
                    Arc::clone(human_input),
                ))),
            }
        })
        .collect()
}
