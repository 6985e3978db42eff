//! Conversation capability: the chat client, participants and the
//! round-robin dialogue that drives one batch's conversation.

pub mod dialogue;
pub mod openai_api_agent;
pub mod participant;
pub mod prompt;

pub use dialogue::{DialogueSession, RoundRobinDialogue, StopReason, TASK_SOURCE, Termination};
pub use openai_api_agent::OpenAIApiAgent;
pub use participant::{
    AssistantParticipant, AutoReply, CustomerProxy, HumanInput, LineInput, Participant,
    StdinInput, build_roster,
};
pub use prompt::build_task_prompt;
