//! Prompt templates for batch tasks and participant turns.

use minijinja::{Environment, context};
use triage_core::{Batch, Record, TriageError, TurnMessage};

const TASK_TEMPLATE: &str = "\
Processing customer queries {{ start }} to {{ end }} ({{ total }} in total).
Customer queries in this batch:
{{ records }}

Each agent should respond to the customers as follows:
  1. The front desk agent classifies each query (order, technical support, general enquiry).
  2. Technical issues are answered by the technical support agent.
  3. Order issues are answered by the order handling agent.
  4. The sentiment analysis agent checks the customer's mood and hands negative cases
     to a human agent.
Work as a team to give every customer a complete answer.";

const PARTICIPANT_TEMPLATE: &str = "\
# Participant Profile
**Name**: {{ name }}
**Team**: {{ teammates | join(\", \") }}

## Role
{{ system_message }}

Reply only as {{ name }}. Keep your answer focused on your role.";

const TURN_TEMPLATE: &str = "\
# Conversation History
{% for message in transcript %}[{{ message.source }}]: {{ message.content }}
{% endfor %}
# Your Turn
Continue the conversation as {{ name }}.";

fn template_error(err: minijinja::Error) -> TriageError {
    TriageError::Serialization {
        format: "template".to_string(),
        message: err.to_string(),
    }
}

/// Builds the task text for one batch: its range, the grand total and its records as JSON.
pub fn build_task_prompt(batch: &Batch<Record>, total_count: usize) -> Result<String, TriageError> {
    let records = serde_json::to_string(batch.records())?;
    Environment::new()
        .render_str(
            TASK_TEMPLATE,
            context! {
                start => batch.start_index(),
                end => batch.end_index(),
                total => total_count,
                records => records,
            },
        )
        .map_err(template_error)
}

/// Renders the system instruction for an assistant participant.
pub fn render_participant_prompt(
    name: &str,
    system_message: &str,
    teammates: &[String],
) -> Result<String, TriageError> {
    Environment::new()
        .render_str(
            PARTICIPANT_TEMPLATE,
            context! { name => name, system_message => system_message, teammates => teammates },
        )
        .map_err(template_error)
}

/// Renders the transcript so far plus the turn instruction for `name`.
pub fn render_turn_prompt(name: &str, transcript: &[TurnMessage]) -> Result<String, TriageError> {
    Environment::new()
        .render_str(TURN_TEMPLATE, context! { name => name, transcript => transcript })
        .map_err(template_error)
}
