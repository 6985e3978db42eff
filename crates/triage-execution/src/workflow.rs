//! The end-to-end run: read, partition, dispatch, persist.

use std::path::PathBuf;
use std::sync::Arc;
use triage_core::agent::Agent;
use triage_core::config::{GeminiConfig, ModelConfig, ProxyMode, TriageConfig};
use triage_core::{TriageError, partition};
use triage_infrastructure::{CsvRecordReader, SecretStorage, persist, resolve_gemini_credentials};
use triage_interaction::{AutoReply, HumanInput, OpenAIApiAgent, StdinInput, Termination};

use crate::dispatcher::BatchDispatcher;

/// What a successful run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub records: usize,
    pub batches: usize,
    pub messages: usize,
    pub output_path: PathBuf,
}

/// Runs the whole job with the Gemini client built from resolved credentials.
///
/// Credentials come from `secrets` first, then `GEMINI_API_KEY` /
/// `GEMINI_MODEL_NAME`.
pub async fn run(
    config: &TriageConfig,
    secrets: Option<&SecretStorage>,
) -> Result<RunSummary, TriageError> {
    config.validate()?;
    let credentials = resolve_gemini_credentials(secrets, |key| std::env::var(key).ok())?;
    let agent = Arc::new(build_agent(&config.model, credentials));
    run_with(config, agent, build_human_input(config)).await
}

/// Runs the whole job with an injected agent and customer input.
///
/// Nothing is written unless every batch succeeds.
pub async fn run_with(
    config: &TriageConfig,
    agent: Arc<dyn Agent>,
    human_input: Arc<dyn HumanInput>,
) -> Result<RunSummary, TriageError> {
    config.validate()?;
    let termination = Termination::new(
        config.dispatch.termination_phrase.clone(),
        config.dispatch.max_turns,
    )?;
    let dispatcher = BatchDispatcher::new(agent, config.roster(), termination, human_input)?;

    let records = CsvRecordReader::new(&config.io.input_path).read_all()?;
    let total_count = records.len();
    let batches = partition(records, config.dispatch.window_size)?;
    let batch_count = batches.len();

    tracing::info!(
        input = %config.io.input_path.display(),
        records = total_count,
        batches = batch_count,
        window_size = config.dispatch.window_size,
        "Loaded customer queries"
    );

    let messages = dispatcher.dispatch_all(batches, total_count).await?;
    persist(&messages, &config.io.output_path)?;

    Ok(RunSummary {
        records: total_count,
        batches: batch_count,
        messages: messages.len(),
        output_path: config.io.output_path.clone(),
    })
}

/// Builds the shared chat client. A model named in the secret wins over `[model]`.
pub fn build_agent(model: &ModelConfig, credentials: GeminiConfig) -> OpenAIApiAgent {
    let model_name = credentials.model_name.unwrap_or_else(|| model.model.clone());
    let mut agent =
        OpenAIApiAgent::new(credentials.api_key, model_name).with_base_url(model.base_url.clone());
    if let Some(max_tokens) = model.max_tokens {
        agent = agent.with_max_tokens(max_tokens);
    }
    tracing::debug!(
        agent = agent.expertise(),
        model = agent.model(),
        base_url = %model.base_url,
        "Chat client ready"
    );
    agent
}

pub fn build_human_input(config: &TriageConfig) -> Arc<dyn HumanInput> {
    match config.proxy.mode {
        ProxyMode::Auto => Arc::new(AutoReply::new(config.auto_reply())),
        ProxyMode::Stdin => Arc::new(StdinInput::stdin()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use triage_core::config::DEFAULT_MODEL;

    fn credentials(model_name: Option<&str>) -> GeminiConfig {
        GeminiConfig {
            api_key: "test-key".to_string(),
            model_name: model_name.map(str::to_string),
        }
    }

    #[test]
    fn secret_model_name_overrides_model_section() {
        let model = ModelConfig {
            model: "gemini-1.5-pro".to_string(),
            ..ModelConfig::default()
        };

        let agent = build_agent(&model, credentials(Some("gemini-2.0-flash-lite")));
        assert_eq!(agent.model(), "gemini-2.0-flash-lite");
        assert!(!agent.expertise().is_empty());
    }

    #[test]
    fn model_section_used_without_secret_model() {
        let agent = build_agent(&ModelConfig::default(), credentials(None));
        assert_eq!(agent.model(), DEFAULT_MODEL);
    }

    #[tokio::test]
    async fn auto_proxy_falls_back_to_termination_phrase() {
        let mut config = TriageConfig::default();
        config.dispatch.termination_phrase = "bye".to_string();

        let reply = build_human_input(&config)
            .reply("customer_proxy", None)
            .await
            .unwrap();
        assert_eq!(reply, "bye");
    }

    #[tokio::test]
    async fn auto_proxy_uses_configured_reply() {
        let mut config = TriageConfig::default();
        config.proxy.auto_reply = Some("thanks, that helps".to_string());

        let reply = build_human_input(&config)
            .reply("customer_proxy", None)
            .await
            .unwrap();
        assert_eq!(reply, "thanks, that helps");
    }
}
