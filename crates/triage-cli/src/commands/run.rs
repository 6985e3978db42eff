use anyhow::{Context, Result};
use std::path::PathBuf;
use triage_core::TriageError;
use triage_core::config::TriageConfig;
use triage_infrastructure::{ConfigStorage, SecretStorage};

pub async fn execute(
    config_path: Option<PathBuf>,
    input: Option<PathBuf>,
    output: Option<PathBuf>,
) -> Result<()> {
    let mut config = load_config(config_path)?;
    if let Some(input) = input {
        config.io.input_path = input;
    }
    if let Some(output) = output {
        config.io.output_path = output;
    }

    println!(
        "🚀 Triage {} → {} (window {}, max {} turns)",
        config.io.input_path.display(),
        config.io.output_path.display(),
        config.dispatch.window_size,
        config.dispatch.max_turns
    );

    let secrets = match SecretStorage::new() {
        Ok(storage) => Some(storage),
        Err(err) => {
            tracing::debug!(error = %err, "No secret file location, using environment only");
            None
        }
    };

    let summary = triage_execution::run(&config, secrets.as_ref())
        .await
        .context("Triage run failed")?;

    println!("✅ Triaged {} records in {} batches", summary.records, summary.batches);
    println!("  ✓ Wrote {} messages to {}", summary.messages, summary.output_path.display());
    Ok(())
}

fn load_config(config_path: Option<PathBuf>) -> Result<TriageConfig> {
    let storage = match config_path {
        Some(path) => {
            if !path.exists() {
                let message = format!("config file not found: {}", path.display());
                return Err(TriageError::config(message).into());
            }
            ConfigStorage::with_path(path)
        }
        None => ConfigStorage::new()?,
    };
    tracing::debug!(path = %storage.path().display(), "Loading configuration");
    Ok(storage.load()?)
}
