use triage_infrastructure::TriagePaths;
use triage_infrastructure::storage::{API_KEY_ENV, MODEL_ENV};

/// Prints where configuration is read from, after a configuration error.
pub fn print_configuration_help() {
    eprintln!("\n💡 Configuration help:");
    eprintln!("  - API key: export {API_KEY_ENV}=... (optionally {MODEL_ENV}=...)");
    match (TriagePaths::secret_file(), TriagePaths::config_file()) {
        (Ok(secret), Ok(config)) => {
            eprintln!(
                "    or put {{\"gemini\": {{\"api_key\": \"...\"}}}} in {}",
                secret.display()
            );
            eprintln!("  - Settings: {} ([dispatch], [io], [model], [proxy])", config.display());
        }
        _ => eprintln!("  - Settings: pass --config <PATH> to point at a config.toml"),
    }
    eprintln!("  - window_size and max_turns must be greater than zero");
    eprintln!("  - the termination phrase must not be empty");
}
