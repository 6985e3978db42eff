use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use triage_core::TriageError;
use triage_core::report::DEFAULT_STEP_COLUMN;

mod commands;

#[derive(Parser)]
#[command(name = "triage")]
#[command(about = "Concurrent multi-agent triage of customer-service queries", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Triage every query in the input table and write the conversation log
    Run {
        /// Path to config.toml (default: ~/.config/triage/config.toml)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Input CSV, overriding [io].input_path
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Output CSV, overriding [io].output_path
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Summarise answer accuracy per user and per step
    Report {
        /// Answer log CSV with USER_ID and GPT_ANSWER_VALIDATOR_REPLY columns
        #[arg(short, long)]
        input: PathBuf,

        /// Column holding the step or guide name
        #[arg(short, long, default_value = DEFAULT_STEP_COLUMN)]
        step_column: String,

        /// Directory for the summary tables (default: report_<timestamp>)
        #[arg(long)]
        out_dir: Option<PathBuf>,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    triage_execution::init_logging();

    let result = match cli.command {
        Commands::Run {
            config,
            input,
            output,
        } => commands::run::execute(config, input, output).await,
        Commands::Report {
            input,
            step_column,
            out_dir,
        } => commands::report::execute(&input, &step_column, out_dir),
    };

    if let Err(err) = &result {
        if let Some(TriageError::Configuration(_)) = err.downcast_ref::<TriageError>() {
            commands::utils::print_configuration_help();
        }
    }

    result
}
