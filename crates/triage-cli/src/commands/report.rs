use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use triage_core::report::summarize_answers;
use triage_infrastructure::{CsvRecordReader, write_answer_report};

pub fn execute(input: &Path, step_column: &str, out_dir: Option<PathBuf>) -> Result<()> {
    let out_dir = out_dir.unwrap_or_else(default_out_dir);

    println!("📊 Summarising {} by {}...", input.display(), step_column);

    let rows = CsvRecordReader::new(input).read_all()?;
    let report = summarize_answers(&rows, step_column)?;
    let written = write_answer_report(&report, &out_dir)
        .with_context(|| format!("Failed to write report to {}", out_dir.display()))?;

    println!("\n👤 Users: {}", report.users.len());
    for user in &report.users {
        match user.accuracy_pct {
            Some(pct) => println!(
                "  - {}: {}/{} correct ({:.2}%)",
                user.user_id, user.correct, user.total, pct
            ),
            None => println!("  - {}: no answered rows", user.user_id),
        }
    }

    println!("\n🧭 Steps: {}", report.steps.len());
    if let Some(step) = &report.most_wrong_step {
        println!("  Lowest accuracy: {}", step);
    }
    if !report.top_wrong_steps.is_empty() {
        println!("  Most wrong answers: {}", report.top_wrong_steps.join(", "));
    }

    println!("\n✅ Report written:");
    for path in written {
        println!("  ✓ {}", path.display());
    }
    Ok(())
}

fn default_out_dir() -> PathBuf {
    PathBuf::from(format!(
        "report_{}",
        chrono::Local::now().format("%Y%m%d_%H%M%S")
    ))
}
