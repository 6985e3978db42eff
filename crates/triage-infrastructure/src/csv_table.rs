//! CSV tables: the customer-query input, the message log output and the
//! answer-accuracy summaries.
//!
//! Output tables are UTF-8 with a leading byte-order mark so spreadsheet
//! tools pick the right encoding for non-ASCII text. The `csv` reader skips
//! the mark, so inputs are accepted with or without it.

use serde::Serialize;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use triage_core::report::{AnswerReport, StepSummary, UserSummary};
use triage_core::{MessageRecord, Record, TriageError};

use crate::paths::temp_sibling;

const UTF8_BOM: &str = "\u{feff}";

/// Reads the customer-query table.
pub struct CsvRecordReader {
    path: PathBuf,
}

impl CsvRecordReader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Reads every data row in file order. The first row is the header.
    ///
    /// Short rows are padded with empty values. A row with more fields than
    /// the header is rejected rather than truncated.
    ///
    /// # Errors
    ///
    /// An unreadable or malformed input is a [`TriageError::Configuration`]:
    /// it is detected before any batch runs.
    pub fn read_all(&self) -> Result<Vec<Record>, TriageError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_path(&self.path)
            .map_err(|e| self.input_error(e))?;
        let headers: Vec<String> = reader
            .headers()
            .map_err(|e| self.input_error(e))?
            .iter()
            .map(str::to_string)
            .collect();

        let mut records = Vec::new();
        for row in reader.records() {
            let row = row.map_err(|e| self.input_error(e))?;
            if row.len() > headers.len() {
                let line = row.position().map(|p| p.line()).unwrap_or_default();
                return Err(self.input_error(format!(
                    "line {} has {} fields but the header has {}",
                    line,
                    row.len(),
                    headers.len()
                )));
            }
            records.push(Record::from_row(headers.iter().cloned(), row.iter()));
        }

        tracing::debug!(path = %self.path.display(), rows = records.len(), "Read input table");
        Ok(records)
    }

    fn input_error(&self, err: impl std::fmt::Display) -> TriageError {
        TriageError::config(format!("cannot read input {}: {}", self.path.display(), err))
    }
}

/// Writes rows to `destination` through a temporary sibling file, so a failed
/// write never leaves a partial table behind.
fn write_table<T, I>(destination: &Path, columns: &[&str], rows: I) -> Result<(), TriageError>
where
    T: Serialize,
    I: IntoIterator<Item = T>,
{
    if let Some(parent) = destination.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| persistence_error(destination, e))?;
    }

    let tmp_path = temp_sibling(destination);
    let result = write_rows(&tmp_path, columns, rows)
        .and_then(|()| fs::rename(&tmp_path, destination).map_err(csv::Error::from))
        .map_err(|e| persistence_error(destination, e));

    if result.is_err() {
        let _ = fs::remove_file(&tmp_path);
    }
    result
}

fn write_rows<T, I>(path: &Path, columns: &[&str], rows: I) -> Result<(), csv::Error>
where
    T: Serialize,
    I: IntoIterator<Item = T>,
{
    let mut file = File::create(path)?;
    file.write_all(UTF8_BOM.as_bytes())?;

    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(file);
    writer.write_record(columns)?;
    for row in rows {
        writer.serialize(row)?;
    }

    let file = writer.into_inner().map_err(|e| e.into_error())?;
    file.sync_all()?;
    Ok(())
}

fn persistence_error(path: &Path, err: impl std::fmt::Display) -> TriageError {
    TriageError::persistence(path.display().to_string(), err.to_string())
}

/// Writes the flattened message log.
///
/// Columns: `batch_start, batch_end, source, content, type, prompt_tokens,
/// completion_tokens`. Missing token counts are empty fields.
pub fn persist(messages: &[MessageRecord], destination: &Path) -> Result<(), TriageError> {
    write_table(destination, &MessageRecord::COLUMNS, messages)?;
    tracing::info!(path = %destination.display(), rows = messages.len(), "Wrote message log");
    Ok(())
}

/// Reads a message log written by [`persist`].
pub fn read_message_log(path: &Path) -> Result<Vec<MessageRecord>, TriageError> {
    let read_error = |e: csv::Error| TriageError::Serialization {
        format: "CSV".to_string(),
        message: format!("{}: {}", path.display(), e),
    };

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .map_err(read_error)?;
    reader.deserialize().map(|row| row.map_err(read_error)).collect()
}

/// Writes `user_summary.csv` and `step_summary.csv` into `out_dir`.
pub fn write_answer_report(
    report: &AnswerReport,
    out_dir: &Path,
) -> Result<Vec<PathBuf>, TriageError> {
    let user_path = out_dir.join("user_summary.csv");
    let step_path = out_dir.join("step_summary.csv");

    write_table::<&UserSummary, _>(
        &user_path,
        &["user_id", "total", "correct", "accuracy_pct"],
        &report.users,
    )?;
    write_table::<&StepSummary, _>(
        &step_path,
        &["step", "total", "correct", "wrong", "accuracy_pct"],
        &report.steps,
    )?;

    Ok(vec![user_path, step_path])
}
