//! Answer-accuracy summaries for tutoring answer logs.
//!
//! Groups validator verdicts by user and by step and computes accuracy
//! tables, the weakest step and the steps with the most wrong answers.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::error::{Result, TriageError};
use crate::record::Record;

pub const USER_COLUMN: &str = "USER_ID";
pub const REPLY_COLUMN: &str = "GPT_ANSWER_VALIDATOR_REPLY";
pub const DEFAULT_STEP_COLUMN: &str = "CURRENT_STEP";

/// How many steps `top_wrong_steps` lists.
const TOP_WRONG_LIMIT: usize = 3;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserSummary {
    pub user_id: String,
    pub total: usize,
    pub correct: usize,
    /// `None` when no row was answered.
    pub accuracy_pct: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepSummary {
    pub step: String,
    pub total: usize,
    pub correct: usize,
    pub wrong: usize,
    pub accuracy_pct: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnswerReport {
    pub users: Vec<UserSummary>,
    pub steps: Vec<StepSummary>,
    /// Answered step with the lowest accuracy; the first in key order wins
    /// ties. Steps without answers are never picked.
    pub most_wrong_step: Option<String>,
    /// Up to three steps ordered by wrong count, descending.
    pub top_wrong_steps: Vec<String>,
}

#[derive(Default)]
struct Tally {
    total: usize,
    correct: usize,
}

impl Tally {
    fn accuracy_pct(&self) -> Option<f64> {
        if self.total == 0 {
            return None;
        }
        let pct = self.correct as f64 / self.total as f64 * 100.0;
        Some((pct * 100.0).round() / 100.0)
    }
}

/// Summarises an answer log.
///
/// Rows with a blank key are left out of that grouping. Blank replies are not
/// counted as answers; a reply is correct when it reads `true` (any case).
pub fn summarize_answers(rows: &[Record], step_column: &str) -> Result<AnswerReport> {
    if let Some(first) = rows.first() {
        for column in [USER_COLUMN, step_column, REPLY_COLUMN] {
            if first.get(column).is_none() {
                return Err(TriageError::config(format!(
                    "answer log is missing column '{}'",
                    column
                )));
            }
        }
    }

    let mut by_user: BTreeMap<String, Tally> = BTreeMap::new();
    let mut by_step: BTreeMap<String, Tally> = BTreeMap::new();

    for row in rows {
        let reply = row.get(REPLY_COLUMN).unwrap_or("").trim();
        let answered = !reply.is_empty();
        let correct = reply.eq_ignore_ascii_case("true");

        for (key, groups) in [
            (row.get(USER_COLUMN), &mut by_user),
            (row.get(step_column), &mut by_step),
        ] {
            let Some(key) = key.map(str::trim).filter(|k| !k.is_empty()) else {
                continue;
            };
            let tally = groups.entry(key.to_string()).or_default();
            if answered {
                tally.total += 1;
            }
            if correct {
                tally.correct += 1;
            }
        }
    }

    let users = by_user
        .into_iter()
        .map(|(user_id, tally)| UserSummary {
            accuracy_pct: tally.accuracy_pct(),
            user_id,
            total: tally.total,
            correct: tally.correct,
        })
        .collect();

    let steps: Vec<StepSummary> = by_step
        .into_iter()
        .map(|(step, tally)| StepSummary {
            accuracy_pct: tally.accuracy_pct(),
            wrong: tally.total - tally.correct,
            step,
            total: tally.total,
            correct: tally.correct,
        })
        .collect();

    let most_wrong_step = steps
        .iter()
        .filter_map(|step| step.accuracy_pct.map(|pct| (pct, step)))
        .fold(None::<(f64, &StepSummary)>, |lowest, (pct, step)| match lowest {
            Some((current, _)) if current <= pct => lowest,
            _ => Some((pct, step)),
        })
        .map(|(_, s)| s.step.clone());

    let mut by_wrong: Vec<&StepSummary> = steps.iter().collect();
    by_wrong.sort_by(|a, b| b.wrong.cmp(&a.wrong));
    let top_wrong_steps = by_wrong
        .into_iter()
        .take(TOP_WRONG_LIMIT)
        .map(|s| s.step.clone())
        .collect();

    Ok(AnswerReport {
        users,
        steps,
        most_wrong_step,
        top_wrong_steps,
    })
}
