//! Concurrent batch dispatcher.
//!
//! Every batch gets its own roster and its own conversation. All runs are
//! polled together on the calling task, so they interleave only at await
//! points (agent calls and customer input reads) and share nothing mutable.

use futures::future::join_all;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use triage_core::agent::Agent;
use triage_core::roster::{ParticipantDefinition, validate_roster};
use triage_core::{Batch, MessageRecord, Record, TriageError};
use triage_interaction::{
    HumanInput, RoundRobinDialogue, Termination, build_roster, build_task_prompt,
};

pub struct BatchDispatcher {
    agent: Arc<dyn Agent>,
    roster: Vec<ParticipantDefinition>,
    termination: Termination,
    human_input: Arc<dyn HumanInput>,
}

impl BatchDispatcher {
    pub fn new(
        agent: Arc<dyn Agent>,
        roster: Vec<ParticipantDefinition>,
        termination: Termination,
        human_input: Arc<dyn HumanInput>,
    ) -> Result<Self, TriageError> {
        validate_roster(&roster)?;
        Ok(Self {
            agent,
            roster,
            termination,
            human_input,
        })
    }

    /// Runs one batch's conversation to completion.
    ///
    /// Returns every message of the batch (task message first) tagged with
    /// the batch range. Each turn races against `cancel`; a cancelled run
    /// returns [`TriageError::Cancelled`] and drops its partial messages.
    ///
    /// # Errors
    ///
    /// A participant failure becomes [`TriageError::BatchExecution`] carrying
    /// the batch range.
    pub async fn run_batch(
        &self,
        batch: &Batch<Record>,
        total_count: usize,
        cancel: &CancellationToken,
    ) -> Result<Vec<MessageRecord>, TriageError> {
        let range @ (batch_start, batch_end) = batch.range();
        let batch_error = |message: String| TriageError::batch(batch_start, batch_end, message);

        let task =
            build_task_prompt(batch, total_count).map_err(|e| batch_error(e.to_string()))?;
        let participants = build_roster(&self.roster, &self.agent, &self.human_input)
            .map_err(|e| batch_error(e.to_string()))?;
        let dialogue = RoundRobinDialogue::new(participants, self.termination.clone())?;
        let mut session = dialogue.partial_session(task);

        tracing::info!(batch_start, batch_end, records = batch.len(), "Batch started");

        let mut messages = Vec::new();
        loop {
            let next = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    tracing::warn!(
                        batch_start,
                        batch_end,
                        messages = messages.len(),
                        "Batch cancelled"
                    );
                    return Err(TriageError::Cancelled { batch_start, batch_end });
                }
                next = session.next_turn() => next,
            };

            match next {
                Some(Ok(turn)) => {
                    tracing::info!(batch_start, batch_end, "[{}] => {}", turn.source, turn.content);
                    messages.push(MessageRecord::from_turn(range, turn));
                }
                Some(Err(err)) => {
                    tracing::error!(batch_start, batch_end, error = %err, "Batch failed");
                    return Err(batch_error(err.to_string()));
                }
                None => break,
            }
        }

        tracing::info!(
            batch_start,
            batch_end,
            messages = messages.len(),
            turns = session.turns_taken(),
            stop_reason = ?session.stop_reason(),
            "Batch finished"
        );
        Ok(messages)
    }

    /// Runs all batches concurrently and concatenates their messages in
    /// submission order.
    ///
    /// All-or-nothing: the first failure cancels the remaining runs, every
    /// run is still awaited, and the failure of the lowest-indexed batch is
    /// returned. Nothing is returned for batches that succeeded.
    pub async fn dispatch_all(
        &self,
        batches: Vec<Batch<Record>>,
        total_count: usize,
    ) -> Result<Vec<MessageRecord>, TriageError> {
        let cancel = CancellationToken::new();
        let cancel_ref = &cancel;

        tracing::info!(
            batches = batches.len(),
            total_count,
            agent = self.agent.expertise(),
            "Dispatching batches"
        );

        let runs = batches.iter().map(move |batch| async move {
            let result = self.run_batch(batch, total_count, cancel_ref).await;
            if matches!(&result, Err(err) if !err.is_cancelled()) {
                cancel_ref.cancel();
            }
            result
        });
        let results = join_all(runs).await;

        let mut messages = Vec::new();
        let mut failure = None;
        let mut cancelled = None;
        for result in results {
            match result {
                Ok(batch_messages) => messages.extend(batch_messages),
                Err(err) if err.is_cancelled() => {
                    cancelled.get_or_insert(err);
                }
                Err(err) => {
                    failure.get_or_insert(err);
                }
            }
        }

        if let Some(err) = failure.or(cancelled) {
            tracing::error!(error = %err, "Dispatch aborted");
            return Err(err);
        }

        tracing::info!(messages = messages.len(), "All batches finished");
        Ok(messages)
    }
}
