//! Submission gate.
//!
//! Decides whether the slip may be submitted and tracks the single
//! in-flight submission: `Idle → Submitting → (Idle | Failed)`.
//! Local validation failures never reach the channel and leave the state
//! untouched. A confirmed batch clears the store; a failed one keeps it.
//! A submission dropped before the channel answers ends in `Failed`, so
//! `Submitting` never outlives its caller.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{info, warn};

use crate::analysis::conflict::conflicted_event_ids;
use crate::channel::SubmissionChannel;
use crate::store::SelectionStore;
use crate::types::{BatchReceipt, BetRecord, Selection};

// ---------------------------------------------------------------------------
// State & errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "reason", rename_all = "snake_case")]
pub enum GateState {
    Idle,
    Submitting,
    /// Last attempt failed; the slip was kept for editing or retry.
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubmitError {
    #[error("Slip is empty")]
    EmptySlip,

    #[error("Conflicting selections on events: {}", .0.join(", "))]
    Conflicts(Vec<String>),

    #[error("Selection {selection_id} on event {event_id} has no positive stake")]
    NonPositiveStake {
        selection_id: String,
        event_id: String,
    },

    #[error("A submission is already in flight")]
    InFlight,

    #[error("Submission failed: {0}")]
    Channel(String),
}

impl SubmitError {
    /// True for errors decided locally, without contacting the channel.
    pub fn is_local(&self) -> bool {
        !matches!(self, SubmitError::Channel(_))
    }
}

/// Failure reason recorded when a submission is dropped mid-flight.
pub const CANCELLED_REASON: &str = "Submission cancelled before the API answered";

// ---------------------------------------------------------------------------
// Ticket
// ---------------------------------------------------------------------------

/// A validated batch, handed out by [`SubmissionGate::begin`].
#[derive(Debug)]
#[must_use = "a ticket must be completed or the gate stays in Submitting"]
pub struct SubmissionTicket {
    records: Vec<BetRecord>,
    started_at: DateTime<Utc>,
}

impl SubmissionTicket {
    /// The flat payload, one record per selection, in slip order.
    pub fn records(&self) -> &[BetRecord] {
        &self.records
    }

    pub fn total_stake(&self) -> Decimal {
        self.records
            .iter()
            .fold(Decimal::ZERO, |acc, r| acc.saturating_add(r.stake))
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }
}

// ---------------------------------------------------------------------------
// Gate
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct SubmissionGate {
    state: GateState,
}

impl Default for SubmissionGate {
    fn default() -> Self {
        Self::new()
    }
}

impl SubmissionGate {
    pub fn new() -> Self {
        Self {
            state: GateState::Idle,
        }
    }

    pub fn state(&self) -> &GateState {
        &self.state
    }

    pub fn is_submitting(&self) -> bool {
        self.state == GateState::Submitting
    }

    /// Failure reason of the last attempt, while in `Failed`.
    pub fn last_error(&self) -> Option<&str> {
        match &self.state {
            GateState::Failed(reason) => Some(reason),
            _ => None,
        }
    }

    /// Check that a slip could be submitted as it stands.
    pub fn validate(selections: &[Selection]) -> Result<(), SubmitError> {
        if selections.is_empty() {
            return Err(SubmitError::EmptySlip);
        }

        let conflicted = conflicted_event_ids(selections);
        if !conflicted.is_empty() {
            return Err(SubmitError::Conflicts(conflicted.into_iter().collect()));
        }

        if let Some(s) = selections.iter().find(|s| s.stake <= Decimal::ZERO) {
            return Err(SubmitError::NonPositiveStake {
                selection_id: s.selection_id.clone(),
                event_id: s.event_id.clone(),
            });
        }

        Ok(())
    }

    /// Validate the slip and move to `Submitting`.
    ///
    /// Allowed from `Idle` and `Failed`. On error the state is unchanged.
    pub fn begin(&mut self, store: &SelectionStore) -> Result<SubmissionTicket, SubmitError> {
        if self.is_submitting() {
            return Err(SubmitError::InFlight);
        }

        let selections = store.selections();
        if let Err(e) = Self::validate(selections) {
            info!(reason = %e, "Submission rejected locally");
            return Err(e);
        }

        let ticket = SubmissionTicket {
            records: selections.iter().map(BetRecord::from).collect(),
            started_at: Utc::now(),
        };
        self.state = GateState::Submitting;

        info!(
            count = ticket.records.len(),
            total_stake = format!("${:.2}", ticket.total_stake()),
            "Submitting slip"
        );

        Ok(ticket)
    }

    /// Apply the channel's answer for a ticket.
    ///
    /// Success clears the store and returns to `Idle`. Failure moves to
    /// `Failed` and leaves the store exactly as it was.
    pub fn complete(
        &mut self,
        ticket: SubmissionTicket,
        result: anyhow::Result<BatchReceipt>,
        store: &mut SelectionStore,
    ) -> Result<BatchReceipt, SubmitError> {
        let elapsed_ms = (Utc::now() - ticket.started_at()).num_milliseconds();

        match result {
            Ok(receipt) => {
                store.clear();
                self.state = GateState::Idle;
                info!(
                    batch_id = %receipt.batch_id,
                    count = ticket.records.len(),
                    elapsed_ms,
                    "Slip accepted"
                );
                Ok(receipt)
            }
            Err(e) => {
                let reason = format!("{e:#}");
                warn!(
                    error = %reason,
                    count = ticket.records.len(),
                    elapsed_ms,
                    "Slip submission failed"
                );
                self.state = GateState::Failed(reason.clone());
                Err(SubmitError::Channel(reason))
            }
        }
    }

    /// Give up on the in-flight submission without a channel answer.
    ///
    /// The slip is kept. The remote side may or may not have seen the batch.
    pub fn cancel(&mut self, reason: &str) {
        if self.is_submitting() {
            warn!(reason, "In-flight submission abandoned");
            self.state = GateState::Failed(reason.to_string());
        }
    }

    /// Validate, call the channel exactly once, and apply the result.
    ///
    /// Dropping the returned future before the channel answers leaves the
    /// gate in `Failed` with [`CANCELLED_REASON`].
    pub async fn submit(
        &mut self,
        store: &mut SelectionStore,
        channel: &dyn SubmissionChannel,
    ) -> Result<BatchReceipt, SubmitError> {
        let ticket = self.begin(store)?;
        let mut pending = PendingSubmission {
            gate: self,
            answered: false,
        };
        let result = channel.create_batch(ticket.records()).await;
        pending.answered = true;
        pending.gate.complete(ticket, result, store)
    }
}

/// Cancels the gate if dropped before the channel answered.
struct PendingSubmission<'a> {
    gate: &'a mut SubmissionGate,
    answered: bool,
}

impl Drop for PendingSubmission<'_> {
    fn drop(&mut self) {
        if !self.answered {
            self.gate.cancel(CANCELLED_REASON);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
