//! Slip session — store, gate and channel behind one owned handle.
//!
//! Each session is an independent slip; share it with `Arc` where several
//! async callers (HTTP handlers) need it. Locks are always taken in the
//! order store → gate, and never held across the channel call. While a
//! submission is in flight the slip is read-only.
//!
//! The channel call and its completion run on a task owned by the session,
//! so a caller that goes away (client disconnect, aborted task) cannot leave
//! the gate stuck in `Submitting`.

use rust_decimal::Decimal;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

use tracing::error;

use super::gate::{SubmissionGate, SubmitError};
use crate::analysis::SlipSummary;
use crate::channel::SubmissionChannel;
use crate::config::SlipConfig;
use crate::store::{parse_stake_value, RejectReason, SelectionStore, StoreOutcome};
use crate::types::{BatchReceipt, Selection};

/// Selections plus the derived read model, taken under one lock.
#[derive(Debug, Clone, Serialize)]
pub struct SlipView {
    pub selections: Vec<Selection>,
    pub summary: SlipSummary,
}

pub struct SlipSession {
    store: Arc<RwLock<SelectionStore>>,
    gate: Arc<Mutex<SubmissionGate>>,
    channel: Arc<dyn SubmissionChannel>,
    default_stake: Decimal,
}

impl SlipSession {
    pub fn new(channel: Arc<dyn SubmissionChannel>, config: &SlipConfig) -> Self {
        Self {
            store: Arc::new(RwLock::new(SelectionStore::new(config.max_selections))),
            gate: Arc::new(Mutex::new(SubmissionGate::new())),
            channel,
            default_stake: config.default_stake,
        }
    }

    pub fn channel_name(&self) -> &str {
        self.channel.name()
    }

    pub fn default_stake(&self) -> Decimal {
        self.default_stake
    }

    // -- Store operations ------------------------------------------------

    pub async fn add_selection(&self, selection: Selection) -> StoreOutcome {
        self.mutate(|store| store.add_selection(selection)).await
    }

    pub async fn remove_selection(&self, selection_id: &str, event_id: &str) -> StoreOutcome {
        self.mutate(|store| store.remove_selection(selection_id, event_id))
            .await
    }

    pub async fn edit_stake(&self, selection_id: &str, event_id: &str, stake: Decimal) -> StoreOutcome {
        self.mutate(|store| store.edit_stake(selection_id, event_id, stake))
            .await
    }

    /// Edit a stake from loosely-typed input (JSON number or string).
    pub async fn edit_stake_value(
        &self,
        selection_id: &str,
        event_id: &str,
        value: &serde_json::Value,
    ) -> StoreOutcome {
        match parse_stake_value(value) {
            Ok(stake) => self.edit_stake(selection_id, event_id, stake).await,
            Err(reason) => StoreOutcome::Rejected(reason),
        }
    }

    pub async fn set_uniform_stake(&self, amount: Decimal) -> StoreOutcome {
        self.mutate(|store| store.set_uniform_stake(amount)).await
    }

    pub async fn set_uniform_stake_value(&self, value: &serde_json::Value) -> StoreOutcome {
        match parse_stake_value(value) {
            Ok(amount) => self.set_uniform_stake(amount).await,
            Err(reason) => StoreOutcome::Rejected(reason),
        }
    }

    pub async fn clear(&self) -> StoreOutcome {
        self.mutate(SelectionStore::clear).await
    }

    async fn mutate<F>(&self, op: F) -> StoreOutcome
    where
        F: FnOnce(&mut SelectionStore) -> StoreOutcome,
    {
        let mut store = self.store.write().await;
        if self.gate.lock().await.is_submitting() {
            return StoreOutcome::Rejected(RejectReason::SubmissionInFlight);
        }
        op(&mut store)
    }

    // -- Reads -----------------------------------------------------------

    pub async fn selections(&self) -> Vec<Selection> {
        self.store.read().await.snapshot()
    }

    pub async fn summary(&self) -> SlipSummary {
        let store = self.store.read().await;
        let gate = self.gate.lock().await;
        SlipSummary::derive(&store, &gate)
    }

    pub async fn view(&self) -> SlipView {
        let store = self.store.read().await;
        let gate = self.gate.lock().await;
        SlipView {
            selections: store.snapshot(),
            summary: SlipSummary::derive(&store, &gate),
        }
    }

    // -- Submission ------------------------------------------------------

    /// Submit the slip through the session's channel.
    ///
    /// A second call while one is in flight fails with
    /// [`SubmitError::InFlight`] without touching the channel. Once the batch
    /// is handed to the channel it runs to completion even if this future is
    /// dropped.
    pub async fn submit(&self) -> Result<BatchReceipt, SubmitError> {
        let ticket = {
            let store = self.store.read().await;
            let mut gate = self.gate.lock().await;
            gate.begin(&store)?
        };

        let store = Arc::clone(&self.store);
        let gate = Arc::clone(&self.gate);
        let channel = Arc::clone(&self.channel);
        let task = tokio::spawn(async move {
            let records = ticket.records().to_vec();
            // A panicking channel surfaces as a failed attempt.
            let result = match tokio::spawn(async move { channel.create_batch(&records).await }).await {
                Ok(result) => result,
                Err(e) => Err(anyhow::anyhow!("Submission task failed: {e}")),
            };

            let mut store = store.write().await;
            let mut gate = gate.lock().await;
            gate.complete(ticket, result, &mut store)
        });

        match task.await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!(error = %e, "Submission task ended without completing");
                let reason = format!("Submission task failed: {e}");
                self.gate.lock().await.cancel(&reason);
                Err(SubmitError::Channel(reason))
            }
        }
    }
}
