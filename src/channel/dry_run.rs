//! Dry-run channel.
//!
//! Logs each record instead of sending it and answers with a receipt whose
//! echoed bets carry `dry-run-<uuid>` ids. Can be told to reject every
//! batch, which is handy for exercising the failure path end to end.

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use tracing::info;

use super::SubmissionChannel;
use crate::types::{BatchReceipt, BetRecord, BoletoError, CreatedBet};

const CHANNEL_NAME: &str = "dry-run";

#[derive(Debug, Default)]
pub struct DryRunChannel {
    reject_with: Option<String>,
}

impl DryRunChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// A channel that rejects every batch with `message`.
    pub fn rejecting(message: impl Into<String>) -> Self {
        Self {
            reject_with: Some(message.into()),
        }
    }
}

#[async_trait]
impl SubmissionChannel for DryRunChannel {
    async fn create_batch(&self, batch: &[BetRecord]) -> Result<BatchReceipt> {
        if let Some(message) = &self.reject_with {
            return Err(BoletoError::Rejected {
                channel: CHANNEL_NAME.to_string(),
                message: message.clone(),
            }
            .into());
        }

        for record in batch {
            info!(
                selection_id = %record.selection_id,
                event_id = %record.event_id,
                outcome = %record.outcome_kind,
                odds = %record.odds,
                stake = format!("${:.2}", record.stake),
                "[DRY RUN] Would place bet"
            );
        }

        Ok(BatchReceipt {
            batch_id: format!("dry-run-{}", uuid::Uuid::new_v4()),
            created: batch
                .iter()
                .map(|r| CreatedBet {
                    bet_id: format!("dry-run-{}", uuid::Uuid::new_v4()),
                    selection_id: r.selection_id.clone(),
                    event_id: r.event_id.clone(),
                    stake: r.stake,
                    odds: r.odds,
                })
                .collect(),
            submitted_at: Utc::now(),
        })
    }

    fn name(&self) -> &str {
        CHANNEL_NAME
    }
}
