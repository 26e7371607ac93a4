//! Mock submission channel for integration testing.
//!
//! Provides a deterministic `SubmissionChannel` implementation that
//! accepts batches, records them, and can be forced to fail or to reject
//! bets on closed events. All state is in-memory.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::Utc;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use boleto::channel::SubmissionChannel;
use boleto::types::*;

/// A mock wagering API for deterministic testing.
///
/// All state is in-memory and fully controllable from test code.
pub struct MockChannel {
    name: String,
    batches: Arc<Mutex<Vec<Vec<BetRecord>>>>,
    closed_events: Arc<Mutex<Vec<String>>>,
    /// If set, every call fails with this message.
    force_error: Arc<Mutex<Option<String>>>,
}

impl MockChannel {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            batches: Arc::new(Mutex::new(Vec::new())),
            closed_events: Arc::new(Mutex::new(Vec::new())),
            force_error: Arc::new(Mutex::new(None)),
        }
    }

    /// Force all subsequent calls to fail.
    pub fn set_error(&self, msg: &str) {
        *self.force_error.lock().unwrap() = Some(msg.to_string());
    }

    pub fn clear_error(&self) {
        *self.force_error.lock().unwrap() = None;
    }

    /// Reject any batch containing a bet on `event_id`.
    pub fn close_event(&self, event_id: &str) {
        self.closed_events.lock().unwrap().push(event_id.to_string());
    }

    /// Every batch received, including rejected ones.
    pub fn batches(&self) -> Vec<Vec<BetRecord>> {
        self.batches.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.batches.lock().unwrap().len()
    }
}

#[async_trait]
impl SubmissionChannel for MockChannel {
    async fn create_batch(&self, batch: &[BetRecord]) -> Result<BatchReceipt> {
        self.batches.lock().unwrap().push(batch.to_vec());

        if let Some(err) = self.force_error.lock().unwrap().as_ref() {
            return Err(anyhow!("{}", err));
        }

        let closed = self.closed_events.lock().unwrap();
        if let Some(bet) = batch.iter().find(|b| closed.contains(&b.event_id)) {
            return Err(BoletoError::Rejected {
                channel: self.name.clone(),
                message: format!("event {} is closed", bet.event_id),
            }
            .into());
        }

        Ok(BatchReceipt {
            batch_id: format!("MOCK-{}", Uuid::new_v4()),
            created: batch
                .iter()
                .enumerate()
                .map(|(i, b)| CreatedBet {
                    bet_id: format!("MOCK-BET-{i}"),
                    selection_id: b.selection_id.clone(),
                    event_id: b.event_id.clone(),
                    stake: b.stake,
                    odds: b.odds,
                })
                .collect(),
            submitted_at: Utc::now(),
        })
    }

    fn name(&self) -> &str {
        &self.name
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn record(selection_id: &str, event_id: &str) -> BetRecord {
        BetRecord {
            selection_id: selection_id.to_string(),
            event_id: event_id.to_string(),
            stake: dec!(10),
            odds: dec!(2.50),
            outcome_kind: OutcomeKind::Home,
        }
    }

    #[tokio::test]
    async fn test_mock_accepts_and_records() {
        let channel = MockChannel::new("mock-api");
        let receipt = channel
            .create_batch(&[record("home", "1"), record("away", "2")])
            .await
            .unwrap();

        assert!(receipt.batch_id.starts_with("MOCK-"));
        assert_eq!(receipt.created.len(), 2);
        assert_eq!(receipt.total_staked(), dec!(20));
        assert_eq!(channel.call_count(), 1);
        assert_eq!(channel.batches()[0][1].event_id, "2");
    }

    #[tokio::test]
    async fn test_mock_forced_error() {
        let channel = MockChannel::new("mock-api");
        channel.set_error("simulated network drop");
        assert!(channel.create_batch(&[record("home", "1")]).await.is_err());

        channel.clear_error();
        assert!(channel.create_batch(&[record("home", "1")]).await.is_ok());
        assert_eq!(channel.call_count(), 2);
    }

    #[tokio::test]
    async fn test_mock_closed_event() {
        let channel = MockChannel::new("mock-api");
        channel.close_event("2");
        let err = channel
            .create_batch(&[record("home", "1"), record("away", "2")])
            .await
            .unwrap_err();
        assert!(err.to_string().contains("event 2 is closed"));
        assert_eq!(channel.name(), "mock-api");
    }
}
