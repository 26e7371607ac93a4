//! Submission channels.
//!
//! Defines the `SubmissionChannel` trait, the only outbound contract of
//! the slip engine, and provides implementations for:
//! - HTTP — batch-create against the remote wagering API
//! - Dry run — logs the batch and echoes synthetic records

pub mod dry_run;
pub mod http;

use anyhow::Result;
use async_trait::async_trait;

use crate::types::{BatchReceipt, BetRecord};

/// Abstraction over the remote batch-create call.
///
/// One call per user-initiated submit, for the whole batch. Implementors
/// must not retry; an `Err` is either a transport failure or a business
/// rejection carrying a human-readable message.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SubmissionChannel: Send + Sync {
    /// Create every bet in `batch` as one all-or-nothing unit.
    async fn create_batch(&self, batch: &[BetRecord]) -> Result<BatchReceipt>;

    /// Channel name for logging and identification.
    fn name(&self) -> &str;
}
