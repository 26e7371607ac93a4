//! Remote wagering API batch-create client.
//!
//! Sends the whole slip as one `POST {base_url}/bets/batch` request:
//!
//!   request:  { "bets": [ { selection_id, event_id, stake, odds, outcome_kind } ] }
//!   response: { "success": bool, "message"?: str, "batch_id"?: str, "bets"?: [...] }
//!
//! Auth: optional `Authorization: Bearer {token}`. Every request carries a
//! fresh `X-Request-Id`. No retries: one request per submit.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use reqwest::{Client, StatusCode};
use rust_decimal::Decimal;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, warn};

use super::SubmissionChannel;
use crate::config::{AppConfig, SubmissionConfig};
use crate::types::{BatchReceipt, BetRecord, BoletoError, CreatedBet};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

const CHANNEL_NAME: &str = "http";
const BATCH_PATH: &str = "/bets/batch";

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct BatchRequest<'a> {
    bets: &'a [BetRecord],
}

#[derive(Debug, Deserialize)]
struct BatchResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    batch_id: Option<String>,
    #[serde(default)]
    bets: Vec<ApiBet>,
}

/// A created bet as echoed by the API. Only the fields we keep.
#[derive(Debug, Deserialize)]
struct ApiBet {
    #[serde(alias = "bet_id")]
    id: String,
    selection_id: String,
    event_id: String,
    stake: Decimal,
    odds: Decimal,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

pub struct HttpChannel {
    http: Client,
    base_url: String,
    token: Option<SecretString>,
}

impl HttpChannel {
    pub fn new(base_url: &str, token: Option<SecretString>, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent("BOLETO/0.1.0 (betting-slip)")
            .build()
            .context("Failed to build HTTP client for wagering API")?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        })
    }

    /// Build from the `[submission]` config section. The token env var is optional.
    pub fn from_config(cfg: &SubmissionConfig) -> Result<Self> {
        let base_url = cfg
            .base_url
            .as_deref()
            .ok_or_else(|| BoletoError::Config("submission.base_url is not set".into()))?;

        let token = match AppConfig::resolve_env(&cfg.api_token_env) {
            Ok(t) => Some(SecretString::new(t)),
            Err(_) => {
                warn!(env = %cfg.api_token_env, "No API token configured, sending unauthenticated requests");
                None
            }
        };

        Self::new(base_url, token, Duration::from_secs(cfg.timeout_secs))
    }

    pub fn batch_url(&self) -> String {
        format!("{}{BATCH_PATH}", self.base_url)
    }

    /// Turn the API's answer into a receipt or a rejection.
    fn interpret(status: StatusCode, body: &str, request_id: &str) -> Result<BatchReceipt> {
        let parsed: Option<BatchResponse> = serde_json::from_str(body).ok();

        if !status.is_success() {
            let message = parsed
                .and_then(|r| r.message)
                .unwrap_or_else(|| body.trim().to_string());
            return Err(BoletoError::Rejected {
                channel: CHANNEL_NAME.to_string(),
                message: format!("{status}: {message}"),
            }
            .into());
        }

        let response = parsed.context("Failed to parse batch response")?;

        if !response.success {
            return Err(BoletoError::Rejected {
                channel: CHANNEL_NAME.to_string(),
                message: response
                    .message
                    .unwrap_or_else(|| "batch rejected without a message".to_string()),
            }
            .into());
        }

        Ok(BatchReceipt {
            batch_id: response.batch_id.unwrap_or_else(|| request_id.to_string()),
            created: response
                .bets
                .into_iter()
                .map(|b| CreatedBet {
                    bet_id: b.id,
                    selection_id: b.selection_id,
                    event_id: b.event_id,
                    stake: b.stake,
                    odds: b.odds,
                })
                .collect(),
            submitted_at: Utc::now(),
        })
    }
}

// ---------------------------------------------------------------------------
// SubmissionChannel trait implementation
// ---------------------------------------------------------------------------

#[async_trait]
impl SubmissionChannel for HttpChannel {
    async fn create_batch(&self, batch: &[BetRecord]) -> Result<BatchReceipt> {
        let request_id = uuid::Uuid::new_v4().to_string();
        let url = self.batch_url();

        debug!(url = %url, request_id = %request_id, count = batch.len(), "Sending bet batch");

        let mut req = self
            .http
            .post(&url)
            .header("X-Request-Id", &request_id)
            .json(&BatchRequest { bets: batch });
        if let Some(token) = &self.token {
            req = req.bearer_auth(token.expose_secret());
        }

        let resp = req.send().await.map_err(|e| BoletoError::Transport {
            channel: CHANNEL_NAME.to_string(),
            message: e.to_string(),
        })?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .context("Failed to read batch response body")?;

        let receipt = Self::interpret(status, &body, &request_id)?;

        info!(
            batch_id = %receipt.batch_id,
            created = receipt.created.len(),
            "Bet batch created"
        );

        Ok(receipt)
    }

    fn name(&self) -> &str {
        CHANNEL_NAME
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
