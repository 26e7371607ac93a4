//! Shared types for the BOLETO slip engine.
//!
//! These types form the data model used across all modules.
//! The store, the pure calculators, the gate and the submission
//! channels all depend on them without depending on each other.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Selection
// ---------------------------------------------------------------------------

/// One leg of a bet: a chosen outcome on one event, with its own odds and stake.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    /// Unique within an event ("home", "draw", "away" or a market-specific key).
    pub selection_id: String,
    pub event_id: String,
    /// Display only, never used in logic.
    pub event_label: String,
    pub outcome_kind: OutcomeKind,
    /// Decimal odds: payout = stake × odds.
    pub odds: Decimal,
    pub stake: Decimal,
}

impl Selection {
    pub fn new(
        selection_id: impl Into<String>,
        event_id: impl Into<String>,
        event_label: impl Into<String>,
        outcome_kind: OutcomeKind,
        odds: Decimal,
        stake: Decimal,
    ) -> Self {
        Self {
            selection_id: selection_id.into(),
            event_id: event_id.into(),
            event_label: event_label.into(),
            outcome_kind,
            odds,
            stake,
        }
    }

    /// Identity of this selection within a slip.
    pub fn key(&self) -> SelectionKey {
        SelectionKey::new(&self.selection_id, &self.event_id)
    }

    /// Whether this selection is identified by the given pair.
    pub fn matches(&self, selection_id: &str, event_id: &str) -> bool {
        self.selection_id == selection_id && self.event_id == event_id
    }

    /// Payout of this leg taken as a simple bet, or `None` on overflow.
    pub fn payout(&self) -> Option<Decimal> {
        self.stake.checked_mul(self.odds)
    }
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} {} @ {:.2} stake=${:.2}",
            self.event_id, self.event_label, self.outcome_kind, self.odds, self.stake,
        )
    }
}

/// The `(selection_id, event_id)` pair that identifies a selection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SelectionKey {
    pub selection_id: String,
    pub event_id: String,
}

impl SelectionKey {
    pub fn new(selection_id: &str, event_id: &str) -> Self {
        Self {
            selection_id: selection_id.to_string(),
            event_id: event_id.to_string(),
        }
    }
}

impl fmt::Display for SelectionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.event_id, self.selection_id)
    }
}

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Outcome of a three-way head-to-head market.
///
/// Serializes as `home`/`draw`/`away`; deserializes through [`FromStr`](std::str::FromStr),
/// so board notation and the Spanish labels are accepted on input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum OutcomeKind {
    Home,
    Draw,
    Away,
}

impl OutcomeKind {
    pub const ALL: &'static [OutcomeKind] =
        &[OutcomeKind::Home, OutcomeKind::Draw, OutcomeKind::Away];
}

impl fmt::Display for OutcomeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutcomeKind::Home => write!(f, "HOME"),
            OutcomeKind::Draw => write!(f, "DRAW"),
            OutcomeKind::Away => write!(f, "AWAY"),
        }
    }
}

/// Parse an outcome kind, accepting the 1/X/2 board notation and the
/// Spanish labels the odds buttons carry.
impl std::str::FromStr for OutcomeKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "home" | "1" | "local" => Ok(OutcomeKind::Home),
            "draw" | "x" | "empate" => Ok(OutcomeKind::Draw),
            "away" | "2" | "visitante" | "visita" => Ok(OutcomeKind::Away),
            _ => Err(anyhow::anyhow!("Unknown outcome kind: {s}")),
        }
    }
}

impl TryFrom<String> for OutcomeKind {
    type Error = anyhow::Error;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

// ---------------------------------------------------------------------------
// Submission payload & receipt
// ---------------------------------------------------------------------------

/// One entry of the flat batch sent to the wagering API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BetRecord {
    pub selection_id: String,
    pub event_id: String,
    pub stake: Decimal,
    pub odds: Decimal,
    pub outcome_kind: OutcomeKind,
}

impl From<&Selection> for BetRecord {
    fn from(s: &Selection) -> Self {
        Self {
            selection_id: s.selection_id.clone(),
            event_id: s.event_id.clone(),
            stake: s.stake,
            odds: s.odds,
            outcome_kind: s.outcome_kind,
        }
    }
}

/// A bet the remote side reports as created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedBet {
    pub bet_id: String,
    pub selection_id: String,
    pub event_id: String,
    pub stake: Decimal,
    pub odds: Decimal,
}

/// Confirmation of an accepted batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchReceipt {
    pub batch_id: String,
    /// Echo of the created records, when the remote side provides one.
    #[serde(default)]
    pub created: Vec<CreatedBet>,
    pub submitted_at: DateTime<Utc>,
}

impl BatchReceipt {
    /// Sum of the stakes echoed back by the remote side, saturating.
    pub fn total_staked(&self) -> Decimal {
        self.created
            .iter()
            .fold(Decimal::ZERO, |acc, b| acc.saturating_add(b.stake))
    }
}

impl fmt::Display for BatchReceipt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "batch {} ({} bets, ${:.2}) at {}",
            self.batch_id,
            self.created.len(),
            self.total_staked(),
            self.submitted_at.to_rfc3339(),
        )
    }
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Domain-specific error types for BOLETO.
#[derive(Debug, thiserror::Error)]
pub enum BoletoError {
    #[error("Batch rejected by {channel}: {message}")]
    Rejected { channel: String, message: String },

    #[error("Transport error ({channel}): {message}")]
    Transport { channel: String, message: String },

    #[error("Configuration error: {0}")]
    Config(String),
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
