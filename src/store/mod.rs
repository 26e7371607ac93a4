//! Selection store — the in-memory slip.
//!
//! Holds the ordered, de-duplicated selections the user has tapped and
//! exposes the five mutating operations. Every mutation reports an
//! explicit [`StoreOutcome`]; callers that ignore it get the fail-silent
//! behaviour the UI relies on, and the store never holds an invalid entry.
//! Mutations that would push any payout figure out of the `Decimal` range
//! are rejected, so every figure of a stored slip can be computed exactly.

use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

use crate::analysis::payout::PayoutBreakdown;
use crate::types::{Selection, SelectionKey};

/// Default capacity of a slip.
pub const DEFAULT_MAX_SELECTIONS: usize = 20;

// ---------------------------------------------------------------------------
// Mutation outcome
// ---------------------------------------------------------------------------

/// Result of a store mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum StoreOutcome {
    Accepted,
    Rejected(RejectReason),
}

impl StoreOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, StoreOutcome::Accepted)
    }
}

/// Why a mutation left the slip untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    /// The `(selection_id, event_id)` pair is already in the slip.
    Duplicate,
    /// No selection matches the given pair.
    NotFound,
    NonPositiveStake,
    NonNumericStake,
    /// Odds must be a multiplier above 1.
    InvalidOdds,
    SlipFull,
    EmptySlip,
    /// A payout figure of the resulting slip would overflow.
    AmountTooLarge,
    /// The slip is locked while a submission is in flight.
    SubmissionInFlight,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RejectReason::Duplicate => "selection already in slip",
            RejectReason::NotFound => "selection not in slip",
            RejectReason::NonPositiveStake => "stake must be positive",
            RejectReason::NonNumericStake => "stake is not a number",
            RejectReason::InvalidOdds => "odds must be greater than 1",
            RejectReason::SlipFull => "slip is full",
            RejectReason::EmptySlip => "slip is empty",
            RejectReason::AmountTooLarge => "payout would exceed the supported range",
            RejectReason::SubmissionInFlight => "submission in flight",
        };
        write!(f, "{s}")
    }
}

// ---------------------------------------------------------------------------
// Stake input
// ---------------------------------------------------------------------------

/// Parse a user-entered stake. Accepts a comma as decimal separator.
pub fn parse_stake(input: &str) -> Result<Decimal, RejectReason> {
    let normalized = input.trim().replace(',', ".");
    let stake = Decimal::from_str(&normalized).map_err(|_| RejectReason::NonNumericStake)?;
    if stake <= Decimal::ZERO {
        return Err(RejectReason::NonPositiveStake);
    }
    Ok(stake)
}

/// Parse a stake from a loosely-typed JSON value (number or string).
pub fn parse_stake_value(value: &serde_json::Value) -> Result<Decimal, RejectReason> {
    match value {
        serde_json::Value::Number(n) => parse_stake(&n.to_string()),
        serde_json::Value::String(s) => parse_stake(s),
        _ => Err(RejectReason::NonNumericStake),
    }
}

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

/// The slip: an explicitly owned container of selections.
#[derive(Debug, Clone)]
pub struct SelectionStore {
    selections: Vec<Selection>,
    visible: bool,
    max_selections: usize,
}

impl Default for SelectionStore {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_SELECTIONS)
    }
}

impl SelectionStore {
    pub fn new(max_selections: usize) -> Self {
        Self {
            selections: Vec::new(),
            visible: false,
            max_selections,
        }
    }

    // -- Reads -----------------------------------------------------------

    /// Selections in insertion order.
    pub fn selections(&self) -> &[Selection] {
        &self.selections
    }

    /// Owned copy of the current contents.
    pub fn snapshot(&self) -> Vec<Selection> {
        self.selections.clone()
    }

    pub fn get(&self, selection_id: &str, event_id: &str) -> Option<&Selection> {
        self.selections
            .iter()
            .find(|s| s.matches(selection_id, event_id))
    }

    pub fn contains(&self, key: &SelectionKey) -> bool {
        self.get(&key.selection_id, &key.event_id).is_some()
    }

    pub fn len(&self) -> usize {
        self.selections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selections.is_empty()
    }

    /// Whether the slip container should be shown.
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn max_selections(&self) -> usize {
        self.max_selections
    }

    // -- Mutations -------------------------------------------------------

    /// Insert a selection unless its pair is already present.
    pub fn add_selection(&mut self, selection: Selection) -> StoreOutcome {
        if self.contains(&selection.key()) {
            debug!(key = %selection.key(), "Duplicate selection ignored");
            return StoreOutcome::Rejected(RejectReason::Duplicate);
        }
        if selection.odds <= Decimal::ONE {
            debug!(key = %selection.key(), odds = %selection.odds, "Selection with invalid odds ignored");
            return StoreOutcome::Rejected(RejectReason::InvalidOdds);
        }
        if selection.stake <= Decimal::ZERO {
            debug!(key = %selection.key(), stake = %selection.stake, "Selection without stake ignored");
            return StoreOutcome::Rejected(RejectReason::NonPositiveStake);
        }
        if self.selections.len() >= self.max_selections {
            debug!(max = self.max_selections, "Slip full, selection ignored");
            return StoreOutcome::Rejected(RejectReason::SlipFull);
        }

        let key = selection.key();
        let (outcome, odds, stake) = (selection.outcome_kind, selection.odds, selection.stake);
        if !self.apply_in_range(|selections| selections.push(selection)) {
            debug!(key = %key, odds = %odds, stake = %stake, "Selection would overflow payouts, ignored");
            return StoreOutcome::Rejected(RejectReason::AmountTooLarge);
        }

        debug!(key = %key, outcome = %outcome, odds = %odds, stake = %stake, "Selection added");
        self.visible = true;
        StoreOutcome::Accepted
    }

    /// Delete the matching selection, hiding the slip when it empties.
    pub fn remove_selection(&mut self, selection_id: &str, event_id: &str) -> StoreOutcome {
        let Some(idx) = self
            .selections
            .iter()
            .position(|s| s.matches(selection_id, event_id))
        else {
            return StoreOutcome::Rejected(RejectReason::NotFound);
        };

        self.selections.remove(idx);
        if self.selections.is_empty() {
            self.visible = false;
        }
        debug!(selection_id, event_id, remaining = self.selections.len(), "Selection removed");
        StoreOutcome::Accepted
    }

    /// Update one selection's stake. Non-positive stakes are ignored.
    pub fn edit_stake(&mut self, selection_id: &str, event_id: &str, new_stake: Decimal) -> StoreOutcome {
        if new_stake <= Decimal::ZERO {
            return StoreOutcome::Rejected(RejectReason::NonPositiveStake);
        }
        let Some(idx) = self
            .selections
            .iter()
            .position(|s| s.matches(selection_id, event_id))
        else {
            return StoreOutcome::Rejected(RejectReason::NotFound);
        };

        if !self.apply_in_range(|selections| selections[idx].stake = new_stake) {
            debug!(selection_id, event_id, stake = %new_stake, "Stake would overflow payouts, ignored");
            return StoreOutcome::Rejected(RejectReason::AmountTooLarge);
        }
        debug!(selection_id, event_id, stake = %new_stake, "Stake edited");
        StoreOutcome::Accepted
    }

    /// Same as [`edit_stake`](Self::edit_stake) but from raw user input.
    pub fn edit_stake_input(&mut self, selection_id: &str, event_id: &str, input: &str) -> StoreOutcome {
        match parse_stake(input) {
            Ok(stake) => self.edit_stake(selection_id, event_id, stake),
            Err(reason) => StoreOutcome::Rejected(reason),
        }
    }

    /// Empty the slip unconditionally.
    pub fn clear(&mut self) -> StoreOutcome {
        let dropped = self.selections.len();
        self.selections.clear();
        self.visible = false;
        debug!(dropped, "Slip cleared");
        StoreOutcome::Accepted
    }

    /// Apply the same stake to every selection.
    pub fn set_uniform_stake(&mut self, amount: Decimal) -> StoreOutcome {
        if amount <= Decimal::ZERO {
            return StoreOutcome::Rejected(RejectReason::NonPositiveStake);
        }
        if self.selections.is_empty() {
            return StoreOutcome::Rejected(RejectReason::EmptySlip);
        }
        let applied = self.apply_in_range(|selections| {
            for selection in selections.iter_mut() {
                selection.stake = amount;
            }
        });
        if !applied {
            debug!(stake = %amount, "Uniform stake would overflow payouts, ignored");
            return StoreOutcome::Rejected(RejectReason::AmountTooLarge);
        }
        debug!(stake = %amount, count = self.selections.len(), "Uniform stake applied");
        StoreOutcome::Accepted
    }

    /// Apply `op`, rolling it back if any payout figure of the result overflows.
    fn apply_in_range<F>(&mut self, op: F) -> bool
    where
        F: FnOnce(&mut Vec<Selection>),
    {
        let before = self.selections.clone();
        op(&mut self.selections);
        if PayoutBreakdown::fits(&self.selections) {
            return true;
        }
        self.selections = before;
        false
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
