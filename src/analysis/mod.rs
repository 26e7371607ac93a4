//! Derived read model.
//!
//! Pure functions over a slip snapshot: conflict detection and payout
//! calculation, combined with the gate's status into the single
//! [`SlipSummary`] the UI renders. Nothing here is cached; every summary
//! is re-derived from the live slip.

pub mod conflict;
pub mod payout;

use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt;

use crate::engine::gate::SubmissionGate;
use crate::store::SelectionStore;
use payout::PayoutBreakdown;

/// Everything the UI shows about the slip.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SlipSummary {
    pub total_stake: Decimal,
    pub potential_payout_simple: Decimal,
    pub combined_odds: Decimal,
    pub combined_payout: Decimal,
    pub parlay_eligible: bool,
    /// Sorted.
    pub conflicted_event_ids: Vec<String>,
    pub selection_count: usize,
    /// Capacity of the slip, for "n of max" displays.
    pub max_selections: usize,
    pub is_visible: bool,
    pub is_submitting: bool,
    pub last_error: Option<String>,
}

impl SlipSummary {
    pub fn derive(store: &SelectionStore, gate: &SubmissionGate) -> Self {
        let selections = store.selections();
        let payout = PayoutBreakdown::calculate(selections);

        Self {
            total_stake: payout.total_stake,
            potential_payout_simple: payout.potential_payout_simple,
            combined_odds: payout.combined_odds,
            combined_payout: payout.combined_payout,
            parlay_eligible: payout.parlay_eligible,
            conflicted_event_ids: conflict::conflicted_event_ids(selections)
                .into_iter()
                .collect(),
            selection_count: selections.len(),
            max_selections: store.max_selections(),
            is_visible: store.is_visible(),
            is_submitting: gate.is_submitting(),
            last_error: gate.last_error().map(str::to_string),
        }
    }

    /// Whether the conflict warning banner should be shown.
    pub fn has_conflicts(&self) -> bool {
        !self.conflicted_event_ids.is_empty()
    }
}

impl fmt::Display for SlipSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} selections | stake=${:.2} | simple=${:.2}",
            self.selection_count, self.total_stake, self.potential_payout_simple,
        )?;
        if self.parlay_eligible {
            write!(
                f,
                " | parlay @ {:.2} = ${:.2}",
                self.combined_odds, self.combined_payout
            )?;
        }
        if self.has_conflicts() {
            write!(f, " | conflicts: {}", self.conflicted_event_ids.join(","))?;
        }
        Ok(())
    }
}
