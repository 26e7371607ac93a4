//! Payout calculation.
//!
//! Derives simple-bet and parlay figures from a slip snapshot:
//!
//!   simple payout   = Σ stake_i × odds_i
//!   combined odds   = Π odds_i                (parlay, ≥ 2 legs only)
//!   combined payout = min(stake_i) × combined odds
//!
//! The parlay uses the smallest stake on the slip as its single stake.
//! All arithmetic is checked: a figure that leaves the `Decimal` range is
//! reported as `None` by the free functions and saturates at
//! `Decimal::MAX` in [`PayoutBreakdown`], which flags it as `overflowed`.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::types::{Selection, SelectionKey};

/// Minimum number of legs for a parlay.
pub const MIN_PARLAY_LEGS: usize = 2;

/// Payout of one selection taken as a simple bet.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegPayout {
    pub key: SelectionKey,
    pub stake: Decimal,
    pub odds: Decimal,
    pub payout: Decimal,
}

/// All payout figures for a slip.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PayoutBreakdown {
    pub legs: Vec<LegPayout>,
    pub total_stake: Decimal,
    pub potential_payout_simple: Decimal,
    /// Zero unless `parlay_eligible`.
    pub combined_odds: Decimal,
    /// Zero unless `parlay_eligible`.
    pub combined_payout: Decimal,
    pub parlay_eligible: bool,
    /// Some figure did not fit in a `Decimal` and was saturated.
    pub overflowed: bool,
}

impl PayoutBreakdown {
    /// Compute every figure from scratch. Never panics.
    pub fn calculate(selections: &[Selection]) -> Self {
        let mut overflowed = false;

        let legs: Vec<LegPayout> = selections
            .iter()
            .map(|s| LegPayout {
                key: s.key(),
                stake: s.stake,
                odds: s.odds,
                payout: saturate(s.payout(), &mut overflowed),
            })
            .collect();

        let total_stake = saturate(total_stake(selections), &mut overflowed);
        let potential_payout_simple = saturate(potential_payout_simple(selections), &mut overflowed);

        let parlay_eligible = is_parlay_eligible(selections);
        let (combined_odds, combined_payout) = if parlay_eligible {
            (
                saturate(combined_odds(selections), &mut overflowed),
                saturate(combined_payout(selections), &mut overflowed),
            )
        } else {
            (Decimal::ZERO, Decimal::ZERO)
        };

        Self {
            legs,
            total_stake,
            potential_payout_simple,
            combined_odds,
            combined_payout,
            parlay_eligible,
            overflowed,
        }
    }

    /// Whether every figure of `selections` fits in a `Decimal`.
    pub fn fits(selections: &[Selection]) -> bool {
        !Self::calculate(selections).overflowed
    }
}

fn saturate(value: Option<Decimal>, overflowed: &mut bool) -> Decimal {
    value.unwrap_or_else(|| {
        *overflowed = true;
        Decimal::MAX
    })
}

/// Sum of all stakes, or `None` on overflow.
pub fn total_stake(selections: &[Selection]) -> Option<Decimal> {
    selections
        .iter()
        .try_fold(Decimal::ZERO, |acc, s| acc.checked_add(s.stake))
}

/// Sum of every leg's payout, or `None` on overflow.
pub fn potential_payout_simple(selections: &[Selection]) -> Option<Decimal> {
    selections
        .iter()
        .try_fold(Decimal::ZERO, |acc, s| acc.checked_add(s.payout()?))
}

pub fn is_parlay_eligible(selections: &[Selection]) -> bool {
    selections.len() >= MIN_PARLAY_LEGS
}

/// Product of all odds, or `None` below two legs or on overflow.
pub fn combined_odds(selections: &[Selection]) -> Option<Decimal> {
    if !is_parlay_eligible(selections) {
        return None;
    }
    selections
        .iter()
        .try_fold(Decimal::ONE, |acc, s| acc.checked_mul(s.odds))
}

/// Smallest stake on the slip times the combined odds, or `None` below two
/// legs or on overflow.
pub fn combined_payout(selections: &[Selection]) -> Option<Decimal> {
    let odds = combined_odds(selections)?;
    let stake = selections.iter().map(|s| s.stake).min()?;
    stake.checked_mul(odds)
}
