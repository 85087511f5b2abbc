//! Bet grading.
//!
//! Counts wrong predictions against final match results and maps them
//! to prize tiers. Grading here is advisory for display; the backend's
//! settlement remains the source of truth.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::types::{Match, PrizeDistribution, PrizeTier, Selection, Tournament};

// ---------------------------------------------------------------------------
// Graded slip
// ---------------------------------------------------------------------------

/// Outcome of grading one slip against the known match results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GradedSlip {
    /// Matches whose final result was covered by the chosen set.
    pub hits: u32,
    /// Finished matches whose result was not covered.
    pub wrong_predictions: u32,
    /// Matches that have no final result yet.
    pub undecided: u32,
    /// True once every match has a result.
    pub complete: bool,
}

impl GradedSlip {
    /// Prize tier for the current wrong-prediction count, once grading
    /// is complete. An incomplete grade never awards a tier.
    pub fn prize_tier(&self) -> Option<PrizeTier> {
        if !self.complete {
            return None;
        }
        PrizeTier::from_wrong_predictions(self.wrong_predictions)
    }
}

// ---------------------------------------------------------------------------
// Grading
// ---------------------------------------------------------------------------

/// Grade the selections against the matches' final results.
///
/// A match is a hit when its final result is contained in the chosen
/// set for that match. Matches without a result are left undecided; a
/// selection for a match not present in `matches` counts as undecided
/// as well (the backend owns the match list).
pub fn grade(selections: &[Selection], matches: &[Match]) -> GradedSlip {
    let mut hits = 0;
    let mut wrong = 0;
    let mut undecided = 0;

    for sel in selections {
        let decided = matches
            .iter()
            .find(|m| m.id == sel.match_id)
            .and_then(|m| if m.is_decided() { m.result } else { None });
        match decided {
            Some(result) if sel.covers(result) => hits += 1,
            Some(_) => wrong += 1,
            None => undecided += 1,
        }
    }

    GradedSlip {
        hits,
        wrong_predictions: wrong,
        undecided,
        complete: undecided == 0,
    }
}

/// Prize money for a tier under the tournament's distribution scheme.
///
/// Fixed tournaments pay the configured per-tier amount. Percentage
/// tournaments pay the configured share of `pool_total`, which the
/// caller supplies because the pool size lives on the backend.
pub fn prize_amount(
    tournament: &Tournament,
    tier: PrizeTier,
    pool_total: Decimal,
) -> Option<Decimal> {
    match tournament.prize_distribution_type {
        PrizeDistribution::Fixed => match tier {
            PrizeTier::Gold => tournament.prize_gold,
            PrizeTier::Silver => tournament.prize_silver,
            PrizeTier::Bronze => tournament.prize_bronze,
        },
        PrizeDistribution::Percentage => {
            let pct = match tier {
                PrizeTier::Gold => tournament.prize_gold_percentage,
                PrizeTier::Silver => tournament.prize_silver_percentage,
                PrizeTier::Bronze => tournament.prize_bronze_percentage,
            };
            pct.map(|p| pool_total * p / dec!(100))
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
