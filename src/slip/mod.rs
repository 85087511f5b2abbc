//! Slip assembly.
//!
//! A slip is the bettor's in-progress bet for one tournament: one
//! selection slot per match, mutated by toggling outcomes, quoted on
//! every change, and turned into a submission once valid.

pub mod calculator;
pub mod grading;

use tracing::debug;

use crate::types::{BetSubmission, HallError, Match, Outcome, Selection};

pub use calculator::{evaluate, BetQuote, BettingConfig, InvalidReason};

// ---------------------------------------------------------------------------
// Slip builder
// ---------------------------------------------------------------------------

/// In-progress selections for one tournament's slip.
///
/// Holds one selection slot per match, ordered by the tournament's
/// match order. Unknown match ids are rejected at the mutation
/// boundary so a quote can never be computed over a selection the
/// tournament does not contain.
#[derive(Debug, Clone)]
pub struct SlipBuilder {
    config: BettingConfig,
    selections: Vec<Selection>,
}

impl SlipBuilder {
    /// Build an empty slip over the tournament's matches.
    ///
    /// Matches are sorted by `match_order`; each gets an empty
    /// selection slot.
    pub fn new(config: BettingConfig, matches: &[Match]) -> Self {
        let mut ordered: Vec<&Match> = matches.iter().collect();
        ordered.sort_by_key(|m| m.match_order);
        let selections = ordered.iter().map(|m| Selection::empty(m.id)).collect();
        Self { config, selections }
    }

    pub fn config(&self) -> &BettingConfig {
        &self.config
    }

    /// Current selections, one per match in slip order.
    pub fn selections(&self) -> &[Selection] {
        &self.selections
    }

    /// Add or remove one outcome on one match.
    pub fn toggle(&mut self, match_id: u64, outcome: Outcome) -> Result<BetQuote, HallError> {
        let sel = self
            .selections
            .iter_mut()
            .find(|s| s.match_id == match_id)
            .ok_or(HallError::UnknownMatch(match_id))?;
        sel.toggle(outcome);
        let quote = self.quote();
        debug!(
            match_id,
            outcome = %outcome,
            total_lines = quote.total_lines,
            valid = quote.valid,
            "Selection toggled"
        );
        Ok(quote)
    }

    /// Replace one match's chosen outcome set. Used when restoring a
    /// saved draft.
    pub fn set_selection(&mut self, match_id: u64, outcomes: &[Outcome]) -> Result<(), HallError> {
        let sel = self
            .selections
            .iter_mut()
            .find(|s| s.match_id == match_id)
            .ok_or(HallError::UnknownMatch(match_id))?;
        sel.set_outcomes(outcomes);
        Ok(())
    }

    /// Quote the current selections. Stateless recompute.
    pub fn quote(&self) -> BetQuote {
        evaluate(&self.selections, &self.config, self.selections.len())
    }

    /// Produce the backend payload for the current selections.
    ///
    /// Only valid quotes may be submitted; the active selections are
    /// forwarded and the backend recomputes the price on its side.
    pub fn submission(&self, tournament_id: u64) -> Result<BetSubmission, HallError> {
        let quote = self.quote();
        if !quote.valid {
            return Err(HallError::InvalidQuote(match quote.reason {
                Some(InvalidReason::Incomplete) => "not every match has a selection".to_string(),
                Some(InvalidReason::TooFewLines) => {
                    format!("{} lines is below the minimum", quote.total_lines)
                }
                Some(InvalidReason::TooManyLines) => {
                    format!("{} lines exceeds the maximum", quote.total_lines)
                }
                None => "quote is not valid".to_string(),
            }));
        }
        Ok(BetSubmission {
            tournament_id,
            selections: self
                .selections
                .iter()
                .filter(|s| s.is_active())
                .cloned()
                .collect(),
        })
    }

    /// Reset every selection to empty.
    pub fn clear(&mut self) {
        for sel in &mut self.selections {
            sel.selected_results.clear();
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
