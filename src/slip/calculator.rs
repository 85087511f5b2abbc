//! Bet line calculation.
//!
//! Computes the line count, exact-decimal cost, and validity of a
//! prospective bet from the bettor's per-match selections and the
//! tournament's pricing limits. Pure and deterministic, no I/O.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{HallError, Selection, Tournament};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Pricing and limits for one tournament's bets.
///
/// Construction is validated: a malformed config is a misconfigured
/// tournament and is rejected up front rather than producing a
/// misleading quote later.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BettingConfig {
    line_price: Decimal,
    min_lines: u64,
    max_lines: u64,
}

impl BettingConfig {
    pub fn new(line_price: Decimal, min_lines: u64, max_lines: u64) -> Result<Self, HallError> {
        if line_price <= Decimal::ZERO {
            return Err(HallError::Config(format!(
                "line price must be positive, got {line_price}"
            )));
        }
        if min_lines < 1 {
            return Err(HallError::Config("minimum line count must be >= 1".into()));
        }
        if max_lines < min_lines {
            return Err(HallError::Config(format!(
                "maximum line count {max_lines} is below minimum {min_lines}"
            )));
        }
        Ok(Self {
            line_price,
            min_lines,
            max_lines,
        })
    }

    pub fn line_price(&self) -> Decimal {
        self.line_price
    }

    pub fn min_lines(&self) -> u64 {
        self.min_lines
    }

    pub fn max_lines(&self) -> u64 {
        self.max_lines
    }
}

impl Tournament {
    /// Extract this tournament's validated betting configuration.
    pub fn betting_config(&self) -> Result<BettingConfig, HallError> {
        BettingConfig::new(self.line_price, self.min_lines, self.max_lines)
    }
}

// ---------------------------------------------------------------------------
// Quote
// ---------------------------------------------------------------------------

/// Why a quote is not placeable.
///
/// Completeness is checked before the line bounds: an incomplete bet's
/// line count is not meaningful for bound-checking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvalidReason {
    Incomplete,
    TooFewLines,
    TooManyLines,
}

/// The calculator's verdict on the current selections.
///
/// Advisory only: the backend recomputes and remains the source of
/// truth for acceptance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BetQuote {
    pub total_lines: u64,
    pub total_cost: Decimal,
    pub valid: bool,
    #[serde(default)]
    pub reason: Option<InvalidReason>,
}

impl BetQuote {
    fn invalid(total_lines: u64, total_cost: Decimal, reason: InvalidReason) -> Self {
        Self {
            total_lines,
            total_cost,
            valid: false,
            reason: Some(reason),
        }
    }
}

// ---------------------------------------------------------------------------
// Evaluation
// ---------------------------------------------------------------------------

/// Quote the bet described by `selections` against `config`.
///
/// `total_matches` is the number of matches in the tournament; every
/// one of them must carry at least one chosen outcome for the bet to
/// be valid. The line count is the product of per-match chosen-outcome
/// counts over the active selections (one line = one fully specified
/// combination of outcomes). The product saturates at `u64::MAX`,
/// which is above any configurable maximum.
pub fn evaluate(selections: &[Selection], config: &BettingConfig, total_matches: usize) -> BetQuote {
    let active: Vec<&Selection> = selections.iter().filter(|s| s.is_active()).collect();

    if active.is_empty() {
        return BetQuote::invalid(0, Decimal::ZERO, InvalidReason::Incomplete);
    }

    let total_lines = active
        .iter()
        .fold(1u64, |acc, s| acc.saturating_mul(s.outcome_count()));
    let total_cost = Decimal::from(total_lines) * config.line_price;

    if active.len() != total_matches {
        return BetQuote::invalid(total_lines, total_cost, InvalidReason::Incomplete);
    }
    if total_lines < config.min_lines {
        return BetQuote::invalid(total_lines, total_cost, InvalidReason::TooFewLines);
    }
    if total_lines > config.max_lines {
        return BetQuote::invalid(total_lines, total_cost, InvalidReason::TooManyLines);
    }

    BetQuote {
        total_lines,
        total_cost,
        valid: true,
        reason: None,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
