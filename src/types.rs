//! Shared types for the POOLHALL service.
//!
//! These types form the data model used across all modules. They mirror
//! the wire shapes of the tournament backend (camelCase JSON, "1"/"X"/"2"
//! outcome codes) so that backend responses deserialize directly into the
//! domain model without adapter layers.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ---------------------------------------------------------------------------
// Outcome
// ---------------------------------------------------------------------------

/// One of the three possible results of a match: home win, draw, away win.
///
/// The wire form is the classic 1X2 code used by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    #[serde(rename = "1")]
    Home,
    #[serde(rename = "X")]
    Draw,
    #[serde(rename = "2")]
    Away,
}

impl Outcome {
    pub const ALL: [Outcome; 3] = [Outcome::Home, Outcome::Draw, Outcome::Away];

    /// The 1X2 wire code for this outcome.
    pub fn code(&self) -> &'static str {
        match self {
            Outcome::Home => "1",
            Outcome::Draw => "X",
            Outcome::Away => "2",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for Outcome {
    type Err = HallError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "1" => Ok(Outcome::Home),
            "X" | "x" => Ok(Outcome::Draw),
            "2" => Ok(Outcome::Away),
            other => Err(HallError::InvalidOutcome(other.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Match
// ---------------------------------------------------------------------------

/// Lifecycle status of a single match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchStatus {
    Scheduled,
    Live,
    Finished,
    Cancelled,
    Postponed,
}

impl fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MatchStatus::Scheduled => "scheduled",
            MatchStatus::Live => "live",
            MatchStatus::Finished => "finished",
            MatchStatus::Cancelled => "cancelled",
            MatchStatus::Postponed => "postponed",
        };
        write!(f, "{s}")
    }
}

/// Sport discipline of a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SportType {
    Football,
    Volleyball,
    Basketball,
}

impl fmt::Display for SportType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SportType::Football => "football",
            SportType::Volleyball => "volleyball",
            SportType::Basketball => "basketball",
        };
        write!(f, "{s}")
    }
}

/// A single match within a tournament.
///
/// Matches are read-only from the bettor's perspective; the backend owns
/// scheduling, scores, and the final result.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Match {
    pub id: u64,
    pub tournament_id: u64,
    pub home_team: String,
    pub away_team: String,
    pub starts_at: DateTime<Utc>,
    pub sport_type: SportType,
    pub status: MatchStatus,
    /// Final 1X2 result, present once the match is finished.
    #[serde(default)]
    pub result: Option<Outcome>,
    #[serde(default)]
    pub home_score: Option<u32>,
    #[serde(default)]
    pub away_score: Option<u32>,
    /// Ordinal position of the match within its tournament's slip.
    pub match_order: u32,
}

impl Match {
    /// Whether the match has a final result that can be graded against.
    pub fn is_decided(&self) -> bool {
        self.status == MatchStatus::Finished && self.result.is_some()
    }

    #[cfg(test)]
    pub fn sample(id: u64, match_order: u32) -> Self {
        Self {
            id,
            tournament_id: 1,
            home_team: format!("Home {id}"),
            away_team: format!("Away {id}"),
            starts_at: Utc::now() + chrono::Duration::days(1),
            sport_type: SportType::Football,
            status: MatchStatus::Scheduled,
            result: None,
            home_score: None,
            away_score: None,
            match_order,
        }
    }
}

impl fmt::Display for Match {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "#{} {} vs {} ({}, {})",
            self.match_order, self.home_team, self.away_team, self.sport_type, self.status,
        )
    }
}

// ---------------------------------------------------------------------------
// Tournament
// ---------------------------------------------------------------------------

/// Lifecycle status of a tournament pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TournamentStatus {
    Draft,
    Active,
    Closed,
    Settled,
    Cancelled,
}

impl fmt::Display for TournamentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TournamentStatus::Draft => "draft",
            TournamentStatus::Active => "active",
            TournamentStatus::Closed => "closed",
            TournamentStatus::Settled => "settled",
            TournamentStatus::Cancelled => "cancelled",
        };
        write!(f, "{s}")
    }
}

/// How prize money is split between tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrizeDistribution {
    /// Each tier pays a fixed configured amount.
    Fixed,
    /// Each tier pays a percentage of the tournament's prize pool.
    Percentage,
}

/// Prize tier a settled bet can land in, by number of wrong predictions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrizeTier {
    Gold,
    Silver,
    Bronze,
}

impl PrizeTier {
    /// Tier for a given wrong-prediction count. Three or more misses
    /// wins nothing.
    pub fn from_wrong_predictions(wrong: u32) -> Option<Self> {
        match wrong {
            0 => Some(PrizeTier::Gold),
            1 => Some(PrizeTier::Silver),
            2 => Some(PrizeTier::Bronze),
            _ => None,
        }
    }
}

impl fmt::Display for PrizeTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PrizeTier::Gold => "gold",
            PrizeTier::Silver => "silver",
            PrizeTier::Bronze => "bronze",
        };
        write!(f, "{s}")
    }
}

/// A tournament pool: a set of matches bet on together as one slip.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tournament {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    /// No bets are accepted at or after this instant.
    pub cutoff_time: DateTime<Utc>,
    pub line_price: Decimal,
    pub min_lines: u64,
    pub max_lines: u64,
    pub status: TournamentStatus,
    pub prize_distribution_type: PrizeDistribution,
    #[serde(default)]
    pub prize_gold: Option<Decimal>,
    #[serde(default)]
    pub prize_silver: Option<Decimal>,
    #[serde(default)]
    pub prize_bronze: Option<Decimal>,
    #[serde(default)]
    pub prize_gold_percentage: Option<Decimal>,
    #[serde(default)]
    pub prize_silver_percentage: Option<Decimal>,
    #[serde(default)]
    pub prize_bronze_percentage: Option<Decimal>,
}

impl Tournament {
    /// Whether bets are currently accepted: the tournament must be
    /// active and the cutoff not yet reached.
    pub fn is_open_for_betting(&self, now: DateTime<Utc>) -> bool {
        self.status == TournamentStatus::Active && now < self.cutoff_time
    }

    /// Time remaining until the betting cutoff, if any.
    pub fn time_to_cutoff(&self, now: DateTime<Utc>) -> Option<chrono::Duration> {
        if now < self.cutoff_time {
            Some(self.cutoff_time - now)
        } else {
            None
        }
    }

    #[cfg(test)]
    pub fn sample() -> Self {
        use rust_decimal_macros::dec;
        let now = Utc::now();
        Self {
            id: 1,
            name: "Test Cup".to_string(),
            description: Some("Sample tournament".to_string()),
            start_date: now + chrono::Duration::days(3),
            end_date: now + chrono::Duration::days(10),
            cutoff_time: now + chrono::Duration::days(2),
            line_price: dec!(1.6),
            min_lines: 1,
            max_lines: 10_000,
            status: TournamentStatus::Active,
            prize_distribution_type: PrizeDistribution::Fixed,
            prize_gold: Some(dec!(5000)),
            prize_silver: Some(dec!(500)),
            prize_bronze: Some(dec!(50)),
            prize_gold_percentage: None,
            prize_silver_percentage: None,
            prize_bronze_percentage: None,
        }
    }
}

impl fmt::Display for Tournament {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}, line price {}, {}..{} lines)",
            self.name, self.status, self.line_price, self.min_lines, self.max_lines,
        )
    }
}

// ---------------------------------------------------------------------------
// Selection
// ---------------------------------------------------------------------------

/// The set of outcomes a bettor has chosen for one match.
///
/// An empty set means the match has not been filled in yet. Outcomes are
/// kept deduplicated; ordering within the set carries no meaning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Selection {
    pub match_id: u64,
    pub selected_results: Vec<Outcome>,
}

impl Selection {
    pub fn empty(match_id: u64) -> Self {
        Self {
            match_id,
            selected_results: Vec::new(),
        }
    }

    /// A selection participates in the bet once at least one outcome is
    /// chosen.
    pub fn is_active(&self) -> bool {
        !self.selected_results.is_empty()
    }

    /// Number of distinct outcomes chosen.
    pub fn outcome_count(&self) -> u64 {
        Outcome::ALL
            .iter()
            .filter(|o| self.selected_results.contains(o))
            .count() as u64
    }

    /// Whether the chosen set covers the given outcome.
    pub fn covers(&self, outcome: Outcome) -> bool {
        self.selected_results.contains(&outcome)
    }

    /// Add the outcome if absent, remove it if present.
    pub fn toggle(&mut self, outcome: Outcome) {
        if let Some(pos) = self.selected_results.iter().position(|o| *o == outcome) {
            self.selected_results.remove(pos);
        } else {
            self.selected_results.push(outcome);
        }
    }

    /// Replace the chosen set, deduplicating into 1/X/2 order.
    pub fn set_outcomes(&mut self, outcomes: &[Outcome]) {
        self.selected_results = Outcome::ALL
            .iter()
            .copied()
            .filter(|o| outcomes.contains(o))
            .collect();
    }
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let codes: Vec<&str> = self.selected_results.iter().map(|o| o.code()).collect();
        write!(f, "match {}: [{}]", self.match_id, codes.join(", "))
    }
}

// ---------------------------------------------------------------------------
// Bet
// ---------------------------------------------------------------------------

/// Payload sent to the backend when placing a bet.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BetSubmission {
    pub tournament_id: u64,
    pub selections: Vec<Selection>,
}

/// Settlement status of a placed bet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BetStatus {
    Pending,
    Won,
    Lost,
    Refunded,
}

impl fmt::Display for BetStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BetStatus::Pending => "pending",
            BetStatus::Won => "won",
            BetStatus::Lost => "lost",
            BetStatus::Refunded => "refunded",
        };
        write!(f, "{s}")
    }
}

/// One match's selection inside a persisted bet, with grading info once
/// the backend has settled the match.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BetSelection {
    pub match_id: u64,
    pub selected_results: Vec<Outcome>,
    #[serde(default)]
    pub is_winning: Option<bool>,
}

/// A bet as persisted by the backend. Read-only on this side; shown in
/// the my-bets view.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bet {
    pub id: u64,
    pub tournament_id: u64,
    pub total_lines: u64,
    pub total_amount: Decimal,
    pub line_price: Decimal,
    pub status: BetStatus,
    #[serde(default)]
    pub wrong_predictions: Option<u32>,
    #[serde(default)]
    pub prize_group: Option<PrizeTier>,
    #[serde(default)]
    pub prize_amount: Option<Decimal>,
    #[serde(default)]
    pub is_paid: bool,
    pub selections: Vec<BetSelection>,
    pub created_at: DateTime<Utc>,
}

impl fmt::Display for Bet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "bet #{} on tournament {}: {} lines for {} ({})",
            self.id, self.tournament_id, self.total_lines, self.total_amount, self.status,
        )
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Domain errors for the POOLHALL service.
#[derive(Debug, thiserror::Error)]
pub enum HallError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid outcome code: {0:?} (expected 1, X or 2)")]
    InvalidOutcome(String),

    #[error("Unknown match id: {0}")]
    UnknownMatch(u64),

    #[error("Betting is closed for tournament {0}")]
    BettingClosed(u64),

    #[error("Invalid bet: {0}")]
    InvalidQuote(String),

    #[error("Backend error ({endpoint}): {message}")]
    Backend { endpoint: String, message: String },

    #[error("Storage error: {0}")]
    Storage(String),
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
