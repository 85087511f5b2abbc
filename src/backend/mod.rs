//! Tournament backend integration.
//!
//! Defines the `TournamentBackend` trait over the external REST backend
//! that owns tournaments, matches, bets, and balances. This service is
//! a thin client: it reads, quotes locally, and submits; the backend
//! recomputes and settles.

pub mod rest;

use anyhow::Result;
use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::types::{Bet, BetSubmission, Match, Tournament};

pub use rest::RestBackend;

/// Filter for the my-bets listing, forwarded to the backend as a JSON
/// `filters` query parameter.
#[derive(Debug, Clone, Default, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BetFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tournament_id: Option<u64>,
}

impl BetFilter {
    pub fn is_empty(&self) -> bool {
        self.status.is_none() && self.tournament_id.is_none()
    }
}

/// Abstraction over the tournament backend.
///
/// Implementors provide tournament/match retrieval, bet submission, and
/// account lookups. The production implementation is `RestBackend`;
/// tests substitute a deterministic in-memory one.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TournamentBackend: Send + Sync {
    /// Fetch one tournament by id.
    async fn fetch_tournament(&self, id: u64) -> Result<Tournament>;

    /// Fetch all tournaments currently open in the backend's view.
    async fn fetch_active_tournaments(&self) -> Result<Vec<Tournament>>;

    /// Fetch a tournament's matches, sorted by match order.
    async fn fetch_matches(&self, tournament_id: u64) -> Result<Vec<Match>>;

    /// Submit a bet. The backend recomputes lines and price and is the
    /// source of truth for acceptance.
    async fn submit_bet(&self, submission: &BetSubmission) -> Result<Bet>;

    /// Fetch the caller's bets, optionally filtered.
    async fn fetch_my_bets(&self, filter: &BetFilter) -> Result<Vec<Bet>>;

    /// Fetch the caller's available balance.
    async fn fetch_balance(&self) -> Result<Decimal>;
}
