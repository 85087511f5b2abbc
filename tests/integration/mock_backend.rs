//! Mock backend for integration testing.
//!
//! Provides a deterministic `TournamentBackend` implementation that
//! returns known tournaments and matches, accepts bets, and tracks a
//! balance, all in-memory with no external dependencies.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use poolhall::backend::{BetFilter, TournamentBackend};
use poolhall::types::*;

/// A mock tournament backend for deterministic testing.
///
/// All state is in-memory. Tournaments, matches, bets, and the balance
/// are fully controllable from test code. Handles to the mutable state
/// survive moving the mock into a `Box<dyn TournamentBackend>`.
pub struct MockBackend {
    tournaments: Vec<Tournament>,
    matches: HashMap<u64, Vec<Match>>,
    bets: Arc<Mutex<Vec<Bet>>>,
    balance: Arc<Mutex<Decimal>>,
    next_bet_id: Arc<Mutex<u64>>,
    /// If set, all operations will return this error.
    force_error: Arc<Mutex<Option<String>>>,
}

impl MockBackend {
    /// Create a new mock backend with the default fixture and a
    /// starting balance of 500.
    pub fn new() -> Self {
        let (tournaments, matches) = Self::default_fixture();
        Self {
            tournaments,
            matches,
            bets: Arc::new(Mutex::new(Vec::new())),
            balance: Arc::new(Mutex::new(dec!(500))),
            next_bet_id: Arc::new(Mutex::new(1)),
            force_error: Arc::new(Mutex::new(None)),
        }
    }

    /// Force all subsequent operations to return an error.
    pub fn set_error(&self, msg: &str) {
        *self.force_error.lock().unwrap() = Some(msg.to_string());
    }

    /// Clear any forced error.
    pub fn clear_error(&self) {
        *self.force_error.lock().unwrap() = None;
    }

    /// Handle to the bets recorded so far; stays valid after the mock
    /// is boxed into server state.
    pub fn bets_handle(&self) -> Arc<Mutex<Vec<Bet>>> {
        self.bets.clone()
    }

    /// Handle to the balance.
    pub fn balance_handle(&self) -> Arc<Mutex<Decimal>> {
        self.balance.clone()
    }

    fn tournament(&self, id: u64) -> Result<&Tournament> {
        self.tournaments
            .iter()
            .find(|t| t.id == id)
            .ok_or_else(|| anyhow!("Tournament not found: {id}"))
    }

    fn build_match(
        id: u64,
        tournament_id: u64,
        home: &str,
        away: &str,
        match_order: u32,
        starts_at: chrono::DateTime<Utc>,
    ) -> Match {
        Match {
            id,
            tournament_id,
            home_team: home.to_string(),
            away_team: away.to_string(),
            starts_at,
            sport_type: SportType::Football,
            status: MatchStatus::Scheduled,
            result: None,
            home_score: None,
            away_score: None,
            match_order,
        }
    }

    fn build_tournament(
        id: u64,
        name: &str,
        status: TournamentStatus,
        cutoff_time: chrono::DateTime<Utc>,
        line_price: Decimal,
        min_lines: u64,
        max_lines: u64,
    ) -> Tournament {
        Tournament {
            id,
            name: name.to_string(),
            description: None,
            start_date: cutoff_time + Duration::hours(1),
            end_date: cutoff_time + Duration::days(7),
            cutoff_time,
            line_price,
            min_lines,
            max_lines,
            status,
            prize_distribution_type: PrizeDistribution::Fixed,
            prize_gold: Some(dec!(5000)),
            prize_silver: Some(dec!(500)),
            prize_bronze: Some(dec!(50)),
            prize_gold_percentage: None,
            prize_silver_percentage: None,
            prize_bronze_percentage: None,
        }
    }

    /// A default set of tournaments with known betting parameters:
    /// one open, one closed, one with a tight line maximum, and one
    /// with a high line minimum.
    fn default_fixture() -> (Vec<Tournament>, HashMap<u64, Vec<Match>>) {
        let now = Utc::now();
        let open_cutoff = now + Duration::days(2);
        let past_cutoff = now - Duration::days(1);

        let tournaments = vec![
            Self::build_tournament(
                1,
                "Friday Football Pool",
                TournamentStatus::Active,
                open_cutoff,
                dec!(1.6),
                1,
                10_000,
            ),
            Self::build_tournament(
                2,
                "Last Week Cup",
                TournamentStatus::Closed,
                past_cutoff,
                dec!(2),
                1,
                10_000,
            ),
            Self::build_tournament(
                3,
                "Tight Cap Pool",
                TournamentStatus::Active,
                open_cutoff,
                dec!(1),
                1,
                4,
            ),
            Self::build_tournament(
                4,
                "High Stakes Pool",
                TournamentStatus::Active,
                open_cutoff,
                dec!(5),
                5,
                10_000,
            ),
        ];

        let mut matches = HashMap::new();
        matches.insert(
            1,
            vec![
                Self::build_match(11, 1, "Arsenal", "Chelsea", 1, open_cutoff + Duration::hours(2)),
                Self::build_match(12, 1, "Liverpool", "Everton", 2, open_cutoff + Duration::hours(4)),
                Self::build_match(13, 1, "Leeds", "Burnley", 3, open_cutoff + Duration::hours(6)),
            ],
        );
        matches.insert(
            2,
            vec![
                Self::build_match(21, 2, "Lazio", "Roma", 1, past_cutoff + Duration::hours(2)),
                Self::build_match(22, 2, "Inter", "Milan", 2, past_cutoff + Duration::hours(4)),
            ],
        );
        matches.insert(
            3,
            vec![
                Self::build_match(31, 3, "Ajax", "PSV", 1, open_cutoff + Duration::hours(2)),
                Self::build_match(32, 3, "Feyenoord", "Utrecht", 2, open_cutoff + Duration::hours(4)),
                Self::build_match(33, 3, "Twente", "Vitesse", 3, open_cutoff + Duration::hours(6)),
            ],
        );
        matches.insert(
            4,
            vec![
                Self::build_match(41, 4, "Porto", "Benfica", 1, open_cutoff + Duration::hours(2)),
                Self::build_match(42, 4, "Sporting", "Braga", 2, open_cutoff + Duration::hours(4)),
            ],
        );

        (tournaments, matches)
    }
}

#[async_trait]
impl TournamentBackend for MockBackend {
    async fn fetch_tournament(&self, id: u64) -> Result<Tournament> {
        if let Some(err) = self.force_error.lock().unwrap().as_ref() {
            return Err(anyhow!("{}", err));
        }
        self.tournament(id).cloned()
    }

    async fn fetch_active_tournaments(&self) -> Result<Vec<Tournament>> {
        if let Some(err) = self.force_error.lock().unwrap().as_ref() {
            return Err(anyhow!("{}", err));
        }
        Ok(self
            .tournaments
            .iter()
            .filter(|t| t.status == TournamentStatus::Active)
            .cloned()
            .collect())
    }

    async fn fetch_matches(&self, tournament_id: u64) -> Result<Vec<Match>> {
        if let Some(err) = self.force_error.lock().unwrap().as_ref() {
            return Err(anyhow!("{}", err));
        }
        let mut matches = self
            .matches
            .get(&tournament_id)
            .ok_or_else(|| anyhow!("Tournament not found: {tournament_id}"))?
            .clone();
        matches.sort_by_key(|m| m.match_order);
        Ok(matches)
    }

    async fn submit_bet(&self, submission: &BetSubmission) -> Result<Bet> {
        if let Some(err) = self.force_error.lock().unwrap().as_ref() {
            return Err(anyhow!("{}", err));
        }

        let tournament = self.tournament(submission.tournament_id)?;
        if !tournament.is_open_for_betting(Utc::now()) {
            return Err(anyhow!(
                "Betting is closed for tournament {}",
                tournament.id
            ));
        }

        // The backend is the source of truth: recompute lines and
        // price from the submitted selections.
        let match_count = self
            .matches
            .get(&tournament.id)
            .map(|m| m.len())
            .unwrap_or(0);
        let active: Vec<&Selection> = submission
            .selections
            .iter()
            .filter(|s| s.is_active())
            .collect();
        if active.len() != match_count {
            return Err(anyhow!(
                "Incomplete bet: {} of {} matches selected",
                active.len(),
                match_count
            ));
        }

        let total_lines = active
            .iter()
            .fold(1u64, |acc, s| acc.saturating_mul(s.outcome_count()));
        if total_lines < tournament.min_lines || total_lines > tournament.max_lines {
            return Err(anyhow!(
                "Line count {total_lines} outside allowed range {}..{}",
                tournament.min_lines,
                tournament.max_lines
            ));
        }

        let total_amount = Decimal::from(total_lines) * tournament.line_price;
        let mut balance = self.balance.lock().unwrap();
        if *balance < total_amount {
            return Err(anyhow!(
                "Insufficient balance: need {total_amount}, have {}",
                *balance
            ));
        }
        *balance -= total_amount;

        let mut next_id = self.next_bet_id.lock().unwrap();
        let bet = Bet {
            id: *next_id,
            tournament_id: tournament.id,
            total_lines,
            total_amount,
            line_price: tournament.line_price,
            status: BetStatus::Pending,
            wrong_predictions: None,
            prize_group: None,
            prize_amount: None,
            is_paid: false,
            selections: submission
                .selections
                .iter()
                .map(|s| BetSelection {
                    match_id: s.match_id,
                    selected_results: s.selected_results.clone(),
                    is_winning: None,
                })
                .collect(),
            created_at: Utc::now(),
        };
        *next_id += 1;

        self.bets.lock().unwrap().push(bet.clone());
        Ok(bet)
    }

    async fn fetch_my_bets(&self, filter: &BetFilter) -> Result<Vec<Bet>> {
        if let Some(err) = self.force_error.lock().unwrap().as_ref() {
            return Err(anyhow!("{}", err));
        }
        Ok(self
            .bets
            .lock()
            .unwrap()
            .iter()
            .filter(|b| {
                filter
                    .status
                    .as_ref()
                    .map_or(true, |s| b.status.to_string() == *s)
            })
            .filter(|b| {
                filter
                    .tournament_id
                    .map_or(true, |id| b.tournament_id == id)
            })
            .cloned()
            .collect())
    }

    async fn fetch_balance(&self) -> Result<Decimal> {
        if let Some(err) = self.force_error.lock().unwrap().as_ref() {
            return Err(anyhow!("{}", err));
        }
        Ok(*self.balance.lock().unwrap())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn full_submission(tournament_id: u64, match_ids: &[u64]) -> BetSubmission {
        BetSubmission {
            tournament_id,
            selections: match_ids
                .iter()
                .map(|&id| Selection {
                    match_id: id,
                    selected_results: vec![Outcome::Home],
                })
                .collect(),
        }
    }

    #[tokio::test]
    async fn test_active_tournaments_exclude_closed() {
        let backend = MockBackend::new();
        let tournaments = backend.fetch_active_tournaments().await.unwrap();
        assert_eq!(tournaments.len(), 3);
        assert!(tournaments.iter().all(|t| t.id != 2));
    }

    #[tokio::test]
    async fn test_matches_sorted_by_order() {
        let backend = MockBackend::new();
        let matches = backend.fetch_matches(1).await.unwrap();
        assert_eq!(matches.len(), 3);
        let orders: Vec<u32> = matches.iter().map(|m| m.match_order).collect();
        assert_eq!(orders, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_submit_bet_records_and_charges() {
        let backend = MockBackend::new();
        let recorded = backend.bets_handle();
        let bet = backend
            .submit_bet(&full_submission(1, &[11, 12, 13]))
            .await
            .unwrap();

        assert_eq!(bet.total_lines, 1);
        assert_eq!(bet.total_amount, dec!(1.6));
        assert_eq!(bet.status, BetStatus::Pending);

        let balance = backend.fetch_balance().await.unwrap();
        assert_eq!(balance, dec!(498.4));

        assert_eq!(recorded.lock().unwrap().len(), 1);
        let bets = backend.fetch_my_bets(&BetFilter::default()).await.unwrap();
        assert_eq!(bets.len(), 1);
    }

    #[tokio::test]
    async fn test_submit_bet_rejects_incomplete() {
        let backend = MockBackend::new();
        let result = backend.submit_bet(&full_submission(1, &[11, 12])).await;
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Incomplete"));
    }

    #[tokio::test]
    async fn test_submit_bet_rejects_closed_tournament() {
        let backend = MockBackend::new();
        let result = backend.submit_bet(&full_submission(2, &[21, 22])).await;
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("closed"));
    }

    #[tokio::test]
    async fn test_submit_bet_rejects_line_bounds() {
        let backend = MockBackend::new();

        // 3 outcomes on each of 3 matches is 27 lines against a cap of 4.
        let submission = BetSubmission {
            tournament_id: 3,
            selections: [31u64, 32, 33]
                .iter()
                .map(|&id| Selection {
                    match_id: id,
                    selected_results: vec![Outcome::Home, Outcome::Draw, Outcome::Away],
                })
                .collect(),
        };
        let result = backend.submit_bet(&submission).await;
        assert!(result.is_err());

        // A single line against a minimum of 5.
        let result = backend.submit_bet(&full_submission(4, &[41, 42])).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_submit_bet_insufficient_balance() {
        let backend = MockBackend::new();
        *backend.balance_handle().lock().unwrap() = dec!(1);
        let result = backend.submit_bet(&full_submission(1, &[11, 12, 13])).await;
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Insufficient"));
    }

    #[tokio::test]
    async fn test_my_bets_filters() {
        let backend = MockBackend::new();
        backend
            .submit_bet(&full_submission(1, &[11, 12, 13]))
            .await
            .unwrap();

        let filter = BetFilter {
            status: Some("pending".to_string()),
            tournament_id: None,
        };
        assert_eq!(backend.fetch_my_bets(&filter).await.unwrap().len(), 1);

        let filter = BetFilter {
            status: Some("won".to_string()),
            tournament_id: None,
        };
        assert!(backend.fetch_my_bets(&filter).await.unwrap().is_empty());

        let filter = BetFilter {
            status: None,
            tournament_id: Some(3),
        };
        assert!(backend.fetch_my_bets(&filter).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_forced_error() {
        let backend = MockBackend::new();
        backend.set_error("simulated backend outage");

        assert!(backend.fetch_active_tournaments().await.is_err());
        assert!(backend.fetch_balance().await.is_err());
        assert!(backend
            .submit_bet(&full_submission(1, &[11, 12, 13]))
            .await
            .is_err());

        backend.clear_error();
        assert!(backend.fetch_active_tournaments().await.is_ok());
    }
}
