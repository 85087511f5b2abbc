//! REST client for the tournament backend.
//!
//! Talks to the backend's `/v1` API: tournaments, matches, bets, and
//! user balance. Reads are plain JSON; writes carry a bearer token.
//! The my-bets listing uses the backend's `filters=<json>` query
//! convention.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use rust_decimal::Decimal;
use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use tracing::{debug, info};

use super::{BetFilter, TournamentBackend};
use crate::config::BackendConfig;
use crate::types::{Bet, BetSubmission, HallError, Match, Tournament};

// ---------------------------------------------------------------------------
// Wire envelopes
// ---------------------------------------------------------------------------

/// Envelope for the my-bets listing.
#[derive(Debug, Deserialize)]
struct MyBetsResponse {
    data: Vec<Bet>,
}

/// Response from `/v1/user-balances/me`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BalanceResponse {
    balance: Decimal,
    #[serde(default)]
    #[allow(dead_code)]
    locked_balance: Option<Decimal>,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Production backend client over HTTP.
pub struct RestBackend {
    http: Client,
    base_url: String,
    token: Secret<String>,
}

impl RestBackend {
    pub fn new(config: &BackendConfig, token: Secret<String>) -> Result<Self> {
        let http = Client::builder()
            .timeout(std::time::Duration::from_secs(config.request_timeout_secs))
            .user_agent("POOLHALL/0.1.0 (betting-slip-service)")
            .build()
            .context("Failed to build HTTP client for tournament backend")?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token,
        })
    }

    // -- Internal helpers ------------------------------------------------

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Check the response status, turning non-2xx into a backend error
    /// that carries the endpoint and the body text.
    async fn checked(resp: reqwest::Response, endpoint: &str) -> Result<reqwest::Response> {
        if resp.status().is_success() {
            return Ok(resp);
        }
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        Err(HallError::Backend {
            endpoint: endpoint.to_string(),
            message: format!("{status}: {body}"),
        }
        .into())
    }
}

// ---------------------------------------------------------------------------
// TournamentBackend trait implementation
// ---------------------------------------------------------------------------

#[async_trait]
impl TournamentBackend for RestBackend {
    async fn fetch_tournament(&self, id: u64) -> Result<Tournament> {
        let endpoint = format!("/v1/tournaments/{id}");
        debug!(endpoint = %endpoint, "Fetching tournament");

        let resp = self
            .http
            .get(self.url(&endpoint))
            .send()
            .await
            .context("Tournament request failed")?;

        Self::checked(resp, &endpoint)
            .await?
            .json()
            .await
            .context("Failed to parse tournament response")
    }

    async fn fetch_active_tournaments(&self) -> Result<Vec<Tournament>> {
        let endpoint = "/v1/tournaments/active";
        debug!(endpoint, "Fetching active tournaments");

        let resp = self
            .http
            .get(self.url(endpoint))
            .send()
            .await
            .context("Active tournaments request failed")?;

        Self::checked(resp, endpoint)
            .await?
            .json()
            .await
            .context("Failed to parse active tournaments response")
    }

    async fn fetch_matches(&self, tournament_id: u64) -> Result<Vec<Match>> {
        let endpoint = format!("/v1/matches/tournament/{tournament_id}");
        debug!(endpoint = %endpoint, "Fetching matches");

        let resp = self
            .http
            .get(self.url(&endpoint))
            .send()
            .await
            .context("Matches request failed")?;

        let mut matches: Vec<Match> = Self::checked(resp, &endpoint)
            .await?
            .json()
            .await
            .context("Failed to parse matches response")?;

        matches.sort_by_key(|m| m.match_order);
        Ok(matches)
    }

    async fn submit_bet(&self, submission: &BetSubmission) -> Result<Bet> {
        let endpoint = "/v1/bets";
        info!(
            tournament_id = submission.tournament_id,
            selections = submission.selections.len(),
            "Submitting bet"
        );

        let resp = self
            .http
            .post(self.url(endpoint))
            .header(
                "Authorization",
                format!("Bearer {}", self.token.expose_secret()),
            )
            .json(submission)
            .send()
            .await
            .context("Bet submission request failed")?;

        let bet: Bet = Self::checked(resp, endpoint)
            .await?
            .json()
            .await
            .context("Failed to parse bet submission response")?;

        info!(bet_id = bet.id, total_lines = bet.total_lines, "Bet accepted");
        Ok(bet)
    }

    async fn fetch_my_bets(&self, filter: &BetFilter) -> Result<Vec<Bet>> {
        let mut endpoint = "/v1/bets/my-bets".to_string();
        if !filter.is_empty() {
            let filters = serde_json::to_string(filter).context("Failed to encode bet filter")?;
            endpoint = format!("{endpoint}?filters={}", urlencoding::encode(&filters));
        }
        debug!(endpoint = %endpoint, "Fetching my bets");

        let resp = self
            .http
            .get(self.url(&endpoint))
            .header(
                "Authorization",
                format!("Bearer {}", self.token.expose_secret()),
            )
            .send()
            .await
            .context("My-bets request failed")?;

        let bets: MyBetsResponse = Self::checked(resp, &endpoint)
            .await?
            .json()
            .await
            .context("Failed to parse my-bets response")?;

        Ok(bets.data)
    }

    async fn fetch_balance(&self) -> Result<Decimal> {
        let endpoint = "/v1/user-balances/me";
        debug!(endpoint, "Fetching balance");

        let resp = self
            .http
            .get(self.url(endpoint))
            .header(
                "Authorization",
                format!("Bearer {}", self.token.expose_secret()),
            )
            .send()
            .await
            .context("Balance request failed")?;

        let balance: BalanceResponse = Self::checked(resp, endpoint)
            .await?
            .json()
            .await
            .context("Failed to parse balance response")?;

        Ok(balance.balance)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
