//! Slip API route handlers.
//!
//! All endpoints return JSON. State is shared via `Arc<HallState>`:
//! one in-memory `SlipBuilder` per tournament, behind an `RwLock`,
//! with the quote recomputed on every mutation. The betting window is
//! re-checked against the backend on every mutating request.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{error, info, warn};

use crate::backend::{BetFilter, TournamentBackend};
use crate::slip::{BetQuote, SlipBuilder};
use crate::storage::{self, SlipDrafts};
use crate::types::{Bet, HallError, Match, Outcome, Selection, Tournament};

// ---------------------------------------------------------------------------
// Shared state
// ---------------------------------------------------------------------------

/// Shared state accessible by all route handlers.
pub struct HallState {
    pub backend: Box<dyn TournamentBackend>,
    /// One in-progress slip per tournament.
    pub slips: RwLock<HashMap<u64, SlipBuilder>>,
    /// Drafts loaded at startup, applied when a slip is first built.
    pub pending_drafts: RwLock<SlipDrafts>,
    /// Draft file path; None disables persistence (tests).
    pub draft_file: Option<String>,
}

impl HallState {
    pub fn new(backend: Box<dyn TournamentBackend>, draft_file: Option<String>) -> Self {
        Self {
            backend,
            slips: RwLock::new(HashMap::new()),
            pending_drafts: RwLock::new(SlipDrafts::new()),
            draft_file,
        }
    }

    /// Seed drafts restored from disk.
    pub async fn restore_drafts(&self, drafts: SlipDrafts) {
        *self.pending_drafts.write().await = drafts;
    }

    /// Snapshot every slip's selections to the draft file.
    async fn persist_drafts(&self) {
        let Some(path) = self.draft_file.as_deref() else {
            return;
        };
        let slips = self.slips.read().await;
        let drafts: SlipDrafts = slips
            .iter()
            .map(|(id, slip)| (*id, slip.selections().to_vec()))
            .collect();
        if let Err(e) = storage::save_drafts(&drafts, Some(path)) {
            warn!(error = %e, "Failed to persist slip drafts");
        }
    }
}

pub type AppState = Arc<HallState>;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleRequest {
    pub match_id: u64,
    /// 1X2 outcome code; parsed strictly, anything else is a 400.
    pub outcome: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SlipResponse {
    pub tournament: Tournament,
    pub matches: Vec<Match>,
    pub selections: Vec<Selection>,
    pub quote: BetQuote,
    pub betting_open: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleResponse {
    pub selections: Vec<Selection>,
    pub quote: BetQuote,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct MyBetsQuery {
    pub status: Option<String>,
    pub tournament_id: Option<u64>,
}

#[derive(Debug, Serialize)]
pub struct BalanceResponse {
    pub balance: rust_decimal::Decimal,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

type ApiError = (StatusCode, Json<ErrorBody>);

fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorBody {
            error: message.into(),
        }),
    )
}

fn backend_error(context: &str, e: anyhow::Error) -> ApiError {
    error!(error = %e, "{context}");
    api_error(StatusCode::BAD_GATEWAY, format!("{context}: {e}"))
}

// ---------------------------------------------------------------------------
// Slip assembly
// ---------------------------------------------------------------------------

/// Fetch the tournament and its matches, and make sure an in-memory
/// slip exists for it, applying any restored draft on first build.
async fn ensure_slip(
    state: &AppState,
    tournament_id: u64,
) -> Result<(Tournament, Vec<Match>), ApiError> {
    let (tournament, matches) = futures::try_join!(
        state.backend.fetch_tournament(tournament_id),
        state.backend.fetch_matches(tournament_id),
    )
    .map_err(|e| backend_error("Failed to load tournament", e))?;

    let mut slips = state.slips.write().await;
    if !slips.contains_key(&tournament_id) {
        let config = tournament.betting_config().map_err(|e| {
            error!(tournament_id, error = %e, "Tournament has invalid betting config");
            api_error(StatusCode::BAD_GATEWAY, e.to_string())
        })?;
        let mut slip = SlipBuilder::new(config, &matches);

        // First sight of this tournament: apply a restored draft, but
        // only while the betting window is still open.
        let draft = state.pending_drafts.write().await.remove(&tournament_id);
        if let Some(selections) = draft {
            if tournament.is_open_for_betting(chrono::Utc::now()) {
                for sel in &selections {
                    if slip.set_selection(sel.match_id, &sel.selected_results).is_err() {
                        warn!(
                            tournament_id,
                            match_id = sel.match_id,
                            "Draft references unknown match, skipping"
                        );
                    }
                }
                info!(tournament_id, "Slip draft restored");
            } else {
                info!(tournament_id, "Dropping stale draft for closed tournament");
            }
        }
        slips.insert(tournament_id, slip);
    }

    Ok((tournament, matches))
}

// ---------------------------------------------------------------------------
// Route handlers
// ---------------------------------------------------------------------------

/// GET /api/tournaments
pub async fn get_tournaments(State(state): State<AppState>) -> Result<Json<Vec<Tournament>>, ApiError> {
    let tournaments = state
        .backend
        .fetch_active_tournaments()
        .await
        .map_err(|e| backend_error("Failed to fetch tournaments", e))?;
    Ok(Json(tournaments))
}

/// GET /api/tournaments/:id/slip
pub async fn get_slip(
    State(state): State<AppState>,
    Path(tournament_id): Path<u64>,
) -> Result<Json<SlipResponse>, ApiError> {
    let (tournament, matches) = ensure_slip(&state, tournament_id).await?;

    let slips = state.slips.read().await;
    let slip = &slips[&tournament_id];
    let betting_open = tournament.is_open_for_betting(chrono::Utc::now());

    Ok(Json(SlipResponse {
        quote: slip.quote(),
        selections: slip.selections().to_vec(),
        tournament,
        matches,
        betting_open,
    }))
}

/// POST /api/tournaments/:id/toggle
pub async fn post_toggle(
    State(state): State<AppState>,
    Path(tournament_id): Path<u64>,
    Json(req): Json<ToggleRequest>,
) -> Result<Json<ToggleResponse>, ApiError> {
    let outcome: Outcome = req
        .outcome
        .parse()
        .map_err(|e: HallError| api_error(StatusCode::BAD_REQUEST, e.to_string()))?;

    let (tournament, _matches) = ensure_slip(&state, tournament_id).await?;
    if !tournament.is_open_for_betting(chrono::Utc::now()) {
        return Err(api_error(
            StatusCode::CONFLICT,
            HallError::BettingClosed(tournament_id).to_string(),
        ));
    }

    let response = {
        let mut slips = state.slips.write().await;
        let slip = slips
            .get_mut(&tournament_id)
            .ok_or_else(|| api_error(StatusCode::INTERNAL_SERVER_ERROR, "Slip missing"))?;
        let quote = slip
            .toggle(req.match_id, outcome)
            .map_err(|e| api_error(StatusCode::BAD_REQUEST, e.to_string()))?;
        ToggleResponse {
            selections: slip.selections().to_vec(),
            quote,
        }
    };

    state.persist_drafts().await;
    Ok(Json(response))
}

/// POST /api/tournaments/:id/bet
pub async fn post_bet(
    State(state): State<AppState>,
    Path(tournament_id): Path<u64>,
) -> Result<Json<Bet>, ApiError> {
    let (tournament, _matches) = ensure_slip(&state, tournament_id).await?;
    if !tournament.is_open_for_betting(chrono::Utc::now()) {
        return Err(api_error(
            StatusCode::CONFLICT,
            HallError::BettingClosed(tournament_id).to_string(),
        ));
    }

    let submission = {
        let slips = state.slips.read().await;
        let slip = slips
            .get(&tournament_id)
            .ok_or_else(|| api_error(StatusCode::INTERNAL_SERVER_ERROR, "Slip missing"))?;
        slip.submission(tournament_id)
            .map_err(|e| api_error(StatusCode::BAD_REQUEST, e.to_string()))?
    };

    let bet = state
        .backend
        .submit_bet(&submission)
        .await
        .map_err(|e| backend_error("Bet submission failed", e))?;

    // The slip and its draft are spent once the backend accepts.
    state.slips.write().await.remove(&tournament_id);
    state.persist_drafts().await;
    info!(tournament_id, bet_id = bet.id, "Bet placed, slip cleared");

    Ok(Json(bet))
}

/// GET /api/bets
pub async fn get_my_bets(
    State(state): State<AppState>,
    Query(query): Query<MyBetsQuery>,
) -> Result<Json<Vec<Bet>>, ApiError> {
    let filter = BetFilter {
        status: query.status,
        tournament_id: query.tournament_id,
    };
    let bets = state
        .backend
        .fetch_my_bets(&filter)
        .await
        .map_err(|e| backend_error("Failed to fetch bets", e))?;
    Ok(Json(bets))
}

/// GET /api/balance
pub async fn get_balance(State(state): State<AppState>) -> Result<Json<BalanceResponse>, ApiError> {
    let balance = state
        .backend
        .fetch_balance()
        .await
        .map_err(|e| backend_error("Failed to fetch balance", e))?;
    Ok(Json(BalanceResponse { balance }))
}

/// GET /health
pub async fn health() -> StatusCode {
    StatusCode::OK
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
