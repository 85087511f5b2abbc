//! HTTP service: Axum web server for the betting slip.
//!
//! Serves a REST API and a self-contained HTML slip page.
//! CORS enabled for local development.

pub mod routes;

use anyhow::Result;
use axum::{
    http::{header, HeaderValue, Method},
    response::Html,
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tracing::info;

use routes::AppState;

pub use routes::HallState;

/// The embedded slip page HTML (compiled into the binary).
const SLIP_HTML: &str = include_str!("templates/index.html");

/// Start the slip web server.
///
/// Spawns a background task; does not block the caller.
pub fn spawn_server(state: AppState, port: u16) -> Result<()> {
    let app = build_router(state);

    tokio::spawn(async move {
        let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
        info!(port, "Slip server starting on http://localhost:{port}");

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .expect("Failed to bind server port");

        axum::serve(listener, app)
            .await
            .expect("Slip server error");
    });

    Ok(())
}

/// Build the Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin("*".parse::<HeaderValue>().unwrap())
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        // API routes
        .route("/api/tournaments", get(routes::get_tournaments))
        .route("/api/tournaments/:id/slip", get(routes::get_slip))
        .route("/api/tournaments/:id/toggle", post(routes::post_toggle))
        .route("/api/tournaments/:id/bet", post(routes::post_bet))
        .route("/api/bets", get(routes::get_my_bets))
        .route("/api/balance", get(routes::get_balance))
        .route("/health", get(routes::health))
        // Slip page HTML
        .route("/", get(serve_slip_page))
        .layer(cors)
        .with_state(state)
}

/// Serve the embedded HTML slip page.
async fn serve_slip_page() -> Html<&'static str> {
    Html(SLIP_HTML)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
