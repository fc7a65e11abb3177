//! HTTP triggers for the batch runs and read-only standings endpoints.
//!
//! [`build_router`] is shared by the binary and the integration tests so both
//! run the same middleware stack.

mod error;
mod handlers;

use std::sync::Arc;

use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderName, Method};
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::client::LeagueClient;
use crate::store::Store;

pub use error::ApiError;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub client: Arc<LeagueClient>,
    pub store: Arc<Store>,
}

impl AppState {
    pub fn new(client: LeagueClient, store: Store) -> Self {
        Self {
            client: Arc::new(client),
            store: Arc::new(store),
        }
    }
}

/// Build the full application [`Router`].
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/fetch-wsl-roster", post(handlers::fetch_wsl_roster))
        .route(
            "/fetch-fantasy-surfer-roster",
            post(handlers::fetch_fantasy_surfer_roster),
        )
        .route("/fetch-wsl-points", post(handlers::fetch_wsl_points))
        .route("/contests/{contest_id}/standings", get(handlers::contest_standings))
        .route("/standings", get(handlers::league_standings))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer())
        .with_state(state)
}

/// Any origin may call the triggers; preflight requests are answered here.
pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            AUTHORIZATION,
            HeaderName::from_static("x-client-info"),
            HeaderName::from_static("apikey"),
            CONTENT_TYPE,
        ])
}
