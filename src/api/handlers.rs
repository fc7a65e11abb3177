use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::error::ApiError;
use super::AppState;
use crate::model::LeagueType;
use crate::pipeline::{self, BatchSummary, PointsSummary};
use crate::standings::{self, CombinedStanding, LeagueStanding};
use crate::store::Store;

/// Body accepted by every trigger. Both fields are optional at the parse
/// step so a missing one is reported as a 400 with our own message.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct FetchRequest {
    contest_id: Option<String>,
    stop_number: Option<u32>,
}

impl FetchRequest {
    fn contest_id(&self) -> Result<&str, ApiError> {
        self.contest_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| ApiError::BadRequest("Missing contestId in request body".to_string()))
    }

    fn stop_number(&self) -> Option<u32> {
        self.stop_number.filter(|n| *n > 0)
    }
}

#[derive(Serialize)]
pub(crate) struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

pub(crate) async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

pub(crate) async fn fetch_wsl_roster(
    State(state): State<AppState>,
    body: Result<Json<FetchRequest>, JsonRejection>,
) -> Result<Json<BatchSummary>, ApiError> {
    let Json(request) = body?;
    let contest_id = request.contest_id()?;
    info!(contest_id, stop_number = ?request.stop_number(), "wsl roster fetch requested");

    let summary = pipeline::run_wsl_roster_batch(&state.client, &state.store, contest_id, request.stop_number())
        .await
        .map_err(ApiError::league("Failed to fetch/parse rosters"))?;
    Ok(Json(summary))
}

pub(crate) async fn fetch_fantasy_surfer_roster(
    State(state): State<AppState>,
    body: Result<Json<FetchRequest>, JsonRejection>,
) -> Result<Json<BatchSummary>, ApiError> {
    let Json(request) = body?;
    let contest_id = request.contest_id()?;
    info!(contest_id, "fantasy surfer roster fetch requested");

    let summary = pipeline::run_fantasy_surfer_batch(
        &state.client,
        &state.store,
        contest_id,
        state.client.request_delay(),
    )
    .await
    .map_err(ApiError::league("Failed to fetch/parse rosters"))?;
    Ok(Json(summary))
}

pub(crate) async fn fetch_wsl_points(
    State(state): State<AppState>,
    body: Result<Json<FetchRequest>, JsonRejection>,
) -> Result<Json<PointsSummary>, ApiError> {
    let Json(request) = body?;
    let contest_id = request.contest_id()?;
    let stop_number = request
        .stop_number()
        .ok_or_else(|| ApiError::BadRequest("Missing stopNumber in request body".to_string()))?;
    info!(contest_id, stop_number, "wsl points fetch requested");

    let summary = pipeline::run_wsl_points(&state.client, &state.store, contest_id, stop_number)
        .await
        .map_err(ApiError::league("Failed to fetch/parse points"))?;
    Ok(Json(summary))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ContestStandingsResponse {
    contest_id: String,
    contest_name: String,
    standings: Vec<CombinedStanding>,
}

fn combined_for(store: &Store, contest_id: &str) -> crate::Result<Vec<CombinedStanding>> {
    let wsl = store.contest_standings(contest_id, LeagueType::Wsl)?;
    let fantasy_surfer = store.contest_standings(contest_id, LeagueType::FantasySurfer)?;
    Ok(standings::combine_contest(&wsl, &fantasy_surfer))
}

pub(crate) async fn contest_standings(
    State(state): State<AppState>,
    Path(contest_id): Path<String>,
) -> Result<Json<ContestStandingsResponse>, ApiError> {
    let load = ApiError::league("Failed to load standings");
    let contest = match state.store.get_contest(&contest_id) {
        Ok(Some(contest)) => contest,
        Ok(None) => {
            return Err(ApiError::NotFound {
                entity: "contest",
                id: contest_id,
            })
        }
        Err(e) => return Err(load(e)),
    };
    let standings = combined_for(&state.store, &contest.id).map_err(load)?;

    Ok(Json(ContestStandingsResponse {
        contest_id: contest.id,
        contest_name: contest.name,
        standings,
    }))
}

#[derive(Serialize)]
pub(crate) struct LeagueStandingsResponse {
    standings: Vec<LeagueStanding>,
}

pub(crate) async fn league_standings(
    State(state): State<AppState>,
) -> Result<Json<LeagueStandingsResponse>, ApiError> {
    let per_contest = state
        .store
        .list_contests()
        .and_then(|contests| {
            contests
                .iter()
                .map(|contest| combined_for(&state.store, &contest.id))
                .collect::<crate::Result<Vec<_>>>()
        })
        .map_err(ApiError::league("Failed to load standings"))?;

    Ok(Json(LeagueStandingsResponse {
        standings: standings::league_table(&per_contest),
    }))
}
