//! Router behaviour: triggers, standings, CORS and error bodies.

mod common;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use tower::ServiceExt;

use surf_league::api::{build_router, AppState};
use surf_league::{ContestStanding, LeagueType, Participant, Store};

use common::{body_json, fake_client, fs_participant, get, post_json, seeded_store, wsl_participant};

async fn app(password: Option<&str>, store: Store) -> Router {
    build_router(AppState::new(fake_client(password).await, store))
}

#[tokio::test]
async fn health_returns_ok() {
    let response = get(app(None, seeded_store(&[])).await, "/health").await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert!(json["version"].is_string());
}

#[tokio::test]
async fn missing_contest_id_is_400_with_details() {
    let response = post_json(app(None, seeded_store(&[])).await, "/fetch-wsl-roster", "{}").await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["details"], "Missing contestId in request body");
    assert!(json["error"].is_string());
}

#[tokio::test]
async fn malformed_json_is_400() {
    let response = post_json(
        app(None, seeded_store(&[])).await,
        "/fetch-fantasy-surfer-roster",
        "{ not json",
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert!(json["details"].is_string());
}

#[tokio::test]
async fn points_require_stop_number() {
    let response = post_json(
        app(None, seeded_store(&[])).await,
        "/fetch-wsl-points",
        r#"{ "contestId": "bells" }"#,
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["details"], "Missing stopNumber in request body");
}

#[tokio::test]
async fn preflight_is_answered_with_permissive_cors() {
    let response = app(None, seeded_store(&[]))
        .await
        .oneshot(
            Request::builder()
                .method(Method::OPTIONS)
                .uri("/fetch-wsl-roster")
                .header("origin", "https://league.example")
                .header("access-control-request-method", "POST")
                .header("access-control-request-headers", "apikey, content-type")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let headers = response.headers();
    assert_eq!(headers["access-control-allow-origin"], "*");
    let allowed = headers["access-control-allow-headers"].to_str().unwrap();
    assert!(allowed.contains("apikey"));
    assert!(allowed.contains("x-client-info"));
}

#[tokio::test]
async fn wsl_roster_trigger_returns_batch_summary() {
    let store = seeded_store(&[wsl_participant("u1", "wsl-1"), wsl_participant("u2", "wsl-down")]);
    let response = post_json(
        app(None, store).await,
        "/fetch-wsl-roster",
        r#"{ "contestId": "bells", "stopNumber": 3 }"#,
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["totalTeams"], 2);
    assert_eq!(json["successfulFetches"], 1);
    assert_eq!(json["failedFetches"], 1);
    assert_eq!(json["results"][0]["status"], "persisted");
    assert_eq!(json["results"][1]["status"], "fetch_failed");
    assert_eq!(json["rosters"][0]["userId"], "u1");
    assert_eq!(json["rosters"][0]["roster"]["A"][1]["isPowerSurfer"], true);
}

#[tokio::test]
async fn fantasy_surfer_auth_failure_is_502() {
    let store = seeded_store(&[fs_participant("u1", "fs-1")]);
    let response = post_json(
        app(Some("wrong"), store).await,
        "/fetch-fantasy-surfer-roster",
        r#"{ "contestId": "bells" }"#,
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let json = body_json(response).await;
    assert_eq!(json["error"], "Failed to fetch/parse rosters");
    assert!(json["details"].as_str().unwrap().contains("PHPSESSID"));
}

#[tokio::test]
async fn wsl_points_trigger_reports_unresolved() {
    let response = post_json(
        app(None, seeded_store(&[])).await,
        "/fetch-wsl-points",
        r#"{ "contestId": "bells", "stopNumber": 3 }"#,
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["surfers"], 3);
    assert_eq!(json["unresolved"][0], "Mystery Surfer");
    assert_eq!(json["points"][1]["status"], "OUT");
}

fn seed_standings(store: &Store) {
    let rows = [
        ("u1", LeagueType::Wsl, 90.0),
        ("u2", LeagueType::Wsl, 80.0),
        ("u2", LeagueType::FantasySurfer, 900.0),
        ("u1", LeagueType::FantasySurfer, 500.0),
        ("u3", LeagueType::FantasySurfer, 100.0),
    ];
    for (user, league, points) in rows {
        store
            .upsert_contest_standing(&ContestStanding {
                participant_id: user.to_string(),
                contest_id: "bells".to_string(),
                league,
                points,
            })
            .unwrap();
    }
}

fn member(id: &str) -> Participant {
    Participant {
        id: id.to_string(),
        ..Participant::default()
    }
}

#[tokio::test]
async fn contest_standings_combine_both_games() {
    let store = seeded_store(&[member("u1"), member("u2"), member("u3")]);
    seed_standings(&store);

    let response = get(app(None, store).await, "/contests/bells/standings").await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let standings = json["standings"].as_array().unwrap();
    let summary: Vec<(String, u64)> = standings
        .iter()
        .map(|s| {
            (
                s["participantId"].as_str().unwrap().to_string(),
                s["combinedScore"].as_u64().unwrap(),
            )
        })
        .collect();
    assert_eq!(
        summary,
        [
            ("u1".to_string(), 3),
            ("u2".to_string(), 3),
            ("u3".to_string(), 1002)
        ]
    );
}

#[tokio::test]
async fn unknown_contest_standings_is_404() {
    let response = get(app(None, seeded_store(&[])).await, "/contests/nope/standings").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn league_table_sums_contests() {
    let store = seeded_store(&[member("u1"), member("u2"), member("u3")]);
    seed_standings(&store);

    let response = get(app(None, store).await, "/standings").await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["standings"][0]["participantId"], "u1");
    assert_eq!(json["standings"][0]["totalScore"], 3);
    assert_eq!(json["standings"][2]["participantId"], "u3");
    assert_eq!(json["standings"][2]["contests"], 1);
}
