//! Shared helpers for integration tests: a local stand-in for both external
//! sites, synthetic markup builders, and a seeded in-memory store.

#![allow(dead_code)]

use std::collections::HashMap;
use std::time::Duration;

use axum::body::Body;
use axum::extract::{Path, Query};
use axum::http::header::{COOKIE, LOCATION, SET_COOKIE};
use axum::http::{HeaderMap, Request, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get as route_get, post};
use axum::{Form, Router};
use tower::ServiceExt;

use surf_league::config::Credentials;
use surf_league::{Athlete, Config, Contest, LeagueClient, Participant, Store};

pub const SESSION_ID: &str = "abc123";
pub const USERNAME: &str = "league-admin";
pub const PASSWORD: &str = "hunter2";

// ---------------------------------------------------------------------------
// Markup
// ---------------------------------------------------------------------------

pub fn roster_row(tier: &str, name: &str, power: bool) -> String {
    let power = if power { r#"<span class="power-athlete"></span>"# } else { "" };
    format!(
        r#"<div class="teamRosterSlot-{tier} slot">
             <span class="athlete-name">{name}</span>
             <span class="athlete-country-name">Somewhere</span>
             {power}
           </div>"#
    )
}

pub fn full_roster_rows() -> Vec<String> {
    vec![
        roster_row("A", "Griffin Colapinto", false),
        roster_row("A", "John Florence", true),
        roster_row("B", "Italo Ferreira", false),
        roster_row("B", "Jack Robinson", false),
        roster_row("B", "Ethan Ewing", false),
        roster_row("B", "Yago Dora", false),
        roster_row("C", "Connor O'Leary", false),
        roster_row("C", "Liam O'Brien", false),
    ]
}

pub fn roster_page(rows: &[String]) -> String {
    format!(
        r#"<html><body>
             <section class="team-roster">
               <h2 class="tour-name">Women&#8217;s Championship Tour</h2>
               {women}
             </section>
             <section class="team-roster">
               <h2 class="tour-name">Men&#8217;s Championship Tour</h2>
               <span class="team-points">88.5</span>
               {rows}
             </section>
           </body></html>"#,
        women = roster_row("A", "Caroline Marks", true),
        rows = rows.join("\n"),
    )
}

pub fn athletes_page() -> String {
    let row = |name: &str, tier: &str, points: &str, status: &str| {
        format!(
            r#"<tr>
                 <td><span class="athlete-name">{name}</span><span class="athlete-country-name">X</span></td>
                 <td><span class="athleteFantasyEventTier tier">{tier}</span></td>
                 <td class="total-points last">{points}</td>
                 <td class="status"><span>{status}</span></td>
               </tr>"#
        )
    };
    format!(
        "<html><body><table><tbody>{}{}{}</tbody></table></body></html>",
        row("Italo Ferreira", "A", "12.5", ""),
        row("Jack Robinson", "B", "7", "OUT"),
        row("Mystery Surfer", "C", "1", "INJ"),
    )
}

pub fn surfer_row(label: &str, points: &str, cost: &str) -> String {
    format!(
        r#"<div class="history-drop">
             <div class="history-surfer"><span>{label}</span></div>
             <div class="history-price"><span>{points}</span></div>
             <div class="history-place"><span>5th</span></div>
             <div class="history-points"><span>{cost}</span></div>
           </div>"#
    )
}

pub fn history_page(contest_name: &str, score: &str, surfers: &[String]) -> String {
    format!(
        r#"<html><body><div id="History">
             <div class="history-row dark"><div class="history-event"><b>Event</b></div></div>
             <div class="history-row">
               <div class="history-event"><b>{contest_name}</b></div>
               <div class="history-score"><span>{score}</span></div>
               <div class="history-rank"><span>3rd</span></div>
               <div class="history-date"><span>$50M</span></div>
               <div class="module-inner-contrast">
                 <div class="history-drop"><span class="header-heading">Surfer</span></div>
                 {surfers}
               </div>
             </div>
           </div></body></html>"#,
        surfers = surfers.join("\n"),
    )
}

// ---------------------------------------------------------------------------
// Fake external site
// ---------------------------------------------------------------------------

/// Roster pages keyed by WSL id. `wsl-down` answers 500, `wsl-unknown-b`
/// carries a tier B name no strategy resolves, and `wsl-stop3` only exists
/// for stop 3.
async fn wsl_roster(Path(wsl_id): Path<String>, Query(query): Query<HashMap<String, String>>) -> Response {
    let stop = query.get("gameStopNumber").map(String::as_str);
    match wsl_id.as_str() {
        "wsl-down" => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        "wsl-unknown-b" => {
            let mut rows = full_roster_rows();
            rows[3] = roster_row("B", "Nobody Known", false);
            Html(roster_page(&rows)).into_response()
        }
        "wsl-stop3" if stop != Some("3") => StatusCode::NOT_FOUND.into_response(),
        _ => Html(roster_page(&full_roster_rows())).into_response(),
    }
}

async fn wsl_athletes() -> Html<String> {
    Html(athletes_page())
}

async fn fs_login(Form(form): Form<HashMap<String, String>>) -> Response {
    let valid = form.get("username").map(String::as_str) == Some(USERNAME)
        && form.get("password").map(String::as_str) == Some(PASSWORD)
        && form.get("persistent").map(String::as_str) == Some("on");
    if !valid {
        return Html("<p>Invalid login</p>").into_response();
    }
    (
        StatusCode::FOUND,
        [
            (LOCATION, "/welcome".to_string()),
            (SET_COOKIE, format!("PHPSESSID={SESSION_ID}; path=/; HttpOnly")),
        ],
    )
        .into_response()
}

async fn fs_welcome() -> Response {
    ([(SET_COOKIE, "remember=1; path=/")], Html("<p>Welcome</p>")).into_response()
}

async fn fs_team(headers: HeaderMap, Query(query): Query<HashMap<String, String>>) -> Response {
    let authed = headers
        .get(COOKIE)
        .and_then(|c| c.to_str().ok())
        .is_some_and(|c| c.contains(&format!("PHPSESSID={SESSION_ID}")));
    if !authed {
        return StatusCode::FORBIDDEN.into_response();
    }
    match query.get("user").map(String::as_str) {
        Some("fs-down") => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        Some("fs-nobody") => Html(history_page(
            "Rip Curl Pro Bells Beach",
            "10",
            &[surfer_row("Nobody Known (1%)", "10", "$1M")],
        ))
        .into_response(),
        _ => Html(history_page(
            "Rip Curl Pro Bells Beach",
            "1,245",
            &[
                surfer_row("Italo Ferreira (42%)", "310", "$12.5M"),
                surfer_row("John John Florence (30%)", "280", "$11M"),
                surfer_row("Joao Chianca (8%)", "150", "$6M"),
            ],
        ))
        .into_response(),
    }
}

fn login_is_valid(form: &HashMap<String, String>) -> bool {
    form.get("username").map(String::as_str) == Some(USERNAME)
        && form.get("password").map(String::as_str) == Some(PASSWORD)
}

/// Login under `/hop`: the login response carries no cookie and the
/// session is only issued by the page it redirects to.
async fn hop_login(Form(form): Form<HashMap<String, String>>) -> Response {
    if !login_is_valid(&form) {
        return Html("<p>Invalid login</p>").into_response();
    }
    (StatusCode::SEE_OTHER, [(LOCATION, "/hop/welcome")]).into_response()
}

async fn hop_welcome() -> Response {
    (
        [(SET_COOKIE, format!("PHPSESSID={SESSION_ID}; path=/"))],
        Html("<p>Welcome</p>"),
    )
        .into_response()
}

/// Login under `/chain`: the session is only issued two redirects away.
async fn chain_login(Form(form): Form<HashMap<String, String>>) -> Response {
    if !login_is_valid(&form) {
        return Html("<p>Invalid login</p>").into_response();
    }
    (StatusCode::FOUND, [(LOCATION, "/chain/step")]).into_response()
}

async fn chain_step() -> Response {
    (
        StatusCode::FOUND,
        [
            (LOCATION, "/chain/final".to_string()),
            (SET_COOKIE, "tracking=1; path=/".to_string()),
        ],
    )
        .into_response()
}

async fn chain_final() -> Response {
    (
        [(SET_COOKIE, format!("PHPSESSID={SESSION_ID}; path=/"))],
        Html("<p>Welcome</p>"),
    )
        .into_response()
}

pub fn fake_site() -> Router {
    Router::new()
        .route("/team/{wsl_id}/roster", route_get(wsl_roster))
        .route("/athletes", route_get(wsl_athletes))
        .route("/login/", post(fs_login))
        .route("/welcome", route_get(fs_welcome))
        .route("/team/mens/", route_get(fs_team))
        .route("/hop/login/", post(hop_login))
        .route("/hop/welcome", route_get(hop_welcome))
        .route("/chain/login/", post(chain_login))
        .route("/chain/step", route_get(chain_step))
        .route("/chain/final", route_get(chain_final))
}

/// Serve `router` on an ephemeral local port and return its base URL.
pub async fn spawn(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

// ---------------------------------------------------------------------------
// Client, config and store
// ---------------------------------------------------------------------------

pub fn test_config(base_url: &str, password: Option<&str>) -> Config {
    Config {
        host: "127.0.0.1".to_string(),
        port: 0,
        database_path: ":memory:".to_string(),
        wsl_base_url: base_url.to_string(),
        fantasy_surfer_base_url: base_url.to_string(),
        credentials: password.map(|password| Credentials {
            username: USERNAME.to_string(),
            password: password.to_string(),
            legacy_password: String::new(),
        }),
        request_delay: Duration::ZERO,
    }
}

pub async fn fake_client(password: Option<&str>) -> LeagueClient {
    let base_url = spawn(fake_site()).await;
    LeagueClient::new(&test_config(&base_url, password)).unwrap()
}

/// Client whose Fantasy Surfer base is `path` on the fake site, so the
/// `/hop` and `/chain` login variants can be exercised.
pub async fn fake_client_at(path: &str, password: Option<&str>) -> LeagueClient {
    let base_url = spawn(fake_site()).await;
    let mut config = test_config(&base_url, password);
    config.fantasy_surfer_base_url = format!("{base_url}{path}");
    LeagueClient::new(&config).unwrap()
}

pub fn athletes() -> Vec<Athlete> {
    vec![
        Athlete::new("a-griffin", "Griffin", "Colapinto"),
        Athlete::new("a-jjf", "John", "John Florence"),
        Athlete::new("a-italo", "Italo", "Ferreira"),
        Athlete::new("a-jack", "Jack", "Robinson"),
        Athlete::new("a-ethan", "Ethan", "Ewing"),
        Athlete::new("a-yago", "Yago", "Dora"),
        Athlete::new("a-connor", "Connor", "O'Leary"),
        Athlete::new("a-liam", "Liam", "O'Brien"),
        Athlete::new("a-joao", "João", "Chianca"),
    ]
}

pub fn contest(id: &str, stop_number: Option<u32>) -> Contest {
    let start_date = chrono::NaiveDate::from_ymd_opt(2025, 4, 18).unwrap();
    Contest {
        id: id.to_string(),
        name: "Rip Curl Pro Bells Beach".to_string(),
        year: 2025,
        country: Some("Australia".to_string()),
        start_date,
        end_date: start_date + chrono::Days::new(10),
        is_active: true,
        is_completed: false,
        stop_number,
    }
}

pub fn wsl_participant(id: &str, wsl_id: &str) -> Participant {
    Participant {
        id: id.to_string(),
        first_name: Some("Member".to_string()),
        last_name: Some(id.to_string()),
        wsl_id: Some(wsl_id.to_string()),
        ..Participant::default()
    }
}

pub fn fs_participant(id: &str, fantasy_surfer_id: &str) -> Participant {
    Participant {
        id: id.to_string(),
        fantasy_surfer_id: Some(fantasy_surfer_id.to_string()),
        ..Participant::default()
    }
}

/// In-memory store with the athlete table and one contest, `bells`, at stop 3.
pub fn seeded_store(participants: &[Participant]) -> Store {
    let store = Store::open_in_memory().unwrap();
    for athlete in athletes() {
        store.insert_athlete(&athlete).unwrap();
    }
    store.upsert_contest(&contest("bells", Some(3))).unwrap();
    for participant in participants {
        store.upsert_participant(participant).unwrap();
    }
    store
}

// ---------------------------------------------------------------------------
// Router helpers
// ---------------------------------------------------------------------------

pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response {
    app.oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

pub async fn post_json(app: Router, uri: &str, body: &str) -> Response {
    app.oneshot(
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
    )
    .await
    .unwrap()
}
