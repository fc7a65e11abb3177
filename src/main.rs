use std::net::SocketAddr;

use surf_league::api::{build_router, AppState};
use surf_league::{Config, LeagueClient, Store};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "surf_league=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    if config.credentials.is_none() {
        tracing::warn!("fantasy surfer credentials not set; that batch will fail at login");
    }

    let store = Store::open(&config.database_path)?;
    tracing::info!(path = %config.database_path, "store opened");

    let client = LeagueClient::new(&config)?;
    let app = build_router(AppState::new(client, store));

    let addr = SocketAddr::new(config.host.parse()?, config.port);
    tracing::info!("Starting server on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
