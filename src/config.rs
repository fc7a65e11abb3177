use std::str::FromStr;
use std::time::Duration;

use crate::error::{LeagueError, Result};

pub const DEFAULT_WSL_BASE_URL: &str = "https://ctfantasy.worldsurfleague.com";
pub const DEFAULT_FANTASY_SURFER_BASE_URL: &str = "https://fantasy.surfer.com";

/// Login details for the Fantasy Surfer site.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
    pub legacy_password: String,
}

/// Service configuration loaded from environment variables.
///
/// | Env Var                           | Default                                  |
/// |-----------------------------------|------------------------------------------|
/// | `HOST`                            | `0.0.0.0`                                |
/// | `PORT`                            | `3000`                                   |
/// | `DATABASE_PATH`                   | `surf_league.db`                         |
/// | `WSL_FANTASY_BASE_URL`            | `https://ctfantasy.worldsurfleague.com`  |
/// | `FANTASY_SURFER_BASE_URL`         | `https://fantasy.surfer.com`             |
/// | `FANTASY_SURFER_USERNAME`         | unset                                    |
/// | `FANTASY_SURFER_PASSWORD`         | unset                                    |
/// | `FANTASY_SURFER_LEGACY_PASSWORD`  | empty                                    |
/// | `FANTASY_SURFER_DELAY_MS`         | `1000`                                   |
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_path: String,
    pub wsl_base_url: String,
    pub fantasy_surfer_base_url: String,
    /// `None` when username or password is unset; the Fantasy Surfer batch
    /// then fails at login.
    pub credentials: Option<Credentials>,
    /// Pause between Fantasy Surfer page fetches.
    pub request_delay: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let credentials = match (lookup("FANTASY_SURFER_USERNAME"), lookup("FANTASY_SURFER_PASSWORD")) {
            (Some(username), Some(password)) => Some(Credentials {
                username,
                password,
                legacy_password: var("FANTASY_SURFER_LEGACY_PASSWORD", ""),
            }),
            _ => None,
        };

        Ok(Self {
            host: var("HOST", "0.0.0.0"),
            port: parse_var("PORT", &var("PORT", "3000"))?,
            database_path: var("DATABASE_PATH", "surf_league.db"),
            wsl_base_url: trim_base(var("WSL_FANTASY_BASE_URL", DEFAULT_WSL_BASE_URL)),
            fantasy_surfer_base_url: trim_base(var(
                "FANTASY_SURFER_BASE_URL",
                DEFAULT_FANTASY_SURFER_BASE_URL,
            )),
            credentials,
            request_delay: Duration::from_millis(parse_var(
                "FANTASY_SURFER_DELAY_MS",
                &var("FANTASY_SURFER_DELAY_MS", "1000"),
            )?),
        })
    }
}

fn parse_var<T>(key: &'static str, raw: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim().parse().map_err(|e: T::Err| LeagueError::Config {
        key,
        message: format!("{raw:?}: {e}"),
    })
}

fn trim_base(url: String) -> String {
    url.trim_end_matches('/').to_string()
}
