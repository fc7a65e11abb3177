use std::time::Duration;

use reqwest::redirect::Policy;
use tracing::instrument;

use crate::config::{Config, Credentials};
use crate::error::{LeagueError, Result};
use crate::model::{AthletePoints, WslRoster};
use crate::scraper;
use crate::session::{self, CookieJar};

/// Entry point for talking to the two external fantasy sites.
///
/// `LeagueClient` holds two [`reqwest::Client`]s: a regular one for page
/// fetches and one that never follows redirects, used for the Fantasy Surfer
/// login so the session cookie on the login response is not lost.
///
/// # Examples
///
/// ```no_run
/// # async fn example() -> surf_league::Result<()> {
/// use surf_league::{Config, LeagueClient};
///
/// let client = LeagueClient::new(&Config::from_env()?)?;
/// let roster = client.get_wsl_roster("12345", 3).await?;
/// println!("{} tier A athletes", roster.a.len());
/// # Ok(())
/// # }
/// ```
pub struct LeagueClient {
    http: reqwest::Client,
    login_http: reqwest::Client,
    wsl_base_url: String,
    fantasy_surfer_base_url: String,
    credentials: Option<Credentials>,
    request_delay: Duration,
}

impl LeagueClient {
    /// Create a client for the sites and credentials in `config`.
    pub fn new(config: &Config) -> Result<Self> {
        let login_http = reqwest::Client::builder()
            .redirect(Policy::none())
            .build()
            .map_err(LeagueError::ClientBuild)?;
        Ok(Self::with_clients(reqwest::Client::new(), login_http, config))
    }

    /// Create a client using the provided [`reqwest::Client`]s.
    ///
    /// `login_http` must be configured not to follow redirects.
    pub fn with_clients(http: reqwest::Client, login_http: reqwest::Client, config: &Config) -> Self {
        Self {
            http,
            login_http,
            wsl_base_url: config.wsl_base_url.clone(),
            fantasy_surfer_base_url: config.fantasy_surfer_base_url.clone(),
            credentials: config.credentials.clone(),
            request_delay: config.request_delay,
        }
    }

    /// Pause to leave between Fantasy Surfer page fetches.
    pub fn request_delay(&self) -> Duration {
        self.request_delay
    }

    /// Fetch the raw roster page of a WSL fantasy team.
    #[instrument(skip(self))]
    pub async fn get_wsl_roster_page(&self, wsl_id: &str, stop_number: u32) -> Result<String> {
        scraper::wsl::get_roster_page(&self.http, &self.wsl_base_url, wsl_id, stop_number).await
    }

    /// Fetch and extract the men's tour roster of a WSL fantasy team.
    #[instrument(skip(self))]
    pub async fn get_wsl_roster(&self, wsl_id: &str, stop_number: u32) -> Result<WslRoster> {
        let html = self.get_wsl_roster_page(wsl_id, stop_number).await?;
        scraper::wsl::parse_roster(&html)
    }

    /// Fetch and extract the per-athlete results for a tour stop.
    #[instrument(skip(self))]
    pub async fn get_wsl_athlete_points(&self, stop_number: u32) -> Result<Vec<AthletePoints>> {
        let html = scraper::wsl::get_athletes_page(&self.http, &self.wsl_base_url, stop_number).await?;
        scraper::wsl::parse_athlete_points(&html)
    }

    /// Log in to Fantasy Surfer with the configured credentials.
    #[instrument(skip(self))]
    pub async fn login(&self) -> Result<CookieJar> {
        let credentials = self
            .credentials
            .as_ref()
            .ok_or(LeagueError::MissingCredentials)?;
        session::login(&self.login_http, &self.fantasy_surfer_base_url, credentials).await
    }

    /// Fetch the raw team page of a Fantasy Surfer player.
    #[instrument(skip(self, cookies))]
    pub async fn get_fantasy_surfer_team_page(
        &self,
        fantasy_surfer_id: &str,
        cookies: &CookieJar,
    ) -> Result<String> {
        scraper::fantasy_surfer::get_team_page(
            &self.http,
            &self.fantasy_surfer_base_url,
            fantasy_surfer_id,
            cookies,
        )
        .await
    }
}
