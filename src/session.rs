use std::collections::BTreeMap;

use reqwest::header::{COOKIE, LOCATION, SET_COOKIE};
use reqwest::StatusCode;
use tracing::{debug, info, instrument, warn};

use crate::config::Credentials;
use crate::error::{LeagueError, Result};
use crate::scraper::browser_headers;

/// Cookie the Fantasy Surfer site uses to identify a logged-in session.
pub const SESSION_COOKIE: &str = "PHPSESSID";

/// Cookies captured while logging in. Filled once, then only read.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CookieJar {
    cookies: BTreeMap<String, String>,
}

impl CookieJar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store the `name=value` pair of a single `Set-Cookie` header value.
    /// Attributes after the first `;` are ignored.
    pub fn absorb(&mut self, set_cookie: &str) {
        let pair = set_cookie.split(';').next().unwrap_or_default();
        if let Some((name, value)) = pair.split_once('=') {
            let name = name.trim();
            if !name.is_empty() {
                self.cookies.insert(name.to_string(), value.trim().to_string());
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.cookies.get(name).map(String::as_str)
    }

    /// Render the jar as a `Cookie` request header value.
    pub fn header(&self) -> String {
        self.cookies
            .iter()
            .map(|(name, value)| format!("{name}={value}"))
            .collect::<Vec<_>>()
            .join("; ")
    }

    pub fn is_empty(&self) -> bool {
        self.cookies.is_empty()
    }

    fn absorb_response(&mut self, response: &reqwest::Response) -> usize {
        let mut count = 0;
        for value in response.headers().get_all(SET_COOKIE) {
            match value.to_str() {
                Ok(raw) => {
                    self.absorb(raw);
                    count += 1;
                }
                Err(_) => warn!("skipping non-ascii Set-Cookie header"),
            }
        }
        count
    }
}

/// Log in to Fantasy Surfer and return the session cookies.
///
/// `client` must not follow redirects: the session cookie is set on the login
/// response itself. At most one redirect hop is followed by hand so cookies
/// set on the landing page are captured too.
#[instrument(skip(client, credentials))]
pub(crate) async fn login(
    client: &reqwest::Client,
    base_url: &str,
    credentials: &Credentials,
) -> Result<CookieJar> {
    let login_url = format!("{base_url}/login/");
    let form = [
        ("password", credentials.password.as_str()),
        ("username", credentials.username.as_str()),
        ("legacy_password", credentials.legacy_password.as_str()),
        ("persistent", "on"),
        ("submit", "Login"),
    ];

    let response = browser_headers(client.post(&login_url))
        .form(&form)
        .send()
        .await
        .map_err(|e| LeagueError::Http {
            url: login_url.clone(),
            source: e,
        })?;

    let mut jar = CookieJar::new();
    let status = response.status();
    let received = jar.absorb_response(&response);
    debug!(%status, cookies = received, "login response");

    if is_redirect(status) {
        if let Some(location) = response
            .headers()
            .get(LOCATION)
            .and_then(|l| l.to_str().ok())
        {
            let target = resolve_location(&login_url, location);
            debug!(url = %target, "following login redirect");
            let redirect = browser_headers(client.get(&target))
                .header(COOKIE, jar.header())
                .send()
                .await
                .map_err(|e| LeagueError::Http {
                    url: target.clone(),
                    source: e,
                })?;
            let received = jar.absorb_response(&redirect);
            debug!(status = %redirect.status(), cookies = received, "login redirect response");
        }
    }

    if jar.get(SESSION_COOKIE).is_none() {
        return Err(LeagueError::MissingSession {
            cookie: SESSION_COOKIE,
        });
    }

    info!("logged in to fantasy surfer");
    Ok(jar)
}

fn is_redirect(status: StatusCode) -> bool {
    matches!(status.as_u16(), 301 | 302 | 303 | 307 | 308)
}

/// Resolve a `Location` header against the URL that produced it.
fn resolve_location(request_url: &str, location: &str) -> String {
    match reqwest::Url::parse(request_url).and_then(|base| base.join(location)) {
        Ok(url) => url.to_string(),
        Err(_) => location.to_string(),
    }
}
