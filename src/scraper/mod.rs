pub mod fantasy_surfer;
pub mod wsl;

use ::scraper::{ElementRef, Selector};
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, COOKIE, USER_AGENT};
use tracing::debug;

use crate::error::{LeagueError, Result};
use crate::session::CookieJar;

pub(crate) const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";
pub(crate) const ACCEPT_HTML: &str =
    "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8";
pub(crate) const ACCEPT_LANGUAGE_EN: &str = "en-US,en;q=0.5";

/// Apply the browser-like headers both external sites expect.
pub(crate) fn browser_headers(request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
    request
        .header(ACCEPT, ACCEPT_HTML)
        .header(ACCEPT_LANGUAGE, ACCEPT_LANGUAGE_EN)
        .header(USER_AGENT, BROWSER_USER_AGENT)
}

/// Fetch a URL and return the response body as raw markup.
///
/// The markup is returned unparsed so callers can extract it without holding a
/// document across an await point.
pub(crate) async fn fetch_page(
    client: &reqwest::Client,
    url: &str,
    cookies: Option<&CookieJar>,
) -> Result<String> {
    debug!(url, "fetching page");

    let mut request = browser_headers(client.get(url));
    if let Some(jar) = cookies {
        request = request.header(COOKIE, jar.header());
    }

    let response = request.send().await.map_err(|e| LeagueError::Http {
        url: url.to_owned(),
        source: e,
    })?;

    let status = response.status();
    if !status.is_success() {
        return Err(LeagueError::UnexpectedStatus {
            url: url.to_owned(),
            status,
        });
    }

    let body = response.text().await.map_err(|e| LeagueError::ResponseBody {
        url: url.to_owned(),
        source: e,
    })?;

    debug!(url, length = body.len(), "received page");
    Ok(body)
}

/// All text under the first element matching `selector`, with whitespace
/// runs collapsed. Returns an empty string if nothing matches.
pub(crate) fn select_text(element: &ElementRef, selector: &Selector) -> String {
    element
        .select(selector)
        .next()
        .map(|el| element_text(&el))
        .unwrap_or_default()
}

pub(crate) fn element_text(element: &ElementRef) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

pub(crate) fn has_match(element: &ElementRef, selector: &Selector) -> bool {
    element.select(selector).next().is_some()
}

/// Leading integer of a scraped number, ignoring thousands separators.
/// Unparsable text yields 0.
pub(crate) fn parse_int_lenient(text: &str) -> i64 {
    let cleaned: String = text.trim().chars().filter(|c| *c != ',').collect();
    let end = cleaned
        .char_indices()
        .find(|&(i, c)| !(c.is_ascii_digit() || (i == 0 && (c == '-' || c == '+'))))
        .map(|(i, _)| i)
        .unwrap_or(cleaned.len());
    cleaned[..end].parse().unwrap_or(0)
}

/// Leading decimal number of a scraped value. Unparsable text yields 0.
pub(crate) fn parse_float_lenient(text: &str) -> f64 {
    let cleaned: String = text.trim().chars().filter(|c| *c != ',').collect();
    let mut seen_dot = false;
    let end = cleaned
        .char_indices()
        .find(|&(i, c)| match c {
            '0'..='9' => false,
            '-' | '+' if i == 0 => false,
            '.' if !seen_dot => {
                seen_dot = true;
                false
            }
            _ => true,
        })
        .map(|(i, _)| i)
        .unwrap_or(cleaned.len());
    cleaned[..end].parse().unwrap_or(0.0)
}
