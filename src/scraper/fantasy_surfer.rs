use ::scraper::{CaseSensitivity, ElementRef, Html, Selector};
use itertools::Itertools;
use tracing::{debug, instrument};

use crate::error::Result;
use crate::model::{ContestHistory, HistorySurfer};
use crate::scraper::{self, has_match, parse_int_lenient, select_text};
use crate::session::CookieJar;

#[instrument(skip(client, cookies))]
pub(crate) async fn get_team_page(
    client: &reqwest::Client,
    base_url: &str,
    fantasy_surfer_id: &str,
    cookies: &CookieJar,
) -> Result<String> {
    let url = format!("{base_url}/team/mens/?user={fantasy_surfer_id}");
    scraper::fetch_page(client, &url, Some(cookies)).await
}

/// Extract the contest history table from a Fantasy Surfer team page.
pub fn parse_contest_history(html: &str) -> Result<Vec<ContestHistory>> {
    let document = Html::parse_document(html);

    let row_selector = Selector::parse("#History .history-row")?;
    let contests = document
        .select(&row_selector)
        .filter(|row| {
            !row
                .value()
                .has_class("dark", CaseSensitivity::CaseSensitive)
        })
        .map(|row| parse_history_row(&row))
        .filter_map_ok(|contest| contest)
        .collect::<Result<Vec<_>>>()?;

    debug!(count = contests.len(), "parsed contest history");
    Ok(contests)
}

fn parse_history_row(row: &ElementRef) -> Result<Option<ContestHistory>> {
    let name_selector = Selector::parse(".history-event b")?;
    let score_selector = Selector::parse(".history-score span")?;
    let rank_selector = Selector::parse(".history-rank span")?;
    let spent_selector = Selector::parse(".history-date span")?;
    let surfer_selector = Selector::parse(".module-inner-contrast .history-drop")?;

    let name = select_text(row, &name_selector);
    if name.is_empty() {
        return Ok(None);
    }

    let surfers = row
        .select(&surfer_selector)
        .map(|surfer_row| parse_surfer_row(&surfer_row))
        .filter_map_ok(|surfer| surfer)
        .collect::<Result<Vec<_>>>()?;

    Ok(Some(ContestHistory {
        name,
        total_points: parse_int_lenient(&select_text(row, &score_selector)),
        rank: select_text(row, &rank_selector),
        total_spent: select_text(row, &spent_selector),
        surfers,
    }))
}

fn parse_surfer_row(row: &ElementRef) -> Result<Option<HistorySurfer>> {
    let header_selector = Selector::parse(".header-heading")?;
    let surfer_selector = Selector::parse(".history-surfer span")?;
    let points_selector = Selector::parse(".history-price span")?;
    let place_selector = Selector::parse(".history-place span")?;
    let cost_selector = Selector::parse(".history-points span")?;

    if has_match(row, &header_selector) {
        return Ok(None);
    }

    let Some((name, ownership)) = split_ownership(&select_text(row, &surfer_selector)) else {
        return Ok(None);
    };

    Ok(Some(HistorySurfer {
        name,
        ownership,
        points: parse_int_lenient(&select_text(row, &points_selector)),
        rank: select_text(row, &place_selector),
        cost: select_text(row, &cost_selector),
    }))
}

/// Split `"Name (NN%)"` into the name and `"NN%"`.
fn split_ownership(text: &str) -> Option<(String, String)> {
    let inner = text.trim().strip_suffix("%)")?;
    let (name, percent) = inner.rsplit_once('(')?;
    let name = name.trim();
    if name.is_empty() || percent.is_empty() || !percent.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    Some((name.to_string(), format!("{percent}%")))
}
