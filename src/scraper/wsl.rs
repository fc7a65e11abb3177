use std::str::FromStr;

use ::scraper::{ElementRef, Html, Selector};
use itertools::Itertools;
use tracing::{debug, instrument, warn};

use crate::error::{LeagueError, Result};
use crate::model::{AthletePoints, AthleteStatus, Tier, WslRoster, WslRosterSlot};
use crate::scraper::{self, element_text, has_match, parse_float_lenient, select_text};

/// Heading of the roster section the league plays.
const MENS_TOUR: &str = "Men's Championship Tour";

#[instrument(skip(client))]
pub(crate) async fn get_roster_page(
    client: &reqwest::Client,
    base_url: &str,
    wsl_id: &str,
    stop_number: u32,
) -> Result<String> {
    let url = format!("{base_url}/team/{wsl_id}/roster?gameStopNumber={stop_number}");
    scraper::fetch_page(client, &url, None).await
}

#[instrument(skip(client))]
pub(crate) async fn get_athletes_page(
    client: &reqwest::Client,
    base_url: &str,
    stop_number: u32,
) -> Result<String> {
    let url = format!("{base_url}/athletes?gameStopNumber={stop_number}");
    scraper::fetch_page(client, &url, None).await
}

/// Extract the men's tour roster from a WSL fantasy team page.
///
/// Tier sizes are not checked here; an incomplete page yields short tiers and
/// is rejected during validation.
pub fn parse_roster(html: &str) -> Result<WslRoster> {
    let document = Html::parse_document(html);

    let section_selector = Selector::parse(".team-roster")?;
    let tour_name_selector = Selector::parse(".tour-name")?;
    let sections = document.select(&section_selector).collect_vec();
    debug!(count = sections.len(), "found team roster sections");

    let section = sections
        .into_iter()
        .find(|section| {
            select_text(section, &tour_name_selector)
                .replace('\u{2019}', "'")
                .contains(MENS_TOUR)
        })
        .ok_or(LeagueError::ElementNotFound {
            context: "men's championship tour roster section",
        })?;

    let mut roster = WslRoster::default();
    for tier in Tier::ALL {
        let row_selector = Selector::parse(&format!("[class*=\"teamRosterSlot-{tier}\"]"))?;
        for row in section.select(&row_selector) {
            match parse_roster_row(&row)? {
                Some(slot) => roster.tier_mut(tier).push(slot),
                None => warn!(%tier, "dropping roster row without athlete name"),
            }
        }
        debug!(%tier, count = roster.tier(tier).len(), "parsed roster tier");
    }

    let team_points_selector = Selector::parse(".team-points")?;
    roster.team_points = section
        .select(&team_points_selector)
        .find(|el| !inside_roster_slot(el))
        .map(|el| element_text(&el))
        .filter(|text| !text.is_empty())
        .map(|text| parse_float_lenient(&text));

    Ok(roster)
}

/// Whether `el` sits inside an athlete's roster slot rather than the team header.
fn inside_roster_slot(el: &ElementRef) -> bool {
    el.ancestors()
        .filter_map(ElementRef::wrap)
        .any(|ancestor| {
            ancestor
                .value()
                .attr("class")
                .is_some_and(|class| class.contains("teamRosterSlot"))
        })
}

fn parse_roster_row(row: &ElementRef) -> Result<Option<WslRosterSlot>> {
    let name_selector = Selector::parse(".athlete-name")?;
    let country_selector = Selector::parse(".athlete-country-name")?;
    let power_selector = Selector::parse(".power-athlete")?;

    let name = select_text(row, &name_selector);
    if name.is_empty() {
        return Ok(None);
    }

    Ok(Some(WslRosterSlot {
        name,
        country: select_text(row, &country_selector),
        is_power_surfer: has_match(row, &power_selector),
    }))
}

/// Extract every athlete row from the WSL athletes page for a tour stop.
pub fn parse_athlete_points(html: &str) -> Result<Vec<AthletePoints>> {
    let document = Html::parse_document(html);

    let row_selector = Selector::parse("tbody tr")?;
    let name_selector = Selector::parse(".athlete-name")?;
    let country_selector = Selector::parse(".athlete-country-name")?;
    let tier_selector = Selector::parse(".athleteFantasyEventTier.tier")?;
    let points_selector = Selector::parse(".total-points.last")?;
    let status_selector = Selector::parse(".status span")?;

    let athletes = document
        .select(&row_selector)
        .filter_map(|row| {
            let name = select_text(&row, &name_selector);
            if name.is_empty() {
                return None;
            }
            let status = row
                .select(&status_selector)
                .next()
                .map(|el| element_text(&el))
                .and_then(|text| AthleteStatus::from_str(&text).ok())
                .unwrap_or_default();

            Some(AthletePoints {
                name,
                country: select_text(&row, &country_selector),
                tier: select_text(&row, &tier_selector),
                points: parse_float_lenient(&select_text(&row, &points_selector)),
                status,
            })
        })
        .collect_vec();

    debug!(count = athletes.len(), "parsed athlete points");
    Ok(athletes)
}
