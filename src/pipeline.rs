//! Batch runs: one page per tracked participant, processed in order.
//!
//! Each participant ends in exactly one [`ParticipantOutcome`]. Failures are
//! recorded in the [`BatchSummary`] and never stop the batch; the only errors
//! returned to the caller are a failed login and a failed datastore read
//! before the first participant is processed.

use std::time::Duration;

use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::client::LeagueClient;
use crate::error::{LeagueError, Result};
use crate::model::{
    AthletePoints, ContestHistory, ContestStanding, FantasySurferLineup, HistorySurfer,
    LeagueType, Participant, ReconciledSlot, SurferPoints, Tier, WslLineup, WslRoster,
    WslRosterSlot,
};
use crate::reconcile::Reconciler;
use crate::scraper::{fantasy_surfer, wsl};
use crate::store::Store;
use crate::validate::{validate_fantasy_surfer_roster, validate_wsl_roster};

/// Stop number used when neither the request nor the contest provides one.
pub const DEFAULT_STOP_NUMBER: u32 = 1;

/// Terminal state of one participant in a batch.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum ParticipantOutcome {
    FetchFailed {
        #[serde(skip_serializing_if = "Option::is_none")]
        http_status: Option<u16>,
        error: String,
    },
    ExtractFailed {
        error: String,
    },
    ValidationFailed {
        error: String,
        unresolved: Vec<String>,
    },
    Persisted {
        unresolved: Vec<String>,
    },
    PersistFailed {
        error: String,
        unresolved: Vec<String>,
    },
}

impl ParticipantOutcome {
    fn fetch_failed(err: &LeagueError) -> Self {
        let http_status = match err {
            LeagueError::UnexpectedStatus { status, .. } => Some(status.as_u16()),
            _ => None,
        };
        ParticipantOutcome::FetchFailed {
            http_status,
            error: err.to_string(),
        }
    }

    pub fn is_persisted(&self) -> bool {
        matches!(self, ParticipantOutcome::Persisted { .. })
    }

    pub fn is_fetch_failure(&self) -> bool {
        matches!(self, ParticipantOutcome::FetchFailed { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantReport {
    pub user_id: String,
    pub name: String,
    pub external_id: String,
    #[serde(flatten)]
    pub outcome: ParticipantOutcome,
}

/// The raw extraction for one participant, before reconciliation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum FetchedRoster {
    Roster(WslRoster),
    Contests(Vec<ContestHistory>),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamRoster {
    pub user_id: String,
    pub external_id: String,
    #[serde(flatten)]
    pub roster: FetchedRoster,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchSummary {
    pub rosters: Vec<TeamRoster>,
    pub results: Vec<ParticipantReport>,
    pub total_teams: usize,
    pub successful_fetches: usize,
    pub failed_fetches: usize,
    pub persisted: usize,
    /// Fetched participants whose roster was not written.
    pub rejected: usize,
}

impl BatchSummary {
    fn new(total_teams: usize) -> Self {
        Self {
            total_teams,
            ..Self::default()
        }
    }

    fn record(&mut self, report: ParticipantReport, roster: Option<FetchedRoster>) {
        if let Some(roster) = roster {
            self.rosters.push(TeamRoster {
                user_id: report.user_id.clone(),
                external_id: report.external_id.clone(),
                roster,
            });
        }
        if report.outcome.is_fetch_failure() {
            self.failed_fetches += 1;
        } else {
            self.successful_fetches += 1;
            if report.outcome.is_persisted() {
                self.persisted += 1;
            } else {
                self.rejected += 1;
            }
        }
        self.results.push(report);
    }
}

/// Result of a points run for one tour stop.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PointsSummary {
    pub success: bool,
    pub surfers: usize,
    pub points: Vec<AthletePoints>,
    pub unresolved: Vec<String>,
}

/// Stop number for a WSL fetch: the requested one, else the contest's own,
/// else [`DEFAULT_STOP_NUMBER`].
pub fn resolve_stop_number(store: &Store, contest_id: &str, requested: Option<u32>) -> Result<u32> {
    if let Some(stop) = requested {
        return Ok(stop);
    }
    let stored = store.get_contest(contest_id)?.and_then(|c| c.stop_number);
    Ok(stored.unwrap_or(DEFAULT_STOP_NUMBER))
}

/// Fetch, reconcile, validate and store the WSL roster of every participant
/// with a WSL id.
#[instrument(skip(client, store))]
pub async fn run_wsl_roster_batch(
    client: &LeagueClient,
    store: &Store,
    contest_id: &str,
    stop_number: Option<u32>,
) -> Result<BatchSummary> {
    let stop_number = resolve_stop_number(store, contest_id, stop_number)?;
    let participants = store.participants_with_wsl_id()?;
    let reconciler = Reconciler::new(store.list_athletes()?);
    info!(participants = participants.len(), stop_number, "starting wsl roster batch");

    let mut summary = BatchSummary::new(participants.len());
    for participant in &participants {
        let Some(wsl_id) = participant.wsl_id.as_deref() else {
            continue;
        };
        debug!(user = %participant.id, wsl_id, "processing participant");

        let (roster, outcome) = match client.get_wsl_roster_page(wsl_id, stop_number).await {
            Ok(html) => process_wsl_roster(store, &reconciler, &participant.id, contest_id, &html),
            Err(e) => {
                warn!(user = %participant.id, error = %e, "roster fetch failed");
                (None, ParticipantOutcome::fetch_failed(&e))
            }
        };
        summary.record(report(participant, wsl_id, outcome), roster.map(FetchedRoster::Roster));
    }

    info!(
        persisted = summary.persisted,
        rejected = summary.rejected,
        failed_fetches = summary.failed_fetches,
        "wsl roster batch finished"
    );
    Ok(summary)
}

/// Log in once, then fetch, reconcile, validate and store the Fantasy Surfer
/// roster of every participant with a Fantasy Surfer id.
#[instrument(skip(client, store))]
pub async fn run_fantasy_surfer_batch(
    client: &LeagueClient,
    store: &Store,
    contest_id: &str,
    delay: Duration,
) -> Result<BatchSummary> {
    let participants = store.participants_with_fantasy_surfer_id()?;
    if participants.is_empty() {
        info!("no participants with a fantasy surfer id");
        return Ok(BatchSummary::new(0));
    }
    let contest_name = store.get_contest(contest_id)?.map(|c| c.name);
    let reconciler = Reconciler::new(store.list_athletes()?);
    let cookies = client.login().await?;
    info!(participants = participants.len(), "starting fantasy surfer batch");

    let mut summary = BatchSummary::new(participants.len());
    for (i, participant) in participants.iter().enumerate() {
        let Some(fs_id) = participant.fantasy_surfer_id.as_deref() else {
            continue;
        };
        if i > 0 && !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        debug!(user = %participant.id, fantasy_surfer_id = fs_id, "processing participant");

        let (history, outcome) = match client.get_fantasy_surfer_team_page(fs_id, &cookies).await {
            Ok(html) => process_fantasy_surfer_roster(
                store,
                &reconciler,
                &participant.id,
                contest_id,
                contest_name.as_deref(),
                &html,
            ),
            Err(e) => {
                warn!(user = %participant.id, error = %e, "team page fetch failed");
                (None, ParticipantOutcome::fetch_failed(&e))
            }
        };
        summary.record(report(participant, fs_id, outcome), history.map(FetchedRoster::Contests));
    }

    info!(
        persisted = summary.persisted,
        rejected = summary.rejected,
        failed_fetches = summary.failed_fetches,
        "fantasy surfer batch finished"
    );
    Ok(summary)
}

/// Fetch a stop's athlete results and store WSL points for every athlete
/// whose name resolves.
#[instrument(skip(client, store))]
pub async fn run_wsl_points(
    client: &LeagueClient,
    store: &Store,
    contest_id: &str,
    stop_number: u32,
) -> Result<PointsSummary> {
    let points = client.get_wsl_athlete_points(stop_number).await?;
    let reconciler = Reconciler::new(store.list_athletes()?);
    let unresolved = store_wsl_points(store, &reconciler, contest_id, &points)?;
    info!(surfers = points.len(), unresolved = unresolved.len(), "stored wsl points");

    Ok(PointsSummary {
        success: true,
        surfers: points.len(),
        points,
        unresolved,
    })
}

/// Write WSL points for each resolved athlete. Returns the names that did
/// not resolve.
pub(crate) fn store_wsl_points(
    store: &Store,
    reconciler: &Reconciler,
    contest_id: &str,
    points: &[AthletePoints],
) -> Result<Vec<String>> {
    let mut unresolved = Vec::new();
    for athlete in points {
        match reconciler.resolve_display(&athlete.name).into_athlete_id() {
            Some(athlete_id) => store.upsert_surfer_points(&SurferPoints {
                athlete_id,
                contest_id: contest_id.to_string(),
                league: LeagueType::Wsl,
                points: athlete.points,
            })?,
            None => unresolved.push(athlete.name.clone()),
        }
    }
    Ok(unresolved)
}

fn report(participant: &Participant, external_id: &str, outcome: ParticipantOutcome) -> ParticipantReport {
    ParticipantReport {
        user_id: participant.id.clone(),
        name: participant.display_name(),
        external_id: external_id.to_string(),
        outcome,
    }
}

fn unresolved_names<'a, T: 'a>(
    slots: impl IntoIterator<Item = &'a ReconciledSlot<T>>,
    name: impl Fn(&T) -> &str,
) -> Vec<String> {
    slots
        .into_iter()
        .filter(|s| !s.is_resolved())
        .map(|s| name(&s.slot).to_string())
        .collect()
}

pub(crate) fn reconcile_wsl_roster(
    reconciler: &Reconciler,
    roster: &WslRoster,
) -> Vec<(Tier, ReconciledSlot<WslRosterSlot>)> {
    roster
        .slots()
        .map(|(tier, slot)| {
            let athlete_id = reconciler.resolve_display(&slot.name).into_athlete_id();
            (
                tier,
                ReconciledSlot {
                    slot: slot.clone(),
                    athlete_id,
                },
            )
        })
        .collect()
}

pub(crate) fn reconcile_history(
    reconciler: &Reconciler,
    contest: &ContestHistory,
) -> Vec<ReconciledSlot<HistorySurfer>> {
    contest
        .surfers
        .iter()
        .map(|surfer| ReconciledSlot {
            athlete_id: reconciler.resolve_display(&surfer.name).into_athlete_id(),
            slot: surfer.clone(),
        })
        .collect()
}

/// Extract, reconcile, validate and store one WSL roster page.
pub(crate) fn process_wsl_roster(
    store: &Store,
    reconciler: &Reconciler,
    participant_id: &str,
    contest_id: &str,
    html: &str,
) -> (Option<WslRoster>, ParticipantOutcome) {
    let roster = match wsl::parse_roster(html) {
        Ok(roster) => roster,
        Err(e) => {
            warn!(user = participant_id, error = %e, "roster extraction failed");
            return (None, ParticipantOutcome::ExtractFailed { error: e.to_string() });
        }
    };

    let reconciled = reconcile_wsl_roster(reconciler, &roster);
    let unresolved = unresolved_names(reconciled.iter().map(|(_, s)| s), |s| s.name.as_str());

    let outcome = match validate_wsl_roster(&reconciled) {
        Ok(lineup) => match persist_wsl(store, participant_id, contest_id, &lineup, roster.team_points) {
            Ok(()) => ParticipantOutcome::Persisted { unresolved },
            Err(e) => {
                warn!(user = participant_id, error = %e, "roster write failed");
                ParticipantOutcome::PersistFailed {
                    error: e.to_string(),
                    unresolved,
                }
            }
        },
        Err(e) => {
            warn!(user = participant_id, error = %e, ?unresolved, "roster rejected");
            ParticipantOutcome::ValidationFailed {
                error: e.to_string(),
                unresolved,
            }
        }
    };
    (Some(roster), outcome)
}

fn persist_wsl(
    store: &Store,
    participant_id: &str,
    contest_id: &str,
    lineup: &WslLineup,
    team_points: Option<f64>,
) -> Result<()> {
    store.upsert_wsl_roster(participant_id, contest_id, lineup)?;
    if let Some(points) = team_points {
        store.upsert_contest_standing(&ContestStanding {
            participant_id: participant_id.to_string(),
            contest_id: contest_id.to_string(),
            league: LeagueType::Wsl,
            points,
        })?;
    }
    Ok(())
}

/// The history row for `contest_name`: the first whose name contains it or
/// is contained in it, ignoring case. Falls back to the first row.
pub(crate) fn select_contest<'a>(
    history: &'a [ContestHistory],
    contest_name: Option<&str>,
) -> Option<&'a ContestHistory> {
    contest_name
        .map(str::to_lowercase)
        .and_then(|wanted| {
            history.iter().find(|contest| {
                let name = contest.name.to_lowercase();
                name.contains(&wanted) || wanted.contains(&name)
            })
        })
        .or_else(|| history.first())
}

/// Extract, reconcile, validate and store one Fantasy Surfer team page.
pub(crate) fn process_fantasy_surfer_roster(
    store: &Store,
    reconciler: &Reconciler,
    participant_id: &str,
    contest_id: &str,
    contest_name: Option<&str>,
    html: &str,
) -> (Option<Vec<ContestHistory>>, ParticipantOutcome) {
    let history = match fantasy_surfer::parse_contest_history(html) {
        Ok(history) => history,
        Err(e) => {
            warn!(user = participant_id, error = %e, "history extraction failed");
            return (None, ParticipantOutcome::ExtractFailed { error: e.to_string() });
        }
    };

    let Some(contest) = select_contest(&history, contest_name) else {
        let err = LeagueError::ElementNotFound {
            context: "contest history row",
        };
        warn!(user = participant_id, "no contest history on team page");
        return (Some(history), ParticipantOutcome::ExtractFailed { error: err.to_string() });
    };
    debug!(user = participant_id, contest = %contest.name, "selected history row");

    let reconciled = reconcile_history(reconciler, contest);
    let unresolved = unresolved_names(&reconciled, |s| s.name.as_str());

    let outcome = match validate_fantasy_surfer_roster(&reconciled) {
        Ok(lineup) => match persist_fantasy_surfer(store, participant_id, contest_id, &lineup, &reconciled, contest) {
            Ok(()) => ParticipantOutcome::Persisted { unresolved },
            Err(e) => {
                warn!(user = participant_id, error = %e, "roster write failed");
                ParticipantOutcome::PersistFailed {
                    error: e.to_string(),
                    unresolved,
                }
            }
        },
        Err(e) => {
            warn!(user = participant_id, error = %e, ?unresolved, "roster rejected");
            ParticipantOutcome::ValidationFailed {
                error: e.to_string(),
                unresolved,
            }
        }
    };
    (Some(history), outcome)
}

fn persist_fantasy_surfer(
    store: &Store,
    participant_id: &str,
    contest_id: &str,
    lineup: &FantasySurferLineup,
    reconciled: &[ReconciledSlot<HistorySurfer>],
    contest: &ContestHistory,
) -> Result<()> {
    store.upsert_fantasy_surfer_roster(participant_id, contest_id, lineup)?;
    // Points cover every resolved surfer, including those past the lineup cap.
    for (athlete_id, surfer) in reconciled
        .iter()
        .filter_map(|s| s.athlete_id.as_ref().map(|id| (id, &s.slot)))
    {
        store.upsert_surfer_points(&SurferPoints {
            athlete_id: athlete_id.clone(),
            contest_id: contest_id.to_string(),
            league: LeagueType::FantasySurfer,
            points: surfer.points as f64,
        })?;
    }
    store.upsert_contest_standing(&ContestStanding {
        participant_id: participant_id.to_string(),
        contest_id: contest_id.to_string(),
        league: LeagueType::FantasySurfer,
        points: contest.total_points as f64,
    })?;
    Ok(())
}
