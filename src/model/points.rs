use serde::Serialize;
use strum_macros::EnumString;

use super::league::{AthleteId, LeagueType};

/// Availability label shown next to an athlete on the WSL athletes page.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, EnumString, strum_macros::Display)]
pub enum AthleteStatus {
    #[default]
    #[serde(rename = "active")]
    #[strum(serialize = "active")]
    Active,
    #[serde(rename = "OUT")]
    #[strum(serialize = "OUT")]
    Out,
    #[serde(rename = "INJ")]
    #[strum(serialize = "INJ")]
    Injured,
}

/// One row of the WSL athletes page for a tour stop.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AthletePoints {
    pub name: String,
    pub country: String,
    pub tier: String,
    pub points: f64,
    pub status: AthleteStatus,
}

/// Points an athlete scored in a contest on one fantasy game.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SurferPoints {
    pub athlete_id: AthleteId,
    pub contest_id: String,
    pub league: LeagueType,
    pub points: f64,
}

/// A participant's aggregate score in a contest on one fantasy game.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContestStanding {
    pub participant_id: String,
    pub contest_id: String,
    pub league: LeagueType,
    pub points: f64,
}
