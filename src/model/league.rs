use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, EnumString};

/// Identifier of a row in the canonical athlete table.
pub type AthleteId = String;

/// A canonical athlete record. Seeded outside the scraping pipelines and only
/// looked up by them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Athlete {
    pub id: AthleteId,
    pub first_name: String,
    pub last_name: String,
    pub country: Option<String>,
    pub stance: Option<Stance>,
    pub birth_date: Option<NaiveDate>,
}

impl Athlete {
    pub fn new(id: impl Into<String>, first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            first_name: first_name.into(),
            last_name: last_name.into(),
            country: None,
            stance: None,
            birth_date: None,
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumString, AsRefStr, strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Stance {
    Regular,
    Goofy,
}

/// A time-boxed tour stop. `stop_number` is the external game's query parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contest {
    pub id: String,
    pub name: String,
    pub year: i32,
    pub country: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub is_active: bool,
    pub is_completed: bool,
    pub stop_number: Option<u32>,
}

/// A league member with optional ids on each external fantasy game.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub id: String,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub wsl_id: Option<String>,
    pub fantasy_surfer_id: Option<String>,
}

impl Participant {
    pub fn display_name(&self) -> String {
        match (&self.first_name, &self.last_name) {
            (Some(first), Some(last)) => format!("{first} {last}"),
            (Some(first), None) => first.clone(),
            (None, Some(last)) => last.clone(),
            (None, None) => self.id.clone(),
        }
    }
}

/// The external fantasy game a points or standings row belongs to.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, AsRefStr, strum_macros::Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum LeagueType {
    Wsl,
    FantasySurfer,
}
