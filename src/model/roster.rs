use serde::Serialize;

use super::league::AthleteId;

/// Price tier of a slot on the WSL fantasy roster page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, strum_macros::Display)]
pub enum Tier {
    A,
    B,
    C,
}

impl Tier {
    pub const ALL: [Tier; 3] = [Tier::A, Tier::B, Tier::C];
}

/// One athlete row on a WSL fantasy roster page.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WslRosterSlot {
    pub name: String,
    pub country: String,
    pub is_power_surfer: bool,
}

/// The men's tour section of a WSL fantasy roster page, grouped by tier.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WslRoster {
    #[serde(rename = "A")]
    pub a: Vec<WslRosterSlot>,
    #[serde(rename = "B")]
    pub b: Vec<WslRosterSlot>,
    #[serde(rename = "C")]
    pub c: Vec<WslRosterSlot>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team_points: Option<f64>,
}

impl WslRoster {
    pub fn tier(&self, tier: Tier) -> &[WslRosterSlot] {
        match tier {
            Tier::A => &self.a,
            Tier::B => &self.b,
            Tier::C => &self.c,
        }
    }

    pub fn tier_mut(&mut self, tier: Tier) -> &mut Vec<WslRosterSlot> {
        match tier {
            Tier::A => &mut self.a,
            Tier::B => &mut self.b,
            Tier::C => &mut self.c,
        }
    }

    /// All slots with their tier, in A, B, C order.
    pub fn slots(&self) -> impl Iterator<Item = (Tier, &WslRosterSlot)> {
        Tier::ALL
            .into_iter()
            .flat_map(move |tier| self.tier(tier).iter().map(move |slot| (tier, slot)))
    }
}

/// A surfer picked in one Fantasy Surfer contest.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistorySurfer {
    pub name: String,
    pub ownership: String,
    pub points: i64,
    pub rank: String,
    pub cost: String,
}

/// One row of a Fantasy Surfer team's contest history.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContestHistory {
    pub name: String,
    pub total_points: i64,
    pub rank: String,
    pub total_spent: String,
    pub surfers: Vec<HistorySurfer>,
}

/// An extracted slot paired with the athlete its name resolved to, if any.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconciledSlot<T> {
    pub slot: T,
    pub athlete_id: Option<AthleteId>,
}

impl<T> ReconciledSlot<T> {
    pub fn is_resolved(&self) -> bool {
        self.athlete_id.is_some()
    }
}

/// A validated WSL roster ready to be written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WslLineup {
    pub a1: AthleteId,
    pub a2: AthleteId,
    pub b1: AthleteId,
    pub b2: AthleteId,
    pub b3: AthleteId,
    pub b4: AthleteId,
    pub c1: AthleteId,
    pub c2: AthleteId,
    pub power_surfer: AthleteId,
}

/// A priced roster slot on Fantasy Surfer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PricedSlot {
    pub athlete_id: AthleteId,
    pub price: i64,
    pub points: i64,
}

/// A validated Fantasy Surfer roster: between one and eight priced slots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FantasySurferLineup {
    pub slots: Vec<PricedSlot>,
}

impl FantasySurferLineup {
    pub const MAX_SLOTS: usize = 8;
}
