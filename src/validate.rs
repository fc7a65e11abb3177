use itertools::Itertools;

use crate::error::RosterError;
use crate::model::{
    AthleteId, FantasySurferLineup, HistorySurfer, PricedSlot, ReconciledSlot, Tier, WslLineup,
    WslRosterSlot,
};

/// Check a reconciled WSL roster has exactly 2/4/2 resolved athletes in tiers
/// A/B/C and exactly one resolved power surfer.
pub fn validate_wsl_roster(
    slots: &[(Tier, ReconciledSlot<WslRosterSlot>)],
) -> Result<WslLineup, RosterError> {
    let resolved_in = |tier: Tier| {
        slots
            .iter()
            .filter(|(t, _)| *t == tier)
            .filter_map(|(_, s)| s.athlete_id.clone())
            .collect_vec()
    };
    let (a, b, c) = (resolved_in(Tier::A), resolved_in(Tier::B), resolved_in(Tier::C));

    let counts = RosterError::TierCounts {
        a: a.len(),
        b: b.len(),
        c: c.len(),
    };
    let (Ok([a1, a2]), Ok([b1, b2, b3, b4]), Ok([c1, c2])) = (
        <[AthleteId; 2]>::try_from(a),
        <[AthleteId; 4]>::try_from(b),
        <[AthleteId; 2]>::try_from(c),
    ) else {
        return Err(counts);
    };

    let power = slots
        .iter()
        .filter(|(_, s)| s.slot.is_power_surfer)
        .filter_map(|(_, s)| s.athlete_id.clone())
        .collect_vec();
    let power_surfer = match power.as_slice() {
        [] => return Err(RosterError::MissingPowerSurfer),
        [id] => id.clone(),
        many => return Err(RosterError::MultiplePowerSurfers { found: many.len() }),
    };

    Ok(WslLineup {
        a1,
        a2,
        b1,
        b2,
        b3,
        b4,
        c1,
        c2,
        power_surfer,
    })
}

/// Fill up to eight priced slots, in page order, from the resolved surfers of
/// a Fantasy Surfer contest. At least one surfer must have resolved.
pub fn validate_fantasy_surfer_roster(
    slots: &[ReconciledSlot<HistorySurfer>],
) -> Result<FantasySurferLineup, RosterError> {
    let priced = slots
        .iter()
        .filter_map(|s| {
            s.athlete_id.as_ref().map(|id| PricedSlot {
                athlete_id: id.clone(),
                price: parse_cost(&s.slot.cost),
                points: s.slot.points,
            })
        })
        .take(FantasySurferLineup::MAX_SLOTS)
        .collect_vec();

    if priced.is_empty() {
        return Err(RosterError::NoResolvedSurfers);
    }
    Ok(FantasySurferLineup { slots: priced })
}

/// Whole-number price from a cost label such as `"$12.5M"`. Unparsable
/// labels price at 0.
pub fn parse_cost(cost: &str) -> i64 {
    let stripped: String = cost
        .chars()
        .filter(|c| !matches!(c, '$' | ',' | 'M'))
        .collect();
    crate::scraper::parse_int_lenient(&stripped)
}
