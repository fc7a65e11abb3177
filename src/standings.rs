//! Cross-game standings.
//!
//! Ranks are never stored. A participant's position on one game is the
//! 1-based index in that game's standings sorted by points, highest first.
//! The combined score for a contest is the sum of both positions, with
//! [`ABSENT_RANK`] standing in for a game the participant has no row on.
//! Lower combined scores rank higher.

use std::collections::HashMap;

use itertools::Itertools;
use serde::Serialize;

use crate::model::ContestStanding;

/// Position assigned to a participant missing from one game's standings.
pub const ABSENT_RANK: usize = 999;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CombinedStanding {
    pub participant_id: String,
    pub wsl_points: Option<f64>,
    pub wsl_rank: usize,
    pub fantasy_surfer_points: Option<f64>,
    pub fantasy_surfer_rank: usize,
    pub combined_score: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeagueStanding {
    pub participant_id: String,
    pub contests: usize,
    pub total_score: usize,
}

/// Participant ids with their 1-based position, highest points first.
/// Equal points keep their input order.
pub fn rank_positions(standings: &[ContestStanding]) -> Vec<(String, usize, f64)> {
    standings
        .iter()
        .sorted_by(|a, b| b.points.total_cmp(&a.points))
        .enumerate()
        .map(|(i, s)| (s.participant_id.clone(), i + 1, s.points))
        .collect()
}

/// Combine one contest's WSL and Fantasy Surfer standings.
pub fn combine_contest(wsl: &[ContestStanding], fantasy_surfer: &[ContestStanding]) -> Vec<CombinedStanding> {
    let wsl_ranks = rank_positions(wsl);
    let fs_ranks = rank_positions(fantasy_surfer);
    let fs_by_id: HashMap<&str, (usize, f64)> = fs_ranks
        .iter()
        .map(|(id, rank, points)| (id.as_str(), (*rank, *points)))
        .collect();
    let wsl_by_id: HashMap<&str, (usize, f64)> = wsl_ranks
        .iter()
        .map(|(id, rank, points)| (id.as_str(), (*rank, *points)))
        .collect();

    wsl_ranks
        .iter()
        .map(|(id, _, _)| id)
        .chain(
            fs_ranks
                .iter()
                .map(|(id, _, _)| id)
                .filter(|id| !wsl_by_id.contains_key(id.as_str())),
        )
        .unique()
        .map(|id| {
            let wsl = wsl_by_id.get(id.as_str()).copied();
            let fs = fs_by_id.get(id.as_str()).copied();
            let wsl_rank = wsl.map_or(ABSENT_RANK, |(rank, _)| rank);
            let fantasy_surfer_rank = fs.map_or(ABSENT_RANK, |(rank, _)| rank);
            CombinedStanding {
                participant_id: id.clone(),
                wsl_points: wsl.map(|(_, points)| points),
                wsl_rank,
                fantasy_surfer_points: fs.map(|(_, points)| points),
                fantasy_surfer_rank,
                combined_score: wsl_rank + fantasy_surfer_rank,
            }
        })
        .sorted_by_key(|s| s.combined_score)
        .collect()
}

/// Sum each participant's combined score over the contests they appear in.
pub fn league_table(per_contest: &[Vec<CombinedStanding>]) -> Vec<LeagueStanding> {
    let mut table: Vec<LeagueStanding> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for standing in per_contest.iter().flatten() {
        match index.get(standing.participant_id.as_str()) {
            Some(&i) => {
                table[i].contests += 1;
                table[i].total_score += standing.combined_score;
            }
            None => {
                index.insert(standing.participant_id.as_str(), table.len());
                table.push(LeagueStanding {
                    participant_id: standing.participant_id.clone(),
                    contests: 1,
                    total_score: standing.combined_score,
                });
            }
        }
    }

    table.sort_by_key(|s| s.total_score);
    table
}
