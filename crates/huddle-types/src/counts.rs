//! Per-team counters.
//!
//! [`CounterState`] is the snapshot that the authoritative service
//! persists, publishes to observers, and returns from `GET /counts`. It
//! serializes as a flat `{"red": 3, "blue": 2, ...}` object so a full
//! snapshot (never a delta) can be dropped straight into a chart.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::team::TeamId;

/// Mapping from every rostered team to the number of people assigned to it.
///
/// Counts only ever grow, one increment at a time. A team that is not
/// present in the map is not part of the roster.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct CounterState(#[ts(type = "Record<string, number>")] BTreeMap<TeamId, u64>);

impl CounterState {
    /// All-zero counters for the given teams.
    pub fn zeroed(teams: &[TeamId]) -> Self {
        Self(teams.iter().map(|team| (*team, 0)).collect())
    }

    /// Current count for `team`, or `None` if the team is not tracked.
    pub fn get(&self, team: TeamId) -> Option<u64> {
        self.0.get(&team).copied()
    }

    /// Whether `team` is tracked.
    pub fn contains(&self, team: TeamId) -> bool {
        self.0.contains_key(&team)
    }

    /// Number of tracked teams.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no team is tracked at all.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Sum of all counts.
    ///
    /// Because counts never decrease, the total doubles as a version
    /// number for snapshots.
    pub fn total(&self) -> u64 {
        self.0.values().fold(0_u64, |acc, n| acc.saturating_add(*n))
    }

    /// Smallest count across all tracked teams.
    pub fn min_count(&self) -> Option<u64> {
        self.0.values().copied().min()
    }

    /// Tracked teams in canonical order.
    pub fn teams(&self) -> impl Iterator<Item = TeamId> + '_ {
        self.0.keys().copied()
    }

    /// `(team, count)` pairs in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (TeamId, u64)> + '_ {
        self.0.iter().map(|(team, count)| (*team, *count))
    }

    /// Add one to `team` and return its new count.
    ///
    /// Returns `None` (and changes nothing) if the team is not tracked.
    pub fn increment(&mut self, team: TeamId) -> Option<u64> {
        let count = self.0.get_mut(&team)?;
        *count = count.saturating_add(1);
        Some(*count)
    }

    /// Restrict the counters to `roster`.
    ///
    /// Rostered teams missing from `self` are added with a zero count;
    /// teams that are not on the roster are dropped.
    #[must_use]
    pub fn normalized(&self, roster: &[TeamId]) -> Self {
        Self(
            roster
                .iter()
                .map(|team| (*team, self.get(*team).unwrap_or(0)))
                .collect(),
        )
    }

    /// Dashboard rows (one per tracked team) with display metadata.
    pub fn summaries(&self) -> Vec<TeamSummary> {
        self.iter()
            .map(|(team, count)| TeamSummary {
                id: team,
                name: team.display_name().to_owned(),
                hex: team.hex().to_owned(),
                text_color: team.text_color().to_owned(),
                count,
            })
            .collect()
    }
}

impl FromIterator<(TeamId, u64)> for CounterState {
    fn from_iter<I: IntoIterator<Item = (TeamId, u64)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// One chart row: a team, its display metadata, and its current count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct TeamSummary {
    /// Team identifier.
    pub id: TeamId,
    /// Display name.
    pub name: String,
    /// Bar fill color (CSS hex).
    pub hex: String,
    /// Text color (CSS hex).
    pub text_color: String,
    /// Current count.
    #[ts(type = "number")]
    pub count: u64,
}
