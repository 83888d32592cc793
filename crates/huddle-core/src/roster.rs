//! The validated set of teams in play.

use huddle_types::{CounterState, TeamId};

use crate::config::ConfigError;

/// A non-empty list of distinct teams.
///
/// Built once at startup. Everything downstream (store, assigner,
/// fallback) relies on the roster being non-empty, so an invalid team
/// list is rejected here rather than at request time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Roster {
    teams: Vec<TeamId>,
}

impl Roster {
    /// Validate `teams` into a roster.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyRoster`] for an empty list and
    /// [`ConfigError::DuplicateTeam`] if a team appears twice.
    pub fn new(teams: Vec<TeamId>) -> Result<Self, ConfigError> {
        if teams.is_empty() {
            return Err(ConfigError::EmptyRoster);
        }
        for (i, team) in teams.iter().enumerate() {
            if teams.iter().skip(i.saturating_add(1)).any(|t| t == team) {
                return Err(ConfigError::DuplicateTeam(*team));
            }
        }
        Ok(Self { teams })
    }

    /// Teams in configured order.
    pub fn teams(&self) -> &[TeamId] {
        &self.teams
    }

    /// Whether `team` is on the roster.
    pub fn contains(&self, team: TeamId) -> bool {
        self.teams.contains(&team)
    }

    /// All-zero counters for the roster.
    pub fn zeroed_counts(&self) -> CounterState {
        CounterState::zeroed(&self.teams)
    }
}

impl Default for Roster {
    /// All six teams.
    fn default() -> Self {
        Self {
            teams: TeamId::ALL.to_vec(),
        }
    }
}
