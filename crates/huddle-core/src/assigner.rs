//! Balanced team assignment.
//!
//! The next person always joins one of the teams with the fewest members.
//! When several teams are tied for fewest, the winner is drawn uniformly
//! at random. A first-match tie-break would always favor the team declared
//! first, which is most visible at startup when every team is at zero.
//!
//! The same function runs on the authoritative service and in the kiosk's
//! offline fallback.

use huddle_types::{CounterState, TeamId};
use rand::Rng;
use rand::seq::IndexedRandom;

/// Errors produced by the assigner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AssignError {
    /// There are no teams to choose from. This is a configuration error:
    /// a validated [`Roster`](crate::Roster) is never empty.
    #[error("cannot assign: the team roster is empty")]
    EmptyRoster,
}

/// Teams currently tied for the lowest count, in canonical order.
pub fn candidates(counts: &CounterState) -> Vec<TeamId> {
    let Some(min) = counts.min_count() else {
        return Vec::new();
    };
    counts
        .iter()
        .filter(|(_, count)| *count == min)
        .map(|(team, _)| team)
        .collect()
}

/// Pick the next team using `rng` for the tie-break.
///
/// # Errors
///
/// Returns [`AssignError::EmptyRoster`] if `counts` tracks no teams.
pub fn pick<R: Rng + ?Sized>(counts: &CounterState, rng: &mut R) -> Result<TeamId, AssignError> {
    candidates(counts)
        .choose(rng)
        .copied()
        .ok_or(AssignError::EmptyRoster)
}

/// Pick the next team using the thread-local RNG.
///
/// # Errors
///
/// Returns [`AssignError::EmptyRoster`] if `counts` tracks no teams.
pub fn pick_random(counts: &CounterState) -> Result<TeamId, AssignError> {
    pick(counts, &mut rand::rng())
}
