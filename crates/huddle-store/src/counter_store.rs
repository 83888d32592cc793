//! The single-writer counter store.
//!
//! # Layout
//!
//! One pretty-printed JSON object, e.g. `{"red": 3, "blue": 2, ...}`.
//! A missing or unreadable record, or one that is not an object of
//! non-negative integers, is replaced by all-zero counters for the roster
//! when the store is opened. Keys that name no known team are dropped.
//!
//! # Writes
//!
//! Every increment writes the full record to `<path>.tmp`, syncs it, and
//! renames it over `<path>` before the new state becomes visible. If any
//! step fails the in-memory state is left untouched.

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use huddle_core::{AssignError, Roster};
use huddle_types::{CounterState, TeamId};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::error::StoreError;

/// Durable mapping from team to count.
///
/// All mutation goes through one [`Mutex`], so concurrent increments are
/// applied one at a time and none can be lost. The lock is held across
/// the disk write; reads wait for an in-flight write to finish and never
/// observe a state that is not yet durable.
#[derive(Debug)]
pub struct CounterStore {
    path: PathBuf,
    roster: Roster,
    state: Mutex<CounterState>,
}

impl CounterStore {
    /// Open (or create) the record at `path` for `roster`.
    ///
    /// The loaded counters are normalized to the roster: missing teams
    /// start at zero and teams no longer in play are dropped. If the
    /// normalized state differs from what was on disk it is written back
    /// immediately.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] if a fresh or repaired record cannot be
    /// written.
    pub async fn open(path: impl Into<PathBuf>, roster: Roster) -> Result<Self, StoreError> {
        let path = path.into();
        let (state, needs_write) = load(&path, &roster).await;
        if needs_write {
            write_record(&path, &state).await?;
        }
        info!(
            path = %path.display(),
            teams = state.len(),
            total = state.total(),
            "Counter store opened"
        );
        Ok(Self {
            path,
            roster,
            state: Mutex::new(state),
        })
    }

    /// Current counters.
    pub async fn read(&self) -> CounterState {
        self.state.lock().await.clone()
    }

    /// Add one to `team`, persist, and return the new counters.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::UnknownTeam`] if `team` is not rostered, or
    /// [`StoreError::Io`] / [`StoreError::Serialization`] if the record
    /// could not be written. Nothing changes on error.
    pub async fn increment(&self, team: TeamId) -> Result<CounterState, StoreError> {
        let mut guard = self.state.lock().await;
        self.commit(&mut guard, team).await
    }

    /// Decide which team to increment and increment it, atomically.
    ///
    /// `decide` sees the current counters while the store lock is held,
    /// so no other increment can land between the decision and the
    /// write. Returns the chosen team and the new counters.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Assign`] if `decide` fails, otherwise the
    /// same errors as [`Self::increment`].
    pub async fn transact<F>(&self, decide: F) -> Result<(TeamId, CounterState), StoreError>
    where
        F: FnOnce(&CounterState) -> Result<TeamId, AssignError>,
    {
        let mut guard = self.state.lock().await;
        let team = decide(&*guard)?;
        let next = self.commit(&mut guard, team).await?;
        Ok((team, next))
    }

    /// Path of the backing record.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Teams tracked by this store.
    pub const fn roster(&self) -> &Roster {
        &self.roster
    }

    async fn commit(
        &self,
        current: &mut CounterState,
        team: TeamId,
    ) -> Result<CounterState, StoreError> {
        let mut next = current.clone();
        let count = next.increment(team).ok_or(StoreError::UnknownTeam(team))?;
        write_record(&self.path, &next).await?;
        debug!(%team, count, total = next.total(), "Counter incremented");
        current.clone_from(&next);
        Ok(next)
    }
}

/// Read the record, falling back to zeros. The flag reports whether the
/// returned state differs from the file contents.
async fn load(path: &Path, roster: &Roster) -> (CounterState, bool) {
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            info!(path = %path.display(), "No counter record found, starting from zero");
            return (roster.zeroed_counts(), true);
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Counter record unreadable, reinitializing");
            return (roster.zeroed_counts(), true);
        }
    };

    let raw = match serde_json::from_slice::<BTreeMap<String, u64>>(&bytes) {
        Ok(raw) => raw,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Counter record is corrupt, reinitializing");
            return (roster.zeroed_counts(), true);
        }
    };

    let stored_keys = raw.len();
    let stored: CounterState = raw
        .into_iter()
        .filter_map(|(key, count)| match TeamId::from_name(&key) {
            Some(team) => Some((team, count)),
            None => {
                warn!(path = %path.display(), key = %key, count, "Dropping unknown team from counter record");
                None
            }
        })
        .collect();
    let normalized = stored.normalized(roster.teams());
    let changed = stored.len() != stored_keys || normalized != stored;
    if changed {
        info!(path = %path.display(), "Counter record normalized to the current roster");
    }
    (normalized, changed)
}

/// Write `state` to `path` through a synced temp file and a rename.
async fn write_record(path: &Path, state: &CounterState) -> Result<(), StoreError> {
    let bytes = serde_json::to_vec_pretty(state)?;
    let tmp = temp_path(path);

    let mut file = tokio::fs::File::create(&tmp).await.map_err(io_error(&tmp))?;
    file.write_all(&bytes).await.map_err(io_error(&tmp))?;
    file.sync_all().await.map_err(io_error(&tmp))?;
    drop(file);
    tokio::fs::rename(&tmp, path).await.map_err(io_error(path))?;
    Ok(())
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> StoreError + use<> {
    let path = path.to_path_buf();
    move |source| {
        warn!(path = %path.display(), error = %source, "Counter record write failed");
        StoreError::Io { path, source }
    }
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".tmp");
    PathBuf::from(name)
}
