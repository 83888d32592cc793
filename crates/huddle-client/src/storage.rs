//! Client-local persisted records.
//!
//! A [`LocalStore`] is a directory holding one JSON file per storage key.
//! It survives restarts of the kiosk, so a person who already has a team
//! keeps it until the kiosk is reset.
//!
//! Two keys are used:
//!
//! - [`USER_STATE_KEY`]: the [`UserAssignmentRecord`] of the current person
//! - [`OFFLINE_COUNTS_KEY`]: the shadow [`CounterState`] of the offline fallback
//!
//! Records are replaced with a write to `<key>.json.tmp` followed by a
//! rename, so a reader never sees a half-written file.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use huddle_core::Roster;
use huddle_types::{CounterState, UserAssignmentRecord};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::error::ClientError;

/// Key of the current person's assignment record.
pub const USER_STATE_KEY: &str = "huddle_user_state_v1";

/// Key of the offline shadow counters.
pub const OFFLINE_COUNTS_KEY: &str = "huddle_offline_counts_v1";

/// A directory of JSON records addressed by key.
#[derive(Debug, Clone)]
pub struct LocalStore {
    dir: PathBuf,
}

impl LocalStore {
    /// Store records under `dir`. The directory is created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory holding the records.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File backing `key`.
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    /// Read and decode the record under `key`.
    ///
    /// Returns `Ok(None)` if there is no record.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, ClientError> {
        let path = self.path_for(key);
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(ClientError::Storage { path, source }),
        }
    }

    /// Encode `value` and store it under `key`, replacing any old record.
    pub async fn set<T: Serialize + Sync>(&self, key: &str, value: &T) -> Result<(), ClientError> {
        let bytes = serde_json::to_vec_pretty(value)?;
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|source| ClientError::Storage {
                path: self.dir.clone(),
                source,
            })?;

        let path = self.path_for(key);
        let tmp = self.dir.join(format!("{key}.json.tmp"));
        tokio::fs::write(&tmp, &bytes)
            .await
            .map_err(|source| ClientError::Storage {
                path: tmp.clone(),
                source,
            })?;
        tokio::fs::rename(&tmp, &path)
            .await
            .map_err(|source| ClientError::Storage { path, source })?;
        debug!(key, "Local record written");
        Ok(())
    }

    /// Delete the record under `key`. A missing record is not an error.
    pub async fn remove(&self, key: &str) -> Result<(), ClientError> {
        let path = self.path_for(key);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                debug!(key, "Local record removed");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(source) => Err(ClientError::Storage { path, source }),
        }
    }

    /// The current person's record. Missing or unreadable records read as
    /// "not voted".
    pub async fn user_record(&self) -> UserAssignmentRecord {
        match self.get::<UserAssignmentRecord>(USER_STATE_KEY).await {
            Ok(Some(record)) => record,
            Ok(None) => UserAssignmentRecord::unvoted(),
            Err(e) => {
                warn!(error = %e, "User record unreadable, treating as not voted");
                UserAssignmentRecord::unvoted()
            }
        }
    }

    /// Persist the current person's record.
    pub async fn save_user_record(&self, record: &UserAssignmentRecord) -> Result<(), ClientError> {
        self.set(USER_STATE_KEY, record).await
    }

    /// Forget the current person's record.
    pub async fn clear_user_record(&self) -> Result<(), ClientError> {
        self.remove(USER_STATE_KEY).await
    }

    /// The offline shadow counters, normalized to `roster`.
    ///
    /// Missing or unreadable records read as all-zero counters.
    pub async fn shadow_counts(&self, roster: &Roster) -> CounterState {
        match self.get::<CounterState>(OFFLINE_COUNTS_KEY).await {
            Ok(Some(counts)) => counts.normalized(roster.teams()),
            Ok(None) => roster.zeroed_counts(),
            Err(e) => {
                warn!(error = %e, "Shadow counts unreadable, starting from zero");
                roster.zeroed_counts()
            }
        }
    }

    /// Persist the offline shadow counters.
    pub async fn save_shadow_counts(&self, counts: &CounterState) -> Result<(), ClientError> {
        self.set(OFFLINE_COUNTS_KEY, counts).await
    }
}
