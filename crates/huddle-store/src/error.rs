//! Error types for the counter store.

use std::path::PathBuf;

use huddle_core::AssignError;
use huddle_types::TeamId;

/// Errors that can occur while reading or updating the counter record.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Reading or writing the backing file failed.
    #[error("storage I/O error on {path}: {source}")]
    Io {
        /// File that was being accessed.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The counter record could not be serialized.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The team is not on the roster.
    #[error("team {0} is not on the roster")]
    UnknownTeam(TeamId),

    /// The assignment decision inside a transaction failed.
    #[error("assignment error: {0}")]
    Assign(#[from] AssignError),
}
