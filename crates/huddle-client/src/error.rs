//! Error types for the kiosk client.
//!
//! Most of these never reach the person at the kiosk. Network, timeout,
//! status and response errors trigger the offline fallback, and channel
//! errors switch the live feed to polling. What is left (local storage
//! failures) is shown as a generic "try again" message.

use std::path::PathBuf;
use std::time::Duration;

use huddle_core::AssignError;

/// Errors that can occur in the kiosk client.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The service could not be reached.
    #[error("network error: {0}")]
    Network(String),

    /// The service did not answer within the deadline.
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// The service answered with a non-success status.
    #[error("service returned HTTP {0}")]
    Status(u16),

    /// The service answered with a body that could not be understood.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// The live update channel failed.
    #[error("channel error: {0}")]
    Channel(String),

    /// Reading or writing a local record failed.
    #[error("local storage error on {path}: {source}")]
    Storage {
        /// File that was being accessed.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// A local record could not be (de)serialized.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration is invalid.
    #[error("config error: {0}")]
    Config(String),

    /// The local assignment could not be made.
    #[error("assignment error: {0}")]
    Assign(#[from] AssignError),
}

impl ClientError {
    /// Whether this error means "the service is unavailable", which the
    /// agent answers with the offline fallback.
    pub const fn is_unavailable(&self) -> bool {
        matches!(
            self,
            Self::Network(_) | Self::Timeout(_) | Self::Status(_) | Self::InvalidResponse(_)
        )
    }
}
