//! Assignment responses and the client-side vote record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::team::TeamId;

/// Body of a successful `POST /assign` response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct AssignmentResult {
    /// The team chosen for this request.
    pub assigned_team: TeamId,
}

/// Whether (and to which team) the person at this kiosk was assigned.
///
/// Lives only on the device that created it. It is written once on the
/// first successful assignment and removed when the kiosk is reset for
/// the next person.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct UserAssignmentRecord {
    /// Whether an assignment has been made.
    pub has_voted: bool,
    /// The assigned team, if any.
    pub assigned_team_id: Option<TeamId>,
    /// When the assignment was made.
    pub timestamp: Option<DateTime<Utc>>,
}

impl UserAssignmentRecord {
    /// A record for a fresh assignment to `team`, stamped now.
    pub fn voted(team: TeamId) -> Self {
        Self {
            has_voted: true,
            assigned_team_id: Some(team),
            timestamp: Some(Utc::now()),
        }
    }

    /// The empty record.
    pub const fn unvoted() -> Self {
        Self {
            has_voted: false,
            assigned_team_id: None,
            timestamp: None,
        }
    }

    /// The assigned team when the record describes a completed vote.
    pub const fn team(&self) -> Option<TeamId> {
        if self.has_voted {
            self.assigned_team_id
        } else {
            None
        }
    }
}

impl Default for UserAssignmentRecord {
    fn default() -> Self {
        Self::unvoted()
    }
}
