//! The fixed set of teams and their display metadata.
//!
//! Only [`TeamId`] takes part in assignment. The names and colors on
//! [`Team`] exist for dashboards and kiosks that render results.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Identifier of a team ("color" in the event vocabulary).
///
/// Declaration order is the canonical order used for the default roster
/// and for stable iteration over counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "bindings/")]
pub enum TeamId {
    /// Phoenix Red.
    Red,
    /// Ocean Blue.
    Blue,
    /// Forest Green.
    Green,
    /// Thunder Yellow.
    Yellow,
    /// Mystery Purple.
    Purple,
    /// Tiger Orange.
    Orange,
}

impl TeamId {
    /// Every team, in canonical order.
    pub const ALL: [Self; 6] = [
        Self::Red,
        Self::Blue,
        Self::Green,
        Self::Yellow,
        Self::Purple,
        Self::Orange,
    ];

    /// Wire name of the team, identical to its serialized form.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Red => "red",
            Self::Blue => "blue",
            Self::Green => "green",
            Self::Yellow => "yellow",
            Self::Purple => "purple",
            Self::Orange => "orange",
        }
    }

    /// Look up a team by its wire name. Matching is exact.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|team| team.as_str() == name)
    }

    /// Human-readable team name.
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Red => "Phoenix Red",
            Self::Blue => "Ocean Blue",
            Self::Green => "Forest Green",
            Self::Yellow => "Thunder Yellow",
            Self::Purple => "Mystery Purple",
            Self::Orange => "Tiger Orange",
        }
    }

    /// Background color as a CSS hex string.
    pub const fn hex(self) -> &'static str {
        match self {
            Self::Red => "#EF4444",
            Self::Blue => "#3B82F6",
            Self::Green => "#10B981",
            Self::Yellow => "#F59E0B",
            Self::Purple => "#8B5CF6",
            Self::Orange => "#F97316",
        }
    }

    /// Foreground color to draw on top of [`Self::hex`].
    pub const fn text_color(self) -> &'static str {
        "#FFFFFF"
    }

    /// Full display record for this team.
    pub fn team(self) -> Team {
        Team {
            id: self,
            name: self.display_name().to_owned(),
            hex: self.hex().to_owned(),
            text_color: self.text_color().to_owned(),
        }
    }
}

impl core::fmt::Display for TeamId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A team together with its presentation metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct Team {
    /// Team identifier.
    pub id: TeamId,
    /// Display name.
    pub name: String,
    /// Background color (CSS hex).
    pub hex: String,
    /// Text color (CSS hex).
    pub text_color: String,
}
