//! Assignment logic and configuration for Huddle.
//!
//! - [`assigner`] -- picks the next team so that team sizes stay balanced
//! - [`roster`] -- the validated, non-empty set of teams in play
//! - [`config`] -- YAML configuration with environment overrides

pub mod assigner;
pub mod config;
pub mod roster;

pub use assigner::{AssignError, candidates, pick, pick_random};
pub use config::{ConfigError, HuddleConfig};
pub use roster::Roster;
