//! Shared type definitions for Huddle.
//!
//! This crate is the single source of truth for the data shapes that move
//! between the authoritative service, its observers, and kiosk clients.
//! Types flow downstream to `TypeScript` via `ts-rs` for the dashboard.
//!
//! # Modules
//!
//! - [`team`] -- The fixed team set and its display metadata
//! - [`counts`] -- Per-team counters and dashboard projections
//! - [`records`] -- Assignment responses and the client-local vote record
//! - [`ids`] -- Identifier for live observer subscriptions

pub mod counts;
pub mod ids;
pub mod records;
pub mod team;

// Re-export all public types at crate root for convenience.
pub use counts::{CounterState, TeamSummary};
pub use ids::SubscriptionId;
pub use records::{AssignmentResult, UserAssignmentRecord};
pub use team::{Team, TeamId};

#[cfg(test)]
mod tests {
    //! `TypeScript` binding generation for the dashboard.

    #[test]
    fn export_bindings() {
        // The files are written to the `bindings/` directory relative to
        // the crate root.
        use ts_rs::TS;

        let _ = crate::team::TeamId::export_all();
        let _ = crate::team::Team::export_all();
        let _ = crate::counts::CounterState::export_all();
        let _ = crate::counts::TeamSummary::export_all();
        let _ = crate::records::AssignmentResult::export_all();
        let _ = crate::records::UserAssignmentRecord::export_all();
    }
}
