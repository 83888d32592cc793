//! Durable counter store for Huddle.
//!
//! The authoritative service keeps one JSON record mapping every rostered
//! team to its count. [`CounterStore`] owns that record: it serves reads
//! from memory, serializes every read-modify-write-persist sequence behind
//! a single lock, and acknowledges an increment only after the new record
//! is on disk.

pub mod counter_store;
pub mod error;

pub use counter_store::CounterStore;
pub use error::StoreError;
