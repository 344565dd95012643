//! Recommendation Coordinator (§4.9): cache-first lookup plus a
//! single-flight background auction dispatch.

pub mod coordinator;
pub mod creative;

pub use coordinator::{WeaveCoordinator, WeaveResponse, RETRY_AFTER_MS};
