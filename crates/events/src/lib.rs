//! Platform events for the generation pipeline.
//!
//! An in-process broadcast bus carries lifecycle and credit events
//! (`generation.*`, `credits.*`); a background persistence task writes
//! every event to the `events` table for audit.

pub mod bus;
pub mod persistence;

pub use bus::{EventBus, PlatformEvent};
pub use persistence::EventPersistence;
