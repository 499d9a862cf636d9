//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A `Deserialize` create DTO for inserts
//! - Stage-specific update DTOs where the entity advances through a
//!   lifecycle

pub mod credit;
pub mod event;
pub mod generation;
pub mod reference;
pub mod user;
