//! Request handlers, one module per resource.

pub mod credits;
pub mod generation;
pub mod references;
