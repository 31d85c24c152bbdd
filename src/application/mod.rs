//! Application layer - Routing and runtime orchestration
//!
//! This layer contains:
//! - Errors: crate-wide error taxonomy
//! - Routing: dispatch resolver and the event loop
//! - Runtime: bot startup sequence and background workers

pub mod errors;
pub mod routing;
pub mod runtime;
