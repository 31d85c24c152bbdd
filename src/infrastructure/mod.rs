//! Infrastructure layer - External concerns
//!
//! This layer contains:
//! - Config: Configuration loading
//! - Adapters: Chat transport integrations
//! - Jobs: In-process job scheduling

pub mod adapters;
pub mod config;
pub mod jobs;
