//! Domain layer - Core business objects and abstractions
//!
//! This layer contains:
//! - Entities: Core business objects (ChatEvent, EventCategory)
//! - Traits: Abstractions for infrastructure (ChatClient, JobScheduler)

pub mod entities;
pub mod traits;
