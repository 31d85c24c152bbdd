//! Domain traits - Abstractions for infrastructure implementations

pub mod client;
pub mod scheduler;

pub use client::{ChatClient, ClientInfo};
pub use scheduler::JobScheduler;
