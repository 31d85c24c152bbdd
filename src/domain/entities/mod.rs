//! Domain entities - Core business objects with no external dependencies

pub mod event;

pub use event::{ChatEvent, EventCategory};
