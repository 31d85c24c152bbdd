//! Event routing - resolver and dispatch loop

pub mod dispatcher;
pub mod resolver;

pub use dispatcher::Dispatcher;
pub use resolver::{resolve, Resolve, Resolved};
