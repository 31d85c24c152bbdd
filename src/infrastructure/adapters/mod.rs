//! Platform adapters implementing the ChatClient trait

pub mod console;

pub use console::ConsoleClient;
