//! relay-bot - routing core of a pluggable chat-bot framework
//!
//! Plugins register regex patterns against event categories; incoming
//! events fan out to every handler whose pattern matches. The runtime
//! runs the dispatch loop alongside a keep-alive worker and a
//! scheduled-job worker.

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod plugins;

pub use application::errors::{BotError, ConfigError, PluginError};
pub use application::routing::{resolve, Dispatcher, Resolved};
pub use application::runtime::{Bot, RuntimeState, KEEP_ALIVE_PERIOD};
pub use domain::entities::{ChatEvent, EventCategory};
pub use domain::traits::{ChatClient, ClientInfo, JobScheduler};
pub use infrastructure::config::Config;
pub use plugins::{Handler, HandlerContext, PatternFlags, PluginLoader, Registry};
