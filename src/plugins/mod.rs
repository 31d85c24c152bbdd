//! Plugin system for relay-bot
//!
//! A plugin package is a named group of modules whose registration entry
//! points populate the handler registry at load time. Packages are
//! resolved through pluggable discovery strategies; loading is
//! best-effort and one broken module never aborts the rest.

pub mod builtin;
pub mod discovery;
pub mod loader;
pub mod registry;

pub use discovery::{DiscoveryStrategy, PluginModule, SharedLibraryDir, StaticCatalog};
pub use loader::PluginLoader;
pub use registry::{Handler, HandlerContext, Matcher, PatternFlags, Registry};
