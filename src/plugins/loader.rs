//! Plugin loader - best-effort loading of plugin packages
//!
//! A broken plugin must never take the bot down: every module loads
//! independently, and a failure is logged and skipped. Each module
//! registers into a staged registry that is only merged on success, so a
//! module that fails half-way leaves no partial registrations behind.

use std::sync::Arc;

use libloading::Library;
use tracing::{error, info, warn};

use crate::plugins::discovery::{DiscoveryStrategy, PluginModule, SharedLibraryDir, StaticCatalog};
use crate::plugins::registry::Registry;

/// Package loaded when neither an explicit nor a configured plugin list
/// is present.
pub const DEFAULT_PACKAGE: &str = "builtin";

/// Loads plugin packages through an ordered chain of discovery
/// strategies.
pub struct PluginLoader {
    strategies: Vec<Box<dyn DiscoveryStrategy>>,
    // Shared libraries backing loaded modules; handlers registered from a
    // library are only valid while it stays loaded.
    libraries: Vec<Arc<Library>>,
}

impl PluginLoader {
    /// Loader with the default strategy chain: static catalog (built-in
    /// package included), then shared-library directory scan.
    pub fn new() -> Self {
        Self {
            strategies: vec![
                Box::new(StaticCatalog::with_builtin()),
                Box::new(SharedLibraryDir::new()),
            ],
            libraries: Vec::new(),
        }
    }

    /// Loader with a custom strategy chain.
    pub fn with_strategies(strategies: Vec<Box<dyn DiscoveryStrategy>>) -> Self {
        Self {
            strategies,
            libraries: Vec::new(),
        }
    }

    /// Determine the plugin package list and load each package in order.
    ///
    /// `plugins` is the configured list; when empty, the single built-in
    /// default package is loaded instead.
    pub fn init_plugins(&mut self, registry: &mut Registry, plugins: &[String]) {
        let default = [DEFAULT_PACKAGE.to_string()];
        let packages: &[String] = if plugins.is_empty() { &default } else { plugins };

        for package in packages {
            self.load(registry, package);
        }
        info!("plugin loading finished, {} handlers registered", registry.len());
    }

    /// Load one plugin package. Never fails: unknown packages and broken
    /// modules are logged and skipped.
    pub fn load(&mut self, registry: &mut Registry, package: &str) {
        info!("loading plugin \"{}\"", package);

        let modules = self
            .strategies
            .iter()
            .find_map(|strategy| strategy.discover(package));
        let Some(modules) = modules else {
            warn!("plugin package \"{}\" not found by any discovery strategy", package);
            return;
        };

        for module in modules {
            self.load_module(registry, module);
        }
    }

    fn load_module(&mut self, registry: &mut Registry, mut module: PluginModule) {
        let mut staged = Registry::new();
        if let Err(e) = module.register(&mut staged) {
            error!("failed to load module \"{}\": {}", module.name(), e);
            return;
        }
        registry.absorb(staged);
        if let Some(library) = module.take_library() {
            self.libraries.push(library);
        }

        // Init hook runs once, right after the module's registrations
        // are in place. Its failure does not unload the module.
        if let Err(e) = module.init() {
            error!("init hook of module \"{}\" failed: {}", module.name(), e);
        }
    }
}

impl Default for PluginLoader {
    fn default() -> Self {
        Self::new()
    }
}
