//! Plugin discovery - resolves a package name into loadable modules
//!
//! Discovery is pluggable. The static catalog covers packages compiled
//! into the binary (including the built-in default package); the
//! shared-library strategy scans a directory for dynamic plugin modules
//! the way a scripting bot would scan a package folder.

use std::env::consts::DLL_EXTENSION;
use std::path::Path;
use std::sync::Arc;

use libloading::Library;
use tracing::warn;

use crate::application::errors::PluginError;
use crate::plugins::registry::Registry;

/// Registration entry point every plugin shared library must export.
pub const REGISTER_SYMBOL: &[u8] = b"relay_plugin_register";
/// Optional module initialization hook, invoked once right after the
/// module's registrations are committed.
pub const INIT_SYMBOL: &[u8] = b"relay_plugin_init";

type RegisterFn = unsafe extern "C" fn(registry: *mut Registry) -> bool;
type InitFn = unsafe extern "C" fn();

/// A module's registration entry point.
pub type RegisterHook = Box<dyn Fn(&mut Registry) -> Result<(), PluginError> + Send + Sync>;
/// A module's optional zero-argument initialization hook.
pub type InitHook = Box<dyn Fn() -> Result<(), PluginError> + Send + Sync>;

/// One loadable plugin module: a registration entry point plus an
/// optional init hook.
pub struct PluginModule {
    name: String,
    register: RegisterHook,
    init: Option<InitHook>,
    // Backing shared library, when the module came from one. Must stay
    // loaded as long as its handlers are registered.
    library: Option<Arc<Library>>,
}

impl PluginModule {
    pub fn new(name: impl Into<String>, register: RegisterHook) -> Self {
        Self {
            name: name.into(),
            register,
            init: None,
            library: None,
        }
    }

    pub fn with_init(mut self, init: InitHook) -> Self {
        self.init = Some(init);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn register(&self, registry: &mut Registry) -> Result<(), PluginError> {
        (self.register)(registry)
    }

    pub(crate) fn init(&self) -> Result<(), PluginError> {
        match &self.init {
            Some(hook) => hook(),
            None => Ok(()),
        }
    }

    pub(crate) fn take_library(&mut self) -> Option<Arc<Library>> {
        self.library.take()
    }
}

/// A way of resolving a package name into its ordered module list.
pub trait DiscoveryStrategy: Send + Sync {
    /// Resolve `package` into plugin modules, or `None` when this
    /// strategy does not recognize the package.
    fn discover(&self, package: &str) -> Option<Vec<PluginModule>>;
}

/// Compiled-in packages: package name mapped to a module-list constructor.
#[derive(Default)]
pub struct StaticCatalog {
    packages: Vec<(String, fn() -> Vec<PluginModule>)>,
}

impl StaticCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog pre-populated with the built-in default package.
    pub fn with_builtin() -> Self {
        let mut catalog = Self::new();
        catalog.insert(crate::plugins::builtin::PACKAGE, crate::plugins::builtin::modules);
        catalog
    }

    pub fn insert(&mut self, package: impl Into<String>, modules: fn() -> Vec<PluginModule>) {
        self.packages.push((package.into(), modules));
    }
}

impl DiscoveryStrategy for StaticCatalog {
    fn discover(&self, package: &str) -> Option<Vec<PluginModule>> {
        self.packages
            .iter()
            .find(|(name, _)| name == package)
            .map(|(_, modules)| modules())
    }
}

/// Treats the package name as an on-disk directory of shared libraries.
///
/// Files directly inside the directory are loaded when their name does
/// not start with `_` and their extension is the platform dylib
/// extension. Enumeration is sorted so matcher insertion order is
/// reproducible for a given filesystem state.
#[derive(Default)]
pub struct SharedLibraryDir;

impl SharedLibraryDir {
    pub fn new() -> Self {
        Self
    }

    fn load_module(path: &Path, package: &str) -> Result<PluginModule, PluginError> {
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| PluginError::Load(format!("unreadable file name: {}", path.display())))?;
        let name = format!("{}.{}", package, stem);

        let library = Arc::new(unsafe {
            Library::new(path)
                .map_err(|e| PluginError::Load(format!("failed to load {}: {}", path.display(), e)))?
        });

        let register_fn: RegisterFn = unsafe {
            *library.get::<RegisterFn>(REGISTER_SYMBOL).map_err(|e| {
                PluginError::Load(format!("{}: missing registration entry point: {}", name, e))
            })?
        };
        let init_fn: Option<InitFn> =
            unsafe { library.get::<InitFn>(INIT_SYMBOL).ok().map(|symbol| *symbol) };

        let register_name = name.clone();
        let register_library = Arc::clone(&library);
        let register: RegisterHook = Box::new(move |registry: &mut Registry| {
            let _keep_loaded = &register_library;
            if unsafe { register_fn(registry as *mut Registry) } {
                Ok(())
            } else {
                Err(PluginError::Load(format!(
                    "{}: registration entry point reported failure",
                    register_name
                )))
            }
        });

        let mut module = PluginModule::new(name, register);
        module.library = Some(library);
        if let Some(init_fn) = init_fn {
            module = module.with_init(Box::new(move || {
                unsafe { init_fn() };
                Ok(())
            }));
        }
        Ok(module)
    }
}

impl DiscoveryStrategy for SharedLibraryDir {
    fn discover(&self, package: &str) -> Option<Vec<PluginModule>> {
        let dir = Path::new(package);
        if !dir.is_dir() {
            return None;
        }

        let entries = match std::fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) => {
                warn!("failed to read plugin directory {}: {}", dir.display(), e);
                return Some(Vec::new());
            }
        };

        let mut paths: Vec<_> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| {
                path.is_file()
                    && path
                        .file_name()
                        .and_then(|n| n.to_str())
                        .is_some_and(|n| !n.starts_with('_'))
                    && path
                        .extension()
                        .and_then(|e| e.to_str())
                        .is_some_and(|e| e == DLL_EXTENSION)
            })
            .collect();
        paths.sort();

        let mut modules = Vec::new();
        for path in paths {
            match Self::load_module(&path, package) {
                Ok(module) => modules.push(module),
                Err(e) => warn!("skipping plugin file {}: {}", path.display(), e),
            }
        }
        Some(modules)
    }
}
