use crate::error::{Error, Result};
use crate::fs::FileSystem;
use std::path::Path;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{debug, info};

use super::{Export, ModuleLoader, ModuleRegistry};

/// Loads exports for files that exist on the filesystem
///
/// The file must be present on the injected [`FileSystem`]; its export
/// comes from the registry.
pub struct PluginLoader {
    fs: Arc<dyn FileSystem>,
    registry: RwLock<ModuleRegistry>,
}

impl PluginLoader {
    pub fn new(fs: Arc<dyn FileSystem>, registry: ModuleRegistry) -> Self {
        debug!("Plugin loader with {} registered exports", registry.len());
        Self {
            fs,
            registry: RwLock::new(registry),
        }
    }

    /// Register an export after construction
    pub fn register(&self, path: impl AsRef<Path>, export: Export) -> Result<()> {
        let path = path.as_ref();
        info!("Registering module export for {}", path.display());
        self.registry
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .register(path, export)
    }

    pub fn is_registered(&self, path: &Path) -> bool {
        self.registry
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(path)
    }
}

impl ModuleLoader for PluginLoader {
    fn load(&self, path: &Path) -> Result<Export> {
        debug!("Loading module from: {}", path.display());

        let stat = self
            .fs
            .stat(path)
            .ok_or_else(|| Error::load(path.display().to_string(), "file not found"))?;
        if stat.is_dir {
            return Err(Error::load(path.display().to_string(), "is a directory"));
        }

        self.registry
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(path)
            .cloned()
            .ok_or_else(|| Error::load(path.display().to_string(), "no export registered"))
    }
}
