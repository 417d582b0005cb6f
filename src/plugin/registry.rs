use crate::error::{Error, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use super::Export;

/// Exports registered by absolute file path
#[derive(Debug, Clone, Default)]
pub struct ModuleRegistry {
    modules: HashMap<PathBuf, Export>,
}

impl ModuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the export for a file
    pub fn register(&mut self, path: impl Into<PathBuf>, export: Export) -> Result<()> {
        let path = path.into();
        if self.modules.contains_key(&path) {
            return Err(Error::AlreadyRegistered(path.display().to_string()));
        }

        self.modules.insert(path, export);
        Ok(())
    }

    /// Builder-style [`register`](Self::register)
    pub fn with(mut self, path: impl Into<PathBuf>, export: Export) -> Result<Self> {
        self.register(path, export)?;
        Ok(self)
    }

    pub fn get(&self, path: &Path) -> Option<&Export> {
        self.modules.get(path)
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.modules.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}
