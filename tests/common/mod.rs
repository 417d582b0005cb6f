//! Shared fixtures for integration tests

#![allow(dead_code)]

use anyhow::Result;
use plugin_env::plugin::{ModuleRegistry, PluginLoader};
use plugin_env::resolver::FixedGlobalModules;
use plugin_env::{Context, EnvFactory, Options};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

/// On-disk project with the generator fixtures and a global module root
pub struct Fixtures {
    temp_dir: TempDir,
}

impl Fixtures {
    pub fn new() -> Result<Self> {
        let fixtures = Self {
            temp_dir: TempDir::new()?,
        };
        fixtures.write("project/fixtures/verb-readme-generator/index.js", "")?;
        fixtures.write("project/fixtures/generate-node/index.js", "")?;
        fixtures.write(
            "project/fixtures/generate-node/package.json",
            r#"{"name": "foo-bar-baz", "version": "0.2.0"}"#,
        )?;
        fixtures.write("project/fixtures/plugin.js", "")?;
        fixtures.write("globals/verb-readme-generator/index.js", "")?;
        fixtures.write(
            "globals/verb-readme-generator/package.json",
            r#"{"name": "verb-readme-generator"}"#,
        )?;
        Ok(fixtures)
    }

    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn project(&self) -> PathBuf {
        self.root().join("project")
    }

    pub fn globals(&self) -> PathBuf {
        self.root().join("globals")
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.root().join(relative)
    }

    pub fn write(&self, relative: &str, content: &str) -> Result<PathBuf> {
        let path = self.path(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, content)?;
        Ok(path)
    }

    pub fn factory(&self) -> Result<EnvFactory> {
        self.factory_with(ModuleRegistry::new(), Options::new())
    }

    pub fn factory_with(&self, registry: ModuleRegistry, defaults: Options) -> Result<EnvFactory> {
        let fs = Arc::new(plugin_env::fs::RealFileSystem::new());
        let loader = Arc::new(PluginLoader::new(fs.clone(), registry));
        Ok(EnvFactory::builder(Context::new("base"))
            .file_system(fs)
            .loader(loader)
            .global_modules(Arc::new(FixedGlobalModules::new(self.globals())))
            .cwd(self.project())
            .options(defaults)
            .build()?)
    }
}
