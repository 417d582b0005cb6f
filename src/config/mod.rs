//! Resolution settings
//!
//! Every field has a default, so an empty TOML document (or no file at all)
//! yields the npm-style conventions: `npm:` global prefix, `index.js`
//! directory entry and `package.json` metadata.

use crate::error::{Error, Result};
use crate::options::AliasFn;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

pub const DEFAULT_NAME: &str = "default";
pub const GLOBAL_PREFIX: &str = "npm:";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvConfig {
    /// Name that marks an env as the default one
    pub default_name: String,
    /// Prefix selecting a lookup in the global module root
    pub global_prefix: String,
    /// File stem loaded when a reference names a directory
    pub index_stem: String,
    /// Extension of loadable files, without the dot
    pub extension: String,
    /// Package metadata file searched for above the resolved path
    pub metadata_file: String,
    /// Fixed global module root; located at runtime when absent
    pub global_modules: Option<PathBuf>,
    /// Alias rule applied when the caller supplies no alias transform
    pub alias: Option<AliasRule>,
}

/// Regex rewrite used to derive aliases from names
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AliasRule {
    pub pattern: String,
    pub replacement: String,
}

impl AliasRule {
    pub fn new(pattern: impl Into<String>, replacement: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            replacement: replacement.into(),
        }
    }

    pub fn compile(&self) -> Result<AliasFn> {
        let regex = Regex::new(&self.pattern).map_err(|e| {
            Error::Config(format!("Invalid alias pattern '{}': {e}", self.pattern))
        })?;
        let replacement = self.replacement.clone();
        Ok(Arc::new(move |name: &str| {
            regex.replace(name, replacement.as_str()).into_owned()
        }))
    }
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self {
            default_name: DEFAULT_NAME.to_string(),
            global_prefix: GLOBAL_PREFIX.to_string(),
            index_stem: "index".to_string(),
            extension: "js".to_string(),
            metadata_file: "package.json".to_string(),
            global_modules: None,
            alias: None,
        }
    }
}

impl EnvConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: EnvConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config file, then apply environment overrides
    pub fn load(path: &Path) -> Result<Self> {
        debug!("Loading env config from {}", path.display());
        let content = std::fs::read_to_string(path)?;
        let mut config = Self::from_toml_str(&content)?;
        config.merge_env_vars();
        config.validate()?;
        Ok(config)
    }

    pub fn merge_env_vars(&mut self) {
        if let Ok(root) = std::env::var("PLUGIN_ENV_GLOBAL_MODULES") {
            if !root.is_empty() {
                self.global_modules = Some(PathBuf::from(root));
            }
        }

        if let Ok(name) = std::env::var("PLUGIN_ENV_DEFAULT_NAME") {
            if !name.is_empty() {
                self.default_name = name;
            }
        }

        if let Ok(prefix) = std::env::var("PLUGIN_ENV_GLOBAL_PREFIX") {
            self.global_prefix = prefix;
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.index_stem.is_empty() {
            return Err(Error::Config("index_stem must not be empty".to_string()));
        }
        if self.metadata_file.is_empty() {
            return Err(Error::Config("metadata_file must not be empty".to_string()));
        }
        if self.extension.starts_with('.') {
            return Err(Error::Config(format!(
                "extension '{}' must not start with a dot",
                self.extension
            )));
        }
        Ok(())
    }

    /// File name a directory reference resolves to, e.g. `index.js`
    pub fn index_file(&self) -> String {
        if self.extension.is_empty() {
            self.index_stem.clone()
        } else {
            format!("{}.{}", self.index_stem, self.extension)
        }
    }

    /// Strip the global prefix, `None` for ordinary references
    pub fn strip_global_prefix<'a>(&self, reference: &'a str) -> Option<&'a str> {
        if self.global_prefix.is_empty() {
            return None;
        }
        reference.strip_prefix(self.global_prefix.as_str())
    }

    pub fn alias_fn(&self) -> Result<Option<AliasFn>> {
        self.alias.as_ref().map(AliasRule::compile).transpose()
    }
}
