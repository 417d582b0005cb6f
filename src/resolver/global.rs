//! Global module root lookup
//!
//! Prefixed references (`npm:foo`) are searched in a single root directory.
//! The root is provided by a [`GlobalModules`] implementation injected into
//! the factory, so tests never depend on what is installed on the machine.

use std::fmt;
use std::path::{Path, PathBuf};
use tracing::trace;

/// Locates the shared install directory for global modules
pub trait GlobalModules: Send + Sync + fmt::Debug {
    fn root(&self) -> Option<PathBuf>;
}

/// A root fixed by configuration
#[derive(Debug, Clone)]
pub struct FixedGlobalModules {
    root: PathBuf,
}

impl FixedGlobalModules {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl GlobalModules for FixedGlobalModules {
    fn root(&self) -> Option<PathBuf> {
        Some(self.root.clone())
    }
}

/// The npm global root: `<prefix>/lib/node_modules`, or
/// `<prefix>\node_modules` on Windows
///
/// The prefix comes from `NPM_CONFIG_PREFIX`, then the `prefix` entry of
/// `~/.npmrc`, then the platform default.
#[derive(Debug, Clone, Default)]
pub struct NpmGlobalModules;

impl NpmGlobalModules {
    pub fn new() -> Self {
        Self
    }

    pub fn prefix(&self) -> Option<PathBuf> {
        for var in ["NPM_CONFIG_PREFIX", "npm_config_prefix"] {
            if let Ok(prefix) = std::env::var(var) {
                if !prefix.is_empty() {
                    trace!("npm prefix from {}: {}", var, prefix);
                    return Some(PathBuf::from(prefix));
                }
            }
        }

        if let Some(home) = dirs::home_dir() {
            let npmrc = home.join(".npmrc");
            if let Ok(content) = std::fs::read_to_string(&npmrc) {
                if let Some(prefix) = parse_npmrc_prefix(&content, &home) {
                    trace!("npm prefix from {}: {}", npmrc.display(), prefix.display());
                    return Some(prefix);
                }
            }
        }

        default_prefix()
    }
}

impl GlobalModules for NpmGlobalModules {
    fn root(&self) -> Option<PathBuf> {
        let prefix = self.prefix()?;
        if cfg!(windows) {
            Some(prefix.join("node_modules"))
        } else {
            Some(prefix.join("lib").join("node_modules"))
        }
    }
}

#[cfg(windows)]
fn default_prefix() -> Option<PathBuf> {
    dirs::data_dir().map(|appdata| appdata.join("npm"))
}

#[cfg(not(windows))]
fn default_prefix() -> Option<PathBuf> {
    Some(PathBuf::from("/usr/local"))
}

fn parse_npmrc_prefix(content: &str, home: &Path) -> Option<PathBuf> {
    content.lines().find_map(|line| {
        let line = line.trim();
        if line.starts_with('#') || line.starts_with(';') {
            return None;
        }
        let (key, value) = line.split_once('=')?;
        if key.trim() != "prefix" {
            return None;
        }
        let value = value.trim().trim_matches('"');
        if value.is_empty() {
            return None;
        }
        match value.strip_prefix("~/") {
            Some(rest) => Some(home.join(rest)),
            None => Some(PathBuf::from(value)),
        }
    })
}
