//! Reference → absolute path resolution
//!
//! Ordinary references never fail here: when nothing exists on disk the
//! best-guess absolute path is returned and the failure surfaces later, at
//! load time. Only global references (`npm:name`) are checked eagerly.

mod global;

pub use global::{FixedGlobalModules, GlobalModules, NpmGlobalModules};

use crate::config::EnvConfig;
use crate::error::{Error, Result};
use crate::fs::FileSystem;
use serde_json::Value;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, trace};

/// Outcome of resolving a reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    /// Loadable file the reference points at
    pub path: PathBuf,
    /// Absolute form of the reference itself, before index expansion
    pub reference: PathBuf,
    /// Module name for prefixed references, with the prefix stripped
    pub global_name: Option<String>,
}

pub struct PathResolver<'a> {
    config: &'a EnvConfig,
    fs: &'a dyn FileSystem,
    globals: &'a dyn GlobalModules,
}

impl<'a> PathResolver<'a> {
    pub fn new(
        config: &'a EnvConfig,
        fs: &'a dyn FileSystem,
        globals: &'a dyn GlobalModules,
    ) -> Self {
        Self {
            config,
            fs,
            globals,
        }
    }

    /// Resolve `reference` against `base`
    ///
    /// `None` or an empty string resolves to `None`.
    pub fn resolve(&self, reference: Option<&str>, base: &Path) -> Result<Option<Resolved>> {
        let reference = match reference {
            Some(r) if !r.is_empty() => r,
            _ => return Ok(None),
        };

        if let Some(name) = self.config.strip_global_prefix(reference) {
            return self.resolve_global(reference, name).map(Some);
        }

        let absolute = absolutize(base, Path::new(reference));
        let path = self.resolve_local(&absolute);
        debug!("Resolved '{}' to {}", reference, path.display());

        Ok(Some(Resolved {
            path,
            reference: absolute,
            global_name: None,
        }))
    }

    fn resolve_global(&self, original: &str, name: &str) -> Result<Resolved> {
        // Module names stay inside the global root
        let contained = Path::new(name)
            .components()
            .all(|c| matches!(c, Component::Normal(_)));
        if name.is_empty() || !contained {
            return Err(Error::Resolution(original.to_string()));
        }

        let root = match self.config.global_modules.clone() {
            Some(root) => root,
            None => self
                .globals
                .root()
                .ok_or_else(|| Error::Resolution(original.to_string()))?,
        };

        let candidate = root.join(name);
        trace!("Looking up global module {} in {}", name, root.display());

        let path = self
            .load_as_file(&candidate)
            .or_else(|| self.load_as_directory(&candidate))
            .ok_or_else(|| Error::Resolution(original.to_string()))?;

        debug!("Resolved global '{}' to {}", original, path.display());
        Ok(Resolved {
            path,
            reference: candidate,
            global_name: Some(name.to_string()),
        })
    }

    /// Best-guess resolution of an absolute, unprefixed path.
    fn resolve_local(&self, absolute: &Path) -> PathBuf {
        if self.fs.is_dir(absolute) {
            return self
                .load_as_directory(absolute)
                .unwrap_or_else(|| absolute.join(self.config.index_file()));
        }

        self.load_as_file(absolute)
            .unwrap_or_else(|| absolute.to_path_buf())
    }

    /// `<path>` itself, then `<path>.<ext>`.
    fn load_as_file(&self, path: &Path) -> Option<PathBuf> {
        if self.fs.is_file(path) {
            return Some(path.to_path_buf());
        }

        if self.config.extension.is_empty() {
            return None;
        }

        let mut with_ext = path.as_os_str().to_owned();
        with_ext.push(".");
        with_ext.push(&self.config.extension);
        let with_ext = PathBuf::from(with_ext);
        self.fs.is_file(&with_ext).then_some(with_ext)
    }

    /// The metadata `main` entry when present, then the index file.
    fn load_as_directory(&self, dir: &Path) -> Option<PathBuf> {
        if !self.fs.is_dir(dir) {
            return None;
        }

        if let Some(main) = self.main_entry(dir) {
            let target = absolutize(dir, Path::new(&main));
            if let Some(found) = self.load_as_file(&target) {
                return Some(found);
            }
            let index = target.join(self.config.index_file());
            if self.fs.is_file(&index) {
                return Some(index);
            }
            trace!("Ignoring unresolvable main '{}' in {}", main, dir.display());
        }

        let index = dir.join(self.config.index_file());
        self.fs.is_file(&index).then_some(index)
    }

    fn main_entry(&self, dir: &Path) -> Option<String> {
        let metadata_path = dir.join(&self.config.metadata_file);
        let content = self.fs.read_to_string(&metadata_path).ok()?;
        let value: Value = serde_json::from_str(&content).ok()?;
        value
            .get("main")
            .and_then(Value::as_str)
            .filter(|main| !main.is_empty())
            .map(str::to_string)
    }
}

/// Join `path` onto `base` unless already absolute, then normalize `.` and
/// `..` segments lexically.
pub fn absolutize(base: &Path, path: &Path) -> PathBuf {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    };
    normalize(&joined)
}

pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let last_is_normal =
                    matches!(out.components().next_back(), Some(Component::Normal(_)));
                if last_is_normal {
                    out.pop();
                } else if !out.has_root() {
                    out.push("..");
                }
            }
            other => out.push(other),
        }
    }
    out
}
