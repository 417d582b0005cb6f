//! The resolved, identity-annotated, lazily-invokable module reference
//!
//! An [`Env`] is produced by [`EnvFactory::create_env`]. Every path-derived
//! field (`dirname`, `basename`, `stem`, `relative`, `stat`) is computed from
//! the current `path` on each read, and package metadata is looked up again
//! after `path` is reassigned, so a consumer that overwrites `path` always
//! sees consistent values.
//!
//! # Example
//!
//! ```
//! use plugin_env::env::EnvFactory;
//! use plugin_env::fs::MockFileSystem;
//! use plugin_env::plugin::Context;
//! use plugin_env::resolver::FixedGlobalModules;
//! use std::sync::Arc;
//!
//! let fs = MockFileSystem::builder()
//!     .with_file("/work/fixtures/verb-readme-generator/index.js", "")
//!     .build();
//! let factory = EnvFactory::builder(Context::new("base"))
//!     .file_system(Arc::new(fs))
//!     .global_modules(Arc::new(FixedGlobalModules::new("/globals")))
//!     .cwd("/work")
//!     .build()
//!     .unwrap();
//!
//! let env = factory.create_env(("foo", "fixtures/verb-readme-generator")).unwrap();
//! assert_eq!(env.name(), "foo");
//! assert_eq!(env.namespace(), "base.foo");
//! assert_eq!(env.basename().as_deref(), Some("index.js"));
//! assert_eq!(env.inspect(), r#"<Env "foo" [path ~/foo]>"#);
//! ```

mod args;
mod factory;

pub use args::{looks_like_path, Arg, ArgList, EnvArgs};
pub use factory::{EnvFactory, EnvFactoryBuilder};

use crate::config::EnvConfig;
use crate::error::{Error, Result};
use crate::fs::{FileSystem, Stat};
use crate::identity::{self, Derivable};
use crate::options::Options;
use crate::package::{PackageLookup, PackageMeta, PackageReader};
use crate::plugin::{AppState, Context, Export, LazyInvoker, LoadTarget, ModuleLoader};
use crate::resolver::absolutize;
use once_cell::sync::OnceCell;
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::warn;

pub struct Env {
    creator: String,
    name: Option<String>,
    alias: Derivable,
    namespace: Derivable,
    path: Option<PathBuf>,
    reference: Option<PathBuf>,
    global_name: Option<String>,
    base: PathBuf,
    options: Options,
    config: Arc<EnvConfig>,
    fs: Arc<dyn FileSystem>,
    loader: Arc<dyn ModuleLoader>,
    package: OnceCell<PackageLookup>,
    invoker: LazyInvoker,
}

/// Serializable view of an env's derived fields
#[derive(Debug, Clone, Serialize)]
pub struct EnvSummary {
    pub name: String,
    pub alias: String,
    pub namespace: String,
    pub key: String,
    pub is_default: bool,
    pub path: Option<PathBuf>,
    pub dirname: Option<PathBuf>,
    pub basename: Option<String>,
    pub stem: Option<String>,
    pub relative: Option<PathBuf>,
    pub pkg_path: Option<PathBuf>,
    pub pkg: PackageMeta,
    pub stat: Stat,
}

impl Env {
    /// Explicit name; else package name; else the reference itself
    pub fn name(&self) -> String {
        self.declared_name().unwrap_or_else(|| {
            self.reference
                .as_ref()
                .or(self.path.as_ref())
                .map(|p| p.to_string_lossy().into_owned())
                .unwrap_or_default()
        })
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = Some(name.into());
    }

    pub fn alias(&self) -> String {
        self.alias
            .get_or_derive(|| identity::derive_alias(&self.name(), self.options.alias_fn()))
    }

    pub fn set_alias(&mut self, alias: impl Into<String>) {
        self.alias.set(alias);
    }

    /// `<creator>.<alias>`
    pub fn namespace(&self) -> String {
        self.namespace
            .get_or_derive(|| identity::derive_namespace(&self.creator, &self.alias()))
    }

    pub fn set_namespace(&mut self, namespace: impl Into<String>) {
        self.namespace.set(namespace);
    }

    pub fn is_default(&self) -> bool {
        self.name() == self.config.default_name
    }

    /// Short lookup key used by [`inspect`](Self::inspect)
    pub fn key(&self) -> String {
        if let Some(name) = self.declared_name() {
            return name;
        }
        self.reference
            .as_deref()
            .or(self.path.as_deref())
            .and_then(|p| {
                identity::derive_key(p, &self.config.index_stem, &self.config.extension)
            })
            .unwrap_or_else(|| self.name())
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Overwrite the path verbatim; derived fields follow it
    pub fn set_path(&mut self, path: impl Into<PathBuf>) {
        let path = path.into();
        self.reference = Some(path.clone());
        self.path = Some(path);
        self.global_name = None;
        self.package = OnceCell::new();
        self.invoker.reset_export();
    }

    /// Directory relative references were resolved against
    pub fn base(&self) -> &Path {
        &self.base
    }

    pub fn dirname(&self) -> Option<PathBuf> {
        self.path().and_then(identity::dirname)
    }

    pub fn basename(&self) -> Option<String> {
        self.path().and_then(identity::basename)
    }

    pub fn stem(&self) -> Option<String> {
        self.path().and_then(identity::stem)
    }

    /// Path relative to [`base`](Self::base)
    pub fn relative(&self) -> Option<PathBuf> {
        self.path()
            .map(|p| identity::relative_to(&absolutize(&self.base, p), &self.base))
    }

    pub fn stat(&self) -> Stat {
        self.path()
            .and_then(|p| self.fs.stat(&absolutize(&self.base, p)))
            .unwrap_or_default()
    }

    pub fn pkg_path(&self) -> Option<PathBuf> {
        self.package().pkg_path.clone()
    }

    pub fn pkg(&self) -> &PackageMeta {
        &self.package().pkg
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Namespace of the host that created this env
    pub fn creator(&self) -> &str {
        &self.creator
    }

    /// The module's export, loaded on first access
    pub fn export(&self) -> Result<Export> {
        let name = self.name();
        self.invoker.export(self.load_target(&name))
    }

    pub fn app(&self) -> AppState {
        self.invoker.app()
    }

    /// Run the export against `context` once and cache the instance
    pub fn invoke(&self, context: &Context, parent: Option<&Context>) -> Result<Context> {
        let name = self.name();
        self.invoker.invoke(self.load_target(&name), context, parent)
    }

    /// [`invoke`](Self::invoke) with a fresh context named after the alias
    pub fn materialize(&self) -> Result<Context> {
        self.invoke(&Context::new(self.alias()), None)
    }

    /// True when `value` is exactly the alias
    pub fn is_match(&self, value: &str) -> bool {
        self.alias() == value
    }

    pub fn inspect(&self) -> String {
        match self.path {
            Some(_) => format!("<Env \"{}\" [path ~/{}]>", self.name(), self.key()),
            None => format!("<Env \"{}\">", self.name()),
        }
    }

    pub fn summary(&self) -> EnvSummary {
        EnvSummary {
            name: self.name(),
            alias: self.alias(),
            namespace: self.namespace(),
            key: self.key(),
            is_default: self.is_default(),
            path: self.path.clone(),
            dirname: self.dirname(),
            basename: self.basename(),
            stem: self.stem(),
            relative: self.relative(),
            pkg_path: self.pkg_path(),
            pkg: self.pkg().clone(),
            stat: self.stat(),
        }
    }

    /// Explicit name, then package name, then global module name
    fn declared_name(&self) -> Option<String> {
        self.name
            .clone()
            .or_else(|| self.pkg().name().map(str::to_string))
            .or_else(|| self.global_name.clone())
    }

    fn load_target<'a>(&'a self, name: &'a str) -> LoadTarget<'a> {
        LoadTarget {
            name,
            path: self.path.as_deref(),
            loader: self.loader.as_ref(),
        }
    }

    fn package(&self) -> &PackageLookup {
        self.package.get_or_init(|| self.lookup_package())
    }

    fn lookup_package(&self) -> PackageLookup {
        let Some(dir) = self.path().and_then(Path::parent) else {
            return PackageLookup::not_found();
        };
        let dir = absolutize(&self.base, dir);

        match PackageReader::new(self.fs.as_ref(), &self.config.metadata_file).find_package(&dir)
        {
            Ok(lookup) => lookup,
            Err(Error::MetadataParse { path, source }) => {
                warn!("Ignoring malformed {}: {}", path.display(), source);
                PackageLookup {
                    pkg_path: Some(path),
                    pkg: PackageMeta::default(),
                }
            }
            Err(e) => {
                warn!("Package lookup from {} failed: {}", dir.display(), e);
                PackageLookup::not_found()
            }
        }
    }
}

impl fmt::Display for Env {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.inspect())
    }
}

impl fmt::Debug for Env {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Env")
            .field("creator", &self.creator)
            .field("name", &self.name)
            .field("alias", &self.alias)
            .field("namespace", &self.namespace)
            .field("path", &self.path)
            .field("base", &self.base)
            .field("options", &self.options)
            .field("app", &self.invoker.app())
            .finish()
    }
}
