//! Builds [`Env`] records for a host context

use super::args::{looks_like_path, ArgList, EnvArgs};
use super::Env;
use crate::config::EnvConfig;
use crate::error::Result;
use crate::fs::{FileSystem, RealFileSystem};
use crate::identity::Derivable;
use crate::options::{AliasFn, Options};
use crate::plugin::{Context, LazyInvoker, ModuleLoader, ModuleRegistry, PluginLoader};
use crate::resolver::{absolutize, GlobalModules, NpmGlobalModules, PathResolver};
use once_cell::sync::OnceCell;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// Creates envs on behalf of one host
///
/// The host's name becomes the first segment of every env's namespace.
pub struct EnvFactory {
    host: Context,
    config: Arc<EnvConfig>,
    fs: Arc<dyn FileSystem>,
    loader: Arc<dyn ModuleLoader>,
    globals: Arc<dyn GlobalModules>,
    cwd: PathBuf,
    defaults: Options,
    config_alias: Option<AliasFn>,
}

impl EnvFactory {
    pub fn builder(host: Context) -> EnvFactoryBuilder {
        EnvFactoryBuilder::new(host)
    }

    pub fn host(&self) -> &Context {
        &self.host
    }

    pub fn config(&self) -> &EnvConfig {
        &self.config
    }

    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    /// Create an env from one to three positional arguments
    ///
    /// Accepts `path`, `(name, path)`, `(name, options)`, `(path, options)`,
    /// `(name, path, options)` in any order of options, and
    /// `(name, instance[, options])`. Only an unresolvable global reference
    /// fails; other missing files surface when the env is invoked.
    pub fn create_env(&self, args: impl Into<ArgList>) -> Result<Env> {
        let EnvArgs {
            name,
            reference,
            instance,
            options,
        } = EnvArgs::normalize_with(args.into(), |s, options| {
            self.is_reference(s, options)
        })?;

        let mut options = options.merged_over(&self.defaults);
        if options.alias_fn().is_none() {
            if let Some(rule) = &self.config_alias {
                options = options.with_alias_fn(rule.clone());
            }
        }

        let base = match options.base_dir() {
            Some(dir) => absolutize(&self.cwd, dir),
            None => self.cwd.clone(),
        };

        let resolved = PathResolver::new(&self.config, self.fs.as_ref(), self.globals.as_ref())
            .resolve(reference.as_deref(), &base)?;

        let invoker = match instance {
            Some(instance) => LazyInvoker::with_instance(instance),
            None => LazyInvoker::new(),
        };

        let (path, reference, global_name) = match resolved {
            Some(r) => (Some(r.path), Some(r.reference), r.global_name),
            None => (None, None, None),
        };

        let env = Env {
            creator: self.host.name().to_string(),
            name,
            alias: Derivable::Derived,
            namespace: Derivable::Derived,
            path,
            reference,
            global_name,
            base,
            options,
            config: self.config.clone(),
            fs: self.fs.clone(),
            loader: self.loader.clone(),
            package: OnceCell::new(),
            invoker,
        };

        debug!("Created {}", env.inspect());
        Ok(env)
    }

    /// Whether the lone string of a `(string, options)` call names a path:
    /// it is shaped like one, or something by that name exists under the base
    fn is_reference(&self, s: &str, options: &Options) -> bool {
        if looks_like_path(s) || self.config.strip_global_prefix(s).is_some() {
            return true;
        }
        let base = match options.base_dir().or(self.defaults.base_dir()) {
            Some(dir) => absolutize(&self.cwd, dir),
            None => self.cwd.clone(),
        };
        let candidate = absolutize(&base, Path::new(s));
        if self.fs.exists(&candidate) {
            return true;
        }
        if self.config.extension.is_empty() {
            return false;
        }
        let mut with_ext = candidate.into_os_string();
        with_ext.push(".");
        with_ext.push(&self.config.extension);
        self.fs.exists(Path::new(&with_ext))
    }
}

impl fmt::Debug for EnvFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnvFactory")
            .field("host", &self.host)
            .field("config", &self.config)
            .field("globals", &self.globals)
            .field("cwd", &self.cwd)
            .field("defaults", &self.defaults)
            .finish()
    }
}

/// Builder for [`EnvFactory`]
///
/// Unset collaborators default to the real filesystem, an empty
/// [`PluginLoader`], the npm global root and the process working directory.
pub struct EnvFactoryBuilder {
    host: Context,
    config: EnvConfig,
    fs: Option<Arc<dyn FileSystem>>,
    loader: Option<Arc<dyn ModuleLoader>>,
    globals: Option<Arc<dyn GlobalModules>>,
    cwd: Option<PathBuf>,
    defaults: Options,
}

impl EnvFactoryBuilder {
    pub fn new(host: Context) -> Self {
        Self {
            host,
            config: EnvConfig::default(),
            fs: None,
            loader: None,
            globals: None,
            cwd: None,
            defaults: Options::default(),
        }
    }

    pub fn config(mut self, config: EnvConfig) -> Self {
        self.config = config;
        self
    }

    pub fn file_system(mut self, fs: Arc<dyn FileSystem>) -> Self {
        self.fs = Some(fs);
        self
    }

    pub fn loader(mut self, loader: Arc<dyn ModuleLoader>) -> Self {
        self.loader = Some(loader);
        self
    }

    pub fn global_modules(mut self, globals: Arc<dyn GlobalModules>) -> Self {
        self.globals = Some(globals);
        self
    }

    pub fn cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }

    /// Options every env starts from; caller options win
    pub fn options(mut self, defaults: Options) -> Self {
        self.defaults = defaults;
        self
    }

    pub fn build(self) -> Result<EnvFactory> {
        self.config.validate()?;
        let config_alias = self.config.alias_fn()?;

        let cwd = match self.cwd {
            Some(cwd) if cwd.is_absolute() => cwd,
            Some(cwd) => absolutize(&std::env::current_dir()?, &cwd),
            None => std::env::current_dir()?,
        };

        let fs = self
            .fs
            .unwrap_or_else(|| Arc::new(RealFileSystem::new()) as Arc<dyn FileSystem>);
        let loader = self.loader.unwrap_or_else(|| {
            Arc::new(PluginLoader::new(fs.clone(), ModuleRegistry::new())) as Arc<dyn ModuleLoader>
        });
        let globals = self
            .globals
            .unwrap_or_else(|| Arc::new(NpmGlobalModules::new()) as Arc<dyn GlobalModules>);

        debug!(
            "Env factory for '{}' rooted at {}",
            self.host.name(),
            cwd.display()
        );

        Ok(EnvFactory {
            host: self.host,
            config: Arc::new(self.config),
            fs,
            loader,
            globals,
            cwd,
            defaults: self.defaults,
            config_alias,
        })
    }
}
