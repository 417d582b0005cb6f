//! Load-on-demand invocation with a memoized instance
//!
//! The instance starts out [`AppState::Unloaded`]: reading its properties
//! yields nothing and never loads the module. The first [`LazyInvoker::invoke`]
//! loads the export, runs it and caches the result; every later call returns
//! that cached instance.

use crate::error::{Error, Result};
use once_cell::sync::OnceCell;
use serde_json::Value;
use std::path::Path;
use std::sync::{Mutex, PoisonError};
use tracing::debug;

use super::{Context, Export, ModuleLoader};

/// Materialization state of an env's instance
#[derive(Debug, Clone, Default)]
pub enum AppState {
    #[default]
    Unloaded,
    Loaded(Context),
}

impl AppState {
    /// Property of the instance; always `None` before materialization
    pub fn get(&self, key: &str) -> Option<Value> {
        match self {
            AppState::Unloaded => None,
            AppState::Loaded(instance) => instance.get(key),
        }
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self, AppState::Loaded(_))
    }

    pub fn instance(&self) -> Option<&Context> {
        match self {
            AppState::Unloaded => None,
            AppState::Loaded(instance) => Some(instance),
        }
    }
}

/// Where an export comes from
#[derive(Clone, Copy)]
pub struct LoadTarget<'a> {
    /// Used in error messages
    pub name: &'a str,
    pub path: Option<&'a Path>,
    pub loader: &'a dyn ModuleLoader,
}

#[derive(Default)]
pub struct LazyInvoker {
    export: OnceCell<Export>,
    app: Mutex<AppState>,
}

impl LazyInvoker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Invoker for a caller-supplied instance, already materialized
    pub fn with_instance(instance: Context) -> Self {
        Self {
            export: OnceCell::with_value(Export::Instance(instance.clone())),
            app: Mutex::new(AppState::Loaded(instance)),
        }
    }

    /// Load the export once and return it
    pub fn export(&self, target: LoadTarget<'_>) -> Result<Export> {
        self.export
            .get_or_try_init(|| {
                let path = target
                    .path
                    .ok_or_else(|| Error::load(target.name, "no path resolved"))?;
                target.loader.load(path)
            })
            .cloned()
    }

    pub fn is_export_loaded(&self) -> bool {
        self.export.get().is_some()
    }

    /// Forget a loaded export so the next load reads the current path
    pub fn reset_export(&mut self) {
        self.export.take();
    }

    pub fn app(&self) -> AppState {
        self.app.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Materialize the instance, running the export at most once
    ///
    /// The state lock is held across load and call, so concurrent first calls
    /// converge on a single instance. The export must not invoke the same
    /// env re-entrantly.
    pub fn invoke(
        &self,
        target: LoadTarget<'_>,
        context: &Context,
        parent: Option<&Context>,
    ) -> Result<Context> {
        let mut app = self.app.lock().unwrap_or_else(PoisonError::into_inner);
        if let AppState::Loaded(instance) = &*app {
            return Ok(instance.clone());
        }

        let instance = match self.export(target)? {
            Export::Function(f) => {
                debug!("Invoking '{}' with context '{}'", target.name, context.name());
                f(context, parent)
                    .map_err(|e| Error::Invocation {
                        name: target.name.to_string(),
                        reason: format!("{e:#}"),
                    })?
                    .unwrap_or_else(|| context.clone())
            }
            Export::Instance(instance) => {
                debug!("Materializing instance export of '{}'", target.name);
                instance
            }
        };

        *app = AppState::Loaded(instance.clone());
        Ok(instance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::MockFileSystem;
    use crate::plugin::{ModuleRegistry, PluginLoader};
    use serde_json::json;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    const PATH: &str = "/m/readme/index.js";

    fn loader_with(export: Export) -> PluginLoader {
        let fs = MockFileSystem::builder().with_file(PATH, "").build();
        let registry = ModuleRegistry::new().with(PATH, export).unwrap();
        PluginLoader::new(Arc::new(fs), registry)
    }

    fn target<'a>(path: &'a Path, loader: &'a PluginLoader) -> LoadTarget<'a> {
        LoadTarget {
            name: "readme",
            path: Some(path),
            loader,
        }
    }

    #[test]
    fn function_runs_once_and_result_is_cached() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let loader = loader_with(Export::function(move |ctx, _| {
            counter.fetch_add(1, Ordering::SeqCst);
            ctx.set("isReadme", true);
            Ok(None)
        }));
        let path = PathBuf::from(PATH);
        let invoker = LazyInvoker::new();
        let app = Context::new("app");

        let first = invoker.invoke(target(&path, &loader), &app, None).unwrap();
        let second = invoker.invoke(target(&path, &loader), &Context::new("other"), None).unwrap();

        assert!(first.ptr_eq(&app));
        assert!(second.ptr_eq(&first));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(invoker.app().get("isReadme"), Some(json!(true)));
    }

    #[test]
    fn returned_instance_replaces_context() {
        let loader = loader_with(Export::function(|ctx, parent| {
            let child = Context::new(format!("{}-child", ctx.name()));
            child.set("parent", parent.map(|p| p.name().to_string()));
            Ok(Some(child))
        }));
        let path = PathBuf::from(PATH);
        let invoker = LazyInvoker::new();
        let base = Context::new("base");

        let instance = invoker
            .invoke(target(&path, &loader), &Context::new("app"), Some(&base))
            .unwrap();
        assert_eq!(instance.name(), "app-child");
        assert_eq!(instance.get("parent"), Some(json!("base")));
    }

    #[test]
    fn properties_are_absent_until_invoked() {
        let generator = Context::new("generate-node");
        generator.set("foo", "bar");
        let loader = loader_with(Export::instance(generator));
        let path = PathBuf::from(PATH);
        let invoker = LazyInvoker::new();

        assert!(invoker.app().get("foo").is_none());
        assert!(!invoker.is_export_loaded());

        invoker
            .invoke(target(&path, &loader), &Context::new("app"), None)
            .unwrap();
        assert_eq!(invoker.app().get("foo"), Some(json!("bar")));
    }

    #[test]
    fn failures_are_not_cached_as_instances() {
        let loader = loader_with(Export::function(|_, _| anyhow::bail!("boom")));
        let path = PathBuf::from(PATH);
        let invoker = LazyInvoker::new();

        let err = invoker
            .invoke(target(&path, &loader), &Context::new("app"), None)
            .unwrap_err();
        assert_eq!(err.to_string(), "invocation of 'readme' failed: boom");
        assert!(!invoker.app().is_loaded());
    }

    #[test]
    fn missing_path_is_load_error() {
        let loader = loader_with(Export::function(|_, _| Ok(None)));
        let invoker = LazyInvoker::new();
        let err = invoker
            .invoke(
                LoadTarget {
                    name: "nameless",
                    path: None,
                    loader: &loader,
                },
                &Context::new("app"),
                None,
            )
            .unwrap_err();
        assert!(matches!(err, Error::Load { .. }));
    }

    #[test]
    fn supplied_instance_is_materialized() {
        let instance = Context::new("base");
        let invoker = LazyInvoker::with_instance(instance.clone());
        assert!(invoker.app().instance().unwrap().ptr_eq(&instance));
    }

    #[test]
    fn concurrent_first_calls_converge() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let loader = Arc::new(loader_with(Export::function(move |ctx, _| {
            counter.fetch_add(1, Ordering::SeqCst);
            std::thread::sleep(std::time::Duration::from_millis(5));
            Ok(Some(Context::new(format!("{}-instance", ctx.name()))))
        })));
        let invoker = Arc::new(LazyInvoker::new());

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let invoker = invoker.clone();
                let loader = loader.clone();
                std::thread::spawn(move || {
                    let path = PathBuf::from(PATH);
                    invoker
                        .invoke(target(&path, &loader), &Context::new(format!("ctx{i}")), None)
                        .unwrap()
                })
            })
            .collect();
        let instances: Vec<Context> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(instances.iter().all(|i| i.ptr_eq(&instances[0])));
    }
}
