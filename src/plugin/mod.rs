//! Loadable module exports and the contexts they run against
//!
//! A module's export is either a function, invoked with the caller's context
//! and an optional parent context, or a ready-made instance. Exports are
//! produced by a [`ModuleLoader`]; [`PluginLoader`] is the stock loader,
//! backed by a [`ModuleRegistry`].

use crate::error::Result;
use serde_json::{Map, Value};
use std::fmt;
use std::path::Path;
use std::sync::{Arc, PoisonError, RwLock};

pub mod invoker;
pub mod loader;
pub mod registry;

pub use invoker::{AppState, LazyInvoker, LoadTarget};
pub use loader::PluginLoader;
pub use registry::ModuleRegistry;

/// Function exported by a module
///
/// Returning `Ok(None)` means the function configured the context it was
/// given in place, which then becomes the instance.
pub type PluginFn =
    Arc<dyn Fn(&Context, Option<&Context>) -> anyhow::Result<Option<Context>> + Send + Sync>;

/// Turns an absolute path into the module's export
pub trait ModuleLoader: Send + Sync {
    fn load(&self, path: &Path) -> Result<Export>;
}

/// What a loaded module exposes
#[derive(Clone)]
pub enum Export {
    Function(PluginFn),
    Instance(Context),
}

impl Export {
    pub fn function<F>(f: F) -> Self
    where
        F: Fn(&Context, Option<&Context>) -> anyhow::Result<Option<Context>>
            + Send
            + Sync
            + 'static,
    {
        Export::Function(Arc::new(f))
    }

    pub fn instance(instance: Context) -> Self {
        Export::Instance(instance)
    }

    pub fn is_function(&self) -> bool {
        matches!(self, Export::Function(_))
    }
}

impl fmt::Debug for Export {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Export::Function(_) => f.write_str("Export::Function(<fn>)"),
            Export::Instance(ctx) => f.debug_tuple("Export::Instance").field(ctx).finish(),
        }
    }
}

/// Shared property bag with an identity name
///
/// Clones share state; use [`Context::ptr_eq`] to compare identity.
#[derive(Clone)]
pub struct Context {
    inner: Arc<ContextInner>,
}

struct ContextInner {
    name: String,
    props: RwLock<Map<String, Value>>,
}

impl Context {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(ContextInner {
                name: name.into(),
                props: RwLock::new(Map::new()),
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        self.read().get(key).cloned()
    }

    pub fn set(&self, key: impl Into<String>, value: impl Into<Value>) {
        self.inner
            .props
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.into(), value.into());
    }

    pub fn contains(&self, key: &str) -> bool {
        self.read().contains_key(key)
    }

    pub fn snapshot(&self) -> Map<String, Value> {
        self.read().clone()
    }

    pub fn ptr_eq(&self, other: &Context) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Map<String, Value>> {
        self.inner.props.read().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("name", &self.inner.name)
            .field("props", &*self.read())
            .finish()
    }
}
