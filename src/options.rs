//! Caller-supplied env options

use serde_json::{Map, Value};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Transform from an env name to its alias
pub type AliasFn = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// Options mapping passed to `create_env`
///
/// Arbitrary values live in a JSON map; the entries resolution itself reads
/// (`to_alias`, `base`, `path`) are typed fields.
#[derive(Clone, Default)]
pub struct Options {
    values: Map<String, Value>,
    to_alias: Option<AliasFn>,
    base: Option<PathBuf>,
    path: Option<String>,
}

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(key, value);
        self
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.values.get(key).and_then(Value::as_str)
    }

    pub fn values(&self) -> &Map<String, Value> {
        &self.values
    }

    /// Set the alias transform
    pub fn to_alias<F>(mut self, f: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        self.to_alias = Some(Arc::new(f));
        self
    }

    pub fn with_alias_fn(mut self, f: AliasFn) -> Self {
        self.to_alias = Some(f);
        self
    }

    pub fn alias_fn(&self) -> Option<&AliasFn> {
        self.to_alias.as_ref()
    }

    /// Directory relative references are resolved against
    pub fn base(mut self, dir: impl Into<PathBuf>) -> Self {
        self.base = Some(dir.into());
        self
    }

    pub fn base_dir(&self) -> Option<&Path> {
        self.base.as_deref()
    }

    /// Reference used by the `(name, options)` argument form
    pub fn path(mut self, reference: impl Into<String>) -> Self {
        self.path = Some(reference.into());
        self
    }

    pub fn path_ref(&self) -> Option<&str> {
        self.path.as_deref()
    }

    /// Layer `self` over `defaults`; entries set on `self` win.
    pub fn merged_over(self, defaults: &Options) -> Options {
        let mut values = defaults.values.clone();
        values.extend(self.values);
        Options {
            values,
            to_alias: self.to_alias.or_else(|| defaults.to_alias.clone()),
            base: self.base.or_else(|| defaults.base.clone()),
            path: self.path.or_else(|| defaults.path.clone()),
        }
    }
}

impl fmt::Debug for Options {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Options")
            .field("values", &self.values)
            .field("to_alias", &self.to_alias.as_ref().map(|_| "<fn>"))
            .field("base", &self.base)
            .field("path", &self.path)
            .finish()
    }
}
