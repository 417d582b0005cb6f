//! # plugin-env
//!
//! Resolve a module reference into an [`Env`]: an absolute path plus the
//! identity metadata derived from it, with a memoized, load-on-demand
//! invocation of the module's export.
//!
//! ## Modules
//!
//! - `config` - Resolution settings loaded from TOML and the environment
//! - `env` - The `Env` record and the factory that builds it
//! - `error` - Crate-wide error type
//! - `fs` - Filesystem abstraction with real and in-memory implementations
//! - `identity` - Name, alias, namespace and path fragment derivation
//! - `logging` - Tracing subscriber setup
//! - `options` - Caller-supplied env options
//! - `package` - Nearest `package.json` lookup
//! - `plugin` - Module exports, contexts, loaders and lazy invocation
//! - `resolver` - Reference to absolute path resolution
pub mod config;
pub mod env;
pub mod error;
pub mod fs;
pub mod identity;
pub mod logging;
pub mod options;
pub mod package;
pub mod plugin;
pub mod resolver;

pub use config::EnvConfig;
pub use env::{Env, EnvFactory, EnvFactoryBuilder, EnvSummary};
pub use error::{Error, Result};
pub use options::Options;
pub use plugin::{AppState, Context, Export};
