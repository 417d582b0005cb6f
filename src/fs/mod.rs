//! Filesystem abstraction used by resolution and metadata lookup
//!
//! Resolution only ever needs to stat paths and read small text files, so the
//! surface is kept to exactly that:
//! - **Traits**: [`FileSystem`] and the [`Stat`] record it produces
//! - **Real Implementation**: [`RealFileSystem`] delegating to `std::fs`
//! - **Mock Implementation**: [`MockFileSystem`], an in-memory tree for tests
//!
//! # Usage
//!
//! ```
//! use plugin_env::fs::{FileSystem, MockFileSystem};
//! use std::path::Path;
//!
//! let fs = MockFileSystem::builder()
//!     .with_file("/app/node_modules/foo/index.js", "")
//!     .build();
//!
//! assert!(fs.is_dir(Path::new("/app/node_modules/foo")));
//! assert!(fs.is_file(Path::new("/app/node_modules/foo/index.js")));
//! ```

mod mock;
mod real;
mod traits;

pub use mock::{MockFileSystem, MockFileSystemBuilder};
pub use real::RealFileSystem;
pub use traits::{FileSystem, Stat};
