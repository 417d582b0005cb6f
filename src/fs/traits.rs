//! Filesystem trait definitions

use serde::Serialize;
use std::path::Path;

/// Stat-like record for a path
///
/// `Stat::default()` is the empty record used for unresolved or missing
/// paths.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Stat {
    pub exists: bool,
    pub is_file: bool,
    pub is_dir: bool,
    pub len: u64,
}

impl Stat {
    pub fn file(len: u64) -> Self {
        Self {
            exists: true,
            is_file: true,
            is_dir: false,
            len,
        }
    }

    pub fn dir() -> Self {
        Self {
            exists: true,
            is_file: false,
            is_dir: true,
            len: 0,
        }
    }

    /// True for the empty record.
    pub fn is_empty(&self) -> bool {
        !self.exists
    }
}

/// File system operations trait
///
/// # Examples
///
/// ```
/// use plugin_env::fs::FileSystem;
/// use std::path::Path;
///
/// fn has_index<F: FileSystem>(fs: &F, dir: &Path) -> bool {
///     fs.is_file(&dir.join("index.js"))
/// }
/// ```
pub trait FileSystem: Send + Sync {
    /// Stat a path, `None` when it does not exist
    fn stat(&self, path: &Path) -> Option<Stat>;

    /// Read a file's contents as a string
    fn read_to_string(&self, path: &Path) -> std::io::Result<String>;

    /// Check if a path exists
    fn exists(&self, path: &Path) -> bool {
        self.stat(path).is_some()
    }

    /// Check if a path is a regular file
    fn is_file(&self, path: &Path) -> bool {
        self.stat(path).is_some_and(|s| s.is_file)
    }

    /// Check if a path is a directory
    fn is_dir(&self, path: &Path) -> bool {
        self.stat(path).is_some_and(|s| s.is_dir)
    }
}
