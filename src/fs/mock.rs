//! In-memory filesystem for tests
//!
//! Adding a file implicitly creates every ancestor directory, so tests only
//! need to describe the files they care about.

use super::traits::{FileSystem, Stat};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Mock file system for testing
///
/// # Examples
///
/// ```
/// use plugin_env::fs::{FileSystem, MockFileSystem};
/// use std::path::Path;
///
/// let fs = MockFileSystem::new();
/// fs.add_file("/pkg/package.json", r#"{"name":"pkg"}"#);
///
/// let content = fs.read_to_string(Path::new("/pkg/package.json")).unwrap();
/// assert!(content.contains("pkg"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockFileSystem {
    files: Arc<Mutex<HashMap<PathBuf, String>>>,
    directories: Arc<Mutex<HashSet<PathBuf>>>,
    reads: Arc<Mutex<Vec<PathBuf>>>,
}

impl MockFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> MockFileSystemBuilder {
        MockFileSystemBuilder::new()
    }

    /// Add a file (and its ancestor directories)
    pub fn add_file(&self, path: impl AsRef<Path>, content: &str) {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            self.add_directory(parent);
        }
        self.files
            .lock()
            .unwrap()
            .insert(path.to_path_buf(), content.to_string());
    }

    /// Add a directory (and its ancestors)
    pub fn add_directory(&self, path: impl AsRef<Path>) {
        let mut dirs = self.directories.lock().unwrap();
        for dir in path.as_ref().ancestors() {
            if dir.as_os_str().is_empty() {
                continue;
            }
            dirs.insert(dir.to_path_buf());
        }
    }

    /// Paths passed to `read_to_string`, in call order
    pub fn reads(&self) -> Vec<PathBuf> {
        self.reads.lock().unwrap().clone()
    }
}

impl FileSystem for MockFileSystem {
    fn stat(&self, path: &Path) -> Option<Stat> {
        if let Some(content) = self.files.lock().unwrap().get(path) {
            return Some(Stat::file(content.len() as u64));
        }
        if self.directories.lock().unwrap().contains(path) {
            return Some(Stat::dir());
        }
        None
    }

    fn read_to_string(&self, path: &Path) -> std::io::Result<String> {
        self.reads.lock().unwrap().push(path.to_path_buf());
        self.files
            .lock()
            .unwrap()
            .get(path)
            .cloned()
            .ok_or_else(|| {
                std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("File not found: {}", path.display()),
                )
            })
    }
}

/// Builder for creating configured mock file systems
#[derive(Debug, Default)]
pub struct MockFileSystemBuilder {
    fs: MockFileSystem,
}

impl MockFileSystemBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(self, path: impl AsRef<Path>, content: &str) -> Self {
        self.fs.add_file(path, content);
        self
    }

    pub fn with_directory(self, path: impl AsRef<Path>) -> Self {
        self.fs.add_directory(path);
        self
    }

    pub fn build(self) -> MockFileSystem {
        self.fs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adding_a_file_creates_parent_directories() {
        let fs = MockFileSystem::builder()
            .with_file("/a/b/c/index.js", "")
            .build();

        assert!(fs.is_dir(Path::new("/a")));
        assert!(fs.is_dir(Path::new("/a/b/c")));
        assert!(fs.is_file(Path::new("/a/b/c/index.js")));
        assert!(!fs.exists(Path::new("/a/b/c/other.js")));
    }

    #[test]
    fn read_missing_file_is_not_found() {
        let fs = MockFileSystem::new();
        let err = fs.read_to_string(Path::new("/nope")).unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::NotFound);
        assert_eq!(fs.reads(), vec![PathBuf::from("/nope")]);
    }
}
