//! Nearest package metadata lookup
//!
//! Walks from a start directory up to the filesystem root and parses the
//! first metadata file (`package.json` by default) it finds.

use crate::error::{Error, Result};
use crate::fs::FileSystem;
use serde::Serialize;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tracing::trace;

/// Parsed package metadata; empty when no file was found
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct PackageMeta(Map<String, Value>);

impl PackageMeta {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    pub fn name(&self) -> Option<&str> {
        self.get_str("name")
    }

    pub fn version(&self) -> Option<&str> {
        self.get_str("version")
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }
}

/// Result of a metadata search
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PackageLookup {
    pub pkg_path: Option<PathBuf>,
    pub pkg: PackageMeta,
}

impl PackageLookup {
    pub fn not_found() -> Self {
        Self::default()
    }
}

pub struct PackageReader<'a> {
    fs: &'a dyn FileSystem,
    file_name: &'a str,
}

impl<'a> PackageReader<'a> {
    pub fn new(fs: &'a dyn FileSystem, file_name: &'a str) -> Self {
        Self { fs, file_name }
    }

    /// Find and parse the nearest metadata file at or above `start_dir`
    ///
    /// A file that exists but is not a JSON object fails with
    /// [`Error::MetadataParse`].
    pub fn find_package(&self, start_dir: &Path) -> Result<PackageLookup> {
        for dir in start_dir.ancestors() {
            let candidate = dir.join(self.file_name);
            trace!("Probing {}", candidate.display());
            if !self.fs.is_file(&candidate) {
                continue;
            }

            let pkg = self.parse(&candidate)?;
            return Ok(PackageLookup {
                pkg_path: Some(candidate),
                pkg,
            });
        }

        Ok(PackageLookup::not_found())
    }

    fn parse(&self, path: &Path) -> Result<PackageMeta> {
        let content = self.fs.read_to_string(path)?;
        let fields: Map<String, Value> =
            serde_json::from_str(&content).map_err(|source| Error::MetadataParse {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(PackageMeta(fields))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::MockFileSystem;

    #[test]
    fn nearest_metadata_wins() {
        let fs = MockFileSystem::builder()
            .with_file("/repo/package.json", r#"{"name":"outer"}"#)
            .with_file("/repo/packages/inner/package.json", r#"{"name":"inner","version":"1.2.0"}"#)
            .with_file("/repo/packages/inner/lib/index.js", "")
            .build();
        let reader = PackageReader::new(&fs, "package.json");

        let lookup = reader.find_package(Path::new("/repo/packages/inner/lib")).unwrap();
        assert_eq!(
            lookup.pkg_path,
            Some(PathBuf::from("/repo/packages/inner/package.json"))
        );
        assert_eq!(lookup.pkg.name(), Some("inner"));
        assert_eq!(lookup.pkg.version(), Some("1.2.0"));

        let lookup = reader.find_package(Path::new("/repo/other")).unwrap();
        assert_eq!(lookup.pkg.name(), Some("outer"));
    }

    #[test]
    fn missing_metadata_is_empty() {
        let fs = MockFileSystem::builder()
            .with_file("/fixtures/verb-readme-generator/index.js", "")
            .build();
        let lookup = PackageReader::new(&fs, "package.json")
            .find_package(Path::new("/fixtures/verb-readme-generator"))
            .unwrap();
        assert_eq!(lookup, PackageLookup::not_found());
        assert!(lookup.pkg.is_empty());
    }

    #[test]
    fn malformed_metadata_is_parse_error() {
        let fs = MockFileSystem::builder()
            .with_file("/broken/package.json", "{ not json")
            .build();
        let err = PackageReader::new(&fs, "package.json")
            .find_package(Path::new("/broken"))
            .unwrap_err();
        match err {
            Error::MetadataParse { path, .. } => {
                assert_eq!(path, PathBuf::from("/broken/package.json"))
            }
            other => panic!("expected MetadataParse, got {other:?}"),
        }
    }

    #[test]
    fn directory_named_like_metadata_is_skipped() {
        let fs = MockFileSystem::builder()
            .with_directory("/odd/package.json")
            .with_file("/package.json", r#"{"name":"root"}"#)
            .build();
        let lookup = PackageReader::new(&fs, "package.json")
            .find_package(Path::new("/odd"))
            .unwrap();
        assert_eq!(lookup.pkg.name(), Some("root"));
    }
}
