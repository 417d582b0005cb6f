//! Identity fields derived from an env's name and path
//!
//! Alias and namespace are derived on every read until a caller assigns
//! them, after which the assigned value sticks. [`Derivable`] carries that
//! two-state field; the free functions compute the path fragments.

use crate::options::AliasFn;
use crate::resolver::normalize;
use std::path::{Component, Path, PathBuf};

/// A field computed from other fields until explicitly assigned
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Derivable {
    #[default]
    Derived,
    Overridden(String),
}

impl Derivable {
    /// The assigned value, or `derive()` when none was assigned
    pub fn get_or_derive(&self, derive: impl FnOnce() -> String) -> String {
        match self {
            Derivable::Derived => derive(),
            Derivable::Overridden(value) => value.clone(),
        }
    }

    pub fn set(&mut self, value: impl Into<String>) {
        *self = Derivable::Overridden(value.into());
    }
}

pub fn derive_alias(name: &str, to_alias: Option<&AliasFn>) -> String {
    match to_alias {
        Some(transform) => transform(name),
        None => name.to_string(),
    }
}

pub fn derive_namespace(creator: &str, alias: &str) -> String {
    format!("{creator}.{alias}")
}

pub fn basename(path: &Path) -> Option<String> {
    path.file_name().map(|n| n.to_string_lossy().into_owned())
}

/// Basename without its final extension
pub fn stem(path: &Path) -> Option<String> {
    path.file_stem().map(|n| n.to_string_lossy().into_owned())
}

pub fn dirname(path: &Path) -> Option<PathBuf> {
    path.parent().map(Path::to_path_buf)
}

/// Short lookup key for a reference: its last segment without the loadable
/// extension, or the enclosing directory's name for index files.
pub fn derive_key(reference: &Path, index_stem: &str, extension: &str) -> Option<String> {
    let name = basename(reference)?;
    let suffix = format!(".{extension}");
    let trimmed = match name.strip_suffix(&suffix) {
        Some(stripped) if !extension.is_empty() && !stripped.is_empty() => stripped.to_string(),
        _ => name.clone(),
    };

    if trimmed == index_stem {
        return reference.parent().and_then(basename).or(Some(trimmed));
    }
    Some(trimmed)
}

/// `path` expressed relative to `base`
///
/// Paths on different roots (e.g. Windows drives) are returned unchanged.
pub fn relative_to(path: &Path, base: &Path) -> PathBuf {
    let path = normalize(path);
    let base = normalize(base);
    if path.has_root() != base.has_root() {
        return path;
    }

    let target: Vec<Component<'_>> = path.components().collect();
    let from: Vec<Component<'_>> = base.components().collect();
    let same_prefix = match (target.first(), from.first()) {
        (Some(Component::Prefix(a)), Some(Component::Prefix(b))) => a == b,
        (Some(Component::Prefix(_)), _) | (_, Some(Component::Prefix(_))) => false,
        _ => true,
    };
    if !same_prefix {
        return path.clone();
    }

    let common = target
        .iter()
        .zip(from.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut relative = PathBuf::new();
    for _ in common..from.len() {
        relative.push("..");
    }
    for component in &target[common..] {
        relative.push(component.as_os_str());
    }
    relative
}
