//! Path string helpers.

use std::path::{Component, Path};

/// Render a path with forward slashes, whatever the host separator.
#[must_use]
pub fn to_slash(path: &Path) -> String {
    let raw = path.to_string_lossy();
    if cfg!(windows) {
        raw.replace('\\', "/")
    } else {
        raw.into_owned()
    }
}

/// Express `path` relative to `base` using forward slashes.
///
/// Returns `None` when `path` is not inside `base`.
#[must_use]
pub fn relative_slash(path: &Path, base: &Path) -> Option<String> {
    let rel = path.strip_prefix(base).ok()?;
    let parts: Vec<String> = rel
        .components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();
    Some(parts.join("/"))
}
