use crate::error::{Error, Result};
use crate::SourceTreeLayout;
use std::path::{Path, PathBuf};

/// Find the project root by walking up from `start` looking for `package.json` or `.git`.
///
/// Returns the first directory containing either marker, or `None` if neither is found.
#[must_use]
pub fn project_root(start: &Path) -> Option<PathBuf> {
    let mut current = start.to_path_buf();

    loop {
        if current.join("package.json").exists() || current.join(".git").exists() {
            return Some(current);
        }

        if !current.pop() {
            return None;
        }
    }
}

/// Resolve the layout for an explicit root, or for the project containing `start`.
pub fn resolve_layout(explicit_root: Option<&Path>, start: &Path) -> Result<SourceTreeLayout> {
    if let Some(root) = explicit_root {
        return Ok(SourceTreeLayout::from_project_dir(root));
    }

    let root = project_root(start).ok_or_else(|| Error::ProjectNotFound {
        start: start.to_path_buf(),
    })?;
    Ok(SourceTreeLayout::from_project_dir(&root))
}
