use serde::Serialize;
use std::path::{Path, PathBuf};

/// Module imported first by the synthesized entry, relative to the project.
pub const TEST_INIT_MODULE: &str = "./scripts/ci/angular-test-init-spec.ts";

/// Absolute locations of everything the bundle pipeline reads or writes.
///
/// Built once at startup and passed by reference to every stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceTreeLayout {
    /// Repository root.
    pub project_dir: PathBuf,
    /// Distribution root (`<project>/dist`).
    pub dist_dir: PathBuf,
    /// Installed packages (`<project>/node_modules`).
    pub node_modules_dir: PathBuf,
    /// Built output of the scoped packages (`<dist>/all/@angular`).
    pub legacy_output_dir: PathBuf,
    /// Final bundle destination.
    pub out_file: PathBuf,
    /// TypeScript compiler entry script.
    pub tsc_bin: PathBuf,
    /// Project configuration consumed by the compiler.
    pub legacy_tsconfig: PathBuf,
    /// Bootstrap module imported ahead of every spec.
    pub test_init_module: String,
}

impl SourceTreeLayout {
    /// Derive the layout from the repository root.
    #[must_use]
    pub fn from_project_dir(project_dir: &Path) -> Self {
        let project_dir = dunce::canonicalize(project_dir).unwrap_or_else(|_| project_dir.to_path_buf());
        let dist_dir = project_dir.join("dist");
        let node_modules_dir = project_dir.join("node_modules");

        Self {
            legacy_output_dir: dist_dir.join("all").join("@angular"),
            out_file: dist_dir.join("legacy-test-bundle.spec.js"),
            tsc_bin: node_modules_dir.join(".bin").join("tsc"),
            legacy_tsconfig: project_dir
                .join("packages")
                .join("tsconfig-legacy-saucelabs.json"),
            test_init_module: TEST_INIT_MODULE.to_string(),
            dist_dir,
            node_modules_dir,
            project_dir,
        }
    }

    /// Path of a binary installed under `node_modules/.bin`.
    #[must_use]
    pub fn node_bin(&self, name: &str) -> PathBuf {
        self.node_modules_dir.join(".bin").join(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_layout_paths_hang_off_project_dir() {
        let dir = tempdir().unwrap();
        let layout = SourceTreeLayout::from_project_dir(dir.path());
        let root = &layout.project_dir;

        assert_eq!(layout.dist_dir, root.join("dist"));
        assert_eq!(
            layout.legacy_output_dir,
            root.join("dist").join("all").join("@angular")
        );
        assert_eq!(
            layout.out_file,
            root.join("dist").join("legacy-test-bundle.spec.js")
        );
        assert_eq!(
            layout.tsc_bin,
            root.join("node_modules").join(".bin").join("tsc")
        );
        assert!(layout
            .legacy_tsconfig
            .ends_with("packages/tsconfig-legacy-saucelabs.json"));
        assert_eq!(layout.test_init_module, TEST_INIT_MODULE);
    }

    #[test]
    fn test_layout_serializes_to_json() {
        let layout = SourceTreeLayout::from_project_dir(Path::new("/repo"));
        let json = serde_json::to_value(&layout).unwrap();
        assert!(json["out_file"].is_string());
        assert!(json["legacy_output_dir"].is_string());
    }
}
