//! Post-bundle literal patch.
//!
//! esbuild's scope hoisting renames one runtime symbol (`$rootScope` becomes
//! `$rootScope2`) and the specs look it up by its original name. The bundle
//! is rewritten once with a plain substring replacement.

use crate::error::{Error, Result};
use specbundle_util::fs::atomic_write;
use std::fs;
use std::path::Path;

/// Replace every occurrence of `from` with `to`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiteralPatch {
    pub from: &'static str,
    pub to: &'static str,
}

/// The patch applied to the legacy test bundle.
pub const ROOT_SCOPE_PATCH: LiteralPatch = LiteralPatch {
    from: "$rootScope2",
    to: "$rootScope",
};

impl LiteralPatch {
    /// Apply to text; returns the new text and how many replacements were made.
    #[must_use]
    pub fn apply(&self, text: &str) -> (String, usize) {
        let count = text.matches(self.from).count();
        if count == 0 {
            return (text.to_string(), 0);
        }
        (text.replace(self.from, self.to), count)
    }

    /// Read `path`, apply, and write it back. Any I/O failure is fatal.
    pub fn apply_to_file(&self, path: &Path) -> Result<usize> {
        let contents = fs::read_to_string(path).map_err(|source| Error::Patch {
            path: path.to_path_buf(),
            source,
        })?;

        let (patched, count) = self.apply(&contents);
        atomic_write(path, patched.as_bytes()).map_err(|source| Error::Patch {
            path: path.to_path_buf(),
            source,
        })?;

        tracing::debug!(from = self.from, to = self.to, count, "patched bundle");
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_apply_replaces_only_the_literal() {
        let patch = LiteralPatch {
            from: "dupSymbol2",
            to: "dupSymbol",
        };
        let (out, count) = patch.apply("var dupSymbol2 = 1; use(dupSymbol2); dupSymbol; dupSymbol3;");
        assert_eq!(out, "var dupSymbol = 1; use(dupSymbol); dupSymbol; dupSymbol3;");
        assert_eq!(count, 2);
    }

    #[test]
    fn test_apply_without_match_is_identity() {
        let (out, count) = ROOT_SCOPE_PATCH.apply("angular.module('x');");
        assert_eq!(out, "angular.module('x');");
        assert_eq!(count, 0);
    }

    #[test]
    fn test_apply_to_file_rewrites_in_place() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bundle.js");
        fs::write(&path, "inject(function($rootScope2) { $rootScope2.$digest(); });").unwrap();

        let count = ROOT_SCOPE_PATCH.apply_to_file(&path).unwrap();
        assert_eq!(count, 2);
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "inject(function($rootScope) { $rootScope.$digest(); });"
        );
    }

    #[test]
    fn test_apply_to_missing_file_is_fatal() {
        let dir = tempdir().unwrap();
        let err = ROOT_SCOPE_PATCH
            .apply_to_file(&dir.path().join("missing.js"))
            .unwrap_err();
        assert!(matches!(err, Error::Patch { .. }));
    }
}
