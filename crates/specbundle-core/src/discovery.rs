//! Spec file discovery.
//!
//! Walks the built output for compiled spec files and filters them through
//! an ordered list of inclusion and `!`-prefixed exclusion globs. Exclusions
//! only ever remove: a file hit by any exclusion is dropped no matter how
//! many inclusions also matched it.

use crate::error::{Error, Result};
use glob::{MatchOptions, Pattern};
use specbundle_util::path::relative_slash;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Compiled spec files under the built output.
pub const SPEC_GLOB: &str = "**/*_spec.js";

/// Carve-outs for specs the browser bundle cannot run: benchmark harnesses,
/// the custom-elements package, diagnostic fixtures, compiler test suites,
/// end-to-end tests and node-only specs.
pub const LEGACY_SPEC_PATTERNS: &[&str] = &[
    "**/*_spec.js",
    "!**/benchpress/**/*.js",
    "!**/elements/**/*.js",
    "!**/compiler-cli/test/diagnostics/**",
    "!**/_testing_init/**/*.js",
    "!**/**/e2e_test/**/*.js",
    "!**/**/*node_only_spec.js",
    "!**/compiler-cli/**/*.js",
    "!**/compiler-cli/src/ngtsc/**/*.js",
    "!**/compiler-cli/test/compliance/**/*.js",
    "!**/compiler-cli/test/ngtsc/**/*.js",
    "!**/compiler/test/aot/**/*.js",
    "!**/compiler/test/render3/**/*.js",
    "!**/core/test/bundling/**/*.js",
    "!**/core/test/render3/ivy/**/*.js",
    "!**/core/test/render3/jit/**/*.js",
    "!**/core/test/render3/perf/**/*.js",
    "!**/elements/schematics/*.js",
    "!**/examples/**/e2e_test/*.js",
    "!**/language-service/**/*.js",
    "!**/localize/**/test/**/*.js",
    "!**/localize/schematics/**/*.js",
    "!**/router/**/test/**/*.js",
    "!**/platform-browser/testing/e2e_util.js",
];

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// Which files count as specs. Patterns are relative to the searched root.
#[derive(Debug, Clone)]
pub struct SpecQuery {
    include: Pattern,
    positives: Vec<Pattern>,
    negatives: Vec<Pattern>,
}

impl SpecQuery {
    /// `include` selects candidates; `patterns` is a multimatch-style list
    /// where entries starting with `!` exclude.
    pub fn new<S: AsRef<str>>(include: &str, patterns: &[S]) -> Result<Self> {
        let mut positives = Vec::new();
        let mut negatives = Vec::new();

        for raw in patterns {
            let raw = raw.as_ref();
            match raw.strip_prefix('!') {
                Some(negated) => negatives.push(compile(negated)?),
                None => positives.push(compile(raw)?),
            }
        }

        Ok(Self {
            include: compile(include)?,
            positives,
            negatives,
        })
    }

    /// The query used for the legacy test bundle.
    pub fn legacy() -> Result<Self> {
        Self::new(SPEC_GLOB, LEGACY_SPEC_PATTERNS)
    }

    /// Whether a root-relative, `/`-separated path is a spec.
    #[must_use]
    pub fn matches(&self, rel: &str) -> bool {
        if !self.include.matches_with(rel, MATCH_OPTIONS) {
            return false;
        }
        let included = self.positives.is_empty()
            || self
                .positives
                .iter()
                .any(|p| p.matches_with(rel, MATCH_OPTIONS));
        included
            && !self
                .negatives
                .iter()
                .any(|p| p.matches_with(rel, MATCH_OPTIONS))
    }
}

fn compile(pattern: &str) -> Result<Pattern> {
    Pattern::new(pattern).map_err(|e| Error::Pattern {
        pattern: pattern.to_string(),
        message: e.to_string(),
    })
}

/// Find spec files under `root`.
///
/// Returns absolute paths in sorted walk order, deduplicated by canonical
/// path (the first path in walk order is kept). Unreadable directories are
/// skipped.
#[must_use]
pub fn discover_specs(root: &Path, query: &SpecQuery) -> Vec<PathBuf> {
    let mut seen = HashSet::new();
    let mut specs = Vec::new();
    let mut skipped = 0usize;

    for entry in WalkDir::new(root)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                tracing::trace!(error = %err, "skipping unreadable entry");
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }

        let Some(rel) = relative_slash(entry.path(), root) else {
            continue;
        };
        if !query.matches(&rel) {
            if query.include.matches_with(&rel, MATCH_OPTIONS) {
                skipped += 1;
            }
            continue;
        }

        // Symlinked directories can expose one file under several paths.
        let path = entry.into_path();
        let key = dunce::canonicalize(&path).unwrap_or_else(|_| path.clone());
        if seen.insert(key) {
            specs.push(path);
        }
    }

    tracing::debug!(found = specs.len(), excluded = skipped, root = %root.display(), "discovered specs");
    specs
}
