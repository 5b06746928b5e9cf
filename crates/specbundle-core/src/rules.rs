//! Ordered import-specifier redirection rules.
//!
//! A [`RuleChain`] maps specifiers requested during bundling onto files in the
//! locally built output. Rules are consulted in declaration order; the first
//! rule that matches and produces a path wins. When nothing applies the chain
//! answers [`ResolutionOutcome::Unhandled`] and the bundler falls back to its
//! own resolution.
//!
//! The chain holds no mutable state, so one instance can serve concurrent
//! resolution requests.

use crate::error::{Error, Result};
use crate::probe::{probe, EntryKind};
use crate::SourceTreeLayout;
use regex_lite::Regex;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Index file looked up inside a resolved directory.
pub const INDEX_FILE: &str = "index.js";

/// Extension appended when the bare path does not exist.
pub const MODULE_EXTENSION: &str = ".js";

/// Outcome of running a specifier through the chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionOutcome {
    /// Use this file.
    Resolved(PathBuf),
    /// Not ours; continue with default resolution.
    Unhandled,
}

impl ResolutionOutcome {
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Resolved(path) => Some(path),
            Self::Unhandled => None,
        }
    }
}

#[derive(Debug, Clone)]
enum Target {
    /// Always the same file, without probing.
    Fixed(PathBuf),
    /// Strip `prefix`, join the rest onto `root`, then probe.
    ScopedPackage { prefix: String, root: PathBuf },
}

/// A specifier matcher plus the strategy that produces a path for it.
#[derive(Debug, Clone)]
pub struct ResolutionRule {
    name: String,
    pattern: Regex,
    target: Target,
}

impl ResolutionRule {
    /// Redirect every specifier matching `pattern` to `path`.
    pub fn fixed(name: impl Into<String>, pattern: &str, path: impl Into<PathBuf>) -> Result<Self> {
        Ok(Self {
            name: name.into(),
            pattern: compile(pattern)?,
            target: Target::Fixed(path.into()),
        })
    }

    /// Map `<prefix><rest>` onto `<root>/<rest>`, probing for a directory
    /// index or a `.js` file.
    pub fn scoped_package(
        name: impl Into<String>,
        prefix: &str,
        root: impl Into<PathBuf>,
    ) -> Result<Self> {
        Ok(Self {
            name: name.into(),
            pattern: compile(&format!("^{}", regex_lite::escape(prefix)))?,
            target: Target::ScopedPackage {
                prefix: prefix.to_string(),
                root: root.into(),
            },
        })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn matches(&self, specifier: &str) -> bool {
        self.pattern.is_match(specifier)
    }

    /// Produce a path for a specifier this rule matched.
    #[must_use]
    pub fn resolve(&self, specifier: &str) -> Option<PathBuf> {
        match &self.target {
            Target::Fixed(path) => Some(path.clone()),
            Target::ScopedPackage { prefix, root } => {
                let rest = specifier.strip_prefix(prefix.as_str())?;
                resolve_in_root(root, rest)
            }
        }
    }
}

fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|e| Error::Pattern {
        pattern: pattern.to_string(),
        message: e.to_string(),
    })
}

/// Probe `<root>/<rest>` as a directory (with index), as-is, or with `.js`.
fn resolve_in_root(root: &Path, rest: &str) -> Option<PathBuf> {
    // An absolute remainder would replace `root` entirely.
    let candidate = root.join(rest.trim_start_matches('/'));

    match probe(&candidate) {
        Some(EntryKind::Dir) => {
            let index = candidate.join(INDEX_FILE);
            probe(&index).map(|_| index)
        }
        Some(_) => Some(candidate),
        None => {
            let mut with_ext = OsString::from(candidate);
            with_ext.push(MODULE_EXTENSION);
            let with_ext = PathBuf::from(with_ext);
            probe(&with_ext).map(|_| with_ext)
        }
    }
}

/// Rules evaluated in a fixed order.
#[derive(Debug, Clone, Default)]
pub struct RuleChain {
    rules: Vec<ResolutionRule>,
}

impl RuleChain {
    #[must_use]
    pub fn new(rules: Vec<ResolutionRule>) -> Self {
        Self { rules }
    }

    /// The rule set for the legacy test bundle.
    ///
    /// Deep `@angular/core` internals come before the generic package rule
    /// because they are not reachable through a package entry point.
    pub fn for_layout(layout: &SourceTreeLayout) -> Result<Self> {
        let out = &layout.legacy_output_dir;
        let core_src = out.join("core").join("src");
        let change_detection = core_src.join("change_detection");

        let rules = vec![
            ResolutionRule::fixed(
                "in-memory-web-api",
                r"^angular-in-memory-web-api",
                out.join("misc")
                    .join("angular-in-memory-web-api")
                    .join(INDEX_FILE),
            )?,
            ResolutionRule::fixed(
                "es5-inheritance-fixture",
                r"es5_downleveled_inheritance_fixture$",
                layout
                    .dist_dir
                    .join("bin/packages/core/test/reflection")
                    .join("es5_downleveled_inheritance_fixture.js"),
            )?,
            ResolutionRule::fixed(
                "core-default-keyvalue-differ",
                r"^@angular/core/src/change_detection/differs/default_keyvalue_differ",
                change_detection
                    .join("differs")
                    .join("default_keyvalue_differ.js"),
            )?,
            ResolutionRule::fixed(
                "core-metadata",
                r"^@angular/core/src/metadata",
                core_src.join("metadata.js"),
            )?,
            ResolutionRule::fixed(
                "core-change-detection-util",
                r"^@angular/core/src/change_detection/change_detection_util",
                change_detection.join("change_detection_util.js"),
            )?,
            ResolutionRule::fixed(
                "core-change-detection",
                r"^@angular/core/src/change_detection",
                change_detection.join("change_detection.js"),
            )?,
            ResolutionRule::fixed(
                "core-zone",
                r"^@angular/core/src/zone",
                core_src.join("zone").join("ng_zone.js"),
            )?,
            ResolutionRule::scoped_package("scoped-package", "@angular/", out.clone())?,
            ResolutionRule::fixed("dom-shim-stub", r"domino", out.join("empty.js"))?,
        ];

        Ok(Self::new(rules))
    }

    #[must_use]
    pub fn rules(&self) -> &[ResolutionRule] {
        &self.rules
    }

    /// Run `specifier` through the rules in order.
    #[must_use]
    pub fn resolve(&self, specifier: &str) -> ResolutionOutcome {
        for rule in &self.rules {
            if !rule.matches(specifier) {
                continue;
            }
            if let Some(path) = rule.resolve(specifier) {
                tracing::debug!(specifier, rule = rule.name(), path = %path.display(), "resolved");
                return ResolutionOutcome::Resolved(path);
            }
            tracing::trace!(specifier, rule = rule.name(), "rule matched without a target");
        }
        ResolutionOutcome::Unhandled
    }
}
