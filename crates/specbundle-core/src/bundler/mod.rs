//! Bundle engine boundary.
//!
//! The pipeline hands a virtual entry module and a [`PluginContainer`] to a
//! [`BundleEngine`] and gets back the bundled code plus any diagnostics the
//! engine reported. The engine owns graph traversal and code generation; the
//! pipeline only contributes resolution through plugins.
//!
//! ## Usage
//!
//! ```ignore
//! use specbundle_core::bundler::{BundleEngine, BundleRequest, EsbuildEngine, PluginContainer};
//!
//! let engine = EsbuildEngine::for_layout(&layout);
//! let output = engine.bundle(&BundleRequest::iife(entry_source, &layout.project_dir), &plugins)?;
//! ```

mod esbuild;
mod plugin;

pub use esbuild::EsbuildEngine;
pub use plugin::{
    HookResult, Plugin, PluginContainer, PluginContext, PluginError, ResolveIdResult,
    ResolverPlugin,
};

use crate::error::Result;
use std::path::{Path, PathBuf};

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BundleFormat {
    /// ES Modules (import/export).
    Esm,
    /// CommonJS (require/module.exports).
    Cjs,
    /// Immediately invoked function expression.
    #[default]
    Iife,
}

impl BundleFormat {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Esm => "esm",
            Self::Cjs => "cjs",
            Self::Iife => "iife",
        }
    }
}

/// Environment the bundle runs in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Platform {
    #[default]
    Browser,
    Node,
}

impl Platform {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Browser => "browser",
            Self::Node => "node",
        }
    }
}

/// Bundle options.
#[derive(Debug, Clone)]
pub struct BundleOptions {
    pub format: BundleFormat,
    pub platform: Platform,
    /// Preserve `Function.prototype.name` through minification/renaming.
    pub keep_names: bool,
}

impl Default for BundleOptions {
    fn default() -> Self {
        Self {
            format: BundleFormat::Iife,
            platform: Platform::Browser,
            keep_names: true,
        }
    }
}

/// What to bundle.
#[derive(Debug, Clone)]
pub struct BundleRequest {
    /// Source of the virtual entry module.
    pub contents: String,
    /// Directory relative imports of the entry resolve against.
    pub resolve_dir: PathBuf,
    pub options: BundleOptions,
}

impl BundleRequest {
    /// A browser IIFE bundle of `contents`, resolved from `resolve_dir`.
    pub fn iife(contents: impl Into<String>, resolve_dir: &Path) -> Self {
        Self {
            contents: contents.into(),
            resolve_dir: resolve_dir.to_path_buf(),
            options: BundleOptions::default(),
        }
    }
}

/// A problem reported by the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub code: &'static str,
    pub message: String,
    pub path: Option<String>,
}

impl Diagnostic {
    pub fn new(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            path: None,
        }
    }

    pub fn at(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(path) = &self.path {
            write!(f, "{}: {} ({})", self.code, self.message, path)
        } else {
            write!(f, "{}: {}", self.code, self.message)
        }
    }
}

/// Bundle result.
#[derive(Debug, Default)]
pub struct BundleOutput {
    /// Bundled code. Meaningless when `diagnostics` is non-empty.
    pub code: String,
    /// Source modules that went into the bundle.
    pub modules: Vec<String>,
    pub diagnostics: Vec<Diagnostic>,
}

impl BundleOutput {
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

/// Something that turns an entry module into a single bundle.
///
/// Engines may call [`PluginContainer::resolve_id`] from several threads at
/// once.
pub trait BundleEngine {
    /// Engine name for logs.
    fn name(&self) -> &str;

    /// Bundle `request`, consulting `plugins` for every import edge.
    ///
    /// Problems with the bundle itself come back as diagnostics; `Err` is
    /// reserved for failures of the engine's own machinery.
    fn bundle(&self, request: &BundleRequest, plugins: &PluginContainer) -> Result<BundleOutput>;
}
