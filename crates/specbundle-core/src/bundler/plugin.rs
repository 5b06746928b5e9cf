//! Plugin contract between the pipeline and a bundle engine.
//!
//! A Rollup-style subset: plugins may observe the start of a build and may
//! claim import specifiers in `resolve_id`. Engines call the hooks through a
//! [`PluginContainer`], possibly from many threads at once, so plugins only
//! get `&self`.
//!
//! ## Example
//!
//! ```ignore
//! use specbundle_core::bundler::{Plugin, PluginContext, HookResult, ResolveIdResult};
//!
//! struct Stub;
//!
//! impl Plugin for Stub {
//!     fn name(&self) -> &str { "stub" }
//!
//!     fn resolve_id(&self, specifier: &str, _importer: Option<&str>, _ctx: &PluginContext)
//!         -> HookResult<Option<ResolveIdResult>> {
//!         if specifier == "xhr2" {
//!             return Ok(Some(ResolveIdResult::resolved("/out/empty.js")));
//!         }
//!         Ok(None)
//!     }
//! }
//! ```

#![allow(clippy::unused_self)]

use crate::rules::{ResolutionOutcome, RuleChain};
use std::path::PathBuf;
use std::sync::Arc;

/// Result type for plugin hooks.
pub type HookResult<T> = Result<T, PluginError>;

/// Error from a plugin.
#[derive(Debug)]
pub struct PluginError {
    /// Plugin name that caused the error.
    pub plugin: String,
    /// Hook that failed.
    pub hook: &'static str,
    /// Error message.
    pub message: String,
}

impl std::fmt::Display for PluginError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}: {}", self.plugin, self.hook, self.message)
    }
}

impl std::error::Error for PluginError {}

/// Context passed to plugin hooks.
#[derive(Debug, Default)]
pub struct PluginContext {
    /// Directory the entry module resolves from.
    pub cwd: PathBuf,
}

impl PluginContext {
    /// Create a new plugin context.
    pub fn new(cwd: PathBuf) -> Self {
        Self { cwd }
    }
}

/// Result of resolve hook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolveIdResult {
    /// Resolved module ID (an absolute file path).
    pub id: String,
}

impl ResolveIdResult {
    /// Create a resolved module result.
    pub fn resolved(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

/// A bundler plugin.
///
/// All hooks have default implementations that do nothing.
pub trait Plugin: Send + Sync {
    /// Plugin name for debugging and error messages.
    fn name(&self) -> &str;

    /// Called once before the engine starts traversing the graph.
    fn build_start(&self, _ctx: &PluginContext) -> HookResult<()> {
        Ok(())
    }

    /// Resolve a module specifier to an ID.
    ///
    /// Return `Some(result)` to handle this resolution, or `None` to let
    /// the next plugin or default resolver handle it.
    fn resolve_id(
        &self,
        _specifier: &str,
        _importer: Option<&str>,
        _ctx: &PluginContext,
    ) -> HookResult<Option<ResolveIdResult>> {
        Ok(None)
    }
}

/// Plugins in registration order.
pub struct PluginContainer {
    plugins: Vec<Box<dyn Plugin>>,
    ctx: PluginContext,
}

impl PluginContainer {
    /// Create a new plugin container.
    pub fn new(cwd: PathBuf) -> Self {
        Self {
            plugins: Vec::new(),
            ctx: PluginContext::new(cwd),
        }
    }

    /// Add a plugin after those already registered.
    pub fn add(&mut self, plugin: Box<dyn Plugin>) {
        self.plugins.push(plugin);
    }

    /// Builder form of [`PluginContainer::add`].
    pub fn with(mut self, plugin: Box<dyn Plugin>) -> Self {
        self.add(plugin);
        self
    }

    /// Get the context (read-only).
    pub fn context(&self) -> &PluginContext {
        &self.ctx
    }

    /// Names of the registered plugins, in order.
    pub fn names(&self) -> Vec<&str> {
        self.plugins.iter().map(|p| p.name()).collect()
    }

    /// Call build_start on all plugins.
    pub fn build_start(&self) -> HookResult<()> {
        for plugin in &self.plugins {
            plugin.build_start(&self.ctx)?;
        }
        Ok(())
    }

    /// Try to resolve a module ID through plugins.
    /// Returns None if no plugin handled the resolution.
    pub fn resolve_id(
        &self,
        specifier: &str,
        importer: Option<&str>,
    ) -> HookResult<Option<ResolveIdResult>> {
        for plugin in &self.plugins {
            if let Some(result) = plugin.resolve_id(specifier, importer, &self.ctx)? {
                return Ok(Some(result));
            }
        }
        Ok(None)
    }
}

/// Adapts a [`RuleChain`] to the plugin contract.
pub struct ResolverPlugin {
    chain: Arc<RuleChain>,
}

impl ResolverPlugin {
    /// Name the plugin registers under.
    pub const NAME: &'static str = "ng-resolve";

    pub fn new(chain: Arc<RuleChain>) -> Self {
        Self { chain }
    }
}

impl Plugin for ResolverPlugin {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn build_start(&self, _ctx: &PluginContext) -> HookResult<()> {
        tracing::debug!(rules = self.chain.rules().len(), "resolver plugin ready");
        Ok(())
    }

    fn resolve_id(
        &self,
        specifier: &str,
        _importer: Option<&str>,
        _ctx: &PluginContext,
    ) -> HookResult<Option<ResolveIdResult>> {
        match self.chain.resolve(specifier) {
            ResolutionOutcome::Resolved(path) => Ok(Some(ResolveIdResult::resolved(
                path.to_string_lossy().into_owned(),
            ))),
            ResolutionOutcome::Unhandled => Ok(None),
        }
    }
}
