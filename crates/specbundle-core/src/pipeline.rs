//! The bundle pipeline.
//!
//! compile → discover specs → synthesize entry → bundle → write → patch.
//! Each stage gates the next and the first failure aborts the run; nothing
//! is written unless bundling succeeded.

use crate::bundler::{BundleEngine, BundleRequest, PluginContainer, ResolverPlugin};
use crate::compiler::CompilerInvoker;
use crate::discovery::{discover_specs, SpecQuery};
use crate::entry::EntryModule;
use crate::error::{Error, Result};
use crate::patch::{LiteralPatch, ROOT_SCOPE_PATCH};
use crate::rules::RuleChain;
use crate::SourceTreeLayout;
use serde::Serialize;
use specbundle_util::fs::atomic_write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

/// Summary of a successful run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildReport {
    pub out_file: PathBuf,
    pub spec_count: usize,
    pub module_count: usize,
    /// Occurrences rewritten by the post-bundle patch.
    pub replacements: usize,
}

/// One configured run of the pipeline.
pub struct Pipeline<'a, E> {
    layout: &'a SourceTreeLayout,
    compiler: CompilerInvoker,
    engine: E,
    query: SpecQuery,
    rules: Arc<RuleChain>,
    patch: LiteralPatch,
}

impl<'a, E: BundleEngine> Pipeline<'a, E> {
    /// Pipeline with the legacy spec carve-outs, rule chain and patch.
    pub fn new(layout: &'a SourceTreeLayout, compiler: CompilerInvoker, engine: E) -> Result<Self> {
        Ok(Self {
            layout,
            compiler,
            engine,
            query: SpecQuery::legacy()?,
            rules: Arc::new(RuleChain::for_layout(layout)?),
            patch: ROOT_SCOPE_PATCH,
        })
    }

    pub fn with_query(mut self, query: SpecQuery) -> Self {
        self.query = query;
        self
    }

    pub fn with_rules(mut self, rules: RuleChain) -> Self {
        self.rules = Arc::new(rules);
        self
    }

    pub fn with_patch(mut self, patch: LiteralPatch) -> Self {
        self.patch = patch;
        self
    }

    pub fn run(&self) -> Result<BuildReport> {
        let layout = self.layout;

        let start = Instant::now();
        self.compiler.run()?;
        tracing::info!(elapsed_ms = elapsed_ms(start), "compiled project");

        let specs = discover_specs(&layout.legacy_output_dir, &self.query);
        tracing::info!(count = specs.len(), "discovered spec files");

        let entry = EntryModule::from_specs(&layout.test_init_module, &layout.project_dir, &specs);
        let request = BundleRequest::iife(entry.render(), &layout.project_dir);

        let plugins = PluginContainer::new(layout.project_dir.clone())
            .with(Box::new(ResolverPlugin::new(Arc::clone(&self.rules))));

        let start = Instant::now();
        let output = self.engine.bundle(&request, &plugins)?;
        if !output.is_ok() {
            for diagnostic in &output.diagnostics {
                tracing::error!(code = diagnostic.code, "{diagnostic}");
            }
            return Err(Error::BundleFailed {
                diagnostics: output.diagnostics.iter().map(ToString::to_string).collect(),
            });
        }
        tracing::info!(
            engine = self.engine.name(),
            modules = output.modules.len(),
            bytes = output.code.len(),
            elapsed_ms = elapsed_ms(start),
            "bundled"
        );

        atomic_write(&layout.out_file, output.code.as_bytes()).map_err(|source| Error::Write {
            path: layout.out_file.clone(),
            source,
        })?;

        let replacements = self.patch.apply_to_file(&layout.out_file)?;
        tracing::info!(out_file = %layout.out_file.display(), replacements, "wrote bundle");

        Ok(BuildReport {
            out_file: layout.out_file.clone(),
            spec_count: entry.spec_count(),
            module_count: output.modules.len(),
            replacements,
        })
    }
}

fn elapsed_ms(start: Instant) -> u64 {
    u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX)
}
