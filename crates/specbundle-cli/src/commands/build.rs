//! The single `specbundle` run.

use miette::{IntoDiagnostic, Result};
use serde::Serialize;
use specbundle_core::bundler::EsbuildEngine;
use specbundle_core::compiler::CompilerInvoker;
use specbundle_core::{paths, BuildReport, Error, Pipeline};
use std::path::PathBuf;
use std::time::Instant;

/// Build command action.
#[derive(Debug, Clone)]
pub struct BuildAction {
    /// Directory project discovery starts from.
    pub cwd: PathBuf,
    /// Explicit project root.
    pub root: Option<PathBuf>,
    /// Print a JSON report to stdout.
    pub json: bool,
}

/// JSON report, one line on stdout.
#[derive(Serialize)]
struct BuildResultJson {
    ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    out_file: Option<String>,
    spec_count: usize,
    module_count: usize,
    replacements: usize,
    duration_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<BuildErrorJson>,
}

#[derive(Serialize)]
struct BuildErrorJson {
    code: &'static str,
    message: String,
}

/// Run the pipeline once.
pub fn run(action: &BuildAction) -> Result<()> {
    let start = Instant::now();
    let result = build(action);

    if action.json {
        let duration_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
        let json = match &result {
            Ok(report) => BuildResultJson {
                ok: true,
                out_file: Some(report.out_file.display().to_string()),
                spec_count: report.spec_count,
                module_count: report.module_count,
                replacements: report.replacements,
                duration_ms,
                error: None,
            },
            Err(err) => BuildResultJson {
                ok: false,
                out_file: None,
                spec_count: 0,
                module_count: 0,
                replacements: 0,
                duration_ms,
                error: Some(BuildErrorJson {
                    code: err.code(),
                    message: err.to_string(),
                }),
            },
        };
        println!("{}", serde_json::to_string(&json).into_diagnostic()?);
    }

    let report = result.into_diagnostic()?;
    if !action.json {
        tracing::info!(
            specs = report.spec_count,
            modules = report.module_count,
            "built {}",
            report.out_file.display()
        );
    }
    Ok(())
}

fn build(action: &BuildAction) -> Result<BuildReport, Error> {
    let layout = paths::resolve_layout(action.root.as_deref(), &action.cwd)?;
    tracing::debug!(
        layout = %serde_json::to_string(&layout).unwrap_or_default(),
        "resolved layout"
    );

    let pipeline = Pipeline::new(
        &layout,
        CompilerInvoker::tsc(&layout).stdout_to_stderr(action.json),
        EsbuildEngine::for_layout(&layout),
    )?;
    pipeline.run()
}
