//! External compiler invocation.
//!
//! Runs the TypeScript compiler over the legacy project configuration with
//! inherited stdio. Any spawn error or nonzero exit is fatal.

use crate::error::{Error, Result};
use crate::SourceTreeLayout;
use std::ffi::OsString;
use std::path::PathBuf;
use std::process::{Command, Stdio};

/// A compiler command line.
#[derive(Debug, Clone)]
pub struct CompilerInvoker {
    program: PathBuf,
    args: Vec<OsString>,
    cwd: Option<PathBuf>,
    stdout_to_stderr: bool,
}

impl CompilerInvoker {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
            stdout_to_stderr: false,
        }
    }

    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    /// Send the compiler's stdout to our stderr, keeping stdout free for reports.
    pub fn stdout_to_stderr(mut self, yes: bool) -> Self {
        self.stdout_to_stderr = yes;
        self
    }

    /// `node <tsc> --project <legacy tsconfig>`, run from the project root.
    ///
    /// `node` is looked up on `PATH`; if it is missing the spawn fails later
    /// with a descriptive error.
    #[must_use]
    pub fn tsc(layout: &SourceTreeLayout) -> Self {
        let node = which::which("node").unwrap_or_else(|_| PathBuf::from("node"));
        Self::new(node)
            .arg(&layout.tsc_bin)
            .arg("--project")
            .arg(&layout.legacy_tsconfig)
            .current_dir(&layout.project_dir)
    }

    /// Human-readable command line for logs.
    #[must_use]
    pub fn display(&self) -> String {
        std::iter::once(self.program.to_string_lossy().into_owned())
            .chain(self.args.iter().map(|a| a.to_string_lossy().into_owned()))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Run to completion. Output goes straight to this process's streams.
    pub fn run(&self) -> Result<()> {
        let mut cmd = Command::new(&self.program);
        let stdout = if self.stdout_to_stderr {
            Stdio::from(std::io::stderr())
        } else {
            Stdio::inherit()
        };
        cmd.args(&self.args)
            .stdin(Stdio::inherit())
            .stdout(stdout)
            .stderr(Stdio::inherit());
        if let Some(cwd) = &self.cwd {
            cmd.current_dir(cwd);
        }

        tracing::info!(command = %self.display(), "compiling project");
        let status = cmd.status().map_err(|source| Error::CompilerSpawn {
            program: self.program.display().to_string(),
            source,
        })?;

        if !status.success() {
            return Err(Error::CompilerFailed { status });
        }
        Ok(())
    }
}
