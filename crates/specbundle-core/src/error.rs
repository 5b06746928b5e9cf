use crate::bundler::PluginError;
use std::path::PathBuf;
use std::process::ExitStatus;
use thiserror::Error;

/// Core error type for specbundle operations.
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Project root not found from {start}")]
    ProjectNotFound { start: PathBuf },

    #[error("Unable to start compiler `{program}`: {source}")]
    CompilerSpawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Unable to compile tests and library ({status}). See error above.")]
    CompilerFailed { status: ExitStatus },

    #[error("Invalid spec pattern `{pattern}`: {message}")]
    Pattern { pattern: String, message: String },

    #[error("Could not build legacy test bundle ({} diagnostics). See errors above.", .diagnostics.len())]
    BundleFailed { diagnostics: Vec<String> },

    #[error("Failed to write bundle at {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to patch bundle at {path}: {source}")]
    Patch {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Plugin(#[from] PluginError),
}

impl Error {
    /// Stable machine-readable code for reports.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Io(_) => "IO_ERROR",
            Self::ProjectNotFound { .. } => "PROJECT_NOT_FOUND",
            Self::CompilerSpawn { .. } => "COMPILER_SPAWN_FAILED",
            Self::CompilerFailed { .. } => "COMPILER_FAILED",
            Self::Pattern { .. } => "INVALID_PATTERN",
            Self::BundleFailed { .. } => "BUNDLE_FAILED",
            Self::Write { .. } => "BUNDLE_WRITE_FAILED",
            Self::Patch { .. } => "BUNDLE_PATCH_FAILED",
            Self::Plugin(_) => "PLUGIN_ERROR",
        }
    }
}


pub type Result<T, E = Error> = std::result::Result<T, E>;
