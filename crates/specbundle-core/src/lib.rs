#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::return_self_not_must_use)]

//! Builds the legacy browser test bundle.
//!
//! The pipeline compiles the source tree, discovers the compiled spec files,
//! synthesizes a single entry module importing all of them and bundles it
//! into one IIFE file, redirecting `@angular/*` imports onto the locally
//! built output through a resolver plugin.

pub mod bundler;
pub mod compiler;
pub mod config;
pub mod discovery;
pub mod entry;
pub mod error;
pub mod imports;
pub mod patch;
pub mod paths;
pub mod pipeline;
pub mod probe;
pub mod rules;

pub use config::SourceTreeLayout;
pub use error::{Error, Result};
pub use pipeline::{BuildReport, Pipeline};
pub use rules::{ResolutionOutcome, ResolutionRule, RuleChain};
