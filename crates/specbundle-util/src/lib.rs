#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

//! Shared utilities for specbundle.
//!
//! Pure helpers with no logging dependencies. Logging is handled by the CLI
//! crate to keep this library lightweight.

pub mod fs;
pub mod path;
