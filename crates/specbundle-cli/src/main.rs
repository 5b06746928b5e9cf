#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

mod commands;
mod logging;

use clap::Parser;
use miette::Result;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "specbundle")]
#[command(author, version, about = "Build the legacy browser test bundle", long_about = None)]
struct Cli {
    /// Increase logging verbosity (-v for DEBUG, -vv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Log JSON lines to stderr and print a JSON report to stdout
    #[arg(long)]
    json: bool,

    /// Project root (default: nearest ancestor with package.json or .git)
    #[arg(long, value_name = "PATH")]
    root: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose, cli.json);

    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    commands::build::run(&commands::build::BuildAction {
        cwd,
        root: cli.root,
        json: cli.json,
    })
}
