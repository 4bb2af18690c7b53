//! cli
//!
//! Command-line interface layer for gitshim.
//!
//! # Responsibilities
//!
//! - Parse command-line arguments and global flags
//! - Try the local repository first, fall back to the remote API
//! - Print results in git's plumbing formats
//!
//! # Architecture
//!
//! The CLI layer is thin. It parses arguments via clap and dispatches to a
//! handler per command. Handlers call into [`crate::git`] for the local fast
//! path and into [`crate::core`] for the remote algorithms.

pub mod args;
pub mod commands;

pub use args::{Cli, Command};

use anyhow::Result;

/// Run the CLI application.
///
/// This is the main entry point called from `main.rs` after logging is set up.
pub fn run(cli: Cli) -> Result<()> {
    let ctx = commands::Context {
        cwd: cli.cwd.clone(),
        debug: cli.debug,
        remote_only: cli.remote_only,
        remote: cli.remote.clone(),
    };

    commands::dispatch(cli.command, &ctx)
}
