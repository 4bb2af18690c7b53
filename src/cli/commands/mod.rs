//! cli::commands
//!
//! Command dispatch and handlers.
//!
//! # Architecture
//!
//! Each command handler:
//! 1. Tries the local repository through [`crate::git::Git`]
//! 2. On any local failure, logs the reason and builds a remote client
//! 3. Runs the matching [`crate::core`] algorithm and prints the result
//!
//! Remote failures are terminal.
//!
//! # Async Commands
//!
//! Remote calls are async. Each handler creates a tokio runtime for the
//! duration of the command and blocks on it.

mod create_reference;
mod diff_numstat;
mod get_file;
mod log_cmd;
mod pr_merge_commit;
mod reset;
mod rev_parse;
mod show_date;

pub use create_reference::create_reference;
pub use diff_numstat::diff_numstat;
pub use get_file::get_file;
pub use log_cmd::log;
pub use pr_merge_commit::pr_merge_commit;
pub use reset::reset;
pub use rev_parse::rev_parse;
pub use show_date::show_date;

use std::future::Future;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context as _, Result};

use crate::cli::args::Command;
use crate::core::config::Config;
use crate::forge::{create_remote, RemoteObjects, RetryPolicy};
use crate::git::{find_git_config, remote_url_from_config, Git, GitError};

/// Layout used by `show-date`, matching git's `%ai`.
pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S %z";

/// Execution context built from global flags.
#[derive(Debug, Clone, Default)]
pub struct Context {
    /// Working directory override
    pub cwd: Option<PathBuf>,
    /// Verbose logging requested
    pub debug: bool,
    /// Skip the local fast path
    pub remote_only: bool,
    /// Remote name override
    pub remote: Option<String>,
}

impl Context {
    /// Directory the command runs in.
    pub fn work_dir(&self) -> Result<PathBuf> {
        match &self.cwd {
            Some(dir) => Ok(dir.clone()),
            None => std::env::current_dir().context("Failed to determine current directory"),
        }
    }

    /// Root of the enclosing repository, found without opening it.
    pub fn repo_root(&self) -> Result<Option<PathBuf>> {
        let work = self.work_dir()?;
        Ok(find_git_config(&work)
            .as_deref()
            .and_then(Path::parent)
            .and_then(Path::parent)
            .map(Path::to_path_buf))
    }

    /// Load configuration for the enclosing repository.
    pub fn config(&self) -> Result<Config> {
        let root = self.repo_root()?;
        Config::load(root.as_deref()).context("Failed to load configuration")
    }

    /// Remote name: flag, then configuration.
    pub fn remote_name<'a>(&'a self, config: &'a Config) -> &'a str {
        self.remote.as_deref().unwrap_or_else(|| config.remote())
    }
}

/// Dispatch a command to its handler.
pub fn dispatch(command: Command, ctx: &Context) -> Result<()> {
    match command {
        Command::Reset { commit } => reset::reset(ctx, &commit),
        Command::DiffNumstat { base, commit } => diff_numstat::diff_numstat(ctx, &base, &commit),
        Command::GetFile { commit, path } => get_file::get_file(ctx, &commit, &path),
        Command::Log { commit } => log_cmd::log(ctx, &commit),
        Command::ShowDate { commit } => show_date::show_date(ctx, &commit),
        Command::CreateReference { branch, commit } => {
            create_reference::create_reference(ctx, &branch, &commit)
        }
        Command::PrMergeCommit { number } => pr_merge_commit::pr_merge_commit(ctx, number),
        Command::RevParse { rev } => rev_parse::rev_parse(ctx, &rev),
    }
}

/// Try the local fast path.
///
/// Returns `None` when `--remote-only` is set or when the repository cannot
/// answer; the reason is logged at debug level.
pub(crate) fn try_local<T>(
    ctx: &Context,
    operation: &str,
    f: impl FnOnce(&Git) -> Result<T, GitError>,
) -> Result<Option<T>> {
    if ctx.remote_only {
        tracing::debug!(operation, "local fast path skipped (--remote-only)");
        return Ok(None);
    }

    let work = ctx.work_dir()?;
    let result = Git::open(&work).and_then(|git| f(&git));
    match result {
        Ok(value) => Ok(Some(value)),
        Err(err) => {
            tracing::debug!(operation, error = %err, "local fast path failed, using remote");
            Ok(None)
        }
    }
}

/// Find the URL of the remote that identifies the repository.
fn remote_url(ctx: &Context, config: &Config) -> Result<String> {
    let work = ctx.work_dir()?;
    let name = ctx.remote_name(config);

    let from_git2 = Git::open(&work)
        .ok()
        .and_then(|git| git.remote_url(name).ok().flatten());

    from_git2
        .or_else(|| remote_url_from_config(&work, name))
        .ok_or_else(|| anyhow!("No URL configured for remote '{}'", name))
}

/// Build the rate-limit-aware remote client for this repository.
pub(crate) fn open_remote(ctx: &Context, config: &Config) -> Result<Box<dyn RemoteObjects>> {
    let url = remote_url(ctx, config)?;
    let token = config.token()?;
    let policy = RetryPolicy::with_margin(config.rate_limit_margin());

    create_remote(&url, &token, config.api_base(), policy)
        .with_context(|| format!("Cannot use remote API for '{}'", url))
}

/// Run a future to completion on a fresh runtime.
pub(crate) fn block_on<F: Future>(future: F) -> Result<F::Output> {
    let rt = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;
    Ok(rt.block_on(future))
}
