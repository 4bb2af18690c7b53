//! reset command - Reset the working tree to a commit
//!
//! # Local
//!
//! 1. A hard reset of HEAD, index and working tree.
//! 2. If the commit is missing locally (shallow clone), fetch it from the
//!    remote by git protocol and check it out on a detached HEAD.
//!
//! # Remote
//!
//! When neither local step works:
//! 1. Files tracked at the cleanup revision (default `HEAD`) are removed,
//!    so files deleted between that revision and the target do not linger.
//!    Removal failures are ignored.
//! 2. Every file of the target commit is downloaded and written below the
//!    repository root.
//!
//! HEAD and the index are not moved on the remote path.

use std::fs;
use std::path::Path;

use anyhow::Result;

use super::{block_on, open_remote, try_local, Context};
use crate::core::materialize::materialize_tree;
use crate::git::Git;

/// Reset the working tree to `commit`.
pub fn reset(ctx: &Context, commit: &str) -> Result<()> {
    if let Some(sha) = try_local(ctx, "reset", |git| git.reset_hard(commit))? {
        tracing::info!(%sha, "reset local repository");
        return Ok(());
    }

    let config = ctx.config()?;
    let remote_name = ctx.remote_name(&config);
    if let Some(sha) = try_local(ctx, "fetch-checkout", |git| {
        git.fetch_and_checkout(remote_name, commit)
    })? {
        tracing::info!(%sha, remote = remote_name, "fetched and checked out");
        return Ok(());
    }

    let root = match ctx.repo_root()? {
        Some(root) => root,
        None => ctx.work_dir()?,
    };

    // Resolve the remote before touching the working tree.
    let remote = open_remote(ctx, &config)?;

    let removed = remove_tracked_files(&root, config.cleanup_rev());
    tracing::debug!(removed, rev = config.cleanup_rev(), "removed tracked files");

    let summary = block_on(materialize_tree(remote.as_ref(), commit, &root))??;
    tracing::info!(
        commit,
        written = summary.written,
        skipped = summary.skipped,
        "reset working tree from remote"
    );
    Ok(())
}

/// Remove the files tracked at `rev` below `root`, returning how many went.
fn remove_tracked_files(root: &Path, rev: &str) -> usize {
    let files = match Git::open(root).and_then(|git| git.tracked_files(rev)) {
        Ok(files) => files,
        Err(err) => {
            tracing::warn!(rev, error = %err, "cannot list tracked files, skipping cleanup");
            return 0;
        }
    };

    let mut removed = 0;
    for file in files {
        let path = root.join(&file);
        match fs::remove_file(&path) {
            Ok(()) => removed += 1,
            Err(err) => tracing::debug!(path = %path.display(), error = %err, "not removed"),
        }
    }
    removed
}
