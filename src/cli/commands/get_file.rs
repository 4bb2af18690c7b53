//! get-file command - Print a file's content at a commit
//!
//! Content is written unmodified, so binary files survive a redirect.

use std::io::Write;

use anyhow::{Context as _, Result};

use super::{block_on, open_remote, try_local, Context};
use crate::core::materialize::fetch_file;

/// Write the bytes of `path` at `commit` to stdout.
pub fn get_file(ctx: &Context, commit: &str, path: &str) -> Result<()> {
    let config = ctx.config()?;

    let bytes = match try_local(ctx, "get-file", |git| git.read_file_at(commit, path))? {
        Some(bytes) => bytes,
        None => {
            let remote = open_remote(ctx, &config)?;
            block_on(fetch_file(remote.as_ref(), commit, path))??
        }
    };

    let mut stdout = std::io::stdout().lock();
    stdout
        .write_all(&bytes)
        .and_then(|_| stdout.flush())
        .context("Failed to write file content")
}
