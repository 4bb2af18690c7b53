//! pr-merge-commit command - Print the merge commit of a pull request
//!
//! Always answered by the remote; the local repository has no notion of
//! pull requests.

use anyhow::Result;

use super::{block_on, open_remote, Context};
use crate::core::resolve;

/// Print the merge commit id computed for pull request `number`.
pub fn pr_merge_commit(ctx: &Context, number: u64) -> Result<()> {
    let config = ctx.config()?;
    let remote = open_remote(ctx, &config)?;

    let sha = block_on(resolve::pr_merge_commit(remote.as_ref(), number))??;
    println!("{}", sha);
    Ok(())
}
