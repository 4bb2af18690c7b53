//! create-reference command - Create a branch on the remote

use anyhow::Result;

use super::{block_on, open_remote, Context};
use crate::core::resolve;

/// Create `refs/heads/<branch>` at `commit` and print `<ref> <sha>`.
pub fn create_reference(ctx: &Context, branch: &str, commit: &str) -> Result<()> {
    let config = ctx.config()?;
    let remote = open_remote(ctx, &config)?;

    let reference = block_on(resolve::create_reference(remote.as_ref(), branch, commit))??;
    println!("{}", reference);
    Ok(())
}
