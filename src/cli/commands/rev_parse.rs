//! rev-parse command - Resolve a revision to a full commit id

use anyhow::Result;

use super::{block_on, open_remote, try_local, Context};
use crate::core::resolve;

/// Print the full id of `rev`.
pub fn rev_parse(ctx: &Context, rev: &str) -> Result<()> {
    let config = ctx.config()?;

    let sha = match try_local(ctx, "rev-parse", |git| git.rev_parse(rev))? {
        Some(sha) => sha,
        None => {
            let remote = open_remote(ctx, &config)?;
            block_on(resolve::rev_parse(remote.as_ref(), rev))??
        }
    };

    println!("{}", sha);
    Ok(())
}
