//! log command - List a commit and its ancestors
//!
//! Prints one full commit id per line, starting with the commit itself.
//! The listing is bounded by the configured log limit.

use anyhow::Result;

use super::{block_on, open_remote, try_local, Context};
use crate::core::ancestry::AncestryWalker;

/// Print `commit` and up to `log_limit` ancestors.
pub fn log(ctx: &Context, commit: &str) -> Result<()> {
    let config = ctx.config()?;
    let limit = config.log_limit();

    let shas = match try_local(ctx, "log", |git| git.log(commit, limit))? {
        Some(shas) => shas,
        None => {
            let remote = open_remote(ctx, &config)?;
            block_on(async {
                let mut walker = AncestryWalker::new(remote.as_ref());
                walker.log(commit, limit).await
            })??
        }
    };

    for sha in shas {
        println!("{}", sha);
    }
    Ok(())
}
