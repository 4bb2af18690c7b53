//! diff-numstat command - Per-file line counts between two commits

use anyhow::Result;

use super::{block_on, open_remote, try_local, Context};
use crate::core::numstat;

/// Print `additions<TAB>deletions<TAB>path` for every changed file.
pub fn diff_numstat(ctx: &Context, base: &str, commit: &str) -> Result<()> {
    let config = ctx.config()?;

    let stats = match try_local(ctx, "diff-numstat", |git| git.diff_numstat(base, commit))? {
        Some(stats) => stats,
        None => {
            let remote = open_remote(ctx, &config)?;
            block_on(numstat::diff_numstat(
                remote.as_ref(),
                base,
                commit,
                config.max_depth(),
            ))??
        }
    };

    print!("{}", stats);
    Ok(())
}
