//! show-date command - Print the author date of a commit

use anyhow::Result;

use super::{block_on, open_remote, try_local, Context, DATE_FORMAT};
use crate::core::resolve;

/// Print the author date as `YYYY-MM-DD HH:MM:SS +ZZZZ`.
pub fn show_date(ctx: &Context, commit: &str) -> Result<()> {
    let config = ctx.config()?;

    let date = match try_local(ctx, "show-date", |git| git.author_date(commit))? {
        Some(date) => date,
        None => {
            let remote = open_remote(ctx, &config)?;
            block_on(resolve::author_date(remote.as_ref(), commit))??
        }
    };

    println!("{}", date.format(DATE_FORMAT));
    Ok(())
}
