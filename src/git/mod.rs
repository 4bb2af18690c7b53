//! git
//!
//! Single interface for local repository access.
//!
//! # Architecture
//!
//! This module is the **only doorway** to the local repository. No other
//! module imports `git2`. It answers commands from the object database on
//! disk; when it cannot, the command layer falls back to the remote API.
//!
//! # Responsibilities
//!
//! - Repository discovery and opening
//! - Revision resolution, author dates and history
//! - Tree diff line counts and file reads at a revision
//! - Hard reset and tracked-file listing
//! - Remote URL lookup, with a plain `.git/config` scan as backup
//!
//! # Example
//!
//! ```ignore
//! use gitshim::git::Git;
//! use std::path::Path;
//!
//! let git = Git::open(Path::new("."))?;
//! for sha in git.log("HEAD", 10)? {
//!     println!("{}", sha);
//! }
//! ```

mod config_file;
mod interface;

pub use config_file::{find_git_config, parse_remote_url, remote_url_from_config};
pub use interface::{Git, GitError};
