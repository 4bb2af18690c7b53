//! cli::args
//!
//! Command-line argument definitions using clap derive.
//!
//! # Global Flags
//!
//! These flags are available on all commands:
//! - `--help` / `-h`: Show help
//! - `--version`: Show version
//! - `--cwd <path>`: Run as if in that directory
//! - `--debug`: Enable debug logging
//! - `--remote-only`: Skip the local repository and use the remote API
//! - `--remote <name>`: Remote whose URL identifies the repository
//!
//! # Legacy Names
//!
//! The binary can be installed under the historical per-command names
//! (`git-log`, `git-reset`, ...). When invoked through such a link, the
//! matching subcommand is inserted before parsing, so `git-log HEAD` is
//! `gitshim log HEAD`.

use clap::{Parser, Subcommand};
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Git plumbing commands that fall back to the GitHub API
#[derive(Parser, Debug)]
#[command(name = "gitshim")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Run as if gitshim was started in this directory
    #[arg(long, global = true)]
    pub cwd: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Skip the local repository and answer from the remote API
    #[arg(long, global = true)]
    pub remote_only: bool,

    /// Remote whose URL identifies the repository (default: configured, then "origin")
    #[arg(long, global = true, value_name = "NAME")]
    pub remote: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Parse command-line arguments, honoring legacy executable names.
    pub fn parse_args() -> Self {
        Self::parse_from(legacy_argv(std::env::args_os()))
    }
}

/// Available commands.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Reset the working tree to a commit
    #[command(
        name = "reset",
        long_about = "Reset the working tree to a commit.\n\n\
            Performs a hard reset in the local repository. If the commit is not \
            available locally, the files tracked at the cleanup revision are removed \
            and the commit's full file set is downloaded from the remote instead.",
        after_help = "\
EXAMPLES:
    gitshim reset 4f9c2e1
    gitshim --remote-only reset main"
    )]
    Reset {
        /// Commit to reset to
        commit: String,
    },

    /// Per-file added and deleted line counts between two commits
    #[command(
        name = "diff-numstat",
        long_about = "Print per-file added and deleted line counts between two commits.\n\n\
            Output lines are `additions<TAB>deletions<TAB>path`, sorted by path. \
            On the remote path the counts are summed over every commit from COMMIT \
            back to and including BASE.",
        after_help = "\
EXAMPLES:
    gitshim diff-numstat origin/main HEAD"
    )]
    DiffNumstat {
        /// Older commit
        base: String,
        /// Newer commit
        commit: String,
    },

    /// Print the content of a file at a commit
    #[command(name = "get-file")]
    GetFile {
        /// Commit to read from
        commit: String,
        /// Repository-relative file path
        path: String,
    },

    /// List a commit and its ancestors, one id per line
    #[command(name = "log")]
    Log {
        /// Commit to start from
        commit: String,
    },

    /// Print the author date of a commit
    #[command(name = "show-date")]
    ShowDate {
        /// Commit to inspect
        commit: String,
    },

    /// Create a branch on the remote pointing at a commit
    #[command(name = "create-reference")]
    CreateReference {
        /// Branch name (without refs/heads/)
        branch: String,
        /// Commit the branch points at
        commit: String,
    },

    /// Print the merge commit computed for a pull request
    #[command(name = "pr-merge-commit")]
    PrMergeCommit {
        /// Pull request number
        number: u64,
    },

    /// Resolve a revision to a full commit id
    #[command(name = "rev-parse")]
    RevParse {
        /// Revision (commit id, abbreviated id, branch)
        rev: String,
    },
}

/// Executable names and the subcommand each one stands for.
pub const LEGACY_NAMES: &[(&str, &str)] = &[
    ("git-reset", "reset"),
    ("git-diff-numstat", "diff-numstat"),
    ("git-get-file", "get-file"),
    ("git-log", "log"),
    ("git-show-date", "show-date"),
    ("git-create-reference", "create-reference"),
    ("git-get-pr-merge-commit", "pr-merge-commit"),
    ("git-rev-parse", "rev-parse"),
];

/// Map a program name to the subcommand it stands for.
pub fn legacy_subcommand(program: &Path) -> Option<&'static str> {
    let stem = program.file_stem()?.to_str()?;
    LEGACY_NAMES
        .iter()
        .find(|(name, _)| *name == stem)
        .map(|(_, sub)| *sub)
}

/// Insert the subcommand implied by the program name, if any.
pub fn legacy_argv<I>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = OsString>,
{
    let mut argv: Vec<OsString> = args.into_iter().collect();
    let implied = argv
        .first()
        .and_then(|program| legacy_subcommand(Path::new(program)));

    if let Some(sub) = implied {
        argv.insert(1, OsString::from(sub));
    }
    argv
}
