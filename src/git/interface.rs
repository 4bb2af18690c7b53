//! git::interface
//!
//! Git interface implementation using git2.
//!
//! This module is the local fast path. Every command first tries to answer
//! from the repository on disk through this interface and only falls back
//! to the remote API when it fails.
//!
//! # Error Handling
//!
//! Git errors are categorized into typed variants:
//! - [`GitError::NotARepo`]: Not inside a Git repository
//! - [`GitError::RevisionNotFound`]: Revision does not resolve to a commit
//! - [`GitError::PathNotFound`]: Path absent from the commit's tree
//! - [`GitError::ObjectNotFound`]: Object missing (shallow or partial clone)
//!
//! Any of these triggers the remote fallback in the command layer.
//!
//! # Example
//!
//! ```ignore
//! use gitshim::git::Git;
//! use std::path::Path;
//!
//! let git = Git::open(Path::new("."))?;
//! let head = git.rev_parse("HEAD")?;
//! println!("HEAD is at {}", head.short(7));
//! ```

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use chrono::{DateTime, FixedOffset, TimeZone};
use thiserror::Error;

use crate::core::numstat::Numstat;
use crate::core::types::{FileChange, Sha};

/// Errors from Git operations.
#[derive(Debug, Error)]
pub enum GitError {
    /// Not inside a Git repository.
    #[error("not a git repository: {path}")]
    NotARepo {
        /// The path that was searched
        path: PathBuf,
    },

    /// Repository is bare (no working directory).
    #[error("bare repository not supported")]
    BareRepo,

    /// Revision does not resolve to a commit.
    #[error("revision not found: {rev}")]
    RevisionNotFound {
        /// The revision expression
        rev: String,
    },

    /// Path does not exist in the commit's tree.
    #[error("path '{path}' does not exist in {rev}")]
    PathNotFound {
        /// The requested path
        path: String,
        /// The revision searched
        rev: String,
    },

    /// Path names a directory or submodule, not a file.
    #[error("path '{path}' is not a file")]
    NotAFile {
        /// The requested path
        path: String,
    },

    /// Object not found in repository.
    #[error("object not found: {oid}")]
    ObjectNotFound {
        /// The object that was not found
        oid: String,
    },

    /// Author timestamp out of range.
    #[error("invalid author date on {rev}")]
    InvalidDate {
        /// The commit
        rev: String,
    },

    /// Internal git2 error.
    #[error("git error: {message}")]
    Internal {
        /// The error message
        message: String,
    },
}

impl GitError {
    /// Create a GitError from a git2::Error with richer context.
    fn from_git2(err: git2::Error, context: &str) -> Self {
        match err.code() {
            git2::ErrorCode::NotFound | git2::ErrorCode::Ambiguous => {
                GitError::RevisionNotFound {
                    rev: context.to_string(),
                }
            }
            git2::ErrorCode::InvalidSpec => GitError::RevisionNotFound {
                rev: context.to_string(),
            },
            _ if err.class() == git2::ErrorClass::Odb => GitError::ObjectNotFound {
                oid: context.to_string(),
            },
            _ => GitError::Internal {
                message: format!("{}: {}", context, err.message()),
            },
        }
    }
}

impl From<git2::Error> for GitError {
    fn from(err: git2::Error) -> Self {
        GitError::Internal {
            message: err.message().to_string(),
        }
    }
}

/// The Git interface.
///
/// The only module that imports `git2`.
pub struct Git {
    /// The underlying git2 repository
    repo: git2::Repository,
}

impl std::fmt::Debug for Git {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Git")
            .field("path", &self.repo.path())
            .finish()
    }
}

impl Git {
    // =========================================================================
    // Repository Opening and Info
    // =========================================================================

    /// Open a repository at the given path.
    ///
    /// Uses `git2::Repository::discover` to find the repository root,
    /// so `path` can be any directory within the repository.
    ///
    /// # Errors
    ///
    /// - [`GitError::NotARepo`] if no repository is found
    pub fn open(path: &Path) -> Result<Self, GitError> {
        let repo = git2::Repository::discover(path).map_err(|_| GitError::NotARepo {
            path: path.to_path_buf(),
        })?;

        Ok(Self { repo })
    }

    /// Get the working directory.
    ///
    /// # Errors
    ///
    /// - [`GitError::BareRepo`] if the repository has no working directory
    pub fn workdir(&self) -> Result<&Path, GitError> {
        self.repo.workdir().ok_or(GitError::BareRepo)
    }

    /// Get direct access to the .git directory path.
    pub fn git_dir(&self) -> &Path {
        self.repo.path()
    }

    /// Get the URL for a remote.
    ///
    /// Returns `None` if the remote doesn't exist.
    pub fn remote_url(&self, name: &str) -> Result<Option<String>, GitError> {
        match self.repo.find_remote(name) {
            Ok(remote) => Ok(remote.url().map(String::from)),
            Err(e) if e.code() == git2::ErrorCode::NotFound => Ok(None),
            Err(e) => Err(GitError::Internal {
                message: e.message().to_string(),
            }),
        }
    }

    // =========================================================================
    // Revision Queries
    // =========================================================================

    fn find_commit(&self, rev: &str) -> Result<git2::Commit<'_>, GitError> {
        let object = self
            .repo
            .revparse_single(rev)
            .map_err(|e| GitError::from_git2(e, rev))?;
        object
            .peel_to_commit()
            .map_err(|e| GitError::from_git2(e, rev))
    }

    /// Resolve a revision to a full commit id.
    pub fn rev_parse(&self, rev: &str) -> Result<Sha, GitError> {
        Ok(Sha::new(self.find_commit(rev)?.id().to_string()))
    }

    /// Get the author date of a commit, in the author's timezone.
    pub fn author_date(&self, rev: &str) -> Result<DateTime<FixedOffset>, GitError> {
        let commit = self.find_commit(rev)?;
        let when = commit.author().when();
        signature_time(when.seconds(), when.offset_minutes()).ok_or_else(|| {
            GitError::InvalidDate {
                rev: rev.to_string(),
            }
        })
    }

    /// List at most `limit` commits starting at `rev`, newest first.
    ///
    /// Matches `git log -<limit>`: `rev` itself counts toward the limit.
    pub fn log(&self, rev: &str, limit: usize) -> Result<Vec<Sha>, GitError> {
        let start = self.find_commit(rev)?.id();

        let mut walk = self.repo.revwalk()?;
        walk.set_sorting(git2::Sort::TIME)?;
        walk.push(start)?;

        let mut out = Vec::new();
        for oid in walk.take(limit) {
            let oid = oid.map_err(|e| GitError::from_git2(e, rev))?;
            out.push(Sha::new(oid.to_string()));
        }
        Ok(out)
    }

    /// Per-file line counts of the tree diff from `base` to `commit`.
    ///
    /// Binary files are reported as `-`. Renames are not detected, so a
    /// renamed file shows up as a deletion and an addition.
    pub fn diff_numstat(&self, base: &str, commit: &str) -> Result<Numstat, GitError> {
        let old_tree = self.find_commit(base)?.tree()?;
        let new_tree = self.find_commit(commit)?.tree()?;

        let diff = self
            .repo
            .diff_tree_to_tree(Some(&old_tree), Some(&new_tree), None)
            .map_err(|e| GitError::from_git2(e, commit))?;

        let mut numstat = Numstat::new();
        for (idx, delta) in diff.deltas().enumerate() {
            let path = delta_path(&delta);
            // No patch is built for binary content.
            let patch = match git2::Patch::from_diff(&diff, idx)? {
                Some(patch) if !is_binary(&patch.delta()) => patch,
                Some(_) => {
                    numstat.record_binary(path);
                    continue;
                }
                None if delta.status() != git2::Delta::Unmodified => {
                    numstat.record_binary(path);
                    continue;
                }
                None => continue,
            };
            let (_, additions, deletions) = patch.line_stats()?;
            numstat.record(&FileChange::new(path, additions as u64, deletions as u64));
        }
        Ok(numstat)
    }

    /// Read the content of the file at `path` in `rev`.
    pub fn read_file_at(&self, rev: &str, path: &str) -> Result<Vec<u8>, GitError> {
        let tree = self.find_commit(rev)?.tree()?;
        let entry = tree
            .get_path(Path::new(path))
            .map_err(|_| GitError::PathNotFound {
                path: path.to_string(),
                rev: rev.to_string(),
            })?;

        if entry.kind() != Some(git2::ObjectType::Blob) {
            return Err(GitError::NotAFile {
                path: path.to_string(),
            });
        }

        let blob = self
            .repo
            .find_blob(entry.id())
            .map_err(|e| GitError::from_git2(e, &entry.id().to_string()))?;
        Ok(blob.content().to_vec())
    }

    /// List the file paths tracked at `rev`, sorted.
    ///
    /// Submodules and directories are not listed.
    pub fn tracked_files(&self, rev: &str) -> Result<Vec<PathBuf>, GitError> {
        let tree = self.find_commit(rev)?.tree()?;

        let mut files = BTreeSet::new();
        tree.walk(git2::TreeWalkMode::PreOrder, |dir, entry| {
            if entry.kind() == Some(git2::ObjectType::Blob) {
                if let Some(name) = entry.name() {
                    files.insert(PathBuf::from(format!("{}{}", dir, name)));
                }
            }
            git2::TreeWalkResult::Ok
        })?;

        Ok(files.into_iter().collect())
    }

    // =========================================================================
    // Working Tree
    // =========================================================================

    /// Fetch `rev` from `remote`, then check it out on a detached HEAD.
    ///
    /// A revision the remote will not serve by name is looked for again
    /// after a fetch of the remote's configured refspecs.
    pub fn fetch_and_checkout(&self, remote: &str, rev: &str) -> Result<Sha, GitError> {
        self.workdir()?;
        let mut origin = self.repo.find_remote(remote).map_err(|e| GitError::Internal {
            message: format!("remote '{}': {}", remote, e.message()),
        })?;

        if let Err(err) = origin.fetch(&[rev], None, None) {
            tracing::debug!(remote, rev, error = err.message(), "fetch by revision failed");
        }

        let commit = match self.find_commit(rev) {
            Ok(commit) => commit,
            Err(_) => {
                origin
                    .fetch(&[] as &[&str], None, None)
                    .map_err(|e| GitError::from_git2(e, rev))?;
                self.find_commit(rev)?
            }
        };

        let mut checkout = git2::build::CheckoutBuilder::new();
        checkout.force();
        self.repo
            .checkout_tree(commit.as_object(), Some(&mut checkout))
            .map_err(|e| GitError::from_git2(e, rev))?;
        self.repo
            .set_head_detached(commit.id())
            .map_err(|e| GitError::from_git2(e, rev))?;
        Ok(Sha::new(commit.id().to_string()))
    }

    /// Hard reset HEAD, index and working tree to `rev`.
    pub fn reset_hard(&self, rev: &str) -> Result<Sha, GitError> {
        let commit = self.find_commit(rev)?;
        self.workdir()?;
        self.repo
            .reset(commit.as_object(), git2::ResetType::Hard, None)
            .map_err(|e| GitError::from_git2(e, rev))?;
        Ok(Sha::new(commit.id().to_string()))
    }
}

fn delta_path(delta: &git2::DiffDelta<'_>) -> String {
    delta
        .new_file()
        .path()
        .or_else(|| delta.old_file().path())
        .map(|p| p.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn is_binary(delta: &git2::DiffDelta<'_>) -> bool {
    delta.flags().is_binary() || delta.new_file().is_binary() || delta.old_file().is_binary()
}

/// Convert a git signature time to a timezone-aware date.
fn signature_time(seconds: i64, offset_minutes: i32) -> Option<DateTime<FixedOffset>> {
    let offset = FixedOffset::east_opt(offset_minutes.checked_mul(60)?)?;
    offset.timestamp_opt(seconds, 0).single()
}
