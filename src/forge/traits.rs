//! forge::traits
//!
//! The remote object client contract.
//!
//! # Design
//!
//! The `RemoteObjects` trait is async because every operation is network I/O.
//! It exposes the handful of object-graph reads the fallback path needs
//! (commit, recursive tree, blob, pull request) plus one write (branch
//! reference creation).
//!
//! Implementations report rate limiting as [`ForgeError::RateLimited`] and
//! never wait on their own. Waiting is layered on top by
//! [`RetryingRemote`](super::RetryingRemote), so every operation shares one
//! retry contract.
//!
//! # Example
//!
//! ```ignore
//! use gitshim::forge::RemoteObjects;
//!
//! async fn parents(remote: &dyn RemoteObjects, sha: &str) -> Result<usize, ForgeError> {
//!     let commit = remote.get_commit(sha).await?;
//!     Ok(commit.parents.len())
//! }
//! ```

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::core::types::{Blob, CommitDetail, Sha, TreeEntry};

/// Errors from remote operations.
#[derive(Debug, Clone, Error)]
pub enum ForgeError {
    /// No credential was supplied.
    #[error("authentication required")]
    AuthRequired,

    /// Authentication failed (invalid token, expired, insufficient permissions).
    #[error("authentication failed: {0}")]
    AuthFailed(String),

    /// The requested object was not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// Rate limit exceeded; the quota resets at `reset_at`.
    #[error("rate limited until {reset_at}")]
    RateLimited {
        /// When the remote will accept requests again
        reset_at: DateTime<Utc>,
    },

    /// API returned an error.
    #[error("API error: {status} - {message}")]
    ApiError {
        /// HTTP status code
        status: u16,
        /// Error message from the API
        message: String,
    },

    /// Network, connection or response decoding failure.
    #[error("network error: {0}")]
    NetworkError(String),

    /// Blob delivered in an encoding other than base64.
    #[error("blob {sha}: unsupported encoding: {encoding}")]
    UnsupportedEncoding {
        /// The blob id
        sha: String,
        /// The encoding the remote reported
        encoding: String,
    },

    /// A reference with that name already exists.
    #[error("reference already exists: {0}")]
    AlreadyExists(String),

    /// The reference target does not resolve to an object.
    #[error("invalid object: {0}")]
    InvalidObject(String),

    /// The remote host does not follow a supported API convention.
    #[error("{0} is not supported")]
    Unsupported(String),
}

impl ForgeError {
    /// Check if this error is a transient rate-limit signal.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, ForgeError::RateLimited { .. })
    }
}

/// A reference created on the remote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    /// Full ref name (e.g. `refs/heads/feature`)
    pub name: String,
    /// Object the ref points at
    pub sha: Sha,
}

impl std::fmt::Display for Reference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.name, self.sha)
    }
}

/// Pull request fields the fallback path uses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequest {
    /// PR number
    pub number: u64,
    /// PR state as reported (`open` / `closed`)
    pub state: String,
    /// Test-merge or merge commit, once the remote has computed one
    pub merge_commit_sha: Option<Sha>,
}

/// Read access to a remote repository's object graph, plus branch creation.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync` to allow use across async tasks.
///
/// # Error Handling
///
/// All methods return `Result<T, ForgeError>`:
/// - `NotFound`: unknown commit, blob, ref target or PR
/// - `RateLimited`: transient, carries the reset time
/// - `NetworkError` / `ApiError`: transport or protocol failure
#[async_trait]
pub trait RemoteObjects: Send + Sync {
    /// Get the remote name (e.g., "github").
    fn name(&self) -> &'static str;

    /// Get a commit's metadata, parents and per-file change counts.
    ///
    /// `rev` may be anything the remote resolves (full or abbreviated id,
    /// branch name); the returned detail carries the resolved id.
    async fn get_commit(&self, rev: &str) -> Result<CommitDetail, ForgeError>;

    /// Get the full recursive tree listing for a commit.
    async fn get_tree(&self, commit: &str) -> Result<Vec<TreeEntry>, ForgeError>;

    /// Get a blob by object id.
    ///
    /// # Errors
    ///
    /// Additionally fails with `UnsupportedEncoding` if the blob is not
    /// delivered as base64.
    async fn get_blob(&self, sha: &str) -> Result<Blob, ForgeError>;

    /// Create `refs/heads/<branch>` pointing at `commit`.
    ///
    /// # Errors
    ///
    /// - `AlreadyExists` if the branch ref exists
    /// - `InvalidObject` if `commit` does not resolve
    async fn create_branch(&self, branch: &str, commit: &str) -> Result<Reference, ForgeError>;

    /// Get a pull request by number.
    async fn get_pull_request(&self, number: u64) -> Result<PullRequest, ForgeError>;
}
