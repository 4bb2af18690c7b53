//! core::types
//!
//! Strong types for the commit object graph as seen through a remote API.
//!
//! # Types
//!
//! - [`Sha`] - Opaque commit/object identifier
//! - [`TreeEntry`] / [`EntryKind`] - One row of a recursive tree listing
//! - [`Blob`] - Encoded file content
//! - [`CommitDetail`] - Commit metadata, parents and per-file changes
//!
//! # Opaqueness
//!
//! Identifiers are not validated here. Commit ids, branch names and revision
//! expressions are handed to the remote API verbatim and rejected there if
//! malformed. Two [`Sha`] values are interchangeable exactly when their
//! strings are equal.
//!
//! # Example
//!
//! ```
//! use gitshim::core::types::{Blob, Sha};
//!
//! let sha = Sha::new("abc123");
//! assert_eq!(sha.short(4), "abc1");
//!
//! let blob = Blob::base64("aGk=");
//! assert_eq!(blob.decode().unwrap(), b"hi");
//! ```

use base64::Engine;
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The only blob encoding the materializer understands.
pub const BASE64_ENCODING: &str = "base64";

/// Errors from decoding remote objects.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("unsupported encoding: {0}")]
    UnsupportedEncoding(String),

    #[error("invalid base64 content: {0}")]
    InvalidBase64(String),
}

/// An opaque content-derived identifier (commit id, tree id, blob id).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Sha(String);

impl Sha {
    /// Wrap an identifier string.
    pub fn new(sha: impl Into<String>) -> Self {
        Self(sha.into())
    }

    /// Get an abbreviated form for display.
    ///
    /// Returns the whole identifier if it is shorter than `len`.
    pub fn short(&self, len: usize) -> &str {
        let end = self
            .0
            .char_indices()
            .nth(len)
            .map(|(i, _)| i)
            .unwrap_or(self.0.len());
        &self.0[..end]
    }

    /// Get the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Sha {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Sha {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl AsRef<str> for Sha {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Sha {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Kind of object a tree entry points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// Regular file (blob). The only kind that carries content.
    File,
    /// Directory. Already expanded in a recursive listing.
    Subtree,
    /// Submodule (gitlink). Points at a commit in another repository.
    Submodule,
}

impl EntryKind {
    /// Map the API's object type name to an entry kind.
    ///
    /// Unknown type names are treated as files, matching how the listing
    /// is consumed (anything that is not a tree is fetched as a blob).
    pub fn from_api_type(kind: &str) -> Self {
        match kind {
            "tree" => EntryKind::Subtree,
            "commit" => EntryKind::Submodule,
            _ => EntryKind::File,
        }
    }
}

impl std::fmt::Display for EntryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntryKind::File => write!(f, "blob"),
            EntryKind::Subtree => write!(f, "tree"),
            EntryKind::Submodule => write!(f, "commit"),
        }
    }
}

/// One entry of a recursive tree listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeEntry {
    /// Slash-separated path relative to the repository root
    pub path: String,
    /// Object the entry points at
    pub sha: Sha,
    /// Entry kind
    pub kind: EntryKind,
}

impl TreeEntry {
    /// Create a file entry.
    pub fn file(path: impl Into<String>, sha: impl Into<Sha>) -> Self {
        Self {
            path: path.into(),
            sha: sha.into(),
            kind: EntryKind::File,
        }
    }

    /// Create a subtree entry.
    pub fn subtree(path: impl Into<String>, sha: impl Into<Sha>) -> Self {
        Self {
            path: path.into(),
            sha: sha.into(),
            kind: EntryKind::Subtree,
        }
    }

    /// Check if this entry carries file content.
    pub fn is_file(&self) -> bool {
        self.kind == EntryKind::File
    }
}

/// Encoded file content as delivered by the remote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blob {
    /// Transfer encoding (only `base64` is supported)
    pub encoding: String,
    /// Encoded content
    pub content: String,
}

impl Blob {
    /// Create a base64-encoded blob.
    pub fn base64(content: impl Into<String>) -> Self {
        Self {
            encoding: BASE64_ENCODING.to_string(),
            content: content.into(),
        }
    }

    /// Decode the content to raw bytes.
    ///
    /// Line breaks inside the encoded content are ignored; the API wraps
    /// base64 payloads at 60 columns.
    ///
    /// # Errors
    ///
    /// - [`TypeError::UnsupportedEncoding`] for anything but `base64`
    /// - [`TypeError::InvalidBase64`] if the payload does not decode
    pub fn decode(&self) -> Result<Vec<u8>, TypeError> {
        if self.encoding != BASE64_ENCODING {
            return Err(TypeError::UnsupportedEncoding(self.encoding.clone()));
        }

        let compact: String = self
            .content
            .chars()
            .filter(|c| *c != '\n' && *c != '\r')
            .collect();

        base64::engine::general_purpose::STANDARD
            .decode(compact)
            .map_err(|e| TypeError::InvalidBase64(e.to_string()))
    }
}

/// Author or committer identity with timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    pub name: String,
    pub email: String,
    pub date: DateTime<FixedOffset>,
}

/// Per-file change counts reported for a single commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileChange {
    pub path: String,
    pub additions: u64,
    pub deletions: u64,
}

impl FileChange {
    pub fn new(path: impl Into<String>, additions: u64, deletions: u64) -> Self {
        Self {
            path: path.into(),
            additions,
            deletions,
        }
    }
}

/// A commit as returned by the remote.
///
/// The parent list is fixed at fetch time; commits are immutable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitDetail {
    /// Fully resolved commit id
    pub sha: Sha,
    /// Parent commit ids, in order
    pub parents: Vec<Sha>,
    /// Author, if the remote reported one
    pub author: Option<Signature>,
    /// Files changed relative to the first parent
    pub files: Vec<FileChange>,
}
