//! core::error
//!
//! Errors raised by the fallback algorithms.
//!
//! Every remote failure is wrapped with the operation and the identifier it
//! was issued for, so a failure can be diagnosed without re-running.

use std::path::PathBuf;

use thiserror::Error;

use crate::forge::ForgeError;

/// Errors from ancestry walking, aggregation and materialization.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A remote call failed.
    #[error("{operation} {target}: {source}")]
    Remote {
        /// Remote operation name (e.g. `get_commit`)
        operation: &'static str,
        /// Identifier the call was made for
        target: String,
        #[source]
        source: ForgeError,
    },

    /// The ancestry search exhausted its budget without reaching the base.
    #[error("base commit {base} not found within {depth} levels of {start}")]
    BaseNotFound {
        base: String,
        start: String,
        depth: usize,
    },

    /// No file entry with that path exists at the commit.
    #[error("file {path} not found at {commit}")]
    FileNotFound { path: String, commit: String },

    /// The commit carries no author information.
    #[error("author not found for commit {commit}")]
    AuthorNotFound { commit: String },

    /// Blob content did not decode.
    #[error("cannot decode blob {target}: {message}")]
    InvalidBase64 { target: String, message: String },

    /// A tree entry would be written outside the destination directory.
    #[error("refusing to write unsafe path '{path}'")]
    UnsafePath { path: String },

    /// Local filesystem failure.
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl CoreError {
    /// Wrap a remote failure with its operation and identifier.
    pub fn remote(operation: &'static str, target: impl Into<String>, source: ForgeError) -> Self {
        CoreError::Remote {
            operation,
            target: target.into(),
            source,
        }
    }

    /// Wrap a filesystem failure with the path involved.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        CoreError::Io {
            path: path.into(),
            source,
        }
    }

    /// Get the underlying remote error, if any.
    pub fn forge_error(&self) -> Option<&ForgeError> {
        match self {
            CoreError::Remote { source, .. } => Some(source),
            _ => None,
        }
    }

    /// Check if this is a "not found" condition, local or remote.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            CoreError::Remote {
                source: ForgeError::NotFound(_),
                ..
            } | CoreError::BaseNotFound { .. }
                | CoreError::FileNotFound { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_error_names_operation_and_target() {
        let err = CoreError::remote(
            "get_commit",
            "abc123",
            ForgeError::NetworkError("connection reset".into()),
        );
        assert_eq!(
            err.to_string(),
            "get_commit abc123: network error: connection reset"
        );
        assert!(err.forge_error().is_some());
        assert!(!err.is_not_found());
    }

    #[test]
    fn not_found_kinds() {
        let remote = CoreError::remote("get_blob", "b1", ForgeError::NotFound("blob b1".into()));
        let base = CoreError::BaseNotFound {
            base: "b".into(),
            start: "s".into(),
            depth: 100,
        };
        assert!(remote.is_not_found());
        assert!(base.is_not_found());
        assert_eq!(
            base.to_string(),
            "base commit b not found within 100 levels of s"
        );
    }
}
