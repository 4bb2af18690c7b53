//! core::materialize
//!
//! Rebuild a directory from a commit's remote tree listing.
//!
//! # Behavior
//!
//! Every file entry of the recursive listing is fetched, decoded and
//! written below the destination. Subtree entries are skipped because the
//! listing is already flattened; submodule entries are skipped because their
//! content lives in another repository.
//!
//! Paths are checked before anything is written: an absolute path or a `..`
//! component aborts the whole run with [`CoreError::UnsafePath`].
//!
//! The first failing entry aborts the run. Files written before the failure
//! stay on disk.

use std::fs;
use std::path::{Component, Path, PathBuf};

use super::error::CoreError;
use super::types::{Blob, TreeEntry, TypeError};
use crate::forge::{ForgeError, RemoteObjects};

/// Counts reported after a successful materialization.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MaterializeSummary {
    /// Files written
    pub written: usize,
    /// Subtree and submodule entries skipped
    pub skipped: usize,
}

/// Check that a tree path stays inside the destination.
pub fn validate_path(path: &str) -> Result<PathBuf, CoreError> {
    let unsafe_path = || CoreError::UnsafePath {
        path: path.to_string(),
    };

    if path.is_empty() || path.starts_with('/') || path.starts_with('\\') {
        return Err(unsafe_path());
    }

    let relative = PathBuf::from(path);
    for component in relative.components() {
        match component {
            Component::Normal(_) | Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(unsafe_path())
            }
        }
    }
    Ok(relative)
}

/// Decode a blob, attributing failures to its id.
pub fn decode_blob(sha: &str, blob: &Blob) -> Result<Vec<u8>, CoreError> {
    blob.decode().map_err(|e| match e {
        TypeError::UnsupportedEncoding(encoding) => CoreError::remote(
            "get_blob",
            sha,
            ForgeError::UnsupportedEncoding {
                sha: sha.to_string(),
                encoding,
            },
        ),
        TypeError::InvalidBase64(message) => CoreError::InvalidBase64 {
            target: sha.to_string(),
            message,
        },
    })
}

/// Write `bytes` to `dest/relative`, replacing whatever is there.
///
/// Missing parent directories are created. A directory at the target is
/// removed recursively first, and so is a file standing where a parent
/// directory is needed. A symbolic link at the target is removed, not
/// followed.
pub fn write_entry(dest: &Path, relative: &Path, bytes: &[u8]) -> Result<(), CoreError> {
    let target = dest.join(relative);

    if let Some(parent) = relative.parent() {
        let mut dir = dest.to_path_buf();
        for component in parent.components() {
            dir.push(component);
            if dir.is_file() || dir.is_symlink() {
                fs::remove_file(&dir).map_err(|e| CoreError::io(&dir, e))?;
            }
        }
        fs::create_dir_all(&dir).map_err(|e| CoreError::io(&dir, e))?;
    }

    // Never write through a link: it may point outside `dest`.
    if let Ok(meta) = fs::symlink_metadata(&target) {
        let file_type = meta.file_type();
        if file_type.is_symlink() {
            fs::remove_file(&target).map_err(|e| CoreError::io(&target, e))?;
        } else if file_type.is_dir() {
            fs::remove_dir_all(&target).map_err(|e| CoreError::io(&target, e))?;
        }
    }

    fs::write(&target, bytes).map_err(|e| CoreError::io(&target, e))
}

/// Fetch the recursive listing of `commit`, failing with context.
async fn fetch_tree<R: RemoteObjects + ?Sized>(
    remote: &R,
    commit: &str,
) -> Result<Vec<TreeEntry>, CoreError> {
    remote
        .get_tree(commit)
        .await
        .map_err(|e| CoreError::remote("get_tree", commit, e))
}

/// Fetch and decode one blob.
async fn fetch_blob<R: RemoteObjects + ?Sized>(remote: &R, sha: &str) -> Result<Vec<u8>, CoreError> {
    let blob = remote
        .get_blob(sha)
        .await
        .map_err(|e| CoreError::remote("get_blob", sha, e))?;
    decode_blob(sha, &blob)
}

/// Write the full file set of `commit` below `dest`.
pub async fn materialize_tree<R: RemoteObjects + ?Sized>(
    remote: &R,
    commit: &str,
    dest: &Path,
) -> Result<MaterializeSummary, CoreError> {
    let entries = fetch_tree(remote, commit).await?;

    let mut files = Vec::new();
    let mut summary = MaterializeSummary::default();
    for entry in &entries {
        if !entry.is_file() {
            tracing::debug!(path = %entry.path, kind = %entry.kind, "skipping entry");
            summary.skipped += 1;
            continue;
        }
        files.push((entry, validate_path(&entry.path)?));
    }

    for (entry, relative) in files {
        let bytes = fetch_blob(remote, entry.sha.as_str()).await?;
        write_entry(dest, &relative, &bytes)?;
        summary.written += 1;
    }

    tracing::info!(
        commit,
        written = summary.written,
        skipped = summary.skipped,
        "materialized tree"
    );
    Ok(summary)
}

/// Get the decoded content of one file at `commit`.
///
/// Only file entries match; a directory path is reported as not found.
pub async fn fetch_file<R: RemoteObjects + ?Sized>(
    remote: &R,
    commit: &str,
    path: &str,
) -> Result<Vec<u8>, CoreError> {
    let wanted = path.strip_prefix("./").unwrap_or(path);
    let entries = fetch_tree(remote, commit).await?;

    let entry = entries
        .iter()
        .find(|e| e.is_file() && e.path == wanted)
        .ok_or_else(|| CoreError::FileNotFound {
            path: path.to_string(),
            commit: commit.to_string(),
        })?;

    fetch_blob(remote, entry.sha.as_str()).await
}
