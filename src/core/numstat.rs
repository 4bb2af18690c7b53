//! core::numstat
//!
//! Per-file addition/deletion totals across a range of commits.
//!
//! The remote only reports changes per commit, so a range is aggregated by
//! walking from the newer commit back to the base and summing every visited
//! commit's file list, the base's own changes included.

use std::collections::BTreeMap;
use std::fmt;

use super::ancestry::AncestryWalker;
use super::error::CoreError;
use super::types::{CommitDetail, FileChange};
use crate::forge::RemoteObjects;

/// Accumulated change counts for one path.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FileStat {
    pub additions: u64,
    pub deletions: u64,
    /// Content is binary; line counts are meaningless and render as `-`.
    pub binary: bool,
}

impl FileStat {
    fn render(&self, path: &str) -> String {
        if self.binary {
            format!("-\t-\t{}", path)
        } else {
            format!("{}\t{}\t{}", self.additions, self.deletions, path)
        }
    }
}

/// Path-keyed change totals. Iteration is sorted by path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Numstat {
    stats: BTreeMap<String, FileStat>,
}

impl Numstat {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one observed change to the running totals.
    pub fn record(&mut self, change: &FileChange) {
        let stat = self.stats.entry(change.path.clone()).or_default();
        stat.additions += change.additions;
        stat.deletions += change.deletions;
    }

    /// Mark `path` as binary.
    pub fn record_binary(&mut self, path: impl Into<String>) {
        self.stats.entry(path.into()).or_default().binary = true;
    }

    /// Add every file change of a commit.
    pub fn record_commit(&mut self, commit: &CommitDetail) {
        for change in &commit.files {
            self.record(change);
        }
    }

    /// Fold another aggregate into this one.
    pub fn merge(&mut self, other: &Numstat) {
        for (path, stat) in &other.stats {
            let entry = self.stats.entry(path.clone()).or_default();
            entry.additions += stat.additions;
            entry.deletions += stat.deletions;
            entry.binary |= stat.binary;
        }
    }

    pub fn get(&self, path: &str) -> Option<FileStat> {
        self.stats.get(path).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, FileStat)> {
        self.stats.iter().map(|(p, s)| (p.as_str(), *s))
    }

    pub fn len(&self) -> usize {
        self.stats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stats.is_empty()
    }

    /// Render as `additions<TAB>deletions<TAB>path` lines, sorted by path.
    ///
    /// Binary paths render as `-<TAB>-<TAB>path`, like `git diff --numstat`.
    pub fn lines(&self) -> Vec<String> {
        self.iter().map(|(path, s)| s.render(path)).collect()
    }
}

impl fmt::Display for Numstat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in self.lines() {
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}

impl<'a> FromIterator<&'a FileChange> for Numstat {
    fn from_iter<I: IntoIterator<Item = &'a FileChange>>(iter: I) -> Self {
        let mut numstat = Numstat::new();
        for change in iter {
            numstat.record(change);
        }
        numstat
    }
}

/// Aggregate changes from `commit` back to and including `base`.
///
/// An empty result is returned without any remote call when the two are
/// the same commit.
///
/// # Errors
///
/// - [`CoreError::BaseNotFound`] if `base` is not within `max_depth` levels
/// - [`CoreError::Remote`] for any remote failure
pub async fn diff_numstat<R: RemoteObjects + ?Sized>(
    remote: &R,
    base: &str,
    commit: &str,
    max_depth: usize,
) -> Result<Numstat, CoreError> {
    let mut numstat = Numstat::new();
    let visited = AncestryWalker::new(remote)
        .search_base(commit, base, max_depth, |c| numstat.record_commit(c))
        .await?;

    tracing::debug!(base, commit, visited, paths = numstat.len(), "aggregated numstat");
    Ok(numstat)
}
