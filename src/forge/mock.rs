//! forge::mock
//!
//! Mock remote for deterministic testing.
//!
//! # Design
//!
//! The mock remote is an in-memory object graph implementing
//! [`RemoteObjects`]. Commits, trees, blobs and pull requests are registered
//! up front with builder methods. Failures are scripted per operation and
//! consumed in order, which is how tests simulate rate limiting. Every call
//! is recorded so tests can assert on the exact sequence of remote requests.
//!
//! # Example
//!
//! ```
//! use gitshim::forge::mock::MockRemote;
//! use gitshim::forge::RemoteObjects;
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let remote = MockRemote::new()
//!     .with_commit("c2", &["c1"], &[("x.txt", 3, 1)])
//!     .with_commit("c1", &[], &[]);
//!
//! let commit = remote.get_commit("c2").await.unwrap();
//! assert_eq!(commit.parents.len(), 1);
//! assert_eq!(remote.operations().len(), 1);
//! # });
//! ```

use async_trait::async_trait;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex};

use super::traits::{ForgeError, PullRequest, Reference, RemoteObjects};
use crate::core::types::{Blob, CommitDetail, FileChange, Sha, TreeEntry, BASE64_ENCODING};

/// Mock remote for testing.
///
/// Thread-safe via internal `Arc<Mutex<...>>` wrapping; clones share state.
#[derive(Debug, Clone, Default)]
pub struct MockRemote {
    inner: Arc<Mutex<MockRemoteInner>>,
}

#[derive(Debug, Default)]
struct MockRemoteInner {
    commits: HashMap<String, CommitDetail>,
    /// Revision names (branches, short ids) resolving to a commit id.
    aliases: HashMap<String, String>,
    trees: HashMap<String, Vec<TreeEntry>>,
    blobs: HashMap<String, Blob>,
    pulls: HashMap<u64, PullRequest>,
    refs: HashSet<String>,
    failures: HashMap<Op, VecDeque<ForgeError>>,
    operations: Vec<MockOperation>,
}

/// Operation selector for scripted failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    GetCommit,
    GetTree,
    GetBlob,
    CreateBranch,
    GetPullRequest,
}

/// Recorded operation for test verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockOperation {
    GetCommit { rev: String },
    GetTree { commit: String },
    GetBlob { sha: String },
    CreateBranch { branch: String, commit: String },
    GetPullRequest { number: u64 },
}

impl MockRemote {
    /// Create an empty mock remote.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a commit with its parents and per-file `(path, additions, deletions)`.
    pub fn with_commit(self, sha: &str, parents: &[&str], files: &[(&str, u64, u64)]) -> Self {
        let detail = CommitDetail {
            sha: Sha::new(sha),
            parents: parents.iter().map(|p| Sha::new(*p)).collect(),
            author: None,
            files: files
                .iter()
                .map(|(path, add, del)| FileChange::new(*path, *add, *del))
                .collect(),
        };
        self.with_commit_detail(detail)
    }

    /// Register a fully specified commit.
    pub fn with_commit_detail(self, detail: CommitDetail) -> Self {
        self.lock()
            .commits
            .insert(detail.sha.as_str().to_string(), detail);
        self
    }

    /// Make `name` resolve to the commit `sha`.
    pub fn with_alias(self, name: &str, sha: &str) -> Self {
        self.lock()
            .aliases
            .insert(name.to_string(), sha.to_string());
        self
    }

    /// Register the recursive tree listing of a commit.
    pub fn with_tree(self, commit: &str, entries: Vec<TreeEntry>) -> Self {
        self.lock().trees.insert(commit.to_string(), entries);
        self
    }

    /// Register a base64 blob.
    pub fn with_blob(self, sha: &str, base64_content: &str) -> Self {
        self.with_raw_blob(sha, Blob::base64(base64_content))
    }

    /// Register a blob with an arbitrary encoding.
    pub fn with_raw_blob(self, sha: &str, blob: Blob) -> Self {
        self.lock().blobs.insert(sha.to_string(), blob);
        self
    }

    /// Register a pull request.
    pub fn with_pull_request(self, pr: PullRequest) -> Self {
        self.lock().pulls.insert(pr.number, pr);
        self
    }

    /// Register an existing branch.
    pub fn with_branch(self, branch: &str) -> Self {
        self.lock().refs.insert(format!("refs/heads/{}", branch));
        self
    }

    /// Queue a failure for the next call of `op`.
    ///
    /// Failures queued for the same operation are returned in order, one
    /// per call, before the operation starts succeeding again.
    pub fn push_failure(&self, op: Op, err: ForgeError) {
        self.lock().failures.entry(op).or_default().push_back(err);
    }

    /// Get all recorded operations.
    pub fn operations(&self) -> Vec<MockOperation> {
        self.lock().operations.clone()
    }

    /// Get the revisions passed to `get_commit`, in call order.
    pub fn commit_fetches(&self) -> Vec<String> {
        self.lock()
            .operations
            .iter()
            .filter_map(|op| match op {
                MockOperation::GetCommit { rev } => Some(rev.clone()),
                _ => None,
            })
            .collect()
    }

    /// Check whether a ref exists (including ones created through the mock).
    pub fn has_ref(&self, name: &str) -> bool {
        self.lock().refs.contains(name)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockRemoteInner> {
        self.inner.lock().unwrap()
    }

    /// Record the call and pop a scripted failure, if any.
    fn begin(
        &self,
        op: Op,
        record: MockOperation,
    ) -> Result<std::sync::MutexGuard<'_, MockRemoteInner>, ForgeError> {
        let mut inner = self.lock();
        inner.operations.push(record);
        if let Some(err) = inner.failures.get_mut(&op).and_then(|q| q.pop_front()) {
            return Err(err);
        }
        Ok(inner)
    }
}

impl MockRemoteInner {
    fn resolve(&self, rev: &str) -> Option<&CommitDetail> {
        let sha = self.aliases.get(rev).map(String::as_str).unwrap_or(rev);
        self.commits.get(sha)
    }
}

#[async_trait]
impl RemoteObjects for MockRemote {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn get_commit(&self, rev: &str) -> Result<CommitDetail, ForgeError> {
        let inner = self.begin(Op::GetCommit, MockOperation::GetCommit { rev: rev.into() })?;
        inner
            .resolve(rev)
            .cloned()
            .ok_or_else(|| ForgeError::NotFound(format!("commit {}", rev)))
    }

    async fn get_tree(&self, commit: &str) -> Result<Vec<TreeEntry>, ForgeError> {
        let inner = self.begin(
            Op::GetTree,
            MockOperation::GetTree {
                commit: commit.into(),
            },
        )?;
        let sha = inner
            .resolve(commit)
            .map(|c| c.sha.as_str().to_string())
            .unwrap_or_else(|| commit.to_string());
        inner
            .trees
            .get(&sha)
            .cloned()
            .ok_or_else(|| ForgeError::NotFound(format!("tree {}", commit)))
    }

    async fn get_blob(&self, sha: &str) -> Result<Blob, ForgeError> {
        let inner = self.begin(Op::GetBlob, MockOperation::GetBlob { sha: sha.into() })?;
        let blob = inner
            .blobs
            .get(sha)
            .cloned()
            .ok_or_else(|| ForgeError::NotFound(format!("blob {}", sha)))?;
        if blob.encoding != BASE64_ENCODING {
            return Err(ForgeError::UnsupportedEncoding {
                sha: sha.to_string(),
                encoding: blob.encoding,
            });
        }
        Ok(blob)
    }

    async fn create_branch(&self, branch: &str, commit: &str) -> Result<Reference, ForgeError> {
        let mut inner = self.begin(
            Op::CreateBranch,
            MockOperation::CreateBranch {
                branch: branch.into(),
                commit: commit.into(),
            },
        )?;
        let name = format!("refs/heads/{}", branch);
        if inner.refs.contains(&name) {
            return Err(ForgeError::AlreadyExists(name));
        }
        let sha = inner
            .resolve(commit)
            .map(|c| c.sha.clone())
            .ok_or_else(|| ForgeError::InvalidObject(commit.to_string()))?;
        inner.refs.insert(name.clone());
        Ok(Reference { name, sha })
    }

    async fn get_pull_request(&self, number: u64) -> Result<PullRequest, ForgeError> {
        let inner = self.begin(Op::GetPullRequest, MockOperation::GetPullRequest { number })?;
        inner
            .pulls
            .get(&number)
            .cloned()
            .ok_or_else(|| ForgeError::NotFound(format!("pull request #{}", number)))
    }
}
