//! forge::retry
//!
//! Rate-limit-aware retry around remote operations.
//!
//! # Policy
//!
//! When an operation reports [`ForgeError::RateLimited`], the caller sleeps
//! until the reported reset time plus a fixed safety margin (30 seconds by
//! default), then re-issues the identical call. Any other error is returned
//! immediately.
//!
//! # Known limitation
//!
//! Retries are unbounded. A remote that keeps answering with a rate-limit
//! signal keeps the process waiting forever; there is no cancellation once a
//! wait has started.
//!
//! # Example
//!
//! ```ignore
//! use gitshim::forge::{RetryingRemote, RetryPolicy, github::GitHubForge};
//!
//! let remote = RetryingRemote::new(GitHubForge::new(token, "owner", "repo"), RetryPolicy::default());
//! let commit = remote.get_commit("main").await?;
//! ```

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::traits::{ForgeError, PullRequest, Reference, RemoteObjects};
use crate::core::types::{Blob, CommitDetail, TreeEntry};

/// Default safety margin added after the server's reset time.
pub const DEFAULT_RATE_LIMIT_MARGIN: Duration = Duration::from_secs(30);

/// How long to wait after a rate-limit signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Added to the time remaining until the reset
    pub margin: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            margin: DEFAULT_RATE_LIMIT_MARGIN,
        }
    }
}

impl RetryPolicy {
    /// Create a policy with a custom safety margin.
    pub fn with_margin(margin: Duration) -> Self {
        Self { margin }
    }

    /// Compute `reset_at - now + margin`.
    ///
    /// A reset time in the past contributes nothing; the margin is always
    /// waited in full.
    pub fn wait_for(&self, reset_at: DateTime<Utc>, now: DateTime<Utc>) -> Duration {
        let remaining = (reset_at - now).to_std().unwrap_or(Duration::ZERO);
        remaining + self.margin
    }
}

/// Run `call` until it returns something other than a rate-limit error.
///
/// `operation` and `id` only feed the log line emitted before each wait.
pub async fn with_rate_limit_retry<T, F, Fut>(
    policy: &RetryPolicy,
    operation: &str,
    id: &str,
    mut call: F,
) -> Result<T, ForgeError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ForgeError>>,
{
    loop {
        match call().await {
            Err(ForgeError::RateLimited { reset_at }) => {
                let wait = policy.wait_for(reset_at, Utc::now());
                tracing::warn!(
                    operation,
                    id,
                    %reset_at,
                    wait_secs = wait.as_secs(),
                    "rate limited, waiting before retry"
                );
                tokio::time::sleep(wait).await;
            }
            other => return other,
        }
    }
}

/// Decorator that applies the retry policy to every remote operation.
#[derive(Debug, Clone)]
pub struct RetryingRemote<R> {
    inner: R,
    policy: RetryPolicy,
}

impl<R: RemoteObjects> RetryingRemote<R> {
    /// Wrap a remote with the given policy.
    pub fn new(inner: R, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    /// Get the wrapped remote.
    pub fn inner(&self) -> &R {
        &self.inner
    }

    /// Get the active policy.
    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }
}

#[async_trait]
impl<R: RemoteObjects> RemoteObjects for RetryingRemote<R> {
    fn name(&self) -> &'static str {
        self.inner.name()
    }

    async fn get_commit(&self, rev: &str) -> Result<CommitDetail, ForgeError> {
        with_rate_limit_retry(&self.policy, "get_commit", rev, || {
            self.inner.get_commit(rev)
        })
        .await
    }

    async fn get_tree(&self, commit: &str) -> Result<Vec<TreeEntry>, ForgeError> {
        with_rate_limit_retry(&self.policy, "get_tree", commit, || {
            self.inner.get_tree(commit)
        })
        .await
    }

    async fn get_blob(&self, sha: &str) -> Result<Blob, ForgeError> {
        with_rate_limit_retry(&self.policy, "get_blob", sha, || self.inner.get_blob(sha)).await
    }

    async fn create_branch(&self, branch: &str, commit: &str) -> Result<Reference, ForgeError> {
        with_rate_limit_retry(&self.policy, "create_branch", branch, || {
            self.inner.create_branch(branch, commit)
        })
        .await
    }

    async fn get_pull_request(&self, number: u64) -> Result<PullRequest, ForgeError> {
        let id = number.to_string();
        with_rate_limit_retry(&self.policy, "get_pull_request", &id, || {
            self.inner.get_pull_request(number)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forge::mock::{MockOperation, MockRemote, Op};

    #[test]
    fn wait_adds_margin_to_remaining_time() {
        let now = Utc::now();
        let reset = now + chrono::Duration::seconds(90);
        let wait = RetryPolicy::default().wait_for(reset, now);
        assert_eq!(wait, Duration::from_secs(120));
    }

    #[test]
    fn wait_for_past_reset_is_just_the_margin() {
        let now = Utc::now();
        let reset = now - chrono::Duration::seconds(500);
        let policy = RetryPolicy::with_margin(Duration::from_secs(5));
        assert_eq!(policy.wait_for(reset, now), Duration::from_secs(5));
    }

    #[tokio::test(start_paused = true)]
    async fn retries_after_reset_plus_margin() {
        let mock = MockRemote::new().with_commit("c1", &[], &[]);
        let reset_at = Utc::now() + chrono::Duration::seconds(10);
        mock.push_failure(Op::GetCommit, ForgeError::RateLimited { reset_at });

        let remote = RetryingRemote::new(mock.clone(), RetryPolicy::default());
        let started = tokio::time::Instant::now();
        let commit = remote.get_commit("c1").await.unwrap();

        assert_eq!(commit.sha.as_str(), "c1");
        assert!(started.elapsed() >= Duration::from_secs(39));

        let calls = mock.operations();
        assert_eq!(
            calls,
            vec![
                MockOperation::GetCommit { rev: "c1".into() },
                MockOperation::GetCommit { rev: "c1".into() },
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn retries_repeatedly_until_success() {
        let mock = MockRemote::new().with_blob("b1", "aGk=");
        let reset_at = Utc::now();
        for _ in 0..3 {
            mock.push_failure(Op::GetBlob, ForgeError::RateLimited { reset_at });
        }

        let remote = RetryingRemote::new(mock.clone(), RetryPolicy::default());
        let blob = remote.get_blob("b1").await.unwrap();

        assert_eq!(blob.decode().unwrap(), b"hi".to_vec());
        assert_eq!(mock.operations().len(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn other_errors_are_not_retried() {
        let mock = MockRemote::new();
        mock.push_failure(Op::GetTree, ForgeError::NetworkError("reset".into()));

        let remote = RetryingRemote::new(mock.clone(), RetryPolicy::default());
        let err = remote.get_tree("c1").await.unwrap_err();

        assert!(matches!(err, ForgeError::NetworkError(_)));
        assert_eq!(mock.operations().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn create_branch_is_reissued_unchanged() {
        let mock = MockRemote::new().with_commit("c1", &[], &[]);
        mock.push_failure(
            Op::CreateBranch,
            ForgeError::RateLimited {
                reset_at: Utc::now(),
            },
        );

        let remote = RetryingRemote::new(mock.clone(), RetryPolicy::default());
        let reference = remote.create_branch("topic", "c1").await.unwrap();

        assert_eq!(reference.name, "refs/heads/topic");
        let expected = MockOperation::CreateBranch {
            branch: "topic".into(),
            commit: "c1".into(),
        };
        assert_eq!(mock.operations(), vec![expected.clone(), expected]);
    }
}
