//! core::resolve
//!
//! Single-request lookups against the remote: revision resolution, author
//! date, pull request merge commit and branch creation.

use chrono::{DateTime, FixedOffset};

use super::error::CoreError;
use super::types::Sha;
use crate::forge::{ForgeError, Reference, RemoteObjects};

/// Resolve any revision the remote accepts to a full commit id.
pub async fn rev_parse<R: RemoteObjects + ?Sized>(remote: &R, rev: &str) -> Result<Sha, CoreError> {
    let commit = remote
        .get_commit(rev)
        .await
        .map_err(|e| CoreError::remote("get_commit", rev, e))?;
    Ok(commit.sha)
}

/// Get the author date of a commit.
pub async fn author_date<R: RemoteObjects + ?Sized>(
    remote: &R,
    rev: &str,
) -> Result<DateTime<FixedOffset>, CoreError> {
    let commit = remote
        .get_commit(rev)
        .await
        .map_err(|e| CoreError::remote("get_commit", rev, e))?;
    commit
        .author
        .map(|a| a.date)
        .ok_or_else(|| CoreError::AuthorNotFound {
            commit: rev.to_string(),
        })
}

/// Get the merge commit the remote computed for a pull request.
///
/// A pull request without one yet (conflicts, or not yet computed) is
/// reported as not found.
pub async fn pr_merge_commit<R: RemoteObjects + ?Sized>(
    remote: &R,
    number: u64,
) -> Result<Sha, CoreError> {
    let target = format!("#{}", number);
    let pr = remote
        .get_pull_request(number)
        .await
        .map_err(|e| CoreError::remote("get_pull_request", &target, e))?;
    pr.merge_commit_sha.ok_or_else(|| {
        CoreError::remote(
            "get_pull_request",
            &target,
            ForgeError::NotFound(format!("merge commit of pull request #{}", number)),
        )
    })
}

/// Create `refs/heads/<branch>` at `commit`.
pub async fn create_reference<R: RemoteObjects + ?Sized>(
    remote: &R,
    branch: &str,
    commit: &str,
) -> Result<Reference, CoreError> {
    let reference = remote
        .create_branch(branch, commit)
        .await
        .map_err(|e| CoreError::remote("create_branch", format!("{} at {}", branch, commit), e))?;
    tracing::info!(%reference, "created reference");
    Ok(reference)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{CommitDetail, Signature};
    use crate::forge::mock::MockRemote;
    use crate::forge::PullRequest;

    fn dated_commit() -> CommitDetail {
        CommitDetail {
            sha: Sha::new("c1"),
            parents: vec![],
            author: Some(Signature {
                name: "Mona".into(),
                email: "mona@example.com".into(),
                date: DateTime::parse_from_rfc3339("2021-06-01T12:30:00+02:00").unwrap(),
            }),
            files: vec![],
        }
    }

    #[tokio::test]
    async fn rev_parse_returns_resolved_id() {
        let remote = MockRemote::new()
            .with_commit("0123abcd", &[], &[])
            .with_alias("main", "0123abcd");
        assert_eq!(rev_parse(&remote, "main").await.unwrap().as_str(), "0123abcd");
    }

    #[tokio::test]
    async fn author_date_keeps_offset() {
        let remote = MockRemote::new().with_commit_detail(dated_commit());
        let date = author_date(&remote, "c1").await.unwrap();
        assert_eq!(
            date.format("%Y-%m-%d %H:%M:%S %z").to_string(),
            "2021-06-01 12:30:00 +0200"
        );
    }

    #[tokio::test]
    async fn missing_author_is_an_error() {
        let remote = MockRemote::new().with_commit("c1", &[], &[]);
        let err = author_date(&remote, "c1").await.unwrap_err();
        assert_eq!(err.to_string(), "author not found for commit c1");
    }

    #[tokio::test]
    async fn pr_without_merge_commit_is_not_found() {
        let remote = MockRemote::new()
            .with_pull_request(PullRequest {
                number: 5,
                state: "open".into(),
                merge_commit_sha: Some(Sha::new("m5")),
            })
            .with_pull_request(PullRequest {
                number: 6,
                state: "open".into(),
                merge_commit_sha: None,
            });

        assert_eq!(pr_merge_commit(&remote, 5).await.unwrap().as_str(), "m5");
        let err = pr_merge_commit(&remote, 6).await.unwrap_err();
        assert!(err.is_not_found());
        assert!(err.to_string().contains("#6"));
    }

    #[tokio::test]
    async fn create_reference_reports_collision() {
        let remote = MockRemote::new()
            .with_commit("c1", &[], &[])
            .with_branch("main");

        let created = create_reference(&remote, "topic", "c1").await.unwrap();
        assert_eq!(created.to_string(), "refs/heads/topic c1");

        let err = create_reference(&remote, "main", "c1").await.unwrap_err();
        assert!(matches!(
            err.forge_error(),
            Some(ForgeError::AlreadyExists(_))
        ));
    }
}
