//! forge::github
//!
//! GitHub implementation of the remote object client, using the REST API.
//!
//! # Endpoints
//!
//! - `GET  /repos/{owner}/{repo}/commits/{rev}` - commit detail with per-file stats
//! - `GET  /repos/{owner}/{repo}/git/trees/{rev}?recursive=1` - recursive tree
//! - `GET  /repos/{owner}/{repo}/git/blobs/{sha}` - blob content
//! - `POST /repos/{owner}/{repo}/git/refs` - create a branch ref
//! - `GET  /repos/{owner}/{repo}/pulls/{number}` - pull request
//!
//! # Rate Limiting
//!
//! GitHub signals exhausted quota with 403 or 429 plus either
//! `X-RateLimit-Remaining: 0` / `X-RateLimit-Reset: <epoch>` (primary limit)
//! or `Retry-After: <seconds>` (secondary limit). Both are mapped to
//! [`ForgeError::RateLimited`] carrying the absolute reset time. This type
//! never waits; wrap it in [`RetryingRemote`](super::RetryingRemote).
//!
//! # Example
//!
//! ```ignore
//! use gitshim::forge::github::GitHubForge;
//! use gitshim::forge::RemoteObjects;
//!
//! let forge = GitHubForge::new("ghp_xxx", "octocat", "hello-world");
//! let tree = forge.get_tree("main").await?;
//! ```

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};

use super::traits::{ForgeError, PullRequest, Reference, RemoteObjects};
use crate::core::types::{
    Blob, CommitDetail, EntryKind, FileChange, Sha, Signature, TreeEntry, BASE64_ENCODING,
};

/// Default GitHub API base URL.
pub const DEFAULT_API_BASE: &str = "https://api.github.com";

/// User-Agent header value for API requests.
const USER_AGENT_VALUE: &str = "gitshim";

/// GitHub remote object client.
pub struct GitHubForge {
    /// HTTP client for making requests
    client: Client,
    /// Bearer token
    token: String,
    /// Repository owner (user or organization)
    owner: String,
    /// Repository name
    repo: String,
    /// API base URL (configurable for GitHub Enterprise)
    api_base: String,
}

// Custom Debug to avoid exposing the token
impl std::fmt::Debug for GitHubForge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubForge")
            .field("owner", &self.owner)
            .field("repo", &self.repo)
            .field("api_base", &self.api_base)
            .finish()
    }
}

impl GitHubForge {
    /// Create a client for `owner/repo` on github.com.
    pub fn new(
        token: impl Into<String>,
        owner: impl Into<String>,
        repo: impl Into<String>,
    ) -> Self {
        Self::with_api_base(token, owner, repo, DEFAULT_API_BASE)
    }

    /// Create a client with a custom API base URL.
    ///
    /// Use this for GitHub Enterprise (`https://github.example.com/api/v3`)
    /// and for tests against a local mock server.
    pub fn with_api_base(
        token: impl Into<String>,
        owner: impl Into<String>,
        repo: impl Into<String>,
        api_base: impl Into<String>,
    ) -> Self {
        let api_base: String = api_base.into();
        Self {
            client: Client::new(),
            token: token.into(),
            owner: owner.into(),
            repo: repo.into(),
            api_base: api_base.trim_end_matches('/').to_string(),
        }
    }

    /// Get the repository owner.
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Get the repository name.
    pub fn repo(&self) -> &str {
        &self.repo
    }

    /// Get the API base URL.
    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    /// Build common headers for API requests.
    fn headers(&self) -> Result<HeaderMap, ForgeError> {
        if self.token.is_empty() {
            return Err(ForgeError::AuthRequired);
        }
        let mut headers = HeaderMap::new();
        let bearer = HeaderValue::from_str(&format!("Bearer {}", self.token))
            .map_err(|_| ForgeError::AuthFailed("token is not a valid header value".into()))?;
        headers.insert(AUTHORIZATION, bearer);
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));
        headers.insert(
            "X-GitHub-Api-Version",
            HeaderValue::from_static("2022-11-28"),
        );
        Ok(headers)
    }

    /// Build URL for a repository endpoint.
    fn repo_url(&self, path: &str) -> String {
        format!(
            "{}/repos/{}/{}/{}",
            self.api_base, self.owner, self.repo, path
        )
    }

    /// GET a repository endpoint and decode the JSON body.
    async fn get_json<T: for<'de> Deserialize<'de>>(&self, path: &str) -> Result<T, ForgeError> {
        let response = self
            .client
            .get(self.repo_url(path))
            .headers(self.headers()?)
            .send()
            .await
            .map_err(|e| ForgeError::NetworkError(e.to_string()))?;

        self.handle_response(response).await
    }

    /// Handle API response, mapping errors appropriately.
    async fn handle_response<T: for<'de> Deserialize<'de>>(
        &self,
        response: Response,
    ) -> Result<T, ForgeError> {
        let status = response.status();

        if status.is_success() {
            response
                .json()
                .await
                .map_err(|e| ForgeError::NetworkError(format!("failed to parse response: {}", e)))
        } else {
            Err(Self::error_from_response(response, status).await)
        }
    }

    /// Map an error response to a `ForgeError`.
    async fn error_from_response(response: Response, status: StatusCode) -> ForgeError {
        // Rate limit headers must be read before the body consumes the response.
        let reset_at = rate_limit_reset(response.headers(), Utc::now());

        let message = match response.json::<GitHubErrorResponse>().await {
            Ok(err) => err.message,
            Err(_) => "Unknown error".to_string(),
        };

        match (status, reset_at) {
            (StatusCode::FORBIDDEN | StatusCode::TOO_MANY_REQUESTS, Some(reset_at)) => {
                ForgeError::RateLimited { reset_at }
            }
            (StatusCode::TOO_MANY_REQUESTS, None) => ForgeError::RateLimited {
                reset_at: Utc::now(),
            },
            (StatusCode::UNAUTHORIZED, _) => {
                ForgeError::AuthFailed("Invalid or expired token".into())
            }
            (StatusCode::FORBIDDEN, None) => {
                ForgeError::AuthFailed(format!("Permission denied: {}", message))
            }
            (StatusCode::NOT_FOUND, _) => ForgeError::NotFound(message),
            _ if status.is_server_error() => ForgeError::ApiError {
                status: status.as_u16(),
                message: format!("GitHub server error: {}", message),
            },
            _ => ForgeError::ApiError {
                status: status.as_u16(),
                message,
            },
        }
    }
}

/// Extract the rate-limit reset time from response headers.
///
/// `Retry-After` (seconds from now) takes precedence over the primary
/// limit's `X-RateLimit-Reset` (epoch seconds), which only counts when
/// `X-RateLimit-Remaining` is zero.
pub fn rate_limit_reset(headers: &HeaderMap, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let header = |name: &str| headers.get(name).and_then(|v| v.to_str().ok());

    if let Some(secs) = header("retry-after").and_then(|v| v.trim().parse::<i64>().ok()) {
        return Some(now + chrono::Duration::seconds(secs));
    }

    if header("x-ratelimit-remaining").map(str::trim) == Some("0") {
        let reset = header("x-ratelimit-reset")
            .and_then(|v| v.trim().parse::<i64>().ok())
            .and_then(|epoch| DateTime::from_timestamp(epoch, 0));
        return Some(reset.unwrap_or(now));
    }

    None
}

#[async_trait]
impl RemoteObjects for GitHubForge {
    fn name(&self) -> &'static str {
        "github"
    }

    async fn get_commit(&self, rev: &str) -> Result<CommitDetail, ForgeError> {
        let commit: GitHubCommit = self
            .get_json(&format!("commits/{}", rev))
            .await
            .map_err(|e| not_found_context(e, &format!("commit {}", rev)))?;
        commit.try_into()
    }

    async fn get_tree(&self, commit: &str) -> Result<Vec<TreeEntry>, ForgeError> {
        let tree: GitHubTree = self
            .get_json(&format!("git/trees/{}?recursive=1", commit))
            .await
            .map_err(|e| not_found_context(e, &format!("tree {}", commit)))?;

        if tree.truncated {
            tracing::warn!(commit, "tree listing truncated by the API; some files are missing");
        }

        Ok(tree.tree.into_iter().map(Into::into).collect())
    }

    async fn get_blob(&self, sha: &str) -> Result<Blob, ForgeError> {
        let blob: GitHubBlob = self
            .get_json(&format!("git/blobs/{}", sha))
            .await
            .map_err(|e| not_found_context(e, &format!("blob {}", sha)))?;

        if blob.encoding != BASE64_ENCODING {
            return Err(ForgeError::UnsupportedEncoding {
                sha: sha.to_string(),
                encoding: blob.encoding,
            });
        }

        Ok(Blob {
            encoding: blob.encoding,
            content: blob.content,
        })
    }

    async fn create_branch(&self, branch: &str, commit: &str) -> Result<Reference, ForgeError> {
        let ref_name = format!("refs/heads/{}", branch);
        let body = CreateRefBody {
            ref_name: &ref_name,
            sha: commit,
        };

        let response = self
            .client
            .post(self.repo_url("git/refs"))
            .headers(self.headers()?)
            .json(&body)
            .send()
            .await
            .map_err(|e| ForgeError::NetworkError(e.to_string()))?;

        let created: GitHubRef = match self.handle_response(response).await {
            Err(ForgeError::ApiError {
                status: 422,
                message,
            }) => {
                return Err(if message.to_lowercase().contains("already exists") {
                    ForgeError::AlreadyExists(ref_name)
                } else {
                    ForgeError::InvalidObject(format!("{}: {}", commit, message))
                });
            }
            other => other?,
        };

        Ok(Reference {
            name: created.ref_name,
            sha: Sha::new(created.object.sha),
        })
    }

    async fn get_pull_request(&self, number: u64) -> Result<PullRequest, ForgeError> {
        let pr: GitHubPullRequest = self
            .get_json(&format!("pulls/{}", number))
            .await
            .map_err(|e| not_found_context(e, &format!("pull request #{}", number)))?;
        Ok(pr.into())
    }
}

/// Replace GitHub's bare "Not Found" message with the object that was asked for.
fn not_found_context(err: ForgeError, what: &str) -> ForgeError {
    match err {
        ForgeError::NotFound(_) => ForgeError::NotFound(what.to_string()),
        other => other,
    }
}

// --------------------------------------------------------------------------
// API Request/Response Types
// --------------------------------------------------------------------------

/// Request body for creating a ref.
#[derive(Serialize)]
struct CreateRefBody<'a> {
    #[serde(rename = "ref")]
    ref_name: &'a str,
    sha: &'a str,
}

/// GitHub error response format.
#[derive(Deserialize)]
struct GitHubErrorResponse {
    message: String,
}

/// Commit detail from the repository commits endpoint.
#[derive(Deserialize)]
struct GitHubCommit {
    sha: String,
    parents: Vec<GitHubShaRef>,
    commit: GitHubCommitData,
    #[serde(default)]
    files: Vec<GitHubCommitFile>,
}

#[derive(Deserialize)]
struct GitHubShaRef {
    sha: String,
}

#[derive(Deserialize)]
struct GitHubCommitData {
    author: Option<GitHubSignature>,
}

#[derive(Deserialize)]
struct GitHubSignature {
    #[serde(default)]
    name: String,
    #[serde(default)]
    email: String,
    date: String,
}

#[derive(Deserialize)]
struct GitHubCommitFile {
    filename: String,
    #[serde(default)]
    additions: u64,
    #[serde(default)]
    deletions: u64,
}

/// Recursive tree listing.
#[derive(Deserialize)]
struct GitHubTree {
    tree: Vec<GitHubTreeEntry>,
    #[serde(default)]
    truncated: bool,
}

#[derive(Deserialize)]
struct GitHubTreeEntry {
    path: String,
    #[serde(rename = "type")]
    kind: String,
    sha: String,
}

#[derive(Deserialize)]
struct GitHubBlob {
    content: String,
    encoding: String,
}

/// Created ref.
#[derive(Deserialize)]
struct GitHubRef {
    #[serde(rename = "ref")]
    ref_name: String,
    object: GitHubShaRef,
}

#[derive(Deserialize)]
struct GitHubPullRequest {
    number: u64,
    state: String,
    merge_commit_sha: Option<String>,
}

impl TryFrom<GitHubCommit> for CommitDetail {
    type Error = ForgeError;

    fn try_from(gh: GitHubCommit) -> Result<Self, Self::Error> {
        let author = match gh.commit.author {
            Some(sig) => {
                let date = DateTime::parse_from_rfc3339(&sig.date).map_err(|e| {
                    ForgeError::NetworkError(format!(
                        "commit {}: invalid author date '{}': {}",
                        gh.sha, sig.date, e
                    ))
                })?;
                Some(Signature {
                    name: sig.name,
                    email: sig.email,
                    date,
                })
            }
            None => None,
        };

        Ok(CommitDetail {
            sha: Sha::new(gh.sha),
            parents: gh.parents.into_iter().map(|p| Sha::new(p.sha)).collect(),
            author,
            files: gh
                .files
                .into_iter()
                .map(|f| FileChange::new(f.filename, f.additions, f.deletions))
                .collect(),
        })
    }
}

impl From<GitHubTreeEntry> for TreeEntry {
    fn from(entry: GitHubTreeEntry) -> Self {
        TreeEntry {
            path: entry.path,
            sha: Sha::new(entry.sha),
            kind: EntryKind::from_api_type(&entry.kind),
        }
    }
}

impl From<GitHubPullRequest> for PullRequest {
    fn from(pr: GitHubPullRequest) -> Self {
        PullRequest {
            number: pr.number,
            state: pr.state,
            merge_commit_sha: pr.merge_commit_sha.filter(|s| !s.is_empty()).map(Sha::new),
        }
    }
}
