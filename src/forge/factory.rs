//! forge::factory
//!
//! Remote selection and creation.
//!
//! # Design
//!
//! Commands never construct a concrete remote client. They hand the
//! repository's remote URL, a token and the optional configured API base to
//! [`create_remote`], which parses the URL, applies the host guard and wraps
//! the client in the rate-limit retry decorator.
//!
//! # Host guard
//!
//! Only `github.com` maps to a known API base. Any other host is accepted
//! only when an API base was configured for it (GitHub Enterprise);
//! otherwise creation fails with [`ForgeError::Unsupported`].
//!
//! # Example
//!
//! ```ignore
//! use gitshim::forge::{create_remote, RetryPolicy};
//!
//! let remote = create_remote("git@github.com:owner/repo.git", token, None, RetryPolicy::default())?;
//! let commit = remote.get_commit("main").await?;
//! ```

use super::github::{GitHubForge, DEFAULT_API_BASE};
use super::retry::{RetryPolicy, RetryingRemote};
use super::traits::{ForgeError, RemoteObjects};

/// The host whose API base is known without configuration.
pub const GITHUB_HOST: &str = "github.com";

/// Host, owner and repository name parsed from a remote URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoIdentity {
    pub host: String,
    pub owner: String,
    pub repo: String,
}

impl RepoIdentity {
    /// Parse a git remote URL.
    ///
    /// Accepted forms:
    /// - `https://host/owner/repo(.git)` and `http://...`
    /// - `ssh://[user@]host[:port]/owner/repo(.git)`
    /// - `user@host:owner/repo(.git)` (scp-like)
    ///
    /// # Example
    ///
    /// ```
    /// use gitshim::forge::RepoIdentity;
    ///
    /// let id = RepoIdentity::parse("git@github.com:octocat/hello-world.git").unwrap();
    /// assert_eq!(id.owner, "octocat");
    /// assert_eq!(id.repo, "hello-world");
    /// ```
    pub fn parse(url: &str) -> Option<Self> {
        let url = url.trim();

        if let Some(rest) = url
            .strip_prefix("https://")
            .or_else(|| url.strip_prefix("http://"))
            .or_else(|| url.strip_prefix("ssh://"))
        {
            let (authority, path) = rest.split_once('/')?;
            // Drop credentials and port.
            let host = authority.rsplit('@').next().unwrap_or(authority);
            let host = host.split(':').next().unwrap_or(host);
            return Self::from_parts(host, path);
        }

        // scp-like syntax: user@host:owner/repo.git
        let (user_host, path) = url.split_once(':')?;
        if user_host.contains('/') {
            return None;
        }
        let host = user_host.rsplit('@').next().unwrap_or(user_host);
        Self::from_parts(host, path)
    }

    fn from_parts(host: &str, path: &str) -> Option<Self> {
        let path = path.trim_matches('/');
        let path = path.strip_suffix(".git").unwrap_or(path);
        let (owner, repo) = path.split_once('/')?;
        if host.is_empty() || owner.is_empty() || repo.is_empty() || repo.contains('/') {
            return None;
        }
        Some(Self {
            host: host.to_lowercase(),
            owner: owner.to_string(),
            repo: repo.to_string(),
        })
    }

    /// Check whether the repository lives on github.com.
    pub fn is_github_com(&self) -> bool {
        self.host == GITHUB_HOST
    }
}

impl std::fmt::Display for RepoIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}/{}", self.host, self.owner, self.repo)
    }
}

/// Pick the API base for a repository.
///
/// A configured base always wins. Without one, only github.com is served.
pub fn api_base_for(identity: &RepoIdentity, configured: Option<&str>) -> Result<String, ForgeError> {
    match configured {
        Some(base) if !base.trim().is_empty() => Ok(base.trim().to_string()),
        _ if identity.is_github_com() => Ok(DEFAULT_API_BASE.to_string()),
        _ => Err(ForgeError::Unsupported(identity.host.clone())),
    }
}

/// Create a rate-limit-aware remote client from a remote URL.
///
/// # Errors
///
/// - `ForgeError::Unsupported` if the URL does not parse or the host has no API base
pub fn create_remote(
    remote_url: &str,
    token: &str,
    api_base: Option<&str>,
    policy: RetryPolicy,
) -> Result<Box<dyn RemoteObjects>, ForgeError> {
    let identity = RepoIdentity::parse(remote_url)
        .ok_or_else(|| ForgeError::Unsupported(format!("remote URL '{}'", remote_url)))?;
    let base = api_base_for(&identity, api_base)?;

    tracing::debug!(%identity, api_base = %base, "using remote API");

    let forge = GitHubForge::with_api_base(token, identity.owner, identity.repo, base);
    Ok(Box::new(RetryingRemote::new(forge, policy)))
}
