//! forge
//!
//! Remote access to a repository's object graph over a hosting service API.
//!
//! # Architecture
//!
//! The [`RemoteObjects`] trait is the seam between the fallback algorithms in
//! [`crate::core`] and the network. Commands obtain a client through
//! [`create_remote`], which always returns it wrapped in [`RetryingRemote`],
//! so rate limiting is handled in exactly one place.
//!
//! # Modules
//!
//! - `traits`: `RemoteObjects` trait, `ForgeError` and result types
//! - [`github`]: GitHub REST implementation
//! - `retry`: rate-limit retry policy and decorator
//! - [`mock`]: in-memory implementation for deterministic testing
//! - `factory`: remote URL parsing and client creation

mod factory;
pub mod github;
pub mod mock;
mod retry;
mod traits;

pub use factory::{api_base_for, create_remote, RepoIdentity, GITHUB_HOST};
pub use retry::{with_rate_limit_retry, RetryPolicy, RetryingRemote, DEFAULT_RATE_LIMIT_MARGIN};
pub use traits::*;
