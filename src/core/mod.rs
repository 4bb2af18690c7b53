//! core
//!
//! Domain types and the algorithms that answer git queries from the remote.
//!
//! # Modules
//!
//! - [`types`] - Commit ids, tree entries, blobs, commit details
//! - [`ancestry`] - Bounded breadth-first history walk and base search
//! - [`numstat`] - Per-file line count aggregation
//! - [`materialize`] - Writing a commit's file set to disk
//! - [`resolve`] - Single-request lookups and branch creation
//! - [`config`] - Configuration schema and loading
//! - [`error`] - Errors raised by the remote algorithms
//!
//! Everything here talks to the remote through
//! [`RemoteObjects`](crate::forge::RemoteObjects), so it runs unchanged
//! against the mock client in tests.

pub mod ancestry;
pub mod config;
pub mod error;
pub mod materialize;
pub mod numstat;
pub mod resolve;
pub mod types;

pub use error::CoreError;
