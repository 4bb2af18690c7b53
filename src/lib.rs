//! gitshim - Git plumbing commands with a GitHub API fallback
//!
//! CI checkouts are often shallow or partial: the commit a job needs may be
//! missing from the local object database. gitshim answers a small set of
//! plumbing queries (log, numstat, file content, author date, rev-parse,
//! reset) from the local repository when it can, and from the GitHub REST
//! API when it cannot.
//!
//! # Architecture
//!
//! - [`cli`] - Argument parsing, local-then-remote dispatch, output
//! - [`core`] - Remote algorithms: ancestry walk, numstat aggregation,
//!   tree materialization, single lookups; configuration
//! - [`git`] - Single interface to the local repository
//! - [`forge`] - Remote object client, GitHub implementation, rate-limit retry
//!
//! # Invariants
//!
//! 1. No commit is fetched twice during one walk
//! 2. Walks are bounded by a configurable budget
//! 3. Nothing is written to disk before every path in a tree is validated
//! 4. Rate-limited requests are retried after the advertised reset time

pub mod cli;
pub mod core;
pub mod forge;
pub mod git;
