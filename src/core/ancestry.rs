//! core::ancestry
//!
//! Breadth-first traversal of the commit parent graph through a remote.
//!
//! # Modes
//!
//! - [`AncestryWalker::log`] - bounded history listing
//! - [`AncestryWalker::search_base`] - walk until a designated base commit
//!   is reached, handing every visited commit to a callback
//!
//! Both modes share one [`VisitedSet`], so a commit reachable through
//! several paths (diamond merges) is fetched and reported at most once.
//!
//! # Example
//!
//! ```
//! use gitshim::core::ancestry::AncestryWalker;
//! use gitshim::forge::mock::MockRemote;
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let remote = MockRemote::new()
//!     .with_commit("c3", &["c2"], &[])
//!     .with_commit("c2", &["c1"], &[])
//!     .with_commit("c1", &[], &[]);
//!
//! let history = AncestryWalker::new(&remote).log("c3", 100).await.unwrap();
//! let ids: Vec<&str> = history.iter().map(|s| s.as_str()).collect();
//! assert_eq!(ids, ["c3", "c2", "c1"]);
//! # });
//! ```

use std::collections::HashSet;

use super::error::CoreError;
use super::types::{CommitDetail, Sha};
use crate::forge::RemoteObjects;

/// Default number of parent edges listed by [`AncestryWalker::log`].
pub const DEFAULT_LOG_LIMIT: usize = 100;

/// Default number of levels searched by [`AncestryWalker::search_base`].
pub const DEFAULT_MAX_DEPTH: usize = 100;

/// Commit ids already enqueued or processed during one traversal.
#[derive(Debug, Clone, Default)]
pub struct VisitedSet {
    seen: HashSet<Sha>,
}

impl VisitedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a commit as visited. Returns `false` if it already was.
    pub fn insert(&mut self, sha: Sha) -> bool {
        self.seen.insert(sha)
    }

    pub fn contains(&self, sha: &Sha) -> bool {
        self.seen.contains(sha)
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

/// Breadth-first walker over a remote commit graph.
///
/// A walker is good for one traversal; its visited set is not reset
/// between calls.
pub struct AncestryWalker<'a, R: RemoteObjects + ?Sized> {
    remote: &'a R,
    visited: VisitedSet,
}

impl<'a, R: RemoteObjects + ?Sized> AncestryWalker<'a, R> {
    /// Create a walker over `remote`.
    pub fn new(remote: &'a R) -> Self {
        Self {
            remote,
            visited: VisitedSet::new(),
        }
    }

    /// Get the set of commits seen so far.
    pub fn visited(&self) -> &VisitedSet {
        &self.visited
    }

    async fn fetch(&self, rev: &str) -> Result<CommitDetail, CoreError> {
        tracing::debug!(rev, "fetching commit");
        self.remote
            .get_commit(rev)
            .await
            .map_err(|e| CoreError::remote("get_commit", rev, e))
    }

    /// List the ancestry of `start` in breadth-first emission order.
    ///
    /// The first id is the resolved start commit. Each newly discovered
    /// parent is emitted once; listing stops after `limit` parents or when
    /// history runs out. A parent is only fetched when its own parents are
    /// needed, so stopping at the limit saves the remaining requests.
    pub async fn log(&mut self, start: &str, limit: usize) -> Result<Vec<Sha>, CoreError> {
        let root = self.fetch(start).await?;
        self.visited.insert(root.sha.clone());

        let mut out = vec![root.sha.clone()];
        let mut edges = 0usize;
        let mut level = vec![root];

        while !level.is_empty() && edges < limit {
            let mut next = Vec::new();
            'level: for commit in &level {
                for parent in &commit.parents {
                    if !self.visited.insert(parent.clone()) {
                        continue;
                    }
                    out.push(parent.clone());
                    next.push(parent.clone());
                    edges += 1;
                    if edges >= limit {
                        break 'level;
                    }
                }
            }

            if edges >= limit {
                break;
            }

            level = Vec::with_capacity(next.len());
            for sha in &next {
                level.push(self.fetch(sha.as_str()).await?);
            }
        }

        Ok(out)
    }

    /// Walk from `start` until a parent edge reaches `base`.
    ///
    /// `visit` is called once for every commit fetched: each commit on the
    /// frontier, then the base commit itself when it is found. Returns the
    /// number of commits visited.
    ///
    /// When `start == base` nothing is fetched and `0` is returned.
    ///
    /// # Errors
    ///
    /// - [`CoreError::BaseNotFound`] if `max_depth` levels are exhausted or
    ///   history ends without reaching `base`
    /// - [`CoreError::Remote`] for any remote failure
    pub async fn search_base<F>(
        &mut self,
        start: &str,
        base: &str,
        max_depth: usize,
        mut visit: F,
    ) -> Result<usize, CoreError>
    where
        F: FnMut(&CommitDetail),
    {
        if start == base {
            return Ok(0);
        }

        let base_sha = Sha::new(base);
        let mut visits = 0usize;
        let mut frontier = vec![Sha::new(start)];
        self.visited.insert(Sha::new(start));

        for depth in 0..max_depth {
            if frontier.is_empty() {
                break;
            }
            tracing::debug!(depth, width = frontier.len(), "searching for base");

            let mut next = Vec::new();
            for rev in &frontier {
                let commit = self.fetch(rev.as_str()).await?;
                self.visited.insert(commit.sha.clone());
                visit(&commit);
                visits += 1;

                for parent in &commit.parents {
                    if *parent == base_sha {
                        let base_commit = self.fetch(parent.as_str()).await?;
                        visit(&base_commit);
                        tracing::debug!(base, depth, visits = visits + 1, "base found");
                        return Ok(visits + 1);
                    }
                    if self.visited.insert(parent.clone()) {
                        next.push(parent.clone());
                    }
                }
            }
            frontier = next;
        }

        Err(CoreError::BaseNotFound {
            base: base.to_string(),
            start: start.to_string(),
            depth: max_depth,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forge::mock::{MockRemote, Op};
    use crate::forge::ForgeError;
    use proptest::prelude::*;

    fn ids(shas: &[Sha]) -> Vec<&str> {
        shas.iter().map(Sha::as_str).collect()
    }

    /// c3 <- c2 <- c1
    fn linear() -> MockRemote {
        MockRemote::new()
            .with_commit("c3", &["c2"], &[])
            .with_commit("c2", &["c1"], &[])
            .with_commit("c1", &[], &[])
    }

    /// d <- {b, c} <- a
    fn diamond() -> MockRemote {
        MockRemote::new()
            .with_commit("d", &["b", "c"], &[])
            .with_commit("b", &["a"], &[])
            .with_commit("c", &["a"], &[])
            .with_commit("a", &[], &[])
    }

    mod log {
        use super::*;

        #[tokio::test]
        async fn linear_history_in_order() {
            let remote = linear();
            let out = AncestryWalker::new(&remote).log("c3", 2).await.unwrap();
            assert_eq!(ids(&out), ["c3", "c2", "c1"]);
        }

        #[tokio::test]
        async fn start_is_reported_resolved() {
            let remote = linear().with_alias("main", "c3");
            let out = AncestryWalker::new(&remote).log("main", 10).await.unwrap();
            assert_eq!(ids(&out), ["c3", "c2", "c1"]);
        }

        #[tokio::test]
        async fn limit_counts_parent_edges() {
            let remote = linear();
            let out = AncestryWalker::new(&remote).log("c3", 1).await.unwrap();
            assert_eq!(ids(&out), ["c3", "c2"]);
            // c2 was listed but never expanded
            assert_eq!(remote.commit_fetches(), vec!["c3"]);
        }

        #[tokio::test]
        async fn diamond_reports_merge_base_once() {
            let remote = diamond();
            let out = AncestryWalker::new(&remote).log("d", 100).await.unwrap();
            assert_eq!(ids(&out), ["d", "b", "c", "a"]);
            assert_eq!(remote.commit_fetches(), vec!["d", "b", "c", "a"]);
        }

        #[tokio::test]
        async fn root_commit_alone() {
            let remote = MockRemote::new().with_commit("r", &[], &[]);
            let out = AncestryWalker::new(&remote).log("r", 100).await.unwrap();
            assert_eq!(ids(&out), ["r"]);
        }

        #[tokio::test]
        async fn unknown_start_is_remote_not_found() {
            let remote = MockRemote::new();
            let err = AncestryWalker::new(&remote)
                .log("nope", 100)
                .await
                .unwrap_err();
            assert!(err.is_not_found());
            assert!(err.to_string().starts_with("get_commit nope:"));
        }
    }

    mod search_base {
        use super::*;

        #[tokio::test]
        async fn visits_start_through_base() {
            let remote = linear();
            let mut seen = Vec::new();
            let visits = AncestryWalker::new(&remote)
                .search_base("c3", "c1", 100, |c| seen.push(c.sha.clone()))
                .await
                .unwrap();

            assert_eq!(visits, 3);
            assert_eq!(ids(&seen), ["c3", "c2", "c1"]);
        }

        #[tokio::test]
        async fn base_equal_to_start_fetches_nothing() {
            let remote = linear();
            let visits = AncestryWalker::new(&remote)
                .search_base("c2", "c2", 100, |_| panic!("no visits expected"))
                .await
                .unwrap();
            assert_eq!(visits, 0);
            assert!(remote.operations().is_empty());
        }

        #[tokio::test]
        async fn unreachable_base_is_not_found() {
            let remote = linear();
            let err = AncestryWalker::new(&remote)
                .search_base("c3", "elsewhere", 100, |_| {})
                .await
                .unwrap_err();
            assert!(matches!(err, CoreError::BaseNotFound { depth: 100, .. }));
        }

        #[tokio::test]
        async fn base_beyond_depth_is_not_found() {
            let remote = linear();
            let err = AncestryWalker::new(&remote)
                .search_base("c3", "c1", 1, |_| {})
                .await
                .unwrap_err();
            assert!(matches!(err, CoreError::BaseNotFound { depth: 1, .. }));
            assert_eq!(remote.commit_fetches(), vec!["c3"]);
        }

        #[tokio::test]
        async fn diamond_never_revisits() {
            // e <- d <- {b, c} <- a, searching for a missing base walks all
            let remote = diamond().with_commit("e", &["d"], &[]);
            let mut walker = AncestryWalker::new(&remote);
            let result = walker.search_base("e", "zzz", 100, |_| {}).await;

            assert!(result.is_err());
            assert_eq!(remote.commit_fetches(), vec!["e", "d", "b", "c", "a"]);
            assert_eq!(walker.visited().len(), 5);
        }

        #[tokio::test]
        async fn remote_failure_aborts_with_context() {
            let remote = linear();
            remote.push_failure(Op::GetCommit, ForgeError::NetworkError("reset".into()));
            let err = AncestryWalker::new(&remote)
                .search_base("c3", "c1", 100, |_| {})
                .await
                .unwrap_err();
            assert_eq!(err.to_string(), "get_commit c3: network error: reset");
        }
    }

    /// Build a random DAG: commit `i` has parents drawn from `0..i`.
    fn random_dag(parents: &[Vec<usize>]) -> MockRemote {
        let mut remote = MockRemote::new();
        for (i, ps) in parents.iter().enumerate() {
            let names: Vec<String> = ps
                .iter()
                .filter(|_| i > 0)
                .map(|p| format!("c{}", p % i.max(1)))
                .collect();
            let refs: Vec<&str> = names.iter().map(String::as_str).collect();
            remote = remote.with_commit(&format!("c{}", i), &refs, &[]);
        }
        remote
    }

    proptest! {
        #[test]
        fn traversal_never_fetches_a_commit_twice(
            parents in prop::collection::vec(prop::collection::vec(0usize..64, 0..3), 1..24)
        ) {
            let remote = random_dag(&parents);
            let tip = format!("c{}", parents.len() - 1);
            let rt = tokio::runtime::Runtime::new().unwrap();

            let log = rt.block_on(AncestryWalker::new(&remote).log(&tip, usize::MAX)).unwrap();
            let unique: HashSet<&Sha> = log.iter().collect();
            prop_assert_eq!(unique.len(), log.len());

            let search_remote = random_dag(&parents);
            let _ = rt.block_on(
                AncestryWalker::new(&search_remote).search_base(&tip, "missing", 1000, |_| {}),
            );
            let fetches = search_remote.commit_fetches();
            let unique: HashSet<&String> = fetches.iter().collect();
            prop_assert_eq!(unique.len(), fetches.len());
        }

        #[test]
        fn base_in_linear_history_is_found_within_budget(len in 2usize..30, back in 1usize..29) {
            prop_assume!(back < len);
            let mut remote = MockRemote::new();
            for i in 0..len {
                let parent = if i == 0 { vec![] } else { vec![format!("c{}", i - 1)] };
                let refs: Vec<&str> = parent.iter().map(String::as_str).collect();
                remote = remote.with_commit(&format!("c{}", i), &refs, &[]);
            }
            let tip = format!("c{}", len - 1);
            let base = format!("c{}", len - 1 - back);
            let rt = tokio::runtime::Runtime::new().unwrap();

            let found = rt.block_on(
                AncestryWalker::new(&remote).search_base(&tip, &base, back, |_| {}),
            );
            prop_assert_eq!(found.unwrap(), back + 1);

            let short = rt.block_on(
                AncestryWalker::new(&remote).search_base(&tip, &base, back - 1, |_| {}),
            );
            let short_is_not_found = matches!(short, Err(CoreError::BaseNotFound { .. }));
            prop_assert!(short_is_not_found);
        }
    }
}
