//! Integration tests for the local repository interface.
//!
//! These tests use real git repositories created via tempfile to verify
//! that the Git interface agrees with the git command line.

use std::path::Path;
use std::process::Command;

use tempfile::TempDir;

use gitshim::core::types::Sha;
use gitshim::git::{Git, GitError};

/// Test fixture that creates a real git repository.
struct TestRepo {
    dir: TempDir,
}

impl TestRepo {
    /// Create a new test repository with an initial commit.
    fn new() -> Self {
        let dir = TempDir::new().expect("failed to create temp dir");

        run_git(dir.path(), &["init"]);
        run_git(dir.path(), &["config", "user.email", "test@example.com"]);
        run_git(dir.path(), &["config", "user.name", "Test User"]);

        let repo = Self { dir };
        repo.commit_file("README.md", "# Test Repo\n", "Initial commit");
        repo
    }

    fn path(&self) -> &Path {
        self.dir.path()
    }

    fn git(&self) -> Git {
        Git::open(self.path()).expect("failed to open test repo")
    }

    /// Write a file and commit it, returning the new commit id.
    fn commit_file(&self, path: &str, content: &str, message: &str) -> String {
        let full = self.path().join(path);
        if let Some(parent) = full.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(full, content).unwrap();
        run_git(self.path(), &["add", path]);
        run_git(self.path(), &["commit", "-m", message]);
        self.rev_parse_raw("HEAD")
    }

    /// Resolve a revision with the git command line.
    fn rev_parse_raw(&self, rev: &str) -> String {
        let output = Command::new("git")
            .args(["rev-parse", rev])
            .current_dir(self.path())
            .output()
            .expect("git rev-parse failed");
        String::from_utf8(output.stdout).unwrap().trim().to_string()
    }
}

/// Run a git command in the given directory with fixed dates.
fn run_git(dir: &Path, args: &[&str]) {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .env("GIT_AUTHOR_DATE", "2021-06-01T12:30:00+0200")
        .env("GIT_COMMITTER_DATE", "2021-06-01T12:30:00+0200")
        .output()
        .expect("git command failed");

    if !output.status.success() {
        panic!(
            "git {:?} failed: {}",
            args,
            String::from_utf8_lossy(&output.stderr)
        );
    }
}

mod open {
    use super::*;

    #[test]
    fn discovers_from_subdirectory() {
        let repo = TestRepo::new();
        repo.commit_file("src/lib.rs", "fn main() {}\n", "Add lib");

        let git = Git::open(&repo.path().join("src")).unwrap();
        let workdir = git.workdir().unwrap().canonicalize().unwrap();
        assert_eq!(workdir, repo.path().canonicalize().unwrap());
    }

    #[test]
    fn not_a_repo() {
        let temp = TempDir::new().unwrap();
        assert!(matches!(
            Git::open(temp.path()),
            Err(GitError::NotARepo { .. })
        ));
    }

    #[test]
    fn remote_url_is_read() {
        let repo = TestRepo::new();
        run_git(
            repo.path(),
            &["remote", "add", "origin", "https://github.com/octo/repo.git"],
        );

        let git = repo.git();
        assert_eq!(
            git.remote_url("origin").unwrap().as_deref(),
            Some("https://github.com/octo/repo.git")
        );
        assert_eq!(git.remote_url("upstream").unwrap(), None);
    }
}

mod queries {
    use super::*;

    #[test]
    fn rev_parse_matches_git() {
        let repo = TestRepo::new();
        let head = repo.commit_file("a.txt", "a\n", "Add a");

        assert_eq!(repo.git().rev_parse("HEAD").unwrap(), Sha::new(head.clone()));
        assert_eq!(repo.git().rev_parse(&head[..10]).unwrap(), Sha::new(head));
    }

    #[test]
    fn unknown_revision() {
        let repo = TestRepo::new();
        assert!(matches!(
            repo.git().rev_parse("does-not-exist"),
            Err(GitError::RevisionNotFound { .. })
        ));
    }

    #[test]
    fn author_date_keeps_offset() {
        let repo = TestRepo::new();
        let date = repo.git().author_date("HEAD").unwrap();
        assert_eq!(
            date.format("%Y-%m-%d %H:%M:%S %z").to_string(),
            "2021-06-01 12:30:00 +0200"
        );
    }

    #[test]
    fn log_starts_at_commit_and_is_bounded() {
        let repo = TestRepo::new();
        repo.commit_file("a.txt", "1\n", "one");
        repo.commit_file("a.txt", "2\n", "two");
        let head = repo.commit_file("a.txt", "3\n", "three");

        let all = repo.git().log("HEAD", 100).unwrap();
        assert_eq!(all.len(), 4);
        assert_eq!(all[0], Sha::new(head));

        // Like `git log -2`: the starting commit counts.
        let bounded = repo.git().log("HEAD", 2).unwrap();
        assert_eq!(bounded.len(), 2);
        assert_eq!(repo.git().log("HEAD", 1).unwrap().len(), 1);
    }

    #[test]
    fn read_file_at_older_commit() {
        let repo = TestRepo::new();
        let first = repo.commit_file("a.txt", "first\n", "one");
        repo.commit_file("a.txt", "second\n", "two");

        assert_eq!(repo.git().read_file_at(&first, "a.txt").unwrap(), b"first\n");
        assert_eq!(repo.git().read_file_at("HEAD", "a.txt").unwrap(), b"second\n");
    }

    #[test]
    fn read_file_missing_path() {
        let repo = TestRepo::new();
        assert!(matches!(
            repo.git().read_file_at("HEAD", "nope.txt"),
            Err(GitError::PathNotFound { .. })
        ));
    }

    #[test]
    fn read_directory_is_not_a_file() {
        let repo = TestRepo::new();
        repo.commit_file("dir/a.txt", "a\n", "nested");
        assert!(matches!(
            repo.git().read_file_at("HEAD", "dir"),
            Err(GitError::NotAFile { .. })
        ));
    }
}

mod numstat {
    use super::*;

    #[test]
    fn counts_lines_between_commits() {
        let repo = TestRepo::new();
        let base = repo.rev_parse_raw("HEAD");
        repo.commit_file("x.txt", "a\nb\nc\n", "add x");
        repo.commit_file("x.txt", "a\nB\nc\nd\n", "edit x");

        let stats = repo.git().diff_numstat(&base, "HEAD").unwrap();
        assert_eq!(stats.lines(), vec!["4\t0\tx.txt"]);
    }

    #[test]
    fn same_commit_is_empty() {
        let repo = TestRepo::new();
        let stats = repo.git().diff_numstat("HEAD", "HEAD").unwrap();
        assert!(stats.is_empty());
    }

    #[test]
    fn binary_file_is_reported_with_dashes() {
        let repo = TestRepo::new();
        let base = repo.rev_parse_raw("HEAD");
        std::fs::write(repo.path().join("logo.bin"), [0u8, 1, 2, 0, 255, 0]).unwrap();
        run_git(repo.path(), &["add", "logo.bin"]);
        run_git(repo.path(), &["commit", "-m", "add binary"]);
        repo.commit_file("notes.txt", "a\n", "add notes");

        let stats = repo.git().diff_numstat(&base, "HEAD").unwrap();
        assert_eq!(stats.lines(), vec!["-\t-\tlogo.bin", "1\t0\tnotes.txt"]);
    }

    #[test]
    fn modification_counts_both_sides() {
        let repo = TestRepo::new();
        let base = repo.commit_file("x.txt", "a\nb\n", "add x");
        repo.commit_file("x.txt", "a\nc\n", "edit x");

        let stats = repo.git().diff_numstat(&base, "HEAD").unwrap();
        assert_eq!(stats.lines(), vec!["1\t1\tx.txt"]);
    }
}

mod working_tree {
    use super::*;

    #[test]
    fn tracked_files_are_sorted_and_nested() {
        let repo = TestRepo::new();
        repo.commit_file("src/main.rs", "fn main() {}\n", "add main");

        let files: Vec<String> = repo
            .git()
            .tracked_files("HEAD")
            .unwrap()
            .iter()
            .map(|p| p.to_string_lossy().into_owned())
            .collect();
        assert_eq!(files, vec!["README.md", "src/main.rs"]);
    }

    #[test]
    fn reset_hard_restores_content() {
        let repo = TestRepo::new();
        let first = repo.commit_file("a.txt", "first\n", "one");
        repo.commit_file("a.txt", "second\n", "two");

        let sha = repo.git().reset_hard(&first).unwrap();

        assert_eq!(sha, Sha::new(first.clone()));
        assert_eq!(repo.rev_parse_raw("HEAD"), first);
        assert_eq!(
            std::fs::read_to_string(repo.path().join("a.txt")).unwrap(),
            "first\n"
        );
    }
}

mod fetch_checkout {
    use super::*;

    /// A bare "origin" holding the history of `upstream`, and an empty
    /// clone target that only knows the remote URL.
    fn shallow_setup() -> (TestRepo, TempDir, TempDir) {
        let upstream = TestRepo::new();
        upstream.commit_file("src/app.rs", "fn app() {}\n", "add app");

        let origin = TempDir::new().unwrap();
        run_git(
            origin.path(),
            &["clone", "--bare", upstream.path().to_str().unwrap(), "."],
        );

        let local = TempDir::new().unwrap();
        run_git(local.path(), &["init"]);
        run_git(
            local.path(),
            &["remote", "add", "origin", origin.path().to_str().unwrap()],
        );

        (upstream, origin, local)
    }

    #[test]
    fn missing_commit_is_fetched_and_checked_out() {
        let (upstream, _origin, local) = shallow_setup();
        let head = upstream.rev_parse_raw("HEAD");
        let git = Git::open(local.path()).unwrap();

        assert!(git.reset_hard(&head).is_err());

        let sha = git.fetch_and_checkout("origin", &head).unwrap();

        assert_eq!(sha, Sha::new(head.clone()));
        assert_eq!(git.rev_parse("HEAD").unwrap(), Sha::new(head));
        assert_eq!(
            std::fs::read_to_string(local.path().join("src/app.rs")).unwrap(),
            "fn app() {}\n"
        );
    }

    #[test]
    fn unknown_remote_fails() {
        let (upstream, _origin, local) = shallow_setup();
        let head = upstream.rev_parse_raw("HEAD");
        let git = Git::open(local.path()).unwrap();

        assert!(matches!(
            git.fetch_and_checkout("upstream", &head),
            Err(GitError::Internal { .. })
        ));
    }

    #[test]
    fn commit_absent_on_remote_fails() {
        let (_upstream, _origin, local) = shallow_setup();
        let git = Git::open(local.path()).unwrap();

        assert!(git
            .fetch_and_checkout("origin", "1111111111111111111111111111111111111111")
            .is_err());
        assert!(!local.path().join("src/app.rs").exists());
    }
}
