//! git::config_file
//!
//! Minimal `.git/config` reader for the remote URL.
//!
//! Used when the repository cannot be opened through git2 (for example a
//! checkout whose object database is incomplete) but the remote fallback
//! still needs to know which repository to talk to. Only the `url` key of a
//! `[remote "<name>"]` section is understood.

use std::fs;
use std::path::{Path, PathBuf};

/// Find `.git/config` in `start` or any of its ancestors.
pub fn find_git_config(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .map(|dir| dir.join(".git").join("config"))
        .find(|path| path.is_file())
}

/// Read the URL of remote `name` from the repository containing `start`.
pub fn remote_url_from_config(start: &Path, name: &str) -> Option<String> {
    let path = find_git_config(start)?;
    let contents = fs::read_to_string(&path).ok()?;
    let url = parse_remote_url(&contents, name);
    tracing::debug!(
        config = %path.display(),
        remote = name,
        found = url.is_some(),
        "scanned git config"
    );
    url
}

/// Extract the `url` of `[remote "<name>"]` from config file contents.
///
/// Section and key names are case-insensitive; the subsection (remote name)
/// is case-sensitive. The first `url` wins.
pub fn parse_remote_url(contents: &str, name: &str) -> Option<String> {
    let mut in_section = false;

    for raw in contents.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            continue;
        }

        if let Some(header) = line.strip_prefix('[') {
            let header = header.split(']').next().unwrap_or("").trim();
            in_section = section_matches(header, name);
            continue;
        }

        if !in_section {
            continue;
        }

        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        if key.trim().eq_ignore_ascii_case("url") {
            let value = strip_comment(value.trim());
            let value = value.trim().trim_matches('"');
            if !value.is_empty() {
                return Some(value.to_string());
            }
        }
    }

    None
}

fn section_matches(header: &str, name: &str) -> bool {
    let Some((section, rest)) = header.split_once(char::is_whitespace) else {
        return false;
    };
    section.eq_ignore_ascii_case("remote") && rest.trim().trim_matches('"') == name
}

/// Drop a trailing `#` or `;` comment outside of quotes.
fn strip_comment(value: &str) -> &str {
    let mut quoted = false;
    for (i, c) in value.char_indices() {
        match c {
            '"' => quoted = !quoted,
            '#' | ';' if !quoted => return &value[..i],
            _ => {}
        }
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const CONFIG: &str = r#"
[core]
	repositoryformatversion = 0
	bare = false
[remote "upstream"]
	url = https://github.com/upstream/project.git
	fetch = +refs/heads/*:refs/remotes/upstream/*
[remote "origin"]
	url = git@github.com:me/project.git ; my fork
	fetch = +refs/heads/*:refs/remotes/origin/*
[branch "main"]
	remote = origin
"#;

    #[test]
    fn finds_named_remote() {
        assert_eq!(
            parse_remote_url(CONFIG, "origin").as_deref(),
            Some("git@github.com:me/project.git")
        );
        assert_eq!(
            parse_remote_url(CONFIG, "upstream").as_deref(),
            Some("https://github.com/upstream/project.git")
        );
    }

    #[test]
    fn missing_remote_is_none() {
        assert_eq!(parse_remote_url(CONFIG, "fork"), None);
        assert_eq!(parse_remote_url("", "origin"), None);
    }

    #[test]
    fn section_name_is_case_insensitive() {
        let config = "[Remote \"origin\"]\n  URL = \"https://github.com/o/r\"\n";
        assert_eq!(
            parse_remote_url(config, "origin").as_deref(),
            Some("https://github.com/o/r")
        );
    }

    #[test]
    fn reads_from_ancestor_directory() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join(".git")).unwrap();
        fs::create_dir_all(temp.path().join("src/deep")).unwrap();
        fs::write(temp.path().join(".git/config"), CONFIG).unwrap();

        let url = remote_url_from_config(&temp.path().join("src/deep"), "origin");
        assert_eq!(url.as_deref(), Some("git@github.com:me/project.git"));
    }
}
