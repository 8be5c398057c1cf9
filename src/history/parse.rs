use anyhow::{Context, Result, anyhow};
use serde_json::Value;

use crate::graph::record::{Author, CommitRecord, CommitRef, RefKind};

pub(super) const FIELD_SEPARATOR: char = '\u{1f}';
pub(super) const RECORD_SEPARATOR: u8 = 0x1e;

/// `git log` pretty format matching [`parse_log_record`].
pub(super) const LOG_FORMAT: &str = "--format=%H%x1f%P%x1f%D%x1f%an%x1f%ae%x1f%ct%x1f%s%x1e";

const FIELD_COUNT: usize = 7;

/// Parses one `LOG_FORMAT` record. Returns `None` for the blank tail after the
/// last separator.
pub(super) fn parse_log_record(raw: &str) -> Result<Option<CommitRecord>> {
    let raw = raw.trim_start_matches(['\n', '\r']);
    let raw = raw.strip_suffix(RECORD_SEPARATOR as char).unwrap_or(raw);
    if raw.trim().is_empty() {
        return Ok(None);
    }

    let fields = raw.splitn(FIELD_COUNT, FIELD_SEPARATOR).collect::<Vec<_>>();
    let [hash, parents, decorations, author_name, author_email, timestamp, subject] =
        fields.as_slice()
    else {
        return Err(anyhow!(
            "git log record has {} fields, expected {FIELD_COUNT}: {raw:?}",
            fields.len()
        ));
    };

    let hash = hash.trim();
    if hash.is_empty() {
        return Err(anyhow!("git log record without a commit hash"));
    }

    let timestamp = timestamp
        .trim()
        .parse::<i64>()
        .with_context(|| format!("invalid commit timestamp for {hash}: {timestamp:?}"))?;

    Ok(Some(CommitRecord {
        hash: hash.to_owned(),
        parents: parents.split_whitespace().map(str::to_owned).collect(),
        refs: parse_decorations(decorations),
        author: Author {
            name: author_name.to_string(),
            email: author_email.to_string(),
        },
        timestamp,
        subject: subject.trim_end().to_owned(),
    }))
}

pub(super) fn parse_log_output(raw: &str) -> Result<Vec<CommitRecord>> {
    let mut commits = Vec::new();
    for record in raw.split(RECORD_SEPARATOR as char) {
        if let Some(commit) = parse_log_record(record)? {
            commits.push(commit);
        }
    }
    Ok(commits)
}

/// Parses `%D` output produced with `--decorate=full`, e.g.
/// `HEAD -> refs/heads/main, refs/remotes/origin/main, tag: refs/tags/v1`.
pub(super) fn parse_decorations(raw: &str) -> Vec<CommitRef> {
    let mut refs = Vec::new();
    for entry in raw.split(',').map(str::trim).filter(|entry| !entry.is_empty()) {
        let (is_head, name) = match entry.split_once("->") {
            Some((head, target)) if head.trim() == "HEAD" => (true, target.trim()),
            Some((_, target)) => (false, target.trim()),
            None => (false, entry),
        };

        if name == "HEAD" {
            // Detached head.
            refs.push(CommitRef::new("HEAD", RefKind::LocalBranch).head());
            continue;
        }

        let name = name.strip_prefix("tag: ").unwrap_or(name);
        let parsed = if let Some(branch) = name.strip_prefix("refs/heads/") {
            Some(CommitRef::new(branch, RefKind::LocalBranch))
        } else if let Some(remote) = name.strip_prefix("refs/remotes/") {
            (!remote.ends_with("/HEAD")).then(|| CommitRef::new(remote, RefKind::RemoteBranch))
        } else {
            name.strip_prefix("refs/tags/")
                .map(|tag| CommitRef::new(tag, RefKind::Tag))
        };

        match parsed {
            Some(commit_ref) if is_head => refs.push(commit_ref.head()),
            Some(commit_ref) => refs.push(commit_ref),
            None => log::debug!("ignoring decoration {entry:?}"),
        }
    }
    refs
}

/// Accepts a bare array of commits or an object with a `commits` array.
pub(super) fn parse_commit_json(raw: &str) -> Result<Vec<CommitRecord>> {
    let parsed: Value = serde_json::from_str(raw).context("invalid commit JSON")?;
    let list = match parsed {
        Value::Array(items) => Value::Array(items),
        Value::Object(mut object) => object
            .remove("commits")
            .ok_or_else(|| anyhow!("commit JSON object has no \"commits\" field"))?,
        _ => return Err(anyhow!("unexpected JSON type for commit list")),
    };

    serde_json::from_value(list).context("invalid commit entry in JSON")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_full_log_record() {
        let raw = "\nabc123\u{1f}p1 p2\u{1f}HEAD -> refs/heads/main, tag: refs/tags/v1.0\u{1f}Ada\u{1f}ada@example.com\u{1f}1700000000\u{1f}Merge feature\u{1e}";
        let commit = parse_log_record(raw).expect("parses").expect("not blank");

        assert_eq!(commit.hash, "abc123");
        assert_eq!(commit.parents, vec!["p1", "p2"]);
        assert_eq!(commit.author.email, "ada@example.com");
        assert_eq!(commit.timestamp, 1_700_000_000);
        assert_eq!(commit.subject, "Merge feature");
        assert_eq!(
            commit.refs,
            vec![
                CommitRef::new("main", RefKind::LocalBranch).head(),
                CommitRef::new("v1.0", RefKind::Tag),
            ]
        );
    }

    #[test]
    fn root_commit_has_no_parents() {
        let raw = "r\u{1f}\u{1f}\u{1f}A\u{1f}a@x\u{1f}5\u{1f}init";
        let commit = parse_log_record(raw).expect("parses").expect("not blank");
        assert!(commit.parents.is_empty());
        assert!(commit.refs.is_empty());
    }

    #[test]
    fn subject_may_contain_separators_of_other_kinds() {
        let raw = "h\u{1f}\u{1f}\u{1f}A\u{1f}a@x\u{1f}5\u{1f}fix: a, b -> c";
        let commit = parse_log_record(raw).expect("parses").expect("not blank");
        assert_eq!(commit.subject, "fix: a, b -> c");
    }

    #[test]
    fn truncated_record_is_an_error() {
        assert!(parse_log_record("abc\u{1f}p1").is_err());
        assert!(parse_log_record("h\u{1f}\u{1f}\u{1f}A\u{1f}a\u{1f}soon\u{1f}s").is_err());
    }

    #[test]
    fn log_output_skips_trailing_newline() {
        let raw = "a\u{1f}b\u{1f}\u{1f}A\u{1f}e\u{1f}2\u{1f}two\u{1e}\nb\u{1f}\u{1f}\u{1f}A\u{1f}e\u{1f}1\u{1f}one\u{1e}\n";
        let commits = parse_log_output(raw).expect("parses");
        let hashes = commits.iter().map(|commit| commit.hash.as_str()).collect::<Vec<_>>();
        assert_eq!(hashes, vec!["a", "b"]);
    }

    #[test]
    fn decorations_cover_remotes_and_detached_head() {
        let refs = parse_decorations(
            "HEAD, refs/remotes/origin/HEAD, refs/remotes/origin/dev, refs/stash",
        );
        assert_eq!(
            refs,
            vec![
                CommitRef::new("HEAD", RefKind::LocalBranch).head(),
                CommitRef::new("origin/dev", RefKind::RemoteBranch),
            ]
        );
    }

    #[test]
    fn json_accepts_array_or_wrapped_object() {
        let bare = r#"[{"hash": "a", "parents": []}]"#;
        let wrapped = r#"{"commits": [{"hash": "a", "parentHashes": ["b"]}, {"hash": "b"}]}"#;

        assert_eq!(parse_commit_json(bare).expect("bare").len(), 1);
        let commits = parse_commit_json(wrapped).expect("wrapped");
        assert_eq!(commits[0].parents, vec!["b"]);
        assert!(parse_commit_json("42").is_err());
        assert!(parse_commit_json(r#"{"items": []}"#).is_err());
    }
}
