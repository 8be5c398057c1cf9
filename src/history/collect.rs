use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};

use crate::graph::record::CommitRecord;

use super::git_cmd::run_git;
use super::parse::{LOG_FORMAT, parse_commit_json, parse_log_output};

/// Arguments shared by every `git log` invocation, newest commits first with
/// children always before their parents.
pub(super) fn log_args(max_commits: Option<usize>) -> Vec<String> {
    let mut args = vec![
        "log".to_owned(),
        "--all".to_owned(),
        "--topo-order".to_owned(),
        "--decorate=full".to_owned(),
        "--no-color".to_owned(),
        LOG_FORMAT.to_owned(),
    ];
    if let Some(max) = max_commits {
        args.push(format!("--max-count={max}"));
    }
    args
}

pub fn collect_git_log(repo: &Path, max_commits: Option<usize>) -> Result<Vec<CommitRecord>> {
    let args = log_args(max_commits);
    let arg_refs = args.iter().map(String::as_str).collect::<Vec<_>>();
    let raw = run_git(repo, &arg_refs)
        .with_context(|| format!("failed to read history of {}", repo.display()))?;

    let commits = parse_log_output(&raw).context("failed to parse git log output")?;
    if commits.is_empty() {
        return Err(anyhow!("git log returned no commits for {}", repo.display()));
    }

    log::info!("read {} commits from {}", commits.len(), repo.display());
    Ok(commits)
}

/// Number of commits `collect_git_log` would return, used for progress.
pub fn count_git_commits(repo: &Path, max_commits: Option<usize>) -> Result<usize> {
    let raw = run_git(repo, &["rev-list", "--all", "--count"])
        .with_context(|| format!("failed to count commits of {}", repo.display()))?;
    let total = raw
        .trim()
        .parse::<usize>()
        .with_context(|| format!("unexpected rev-list count output: {raw:?}"))?;

    Ok(max_commits.map_or(total, |max| total.min(max)))
}

pub fn load_json(path: &Path) -> Result<Vec<CommitRecord>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read commit file {}", path.display()))?;
    let commits = parse_commit_json(&raw)
        .with_context(|| format!("failed to parse commit file {}", path.display()))?;

    log::info!("loaded {} commits from {}", commits.len(), path.display());
    Ok(commits)
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::process::Command;

    use super::*;

    #[test]
    fn max_commits_becomes_a_git_flag() {
        assert!(log_args(Some(50)).contains(&"--max-count=50".to_owned()));
        assert!(!log_args(None).iter().any(|arg| arg.starts_with("--max-count")));
    }

    #[test]
    fn load_json_reads_a_file() {
        let path = std::env::temp_dir().join(format!(
            "commit-canvas-load-{}.json",
            std::process::id()
        ));
        let mut file = fs::File::create(&path).expect("create temp file");
        file.write_all(br#"[{"hash": "b", "parents": ["a"]}, {"hash": "a"}]"#)
            .expect("write temp file");
        drop(file);

        let commits = load_json(&path).expect("loads");
        fs::remove_file(&path).ok();
        assert_eq!(commits.len(), 2);
        assert_eq!(commits[0].parents, vec!["a"]);
    }

    #[test]
    fn collects_history_from_a_repository() {
        let repo = std::env::temp_dir().join(format!("commit-canvas-repo-{}", std::process::id()));
        fs::create_dir_all(&repo).expect("create repo dir");
        let git = |args: &[&str]| {
            Command::new("git")
                .arg("-C")
                .arg(&repo)
                .args(["-c", "user.name=Dev", "-c", "user.email=dev@example.com"])
                .args(["-c", "commit.gpgsign=false"])
                .args(args)
                .output()
        };
        let Ok(init) = git(&["init", "--quiet"]) else {
            // git is not installed
            fs::remove_dir_all(&repo).ok();
            return;
        };
        assert!(init.status.success());
        for subject in ["first", "second"] {
            let output = git(&["commit", "--allow-empty", "--quiet", "-m", subject]).expect("commit");
            assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
        }

        let commits = collect_git_log(&repo, None);
        let capped = count_git_commits(&repo, Some(1));
        fs::remove_dir_all(&repo).ok();

        let commits = commits.expect("collects");
        assert_eq!(commits.len(), 2);
        assert_eq!(commits[0].subject, "second");
        assert_eq!(commits[0].parents, vec![commits[1].hash.clone()]);
        assert!(commits[0].is_head());
        assert_eq!(commits[1].author.email, "dev@example.com");
        assert_eq!(capped.expect("counts"), 1);
    }

    #[test]
    fn missing_json_file_reports_path() {
        let error = load_json(Path::new("/definitely/not/here.json")).expect_err("missing");
        assert!(format!("{error:#}").contains("/definitely/not/here.json"));
    }
}
