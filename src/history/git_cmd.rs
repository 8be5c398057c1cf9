use std::io::Read;
use std::path::Path;
use std::process::{Child, ChildStdout, Command, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};

use anyhow::{Context, Result, anyhow};

pub(super) fn git_command(repo: &Path) -> Command {
    let mut command = Command::new("git");
    command.arg("-C").arg(repo);
    command
}

pub(super) fn run_git(repo: &Path, args: &[&str]) -> Result<String> {
    let output = git_command(repo)
        .args(args)
        .output()
        .with_context(|| format!("failed to spawn git with args: {args:?}"))?;

    if output.status.success() {
        String::from_utf8(output.stdout).context("git output was not valid UTF-8")
    } else {
        let stderr = String::from_utf8_lossy(&output.stderr);
        Err(anyhow!("git command failed for args {args:?}: {}", stderr.trim()))
    }
}

/// Starts `command` with stdout and stderr piped for incremental reading.
pub(super) fn spawn_piped(mut command: Command) -> Result<GitChild> {
    let child = command
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .with_context(|| format!("failed to spawn {command:?}"))?;
    Ok(GitChild(child))
}

/// Child process that is killed and reaped when dropped, so early returns
/// never leave a git process behind.
pub(super) struct GitChild(Child);

impl GitChild {
    pub(super) fn take_stdout(&mut self) -> Result<ChildStdout> {
        self.0
            .stdout
            .take()
            .ok_or_else(|| anyhow!("git stdout was not captured"))
    }

    /// Reads stderr to the end on its own thread. Git can fill the stderr
    /// pipe while stdout is still being read.
    pub(super) fn drain_stderr(&mut self) -> JoinHandle<String> {
        let pipe = self.0.stderr.take();
        thread::spawn(move || {
            let mut raw = Vec::new();
            if let Some(mut pipe) = pipe {
                let _ = pipe.read_to_end(&mut raw);
            }
            String::from_utf8_lossy(&raw).into_owned()
        })
    }

    pub(super) fn wait(&mut self) -> Result<ExitStatus> {
        self.0.wait().context("failed to wait for git")
    }
}

impl Drop for GitChild {
    fn drop(&mut self) {
        if matches!(self.0.try_wait(), Ok(None)) {
            let _ = self.0.kill();
        }
        let _ = self.0.wait();
    }
}
