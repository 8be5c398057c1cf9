use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;

use anyhow::{Context, Result, anyhow};

use crate::graph::record::CommitRecord;

use super::collect::{count_git_commits, load_json, log_args};
use super::git_cmd::{git_command, spawn_piped};
use super::parse::{RECORD_SEPARATOR, parse_log_record};

pub const DEFAULT_CHUNK_SIZE: usize = 2_000;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HistorySource {
    Git {
        repo: PathBuf,
        max_commits: Option<usize>,
    },
    Json(PathBuf),
}

impl HistorySource {
    pub fn describe(&self) -> String {
        match self {
            Self::Git { repo, .. } => format!("git repository {}", repo.display()),
            Self::Json(path) => format!("commit file {}", path.display()),
        }
    }
}

#[derive(Debug)]
pub enum HistoryEvent {
    /// Expected number of commits, when the source knows it up front.
    Total(usize),
    Chunk(Vec<CommitRecord>),
    Done,
    Failed(String),
}

/// Reads `source` on a worker thread and sends commits in chunks of
/// `chunk_size`. The worker stops early once the receiver is dropped.
pub fn spawn_stream(source: HistorySource, chunk_size: usize) -> Receiver<HistoryEvent> {
    let (tx, rx) = mpsc::channel();
    let chunk_size = chunk_size.max(1);

    thread::spawn(move || {
        let result = match &source {
            HistorySource::Git { repo, max_commits } => {
                stream_git(repo.clone(), *max_commits, chunk_size, &tx)
            }
            HistorySource::Json(path) => stream_json(path, chunk_size, &tx),
        };

        let event = match result {
            Ok(()) => HistoryEvent::Done,
            Err(error) => {
                log::warn!("loading {} failed: {error:#}", source.describe());
                HistoryEvent::Failed(format!("{error:#}"))
            }
        };
        let _ = tx.send(event);
    });

    rx
}

struct ReceiverGone;

fn send(tx: &Sender<HistoryEvent>, event: HistoryEvent) -> Result<(), ReceiverGone> {
    tx.send(event).map_err(|_| ReceiverGone)
}

fn stream_json(path: &Path, chunk_size: usize, tx: &Sender<HistoryEvent>) -> Result<()> {
    let mut commits = load_json(path)?;
    if send(tx, HistoryEvent::Total(commits.len())).is_err() {
        return Ok(());
    }

    while !commits.is_empty() {
        let rest = commits.split_off(chunk_size.min(commits.len()));
        if send(tx, HistoryEvent::Chunk(commits)).is_err() {
            return Ok(());
        }
        commits = rest;
    }
    Ok(())
}

fn stream_git(
    repo: PathBuf,
    max_commits: Option<usize>,
    chunk_size: usize,
    tx: &Sender<HistoryEvent>,
) -> Result<()> {
    match count_git_commits(&repo, max_commits) {
        Ok(total) => {
            if send(tx, HistoryEvent::Total(total)).is_err() {
                return Ok(());
            }
        }
        Err(error) => log::debug!("commit count unavailable: {error:#}"),
    }

    let mut command = git_command(&repo);
    command.args(log_args(max_commits));
    let Some(total) = stream_log(command, chunk_size, tx)? else {
        return Ok(());
    };
    if total == 0 {
        return Err(anyhow!("git log returned no commits for {}", repo.display()));
    }

    log::info!("streamed {total} commits from {}", repo.display());
    Ok(())
}

/// Runs a `LOG_FORMAT` producer and forwards parsed commits in chunks.
/// Returns the number of commits sent, or `None` once the receiver is gone.
fn stream_log(
    command: Command,
    chunk_size: usize,
    tx: &Sender<HistoryEvent>,
) -> Result<Option<usize>> {
    let mut child = spawn_piped(command)?;
    let stderr = child.drain_stderr();
    let mut reader = BufReader::new(child.take_stdout()?);

    let mut chunk = Vec::with_capacity(chunk_size);
    let mut record = Vec::new();
    let mut total = 0usize;
    loop {
        record.clear();
        let read = reader
            .read_until(RECORD_SEPARATOR, &mut record)
            .context("failed to read git log output")?;
        if read == 0 {
            break;
        }

        let text = std::str::from_utf8(&record).context("git output was not valid UTF-8")?;
        if let Some(commit) = parse_log_record(text)? {
            chunk.push(commit);
        }

        if chunk.len() >= chunk_size {
            total += chunk.len();
            let full = std::mem::replace(&mut chunk, Vec::with_capacity(chunk_size));
            if send(tx, HistoryEvent::Chunk(full)).is_err() {
                return Ok(None);
            }
        }
    }

    if !chunk.is_empty() {
        total += chunk.len();
        if send(tx, HistoryEvent::Chunk(chunk)).is_err() {
            return Ok(None);
        }
    }

    let status = child.wait()?;
    let stderr = stderr.join().unwrap_or_default();
    if !status.success() {
        return Err(anyhow!("git log failed: {}", stderr.trim()));
    }
    if !stderr.trim().is_empty() {
        log::debug!("git log stderr: {}", stderr.trim());
    }
    Ok(Some(total))
}
