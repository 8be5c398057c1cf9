//! Commit history sources: `git log` and JSON commit files, read in one go or
//! streamed in chunks from a worker thread.

mod collect;
mod git_cmd;
mod parse;
mod stream;

pub use collect::{collect_git_log, count_git_commits, load_json};
pub use stream::{DEFAULT_CHUNK_SIZE, HistoryEvent, HistorySource, spawn_stream};
