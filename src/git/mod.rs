//! Repository inspection.
//!
//! [`RepoInspector`] is the seam between the prompt engine and the working
//! tree. The production implementation shells out to `git` ([`GitCli`]);
//! tests substitute in-memory fakes.

mod cli;

pub use cli::GitCli;

use crate::errors::GitError;
use async_trait::async_trait;
use std::collections::HashMap;

/// Dependency lock files whose diffs are mechanically generated.
///
/// Excluded from all diff text but still reported by status and numstat.
pub const LOCK_FILES: &[&str] = &[
    "package-lock.json",
    "yarn.lock",
    "pnpm-lock.yaml",
    "Gemfile.lock",
    "Cargo.lock",
    "go.sum",
    "composer.lock",
    "Pipfile.lock",
    "poetry.lock",
    "mix.lock",
    "pubspec.lock",
    "Podfile.lock",
    "packages.lock.json",
    "paket.lock",
];

/// Pathspecs that tell `git diff` to skip every lock file.
pub fn lock_file_excludes() -> Vec<String> {
    LOCK_FILES
        .iter()
        .map(|name| format!(":(exclude){}", name))
        .collect()
}

/// Line statistics for one file touched in the working tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileChange {
    pub path: String,
    pub added: u64,
    pub removed: u64,
}

impl FileChange {
    pub fn new(path: impl Into<String>, added: u64, removed: u64) -> Self {
        Self {
            path: path.into(),
            added,
            removed,
        }
    }

    /// Total lines touched. Only used for ranking.
    pub fn churn(&self) -> u64 {
        self.added.saturating_add(self.removed)
    }
}

/// Read (and minimal write) access to a git working tree.
#[async_trait]
pub trait RepoInspector: Send + Sync {
    /// Plain `git status` output.
    async fn status(&self) -> Result<String, GitError>;

    /// Staged and unstaged diff text, lock files excluded.
    async fn diff(&self) -> Result<String, GitError>;

    /// Numstat for the index.
    async fn diff_stat_staged(&self) -> Result<Vec<FileChange>, GitError>;

    /// Numstat for the working tree against the index.
    async fn diff_stat_unstaged(&self) -> Result<Vec<FileChange>, GitError>;

    /// Staged and unstaged diff restricted to `paths`, lock files excluded.
    async fn diff_files(&self, paths: &[String]) -> Result<String, GitError>;

    /// The `limit` most recent commits, one line each, newest first.
    async fn history(&self, limit: usize) -> Result<String, GitError>;

    /// Stage every change in the working tree.
    async fn stage_all(&self) -> Result<(), GitError>;

    async fn commit(&self, message: &str) -> Result<(), GitError>;

    /// Abbreviated HEAD hash, `None` on an unborn branch.
    async fn head_short_sha(&self) -> Result<Option<String>, GitError>;
}

/// Parse `git diff --numstat` output.
///
/// Binary files report `-` for both counts and are recorded as zero.
/// Malformed lines are skipped.
pub fn parse_numstat(output: &str) -> Vec<FileChange> {
    output
        .lines()
        .filter_map(|line| {
            let mut parts = line.splitn(3, '\t');
            let added = parts.next()?.trim();
            let removed = parts.next()?.trim();
            let path = parts.next()?.trim();
            if path.is_empty() {
                return None;
            }
            Some(FileChange::new(
                path,
                added.parse().unwrap_or(0),
                removed.parse().unwrap_or(0),
            ))
        })
        .collect()
}

/// Merge staged and unstaged stats by path, summing counts.
///
/// The result keeps first-seen order: staged entries, then paths that only
/// appear in the unstaged set.
pub fn merge_stats(staged: Vec<FileChange>, unstaged: Vec<FileChange>) -> Vec<FileChange> {
    let mut merged: Vec<FileChange> = Vec::with_capacity(staged.len() + unstaged.len());
    let mut index: HashMap<String, usize> = HashMap::new();

    for change in staged.into_iter().chain(unstaged) {
        match index.get(&change.path) {
            Some(&i) => {
                merged[i].added = merged[i].added.saturating_add(change.added);
                merged[i].removed = merged[i].removed.saturating_add(change.removed);
            }
            None => {
                index.insert(change.path.clone(), merged.len());
                merged.push(change);
            }
        }
    }

    merged
}
