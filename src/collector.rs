//! Change collection: one concurrent pass over the repository inspector.

use crate::errors::CollectError;
use crate::git::{FileChange, RepoInspector, merge_stats};
use std::time::Instant;

/// Everything the prompt engine needs from one collection pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepositorySnapshot {
    pub status: String,
    pub diff: String,
    pub history: String,
    pub changes: Vec<FileChange>,
}

impl RepositorySnapshot {
    /// False when the diff is empty or whitespace-only, i.e. nothing to commit.
    pub fn has_changes(&self) -> bool {
        !self.diff.trim().is_empty()
    }
}

/// Collect status, diff, stats and history concurrently.
///
/// Fails with the first error observed; the remaining reads are dropped.
/// An unborn branch yields empty history rather than an error.
pub async fn collect(
    inspector: &dyn RepoInspector,
    history_limit: usize,
) -> Result<RepositorySnapshot, CollectError> {
    let start = Instant::now();

    let status = async { inspector.status().await.map_err(CollectError::Status) };

    let stats = async {
        let (staged, unstaged) = tokio::try_join!(
            inspector.diff_stat_staged(),
            inspector.diff_stat_unstaged()
        )
        .map_err(CollectError::DiffStat)?;
        Ok::<_, CollectError>(merge_stats(staged, unstaged))
    };

    let diff = async { inspector.diff().await.map_err(CollectError::Diff) };

    let history = async {
        match inspector.history(history_limit).await {
            Ok(log) => Ok(log),
            Err(e) if e.is_unborn_branch() => Ok(String::new()),
            Err(e) => Err(CollectError::History(e)),
        }
    };

    let (status, changes, diff, history) = tokio::try_join!(status, stats, diff, history)?;

    tracing::debug!(
        files = changes.len(),
        diff_bytes = diff.len(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "collected repository snapshot"
    );

    Ok(RepositorySnapshot {
        status,
        diff,
        history,
        changes,
    })
}
