//! Prompt budgeting.
//!
//! Decides how much of the working-tree diff fits in one model request and
//! assembles the instruction text around it.
//!
//! ## Flow
//!
//! ```ignore
//! let snapshot = collector::collect(&git, budget.history_limit).await?;
//! let section = budget::build_diff_section(&snapshot, &budget, &git).await?;
//! let prompt = budget::build_prompt(&snapshot, &section, hint);
//! ```
//!
//! When `status + diff + history + overhead` fits in `max_chars` the diff is
//! used verbatim. Otherwise smart selection kicks in: every file is listed
//! with its line counts, the lowest-churn files get their full diff while the
//! estimate fits, and the rest are named in a trailing note.

mod prompt;
mod selection;

pub use prompt::{DiffSection, SMART_DIFF_CAVEAT, build_diff_section, build_prompt};
pub use selection::{
    DETAIL_HEADER, SUMMARY_HEADER, Selection, excluded_note, rank_by_churn, render_smart_diff,
    render_summary, select_files,
};

use crate::collector::RepositorySnapshot;
use serde::{Deserialize, Serialize};

/// Ceiling on the whole prompt, in bytes of UTF-8 text.
/// ~125k tokens at 4 chars/token, leaving room for the reply.
pub const MAX_PROMPT_CHARS: usize = 500_000;

/// Reserved for the template text around the variable sections.
pub const PROMPT_OVERHEAD_CHARS: usize = 2_000;

/// Estimated diff bytes per changed line (line text, context, markup).
pub const PER_LINE_SIZE_ESTIMATE: u64 = 5;

/// Number of recent commits shown as style reference.
pub const HISTORY_LIMIT: usize = 10;

/// Size limits for one prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptBudget {
    pub max_chars: usize,
    pub overhead_chars: usize,
    pub per_line_estimate: u64,
    pub history_limit: usize,
}

impl Default for PromptBudget {
    fn default() -> Self {
        Self {
            max_chars: MAX_PROMPT_CHARS,
            overhead_chars: PROMPT_OVERHEAD_CHARS,
            per_line_estimate: PER_LINE_SIZE_ESTIMATE,
            history_limit: HISTORY_LIMIT,
        }
    }
}

impl PromptBudget {
    /// Size of the naive prompt: every section verbatim plus overhead.
    pub fn total_size(&self, snapshot: &RepositorySnapshot) -> usize {
        snapshot.status.len() + snapshot.diff.len() + snapshot.history.len() + self.overhead_chars
    }

    /// Whether the full diff can be sent as-is.
    pub fn fits(&self, snapshot: &RepositorySnapshot) -> bool {
        self.total_size(snapshot) <= self.max_chars
    }

    /// Bytes left for diff content once status, history, overhead and
    /// `reserved` (the summary block) are accounted for. May be negative.
    pub fn available_for_diff(&self, snapshot: &RepositorySnapshot, reserved: usize) -> i64 {
        to_i64(self.max_chars)
            - to_i64(snapshot.status.len())
            - to_i64(snapshot.history.len())
            - to_i64(self.overhead_chars)
            - to_i64(reserved)
    }
}

fn to_i64(n: usize) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(status: &str, diff: &str, history: &str) -> RepositorySnapshot {
        RepositorySnapshot {
            status: status.into(),
            diff: diff.into(),
            history: history.into(),
            changes: Vec::new(),
        }
    }

    #[test]
    fn test_default_constants() {
        let budget = PromptBudget::default();
        assert_eq!(budget.max_chars, 500_000);
        assert_eq!(budget.overhead_chars, 2_000);
        assert_eq!(budget.per_line_estimate, 5);
        assert_eq!(budget.history_limit, 10);
    }

    #[test]
    fn test_fits_at_exact_boundary() {
        let snap = snapshot("ssss", "dddddd", "hh");
        let budget = PromptBudget {
            max_chars: 4 + 6 + 2 + 2_000,
            ..Default::default()
        };
        assert_eq!(budget.total_size(&snap), budget.max_chars);
        assert!(budget.fits(&snap));

        let tighter = PromptBudget {
            max_chars: budget.max_chars - 1,
            ..budget
        };
        assert!(!tighter.fits(&snap));
    }

    #[test]
    fn test_available_for_diff_can_go_negative() {
        let snap = snapshot(&"s".repeat(100), "", &"h".repeat(50));
        let budget = PromptBudget {
            max_chars: 1_000,
            overhead_chars: 900,
            ..Default::default()
        };
        assert_eq!(budget.available_for_diff(&snap, 0), -50);
        assert_eq!(budget.available_for_diff(&snap, 25), -75);
    }

    #[test]
    fn test_budget_deserializes_with_partial_fields() {
        let budget: PromptBudget = toml::from_str("max_chars = 1234").unwrap();
        assert_eq!(budget.max_chars, 1234);
        assert_eq!(budget.overhead_chars, PROMPT_OVERHEAD_CHARS);
        assert_eq!(budget.history_limit, HISTORY_LIMIT);
    }
}
