//! Prompt assembly.

use super::PromptBudget;
use super::selection::{render_smart_diff, render_summary, select_files};
use crate::collector::RepositorySnapshot;
use crate::errors::CollectError;
use crate::git::RepoInspector;

/// Appended to a smart-selected diff so the model knows detail is partial.
pub const SMART_DIFF_CAVEAT: &str = "\n(Note: Due to large changeset, detailed diffs shown for selected files only. Use summary above for full picture.)\n";

/// The diff text that goes into the prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiffSection {
    /// The raw diff, unchanged.
    Full(String),
    /// Summary, selected diffs and excluded-file note.
    Smart(String),
}

impl DiffSection {
    pub fn text(&self) -> &str {
        match self {
            DiffSection::Full(text) | DiffSection::Smart(text) => text,
        }
    }

    pub fn is_smart(&self) -> bool {
        matches!(self, DiffSection::Smart(_))
    }
}

/// Choose between the verbatim diff and smart selection.
///
/// Only the smart path touches the inspector, to fetch diffs for the
/// selected paths.
pub async fn build_diff_section(
    snapshot: &RepositorySnapshot,
    budget: &PromptBudget,
    inspector: &dyn RepoInspector,
) -> Result<DiffSection, CollectError> {
    if budget.fits(snapshot) {
        tracing::debug!(
            total = budget.total_size(snapshot),
            max = budget.max_chars,
            "full diff fits the budget"
        );
        return Ok(DiffSection::Full(snapshot.diff.clone()));
    }

    // Nothing to rank without stats.
    if snapshot.changes.is_empty() {
        tracing::debug!("over budget but no file stats, keeping full diff");
        return Ok(DiffSection::Full(snapshot.diff.clone()));
    }

    let summary = render_summary(&snapshot.changes);
    let available = budget.available_for_diff(snapshot, summary.len());
    let selection = select_files(&snapshot.changes, available, budget.per_line_estimate);

    tracing::info!(
        total = budget.total_size(snapshot),
        max = budget.max_chars,
        available,
        selected = selection.selected.len(),
        excluded = selection.excluded.len(),
        "large changeset, using smart diff selection"
    );

    let selected_diff = if selection.selected.is_empty() {
        String::new()
    } else {
        inspector
            .diff_files(&selection.selected)
            .await
            .map_err(CollectError::SelectedDiff)?
    };

    Ok(DiffSection::Smart(render_smart_diff(
        &summary,
        &selection,
        &selected_diff,
    )))
}

/// Compose the instruction text sent to the model.
pub fn build_prompt(snapshot: &RepositorySnapshot, diff: &DiffSection, hint: Option<&str>) -> String {
    let caveat = if diff.is_smart() { SMART_DIFF_CAVEAT } else { "" };

    let hint_section = match hint {
        Some(text) if !text.is_empty() => format!("\n\nUser Input:\n```\n{}\n```\n", text),
        _ => String::new(),
    };

    format!(
        r#"Analyze the following git repository state and generate a concise commit message.

Git Status:
```
{status}
```

Git Diff:
```
{diff}{caveat}
```

Recent Commits (for style reference):
```
{history}
```{hint_section}

IMPORTANT: Your entire response must be ONLY the commit message text itself.
Do NOT include:
- Any analysis or explanation
- Prefixes like "Claude:", "Here's", "Based on"
- Phrases like "I'll analyze" or "my suggested commit message is"
- Signatures or attributions

Write a commit message that:
1. Summarizes the changes concisely (1-2 sentences)
2. Focuses on WHY rather than WHAT
3. Follows the style of recent commits shown above

Start your response directly with the commit message text."#,
        status = snapshot.status,
        diff = diff.text(),
        history = snapshot.history,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::budget::{DETAIL_HEADER, SUMMARY_HEADER};
    use crate::collector::testing::FakeInspector;
    use crate::git::FileChange;

    fn snapshot_with(changes: Vec<FileChange>, diff: String) -> RepositorySnapshot {
        RepositorySnapshot {
            status: "On branch main\nChanges to be committed:".into(),
            diff,
            history: "abc1234 Add parser\ndef5678 Initial commit".into(),
            changes,
        }
    }

    fn big_fixture() -> (RepositorySnapshot, FakeInspector) {
        let changes = vec![
            FileChange::new("file1000.rs", 600, 400),
            FileChange::new("file10.rs", 6, 4),
            FileChange::new("file2000.rs", 1500, 500),
            FileChange::new("file20.rs", 15, 5),
        ];
        let snapshot = snapshot_with(changes, "x".repeat(20_000));
        let inspector = FakeInspector {
            file_diffs: vec![
                ("file10.rs".into(), "diff --git a/file10.rs\n".into()),
                ("file20.rs".into(), "diff --git a/file20.rs\n".into()),
                ("file1000.rs".into(), "diff --git a/file1000.rs\n".into()),
                ("file2000.rs".into(), "diff --git a/file2000.rs\n".into()),
            ],
            ..Default::default()
        };
        (snapshot, inspector)
    }

    /// Budget that leaves exactly `available` bytes for diffs after the summary.
    fn budget_leaving(snapshot: &RepositorySnapshot, available: usize) -> PromptBudget {
        let defaults = PromptBudget::default();
        let summary = render_summary(&snapshot.changes);
        PromptBudget {
            max_chars: snapshot.status.len()
                + snapshot.history.len()
                + defaults.overhead_chars
                + summary.len()
                + available,
            ..defaults
        }
    }

    #[tokio::test]
    async fn test_within_budget_uses_raw_diff_verbatim() {
        let diff = "diff --git a/a.rs b/a.rs\n+fn a() {}\n".to_string();
        let snapshot = snapshot_with(vec![FileChange::new("a.rs", 1, 0)], diff.clone());
        let inspector = FakeInspector::default();

        let section = build_diff_section(&snapshot, &PromptBudget::default(), &inspector)
            .await
            .unwrap();
        assert_eq!(section, DiffSection::Full(diff.clone()));
        assert!(inspector.diff_files_calls.lock().unwrap().is_empty());

        let prompt = build_prompt(&snapshot, &section, None);
        assert!(prompt.contains(&format!("Git Diff:\n```\n{}\n```", diff)));
        assert!(!prompt.contains(SUMMARY_HEADER));
        assert!(!prompt.contains("(Note: Due to large changeset"));
    }

    #[tokio::test]
    async fn test_over_budget_selects_low_churn_files() {
        let (snapshot, inspector) = big_fixture();
        let budget = budget_leaving(&snapshot, 200);

        let section = build_diff_section(&snapshot, &budget, &inspector)
            .await
            .unwrap();
        assert!(section.is_smart());

        let calls = inspector.diff_files_calls.lock().unwrap();
        assert_eq!(
            *calls,
            vec![vec!["file10.rs".to_string(), "file20.rs".to_string()]]
        );

        let text = section.text();
        assert!(text.starts_with(SUMMARY_HEADER));
        assert!(text.contains(DETAIL_HEADER));
        assert!(text.contains("diff --git a/file10.rs"));
        assert!(text.contains("diff --git a/file20.rs"));
        assert!(!text.contains("diff --git a/file1000.rs"));
        assert!(
            text.contains("[Note: Diffs excluded for 2 large files: file1000.rs, file2000.rs]")
        );
    }

    #[tokio::test]
    async fn test_over_budget_summary_lists_every_file_once() {
        let (snapshot, inspector) = big_fixture();
        let budget = budget_leaving(&snapshot, 200);
        let section = build_diff_section(&snapshot, &budget, &inspector)
            .await
            .unwrap();

        for change in &snapshot.changes {
            let line = format!(
                "  {}: +{} -{} lines\n",
                change.path, change.added, change.removed
            );
            assert_eq!(section.text().matches(&line).count(), 1, "{}", line);
        }
    }

    #[tokio::test]
    async fn test_degenerate_budget_sends_summary_and_note_only() {
        let (snapshot, inspector) = big_fixture();
        let budget = PromptBudget {
            max_chars: 10,
            ..Default::default()
        };

        let section = build_diff_section(&snapshot, &budget, &inspector)
            .await
            .unwrap();
        let text = section.text();
        assert!(text.starts_with(SUMMARY_HEADER));
        assert!(!text.contains(DETAIL_HEADER));
        assert!(text.contains("Diffs excluded for 4 large files"));
        assert!(inspector.diff_files_calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_generous_smart_budget_has_no_excluded_note() {
        let (snapshot, inspector) = big_fixture();
        // Room for every estimate (15_150 bytes) but not for the 20_000 byte raw diff.
        let budget = budget_leaving(&snapshot, 16_000);
        assert!(!budget.fits(&snapshot));

        let section = build_diff_section(&snapshot, &budget, &inspector)
            .await
            .unwrap();
        assert!(section.is_smart());
        assert!(section.text().contains(DETAIL_HEADER));
        assert!(!section.text().contains("[Note:"));
        assert_eq!(inspector.diff_files_calls.lock().unwrap()[0].len(), 4);
    }

    #[tokio::test]
    async fn test_over_budget_without_stats_keeps_full_diff() {
        let diff = "diff --git a/a.bin b/a.bin\n".repeat(100);
        let snapshot = snapshot_with(Vec::new(), diff.clone());
        let budget = PromptBudget {
            max_chars: 10,
            ..Default::default()
        };
        let inspector = FakeInspector::default();

        let section = build_diff_section(&snapshot, &budget, &inspector)
            .await
            .unwrap();
        assert_eq!(section, DiffSection::Full(diff));
        assert!(inspector.diff_files_calls.lock().unwrap().is_empty());

        let prompt = build_prompt(&snapshot, &section, None);
        assert!(!prompt.contains(SUMMARY_HEADER));
        assert!(!prompt.contains(SMART_DIFF_CAVEAT));
    }

    #[tokio::test]
    async fn test_selected_diff_failure_propagates() {
        let (snapshot, mut inspector) = big_fixture();
        inspector.fail_selected = true;
        let budget = budget_leaving(&snapshot, 200);

        let err = build_diff_section(&snapshot, &budget, &inspector)
            .await
            .unwrap_err();
        assert!(matches!(err, CollectError::SelectedDiff(_)));
    }

    #[test]
    fn test_prompt_includes_caveat_for_smart_diff() {
        let snapshot = snapshot_with(Vec::new(), String::new());
        let section = DiffSection::Smart("Changed Files Summary:\n\n".into());
        let prompt = build_prompt(&snapshot, &section, None);
        assert!(prompt.contains(SMART_DIFF_CAVEAT));
    }

    #[test]
    fn test_raw_diff_mentioning_summary_header_gets_no_caveat() {
        let snapshot = snapshot_with(Vec::new(), String::new());
        let section = DiffSection::Full("+// Changed Files Summary:\n".into());
        let prompt = build_prompt(&snapshot, &section, None);
        assert!(!prompt.contains(SMART_DIFF_CAVEAT));
    }

    #[test]
    fn test_prompt_embeds_sections_and_instructions() {
        let snapshot = snapshot_with(Vec::new(), "diff body".into());
        let section = DiffSection::Full(snapshot.diff.clone());
        let prompt = build_prompt(&snapshot, &section, None);

        assert!(prompt.contains("Git Status:\n```\nOn branch main"));
        assert!(prompt.contains("Recent Commits (for style reference):\n```\nabc1234 Add parser"));
        assert!(prompt.contains("WHY rather than WHAT"));
        assert!(prompt.contains("Follows the style of recent commits"));
        assert!(prompt.contains("ONLY the commit message text"));
        assert!(!prompt.contains("User Input:"));
    }

    #[test]
    fn test_prompt_appends_user_hint_verbatim() {
        let snapshot = snapshot_with(Vec::new(), "diff body".into());
        let section = DiffSection::Full(snapshot.diff.clone());
        let prompt = build_prompt(&snapshot, &section, Some("fixes the login race"));
        assert!(prompt.contains("User Input:\n```\nfixes the login race\n```"));

        let empty = build_prompt(&snapshot, &section, Some(""));
        assert!(!empty.contains("User Input:"));

        let spaces = build_prompt(&snapshot, &section, Some("   "));
        assert!(spaces.contains("User Input:\n```\n   \n```"));
    }
}
