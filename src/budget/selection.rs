//! Smart diff selection: which files get a full diff under the budget.

use crate::git::FileChange;

/// First line of a smart-selected diff section.
pub const SUMMARY_HEADER: &str = "Changed Files Summary:";

/// Introduces the full diffs of the selected files.
pub const DETAIL_HEADER: &str = "Detailed Diffs (selected files):";

/// Outcome of the greedy walk, paths in the order they were attempted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    pub selected: Vec<String>,
    pub excluded: Vec<String>,
}

/// Order changes by ascending churn. Ties keep input order.
pub fn rank_by_churn(changes: &[FileChange]) -> Vec<&FileChange> {
    let mut ranked: Vec<&FileChange> = changes.iter().collect();
    ranked.sort_by_key(|c| c.churn());
    ranked
}

/// Greedy best-fit-remaining walk over the ranked changes.
///
/// Each file costs `churn * per_line_estimate`. A file that does not fit is
/// excluded and the walk continues, so every change lands in exactly one of
/// the two lists. With `available < 0` nothing is selected.
pub fn select_files(changes: &[FileChange], available: i64, per_line_estimate: u64) -> Selection {
    let mut selection = Selection::default();
    let mut used: i64 = 0;

    for change in rank_by_churn(changes) {
        let estimate = change
            .churn()
            .checked_mul(per_line_estimate)
            .and_then(|n| i64::try_from(n).ok())
            .unwrap_or(i64::MAX);

        if used.saturating_add(estimate) > available {
            selection.excluded.push(change.path.clone());
            continue;
        }

        used += estimate;
        selection.selected.push(change.path.clone());
    }

    selection
}

/// Summary block listing every change in the order given, then a blank line.
pub fn render_summary(changes: &[FileChange]) -> String {
    let mut out = String::from(SUMMARY_HEADER);
    out.push('\n');
    for change in changes {
        out.push_str(&format!(
            "  {}: +{} -{} lines\n",
            change.path, change.added, change.removed
        ));
    }
    out.push('\n');
    out
}

/// Trailing note naming the files whose diffs were left out.
pub fn excluded_note(excluded: &[String]) -> Option<String> {
    if excluded.is_empty() {
        return None;
    }
    Some(format!(
        "\n[Note: Diffs excluded for {} large files: {}]\n",
        excluded.len(),
        excluded.join(", ")
    ))
}

/// Summary, then the selected diffs under their header, then the note.
///
/// `selected_diff` is only rendered when `selection` selected something.
pub fn render_smart_diff(summary: &str, selection: &Selection, selected_diff: &str) -> String {
    let mut out = String::from(summary);

    if !selection.selected.is_empty() {
        out.push_str(DETAIL_HEADER);
        out.push_str("\n\n");
        out.push_str(selected_diff);
    }

    if let Some(note) = excluded_note(&selection.excluded) {
        out.push_str(&note);
    }

    out
}
