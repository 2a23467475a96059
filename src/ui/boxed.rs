//! Rounded boxes around multi-line text.

use console::{measure_text_width, style};
use regex::Regex;
use std::sync::LazyLock;

static ANSI_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\x1b\[[0-9;]*[a-zA-Z]").expect("ANSI pattern is a valid regex"));

/// Strip ANSI escapes and trailing whitespace from every line.
pub fn clean_status(status: &str) -> String {
    status
        .split('\n')
        .map(|line| {
            ANSI_REGEX
                .replace_all(line, "")
                .trim_end_matches([' ', '\t', '\r'])
                .to_string()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Render `body` inside a rounded box titled `title`, passing every border
/// fragment through `border` (for colouring).
pub fn render_box_with(title: &str, body: &str, border: impl Fn(&str) -> String) -> String {
    let lines: Vec<&str> = body.lines().collect();
    let content_width = lines
        .iter()
        .map(|l| measure_text_width(l))
        .max()
        .unwrap_or(0);
    let title_width = measure_text_width(title);

    let mut inner = content_width + 2;
    if title_width > 0 {
        inner = inner.max(title_width + 3);
    }

    let mut out = String::new();
    if title_width > 0 {
        out.push_str(&border("╭─"));
        out.push(' ');
        out.push_str(title);
        out.push(' ');
        out.push_str(&border(&format!("{}╮", "─".repeat(inner - title_width - 3))));
    } else {
        out.push_str(&border(&format!("╭{}╮", "─".repeat(inner))));
    }
    out.push('\n');

    for line in &lines {
        let pad = inner - 2 - measure_text_width(line);
        out.push_str(&border("│"));
        out.push(' ');
        out.push_str(line);
        out.push_str(&" ".repeat(pad));
        out.push(' ');
        out.push_str(&border("│"));
        out.push('\n');
    }

    out.push_str(&border(&format!("╰{}╯", "─".repeat(inner))));
    out
}

/// Plain rendering with no colour.
pub fn render_box(title: &str, body: &str) -> String {
    render_box_with(title, body, str::to_string)
}

/// Print a box with a cyan border to stdout.
pub fn print_box(title: &str, body: &str) {
    println!(
        "{}",
        render_box_with(title, body, |s| style(s).cyan().to_string())
    );
}
