//! One-line spinner for a long-running step.

use super::icons::{CHECK, CROSS};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// A spinner shown while one step runs, replaced by a result line when it
/// finishes. Drawn on stderr and hidden when stderr is not a terminal.
pub struct Step {
    bar: ProgressBar,
}

impl Step {
    pub fn start(message: impl Into<String>) -> Self {
        let spinner_style = ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .expect("progress bar template is a valid static string");

        let bar = ProgressBar::new_spinner();
        bar.set_style(spinner_style);
        bar.set_message(message.into());
        bar.enable_steady_tick(Duration::from_millis(80));
        Self { bar }
    }

    fn finish(self, line: String) {
        let done_style = ProgressStyle::default_spinner()
            .template("{msg}")
            .expect("progress bar template is a valid static string");
        self.bar.set_style(done_style);
        self.bar.finish_with_message(line);
    }

    pub fn success(self, message: &str) {
        self.finish(format!("{}{}", CHECK, message));
    }

    pub fn fail(self, message: &str) {
        self.finish(format!("{}{}", CROSS, style(message).red()));
    }
}
