use std::sync::OnceLock;
use std::time::Duration;

use indicatif::{HumanBytes, MultiProgress, ProgressBar, ProgressStyle};

use crate::ui;

/// A stderr progress indicator. Every method is a no-op when progress is
/// disabled (`--quiet`, JSON output, or stderr is not a terminal).
pub struct Progress {
    bar: Option<ProgressBar>,
    noun: &'static str,
}

static MULTI_PROGRESS: OnceLock<MultiProgress> = OnceLock::new();

fn multi_progress() -> &'static MultiProgress {
    MULTI_PROGRESS.get_or_init(MultiProgress::new)
}

/// Record bars drop the rate and then the counts as the terminal narrows.
fn records_template(term_width: Option<usize>) -> &'static str {
    match term_width {
        Some(cols) if cols >= 110 => "{bar:40.cyan/blue} {pos}/{len} {msg} ({per_sec}, eta {eta})",
        Some(cols) if cols >= 80 => "{wide_bar:.cyan/blue} {pos}/{len} {msg} ({per_sec})",
        _ => "{wide_bar:.cyan/blue} {percent}% {msg}",
    }
}

fn upload_message(file_name: &str, size: u64) -> String {
    format!("uploading {file_name} ({})", HumanBytes(size))
}

fn spinner_bar(message: String) -> ProgressBar {
    let bar = multi_progress().add(ProgressBar::new_spinner());
    bar.enable_steady_tick(Duration::from_millis(100));
    bar.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg} [{elapsed}]")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    bar.set_message(message);
    bar
}

impl Progress {
    const fn disabled(noun: &'static str) -> Self {
        Self { bar: None, noun }
    }

    /// Spinner for a single step of unknown length.
    #[must_use]
    pub fn spinner(message: &str) -> Self {
        if !ui::prefs().progress {
            return Self::disabled("");
        }
        Self {
            bar: Some(spinner_bar(message.to_string())),
            noun: "",
        }
    }

    /// Spinner for an object upload, labelled with the file and its size.
    #[must_use]
    pub fn upload(file_name: &str, size: u64) -> Self {
        if !ui::prefs().progress {
            return Self::disabled("");
        }
        Self {
            bar: Some(spinner_bar(upload_message(file_name, size))),
            noun: "",
        }
    }

    /// Bar over `total` input records (for example lines of an import file),
    /// showing the rate at which they are checked.
    #[must_use]
    pub fn records(total: u64, noun: &'static str) -> Self {
        if !ui::prefs().progress {
            return Self::disabled(noun);
        }

        let bar = multi_progress().add(ProgressBar::new(total));
        bar.set_style(
            ProgressStyle::with_template(records_template(ui::prefs().term_width))
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        bar.set_message(format!("{noun} checked"));
        Self {
            bar: Some(bar),
            noun,
        }
    }

    pub fn inc(&self, delta: u64) {
        if let Some(bar) = &self.bar {
            bar.inc(delta);
        }
    }

    /// Finish a records bar with how many were kept and how many dropped.
    pub fn finish_records(&self, kept: usize, dropped: usize) {
        if let Some(bar) = &self.bar {
            let elapsed = bar.elapsed().as_secs_f64();
            let message = if dropped == 0 {
                format!("{kept} {} imported in {elapsed:.1}s", self.noun)
            } else {
                format!("{kept} {} imported, {dropped} rejected in {elapsed:.1}s", self.noun)
            };
            bar.finish_with_message(message);
        }
    }

    pub fn finish_clear(&self) {
        if let Some(bar) = &self.bar {
            bar.finish_and_clear();
        }
    }

    pub fn finish_err(&self, message: &str) {
        if let Some(bar) = &self.bar {
            bar.abandon_with_message(message.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_template_narrows_with_terminal() {
        assert!(records_template(Some(120)).contains("{per_sec}"));
        assert!(records_template(Some(120)).contains("{eta}"));
        assert!(records_template(Some(90)).contains("{per_sec}"));
        assert!(!records_template(Some(90)).contains("{eta}"));
        assert!(records_template(Some(60)).contains("{percent}"));
        assert!(records_template(None).contains("{percent}"));
    }

    #[test]
    fn record_templates_parse() {
        for width in [Some(120), Some(90), None] {
            assert!(ProgressStyle::with_template(records_template(width)).is_ok());
        }
    }

    #[test]
    fn upload_message_carries_size() {
        assert_eq!(upload_message("sow.pdf", 2048), "uploading sow.pdf (2.00 KiB)");
    }

    #[test]
    fn disabled_progress_ignores_calls() {
        let progress = Progress::disabled("leads");
        progress.inc(3);
        progress.finish_records(2, 1);
        progress.finish_err("failed");
        assert!(progress.bar.is_none());
    }
}
