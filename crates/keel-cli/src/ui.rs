use std::io::IsTerminal;
use std::sync::OnceLock;

use crate::cli::{ColorMode, GlobalFlags, OutputFormat, ProgressMode};

/// Terminal preferences resolved once from the global flags.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct UiPrefs {
    pub table_color: bool,
    pub progress: bool,
    pub term_width: Option<usize>,
}

static UI_PREFS: OnceLock<UiPrefs> = OnceLock::new();

pub fn init(flags: &GlobalFlags) {
    let prefs = resolve(
        flags,
        std::io::stdout().is_terminal(),
        std::io::stderr().is_terminal(),
        std::env::var_os("NO_COLOR").is_some(),
        std::env::var("COLUMNS").ok().as_deref(),
    );
    let _ = UI_PREFS.set(prefs);
}

fn resolve(
    flags: &GlobalFlags,
    stdout_tty: bool,
    stderr_tty: bool,
    no_color: bool,
    columns: Option<&str>,
) -> UiPrefs {
    let table = flags.format == OutputFormat::Table;
    let table_color = match flags.color {
        ColorMode::Always => table,
        ColorMode::Never => false,
        ColorMode::Auto => stdout_tty && table && !no_color,
    };

    // Bars draw on stderr, so JSON on stdout stays clean either way.
    let progress = match flags.progress {
        ProgressMode::On => !flags.quiet,
        ProgressMode::Off => false,
        ProgressMode::Auto => stderr_tty && !flags.quiet,
    };

    let term_width = columns
        .and_then(|value| value.parse::<usize>().ok())
        .filter(|width| *width >= 40);

    UiPrefs {
        table_color,
        progress,
        term_width,
    }
}

#[must_use]
pub fn prefs() -> UiPrefs {
    UI_PREFS.get().copied().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flags(format: OutputFormat, color: ColorMode, progress: ProgressMode) -> GlobalFlags {
        GlobalFlags {
            format,
            limit: None,
            quiet: false,
            verbose: false,
            project_dir: None,
            color,
            progress,
        }
    }

    #[test]
    fn auto_color_needs_tty_table_and_no_no_color() {
        let f = flags(OutputFormat::Table, ColorMode::Auto, ProgressMode::Auto);
        assert!(resolve(&f, true, true, false, None).table_color);
        assert!(!resolve(&f, false, true, false, None).table_color);
        assert!(!resolve(&f, true, true, true, None).table_color);

        let json = flags(OutputFormat::Json, ColorMode::Always, ProgressMode::Auto);
        assert!(!resolve(&json, true, true, false, None).table_color);
    }

    #[test]
    fn quiet_disables_progress_even_when_forced() {
        let mut f = flags(OutputFormat::Json, ColorMode::Never, ProgressMode::On);
        assert!(resolve(&f, false, false, false, None).progress);
        f.quiet = true;
        assert!(!resolve(&f, true, true, false, None).progress);
    }

    #[test]
    fn tiny_or_garbage_columns_are_ignored() {
        let f = flags(OutputFormat::Table, ColorMode::Never, ProgressMode::Off);
        assert_eq!(resolve(&f, true, true, false, Some("120")).term_width, Some(120));
        assert_eq!(resolve(&f, true, true, false, Some("20")).term_width, None);
        assert_eq!(resolve(&f, true, true, false, Some("wide")).term_width, None);
    }
}
