use std::path::Path;

use anyhow::Context;
use keel_db::import::ImportFormat;
use serde::Serialize;

use crate::cli::GlobalFlags;
use crate::context::AppContext;
use crate::output::output;
use crate::progress::Progress;

#[derive(Debug, Serialize)]
struct ImportSummary {
    path: String,
    imported: usize,
    rejected: usize,
    report: keel_core::responses::ImportReport,
}

/// `keel lead import <file>`: JSON Lines with one `new_lead` object per
/// line, or CSV with a header row when the file ends in `.csv`.
pub async fn run(path: &Path, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let total = count_records(&contents, ImportFormat::from_path(path));

    let progress = Progress::records(total, "leads");
    let result = ctx
        .service
        .import_leads(path, |_line| progress.inc(1))
        .await;

    let report = match result {
        Ok(report) => report,
        Err(error) => {
            progress.finish_err("import failed; no leads were written");
            return Err(error.into());
        }
    };

    progress.finish_records(report.imported.len(), report.rejected.len());
    for rejection in &report.rejected {
        tracing::warn!(line = rejection.line, error = %rejection.error, "lead rejected");
    }

    output(
        &ImportSummary {
            path: path.display().to_string(),
            imported: report.imported.len(),
            rejected: report.rejected.len(),
            report,
        },
        flags.format,
    )
}

/// Non-blank lines, which is what the importer reports progress for. A CSV
/// header row is not a record.
fn count_records(contents: &str, format: ImportFormat) -> u64 {
    let lines = contents.lines().filter(|line| !line.trim().is_empty()).count();
    let records = match format {
        ImportFormat::JsonLines => lines,
        ImportFormat::Csv => lines.saturating_sub(1),
    };
    u64::try_from(records).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_lines_are_not_counted() {
        let contents = "{\"company\":\"Acme\"}\n\n  \n{\"company\":\"Globex\"}\n";
        assert_eq!(count_records(contents, ImportFormat::JsonLines), 2);
    }

    #[test]
    fn csv_header_is_not_a_record() {
        let contents = "company,value\nAcme,10\nGlobex,20\n";
        assert_eq!(count_records(contents, ImportFormat::Csv), 2);
        assert_eq!(count_records("company,value\n", ImportFormat::Csv), 0);
    }

    #[test]
    fn empty_file_has_no_records() {
        assert_eq!(count_records("", ImportFormat::JsonLines), 0);
        assert_eq!(count_records("", ImportFormat::Csv), 0);
    }
}
