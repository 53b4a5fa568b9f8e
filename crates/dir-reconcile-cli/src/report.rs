use dir_reconcile_core::RunSummary;
use serde::Serialize;
use std::path::Path;

#[derive(Debug, Serialize)]
struct ReportRow {
    relative_path: String,
    outcome: String,
    duplicate_of: String,
    error: String,
}

/// Write one CSV row per outcome and per file error. Returns the number of rows.
pub fn write_csv(summary: &RunSummary, path: &Path) -> Result<usize, csv::Error> {
    let mut wtr = csv::Writer::from_path(path)?;
    let mut rows = 0;

    for outcome in &summary.outcomes {
        wtr.serialize(ReportRow {
            relative_path: outcome.relative_path.display().to_string(),
            outcome: outcome.kind.label().to_string(),
            duplicate_of: outcome
                .duplicate_of
                .as_deref()
                .map(|p| p.display().to_string())
                .unwrap_or_default(),
            error: String::new(),
        })?;
        rows += 1;
    }

    for file_error in &summary.errors {
        wtr.serialize(ReportRow {
            relative_path: file_error.relative_path.display().to_string(),
            outcome: "error".to_string(),
            duplicate_of: String::new(),
            error: format!("{}: {}", file_error.operation, file_error.message),
        })?;
        rows += 1;
    }

    wtr.flush()?;
    Ok(rows)
}
