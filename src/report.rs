//! Result filtering and export.
//!
//! The reporter never reorders a [`ResultSet`]: the visible subset is the
//! input-ordered sequence of compared records whose percentage is at or
//! below the max-diff cutoff. Failed candidates are kept apart from
//! filtered ones so the two never look the same to a user.
//!
//! ## Exports
//!
//! | Export      | Function              | Name                                          |
//! |-------------|-----------------------|-----------------------------------------------|
//! | CSV         | [`export_csv`]        | `{YYYY-MM-DD}_{HHMM}_sensitivity_{n}.csv`     |
//! | Diff image  | [`write_diff_images`] | `diff-{candidate}` (PNG bytes, `/` → `_`)     |
//! | JSON report | [`Report::to_json`]   | caller's choice                               |

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};

use crate::batch::{BatchOutcome, BatchStatus, DiffRecord, ResultSet};
use crate::error::{Error, Result};
use crate::settings::{CompareConfig, MaxDiff, Sensitivity};

/// CSV header row.
pub const CSV_HEADER: &str = "Reference,Candidate,Difference";

/// Compared records with `percentage <= max_percent`, in input order.
#[must_use]
pub fn filter_visible(results: &ResultSet, max_percent: f64) -> Vec<&DiffRecord> {
    results
        .records()
        .filter(|r| r.percentage <= max_percent)
        .collect()
}

/// Compared records at or below the max-diff cutoff, in input order.
#[must_use]
pub fn visible(results: &ResultSet, max_diff: MaxDiff) -> Vec<&DiffRecord> {
    filter_visible(results, max_diff.percent())
}

/// How a result set splits under a cutoff.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSummary {
    /// Compared and within the cutoff.
    pub visible: usize,
    /// Compared but above the cutoff.
    pub hidden: usize,
    /// Not compared at all.
    pub failed: usize,
}

impl ResultSet {
    /// Shorthand for [`visible`].
    #[must_use]
    pub fn visible(&self, max_diff: MaxDiff) -> Vec<&DiffRecord> {
        visible(self, max_diff)
    }

    /// Count visible, filtered-out and failed items.
    #[must_use]
    pub fn summary(&self, max_diff: MaxDiff) -> FilterSummary {
        let compared = self.records().count();
        let visible = visible(self, max_diff).len();
        FilterSummary {
            visible,
            hidden: compared - visible,
            failed: self.len() - compared,
        }
    }
}

/// CSV text: [`CSV_HEADER`], then one fully quoted row per record with the
/// reference name, candidate name and `"<percentage>%"`.
///
/// Lines are joined with `\n` and there is no trailing newline, so an
/// empty subset yields the bare header.
pub fn to_csv(reference_name: &str, visible: &[&DiffRecord]) -> Result<String> {
    let mut buf = Vec::with_capacity(64 * (visible.len() + 1));
    buf.extend_from_slice(CSV_HEADER.as_bytes());
    buf.push(b'\n');

    let mut wtr = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Always)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(buf);

    for record in visible {
        let difference = format!("{}%", record.percentage_label());
        wtr.write_record([reference_name, record.candidate.as_str(), difference.as_str()])?;
    }

    let mut bytes = wtr.into_inner().map_err(|e| Error::Io(e.into_error()))?;
    if bytes.last() == Some(&b'\n') {
        bytes.pop();
    }
    String::from_utf8(bytes).map_err(|e| Error::Encode(e.to_string()))
}

/// CSV text ready to save under its default file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvExport {
    /// Default file name, stamped with the export time.
    pub file_name: String,
    /// `text/csv`, UTF-8.
    pub text: String,
}

/// Default CSV file name for an export made at `at`.
///
/// Both the date and the `HHMM` part are read from `at` in local time, so
/// the two always agree, even around midnight UTC.
#[must_use]
pub fn export_file_name(sensitivity: Sensitivity, at: &DateTime<Local>) -> String {
    format!(
        "{}_{}_sensitivity_{}.csv",
        at.format("%Y-%m-%d"),
        at.format("%H%M"),
        sensitivity
    )
}

/// Build the CSV export for the visible records at time `at`.
pub fn export_csv(
    reference_name: &str,
    visible: &[&DiffRecord],
    sensitivity: Sensitivity,
    at: &DateTime<Local>,
) -> Result<CsvExport> {
    Ok(CsvExport {
        file_name: export_file_name(sensitivity, at),
        text: to_csv(reference_name, visible)?,
    })
}

/// Write the CSV export into `dir`, named from the current wall clock.
pub fn write_csv(
    dir: &Path,
    reference_name: &str,
    visible: &[&DiffRecord],
    sensitivity: Sensitivity,
) -> Result<PathBuf> {
    let export = export_csv(reference_name, visible, sensitivity, &Local::now())?;
    std::fs::create_dir_all(dir)?;
    let path = dir.join(&export.file_name);
    std::fs::write(&path, export.text)?;
    Ok(path)
}

/// File name for a candidate's exported diff image.
///
/// Path separators in relative candidate names are flattened to `_`, so
/// `a/x.png` exports as `diff-a_x.png` directly inside the output folder.
#[must_use]
pub fn diff_file_name(candidate: &str) -> String {
    let flat: String = candidate
        .chars()
        .map(|c| if matches!(c, '/' | '\\') { '_' } else { c })
        .collect();
    format!("diff-{flat}")
}

/// Write each record's diff raster as PNG bytes named [`diff_file_name`].
///
/// Every record gets its own file: when a name is already taken in this
/// export, a `-2`, `-3`, ... suffix is inserted before the extension.
/// Returned paths follow record order.
pub fn write_diff_images(dir: &Path, records: &[&DiffRecord]) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)?;
    let mut taken = HashSet::new();
    records
        .iter()
        .map(|record| {
            let name = unique_name(&diff_file_name(&record.candidate), &mut taken);
            let path = dir.join(name);
            std::fs::write(&path, record.diff.to_png()?)?;
            tracing::debug!(candidate = %record.candidate, path = %path.display(), "wrote diff image");
            Ok(path)
        })
        .collect()
}

fn unique_name(name: &str, taken: &mut HashSet<String>) -> String {
    if taken.insert(name.to_string()) {
        return name.to_string();
    }
    let (stem, ext) = match name.rfind('.') {
        Some(dot) if dot > 0 => (&name[..dot], &name[dot..]),
        _ => (name, ""),
    };
    let mut n = 2;
    loop {
        let candidate = format!("{stem}-{n}{ext}");
        if taken.insert(candidate.clone()) {
            return candidate;
        }
        n += 1;
    }
}

/// One bar of a per-candidate difference chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    /// Candidate name.
    pub name: String,
    /// Percentage difference.
    pub diff: f64,
}

/// Chart rows for the visible records.
#[must_use]
pub fn chart_points(visible: &[&DiffRecord]) -> Vec<ChartPoint> {
    visible
        .iter()
        .map(|r| ChartPoint {
            name: r.candidate.clone(),
            diff: r.percentage,
        })
        .collect()
}

/// A compared candidate in a [`Report`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportRow {
    /// Candidate name.
    pub candidate: String,
    /// Two-decimal percentage, no unit.
    pub percentage: String,
    /// Within the max-diff cutoff.
    pub visible: bool,
}

/// A failed candidate in a [`Report`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailureRow {
    /// Candidate name.
    pub candidate: String,
    /// Failure message.
    pub reason: String,
}

/// Serializable summary of one batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    /// Reference display name.
    pub reference: String,
    /// Sensitivity used.
    pub sensitivity: u32,
    /// Threshold derived from it.
    pub threshold: u32,
    /// Max-diff cutoff in percent.
    pub max_diff: u32,
    /// How the batch ended.
    pub status: BatchStatus,
    /// Compared candidates, in input order.
    pub rows: Vec<ReportRow>,
    /// Failed candidates, in input order.
    pub failures: Vec<FailureRow>,
    /// Visible / hidden / failed counts.
    pub summary: FilterSummary,
    /// When this report was generated.
    pub generated_at: DateTime<Utc>,
}

impl Report {
    /// Summarize a batch outcome under `config`.
    #[must_use]
    pub fn new(reference_name: &str, outcome: &BatchOutcome, config: &CompareConfig) -> Self {
        let cutoff = config.max_diff.percent();
        Self {
            reference: reference_name.to_string(),
            sensitivity: config.sensitivity.value(),
            threshold: config.threshold().value(),
            max_diff: config.max_diff.value(),
            status: outcome.status,
            rows: outcome
                .results
                .records()
                .map(|r| ReportRow {
                    candidate: r.candidate.clone(),
                    percentage: r.percentage_label(),
                    visible: r.percentage <= cutoff,
                })
                .collect(),
            failures: outcome
                .results
                .failures()
                .map(|f| FailureRow {
                    candidate: f.candidate.clone(),
                    reason: f.error.to_string(),
                })
                .collect(),
            summary: outcome.results.summary(config.max_diff),
            generated_at: Utc::now(),
        }
    }

    /// Pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write as pretty-printed JSON to `path`.
    pub fn write_json(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }
}
