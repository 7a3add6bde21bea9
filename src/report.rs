//! Batch export report.
//!
//! One [`RunResult`] per requested uid, printed as a plain or colorized
//! summary by the CLI.

use std::fmt;
use std::path::PathBuf;

#[cfg(feature = "colorized_output")]
use console::style;

/// Outcome of exporting one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunStatus {
    /// A file was written
    Exported {
        /// Final file path
        path: PathBuf,
        /// Number of columns
        columns: usize,
        /// Number of rows
        rows: usize,
    },
    /// Nothing to export
    Skipped(String),
    /// Export failed
    Failed(String),
}

impl RunStatus {
    fn is_exported(&self) -> bool {
        matches!(self, RunStatus::Exported { .. })
    }

    fn is_failed(&self) -> bool {
        matches!(self, RunStatus::Failed(_))
    }
}

/// Export result for one uid
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunResult {
    /// Requested run uid
    pub uid: String,
    /// Scan id, when the run could be loaded
    pub scan_id: Option<i64>,
    /// What happened
    pub status: RunStatus,
}

impl RunResult {
    pub(crate) fn exported(
        uid: impl Into<String>,
        scan_id: Option<i64>,
        path: PathBuf,
        columns: usize,
        rows: usize,
    ) -> Self {
        Self {
            uid: uid.into(),
            scan_id,
            status: RunStatus::Exported {
                path,
                columns,
                rows,
            },
        }
    }

    pub(crate) fn skipped(
        uid: impl Into<String>,
        scan_id: Option<i64>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            uid: uid.into(),
            scan_id,
            status: RunStatus::Skipped(reason.into()),
        }
    }

    pub(crate) fn failed(
        uid: impl Into<String>,
        scan_id: Option<i64>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            uid: uid.into(),
            scan_id,
            status: RunStatus::Failed(message.into()),
        }
    }

    /// `scan <id> (<uid>)`, or just the uid when the scan id is unknown
    pub fn label(&self) -> String {
        match self.scan_id {
            Some(scan_id) => format!("scan {} ({})", scan_id, self.uid),
            None => self.uid.clone(),
        }
    }
}

/// Results of a batch export, in request order
#[derive(Debug, Clone, Default)]
pub struct ExportReport {
    /// One entry per requested uid
    pub results: Vec<RunResult>,
}

impl ExportReport {
    /// Create a report from per-run results
    pub fn new(results: Vec<RunResult>) -> Self {
        Self { results }
    }

    /// Whether any run failed
    pub fn has_failures(&self) -> bool {
        self.results.iter().any(|r| r.status.is_failed())
    }

    /// Number of files written
    pub fn exported_count(&self) -> usize {
        self.results.iter().filter(|r| r.status.is_exported()).count()
    }

    /// Number of runs with nothing to export
    pub fn skipped_count(&self) -> usize {
        self.results
            .iter()
            .filter(|r| matches!(r.status, RunStatus::Skipped(_)))
            .count()
    }

    /// Number of failed runs
    pub fn failure_count(&self) -> usize {
        self.results.iter().filter(|r| r.status.is_failed()).count()
    }

    /// Format the report with colors (requires console feature)
    pub fn format_colored(&self) -> String {
        #[cfg(feature = "colorized_output")]
        {
            use console::Emoji;

            static OK: Emoji<'_, '_> = Emoji("✓", "[OK]");
            static SKIP: Emoji<'_, '_> = Emoji("-", "[SKIP]");
            static FAIL: Emoji<'_, '_> = Emoji("✗", "[FAIL]");

            let mut output = String::new();
            output.push_str(&format!("{}\n", style("XDI Export Report").bold().cyan()));
            output.push_str(&format!("{}\n\n", style("=================").cyan()));

            for result in &self.results {
                let label = result.label();
                match &result.status {
                    RunStatus::Exported {
                        path,
                        columns,
                        rows,
                    } => output.push_str(&format!(
                        "[{}] {} -> {} ({} columns x {} rows)\n",
                        OK,
                        style(label).green(),
                        path.display(),
                        columns,
                        rows
                    )),
                    RunStatus::Skipped(reason) => output.push_str(&format!(
                        "[{}] {} - {}: {}\n",
                        SKIP,
                        style(label).yellow(),
                        style("SKIPPED").yellow().bold(),
                        reason
                    )),
                    RunStatus::Failed(msg) => output.push_str(&format!(
                        "[{}] {} - {}: {}\n",
                        FAIL,
                        style(label).red(),
                        style("FAILED").red().bold(),
                        msg
                    )),
                }
            }

            output.push('\n');
            output.push_str(&format!(
                "{}: {} exported, {} skipped, {} failed\n",
                style("Summary").bold(),
                style(self.exported_count()).green(),
                style(self.skipped_count()).yellow(),
                style(self.failure_count()).red()
            ));
            output
        }

        #[cfg(not(feature = "colorized_output"))]
        {
            format!("{}", self)
        }
    }
}

impl fmt::Display for ExportReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "XDI Export Report")?;
        writeln!(f, "=================")?;
        writeln!(f)?;

        for result in &self.results {
            match &result.status {
                RunStatus::Exported {
                    path,
                    columns,
                    rows,
                } => writeln!(
                    f,
                    "[✓] {} -> {} ({} columns x {} rows)",
                    result.label(),
                    path.display(),
                    columns,
                    rows
                )?,
                RunStatus::Skipped(reason) => {
                    writeln!(f, "[-] {} - SKIPPED: {}", result.label(), reason)?
                }
                RunStatus::Failed(msg) => writeln!(f, "[✗] {} - FAILED: {}", result.label(), msg)?,
            }
        }

        writeln!(f)?;
        writeln!(
            f,
            "Summary: {} exported, {} skipped, {} failed",
            self.exported_count(),
            self.skipped_count(),
            self.failure_count()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_report() -> ExportReport {
        ExportReport::new(vec![
            RunResult::exported("a1", Some(10), PathBuf::from("/out/scan_10.xdi"), 4, 120),
            RunResult::skipped("b2", Some(11), "no primary stream"),
            RunResult::failed("c3", None, "Catalog error: Run not found: c3"),
        ])
    }

    #[test]
    fn test_counts() {
        let report = sample_report();
        assert_eq!(report.exported_count(), 1);
        assert_eq!(report.skipped_count(), 1);
        assert_eq!(report.failure_count(), 1);
        assert!(report.has_failures());
        assert!(!ExportReport::default().has_failures());
    }

    #[test]
    fn test_display() {
        let text = sample_report().to_string();
        assert!(text.contains("[✓] scan 10 (a1) -> /out/scan_10.xdi (4 columns x 120 rows)"));
        assert!(text.contains("[-] scan 11 (b2) - SKIPPED: no primary stream"));
        assert!(text.contains("[✗] c3 - FAILED: Catalog error"));
        assert!(text.ends_with("Summary: 1 exported, 1 skipped, 1 failed\n"));
    }

    #[test]
    fn test_format_colored_mentions_every_run() {
        let text = sample_report().format_colored();
        for uid in ["a1", "b2", "c3"] {
            assert!(text.contains(uid));
        }
    }
}
