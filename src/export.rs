//! # End-of-Run Export
//!
//! Runs the full pipeline for one run:
//!
//! ```text
//! extract → header → normalize → formats → file name → write
//! ```
//!
//! Each run is processed independently and deterministically; nothing is
//! shared between invocations, so batches may be exported concurrently
//! (see the `parallel` feature). Runs without a primary stream are a valid
//! "nothing to export" outcome, not an error.
//!
//! Retrying transient failures is left to whatever schedules the export.

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime};
use log::{debug, info, warn};
use serde_json::Value;
use std::path::{Path, PathBuf};

use crate::catalog::{CatalogError, RunCatalog};
use crate::extract::{get_run_data, ExtractError, ExtractOptions};
use crate::fallback::{get_with_fallbacks, Candidate};
use crate::format::{column_formats, FormatSpec};
use crate::metadata::{
    FacilityInfo, HeaderBuilder, MetaValue, MetadataError, MetadataRecord, TimestampZone,
};
use crate::naming::{output_path, sanitize_file_name};
use crate::normalize::{normalize, roi_table, NormalizeError};
use crate::report::{ExportReport, RunResult};
use crate::run::Run;
use crate::table::ColumnTable;
use crate::writer::{write_xdi_file, WriterError};

/// Errors that abort the export of one run
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// The run could not be loaded
    #[error("Catalog error: {0}")]
    CatalogError(#[from] CatalogError),

    /// Primary stream data could not be tabulated
    #[error("Extraction error: {0}")]
    ExtractError(#[from] ExtractError),

    /// Header metadata is missing or invalid
    #[error("Metadata error: {0}")]
    MetadataError(#[from] MetadataError),

    /// Column normalization failed
    #[error("Normalization error: {0}")]
    NormalizeError(#[from] NormalizeError),

    /// The output file could not be written
    #[error("Writer error: {0}")]
    WriterError(#[from] WriterError),

    /// Proposal id or cycle is missing; no export directory can be built
    #[error("Incomplete proposal metadata: missing {0}")]
    IncompleteMetadata(String),

    /// `start_datetime` is present but not an ISO-8601 date
    #[error("Invalid start_datetime: {0}")]
    InvalidVisitDate(String),
}

/// Where exported files go
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportTarget {
    /// A fixed directory
    Directory(PathBuf),
    /// `<root>/<cycle>/pass-<proposal id>/<YYYYMMDD>_export`
    ProposalTree(PathBuf),
}

/// Settings shared by every export
#[derive(Debug, Clone, Default)]
pub struct ExportConfig {
    /// Facility and beamline constants
    pub facility: FacilityInfo,
    /// Time zone for `Scan.start_time`
    pub timezone: TimestampZone,
    /// Channel selection
    pub extract: ExtractOptions,
    /// Entries applied over the built header
    pub header_updates: MetadataRecord,
}

/// Header, table and formats for one run, ready to be written
#[derive(Debug, Clone)]
pub struct PreparedExport {
    /// Ordered header entries
    pub metadata: MetadataRecord,
    /// Normalized columns
    pub table: ColumnTable,
    /// One format per column
    pub formats: Vec<FormatSpec>,
    /// Free-text run comment
    pub comment: String,
}

/// Result of a successful export call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
    /// A file was written
    Written {
        /// Final file path
        path: PathBuf,
        /// Number of columns
        columns: usize,
        /// Number of rows
        rows: usize,
    },
    /// The run has no primary stream; nothing was written
    NoPrimaryStream,
}

/// Runs the export pipeline
#[derive(Debug, Clone, Default)]
pub struct Exporter {
    config: ExportConfig,
}

impl Exporter {
    /// Create an exporter
    pub fn new(config: ExportConfig) -> Self {
        Self { config }
    }

    /// Exporter settings
    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    fn header_builder(&self) -> HeaderBuilder {
        HeaderBuilder::new()
            .with_facility(self.config.facility.clone())
            .with_timezone(self.config.timezone)
    }

    /// Build header, normalized table and formats without touching disk.
    ///
    /// Returns `None` when the run has no primary stream.
    pub fn prepare(&self, run: &Run) -> Result<Option<PreparedExport>, ExportError> {
        if !run.has_primary() {
            return Ok(None);
        }
        let mut metadata = self.header_builder().build(run)?;
        metadata.extend(&self.config.header_updates);

        let raw = get_run_data(run, &self.config.extract)?;
        debug!("Read {} from {}", raw, run.label());
        let table = normalize(&raw, &mut metadata, &roi_table(run))?;
        let formats = column_formats(&table);

        Ok(Some(PreparedExport {
            metadata,
            table,
            formats,
            comment: run.comment().to_string(),
        }))
    }

    /// Export one run into `dir`
    pub fn export_run(&self, run: &Run, dir: &Path) -> Result<ExportOutcome, ExportError> {
        let Some(prepared) = self.prepare(run)? else {
            info!("No primary stream for {}, nothing to export", run.label());
            return Ok(ExportOutcome::NoPrimaryStream);
        };
        let path = output_path(dir, &prepared.metadata);
        info!("Exporting {} to {}", run.label(), path.display());
        let stats = write_xdi_file(
            &path,
            &prepared.metadata,
            &prepared.comment,
            &prepared.table,
            &prepared.formats,
        )?;
        info!("{}", stats);
        Ok(ExportOutcome::Written {
            path: stats.path,
            columns: stats.columns,
            rows: stats.rows,
        })
    }

    /// Export one run to a target, resolving the proposal directory if needed
    pub fn export_to(&self, run: &Run, target: &ExportTarget) -> Result<ExportOutcome, ExportError> {
        if !run.has_primary() {
            info!("No primary stream for {}, nothing to export", run.label());
            return Ok(ExportOutcome::NoPrimaryStream);
        }
        let dir = match target {
            ExportTarget::Directory(dir) => dir.clone(),
            ExportTarget::ProposalTree(root) => export_path(run, root, Local::now().date_naive())?,
        };
        self.export_run(run, &dir)
    }

    /// Load a run from the catalog and export it; never fails the caller
    pub fn export_uid<C: RunCatalog + ?Sized>(
        &self,
        catalog: &C,
        uid: &str,
        target: &ExportTarget,
    ) -> RunResult {
        let run = match catalog.get(uid) {
            Ok(run) => run,
            Err(e) => {
                warn!("Export failed for {}: {}", uid, e);
                return RunResult::failed(uid, None, e.to_string());
            }
        };
        match self.export_to(&run, target) {
            Ok(ExportOutcome::Written {
                path,
                columns,
                rows,
            }) => RunResult::exported(uid, run.scan_id(), path, columns, rows),
            Ok(ExportOutcome::NoPrimaryStream) => {
                RunResult::skipped(uid, run.scan_id(), "no primary stream")
            }
            Err(e) => {
                warn!("Export failed for {}: {}", run.label(), e);
                RunResult::failed(uid, run.scan_id(), e.to_string())
            }
        }
    }

    /// Export several runs independently; one failure does not stop the rest
    #[cfg(not(feature = "parallel"))]
    pub fn export_batch<C: RunCatalog + ?Sized>(
        &self,
        catalog: &C,
        uids: &[String],
        target: &ExportTarget,
    ) -> ExportReport {
        let results = uids
            .iter()
            .map(|uid| self.export_uid(catalog, uid, target))
            .collect();
        ExportReport::new(results)
    }

    /// Export several runs independently; one failure does not stop the rest
    #[cfg(feature = "parallel")]
    pub fn export_batch<C: RunCatalog + Sync + ?Sized>(
        &self,
        catalog: &C,
        uids: &[String],
        target: &ExportTarget,
    ) -> ExportReport {
        use rayon::prelude::*;

        let results = uids
            .par_iter()
            .map(|uid| self.export_uid(catalog, uid, target))
            .collect();
        ExportReport::new(results)
    }
}

/// `<root>/<cycle>/pass-<proposal id>` for a run.
///
/// Both fields are required; a path is never built from placeholders.
/// Each is sanitized to a single path component, so the result always lies
/// inside `root`.
pub fn proposal_path(run: &Run, root: &Path) -> Result<PathBuf, ExportError> {
    let proposal_id = required_start_field(
        &run.start,
        &[Candidate::chain(["proposal", "proposal_id"]), Candidate::key("proposal_id")],
        "proposal id",
    )?;
    let cycle = required_start_field(&run.start, &[Candidate::key("cycle")], "cycle")?;
    Ok(root
        .join(sanitize_file_name(&cycle))
        .join(sanitize_file_name(&format!("pass-{}", proposal_id))))
}

/// Dated export directory inside the proposal directory.
///
/// The date comes from `start_datetime`, or `today` when the run has none.
pub fn export_path(run: &Run, root: &Path, today: NaiveDate) -> Result<PathBuf, ExportError> {
    let visit_date = match run.start.get("start_datetime").and_then(Value::as_str) {
        Some(text) => parse_visit_date(text)?,
        None => today,
    };
    Ok(proposal_path(run, root)?.join(format!("{}_export", visit_date.format("%Y%m%d"))))
}

fn required_start_field(
    start: &Value,
    candidates: &[Candidate],
    what: &str,
) -> Result<String, ExportError> {
    let value = get_with_fallbacks(start, candidates)
        .map(|v| MetaValue::from_json(v).to_string())
        .unwrap_or_default();
    if value.is_empty() {
        return Err(ExportError::IncompleteMetadata(what.to_string()));
    }
    Ok(value)
}

fn parse_visit_date(text: &str) -> Result<NaiveDate, ExportError> {
    let text = text.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Ok(dt.date_naive());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f") {
        return Ok(dt.date());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S%.f") {
        return Ok(dt.date());
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .map_err(|_| ExportError::InvalidVisitDate(text.to_string()))
}
