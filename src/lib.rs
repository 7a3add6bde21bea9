//! # xdi-export - End-of-Run XDI Export
//!
//! `xdi_export` turns a completed experiment run (start record, baseline
//! snapshot and named data streams) into a single XAS Data Interchange (XDI)
//! ASCII file: an ordered metadata header followed by a normalized,
//! consistently formatted numeric table.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use xdi_export::catalog::{JsonCatalog, RunCatalog};
//! use xdi_export::export::{ExportConfig, ExportOutcome, Exporter};
//!
//! let catalog = JsonCatalog::open("/data/catalog")?;
//! let run = catalog.get("9a1f2c3d")?;
//!
//! let exporter = Exporter::new(ExportConfig::default());
//! match exporter.export_run(&run, "/data/xdi".as_ref())? {
//!     ExportOutcome::Written { path, rows, .. } => {
//!         println!("Wrote {} rows to {}", rows, path.display())
//!     }
//!     ExportOutcome::NoPrimaryStream => println!("Nothing to export"),
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Pipeline
//!
//! ```text
//! Run ──► extract ──► ColumnTable ──► normalize ──► ColumnTable ──► format ──► writer
//!  │                                      ▲                                      ▲
//!  └────► metadata (HeaderBuilder) ───────┴── MetadataRecord ────────────────────┘
//! ```
//!
//! ## Architecture
//!
//! - [`fallback`]: first-match lookup over nested keyed containers
//! - [`run`]: run, stream and channel data model
//! - [`catalog`]: run lookup by uid
//! - [`table`]: ordered, equal-length named columns
//! - [`extract`]: primary stream to raw column table
//! - [`metadata`]: ordered header record and its builder
//! - [`normalize`]: column renaming, derivation and ROI annotation
//! - [`format`]: per-column printf-style numeric formats
//! - [`naming`]: output file names
//! - [`writer`]: XDI serialization and atomic file writes
//! - [`export`]: the end-to-end pipeline and batch export
//! - [`validation`]: stream read checks
//! - [`report`]: batch export outcome report

// Documentation lints - enforce complete documentation for publication
#![deny(missing_docs)]
#![deny(rustdoc::missing_crate_level_docs)]

pub mod catalog;
pub mod export;
pub mod extract;
pub mod fallback;
pub mod format;
pub mod metadata;
pub mod naming;
pub mod normalize;
pub mod report;
pub mod run;
pub mod table;
pub mod validation;
pub mod writer;

#[cfg(test)]
mod test_util;

/// Re-export commonly used types for convenience
pub mod prelude {
    pub use crate::catalog::{CatalogError, JsonCatalog, MemoryCatalog, RunCatalog};
    pub use crate::export::{ExportConfig, ExportError, ExportOutcome, ExportTarget, Exporter};
    pub use crate::extract::{get_run_data, ExtractOptions};
    pub use crate::fallback::{get_with_fallbacks, Candidate, NestedLookup};
    pub use crate::format::{column_formats, FormatSpec};
    pub use crate::metadata::{
        FacilityInfo, HeaderBuilder, MetaValue, MetadataRecord, TimestampZone,
    };
    pub use crate::normalize::normalize;
    pub use crate::report::{ExportReport, RunResult, RunStatus};
    pub use crate::run::{Channel, ChannelData, Run, Stream};
    pub use crate::table::{Column, ColumnData, ColumnTable};
    pub use crate::writer::{render_xdi, write_xdi_file, WriterError, WriterStats};
}
