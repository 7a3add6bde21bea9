//! Reading a run's primary stream into an ordered [`ColumnTable`].
//!
//! Only one-dimensional channels are tabular; spectra and images are skipped.
//! When the stream has no `seconds` channel, one is synthesized from the
//! exposure time found in the acquisition configuration.

use log::debug;
use serde_json::Value;

use crate::fallback::{get_with_fallbacks, Candidate};
use crate::run::{ChannelData, Run, Stream};
use crate::table::{Column, ColumnData, ColumnTable, TableError};

/// Columns placed first, in this order, when present
pub const NATURAL_ORDER: &[&str] = &[
    "en_energy_setpoint",
    "en_energy",
    "time",
    "seconds",
    "nexafs_i0up",
    "nexafs_i1",
    "nexafs_ref",
    "nexafs_sc",
    "nexafs_pey",
    "tes_mca_counts",
    "tes_mca_pfy",
];

/// Multi-dimensional channels that never go into the table
pub const KNOWN_ARRAY_KEYS: &[&str] = &["tes_mca_spectrum", "spectrum", "rixs"];

/// Channels omitted from the table unless the caller says otherwise
pub const DEFAULT_OMIT: &[&str] = &["tes_scan_point_start", "tes_scan_point_end"];

/// Name of the exposure-time column
pub const SECONDS: &str = "seconds";

/// Errors from reading run data
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    /// The run has no primary stream
    #[error("Run has no primary stream")]
    MissingPrimary,

    /// Channel data violates the table invariants
    #[error("Inconsistent channel data: {0}")]
    Table(#[from] TableError),
}

/// Options controlling which channels are read
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    /// Channel names to leave out
    pub omit: Vec<String>,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            omit: DEFAULT_OMIT.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl ExtractOptions {
    fn omits(&self, name: &str) -> bool {
        self.omit.iter().any(|o| o == name)
    }
}

/// Configuration paths historically used for the detector exposure time,
/// in priority order
pub fn exposure_candidates() -> Vec<Candidate> {
    vec![
        Candidate::chain(["nexafs_i0up", "data", "nexafs_i0up_exposure_time"]),
        Candidate::chain(["nexafs_i1", "data", "nexafs_i0up_exposure_time"]),
        Candidate::chain(["nexafs_sc", "data", "ucal_sc_exposure_time"]),
    ]
}

/// Exposure time for the run's primary stream.
///
/// Tries the primary acquisition configuration, then the baseline
/// configuration; zero when neither records one.
pub fn exposure_time(run: &Run) -> f64 {
    let candidates = exposure_candidates();
    let configs = run
        .primary()
        .map(|s| &s.configuration)
        .into_iter()
        .chain(std::iter::once(&run.baseline.configuration));
    configs
        .filter_map(|config| get_with_fallbacks(config, &candidates))
        .find_map(as_number)
        .unwrap_or(0.0)
}

// Configuration values are sometimes wrapped in a one-element list.
fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Array(items) => items.first().and_then(as_number),
        Value::String(s) => s.trim().parse().ok(),
        other => other.as_f64(),
    }
}

/// Read the primary stream into columns.
///
/// Columns named in [`NATURAL_ORDER`] come first in that order; the rest
/// keep the stream's read order.
pub fn get_run_data(run: &Run, options: &ExtractOptions) -> Result<ColumnTable, ExtractError> {
    let primary = run.primary().ok_or(ExtractError::MissingPrimary)?;
    let mut read = read_tabular(primary, options);

    if !read.iter().any(|c| c.name == SECONDS) && !options.omits(SECONDS) {
        let exposure = exposure_time(run);
        let n = read.first().map_or(0, |c| c.data.len());
        debug!("Synthesizing '{}' column from exposure time {}", SECONDS, exposure);
        read.push(Column::new(SECONDS, ColumnData::Float(vec![exposure; n])));
    }

    let mut ordered = Vec::with_capacity(read.len());
    for name in NATURAL_ORDER {
        if let Some(pos) = read.iter().position(|c| c.name == *name) {
            ordered.push(read.remove(pos));
        }
    }
    ordered.extend(read);

    Ok(ColumnTable::from_columns(ordered)?)
}

fn read_tabular(stream: &Stream, options: &ExtractOptions) -> Vec<Column> {
    stream
        .data
        .iter()
        .filter(|c| !KNOWN_ARRAY_KEYS.contains(&c.name.as_str()) && !options.omits(&c.name))
        .filter_map(|c| {
            let data = match &c.data {
                ChannelData::Int(v) => ColumnData::Int(v.clone()),
                ChannelData::Float(v) => ColumnData::Float(v.clone()),
                ChannelData::Array(_) => return None,
            };
            Some(Column::new(c.name.clone(), data))
        })
        .collect()
}
