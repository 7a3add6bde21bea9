//! Stream read validation.
//!
//! Loads a run and reads every stream it holds, logging the size of each
//! stream and the time taken to load the run. The catalog reads a run as one
//! document, so the load is timed as a whole. A run that passes can be
//! exported; a run that fails would fail its export the same way.

use log::info;
use std::fmt;
use std::time::{Duration, Instant};

use crate::catalog::{CatalogError, RunCatalog};
use crate::run::{ChannelKind, Run, Stream};

/// Name under which baseline readings are reported
pub const BASELINE_STREAM: &str = "baseline";

/// What was read from one stream
#[derive(Debug, Clone, PartialEq)]
pub struct StreamSummary {
    /// Stream name
    pub name: String,
    /// Number of channels
    pub channels: usize,
    /// Timepoints of the one-dimensional channels (0 if there are none)
    pub rows: usize,
    /// Size of the channel data in bytes
    pub nbytes: usize,
}

impl fmt::Display for StreamSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} channels, {} rows, {} bytes",
            self.name, self.channels, self.rows, self.nbytes
        )
    }
}

/// Result of reading every stream of a run
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationSummary {
    /// Run uid
    pub uid: String,
    /// One entry per stream, baseline first
    pub streams: Vec<StreamSummary>,
    /// Time taken to load the run
    pub elapsed: Duration,
}

impl ValidationSummary {
    /// Total bytes read
    pub fn nbytes(&self) -> usize {
        self.streams.iter().map(|s| s.nbytes).sum()
    }
}

/// Read every stream of `uid`, logging the size of each and the total load time
pub fn read_all_streams<C: RunCatalog + ?Sized>(
    catalog: &C,
    uid: &str,
) -> Result<ValidationSummary, CatalogError> {
    let start = Instant::now();
    let run = catalog.get(uid)?;
    info!("Validating uid {}", run.uid().unwrap_or(uid));

    let elapsed = start.elapsed();
    info!("elapsed_time = {:?}", elapsed);
    let streams = summarize_streams(&run);

    Ok(ValidationSummary {
        uid: uid.to_string(),
        streams,
        elapsed,
    })
}

/// Summaries of the baseline and every named stream of a loaded run
pub fn summarize_streams(run: &Run) -> Vec<StreamSummary> {
    std::iter::once((BASELINE_STREAM, &run.baseline))
        .chain(run.streams.iter().map(|(name, s)| (name.as_str(), s)))
        .map(|(name, stream)| summarize(name, stream))
        .collect()
}

fn summarize(name: &str, stream: &Stream) -> StreamSummary {
    let rows = stream
        .data
        .iter()
        .filter(|c| c.kind() != ChannelKind::Array)
        .map(|c| c.data.len())
        .max()
        .unwrap_or(0);
    let nbytes = stream.nbytes();
    let summary = StreamSummary {
        name: name.to_string(),
        channels: stream.data.len(),
        rows,
        nbytes,
    };
    info!("{} nbytes = {}", name, nbytes);
    summary
}
