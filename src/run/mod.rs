//! # Run Data Model
//!
//! A [`Run`] is a read-only handle to one completed measurement. It carries:
//!
//! - a `start` record: free-form nested metadata, at minimum `uid`,
//!   `scan_id` and `time` (Unix epoch seconds)
//! - a `baseline` snapshot: single-shot readings of slowly varying channels
//!   plus their acquisition configuration
//! - zero or more named [`Stream`]s (the main time series is `"primary"`)
//!
//! Runs are produced by a [`crate::catalog::RunCatalog`] and never modified by
//! the export pipeline.
//!
//! ## Document Layout
//!
//! ```json
//! {
//!   "start": {"uid": "9a1f...", "scan_id": 1021, "time": 1714060800.0},
//!   "baseline": {
//!     "data": [{"name": "manip_x", "data": [12.5]}],
//!     "configuration": {}
//!   },
//!   "streams": {
//!     "primary": {
//!       "data": [
//!         {"name": "en_energy_setpoint", "data": [280.0, 281.0]},
//!         {"name": "nexafs_i0up", "data": [1.2e-9, 1.3e-9]}
//!       ],
//!       "configuration": {}
//!     }
//!   }
//! }
//! ```

mod channel;

pub use channel::{Channel, ChannelData, ChannelKind};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::fallback::NestedLookup;

/// Name of the main time-series stream
pub const PRIMARY_STREAM: &str = "primary";

/// A named collection of channels captured together
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Stream {
    /// Channels in natural read order
    #[serde(default)]
    pub data: Vec<Channel>,

    /// Acquisition configuration (device → {"data": {...}} style nesting)
    #[serde(default)]
    pub configuration: Value,
}

impl Stream {
    /// Create a stream from channels with an empty configuration
    pub fn new(data: Vec<Channel>) -> Self {
        Self {
            data,
            configuration: Value::Null,
        }
    }

    /// Attach an acquisition configuration
    pub fn with_configuration(mut self, configuration: Value) -> Self {
        self.configuration = configuration;
        self
    }

    /// Channel names in read order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.data.iter().map(|c| c.name.as_str())
    }

    /// Look up a channel by name
    pub fn channel(&self, name: &str) -> Option<&Channel> {
        self.data.iter().find(|c| c.name == name)
    }

    /// Approximate in-memory size of all channel values
    pub fn nbytes(&self) -> usize {
        self.data.iter().map(|c| c.data.nbytes()).sum()
    }
}

impl NestedLookup for Stream {
    type Item = Channel;

    fn get_key(&self, key: &str) -> Option<&Channel> {
        self.channel(key)
    }
}

/// One completed measurement
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Run {
    /// Start document metadata
    #[serde(default)]
    pub start: Value,

    /// Single-shot snapshot of slowly varying instrument state
    #[serde(default)]
    pub baseline: Stream,

    /// Named data streams
    #[serde(default)]
    pub streams: BTreeMap<String, Stream>,
}

impl Run {
    /// Create a run from its start record
    pub fn new(start: Value) -> Self {
        Self {
            start,
            ..Default::default()
        }
    }

    /// Set the baseline snapshot
    pub fn with_baseline(mut self, baseline: Stream) -> Self {
        self.baseline = baseline;
        self
    }

    /// Add (or replace) a named stream
    pub fn with_stream(mut self, name: impl Into<String>, stream: Stream) -> Self {
        self.streams.insert(name.into(), stream);
        self
    }

    /// Whether a stream with this name exists
    pub fn contains_stream(&self, name: &str) -> bool {
        self.streams.contains_key(name)
    }

    /// Whether the run has tabular data to export
    pub fn has_primary(&self) -> bool {
        self.contains_stream(PRIMARY_STREAM)
    }

    /// Look up a stream by name
    pub fn stream(&self, name: &str) -> Option<&Stream> {
        self.streams.get(name)
    }

    /// The primary stream, if present
    pub fn primary(&self) -> Option<&Stream> {
        self.stream(PRIMARY_STREAM)
    }

    /// Run unique identifier
    pub fn uid(&self) -> Option<&str> {
        self.start.get("uid").and_then(Value::as_str)
    }

    /// Transient numeric scan id
    pub fn scan_id(&self) -> Option<i64> {
        self.start.get("scan_id").and_then(Value::as_i64)
    }

    /// Start time as Unix epoch seconds
    pub fn time(&self) -> Option<f64> {
        self.start.get("time").and_then(Value::as_f64)
    }

    /// Free-text comment attached to the run (empty when absent)
    pub fn comment(&self) -> &str {
        self.start
            .get("comment")
            .and_then(Value::as_str)
            .unwrap_or("")
    }

    /// `uid`/`scan_id` pair used to label log lines and failures
    pub fn label(&self) -> String {
        match (self.uid(), self.scan_id()) {
            (Some(uid), Some(scan_id)) => format!("scan {} ({})", scan_id, uid),
            (Some(uid), None) => uid.to_string(),
            (None, Some(scan_id)) => format!("scan {}", scan_id),
            (None, None) => "<unidentified run>".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fallback::{get_with_fallbacks, Candidate};
    use serde_json::json;

    fn sample_run() -> Run {
        let doc = json!({
            "start": {"uid": "abc", "scan_id": 7, "time": 1.5e9, "comment": "line1\nline2"},
            "baseline": {"data": [{"name": "Manipulator_x", "data": [3.25]}]},
            "streams": {
                "primary": {
                    "data": [
                        {"name": "en_energy", "data": [280.0, 281.5]},
                        {"name": "counter", "data": [1, 2]},
                        {"name": "tes_mca_spectrum", "data": [[1.0, 2.0], [3.0, 4.0]]}
                    ]
                }
            }
        });
        serde_json::from_value(doc).unwrap()
    }

    #[test]
    fn test_run_document_parsing() {
        let run = sample_run();
        assert!(run.has_primary());
        assert!(!run.contains_stream("baseline"));
        assert_eq!(run.uid(), Some("abc"));
        assert_eq!(run.scan_id(), Some(7));
        assert_eq!(run.comment(), "line1\nline2");

        let primary = run.primary().unwrap();
        let names: Vec<_> = primary.keys().collect();
        assert_eq!(names, vec!["en_energy", "counter", "tes_mca_spectrum"]);
        assert_eq!(primary.channel("counter").unwrap().kind(), ChannelKind::Int);
        assert_eq!(primary.channel("en_energy").unwrap().kind(), ChannelKind::Float);
        assert_eq!(
            primary.channel("tes_mca_spectrum").unwrap().kind(),
            ChannelKind::Array
        );
    }

    #[test]
    fn test_baseline_fallback_lookup() {
        let run = sample_run();
        let value = get_with_fallbacks(&run.baseline, &Candidate::keys(&["manip_x", "Manipulator_x"]))
            .and_then(Channel::first_f64);
        assert_eq!(value, Some(3.25));

        // Channels are leaves: chains through them never resolve
        let nested = get_with_fallbacks(&run.baseline, &[Candidate::chain(["Manipulator_x", "data"])]);
        assert!(nested.is_none());
    }

    #[test]
    fn test_label() {
        let run = sample_run();
        assert_eq!(run.label(), "scan 7 (abc)");
        assert_eq!(Run::default().label(), "<unidentified run>");
    }
}
