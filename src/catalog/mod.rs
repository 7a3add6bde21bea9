//! # Run Catalog
//!
//! The catalog is the key-addressable store the export pipeline reads runs
//! from. Remote access, transport and authentication live outside this crate;
//! here a catalog is anything implementing [`RunCatalog`].
//!
//! Two implementations are provided:
//!
//! - [`JsonCatalog`]: a directory of `<uid>.json` run documents, optionally
//!   partitioned by beamline acronym (`<root>/<beamline>/<uid>.json`)
//! - [`MemoryCatalog`]: an in-memory map, handy for tests and benchmarks

mod error;

pub use error::CatalogError;

use log::debug;
use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use crate::run::{ChannelKind, Run};

/// Source of runs keyed by unique identifier
pub trait RunCatalog {
    /// Load the run with the given uid
    fn get(&self, uid: &str) -> Result<Run, CatalogError>;
}

/// Directory of JSON run documents
#[derive(Debug, Clone)]
pub struct JsonCatalog {
    root: PathBuf,
}

impl JsonCatalog {
    /// Open a catalog rooted at `root`
    pub fn open(root: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let root = root.as_ref().to_path_buf();
        if !root.is_dir() {
            return Err(CatalogError::NotADirectory(root.display().to_string()));
        }
        Ok(Self { root })
    }

    /// Open the partition for a beamline, falling back to the root when the
    /// catalog is not partitioned
    pub fn open_beamline(root: impl AsRef<Path>, beamline: &str) -> Result<Self, CatalogError> {
        let partition = root.as_ref().join(beamline);
        if partition.is_dir() {
            Self::open(partition)
        } else {
            Self::open(root)
        }
    }

    /// Catalog root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn document_path(&self, uid: &str) -> Result<PathBuf, CatalogError> {
        if uid.is_empty() || uid.contains(['/', '\\']) || uid.starts_with('.') {
            return Err(CatalogError::InvalidUid(uid.to_string()));
        }
        Ok(self.root.join(format!("{}.json", uid)))
    }
}

impl RunCatalog for JsonCatalog {
    fn get(&self, uid: &str) -> Result<Run, CatalogError> {
        let path = self.document_path(uid)?;
        if !path.exists() {
            return Err(CatalogError::NotFound(uid.to_string()));
        }
        debug!("Reading run document {}", path.display());
        let reader = BufReader::new(File::open(&path)?);
        let run: Run = serde_json::from_reader(reader)?;
        check_readable(&run)?;
        Ok(run)
    }
}

/// In-memory catalog
#[derive(Debug, Clone, Default)]
pub struct MemoryCatalog {
    runs: HashMap<String, Run>,
}

impl MemoryCatalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a run under its start-record uid
    pub fn insert(&mut self, run: Run) -> Result<(), CatalogError> {
        let uid = run
            .uid()
            .ok_or_else(|| CatalogError::InvalidRun("start record has no uid".to_string()))?
            .to_string();
        self.runs.insert(uid, run);
        Ok(())
    }

    /// Number of runs held
    pub fn len(&self) -> usize {
        self.runs.len()
    }

    /// Whether the catalog holds no runs
    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }
}

impl RunCatalog for MemoryCatalog {
    fn get(&self, uid: &str) -> Result<Run, CatalogError> {
        let run = self
            .runs
            .get(uid)
            .cloned()
            .ok_or_else(|| CatalogError::NotFound(uid.to_string()))?;
        check_readable(&run)?;
        Ok(run)
    }
}

/// Reject runs whose streams cannot be read as a unit.
///
/// Every one-dimensional channel of a stream must hold the same, non-zero
/// number of timepoints.
pub fn check_readable(run: &Run) -> Result<(), CatalogError> {
    for (stream_name, stream) in &run.streams {
        let mut expected: Option<(&str, usize)> = None;
        for channel in &stream.data {
            if channel.kind() == ChannelKind::Array {
                continue;
            }
            let len = channel.data.len();
            if len == 0 {
                return Err(CatalogError::EmptyChannel {
                    stream: stream_name.clone(),
                    channel: channel.name.clone(),
                });
            }
            match expected {
                None => expected = Some((&channel.name, len)),
                Some((first, n)) if n != len => {
                    return Err(CatalogError::InvalidRun(format!(
                        "stream '{}': channel '{}' has {} points but '{}' has {}",
                        stream_name, channel.name, len, first, n
                    )));
                }
                Some(_) => {}
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::run::{Channel, Stream};
    use serde_json::json;
    use tempfile::tempdir;

    fn run_with(uid: &str, channels: Vec<Channel>) -> Run {
        Run::new(json!({"uid": uid, "scan_id": 1, "time": 0.0}))
            .with_stream("primary", Stream::new(channels))
    }

    #[test]
    fn test_memory_catalog_roundtrip() {
        let mut catalog = MemoryCatalog::new();
        catalog
            .insert(run_with("u1", vec![Channel::float("a", vec![1.0])]))
            .unwrap();
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.get("u1").unwrap().uid(), Some("u1"));
        assert!(matches!(catalog.get("u2"), Err(CatalogError::NotFound(_))));
    }

    #[test]
    fn test_empty_channel_is_unreadable() {
        let mut catalog = MemoryCatalog::new();
        catalog.insert(run_with("u1", vec![Channel::float("a", vec![])])).unwrap();
        assert!(matches!(
            catalog.get("u1"),
            Err(CatalogError::EmptyChannel { .. })
        ));
    }

    #[test]
    fn test_ragged_stream_is_unreadable() {
        let run = run_with(
            "u1",
            vec![Channel::float("a", vec![1.0, 2.0]), Channel::int("b", vec![1])],
        );
        assert!(matches!(check_readable(&run), Err(CatalogError::InvalidRun(_))));
    }

    #[test]
    fn test_json_catalog_reads_documents() {
        let dir = tempdir().unwrap();
        std::fs::create_dir(dir.path().join("ucal")).unwrap();
        let run = run_with("abc123", vec![Channel::int("a", vec![1, 2, 3])]);
        std::fs::write(
            dir.path().join("ucal").join("abc123.json"),
            serde_json::to_string(&run).unwrap(),
        )
        .unwrap();

        let catalog = JsonCatalog::open_beamline(dir.path(), "ucal").unwrap();
        let loaded = catalog.get("abc123").unwrap();
        assert_eq!(loaded, run);

        assert!(matches!(catalog.get("missing"), Err(CatalogError::NotFound(_))));
        assert!(matches!(catalog.get("../x"), Err(CatalogError::InvalidUid(_))));
    }

    #[test]
    fn test_json_catalog_rejects_missing_root() {
        let dir = tempdir().unwrap();
        let result = JsonCatalog::open(dir.path().join("nope"));
        assert!(matches!(result, Err(CatalogError::NotADirectory(_))));
    }
}
