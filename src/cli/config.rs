//! TOML configuration file support.
//!
//! Settings that rarely change between invocations live in a config file;
//! command-line flags override them:
//!
//! ```toml
//! # xdi-export.toml
//! [export]
//! catalog = "/nsls2/data/sst/catalog"
//! beamline = "ucal"
//! proposal_root = "/nsls2/data/sst/proposals"
//! timezone = "local"
//! omit = ["tes_scan_point_start", "tes_scan_point_end"]
//!
//! [facility]
//! chamber = "RSoXS"
//!
//! [header]
//! "Beamline.operator" = "staff"
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use xdi_export::export::ExportConfig;
use xdi_export::extract::ExtractOptions;
use xdi_export::metadata::{FacilityInfo, MetadataRecord, TimestampZone};

/// Root configuration structure for xdi-export.toml files.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// Export settings.
    #[serde(default)]
    pub export: ExportSection,

    /// Facility constants; unset fields keep their defaults.
    #[serde(default)]
    pub facility: FacilityInfo,

    /// Extra header entries applied over the built header.
    #[serde(default)]
    pub header: BTreeMap<String, String>,
}

/// Configuration for the export command.
#[derive(Debug, Default, Deserialize)]
pub struct ExportSection {
    /// Directory of run documents.
    pub catalog: Option<PathBuf>,

    /// Beamline acronym selecting a catalog sub-directory.
    pub beamline: Option<String>,

    /// Root of the proposal directory tree.
    pub proposal_root: Option<PathBuf>,

    /// Fixed output directory (takes precedence over `proposal_root`).
    pub output_dir: Option<PathBuf>,

    /// Time zone for `Scan.start_time`.
    pub timezone: Option<TimestampZone>,

    /// Channels to leave out of the table.
    pub omit: Option<Vec<String>>,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse TOML configuration")
    }

    /// Load the file if given, else the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    /// Exporter settings described by this file.
    pub fn export_config(&self) -> ExportConfig {
        let extract = match &self.export.omit {
            Some(omit) => ExtractOptions { omit: omit.clone() },
            None => ExtractOptions::default(),
        };
        let header_updates: MetadataRecord = self
            .header
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        ExportConfig {
            facility: self.facility.clone(),
            timezone: self.export.timezone.unwrap_or_default(),
            extract,
            header_updates,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config() {
        let toml = r#"
            [export]
            catalog = "/data/catalog"
            beamline = "ucal"
            proposal_root = "/data/proposals"
            timezone = "utc"
            omit = ["tes_scan_point_start"]

            [facility]
            chamber = "RSoXS"

            [header]
            "Beamline.operator" = "staff"
        "#;

        let config = Config::from_str(toml).unwrap();
        assert_eq!(config.export.catalog, Some(PathBuf::from("/data/catalog")));
        assert_eq!(config.export.beamline.as_deref(), Some("ucal"));
        assert_eq!(config.export.proposal_root, Some(PathBuf::from("/data/proposals")));
        assert_eq!(config.export.output_dir, None);
        assert_eq!(config.export.timezone, Some(TimestampZone::Utc));
        assert_eq!(config.facility.chamber, "RSoXS");
        assert_eq!(config.facility.name, "NSLS-II");

        let export = config.export_config();
        assert_eq!(export.extract.omit, vec!["tes_scan_point_start".to_string()]);
        assert_eq!(export.timezone, TimestampZone::Utc);
        assert_eq!(export.header_updates.get_str("Beamline.operator"), "staff");
    }

    #[test]
    fn test_partial_config() {
        let toml = r#"
            [export]
            output_dir = "/tmp/xdi"
        "#;

        let config = Config::from_str(toml).unwrap();
        assert_eq!(config.export.output_dir, Some(PathBuf::from("/tmp/xdi")));
        assert_eq!(config.export.catalog, None);
        assert_eq!(config.facility, FacilityInfo::default());
    }

    #[test]
    fn test_empty_config() {
        let config = Config::from_str("").unwrap();
        assert_eq!(config.export.timezone, None);
        let export = config.export_config();
        assert_eq!(export.timezone, TimestampZone::Local);
        assert_eq!(export.extract.omit.len(), 2);
        assert!(export.header_updates.is_empty());
    }

    #[test]
    fn test_invalid_timezone() {
        let toml = r#"
            [export]
            timezone = "mars"
        "#;
        assert!(Config::from_str(toml).is_err());
    }
}
