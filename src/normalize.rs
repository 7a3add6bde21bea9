//! # Column Normalization
//!
//! Turns the raw instrument columns of a run into the stable, semantically
//! named columns downstream tools expect, and records what was done in the
//! metadata header.
//!
//! Normalization is computed as a [`NormalizePlan`] first and materialized
//! into a fresh [`ColumnTable`] in one pass. The plan applies, in order:
//!
//! 1. **Derived placeholders**: `tes_mca_pfy` is inserted, zero-filled, right
//!    after `tes_mca_counts` when only the latter exists
//! 2. **Semantic rename** through [`ALIASES`], adding `Detector.<name>`
//!    descriptions
//! 3. **Energy conflict**: the readback `en_energy` is dropped when an
//!    `energy` column already exists, otherwise renamed to `energy`
//! 4. **Deprecated exclusion** of [`DEPRECATED_COLUMNS`]
//! 5. **ROI annotation**: `rois.<raw>` = `"<low> <high>"`, then the
//!    fluorescence ROIs are re-keyed to their final column names

use log::debug;
use serde_json::Value;
use std::collections::BTreeMap;

use crate::fallback::{get_with_fallbacks, Candidate};
use crate::metadata::MetadataRecord;
use crate::run::Run;
use crate::table::{Column, ColumnTable, TableError};

/// Raw channel → semantic column name, with a header description
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnAlias {
    /// Channel name as recorded
    pub raw: &'static str,
    /// Column name written to the file
    pub name: &'static str,
    /// Human-readable description for `Detector.<name>`
    pub description: &'static str,
}

const fn alias(raw: &'static str, name: &'static str, description: &'static str) -> ColumnAlias {
    ColumnAlias {
        raw,
        name,
        description,
    }
}

/// Rename table applied to raw channel names
pub const ALIASES: &[ColumnAlias] = &[
    alias("en_energy_setpoint", "energy", "Monochromator energy setpoint (eV)"),
    alias("tes_measurement_time", "measurement_time", "TES measurement time"),
    alias("nexafs_i0up", "i0", "Upstream multimesh current"),
    alias("nexafs_i1", "itrans", "Transmission diode current"),
    alias("nexafs_sc", "tey", "Total electron yield (sample current)"),
    alias("nexafs_pey", "pey", "Partial electron yield"),
    alias("nexafs_ref", "iref", "Reference multimesh current"),
    alias("nexafs_m4cd", "i0_m4cd", "M4 mirror drain current"),
    alias("tes_mca_counts", "tfy", "TES total fluorescence yield"),
    alias("tes_mca_pfy", "pfy", "TES partial fluorescence yield"),
];

/// Raw channel → placeholder derived from it
pub const DERIVED_COLUMNS: &[(&str, &str)] = &[("tes_mca_counts", "tes_mca_pfy")];

/// Retired channels that are never exported
pub const DEPRECATED_COLUMNS: &[&str] = &["nexafs_i0mir"];

/// Readback energy channel
pub const READBACK_ENERGY: &str = "en_energy";

/// Final energy column name
pub const ENERGY: &str = "energy";

/// ROI keys re-keyed from raw channel to final column name
pub const ROI_REMAP: &[(&str, &str)] = &[("tes_mca_counts", "tfy"), ("tes_mca_pfy", "pfy")];

/// Channel name → (low, high) region of interest
pub type RoiTable = BTreeMap<String, (f64, f64)>;

/// Errors from column normalization
#[derive(Debug, thiserror::Error)]
pub enum NormalizeError {
    /// Two columns end up with the same name
    #[error("Normalization produces duplicate column '{0}'")]
    DuplicateColumn(String),

    /// A planned column refers to a column the table does not have
    #[error("Normalization plan does not match table: no column for '{0}'")]
    PlanMismatch(String),

    /// The materialized table breaks the table invariants
    #[error("Normalization plan does not match table: {0}")]
    Table(#[from] TableError),
}

/// Where a planned column's values come from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnSource {
    /// Column at this index of the raw table
    Existing(usize),
    /// Zero-filled copy of the column at this index
    ZerosLike(usize),
}

/// One column of the normalized table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedColumn {
    /// Raw channel name
    pub raw: String,
    /// Final column name
    pub name: String,
    /// Source of the values
    pub source: ColumnSource,
}

/// Complete rename/insert/exclude plan for one table
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizePlan {
    /// Output columns in order
    pub columns: Vec<PlannedColumn>,
    /// `Detector.<name>` descriptions, in column order
    pub detectors: Vec<(String, String)>,
    /// `(raw name, low, high)` ROI annotations, in column order
    pub rois: Vec<(String, f64, f64)>,
}

impl NormalizePlan {
    /// Compute the plan for a raw table
    pub fn build(table: &ColumnTable, rois: &RoiTable) -> Result<Self, NormalizeError> {
        let mut columns: Vec<PlannedColumn> = Vec::with_capacity(table.len() + 1);
        for (index, column) in table.iter().enumerate() {
            columns.push(PlannedColumn {
                raw: column.name.clone(),
                name: column.name.clone(),
                source: ColumnSource::Existing(index),
            });
            for (base, derived) in DERIVED_COLUMNS {
                if column.name == *base && !table.contains(derived) {
                    columns.push(PlannedColumn {
                        raw: derived.to_string(),
                        name: derived.to_string(),
                        source: ColumnSource::ZerosLike(index),
                    });
                }
            }
        }

        let mut detectors = Vec::new();
        for column in columns.iter_mut() {
            if let Some(alias) = ALIASES.iter().find(|a| a.raw == column.raw) {
                column.name = alias.name.to_string();
                detectors.push((alias.name.to_string(), alias.description.to_string()));
            }
        }

        let has_energy = columns.iter().any(|c| c.name == ENERGY);
        if has_energy {
            columns.retain(|c| c.raw != READBACK_ENERGY);
        } else if let Some(readback) = columns.iter_mut().find(|c| c.raw == READBACK_ENERGY) {
            readback.name = ENERGY.to_string();
        }

        columns.retain(|c| !DEPRECATED_COLUMNS.contains(&c.raw.as_str()));

        let rois = columns
            .iter()
            .filter_map(|c| rois.get(&c.raw).map(|&(lo, hi)| (c.raw.clone(), lo, hi)))
            .collect();

        for (i, column) in columns.iter().enumerate() {
            if columns[..i].iter().any(|c| c.name == column.name) {
                return Err(NormalizeError::DuplicateColumn(column.name.clone()));
            }
        }

        Ok(Self {
            columns,
            detectors,
            rois,
        })
    }

    /// Materialize the plan into a new table and annotate the header
    pub fn apply(
        &self,
        table: &ColumnTable,
        metadata: &mut MetadataRecord,
    ) -> Result<ColumnTable, NormalizeError> {
        let raw: Vec<&Column> = table.iter().collect();
        let mut out = ColumnTable::new();
        for planned in &self.columns {
            let data = match planned.source {
                ColumnSource::Existing(i) => raw.get(i).map(|c| c.data.clone()),
                ColumnSource::ZerosLike(i) => raw.get(i).map(|c| c.data.zeros_like()),
            }
            .ok_or_else(|| NormalizeError::PlanMismatch(planned.name.clone()))?;
            out.push(Column::new(planned.name.clone(), data))?;
        }

        for (name, description) in &self.detectors {
            metadata.insert(format!("Detector.{}", name), description.as_str());
        }
        for (raw_name, low, high) in &self.rois {
            metadata.insert(format!("rois.{}", raw_name), format!("{:.2} {:.2}", low, high));
        }
        for (raw_name, name) in ROI_REMAP {
            metadata.rename_key(&format!("rois.{}", raw_name), &format!("rois.{}", name));
        }
        Ok(out)
    }
}

/// Normalize a raw table, annotating `metadata` along the way
pub fn normalize(
    table: &ColumnTable,
    metadata: &mut MetadataRecord,
    rois: &RoiTable,
) -> Result<ColumnTable, NormalizeError> {
    let plan = NormalizePlan::build(table, rois)?;
    debug!(
        "Column plan: {}",
        plan.columns
            .iter()
            .map(|c| if c.raw == c.name { c.name.clone() } else { format!("{}->{}", c.raw, c.name) })
            .collect::<Vec<_>>()
            .join(", ")
    );
    plan.apply(table, metadata)
}

/// Regions of interest recorded for the run.
///
/// Read from the primary stream's TES configuration, falling back to a
/// `rois` entry in the start record. Malformed entries are skipped.
pub fn roi_table(run: &Run) -> RoiTable {
    let from_config = run
        .primary()
        .and_then(|s| get_with_fallbacks(&s.configuration, &[Candidate::chain(["tes", "data", "tes_rois"])]));
    let source = from_config.or_else(|| get_with_fallbacks(&run.start, &[Candidate::key("rois")]));

    let mut table = RoiTable::new();
    if let Some(Value::Object(entries)) = source {
        for (name, bounds) in entries {
            match roi_bounds(bounds) {
                Some(bounds) => {
                    table.insert(name.clone(), bounds);
                }
                None => debug!("Skipping malformed ROI for '{}': {}", name, bounds),
            }
        }
    }
    table
}

fn roi_bounds(value: &Value) -> Option<(f64, f64)> {
    match value {
        Value::Array(pair) if pair.len() == 2 => Some((pair[0].as_f64()?, pair[1].as_f64()?)),
        Value::Object(map) => Some((map.get("low")?.as_f64()?, map.get("high")?.as_f64()?)),
        _ => None,
    }
}
