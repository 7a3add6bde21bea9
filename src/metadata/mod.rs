//! # Run Metadata
//!
//! This module turns a run's start record and baseline snapshot into the flat
//! `Namespace.field` header written at the top of every XDI file.
//!
//! ## Header Layout
//!
//! Fields are emitted in insertion order, which is part of the file format:
//!
//! 1. **Facility / Beamline**: fixed constants ([`FacilityInfo`])
//! 2. **Mono**: grating stripe from the baseline configuration
//! 3. **Sample / Scan**: identity, command, ISO-8601 start time, scan type and motor
//! 4. **Element**: symbol and absorption edge, with the legacy remap from [`edges`]
//! 5. **Proposal**: id, PI, cycle and visit start
//! 6. **Motors**: baseline positions resolved through historical channel aliases
//!
//! The column normalizer later appends `Detector.*` and `rois.*` entries.

pub mod edges;
mod error;
mod header;
mod record;


pub use error::MetadataError;
pub use header::{format_timestamp, FacilityInfo, HeaderBuilder, TimestampZone};
pub use record::{MetaValue, MetadataRecord};
