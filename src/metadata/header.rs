use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::edges::normalize_element_edge;
use super::{MetaValue, MetadataError, MetadataRecord};
use crate::fallback::{get_with_fallbacks, Candidate};
use crate::run::{Channel, Run};

/// Facility and beamline constants written at the top of every header
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FacilityInfo {
    /// Facility name
    pub name: String,
    /// X-ray source description
    pub xray_source: String,
    /// Beamline designation
    pub beamline: String,
    /// Endstation chamber
    pub chamber: String,
}

impl Default for FacilityInfo {
    fn default() -> Self {
        Self {
            name: "NSLS-II".to_string(),
            xray_source: "EPU60 Undulator".to_string(),
            beamline: "7-ID-1".to_string(),
            chamber: "NEXAFS".to_string(),
        }
    }
}

/// Time zone used to render `Scan.start_time`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimestampZone {
    /// Local wall-clock time of the exporting host
    #[default]
    Local,
    /// Coordinated universal time
    Utc,
}

/// Baseline motor fields and the channel names each has been recorded under
const MOTOR_ALIASES: &[(&str, &[&str])] = &[
    ("Motors.exslit", &["eslit", "Exit Slit of Mono Vertical Gap"]),
    ("Motors.manipx", &["manip_x", "Manipulator_x"]),
    ("Motors.manipy", &["manip_y", "Manipulator_y"]),
    ("Motors.manipz", &["manip_z", "Manipulator_z"]),
    ("Motors.manipr", &["manip_r", "Manipulator_r"]),
    ("Motors.tesz", &["tesz"]),
];

/// Builds the ordered metadata header for a run
#[derive(Debug, Clone, Default)]
pub struct HeaderBuilder {
    facility: FacilityInfo,
    timezone: TimestampZone,
}

impl HeaderBuilder {
    /// Builder with default facility constants and local timestamps
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the facility constants
    pub fn with_facility(mut self, facility: FacilityInfo) -> Self {
        self.facility = facility;
        self
    }

    /// Choose the time zone for `Scan.start_time`
    pub fn with_timezone(mut self, timezone: TimestampZone) -> Self {
        self.timezone = timezone;
        self
    }

    /// Assemble the header record.
    ///
    /// Fails only when the start record lacks `uid`, `scan_id` or `time`;
    /// every other field falls back to a default.
    pub fn build(&self, run: &Run) -> Result<MetadataRecord, MetadataError> {
        let start = &run.start;
        let uid = run.uid().ok_or(MetadataError::MissingStartField("uid"))?;
        let scan_id = run
            .scan_id()
            .ok_or(MetadataError::MissingStartField("scan_id"))?;
        let time = run.time().ok_or(MetadataError::MissingStartField("time"))?;

        let mut md = MetadataRecord::new();
        md.insert("Facility.name", self.facility.name.as_str());
        md.insert("Facility.xray_source", self.facility.xray_source.as_str());
        md.insert("Beamline.name", self.facility.beamline.as_str());
        md.insert("Beamline.chamber", self.facility.chamber.as_str());
        md.insert("Mono.stripe", mono_stripe(run));

        md.insert("Sample.name", start_value(start, &Candidate::keys(&["sample_name"]), ""));
        md.insert("Sample.id", start_value(start, &Candidate::keys(&["sample_id"]), ""));

        md.insert("Scan.id", scan_id);
        md.insert("Scan.uid", uid);
        md.insert(
            "Scan.command",
            start_value(start, &Candidate::keys(&["plan_name", "command"]), ""),
        );
        md.insert("Scan.start_time", format_timestamp(time, self.timezone)?);
        md.insert("Scan.type", start_value(start, &Candidate::keys(&["scantype"]), "unknown"));
        md.insert("Scan.motors", scan_motor(start));

        let symbol = start_value(start, &Candidate::keys(&["element"]), "").to_string();
        let edge = start_value(start, &Candidate::keys(&["edge"]), "").to_string();
        let (symbol, edge) = normalize_element_edge(&symbol, &edge);
        md.insert("Element.symbol", symbol);
        md.insert("Element.edge", edge);

        md.insert(
            "Proposal.id",
            start_value(
                start,
                &[Candidate::chain(["proposal", "proposal_id"]), Candidate::key("proposal_id")],
                "",
            ),
        );
        md.insert(
            "Proposal.pi",
            start_value(
                start,
                &[Candidate::chain(["proposal", "pi_name"]), Candidate::key("pi_name")],
                "",
            ),
        );
        md.insert("Proposal.cycle", start_value(start, &Candidate::keys(&["cycle"]), ""));
        md.insert(
            "Proposal.start",
            start_value(start, &Candidate::keys(&["start_datetime"]), ""),
        );

        for (field, aliases) in MOTOR_ALIASES {
            let position = get_with_fallbacks(&run.baseline, &Candidate::keys(aliases))
                .and_then(Channel::first_f64)
                .unwrap_or(0.0);
            md.insert(*field, position);
        }

        Ok(md)
    }
}

fn start_value(start: &Value, candidates: &[Candidate], default: &str) -> MetaValue {
    get_with_fallbacks(start, candidates)
        .filter(|v| !v.is_null())
        .map(MetaValue::from_json)
        .unwrap_or_else(|| MetaValue::from(default))
}

fn scan_motor(start: &Value) -> MetaValue {
    match start.get("motors") {
        Some(Value::Array(motors)) => motors
            .first()
            .map(MetaValue::from_json)
            .unwrap_or_else(|| MetaValue::from("time")),
        Some(Value::String(motor)) => MetaValue::from(motor.as_str()),
        _ => MetaValue::from("time"),
    }
}

fn mono_stripe(run: &Run) -> String {
    let candidates = [
        Candidate::chain(["en", "data", "en_monoen_gratingx_setpoint"]),
        Candidate::chain(["en", "en_monoen_gratingx_setpoint"]),
    ];
    match get_with_fallbacks(&run.baseline.configuration, &candidates) {
        Some(Value::Array(items)) => items
            .first()
            .map(|v| MetaValue::from_json(v).to_string())
            .unwrap_or_default(),
        Some(value) => MetaValue::from_json(value).to_string(),
        None => String::new(),
    }
}

/// Render Unix epoch seconds as an ISO-8601 timestamp without offset.
///
/// Microseconds are shown only when non-zero.
pub fn format_timestamp(epoch_seconds: f64, zone: TimestampZone) -> Result<String, MetadataError> {
    if !epoch_seconds.is_finite() {
        return Err(MetadataError::InvalidTimestamp(epoch_seconds));
    }
    let mut secs = epoch_seconds.floor() as i64;
    let mut micros = ((epoch_seconds - epoch_seconds.floor()) * 1e6).round() as u32;
    if micros >= 1_000_000 {
        secs += 1;
        micros = 0;
    }
    let utc = DateTime::from_timestamp(secs, micros * 1_000)
        .ok_or(MetadataError::InvalidTimestamp(epoch_seconds))?;
    let naive = match zone {
        TimestampZone::Utc => utc.naive_utc(),
        TimestampZone::Local => utc.with_timezone(&Local).naive_local(),
    };
    let pattern = if micros == 0 {
        "%Y-%m-%dT%H:%M:%S"
    } else {
        "%Y-%m-%dT%H:%M:%S%.6f"
    };
    Ok(naive.format(pattern).to_string())
}
