//! Shared run fixtures for unit tests.

use serde_json::{json, Value};

use crate::run::{Channel, Run, Stream};

/// 2024-04-25T16:00:00Z
pub(crate) const START_TIME: f64 = 1_714_060_800.0;

pub(crate) fn start_record() -> Value {
    json!({
        "uid": "3f2c9a1e-uid",
        "scan_id": 1021,
        "time": START_TIME,
        "sample_name": "PS film",
        "sample_id": "s-17",
        "plan_name": "nexafs_scan",
        "scantype": "nexafs",
        "motors": ["en_energy"],
        "element": "",
        "edge": "c",
        "proposal": {"proposal_id": "312345", "pi_name": "A. Researcher"},
        "cycle": "2024-2",
        "start_datetime": "2024-04-25T09:30:00",
        "comment": "first line\nsecond line"
    })
}

pub(crate) fn baseline() -> Stream {
    Stream::new(vec![
        Channel::float("manip_x", vec![1.5]),
        Channel::float("Manipulator_y", vec![2.5]),
        Channel::float("Exit Slit of Mono Vertical Gap", vec![0.02]),
        Channel::int("tesz", vec![90]),
    ])
    .with_configuration(json!({
        "en": {"data": {"en_monoen_gratingx_setpoint": ["Carbon"]}}
    }))
}

pub(crate) fn primary() -> Stream {
    Stream::new(vec![
        Channel::float("nexafs_i0up", vec![1.1e-9, 1.2e-9, 1.3e-9]),
        Channel::float("nexafs_i1", vec![2.0e-10, 2.1e-10, 2.2e-10]),
        Channel::float("en_energy", vec![280.01, 281.02, 281.98]),
        Channel::float("en_energy_setpoint", vec![280.0, 281.0, 282.0]),
        Channel::int("tes_mca_counts", vec![10, 200, -5]),
        Channel::float("nexafs_i0mir", vec![0.1, 0.2, 0.3]),
        Channel::array("tes_mca_spectrum", vec![vec![1.0, 2.0], vec![3.0, 4.0], vec![5.0, 6.0]]),
    ])
    .with_configuration(json!({
        "nexafs_i0up": {"data": {"nexafs_i0up_exposure_time": 1.5}},
        "tes": {"data": {"tes_rois": {"tes_mca_counts": [250.0, 300.0], "nexafs_i1": [1, 2]}}}
    }))
}

pub(crate) fn nexafs_run() -> Run {
    Run::new(start_record())
        .with_baseline(baseline())
        .with_stream("primary", primary())
}
