//! The emitted accessor must be bit-identical to the runtime codec: same
//! words out of `encode`, structurally equal records out of `decode`.
//!
//! The accessor for a compound schema covering every variant (plus nullable
//! and zero-width cases) is committed under `fixtures/` and compiled into
//! this test via `include!`; one test pins the emitter's output to that
//! file, the rest drive both codecs over a deterministic grid of records.

use std::collections::BTreeMap;

use serde_json::json;

use bitschema_compiler::{compute_layout, decode, encode, generate_accessor, Layout};
use bitschema_schema::{Record, Schema, Value};

#[path = "fixtures/telemetry_frame.rs"]
mod generated;

use generated::TelemetryFrame;

fn telemetry_schema() -> (Schema, Layout) {
    let raw = json!({
        "version": "1",
        "name": "TelemetryFrame",
        "fields": {
            "active": {"type": "bool"},
            "temperature": {"type": "int", "min": -40, "max": 87},
            "mode": {"type": "enum", "values": ["idle", "active", "maintenance"]},
            "firmware": {"type": "enum", "values": ["v1"]},
            "sampled_on": {
                "type": "date", "resolution": "day",
                "min_date": "2024-01-01", "max_date": "2024-12-31"
            },
            "window": {
                "type": "date", "resolution": "hour",
                "min_date": "2024-01-01T00:00:00", "max_date": "2024-01-08T00:00:00"
            },
            "sensors": {"type": "bitmask", "flags": {"gps": 0, "imu": 1, "baro": 3}},
            "label": {
                "type": "enum", "values": ["alpha", "beta", "gamma", "delta"],
                "nullable": true
            },
            "retries": {"type": "int", "min": 0, "max": 7, "nullable": true}
        }
    });
    let schema = bitschema_compiler::verify_schema(&raw).unwrap();
    let layout = compute_layout(&schema).unwrap();
    (schema, layout)
}

#[test]
fn emitter_output_matches_committed_fixture() {
    let (schema, layout) = telemetry_schema();
    let code = generate_accessor(&schema, &layout).unwrap();
    assert_eq!(
        code.trim_end(),
        include_str!("fixtures/telemetry_frame.rs").trim_end()
    );
}

fn sensor_map(gps: bool, imu: bool, baro: bool) -> BTreeMap<String, bool> {
    BTreeMap::from([
        ("gps".to_owned(), gps),
        ("imu".to_owned(), imu),
        ("baro".to_owned(), baro),
    ])
}

#[test]
fn generated_codec_matches_runtime_codec() {
    let (_, layout) = telemetry_schema();

    let sensor_grid = [
        sensor_map(false, false, false),
        sensor_map(true, false, false),
        sensor_map(false, true, true),
        sensor_map(true, true, true),
    ];
    let labels: [Option<&str>; 3] = [None, Some("alpha"), Some("delta")];
    let retries_grid: [Option<i64>; 3] = [None, Some(0), Some(7)];

    let mut cases = 0u32;
    for active in [false, true] {
        for temperature in [-40i64, 0, 87] {
            for mode in ["idle", "active", "maintenance"] {
                for sampled_on in ["2024-01-01", "2024-06-15", "2024-12-31"] {
                    for window in [
                        "2024-01-01T00:00:00",
                        "2024-01-03T07:00:00",
                        "2024-01-08T00:00:00",
                    ] {
                        for sensors in &sensor_grid {
                            for label in labels {
                                for retries in retries_grid {
                                    check_case(
                                        &layout,
                                        active,
                                        temperature,
                                        mode,
                                        sampled_on,
                                        window,
                                        sensors,
                                        label,
                                        retries,
                                    );
                                    cases += 1;
                                }
                            }
                        }
                    }
                }
            }
        }
    }
    assert!(cases >= 500, "grid too small: {cases}");
}

#[allow(clippy::too_many_arguments)]
fn check_case(
    layout: &Layout,
    active: bool,
    temperature: i64,
    mode: &str,
    sampled_on: &str,
    window: &str,
    sensors: &BTreeMap<String, bool>,
    label: Option<&str>,
    retries: Option<i64>,
) {
    let record = Record::from([
        ("active".to_owned(), Value::Bool(active)),
        ("temperature".to_owned(), Value::Int(temperature)),
        ("mode".to_owned(), Value::from(mode)),
        ("firmware".to_owned(), Value::from("v1")),
        ("sampled_on".to_owned(), Value::Date(sampled_on.parse().unwrap())),
        ("window".to_owned(), Value::DateTime(window.parse().unwrap())),
        ("sensors".to_owned(), Value::Flags(sensors.clone())),
        (
            "label".to_owned(),
            label.map_or(Value::Null, Value::from),
        ),
        (
            "retries".to_owned(),
            retries.map_or(Value::Null, Value::Int),
        ),
    ]);
    let instance = TelemetryFrame {
        active,
        temperature,
        mode: mode.to_owned(),
        firmware: "v1".to_owned(),
        sampled_on: sampled_on.parse().unwrap(),
        window: window.parse().unwrap(),
        sensors: sensors.clone(),
        label: label.map(str::to_owned),
        retries,
    };

    let runtime_word = encode(&record, layout).unwrap();
    let generated_word = instance.encode();
    assert_eq!(
        runtime_word, generated_word,
        "encode mismatch for {record:?}"
    );

    assert_eq!(decode(runtime_word, layout), record);
    assert_eq!(TelemetryFrame::decode(runtime_word), instance);
}

#[test]
fn generated_null_handling_is_symmetric() {
    let (_, layout) = telemetry_schema();
    let base = TelemetryFrame {
        active: true,
        temperature: 20,
        mode: "idle".to_owned(),
        firmware: "v1".to_owned(),
        sampled_on: "2024-03-01".parse().unwrap(),
        window: "2024-01-02T12:00:00".parse().unwrap(),
        sensors: sensor_map(true, false, true),
        label: None,
        retries: None,
    };
    let word = base.encode();
    // Null fields leave presence and value bits clear.
    assert_eq!((word >> 31) & 0b111, 0);
    assert_eq!((word >> 34) & 0b1111, 0);
    assert_eq!(TelemetryFrame::decode(word), base);

    let with_values = TelemetryFrame {
        label: Some("beta".to_owned()),
        retries: Some(3),
        ..base
    };
    let word = with_values.encode();
    assert_eq!((word >> 31) & 1, 1);
    assert_eq!((word >> 32) & 0b11, 1);
    assert_eq!((word >> 34) & 1, 1);
    assert_eq!((word >> 35) & 0b111, 3);
    assert_eq!(TelemetryFrame::decode(word), with_values);
    assert_eq!(decode(word, &layout)["label"], Value::from("beta"));
}
