//! JSON Schema fidelity: the emitted document must accept the JSON
//! projection of every record the encoder accepts, and reject records the
//! value validator rejects. Checked against a real Draft 2020-12 validator.

use std::collections::BTreeMap;

use jsonschema::{Draft, Validator};
use serde_json::{json, Value as Json};

use bitschema_compiler::{
    compute_layout, encode, generate_json_schema, validate_record, verify_schema, Layout,
};
use bitschema_schema::{Record, Value};

fn compound() -> (Layout, Validator) {
    let raw = json!({
        "version": "1",
        "name": "Session",
        "fields": {
            "active": {"type": "bool"},
            "age": {"type": "int", "min": 0, "max": 120},
            "tier": {"type": "enum", "values": ["free", "basic", "premium"]},
            "joined": {
                "type": "date", "resolution": "day",
                "min_date": "2020-01-01", "max_date": "2030-12-31"
            },
            "perms": {"type": "bitmask", "flags": {"read": 0, "write": 1, "admin": 2}},
            "nickname": {"type": "enum", "values": ["alpha", "beta"], "nullable": true}
        }
    });
    let schema = verify_schema(&raw).unwrap();
    let layout = compute_layout(&schema).unwrap();
    let document = generate_json_schema(&schema, &layout);
    let validator = jsonschema::options()
        .with_draft(Draft::Draft202012)
        .build(&document)
        .expect("emitted document is a valid JSON Schema");
    (layout, validator)
}

fn base_record() -> Record {
    Record::from([
        ("active".to_owned(), Value::Bool(true)),
        ("age".to_owned(), Value::Int(30)),
        ("tier".to_owned(), Value::from("basic")),
        ("joined".to_owned(), Value::Date("2024-05-01".parse().unwrap())),
        (
            "perms".to_owned(),
            Value::Flags(BTreeMap::from([
                ("read".to_owned(), true),
                ("write".to_owned(), false),
                ("admin".to_owned(), false),
            ])),
        ),
        ("nickname".to_owned(), Value::Null),
    ])
}

fn projection(record: &Record) -> Json {
    serde_json::to_value(record).unwrap()
}

#[test]
fn accepted_records_validate() {
    let (layout, validator) = compound();

    let mut records = vec![base_record()];
    let mut named = base_record();
    named.insert("nickname".to_owned(), Value::from("alpha"));
    records.push(named);

    let mut edge = base_record();
    edge.insert("age".to_owned(), Value::Int(0));
    edge.insert("joined".to_owned(), Value::Date("2020-01-01".parse().unwrap()));
    records.push(edge);

    for record in records {
        assert!(encode(&record, &layout).is_ok());
        let instance = projection(&record);
        assert!(
            validator.is_valid(&instance),
            "emitted schema rejected accepted record: {instance}"
        );
    }
}

#[test]
fn rejected_records_fail_validation() {
    let (layout, validator) = compound();

    // Each mutation breaks exactly one value-validation rule.
    let mut wrong_type = base_record();
    wrong_type.insert("active".to_owned(), Value::Int(1));

    let mut out_of_range = base_record();
    out_of_range.insert("age".to_owned(), Value::Int(150));

    let mut unknown_member = base_record();
    unknown_member.insert("tier".to_owned(), Value::from("diamond"));

    let mut unknown_flag = base_record();
    unknown_flag.insert(
        "perms".to_owned(),
        Value::Flags(BTreeMap::from([("exec".to_owned(), true)])),
    );

    let mut null_required = base_record();
    null_required.insert("age".to_owned(), Value::Null);

    for record in [
        wrong_type,
        out_of_range,
        unknown_member,
        unknown_flag,
        null_required,
    ] {
        assert!(validate_record(&record, &layout).is_err());
        let instance = projection(&record);
        assert!(
            !validator.is_valid(&instance),
            "emitted schema accepted invalid record: {instance}"
        );
    }

    // A missing required field is caught by `required`.
    let mut missing = base_record();
    missing.remove("age");
    assert!(encode(&missing, &layout).is_err());
    let mut instance = projection(&missing).as_object().unwrap().clone();
    instance.remove("age");
    assert!(!validator.is_valid(&Json::Object(instance)));
}

#[test]
fn extra_properties_are_rejected_by_the_document() {
    // The codec ignores extra keys (forward tolerance), but the emitted
    // document pins the record shape down with additionalProperties: false.
    let (_, validator) = compound();
    let mut instance = projection(&base_record()).as_object().unwrap().clone();
    instance.insert("stray".to_owned(), json!(1));
    assert!(!validator.is_valid(&Json::Object(instance)));
}
