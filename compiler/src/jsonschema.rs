//! JSON Schema Draft 2020-12 export.
//!
//! Describes the *record* shape (the JSON projection of [Value]s), not the
//! packed bits. The packed layout rides along in `x-bitschema-*` vendor
//! keys so a round-trip back to a schema stays possible in principle.

use serde_json::{json, Map, Value as Json};

use bitschema_schema::{iso, FieldKind, Resolution, Schema};

use crate::layout::{FieldLayout, Layout};

/// Emits a JSON Schema document for `schema`.
pub fn generate_json_schema(schema: &Schema, layout: &Layout) -> Json {
    let mut properties = Map::new();
    let mut required = Vec::new();
    for field in &layout.fields {
        properties.insert(field.name.clone(), field_property(field));
        if !field.nullable {
            required.push(Json::String(field.name.clone()));
        }
    }

    json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "$id": format!("https://example.com/schemas/{}.schema.json", schema.name),
        "type": "object",
        "title": schema.name,
        "description": "BitSchema-generated schema",
        "properties": properties,
        "required": required,
        "additionalProperties": false,
        "x-bitschema-version": schema.version,
        "x-bitschema-total-bits": layout.total_bits,
    })
}

fn field_property(field: &FieldLayout) -> Json {
    let mut prop = Map::new();
    match &field.kind {
        FieldKind::Bool => {
            prop.insert("type".to_owned(), json!("boolean"));
        }
        FieldKind::Int { min, max, .. } => {
            prop.insert("type".to_owned(), json!("integer"));
            prop.insert("minimum".to_owned(), json!(min));
            prop.insert("maximum".to_owned(), json!(max));
        }
        FieldKind::Enum { values } => {
            prop.insert("type".to_owned(), json!("string"));
            let mut members: Vec<Json> = values.iter().map(|v| json!(v)).collect();
            if field.nullable {
                members.push(Json::Null);
            }
            prop.insert("enum".to_owned(), Json::Array(members));
        }
        FieldKind::Date {
            resolution,
            min,
            max,
        } => {
            prop.insert("type".to_owned(), json!("string"));
            let format = if *resolution == Resolution::Day {
                "date"
            } else {
                "date-time"
            };
            prop.insert("format".to_owned(), json!(format));
            prop.insert(
                "x-bitschema-resolution".to_owned(),
                json!(resolution.as_str()),
            );
            prop.insert(
                "x-bitschema-min-date".to_owned(),
                json!(iso::format_bound(*min, *resolution)),
            );
            prop.insert(
                "x-bitschema-max-date".to_owned(),
                json!(iso::format_bound(*max, *resolution)),
            );
        }
        FieldKind::Bitmask { flags } => {
            let mut flag_props = Map::new();
            let mut positions = Map::new();
            for (name, position) in flags {
                flag_props.insert(name.clone(), json!({"type": "boolean"}));
                positions.insert(name.clone(), json!(position));
            }
            prop.insert("type".to_owned(), json!("object"));
            prop.insert("properties".to_owned(), Json::Object(flag_props));
            prop.insert("additionalProperties".to_owned(), json!(false));
            prop.insert("x-bitschema-flags".to_owned(), Json::Object(positions));
        }
    }

    if field.nullable {
        let base = prop
            .get("type")
            .cloned()
            .unwrap_or_else(|| Json::String("object".to_owned()));
        prop.insert("type".to_owned(), json!([base, "null"]));
    }

    prop.insert("x-bitschema-offset".to_owned(), json!(field.offset));
    prop.insert("x-bitschema-bits".to_owned(), json!(field.bits));
    Json::Object(prop)
}
