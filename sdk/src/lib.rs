//! bitschema
//!
//! This crate is the front door for BitSchema: it compiles a declarative
//! field schema into a deterministic bit layout inside a single `u64` and
//! packs/unpacks records against that layout.
//!
//! - Schema loading from JSON or YAML files and strings ([loader])
//! - `compile_schema`: validate + plan in one step
//! - Re-exports of the codec, emitters, and error types
//!
//! ```
//! use bitschema::{compile_schema, decode, encode, Record, Value};
//! use serde_json::json;
//!
//! let raw = json!({
//!     "version": "1",
//!     "name": "Heartbeat",
//!     "fields": {
//!         "alive": {"type": "bool"},
//!         "beats": {"type": "int", "min": 0, "max": 120}
//!     }
//! });
//! let (_schema, layout) = compile_schema(&raw).unwrap();
//!
//! let record = Record::from([
//!     ("alive".to_owned(), Value::Bool(true)),
//!     ("beats".to_owned(), Value::Int(72)),
//! ]);
//! let word = encode(&record, &layout).unwrap();
//! assert_eq!(word, 1 | (72 << 1));
//! assert_eq!(decode(word, &layout), record);
//! ```

pub mod loader;

pub use bitschema_compiler::error::{CodegenError, EncodingError, SchemaError, SchemaErrorKind};
pub use bitschema_compiler::{
    compute_layout, decode, encode, generate_accessor, generate_json_schema, is_identifier,
    layout_summary, render_layout, validate_record, verify_schema, FieldLayout, Layout,
    TableFormat,
};
pub use bitschema_schema::{Field, FieldKind, Record, Resolution, Schema, Value};
pub use loader::{
    load_schema, schema_from_json, schema_from_value, schema_from_yaml, schema_to_value, LoadError,
};

/// Validates a schema document and plans its bit layout in one step.
pub fn compile_schema(
    raw: &serde_json::Value,
) -> Result<(Schema, Layout), SchemaError> {
    let schema = verify_schema(raw)?;
    let layout = compute_layout(&schema)?;
    Ok((schema, layout))
}

/// Decodes a word and pretty-prints the record as JSON.
pub fn decode_to_json(word: u64, layout: &Layout) -> String {
    let record = decode(word, layout);
    serde_json::to_string_pretty(&record).unwrap()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_compile_schema_plans_layout() {
        let raw = json!({
            "version": "1",
            "name": "S",
            "fields": {
                "a": {"type": "bool"},
                "b": {"type": "enum", "values": ["x", "y", "z"]}
            }
        });
        let (schema, layout) = compile_schema(&raw).unwrap();
        assert_eq!(schema.name, "S");
        assert_eq!(layout.total_bits, 3);
    }

    #[test]
    fn test_decode_to_json() {
        let raw = json!({
            "version": "1",
            "name": "S",
            "fields": {
                "alive": {"type": "bool"},
                "nick": {"type": "enum", "values": ["a", "b"], "nullable": true}
            }
        });
        let (_, layout) = compile_schema(&raw).unwrap();
        let text = decode_to_json(0b001, &layout);
        let parsed: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed, json!({"alive": true, "nick": null}));
    }
}
