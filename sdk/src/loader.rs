//! Schema loading: thin wrappers that parse JSON or YAML documents and hand
//! them to the verifier. YAML goes through `serde_yaml`, which never
//! instantiates host objects from the input.

use std::fs;
use std::path::Path;

use serde_json::{json, Map, Value as Json};
use thiserror::Error;

use bitschema_compiler::error::SchemaError;
use bitschema_compiler::verify_schema;
use bitschema_schema::{iso, FieldKind, Schema};

/// Anything that can go wrong between a file path and a validated schema.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("unsupported schema file extension \"{0}\" (use .json, .yaml, or .yml)")]
    UnsupportedExtension(String),

    #[error(transparent)]
    Schema(#[from] SchemaError),
}

/// Loads and validates a schema file, dispatching on the extension.
pub fn load_schema(path: impl AsRef<Path>) -> Result<Schema, LoadError> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    match extension.as_str() {
        "json" => schema_from_json(&fs::read_to_string(path)?),
        "yaml" | "yml" => schema_from_yaml(&fs::read_to_string(path)?),
        other => Err(LoadError::UnsupportedExtension(other.to_owned())),
    }
}

/// Parses and validates a schema from a JSON string.
pub fn schema_from_json(content: &str) -> Result<Schema, LoadError> {
    let raw: Json = serde_json::from_str(content)?;
    Ok(verify_schema(&raw)?)
}

/// Parses and validates a schema from a YAML string. Mapping order in the
/// document is preserved, so field declaration order survives the trip.
pub fn schema_from_yaml(content: &str) -> Result<Schema, LoadError> {
    let raw: Json = serde_yaml::from_str(content)?;
    Ok(verify_schema(&raw)?)
}

/// Validates an already-parsed document (programmatic API).
pub fn schema_from_value(raw: &Json) -> Result<Schema, SchemaError> {
    verify_schema(raw)
}

/// Serializes a validated schema back to its document form. Feeding the
/// result to [schema_from_value] yields an equal schema.
pub fn schema_to_value(schema: &Schema) -> Json {
    let mut fields = Map::new();
    for (name, field) in &schema.fields {
        let mut def = Map::new();
        def.insert("type".to_owned(), json!(field.kind.tag()));
        match &field.kind {
            FieldKind::Bool => {}
            FieldKind::Int { min, max, signed } => {
                def.insert("min".to_owned(), json!(min));
                def.insert("max".to_owned(), json!(max));
                def.insert("signed".to_owned(), json!(signed));
            }
            FieldKind::Enum { values } => {
                def.insert("values".to_owned(), json!(values));
            }
            FieldKind::Date {
                resolution,
                min,
                max,
            } => {
                def.insert("resolution".to_owned(), json!(resolution.as_str()));
                def.insert(
                    "min_date".to_owned(),
                    json!(iso::format_bound(*min, *resolution)),
                );
                def.insert(
                    "max_date".to_owned(),
                    json!(iso::format_bound(*max, *resolution)),
                );
            }
            FieldKind::Bitmask { flags } => {
                let mut positions = Map::new();
                for (flag, position) in flags {
                    positions.insert(flag.clone(), json!(position));
                }
                def.insert("flags".to_owned(), Json::Object(positions));
            }
        }
        if field.nullable {
            def.insert("nullable".to_owned(), json!(true));
        }
        fields.insert(name.clone(), Json::Object(def));
    }

    json!({
        "version": schema.version,
        "name": schema.name,
        "fields": fields,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const YAML: &str = r#"
version: "1"
name: UserProfile
fields:
  age:    {type: int, min: 0, max: 120}
  tier:   {type: enum, values: [free, basic, premium, enterprise]}
  active: {type: bool}
  joined: {type: date, resolution: day, min_date: "2020-01-01", max_date: "2030-12-31"}
  perms:  {type: bitmask, flags: {read: 0, write: 1, admin: 2}}
  nickname: {type: enum, values: [alpha, beta], nullable: true}
"#;

    #[test]
    fn test_yaml_preserves_declaration_order() {
        let schema = schema_from_yaml(YAML).unwrap();
        let names: Vec<&str> = schema.fields.iter().map(|(name, _)| name.as_str()).collect();
        assert_eq!(
            names,
            ["age", "tier", "active", "joined", "perms", "nickname"]
        );
    }

    #[test]
    fn test_json_and_yaml_agree() {
        let json = r#"{
            "version": "1",
            "name": "Small",
            "fields": {
                "a": {"type": "bool"},
                "b": {"type": "int", "min": 0, "max": 3}
            }
        }"#;
        let yaml = "
version: \"1\"
name: Small
fields:
  a: {type: bool}
  b: {type: int, min: 0, max: 3}
";
        assert_eq!(
            schema_from_json(json).unwrap(),
            schema_from_yaml(yaml).unwrap()
        );
    }

    #[test]
    fn test_schema_round_trips_through_document_form() {
        let schema = schema_from_yaml(YAML).unwrap();
        let doc = schema_to_value(&schema);
        assert_eq!(schema_from_value(&doc).unwrap(), schema);
    }

    #[test]
    fn test_parse_errors_are_wrapped() {
        assert!(matches!(
            schema_from_json("{not json"),
            Err(LoadError::Json(_))
        ));
        assert!(matches!(
            schema_from_yaml(": not yaml :"),
            Err(LoadError::Yaml(_))
        ));
        assert!(matches!(
            schema_from_json(r#"{"version": "1", "name": "S", "fields": {}}"#),
            Err(LoadError::Schema(_))
        ));
    }

    #[test]
    fn test_unsupported_extension() {
        assert!(matches!(
            load_schema("schema.toml"),
            Err(LoadError::UnsupportedExtension(ext)) if ext == "toml"
        ));
    }
}
