//! Schema validation: rejects malformed or internally inconsistent schema
//! documents at load time and produces the typed [Schema].
//!
//! The input is an already-parsed document tree (`serde_json::Value`); the
//! JSON and YAML loaders in the sdk crate both feed this entry point. Every
//! rejection carries a document path and a typed error kind.

use lazy_static::lazy_static;
use regex::Regex;
use serde_json::{Map, Value as Json};

use bitschema_schema::{iso, Field, FieldKind, Resolution, Schema};

use crate::error::{SchemaError, SchemaErrorKind};
use crate::layout::field_bits;
use crate::utils::{clip, quote};

lazy_static! {
    static ref IDENTIFIER: Regex = Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap();
}

pub const MAX_ENUM_VALUES: usize = 255;
pub const MAX_FLAG_POSITION: i64 = 63;

/// Whether `s` is usable as a field, flag, or schema name.
pub fn is_identifier(s: &str) -> bool {
    IDENTIFIER.is_match(s)
}

/// Returns `Ok(Schema)` if verification passed, or the first violation as a
/// typed [SchemaError] otherwise.
pub fn verify_schema(raw: &Json) -> Result<Schema, SchemaError> {
    let root = as_object(raw, "schema")?;

    let name = require_str(root, "schema", "name")?;
    if !is_identifier(name) {
        return Err(SchemaError::at(
            "name",
            SchemaErrorKind::InvalidIdentifier(quote(&clip(name))),
        ));
    }

    let version = require_str(root, "schema", "version")?.to_owned();

    let raw_fields = match root.get("fields") {
        Some(value) => as_object(value, "fields")?,
        None => {
            return Err(SchemaError::at(
                "schema",
                SchemaErrorKind::MissingAttribute("fields"),
            ))
        }
    };
    if raw_fields.is_empty() {
        return Err(SchemaError::at("fields", SchemaErrorKind::EmptySchema));
    }

    let mut fields: Vec<(String, Field)> = Vec::with_capacity(raw_fields.len());
    for (field_name, raw_field) in raw_fields {
        let path = format!("fields.{field_name}");
        if !is_identifier(field_name) {
            return Err(SchemaError::at(
                path,
                SchemaErrorKind::InvalidIdentifier(quote(&clip(field_name))),
            ));
        }
        if fields.iter().any(|(existing, _)| existing == field_name) {
            return Err(SchemaError::at(
                path,
                SchemaErrorKind::DuplicateFieldName(quote(field_name)),
            ));
        }
        let field = verify_field(raw_field, &path)?;
        fields.push((field_name.clone(), field));
    }

    Ok(Schema {
        name: name.to_owned(),
        version,
        fields,
    })
}

fn verify_field(raw: &Json, path: &str) -> Result<Field, SchemaError> {
    let def = as_object(raw, path)?;

    let tag = match def.get("type") {
        Some(Json::String(tag)) => tag.as_str(),
        Some(other) => {
            return Err(SchemaError::at(
                format!("{path}.type"),
                SchemaErrorKind::InvalidAttribute {
                    expected: "string",
                    got: json_type(other).to_owned(),
                },
            ))
        }
        None => {
            return Err(SchemaError::at(
                path,
                SchemaErrorKind::MissingAttribute("type"),
            ))
        }
    };

    let kind = match tag {
        "bool" => FieldKind::Bool,
        "int" => verify_int(def, path)?,
        "enum" => verify_enum(def, path)?,
        "date" => verify_date(def, path)?,
        "bitmask" => verify_bitmask(def, path)?,
        other => {
            return Err(SchemaError::at(
                format!("{path}.type"),
                SchemaErrorKind::UnknownVariant(quote(&clip(other))),
            ))
        }
    };

    let nullable = match def.get("nullable") {
        None => false,
        Some(Json::Bool(nullable)) => *nullable,
        Some(other) => {
            return Err(SchemaError::at(
                format!("{path}.nullable"),
                SchemaErrorKind::InvalidAttribute {
                    expected: "boolean",
                    got: json_type(other).to_owned(),
                },
            ))
        }
    };

    // Fast fail before planning: a field that cannot fit on its own can
    // never fit in a layout.
    let width = u32::from(field_bits(&kind)) + u32::from(nullable);
    if width > 64 {
        let kind_err = match &kind {
            FieldKind::Int { min, max, .. } => SchemaErrorKind::IntegerRangeOverflow {
                min: *min,
                max: *max,
            },
            _ => SchemaErrorKind::SchemaTooLarge {
                total: width,
                breakdown: format!("{path}={width}"),
            },
        };
        return Err(SchemaError::at(path, kind_err));
    }

    Ok(Field { kind, nullable })
}

fn verify_int(def: &Map<String, Json>, path: &str) -> Result<FieldKind, SchemaError> {
    let min = require_i64(def, path, "min")?;
    let max = require_i64(def, path, "max")?;
    if min > max {
        return Err(SchemaError::at(
            format!("{path}.min"),
            SchemaErrorKind::IntegerRangeInverted { min, max },
        ));
    }

    let signed = match def.get("signed") {
        None => min < 0,
        Some(Json::Bool(signed)) => *signed,
        Some(other) => {
            return Err(SchemaError::at(
                format!("{path}.signed"),
                SchemaErrorKind::InvalidAttribute {
                    expected: "boolean",
                    got: json_type(other).to_owned(),
                },
            ))
        }
    };

    Ok(FieldKind::Int { min, max, signed })
}

fn verify_enum(def: &Map<String, Json>, path: &str) -> Result<FieldKind, SchemaError> {
    let attr_path = format!("{path}.values");
    let raw_values = match def.get("values") {
        Some(Json::Array(values)) => values,
        Some(other) => {
            return Err(SchemaError::at(
                attr_path,
                SchemaErrorKind::InvalidAttribute {
                    expected: "array of strings",
                    got: json_type(other).to_owned(),
                },
            ))
        }
        None => {
            return Err(SchemaError::at(
                path,
                SchemaErrorKind::MissingAttribute("values"),
            ))
        }
    };

    if raw_values.is_empty() {
        return Err(SchemaError::at(attr_path, SchemaErrorKind::EnumEmpty));
    }
    if raw_values.len() > MAX_ENUM_VALUES {
        return Err(SchemaError::at(
            attr_path,
            SchemaErrorKind::EnumTooLarge(raw_values.len()),
        ));
    }

    let mut values = Vec::with_capacity(raw_values.len());
    for raw_value in raw_values {
        let value = match raw_value {
            Json::String(value) if !value.is_empty() => value,
            Json::String(_) => {
                return Err(SchemaError::at(
                    attr_path,
                    SchemaErrorKind::InvalidAttribute {
                        expected: "non-empty string",
                        got: "empty string".to_owned(),
                    },
                ))
            }
            other => {
                return Err(SchemaError::at(
                    attr_path,
                    SchemaErrorKind::InvalidAttribute {
                        expected: "string",
                        got: json_type(other).to_owned(),
                    },
                ))
            }
        };
        if values.contains(value) {
            return Err(SchemaError::at(
                attr_path,
                SchemaErrorKind::EnumDuplicate(quote(&clip(value))),
            ));
        }
        values.push(value.clone());
    }

    Ok(FieldKind::Enum { values })
}

fn verify_date(def: &Map<String, Json>, path: &str) -> Result<FieldKind, SchemaError> {
    let raw_resolution = require_str(def, path, "resolution")?;
    let resolution = Resolution::parse(raw_resolution).ok_or_else(|| {
        SchemaError::at(
            format!("{path}.resolution"),
            SchemaErrorKind::InvalidAttribute {
                expected: "one of day, hour, minute, second",
                got: quote(&clip(raw_resolution)),
            },
        )
    })?;

    let min = parse_bound(def, path, "min_date", resolution)?;
    let max = parse_bound(def, path, "max_date", resolution)?;
    if min >= max {
        return Err(SchemaError::at(
            format!("{path}.min_date"),
            SchemaErrorKind::DateRangeInverted {
                min: iso::format_bound(min, resolution),
                max: iso::format_bound(max, resolution),
            },
        ));
    }

    Ok(FieldKind::Date {
        resolution,
        min,
        max,
    })
}

/// Parses a date bound and truncates it to the resolution grid. The codec,
/// the emitters, and generated code all see grid-aligned bounds.
fn parse_bound(
    def: &Map<String, Json>,
    path: &str,
    attr: &'static str,
    resolution: Resolution,
) -> Result<chrono::NaiveDateTime, SchemaError> {
    let raw = require_str(def, path, attr)?;
    let parsed = iso::parse_datetime(raw).ok_or_else(|| {
        SchemaError::at(
            format!("{path}.{attr}"),
            SchemaErrorKind::DateParseError(quote(&clip(raw))),
        )
    })?;
    Ok(resolution.truncate(parsed))
}

fn verify_bitmask(def: &Map<String, Json>, path: &str) -> Result<FieldKind, SchemaError> {
    let attr_path = format!("{path}.flags");
    let raw_flags = match def.get("flags") {
        Some(Json::Object(flags)) => flags,
        Some(other) => {
            return Err(SchemaError::at(
                attr_path,
                SchemaErrorKind::InvalidAttribute {
                    expected: "mapping of flag names to bit positions",
                    got: json_type(other).to_owned(),
                },
            ))
        }
        None => {
            return Err(SchemaError::at(
                path,
                SchemaErrorKind::MissingAttribute("flags"),
            ))
        }
    };

    if raw_flags.is_empty() {
        return Err(SchemaError::at(attr_path, SchemaErrorKind::BitmaskEmpty));
    }

    let mut flags: Vec<(String, u8)> = Vec::with_capacity(raw_flags.len());
    for (flag_name, raw_position) in raw_flags {
        if !is_identifier(flag_name) {
            return Err(SchemaError::at(
                format!("{attr_path}.{flag_name}"),
                SchemaErrorKind::InvalidIdentifier(quote(&clip(flag_name))),
            ));
        }
        let position = match raw_position.as_i64() {
            Some(position) => position,
            None => {
                return Err(SchemaError::at(
                    format!("{attr_path}.{flag_name}"),
                    SchemaErrorKind::InvalidAttribute {
                        expected: "integer bit position",
                        got: json_type(raw_position).to_owned(),
                    },
                ))
            }
        };
        if !(0..=MAX_FLAG_POSITION).contains(&position) {
            return Err(SchemaError::at(
                format!("{attr_path}.{flag_name}"),
                SchemaErrorKind::BitmaskPositionOutOfRange(position),
            ));
        }
        let position = position as u8;
        if flags.iter().any(|(_, existing)| *existing == position) {
            return Err(SchemaError::at(
                format!("{attr_path}.{flag_name}"),
                SchemaErrorKind::BitmaskPositionDuplicate(position),
            ));
        }
        flags.push((flag_name.clone(), position));
    }

    Ok(FieldKind::Bitmask { flags })
}

fn as_object<'a>(value: &'a Json, path: &str) -> Result<&'a Map<String, Json>, SchemaError> {
    value.as_object().ok_or_else(|| {
        SchemaError::at(
            path,
            SchemaErrorKind::InvalidAttribute {
                expected: "object",
                got: json_type(value).to_owned(),
            },
        )
    })
}

fn require_str<'a>(
    def: &'a Map<String, Json>,
    path: &str,
    attr: &'static str,
) -> Result<&'a str, SchemaError> {
    match def.get(attr) {
        Some(Json::String(value)) => Ok(value),
        Some(other) => Err(SchemaError::at(
            format!("{path}.{attr}"),
            SchemaErrorKind::InvalidAttribute {
                expected: "string",
                got: json_type(other).to_owned(),
            },
        )),
        None => Err(SchemaError::at(
            path.to_owned(),
            SchemaErrorKind::MissingAttribute(attr),
        )),
    }
}

fn require_i64(
    def: &Map<String, Json>,
    path: &str,
    attr: &'static str,
) -> Result<i64, SchemaError> {
    match def.get(attr) {
        Some(value) => value.as_i64().ok_or_else(|| {
            SchemaError::at(
                format!("{path}.{attr}"),
                SchemaErrorKind::InvalidAttribute {
                    expected: "integer",
                    got: json_type(value).to_owned(),
                },
            )
        }),
        None => Err(SchemaError::at(
            path.to_owned(),
            SchemaErrorKind::MissingAttribute(attr),
        )),
    }
}

fn json_type(value: &Json) -> &'static str {
    match value {
        Json::Null => "null",
        Json::Bool(_) => "boolean",
        Json::Number(_) => "number",
        Json::String(_) => "string",
        Json::Array(_) => "array",
        Json::Object(_) => "object",
    }
}
