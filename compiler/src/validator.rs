//! Encode-time record validation. Runs before any bit packing so an invalid
//! record can never produce a word.

use bitschema_schema::{iso, FieldKind, Record, Value};

use crate::error::EncodingError;
use crate::layout::{FieldLayout, Layout};
use crate::utils::{clip, quote};

/// Validates a record against the layout.
///
/// Missing non-nullable fields are reported first, all together. Each field
/// then reports its first violation in layout order. Extra keys in the
/// record are ignored.
pub fn validate_record(record: &Record, layout: &Layout) -> Result<(), EncodingError> {
    let missing: Vec<String> = layout
        .fields
        .iter()
        .filter(|field| !field.nullable && !record.contains_key(&field.name))
        .map(|field| field.name.clone())
        .collect();
    if !missing.is_empty() {
        return Err(EncodingError::MissingField(missing));
    }

    for field in &layout.fields {
        let value = record.get(&field.name).unwrap_or(&Value::Null);
        validate_value(value, field)?;
    }
    Ok(())
}

/// Validates a single value against its field's variant and constraints.
pub fn validate_value(value: &Value, field: &FieldLayout) -> Result<(), EncodingError> {
    if value.is_null() {
        if field.nullable {
            return Ok(());
        }
        return Err(EncodingError::NullNotAllowed {
            field: field.name.clone(),
        });
    }

    match &field.kind {
        FieldKind::Bool => {
            if value.as_bool().is_none() {
                return Err(mismatch(field, "boolean", value));
            }
        }
        FieldKind::Int { min, max, .. } => {
            let Some(v) = value.as_int() else {
                return Err(mismatch(field, "integer", value));
            };
            if v < *min || v > *max {
                return Err(EncodingError::OutOfRange {
                    field: field.name.clone(),
                    value: v.to_string(),
                    range: format!("[{min}, {max}]"),
                });
            }
        }
        FieldKind::Enum { values } => {
            let Some(s) = value.as_str() else {
                return Err(mismatch(field, "string", value));
            };
            if !values.iter().any(|candidate| candidate == s) {
                return Err(EncodingError::UnknownEnumValue {
                    field: field.name.clone(),
                    value: quote(&clip(s)),
                });
            }
        }
        FieldKind::Date {
            resolution,
            min,
            max,
        } => {
            let Some(dt) = value.as_datetime() else {
                return Err(mismatch(field, "date, datetime, or ISO 8601 string", value));
            };
            // The truncated value is what gets stored, so it is what the
            // range check applies to.
            let dt = resolution.truncate(dt);
            if dt < *min || dt > *max {
                return Err(EncodingError::OutOfRange {
                    field: field.name.clone(),
                    value: iso::format_bound(dt, *resolution),
                    range: format!(
                        "[{}, {}]",
                        iso::format_bound(*min, *resolution),
                        iso::format_bound(*max, *resolution)
                    ),
                });
            }
        }
        FieldKind::Bitmask { flags } => {
            let Some(map) = value.as_flags() else {
                return Err(mismatch(field, "mapping of flag names to booleans", value));
            };
            for name in map.keys() {
                if !flags.iter().any(|(flag, _)| flag == name) {
                    return Err(EncodingError::UnknownFlag {
                        field: field.name.clone(),
                        flag: quote(&clip(name)),
                    });
                }
            }
        }
    }
    Ok(())
}

fn mismatch(field: &FieldLayout, expected: &'static str, value: &Value) -> EncodingError {
    EncodingError::TypeMismatch {
        field: field.name.clone(),
        expected,
        got: value.type_name(),
    }
}
