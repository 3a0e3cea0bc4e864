//! The decoder: unpacks a 64-bit word into a fresh record.
//!
//! Decode is total. Any `u64` decodes against any layout; bits outside the
//! layout are ignored, and in-field patterns with no domain counterpart
//! (an enum index past the value list, a date tick past the upper bound)
//! clamp to the highest domain member instead of failing.

use bitschema_schema::{FieldKind, Record, Resolution, Value};

use crate::encoder::mask;
use crate::layout::Layout;

/// Unpacks `word` into a record according to `layout`.
///
/// Nullable fields with a clear presence bit decode to [Value::Null]; their
/// value bits are ignored whatever they contain. The returned record is
/// freshly owned by the caller.
pub fn decode(word: u64, layout: &Layout) -> Record {
    let mut record = Record::new();
    for field in &layout.fields {
        if field.nullable && (word >> field.offset) & 1 == 0 {
            record.insert(field.name.clone(), Value::Null);
            continue;
        }
        let extracted = if field.value_bits() == 0 {
            0
        } else {
            (word >> field.value_offset()) & mask(field.value_bits())
        };
        record.insert(field.name.clone(), denormalize_value(extracted, &field.kind));
    }
    record
}

/// Maps unsigned field bits back to a semantic value.
pub fn denormalize_value(extracted: u64, kind: &FieldKind) -> Value {
    match kind {
        FieldKind::Bool => Value::Bool(extracted != 0),
        FieldKind::Int { min, .. } => Value::Int((extracted as i64).wrapping_add(*min)),
        FieldKind::Enum { values } => {
            let index = (extracted as usize).min(values.len() - 1);
            Value::Str(values[index].clone())
        }
        FieldKind::Date {
            resolution,
            min,
            max,
        } => {
            let dt = resolution
                .advance(*min, extracted as i64)
                .filter(|dt| dt <= max)
                .unwrap_or(*max);
            match resolution {
                Resolution::Day => Value::Date(dt.date()),
                _ => Value::DateTime(dt),
            }
        }
        FieldKind::Bitmask { flags } => Value::Flags(
            flags
                .iter()
                .map(|(name, position)| (name.clone(), (extracted >> position) & 1 == 1))
                .collect(),
        ),
    }
}
