//! The encoder: packs a record into a single 64-bit word.
//!
//! LSB-first accumulator: each field ORs its normalized value into place at
//! its layout offset. Validation runs first, so an invalid record never
//! produces a word.

use bitschema_schema::{FieldKind, Record, Value};

use crate::error::EncodingError;
use crate::layout::Layout;
use crate::validator::validate_record;

/// Mask covering the low `bits` bits of a word.
pub(crate) fn mask(bits: u8) -> u64 {
    match bits {
        0 => 0,
        64.. => u64::MAX,
        _ => (1u64 << bits) - 1,
    }
}

/// Packs `record` into a word according to `layout`.
///
/// Null values of nullable fields leave both the presence bit and the value
/// bits at zero. Bits past `layout.total_bits` are always zero; callers
/// transmitting the word must keep them that way.
pub fn encode(record: &Record, layout: &Layout) -> Result<u64, EncodingError> {
    validate_record(record, layout)?;

    let mut word: u64 = 0;
    for field in &layout.fields {
        let value = record.get(&field.name).unwrap_or(&Value::Null);
        if field.nullable {
            if value.is_null() {
                continue;
            }
            word |= 1 << field.offset;
        }
        if field.value_bits() > 0 {
            let normalized = normalize_value(value, &field.kind);
            debug_assert!(normalized <= mask(field.value_bits()));
            word |= (normalized & mask(field.value_bits())) << field.value_offset();
        }
    }
    Ok(word)
}

/// Normalizes a validated value to its unsigned field representation.
///
/// The mapping is a bijection over the field's domain: booleans to 0/1,
/// integers to `value - min`, enum members to their index, dates to grid
/// ticks since the lower bound, flag maps to their position-OR. Validated
/// records never hit the fallback arms.
pub fn normalize_value(value: &Value, kind: &FieldKind) -> u64 {
    match (kind, value) {
        (FieldKind::Bool, Value::Bool(b)) => u64::from(*b),
        (FieldKind::Int { min, .. }, Value::Int(v)) => v.wrapping_sub(*min) as u64,
        (FieldKind::Enum { values }, Value::Str(s)) => values
            .iter()
            .position(|candidate| candidate == s)
            .unwrap_or(0) as u64,
        (
            FieldKind::Date {
                resolution, min, ..
            },
            _,
        ) => match value.as_datetime() {
            Some(dt) => resolution.ticks_between(*min, resolution.truncate(dt)) as u64,
            None => 0,
        },
        (FieldKind::Bitmask { flags }, Value::Flags(set)) => {
            flags.iter().fold(0u64, |acc, (name, position)| {
                if set.get(name).copied().unwrap_or(false) {
                    acc | (1 << position)
                } else {
                    acc
                }
            })
        }
        _ => 0,
    }
}
