//! The layout planner: turns a validated schema into a frozen bit
//! assignment.
//!
//! Fields are laid out in declaration order, LSB first, with no padding and
//! no reordering. The planner is pure; the same schema always yields the
//! same layout.

use bitschema_schema::{FieldKind, Schema};

use crate::error::{SchemaError, SchemaErrorKind};

/// Planner output for one field.
///
/// `bits` includes the presence bit when `nullable` is set. The presence bit
/// sits at `offset`; value bits follow at `offset + 1`.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldLayout {
    pub name:     String,
    pub kind:     FieldKind,
    pub offset:   u8,
    pub bits:     u8,
    pub nullable: bool,
}

impl FieldLayout {
    /// LSB position of the value bits.
    pub fn value_offset(&self) -> u8 {
        self.offset + u8::from(self.nullable)
    }

    /// Width of the value bits, presence bit excluded.
    pub fn value_bits(&self) -> u8 {
        self.bits - u8::from(self.nullable)
    }
}

/// A frozen bit assignment: fields in declaration order, offsets strictly
/// increasing, total within one 64-bit word. Immutable once produced and
/// freely shareable across threads.
#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    pub fields:     Vec<FieldLayout>,
    pub total_bits: u8,
}

/// Position of the highest set bit; 0 for 0. Integer arithmetic only, never
/// a float logarithm.
pub fn bit_length(n: u64) -> u8 {
    (64 - n.leading_zeros()) as u8
}

/// Value bits a field needs, before any presence bit.
///
/// Integer and date widths cover the range *size* (`max - min` in values or
/// grid ticks); enums cover the highest index. A single-value enum or a
/// `min == max` integer needs zero bits: the field is a constant.
pub fn field_bits(kind: &FieldKind) -> u8 {
    match kind {
        FieldKind::Bool => 1,
        FieldKind::Int { min, max, .. } => bit_length((*max as i128 - *min as i128) as u64),
        FieldKind::Enum { values } => bit_length(values.len().saturating_sub(1) as u64),
        FieldKind::Date {
            resolution,
            min,
            max,
        } => bit_length(resolution.ticks_between(*min, *max) as u64),
        FieldKind::Bitmask { flags } => {
            flags.iter().map(|(_, pos)| pos + 1).max().unwrap_or(0)
        }
    }
}

/// Assigns sequential LSB-first offsets in declaration order and checks the
/// 64-bit cap. Fails with [SchemaErrorKind::SchemaTooLarge] carrying the
/// per-field width breakdown.
pub fn compute_layout(schema: &Schema) -> Result<Layout, SchemaError> {
    let widths: Vec<u32> = schema
        .fields
        .iter()
        .map(|(_, field)| u32::from(field_bits(&field.kind)) + u32::from(field.nullable))
        .collect();

    let total: u32 = widths.iter().sum();
    if total > 64 {
        let breakdown = schema
            .fields
            .iter()
            .zip(&widths)
            .map(|((name, _), bits)| format!("{name}={bits}"))
            .collect::<Vec<_>>()
            .join(", ");
        return Err(SchemaError::at(
            "fields",
            SchemaErrorKind::SchemaTooLarge { total, breakdown },
        ));
    }

    let mut fields = Vec::with_capacity(schema.fields.len());
    let mut offset: u8 = 0;
    for ((name, field), bits) in schema.fields.iter().zip(&widths) {
        fields.push(FieldLayout {
            name: name.clone(),
            kind: field.kind.clone(),
            offset,
            bits: *bits as u8,
            nullable: field.nullable,
        });
        offset += *bits as u8;
    }

    Ok(Layout {
        fields,
        total_bits: offset,
    })
}
