//! Layout summary export: the planner's result as plain JSON, for tooling
//! that wants the packed layout without parsing a rendered table.

use serde_json::{json, Map, Value as Json};

use bitschema_schema::{iso, FieldKind, Schema};

use crate::layout::Layout;

/// Emits `{version, name, total_bits, fields: [...]}` with one entry per
/// field carrying its offset, width, nullability, and constraints. The
/// output is JSON-serializable as-is and preserves field order.
pub fn layout_summary(schema: &Schema, layout: &Layout) -> Json {
    let fields: Vec<Json> = layout
        .fields
        .iter()
        .map(|field| {
            json!({
                "name": field.name,
                "type": field.kind.tag(),
                "offset": field.offset,
                "bits": field.bits,
                "nullable": field.nullable,
                "constraints": constraints_json(&field.kind),
            })
        })
        .collect();

    json!({
        "version": schema.version,
        "name": schema.name,
        "total_bits": layout.total_bits,
        "fields": fields,
    })
}

fn constraints_json(kind: &FieldKind) -> Json {
    match kind {
        FieldKind::Bool => json!({}),
        FieldKind::Int { min, max, signed } => {
            json!({"min": min, "max": max, "signed": signed})
        }
        FieldKind::Enum { values } => json!({"values": values}),
        FieldKind::Date {
            resolution,
            min,
            max,
        } => json!({
            "resolution": resolution.as_str(),
            "min_date": iso::format_bound(*min, *resolution),
            "max_date": iso::format_bound(*max, *resolution),
        }),
        FieldKind::Bitmask { flags } => {
            let mut positions = Map::new();
            for (name, position) in flags {
                positions.insert(name.clone(), json!(position));
            }
            Json::Object(positions)
        }
    }
}
