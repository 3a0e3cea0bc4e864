//! Rust accessor generation.
//!
//! Emits a self-contained struct with one typed field per schema field, an
//! `encode(&self) -> u64` method, and a `decode(word: u64) -> Self`
//! constructor. The normalization, masking, and presence-bit arithmetic of
//! the runtime codec is re-stated inline with every offset, mask, and
//! constant baked in; the generated type never calls back into this crate,
//! and its words are bit-identical to the runtime codec's.
//!
//! The emitter parses its own output and refuses to return anything that is
//! not syntactically valid Rust.

use bitschema_schema::{iso, FieldKind, Resolution, Schema};

use crate::error::CodegenError;
use crate::layout::{FieldLayout, Layout};

/// Schema names are validated identifiers, but an identifier can still
/// collide with a Rust keyword; those get a trailing underscore in the
/// generated source.
fn rust_safe_name(name: &str) -> String {
    match name {
        "as" | "async" | "await" | "break" | "const" | "continue" | "crate" | "dyn" | "else"
        | "enum" | "extern" | "false" | "fn" | "for" | "if" | "impl" | "in" | "let" | "loop"
        | "match" | "mod" | "move" | "mut" | "pub" | "ref" | "return" | "self" | "Self"
        | "static" | "struct" | "super" | "trait" | "true" | "type" | "unsafe" | "use"
        | "where" | "while" => format!("{name}_"),
        _ => name.to_owned(),
    }
}

/// Maps a field to the Rust type of its struct member.
fn field_type(field: &FieldLayout) -> String {
    let base = match &field.kind {
        FieldKind::Bool => "bool",
        FieldKind::Int { .. } => "i64",
        FieldKind::Enum { .. } => "String",
        FieldKind::Date {
            resolution: Resolution::Day,
            ..
        } => "NaiveDate",
        FieldKind::Date { .. } => "NaiveDateTime",
        FieldKind::Bitmask { .. } => "BTreeMap<String, bool>",
    };
    if field.nullable {
        format!("Option<{base}>")
    } else {
        base.to_owned()
    }
}

fn hex_mask(bits: u8) -> String {
    format!("{:#x}", crate::encoder::mask(bits))
}

/// `(word >> offset) & mask`, eliding the shift at offset zero.
fn extract_expr(offset: u8, bits: u8) -> String {
    if offset == 0 {
        format!("word & {}", hex_mask(bits))
    } else {
        format!("(word >> {offset}) & {}", hex_mask(bits))
    }
}

fn quoted_list(values: &[String]) -> String {
    values
        .iter()
        .map(|value| format!("{value:?}"))
        .collect::<Vec<_>>()
        .join(", ")
}

fn flag_pairs(flags: &[(String, u8)]) -> String {
    flags
        .iter()
        .map(|(name, position)| format!("({name:?}, {position}u32)"))
        .collect::<Vec<_>>()
        .join(", ")
}

fn min_date_literal(resolution: Resolution, min: chrono::NaiveDateTime) -> String {
    match resolution {
        Resolution::Day => format!(
            "let min_date = {:?}.parse::<NaiveDate>().unwrap();",
            iso::format_bound(min, resolution)
        ),
        _ => format!(
            "let min_date = {:?}.parse::<NaiveDateTime>().unwrap();",
            iso::format_bound(min, resolution)
        ),
    }
}

fn tick_unit(resolution: Resolution) -> (&'static str, &'static str) {
    match resolution {
        Resolution::Day => ("num_days", "days"),
        Resolution::Hour => ("num_hours", "hours"),
        Resolution::Minute => ("num_minutes", "minutes"),
        Resolution::Second => ("num_seconds", "seconds"),
    }
}

/// Constraint note for the module header, mirroring the layout table.
fn header_note(field: &FieldLayout) -> String {
    match &field.kind {
        FieldKind::Bool => String::new(),
        FieldKind::Int { min, max, .. } => format!(" ({min} to {max})"),
        FieldKind::Enum { values } => {
            let shown: Vec<&str> = values.iter().take(3).map(String::as_str).collect();
            let ellipsis = if values.len() > 3 { "..." } else { "" };
            format!(" (values: {}{ellipsis})", shown.join(", "))
        }
        FieldKind::Date {
            resolution,
            min,
            max,
        } => format!(
            " ({}..{}, {})",
            iso::format_bound(*min, *resolution),
            iso::format_bound(*max, *resolution),
            resolution.as_str()
        ),
        FieldKind::Bitmask { flags } => {
            let shown: Vec<&str> = flags.iter().take(3).map(|(name, _)| name.as_str()).collect();
            let ellipsis = if flags.len() > 3 { "..." } else { "" };
            format!(" (flags: {}{ellipsis})", shown.join(", "))
        }
    }
}

/// Generates the accessor source for `schema`, validated with [syn] before
/// it is returned.
pub fn generate_accessor(schema: &Schema, layout: &Layout) -> Result<String, CodegenError> {
    let code = render_accessor(schema, layout);
    syn::parse_file(&code).map_err(|err| CodegenError::InvalidSource(err.to_string()))?;
    Ok(code)
}

fn render_accessor(schema: &Schema, layout: &Layout) -> String {
    let type_name = rust_safe_name(&schema.name);
    let mut lines: Vec<String> = Vec::new();

    // Module header with field descriptions and bit positions.
    lines.push(format!("//! Generated accessor for `{type_name}`."));
    lines.push("//!".to_owned());
    lines.push("//! Auto-generated from a BitSchema definition. Do not edit manually.".to_owned());
    lines.push("//!".to_owned());
    lines.push(format!("//! Fields ({} bits total):", layout.total_bits));
    for field in &layout.fields {
        let position = if field.bits == 0 {
            "constant".to_owned()
        } else {
            format!("bits {}:{}", field.offset, field.offset + field.bits - 1)
        };
        lines.push(format!(
            "//!   {}: {}{}, {}",
            field.name,
            field_type(field),
            header_note(field),
            position
        ));
    }
    lines.push(String::new());

    // Imports.
    let has_bitmask = layout
        .fields
        .iter()
        .any(|field| matches!(field.kind, FieldKind::Bitmask { .. }));
    let has_day = layout.fields.iter().any(|field| {
        matches!(
            field.kind,
            FieldKind::Date {
                resolution: Resolution::Day,
                ..
            }
        )
    });
    let has_sub_day = layout.fields.iter().any(|field| {
        matches!(&field.kind, FieldKind::Date { resolution, .. } if *resolution != Resolution::Day)
    });
    if has_bitmask {
        lines.push("use std::collections::BTreeMap;".to_owned());
        lines.push(String::new());
    }
    if has_day || has_sub_day {
        let mut items = vec!["Duration"];
        if has_day {
            items.push("NaiveDate");
        }
        if has_sub_day {
            items.push("NaiveDateTime");
        }
        lines.push(format!("use chrono::{{{}}};", items.join(", ")));
        lines.push(String::new());
    }

    // Struct definition.
    lines.push("#[derive(Debug, Clone, PartialEq)]".to_owned());
    lines.push(format!("pub struct {type_name} {{"));
    for field in &layout.fields {
        lines.push(format!(
            "    pub {}: {},",
            rust_safe_name(&field.name),
            field_type(field)
        ));
    }
    lines.push("}".to_owned());
    lines.push(String::new());

    lines.push(format!("impl {type_name} {{"));

    // encode()
    lines.push("    /// Packs this record into its 64-bit word.".to_owned());
    lines.push("    pub fn encode(&self) -> u64 {".to_owned());
    lines.push("        let mut word: u64 = 0;".to_owned());
    lines.push(String::new());
    for field in &layout.fields {
        emit_encode_field(&mut lines, field);
        lines.push(String::new());
    }
    lines.push("        word".to_owned());
    lines.push("    }".to_owned());
    lines.push(String::new());

    // decode()
    lines.push("    /// Unpacks a 64-bit word into a record.".to_owned());
    lines.push("    pub fn decode(word: u64) -> Self {".to_owned());
    for field in &layout.fields {
        emit_decode_field(&mut lines, field);
        lines.push(String::new());
    }
    lines.push("        Self {".to_owned());
    for field in &layout.fields {
        lines.push(format!("            {},", rust_safe_name(&field.name)));
    }
    lines.push("        }".to_owned());
    lines.push("    }".to_owned());
    lines.push("}".to_owned());

    let mut code = lines.join("\n");
    code.push('\n');
    code
}

/// Statements normalizing `subject` and ORing it into `word`, shared by the
/// nullable and non-nullable paths. `indent` is the statement indentation.
fn encode_value_lines(field: &FieldLayout, subject: &str, indent: &str) -> Vec<String> {
    let mut lines = Vec::new();
    let value_offset = field.value_offset();
    let mask = hex_mask(field.value_bits());

    match &field.kind {
        FieldKind::Bool => {
            lines.push(format!("{indent}let normalized = u64::from({subject});"));
        }
        FieldKind::Int { min, .. } => {
            if *min == 0 {
                lines.push(format!("{indent}let normalized = {subject} as u64;"));
            } else {
                lines.push(format!(
                    "{indent}let normalized = {subject}.wrapping_sub({min}) as u64;"
                ));
            }
        }
        FieldKind::Enum { values } => {
            let compare = if subject == "value" {
                "value.as_str()".to_owned()
            } else {
                subject.to_owned()
            };
            lines.push(format!(
                "{indent}let normalized = [{}].iter().position(|v| *v == {compare}).expect({:?}) as u64;",
                quoted_list(values),
                format!("{}: value not in enum", field.name)
            ));
        }
        FieldKind::Date {
            resolution, min, ..
        } => {
            let (num_fn, _) = tick_unit(*resolution);
            lines.push(format!("{indent}{}", min_date_literal(*resolution, *min)));
            lines.push(format!(
                "{indent}let normalized = ({subject} - min_date).{num_fn}() as u64;"
            ));
        }
        FieldKind::Bitmask { flags } => {
            lines.push(format!("{indent}let mut normalized: u64 = 0;"));
            lines.push(format!(
                "{indent}for (flag, position) in [{}] {{",
                flag_pairs(flags)
            ));
            lines.push(format!(
                "{indent}    if {subject}.get(flag).copied().unwrap_or(false) {{"
            ));
            lines.push(format!("{indent}        normalized |= 1 << position;"));
            lines.push(format!("{indent}    }}"));
            lines.push(format!("{indent}}}"));
        }
    }

    if value_offset == 0 {
        lines.push(format!("{indent}word |= normalized & {mask};"));
    } else {
        lines.push(format!(
            "{indent}word |= (normalized & {mask}) << {value_offset};"
        ));
    }
    lines
}

fn emit_encode_field(lines: &mut Vec<String>, field: &FieldLayout) {
    let name = rust_safe_name(&field.name);
    if field.bits == 0 {
        lines.push(format!("        // {}: constant, no storage", field.name));
        return;
    }
    lines.push(format!(
        "        // {}: offset {}, bits {}",
        field.name, field.offset, field.bits
    ));

    if !field.nullable {
        lines.extend(encode_value_lines(field, &format!("self.{name}"), "        "));
        return;
    }

    let presence = if field.offset == 0 {
        "word |= 1;".to_owned()
    } else {
        format!("word |= 1 << {};", field.offset)
    };

    if field.value_bits() == 0 {
        lines.push(format!("        if self.{name}.is_some() {{"));
        lines.push(format!("            {presence}"));
        lines.push("        }".to_owned());
        return;
    }

    // Copy types bind by value; String and BTreeMap payloads by reference.
    let binding = match &field.kind {
        FieldKind::Enum { .. } | FieldKind::Bitmask { .. } => format!("&self.{name}"),
        _ => format!("self.{name}"),
    };
    lines.push(format!("        if let Some(value) = {binding} {{"));
    lines.push(format!("            {presence}"));
    lines.extend(encode_value_lines(field, "value", "            "));
    lines.push("        }".to_owned());
}

/// The expression decoding a present value, plus any setup statements it
/// needs at `indent`.
fn decode_value_expr(field: &FieldLayout, indent: &str) -> (Vec<String>, String) {
    let mut setup = Vec::new();
    let value_offset = field.value_offset();
    let value_bits = field.value_bits();
    let extract = extract_expr(value_offset, value_bits);

    let expr = match &field.kind {
        FieldKind::Bool => format!("({extract}) != 0"),
        FieldKind::Int { min, .. } => {
            if value_bits == 0 {
                // min == max: the field is a constant.
                format!("{min}i64")
            } else if *min == 0 {
                format!("({extract}) as i64")
            } else {
                format!("(({extract}) as i64).wrapping_add({min})")
            }
        }
        FieldKind::Enum { values } => {
            if value_bits == 0 {
                format!("{:?}.to_string()", values[0])
            } else {
                let index = if (values.len() as u64) < crate::encoder::mask(value_bits) + 1 {
                    // Patterns past the value list clamp, as the runtime
                    // decoder does.
                    format!("(({extract}) as usize).min({})", values.len() - 1)
                } else {
                    format!("({extract}) as usize")
                };
                format!("[{}][{index}].to_string()", quoted_list(values))
            }
        }
        FieldKind::Date {
            resolution, min, ..
        } => {
            let (_, duration_fn) = tick_unit(*resolution);
            setup.push(format!("{indent}{}", min_date_literal(*resolution, *min)));
            format!("min_date + Duration::{duration_fn}(({extract}) as i64)")
        }
        FieldKind::Bitmask { flags } => {
            setup.push(format!("{indent}let extracted = {extract};"));
            setup.push(format!("{indent}let mut flags = BTreeMap::new();"));
            setup.push(format!(
                "{indent}for (flag, position) in [{}] {{",
                flag_pairs(flags)
            ));
            setup.push(format!(
                "{indent}    flags.insert(flag.to_string(), ((extracted >> position) & 1) == 1);"
            ));
            setup.push(format!("{indent}}}"));
            "flags".to_owned()
        }
    };
    (setup, expr)
}

fn emit_decode_field(lines: &mut Vec<String>, field: &FieldLayout) {
    let name = rust_safe_name(&field.name);
    if field.bits == 0 {
        lines.push(format!("        // {}: constant, no storage", field.name));
        let (setup, expr) = decode_value_expr(field, "        ");
        debug_assert!(setup.is_empty());
        lines.push(format!("        let {name} = {expr};"));
        return;
    }

    lines.push(format!(
        "        // {}: offset {}, bits {}",
        field.name, field.offset, field.bits
    ));

    if !field.nullable {
        let (setup, expr) = decode_value_expr(field, "        ");
        lines.extend(setup);
        lines.push(format!("        let {name} = {expr};"));
        return;
    }

    let presence = if field.offset == 0 {
        "(word & 1) == 0".to_owned()
    } else {
        format!("((word >> {}) & 1) == 0", field.offset)
    };
    lines.push(format!("        let {name} = if {presence} {{"));
    lines.push("            None".to_owned());
    lines.push("        } else {".to_owned());
    let (setup, expr) = decode_value_expr(field, "            ");
    lines.extend(setup);
    lines.push(format!("            Some({expr})"));
    lines.push("        };".to_owned());
}
