use thiserror::Error;

/// A schema rejected at load/validate time.
///
/// `path` points at the offending part of the document (`name`, `fields`,
/// `fields.<name>.<attr>`, ...); the kind carries the violated rule and the
/// offending value, clipped to a safe display length.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{path}: {kind}")]
pub struct SchemaError {
    pub path: String,
    pub kind: SchemaErrorKind,
}

impl SchemaError {
    pub fn at(path: impl Into<String>, kind: SchemaErrorKind) -> Self {
        SchemaError {
            path: path.into(),
            kind,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SchemaErrorKind {
    #[error("unknown field type {0}")]
    UnknownVariant(String),

    #[error("missing required attribute \"{0}\"")]
    MissingAttribute(&'static str),

    #[error("expected {expected}, got {got}")]
    InvalidAttribute {
        expected: &'static str,
        got:      String,
    },

    #[error("{0} is not a valid identifier")]
    InvalidIdentifier(String),

    #[error("duplicate field name {0}")]
    DuplicateFieldName(String),

    #[error("min {min} is greater than max {max}")]
    IntegerRangeInverted { min: i64, max: i64 },

    #[error("range [{min}, {max}] does not fit in a 64-bit word")]
    IntegerRangeOverflow { min: i64, max: i64 },

    #[error("enum needs at least one value")]
    EnumEmpty,

    #[error("enum has {0} values, the limit is 255")]
    EnumTooLarge(usize),

    #[error("duplicate enum value {0}")]
    EnumDuplicate(String),

    #[error("min_date {min} is not before max_date {max} on the resolution grid")]
    DateRangeInverted { min: String, max: String },

    #[error("invalid ISO 8601 date {0}")]
    DateParseError(String),

    #[error("flag position {0} is outside 0..=63")]
    BitmaskPositionOutOfRange(i64),

    #[error("flag position {0} is used twice")]
    BitmaskPositionDuplicate(u8),

    #[error("bitmask needs at least one flag")]
    BitmaskEmpty,

    #[error("schema needs at least one field")]
    EmptySchema,

    #[error("total width {total} bits exceeds the 64-bit word ({breakdown})")]
    SchemaTooLarge { total: u32, breakdown: String },
}

/// A record rejected at encode time. Value errors echo the offending value
/// in a form safe to print.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EncodingError {
    #[error("missing required fields: {}", .0.join(", "))]
    MissingField(Vec<String>),

    #[error("field \"{field}\": expected {expected}, got {got}")]
    TypeMismatch {
        field:    String,
        expected: &'static str,
        got:      &'static str,
    },

    #[error("field \"{field}\": value {value} is outside {range}")]
    OutOfRange {
        field: String,
        value: String,
        range: String,
    },

    #[error("field \"{field}\": {value} is not one of the enum values")]
    UnknownEnumValue { field: String, value: String },

    #[error("field \"{field}\": unknown flag {flag}")]
    UnknownFlag { field: String, flag: String },

    #[error("field \"{field}\": null is not allowed")]
    NullNotAllowed { field: String },
}

/// The code emitter refused its own output.
#[derive(Debug, Error)]
pub enum CodegenError {
    #[error("generated source is not syntactically valid: {0}")]
    InvalidSource(String),
}
