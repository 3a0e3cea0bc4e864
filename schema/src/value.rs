use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::ser::{Serialize, Serializer};

use crate::iso;

/// A record passed to the encoder or returned by the decoder: field names
/// mapped to dynamic values. Records are short-lived and owned by the
/// caller; the codec never mutates one it was handed.
pub type Record = BTreeMap<String, Value>;

/// This type holds dynamic record data.
///
/// A value can represent anything a BitSchema field stores. Date fields
/// accept [Value::Date], [Value::DateTime], or [Value::Str] holding ISO 8601
/// on encode; the decoder returns [Value::Date] for day resolution and
/// [Value::DateTime] otherwise. Bitmask fields hold a flag-name-to-bool
/// mapping.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Str(String),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    Flags(BTreeMap<String, bool>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// A convenience method to extract the value out of a [Bool](#variant.Bool).
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(value) => Some(*value),
            _ => None,
        }
    }

    /// A convenience method to extract the value out of an [Int](#variant.Int).
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(value) => Some(*value),
            _ => None,
        }
    }

    /// A convenience method to extract the value out of a [Str](#variant.Str).
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(value) => Some(value.as_str()),
            _ => None,
        }
    }

    /// A convenience method to extract the flag map out of a [Flags](#variant.Flags).
    pub fn as_flags(&self) -> Option<&BTreeMap<String, bool>> {
        match self {
            Value::Flags(flags) => Some(flags),
            _ => None,
        }
    }

    /// Interprets this value as a naive datetime if it is date-shaped.
    /// Strings go through the ISO 8601 parser; a bare date maps to midnight.
    pub fn as_datetime(&self) -> Option<NaiveDateTime> {
        match self {
            Value::Date(date) => Some(date.and_time(NaiveTime::MIN)),
            Value::DateTime(dt) => Some(*dt),
            Value::Str(s) => iso::parse_datetime(s),
            _ => None,
        }
    }

    /// Human name of the value's shape, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Int(_) => "integer",
            Value::Str(_) => "string",
            Value::Date(_) => "date",
            Value::DateTime(_) => "datetime",
            Value::Flags(_) => "flag map",
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Str(value.to_owned())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Str(value)
    }
}

impl From<NaiveDate> for Value {
    fn from(value: NaiveDate) -> Self {
        Value::Date(value)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(value: NaiveDateTime) -> Self {
        Value::DateTime(value)
    }
}

impl From<BTreeMap<String, bool>> for Value {
    fn from(value: BTreeMap<String, bool>) -> Self {
        Value::Flags(value)
    }
}

/// The JSON projection of a record: dates become ISO 8601 strings, flag maps
/// become objects, null stays null. This is the shape the emitted JSON
/// Schema describes.
impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(value) => serializer.serialize_bool(*value),
            Value::Int(value) => serializer.serialize_i64(*value),
            Value::Str(value) => serializer.serialize_str(value),
            Value::Date(date) => serializer.serialize_str(&date.format("%Y-%m-%d").to_string()),
            Value::DateTime(dt) => {
                serializer.serialize_str(&dt.format("%Y-%m-%dT%H:%M:%S").to_string())
            }
            Value::Flags(flags) => flags.serialize(serializer),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accessors_reject_other_shapes() {
        assert_eq!(Value::Bool(true).as_bool(), Some(true));
        assert_eq!(Value::Int(1).as_bool(), None);
        assert_eq!(Value::Int(-3).as_int(), Some(-3));
        assert_eq!(Value::Bool(false).as_int(), None);
        assert_eq!(Value::Str("a".into()).as_str(), Some("a"));
        assert_eq!(Value::Null.as_str(), None);
    }

    #[test]
    fn test_as_datetime_accepts_iso_strings() {
        let dt = Value::Str("2021-05-01T06:00:00".into()).as_datetime().unwrap();
        assert_eq!(dt.to_string(), "2021-05-01 06:00:00");
        assert!(Value::Str("garbage".into()).as_datetime().is_none());
        assert!(Value::Int(42).as_datetime().is_none());
    }

    #[test]
    fn test_json_projection() {
        let date: NaiveDate = "2021-05-01".parse().unwrap();
        assert_eq!(
            serde_json::to_string(&Value::Date(date)).unwrap(),
            "\"2021-05-01\""
        );
        assert_eq!(serde_json::to_string(&Value::Null).unwrap(), "null");

        let flags = BTreeMap::from([("read".to_owned(), true), ("write".to_owned(), false)]);
        assert_eq!(
            serde_json::to_string(&Value::Flags(flags)).unwrap(),
            r#"{"read":true,"write":false}"#
        );
    }
}
