//! Validated schema types: the closed set of field variants and the ordered
//! field list.

use chrono::{Duration, NaiveDateTime, NaiveTime, Timelike};

/// A validated schema: name, version, and fields in declaration order.
///
/// Declaration order is part of the schema's identity; the layout planner
/// assigns bit offsets by walking `fields` front to back. Names are unique
/// identifiers by construction (the verifier rejects anything else), so the
/// explicit pair list doubles as an ordered map.
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    pub name:    String,
    pub version: String,
    /// Fields in declaration order.
    pub fields:  Vec<(String, Field)>,
}

impl Schema {
    /// Looks up a field by name.
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields
            .iter()
            .find(|(field_name, _)| field_name == name)
            .map(|(_, field)| field)
    }
}

/// A single field: its variant plus the nullability flag every variant
/// carries.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub kind:     FieldKind,
    pub nullable: bool,
}

/// The closed set of field variants.
///
/// Every codec and emitter site matches exhaustively on this, so adding a
/// variant forces every consumer to handle it.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    Bool,
    Int {
        min:    i64,
        max:    i64,
        signed: bool,
    },
    Enum {
        values: Vec<String>,
    },
    Date {
        resolution: Resolution,
        /// Lower bound, truncated to the resolution grid.
        min: NaiveDateTime,
        /// Upper bound, truncated to the resolution grid.
        max: NaiveDateTime,
    },
    Bitmask {
        /// Flag names mapped to bit positions, in declaration order.
        flags: Vec<(String, u8)>,
    },
}

impl FieldKind {
    /// The `type` tag this variant carries in schema documents.
    pub fn tag(&self) -> &'static str {
        match self {
            FieldKind::Bool => "bool",
            FieldKind::Int { .. } => "int",
            FieldKind::Enum { .. } => "enum",
            FieldKind::Date { .. } => "date",
            FieldKind::Bitmask { .. } => "bitmask",
        }
    }
}

/// Time resolution of a date field. The resolution fixes the grid the field
/// stores: one tick per day, hour, minute, or second from the field's lower
/// bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Day,
    Hour,
    Minute,
    Second,
}

impl Resolution {
    pub fn as_str(self) -> &'static str {
        match self {
            Resolution::Day => "day",
            Resolution::Hour => "hour",
            Resolution::Minute => "minute",
            Resolution::Second => "second",
        }
    }

    pub fn parse(s: &str) -> Option<Resolution> {
        match s {
            "day" => Some(Resolution::Day),
            "hour" => Some(Resolution::Hour),
            "minute" => Some(Resolution::Minute),
            "second" => Some(Resolution::Second),
            _ => None,
        }
    }

    /// Truncates `dt` down to this resolution's grid.
    pub fn truncate(self, dt: NaiveDateTime) -> NaiveDateTime {
        let midnight = dt.date().and_time(NaiveTime::MIN);
        let time = dt.time();
        match self {
            Resolution::Day => midnight,
            Resolution::Hour => midnight + Duration::hours(i64::from(time.hour())),
            Resolution::Minute => {
                midnight
                    + Duration::minutes(i64::from(time.hour()) * 60 + i64::from(time.minute()))
            }
            Resolution::Second => {
                midnight + Duration::seconds(i64::from(time.num_seconds_from_midnight()))
            }
        }
    }

    /// Whole ticks from `from` to `to`, truncating toward zero.
    pub fn ticks_between(self, from: NaiveDateTime, to: NaiveDateTime) -> i64 {
        let delta = to - from;
        match self {
            Resolution::Day => delta.num_days(),
            Resolution::Hour => delta.num_hours(),
            Resolution::Minute => delta.num_minutes(),
            Resolution::Second => delta.num_seconds(),
        }
    }

    /// `from` advanced by `ticks` grid steps, or `None` past the calendar
    /// range.
    pub fn advance(self, from: NaiveDateTime, ticks: i64) -> Option<NaiveDateTime> {
        let delta = match self {
            Resolution::Day => Duration::try_days(ticks)?,
            Resolution::Hour => Duration::try_hours(ticks)?,
            Resolution::Minute => Duration::try_minutes(ticks)?,
            Resolution::Second => Duration::try_seconds(ticks)?,
        };
        from.checked_add_signed(delta)
    }
}
