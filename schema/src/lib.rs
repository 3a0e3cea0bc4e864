//! This crate holds the data model shared by the BitSchema compiler, codec,
//! and emitters.
//!
//! - [Schema], [Field], [FieldKind], [Resolution]: the validated schema types
//! - [Value] and [Record]: dynamic record data for the codec
//! - [iso]: ISO 8601 parse/format helpers without timezone exposure
//!
//! ```
//! use bitschema_schema::{Field, FieldKind, Schema};
//!
//! let schema = Schema {
//!     name: "Heartbeat".to_owned(),
//!     version: "1".to_owned(),
//!     fields: vec![(
//!         "alive".to_owned(),
//!         Field { kind: FieldKind::Bool, nullable: false },
//!     )],
//! };
//! assert_eq!(schema.field("alive").unwrap().kind.tag(), "bool");
//! ```

pub mod iso;
pub mod schema;
pub mod value;

pub use schema::*;
pub use value::*;
