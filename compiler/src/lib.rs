//! bitschema-compiler
//!
//! This crate implements:
//!  1) Schema validation over parsed documents (`verify_schema`),
//!  2) The bit layout planner (`compute_layout` → [layout::Layout]),
//!  3) The record codec (`encode` / `decode`) with fail-fast validation,
//!  4) Derived artifacts: JSON Schema export (`generate_json_schema`),
//!     layout tables (`render_layout`), layout summaries (`layout_summary`),
//!     and Rust accessor generation (`generate_accessor`),
//!  5) Error types (`SchemaError`, `EncodingError`, `CodegenError`).
//!
//! Everything here is synchronous and lock-free. Validated [Schema]s and
//! planned [layout::Layout]s are immutable and freely shareable across
//! threads; records are owned by the caller.
//!
//! [Schema]: bitschema_schema::Schema

pub mod decoder;
pub mod encoder;
pub mod error;
pub mod gen_rust;
pub mod jsonschema;
pub mod layout;
pub mod output;
pub mod utils;
pub mod validator;
pub mod verifier;
pub mod visualize;

pub use decoder::decode;
pub use encoder::encode;
pub use error::{CodegenError, EncodingError, SchemaError, SchemaErrorKind};
pub use gen_rust::generate_accessor;
pub use jsonschema::generate_json_schema;
pub use layout::{compute_layout, FieldLayout, Layout};
pub use output::layout_summary;
pub use validator::validate_record;
pub use verifier::{is_identifier, verify_schema};
pub use visualize::{render_layout, TableFormat};
