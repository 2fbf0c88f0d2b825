//! Schema registration and document validation.
//!
//! Documents produced by the mapping engine validate against named JSON
//! Schemas before export. The [`SchemaRegistry`] owns the name→validator
//! table (plus optional JSON-LD contexts); callers hold their own registry
//! instance and pass it where validation happens — there is no process-wide
//! registry. Two passport schemas ship bundled: `dpp` (alias
//! `digital_product_passport`) and `battery_passport` (alias `battery_pass`).

pub mod embedded;
mod registry;
mod validator;

pub use registry::SchemaRegistry;
pub use validator::{JsonSchemaValidator, SchemaValidator};
