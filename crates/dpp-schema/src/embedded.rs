//! Bundled passport schemas and their JSON-LD contexts.
//!
//! Embedded at compile time with `include_str!()`; no runtime file lookup.

/// Digital Product Passport schema (JSON Schema draft 7).
pub const DPP_SCHEMA: &str = include_str!("../data/dpp.schema.json");

/// JSON-LD context for the `dpp` schema.
pub const DPP_CONTEXT: &str = include_str!("../data/dpp.context.json");

/// Battery Passport schema, data model v1.2.0.
pub const BATTERY_PASSPORT_SCHEMA: &str = include_str!("../data/battery_passport.schema.json");

/// JSON-LD context for the `battery_passport` schema.
pub const BATTERY_PASSPORT_CONTEXT: &str = include_str!("../data/battery_passport.context.json");
