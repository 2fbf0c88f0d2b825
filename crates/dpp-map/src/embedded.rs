//! Embedded configuration schema.
//!
//! The mapping meta-schema ships inside the binary via `include_str!()`, so
//! configuration checking needs no runtime file lookup.

/// JSON Schema (draft 7) every mapping configuration must satisfy.
pub const MAPPING_SCHEMA: &str = include_str!("../data/mapping.schema.json");
