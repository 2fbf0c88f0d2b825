//! Shared data model for the DPP bridge pipeline.
//!
//! This crate holds the types every pipeline stage agrees on: flat
//! [`DataRecord`]s produced by connectors, the declarative mapping
//! configuration ([`MappingConfig`] and friends), typed [`TargetPath`]s for
//! output assembly, and the error taxonomy rooted at [`BridgeError`].

pub mod error;
pub mod mapping;
pub mod path;
pub mod record;
pub mod source;

pub use error::{
    BridgeError, ConnectorError, ExporterError, MappingError, Result, SchemaNotFoundError,
    ValidationError,
};
pub use mapping::{
    Document, MappingConfig, MappingMeta, MappingRule, OutputFormat, SourceOptions, TargetOptions,
    TransformSpec,
};
pub use path::{PathSegment, TargetPath, TargetPathError};
pub use record::DataRecord;
pub use source::Source;
