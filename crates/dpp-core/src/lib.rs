//! The bridge: one façade over the whole extract→map→validate→export chain.
//!
//! [`Bridge`] wires the stage crates together behind a single API. The
//! one-call path:
//!
//! ```no_run
//! # fn main() -> dpp_model::Result<()> {
//! let bridge = dpp_core::Bridge::new()?;
//! let documents = bridge.transform_file(
//!     "production.xml",
//!     "mapping.yaml",
//!     Some(std::path::Path::new("passport.json")),
//! )?;
//! # Ok(())
//! # }
//! ```
//!
//! Each stage is also callable on its own (`extract`, `map`, `export`) for
//! step-wise pipelines. Schema validation inside `transform` is best-effort:
//! a non-conforming document is logged and kept, never dropped — strictness
//! is opt-in through [`SchemaRegistry::validate`].
//!
//! This crate also re-exports the types most callers need, so `dpp_core` can
//! serve as the single dependency of an application.

mod bridge;

pub use bridge::{Bridge, transform};

pub use dpp_export::{JsonLdExporter, default_context};
pub use dpp_ingest::{Connector, ConnectorRegistry};
pub use dpp_map::{MappingAudit, MappingEngine, MappingLoader};
pub use dpp_model::{
    BridgeError, ConnectorError, DataRecord, Document, ExporterError, MappingConfig, MappingError,
    MappingRule, OutputFormat, SchemaNotFoundError, Source, SourceOptions, TargetPath,
    ValidationError,
};
pub use dpp_schema::{SchemaRegistry, SchemaValidator};
pub use dpp_transform::TransformRegistry;
