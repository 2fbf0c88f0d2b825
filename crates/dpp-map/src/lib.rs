//! Rule-driven mapping from flat source records to nested documents.
//!
//! The [`MappingLoader`] reads and shape-checks YAML mapping configurations;
//! the [`MappingEngine`] applies an ordered rule list to extracted records,
//! producing one nested JSON document per record. Writes go through typed
//! target paths, so `battery.materials[0].share` materializes the `battery`
//! object, the `materials` array, and its first element as needed.

pub mod document;
pub mod embedded;
mod engine;
mod loader;

pub use engine::{FallbackEvent, MappingAudit, MappingEngine};
pub use loader::MappingLoader;
