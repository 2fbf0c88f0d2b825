//! Value transforms applied by mapping rules.
//!
//! A transform takes the value a rule resolved from the source record and
//! reshapes it before the target write: type coercions (`str`, `int`,
//! `float`), datetime normalization, table lookups, string templates, and
//! list aggregation. Transforms never fail the record — a value they cannot
//! handle produces a [`TransformOutcome::Fallback`] carrying the transform's
//! `default` parameter and the reason, which the engine reports in its audit.

pub mod builtins;
pub mod datetime;
mod outcome;
mod registry;

pub use outcome::TransformOutcome;
pub use registry::{TransformFn, TransformRegistry};
