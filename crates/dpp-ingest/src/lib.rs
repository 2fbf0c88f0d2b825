//! Source connectors: parse external formats into flat [`DataRecord`]s.
//!
//! A connector turns one source (file, inline text, raw bytes) into a batch
//! of path-keyed records. Three formats are built in:
//!
//! - [`Isa95Connector`] — ISA-95/B2MML XML, one record per repeating element
//! - [`CsvConnector`] — delimited text, one record per row
//! - [`ExcelConnector`] — `.xlsx` workbooks, one record per row
//!
//! Connectors are created through the [`ConnectorRegistry`], keyed by the
//! name a mapping configuration uses (`isa95`, `csv`, `excel`). Custom
//! connectors register a builder under their own name.

pub mod connector;
pub mod csv_source;
pub mod excel;
pub mod isa95;
pub mod registry;

pub use connector::Connector;
pub use csv_source::CsvConnector;
pub use excel::ExcelConnector;
pub use isa95::{B2MML_NAMESPACE, DEFAULT_ROOT_ELEMENT, Isa95Connector};
pub use registry::ConnectorRegistry;
