#![deny(unsafe_code)]

//! Error taxonomy for the whole pipeline.
//!
//! Every stage has its own error enum; [`BridgeError`] is the base the
//! orchestration layer and callers work with. Connector and mapping failures
//! are fatal to the enclosing call. Validation failures are fatal only when
//! validation is invoked directly — the bridge's orchestration path logs and
//! swallows them.

use std::path::PathBuf;

/// Base error: every stage-specific failure converts into one of these.
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    #[error(transparent)]
    Connector(#[from] ConnectorError),

    #[error(transparent)]
    Mapping(#[from] MappingError),

    #[error(transparent)]
    SchemaNotFound(#[from] SchemaNotFoundError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Exporter(#[from] ExporterError),
}

pub type Result<T> = std::result::Result<T, BridgeError>;

/// Source acquisition or decoding failure. Raised before any mapping begins;
/// never retried.
#[derive(Debug, thiserror::Error)]
pub enum ConnectorError {
    #[error("failed to read source {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unknown connector '{name}' (available: {})", .available.join(", "))]
    UnknownConnector { name: String, available: Vec<String> },

    #[error("{connector} connector cannot read {given} input")]
    UnsupportedSource {
        connector: &'static str,
        given: &'static str,
    },

    #[error("source is not valid UTF-8: {detail}")]
    Encoding { detail: String },

    #[error("source is not well-formed XML: {detail}")]
    MalformedXml { detail: String },

    #[error("no '{tag}' elements found in source document")]
    NoRootElements { tag: String },

    #[error("failed to parse CSV: {detail}")]
    Csv { detail: String },

    #[error("failed to open workbook from {origin}: {detail}")]
    Workbook { origin: String, detail: String },

    #[error("sheet '{name}' not found (available: {})", .available.join(", "))]
    MissingSheet { name: String, available: Vec<String> },

    #[error("no header row found in sheet '{sheet}' (row {row})")]
    NoHeaderRow { sheet: String, row: usize },
}

impl ConnectorError {
    pub fn read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Read {
            path: path.into(),
            source,
        }
    }
}

/// Mapping configuration or rule application failure. Aborts the current
/// record and with it the whole batch.
#[derive(Debug, thiserror::Error)]
pub enum MappingError {
    #[error("required field '{source_path}' missing from record")]
    RequiredFieldMissing { source_path: String },

    #[error("unknown transform '{name}' (available: {})", .available.join(", "))]
    UnknownTransform { name: String, available: Vec<String> },

    #[error("failed to read mapping file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("mapping configuration ({origin}) is not valid YAML: {detail}")]
    Yaml { origin: String, detail: String },

    #[error("invalid mapping configuration ({origin}):\n  - {}", .violations.join("\n  - "))]
    InvalidConfig {
        origin: String,
        violations: Vec<String>,
    },

    /// The embedded configuration schema failed to compile. Points at a
    /// packaging defect, not at user input.
    #[error("embedded mapping schema is unusable: {detail}")]
    MetaSchema { detail: String },
}

impl MappingError {
    pub fn read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Read {
            path: path.into(),
            source,
        }
    }

    pub fn required(source_path: impl Into<String>) -> Self {
        Self::RequiredFieldMissing {
            source_path: source_path.into(),
        }
    }
}

/// Lookup of a schema name nobody registered.
#[derive(Debug, thiserror::Error)]
#[error("schema '{name}' not registered (available: {})", .available.join(", "))]
pub struct SchemaNotFoundError {
    pub name: String,
    pub available: Vec<String>,
}

/// Structural non-conformance of a document, or an unusable schema
/// definition at registration time.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("schema '{schema}' is not a valid JSON Schema: {detail}")]
    InvalidSchema { schema: String, detail: String },

    #[error("document does not conform to schema '{schema}':\n  - {}", .violations.join("\n  - "))]
    Nonconforming {
        schema: String,
        violations: Vec<String>,
    },
}

/// Export serialization or write failure.
#[derive(Debug, thiserror::Error)]
pub enum ExporterError {
    #[error("failed to write export to {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize document: {source}")]
    Serialize {
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid linked-data document: {detail}")]
    InvalidDocument { detail: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_names_list_alternatives() {
        let error = ConnectorError::UnknownConnector {
            name: "parquet".to_string(),
            available: vec!["csv".to_string(), "excel".to_string(), "isa95".to_string()],
        };
        assert_eq!(
            error.to_string(),
            "unknown connector 'parquet' (available: csv, excel, isa95)"
        );
    }

    #[test]
    fn aggregated_config_error_lists_every_violation() {
        let error = MappingError::InvalidConfig {
            origin: "mapping.yaml".to_string(),
            violations: vec![
                "mapping.source: 'connector' is a required property".to_string(),
                "rules: expected an array".to_string(),
            ],
        };
        let message = error.to_string();
        assert!(message.contains("'connector' is a required property"));
        assert!(message.contains("rules: expected an array"));
    }

    #[test]
    fn stage_errors_convert_into_the_base() {
        let base: BridgeError = MappingError::required("MaterialLot/ID").into();
        assert!(matches!(base, BridgeError::Mapping(_)));
        assert_eq!(
            base.to_string(),
            "required field 'MaterialLot/ID' missing from record"
        );

        let base: BridgeError = SchemaNotFoundError {
            name: "unknown".to_string(),
            available: vec!["dpp".to_string()],
        }
        .into();
        assert!(matches!(base, BridgeError::SchemaNotFound(_)));
    }
}
