//! Mapping configuration: declarative source→target correspondences.
//!
//! A mapping file names a connector, an optional target schema/format, and an
//! ordered list of rules. Rules run in declaration order; later rules
//! targeting the same path overwrite earlier ones.

use crate::path::TargetPath;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Nested output document assembled by the mapping engine, one per source
/// record. Owned exclusively by the caller once returned.
pub type Document = serde_json::Map<String, Value>;

/// Top-level shape of a mapping configuration file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MappingConfig {
    pub mapping: MappingMeta,
    pub rules: Vec<MappingRule>,
}

/// The `mapping:` block — where records come from and where documents go.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MappingMeta {
    pub source: SourceOptions,
    #[serde(default)]
    pub target: TargetOptions,
}

/// Connector selection plus the per-source options a connector understands.
/// Each connector reads only the options that apply to it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceOptions {
    /// Registered connector name (`isa95`, `csv`, `excel`).
    pub connector: String,
    /// Repeating root element for the ISA-95 connector.
    #[serde(default)]
    pub root: Option<String>,
    /// Explicit CSV delimiter; disables sniffing.
    #[serde(default)]
    pub delimiter: Option<char>,
    /// Excel sheet name; the first sheet when absent.
    #[serde(default)]
    pub sheet: Option<String>,
    /// 1-based Excel header row; defaults to the first row.
    #[serde(default)]
    pub header_row: Option<usize>,
    /// Rows to skip: before the header for CSV, after it for Excel.
    #[serde(default)]
    pub skip_rows: Option<usize>,
}

impl SourceOptions {
    pub fn new(connector: impl Into<String>) -> Self {
        Self {
            connector: connector.into(),
            root: None,
            delimiter: None,
            sheet: None,
            header_row: None,
            skip_rows: None,
        }
    }

    pub fn with_root(mut self, root: impl Into<String>) -> Self {
        self.root = Some(root.into());
        self
    }

    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = Some(delimiter);
        self
    }

    pub fn with_sheet(mut self, sheet: impl Into<String>) -> Self {
        self.sheet = Some(sheet.into());
        self
    }

    pub fn with_header_row(mut self, row: usize) -> Self {
        self.header_row = Some(row);
        self
    }

    pub fn with_skip_rows(mut self, count: usize) -> Self {
        self.skip_rows = Some(count);
        self
    }
}

/// The `mapping.target:` block.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TargetOptions {
    /// Schema name to validate documents against, when registered.
    #[serde(default)]
    pub schema: Option<String>,
    #[serde(default)]
    pub format: OutputFormat,
}

/// Export format for transformed documents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// JSON-LD with an `@context` block (the default).
    #[default]
    Jsonld,
    /// Plain JSON, no linked-data context.
    Json,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Jsonld => "jsonld",
            OutputFormat::Json => "json",
        }
    }
}

/// One declarative correspondence between a source path and a target location.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MappingRule {
    /// Flat path into the [`crate::DataRecord`], e.g. `MaterialLot/ID`.
    pub source: String,
    /// Typed location in the output document, e.g. `identifier.id`.
    pub target: TargetPath,
    /// When true, an absent source path aborts the record with a
    /// `MappingError` instead of falling back to `default`.
    #[serde(default)]
    pub required: bool,
    /// Substituted when the source path is absent and the rule is optional.
    /// A null (or omitted) default drops the target key entirely.
    #[serde(default)]
    pub default: Option<Value>,
    /// Value transform applied after resolution, before the target write.
    #[serde(default)]
    pub transform: Option<TransformSpec>,
}

impl MappingRule {
    pub fn new(source: impl Into<String>, target: TargetPath) -> Self {
        Self {
            source: source.into(),
            target,
            required: false,
            default: None,
            transform: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }

    pub fn with_transform(mut self, transform: TransformSpec) -> Self {
        self.transform = Some(transform);
        self
    }
}

/// A transform invocation: a registry name plus free-form parameters the
/// transform interprets itself. Unknown names survive deserialization and
/// fail when the engine resolves them, listing what is available.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransformSpec {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(flatten)]
    pub params: serde_json::Map<String, Value>,
}

impl TransformSpec {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            params: serde_json::Map::new(),
        }
    }

    pub fn with_param(mut self, key: impl Into<String>, value: Value) -> Self {
        self.params.insert(key.into(), value);
        self
    }

    pub fn param(&self, key: &str) -> Option<&Value> {
        self.params.get(key)
    }

    pub fn param_str(&self, key: &str) -> Option<&str> {
        self.param(key).and_then(Value::as_str)
    }

    pub fn param_usize(&self, key: &str) -> Option<usize> {
        self.param(key).and_then(Value::as_u64).map(|n| n as usize)
    }

    /// The transform-level `default` parameter, substituted on soft failure.
    pub fn default_value(&self) -> Value {
        self.param("default").cloned().unwrap_or(Value::Null)
    }
}
