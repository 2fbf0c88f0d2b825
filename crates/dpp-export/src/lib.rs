//! JSON-LD export of mapped documents.
//!
//! The exporter attaches a linked-data `@context` to each document (or to a
//! `@graph` batch) and writes pretty-printed JSON. Context terms map the
//! common passport fields onto schema.org and the DPP vocabulary; callers
//! can swap in a schema-specific context.

use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use dpp_model::{Document, ExporterError};
use serde_json::{Value, json};
use tracing::debug;

static DEFAULT_CONTEXT: LazyLock<Value> = LazyLock::new(|| {
    json!({
        "@vocab": "https://schema.org/",
        "dpp": "https://dpp.eu/ns#",
        "xsd": "http://www.w3.org/2001/XMLSchema#",

        "identifier": "schema:identifier",
        "manufacturer": {"@id": "schema:manufacturer", "@type": "@id"},
        "productionDate": {"@id": "schema:productionDate", "@type": "xsd:date"},
        "carbonFootprint": {"@id": "dpp:carbonFootprint", "@type": "xsd:float"},
        "recycledContent": {"@id": "dpp:recycledContent", "@type": "xsd:float"},
    })
});

/// The context used when no schema-specific one is configured.
pub fn default_context() -> &'static Value {
    &DEFAULT_CONTEXT
}

pub struct JsonLdExporter {
    context: Value,
}

impl JsonLdExporter {
    pub fn new() -> Self {
        Self {
            context: DEFAULT_CONTEXT.clone(),
        }
    }

    /// Exporter carrying a schema-specific `@context`.
    pub fn with_context(context: Value) -> Self {
        Self { context }
    }

    pub fn context(&self) -> &Value {
        &self.context
    }

    /// One document with the context attached.
    pub fn export(&self, document: &Document) -> Document {
        let mut exported = document.clone();
        exported.insert("@context".to_string(), self.context.clone());
        exported
    }

    /// A batch as one `@graph` document sharing the context.
    pub fn export_list(&self, documents: &[Document]) -> Document {
        let graph: Vec<Value> = documents
            .iter()
            .map(|document| Value::Object(document.clone()))
            .collect();
        let mut exported = Document::new();
        exported.insert("@context".to_string(), self.context.clone());
        exported.insert("@graph".to_string(), Value::Array(graph));
        exported
    }

    /// Writes one document as JSON-LD.
    pub fn write(&self, document: &Document, path: impl AsRef<Path>) -> Result<(), ExporterError> {
        write_pretty(&Value::Object(self.export(document)), path.as_ref())
    }

    /// Writes a batch as one `@graph` JSON-LD document.
    pub fn write_list(
        &self,
        documents: &[Document],
        path: impl AsRef<Path>,
    ) -> Result<(), ExporterError> {
        write_pretty(&Value::Object(self.export_list(documents)), path.as_ref())
    }
}

impl Default for JsonLdExporter {
    fn default() -> Self {
        Self::new()
    }
}

/// Writes documents as plain JSON, no linked-data context: a single object
/// for one document, an array otherwise.
pub fn write_plain(documents: &[Document], path: impl AsRef<Path>) -> Result<(), ExporterError> {
    let value = match documents {
        [single] => Value::Object(single.clone()),
        many => Value::Array(many.iter().map(|doc| Value::Object(doc.clone())).collect()),
    };
    write_pretty(&value, path.as_ref())
}

/// Structural JSON-LD checks: an object shape, a usable `@context`, and a
/// well-formed `@graph` when present.
pub fn check_document(document: &Value) -> Result<(), ExporterError> {
    let Value::Object(map) = document else {
        return Err(invalid("top level must be a JSON object"));
    };
    match map.get("@context") {
        Some(Value::Object(_) | Value::String(_)) => {}
        Some(_) => return Err(invalid("@context must be an object or IRI string")),
        None => return Err(invalid("missing @context")),
    }
    if let Some(graph) = map.get("@graph") {
        let Value::Array(items) = graph else {
            return Err(invalid("@graph must be an array"));
        };
        if let Some(position) = items.iter().position(|item| !item.is_object()) {
            return Err(invalid(format!(
                "@graph[{position}] is not a JSON object"
            )));
        }
    }
    if let Some(id) = map.get("@id")
        && !id.is_string()
    {
        return Err(invalid("@id must be an IRI string"));
    }
    Ok(())
}

fn invalid(detail: impl Into<String>) -> ExporterError {
    ExporterError::InvalidDocument {
        detail: detail.into(),
    }
}

fn write_pretty(value: &Value, path: &Path) -> Result<(), ExporterError> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|error| ExporterError::Serialize { source: error })?;
    fs::write(path, text).map_err(|error| ExporterError::Write {
        path: path.to_path_buf(),
        source: error,
    })?;
    debug!(path = %path.display(), "wrote export");
    Ok(())
}
