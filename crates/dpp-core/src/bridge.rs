//! Orchestration of the extract→map→validate→export chain.

use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, info, warn};

use dpp_export::JsonLdExporter;
use dpp_ingest::ConnectorRegistry;
use dpp_map::{MappingEngine, MappingLoader};
use dpp_model::{
    BridgeError, ConnectorError, DataRecord, Document, ExporterError, MappingConfig, MappingError,
    OutputFormat, Source, SourceOptions,
};
use dpp_schema::SchemaRegistry;

/// One façade over the whole pipeline.
///
/// Owns a connector registry, the mapping loader and engine, the schema
/// registry, and the JSON-LD exporter. Construction wires the stock parts;
/// the `with_*` methods swap in custom ones.
pub struct Bridge {
    connectors: ConnectorRegistry,
    loader: MappingLoader,
    engine: MappingEngine,
    schemas: SchemaRegistry,
    exporter: JsonLdExporter,
}

impl Bridge {
    /// A bridge with the stock parts: built-in connectors and transforms,
    /// bundled passport schemas, and the default JSON-LD context.
    pub fn new() -> Result<Self, BridgeError> {
        Ok(Self {
            connectors: ConnectorRegistry::with_defaults(),
            loader: MappingLoader::new()?,
            engine: MappingEngine::new(),
            schemas: SchemaRegistry::with_bundled_schemas()?,
            exporter: JsonLdExporter::new(),
        })
    }

    /// Replaces the connector registry.
    pub fn with_connectors(mut self, connectors: ConnectorRegistry) -> Self {
        self.connectors = connectors;
        self
    }

    /// Replaces the mapping engine (and with it the transform set).
    pub fn with_engine(mut self, engine: MappingEngine) -> Self {
        self.engine = engine;
        self
    }

    /// Replaces the schema registry.
    pub fn with_schemas(mut self, schemas: SchemaRegistry) -> Self {
        self.schemas = schemas;
        self
    }

    /// Replaces the exporter, changing the default JSON-LD context.
    pub fn with_exporter(mut self, exporter: JsonLdExporter) -> Self {
        self.exporter = exporter;
        self
    }

    /// End-to-end transformation of a source file.
    ///
    /// Loads the mapping configuration from `mapping`, then runs
    /// [`Bridge::transform`] against the file at `source`.
    pub fn transform_file(
        &self,
        source: impl Into<PathBuf>,
        mapping: impl AsRef<Path>,
        output: Option<&Path>,
    ) -> Result<Vec<Document>, BridgeError> {
        let config = self.loader.load(mapping)?;
        self.transform(&Source::Path(source.into()), &config, output)
    }

    /// End-to-end transformation: extract, map, validate, export.
    ///
    /// Validation runs only when the configuration names a target schema,
    /// and it never fails the call: a non-conforming document (or an
    /// unregistered schema name) is logged and the document kept. Callers
    /// that want hard validation run [`SchemaRegistry::validate`] on the
    /// returned documents themselves.
    ///
    /// When `output` is given the documents are written there in the
    /// configuration's target format: a single document exports as one
    /// JSON-LD object, a batch as `@graph`, and `format: json` as plain
    /// JSON without a context.
    pub fn transform(
        &self,
        source: &Source,
        config: &MappingConfig,
        output: Option<&Path>,
    ) -> Result<Vec<Document>, BridgeError> {
        let records = self.extract(source, &config.mapping.source)?;
        let (documents, audit) = self.engine.apply_rules_audited(&config.rules, &records)?;
        for event in &audit.fallbacks {
            warn!(
                record = event.record_index,
                source = %event.source_path,
                target = %event.target,
                reason = %event.reason,
                "transform fell back to its default"
            );
        }
        info!(
            connector = %config.mapping.source.connector,
            records = records.len(),
            fallbacks = audit.fallbacks.len(),
            "mapping complete"
        );
        if let Some(schema) = config.mapping.target.schema.as_deref() {
            self.validate_documents(schema, &documents);
        }
        if let Some(path) = output {
            self.export_documents(
                &documents,
                path,
                config.mapping.target.format,
                config.mapping.target.schema.as_deref(),
            )?;
        }
        Ok(documents)
    }

    /// Extracts records from a source with the connector the options name.
    pub fn extract(
        &self,
        source: &Source,
        options: &SourceOptions,
    ) -> Result<Vec<DataRecord>, ConnectorError> {
        let connector = self.connectors.create(options)?;
        let records = connector.parse(source)?;
        debug!(
            connector = connector.name(),
            records = records.len(),
            "extracted records"
        );
        Ok(records)
    }

    /// Maps already-extracted records with a configuration's rules.
    pub fn map(
        &self,
        records: &[DataRecord],
        config: &MappingConfig,
    ) -> Result<Vec<Document>, MappingError> {
        self.engine.apply(config, records)
    }

    /// Writes documents to `path` in the requested format, using the
    /// bridge's default JSON-LD context.
    pub fn export(
        &self,
        documents: &[Document],
        path: &Path,
        format: OutputFormat,
    ) -> Result<(), ExporterError> {
        self.export_documents(documents, path, format, None)
    }

    /// Loads and shape-checks a mapping configuration file.
    pub fn load_mapping(&self, path: impl AsRef<Path>) -> Result<MappingConfig, MappingError> {
        self.loader.load(path)
    }

    /// Registered connector names, sorted.
    pub fn connectors(&self) -> Vec<String> {
        self.connectors.names()
    }

    /// Registered schema names, sorted.
    pub fn schemas(&self) -> Vec<String> {
        self.schemas.names()
    }

    pub fn connector_registry(&self) -> &ConnectorRegistry {
        &self.connectors
    }

    pub fn schema_registry(&self) -> &SchemaRegistry {
        &self.schemas
    }

    /// Best-effort validation: log and keep non-conforming documents.
    fn validate_documents(&self, schema: &str, documents: &[Document]) {
        for (index, document) in documents.iter().enumerate() {
            let value = Value::Object(document.clone());
            match self.schemas.validate(schema, &value) {
                Ok(()) => {}
                Err(BridgeError::SchemaNotFound(error)) => {
                    warn!(%error, "skipping validation");
                    return;
                }
                Err(error) => {
                    warn!(
                        schema,
                        document = index,
                        %error,
                        "document does not conform; keeping it"
                    );
                }
            }
        }
    }

    /// Writes documents in the target format. A schema with a registered
    /// JSON-LD context overrides the exporter's default context.
    fn export_documents(
        &self,
        documents: &[Document],
        path: &Path,
        format: OutputFormat,
        schema: Option<&str>,
    ) -> Result<(), ExporterError> {
        match format {
            OutputFormat::Json => dpp_export::write_plain(documents, path)?,
            OutputFormat::Jsonld => {
                let schema_exporter = schema
                    .and_then(|name| self.schemas.context(name))
                    .cloned()
                    .map(JsonLdExporter::with_context);
                let exporter = schema_exporter.as_ref().unwrap_or(&self.exporter);
                match documents {
                    [single] => exporter.write(single, path)?,
                    many => exporter.write_list(many, path)?,
                }
            }
        }
        info!(
            path = %path.display(),
            format = format.as_str(),
            documents = documents.len(),
            "wrote output"
        );
        Ok(())
    }
}

/// One-call transformation with a stock [`Bridge`].
pub fn transform(
    source: impl Into<PathBuf>,
    mapping: impl AsRef<Path>,
    output: Option<&Path>,
) -> Result<Vec<Document>, BridgeError> {
    Bridge::new()?.transform_file(source, mapping, output)
}
