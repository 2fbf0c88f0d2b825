//! Name-keyed connector construction.
//!
//! Mapping configurations name their connector (`connector: isa95`); the
//! registry turns that name plus the source options into a ready connector.
//! Names are case-insensitive and re-registering a name replaces the earlier
//! builder.

use std::collections::BTreeMap;

use crate::connector::Connector;
use crate::csv_source::CsvConnector;
use crate::excel::ExcelConnector;
use crate::isa95::Isa95Connector;
use dpp_model::{ConnectorError, SourceOptions};

type ConnectorBuilder = Box<dyn Fn(&SourceOptions) -> Box<dyn Connector> + Send + Sync>;

pub struct ConnectorRegistry {
    builders: BTreeMap<String, ConnectorBuilder>,
}

impl ConnectorRegistry {
    /// An empty registry. Most callers want [`ConnectorRegistry::with_defaults`].
    pub fn new() -> Self {
        Self {
            builders: BTreeMap::new(),
        }
    }

    /// Registry with the built-in connectors: `isa95`, `csv`, `excel`.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register("isa95", |options| {
            let connector = match &options.root {
                Some(root) => Isa95Connector::with_root(root),
                None => Isa95Connector::new(),
            };
            Box::new(connector)
        });
        registry.register("csv", |options| {
            let mut connector = CsvConnector::new();
            if let Some(delimiter) = options.delimiter {
                connector = connector.with_delimiter(delimiter);
            }
            if let Some(count) = options.skip_rows {
                connector = connector.with_skip_rows(count);
            }
            Box::new(connector)
        });
        registry.register("excel", |options| {
            let mut connector = ExcelConnector::new();
            if let Some(sheet) = &options.sheet {
                connector = connector.with_sheet(sheet);
            }
            if let Some(row) = options.header_row {
                connector = connector.with_header_row(row);
            }
            if let Some(count) = options.skip_rows {
                connector = connector.with_skip_rows(count);
            }
            Box::new(connector)
        });
        registry
    }

    /// Registers a builder under `name`. Later registrations win.
    pub fn register<F>(&mut self, name: &str, builder: F)
    where
        F: Fn(&SourceOptions) -> Box<dyn Connector> + Send + Sync + 'static,
    {
        self.builders
            .insert(name.to_lowercase(), Box::new(builder));
    }

    /// Builds the connector the options name.
    pub fn create(&self, options: &SourceOptions) -> Result<Box<dyn Connector>, ConnectorError> {
        let key = options.connector.to_lowercase();
        let builder = self
            .builders
            .get(&key)
            .ok_or_else(|| ConnectorError::UnknownConnector {
                name: options.connector.clone(),
                available: self.names(),
            })?;
        Ok(builder(options))
    }

    /// Registered connector names, sorted.
    pub fn names(&self) -> Vec<String> {
        self.builders.keys().cloned().collect()
    }

    /// Name/description pairs for listings, sorted by name.
    pub fn descriptions(&self) -> Vec<(String, String)> {
        self.builders
            .iter()
            .map(|(name, builder)| {
                let connector = builder(&SourceOptions::new(name.as_str()));
                (name.clone(), connector.description().to_string())
            })
            .collect()
    }
}

impl Default for ConnectorRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}
