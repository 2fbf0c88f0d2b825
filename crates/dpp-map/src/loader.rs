//! Mapping configuration loading and shape checking.
//!
//! Configurations are YAML. Before deserialization the loader validates the
//! raw document against the embedded meta-schema and parses every rule's
//! target path, collecting all violations into one error instead of stopping
//! at the first. `load_raw` skips the shape check for debugging partial
//! configurations.

use std::fs;
use std::path::Path;

use crate::embedded;
use dpp_model::{MappingConfig, MappingError, TargetPath};
use serde_json::Value;
use tracing::debug;

pub struct MappingLoader {
    meta: jsonschema::Validator,
}

impl MappingLoader {
    /// Builds a loader with the embedded meta-schema compiled once.
    pub fn new() -> Result<Self, MappingError> {
        let schema: Value =
            serde_json::from_str(embedded::MAPPING_SCHEMA).map_err(|error| {
                MappingError::MetaSchema {
                    detail: error.to_string(),
                }
            })?;
        let meta = jsonschema::draft7::new(&schema).map_err(|error| MappingError::MetaSchema {
            detail: error.to_string(),
        })?;
        Ok(Self { meta })
    }

    /// Loads and validates a mapping file.
    pub fn load(&self, path: impl AsRef<Path>) -> Result<MappingConfig, MappingError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|error| MappingError::read(path, error))?;
        self.load_str(&text, &origin_label(path))
    }

    /// Loads and validates mapping YAML from memory. `origin` labels errors.
    pub fn load_str(&self, text: &str, origin: &str) -> Result<MappingConfig, MappingError> {
        let yaml: serde_yaml::Value =
            serde_yaml::from_str(text).map_err(|error| MappingError::Yaml {
                origin: origin.to_string(),
                detail: error.to_string(),
            })?;
        let json = serde_json::to_value(&yaml).map_err(|error| MappingError::Yaml {
            origin: origin.to_string(),
            detail: error.to_string(),
        })?;
        self.load_value(json, origin)
    }

    /// Validates an already-parsed configuration document.
    pub fn load_value(&self, config: Value, origin: &str) -> Result<MappingConfig, MappingError> {
        let mut violations: Vec<String> = self
            .meta
            .iter_errors(&config)
            .map(|error| {
                let location = error.instance_path().to_string();
                if location.is_empty() {
                    error.to_string()
                } else {
                    format!("{location}: {error}")
                }
            })
            .collect();

        // Target paths are grammar, not shape; parse them here so one pass
        // reports every bad path alongside the schema violations.
        if let Some(rules) = config.get("rules").and_then(Value::as_array) {
            for (index, rule) in rules.iter().enumerate() {
                if let Some(target) = rule.get("target").and_then(Value::as_str)
                    && let Err(error) = target.parse::<TargetPath>()
                {
                    violations.push(format!("/rules/{index}/target: {error}"));
                }
            }
        }

        if !violations.is_empty() {
            return Err(MappingError::InvalidConfig {
                origin: origin.to_string(),
                violations,
            });
        }

        let config: MappingConfig =
            serde_json::from_value(config).map_err(|error| MappingError::InvalidConfig {
                origin: origin.to_string(),
                violations: vec![error.to_string()],
            })?;
        debug!(
            connector = %config.mapping.source.connector,
            rules = config.rules.len(),
            "loaded mapping configuration"
        );
        Ok(config)
    }

    /// Loads a mapping file without the meta-schema check.
    pub fn load_raw(&self, path: impl AsRef<Path>) -> Result<MappingConfig, MappingError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|error| MappingError::read(path, error))?;
        serde_yaml::from_str(&text).map_err(|error| MappingError::Yaml {
            origin: origin_label(path),
            detail: error.to_string(),
        })
    }
}

fn origin_label(path: &Path) -> String {
    path.file_name().map_or_else(
        || path.display().to_string(),
        |name| name.to_string_lossy().into_owned(),
    )
}
