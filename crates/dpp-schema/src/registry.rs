use std::collections::BTreeMap;
use std::sync::Arc;

use crate::embedded;
use crate::validator::{JsonSchemaValidator, SchemaValidator};
use dpp_model::{SchemaNotFoundError, ValidationError};
use serde_json::Value;
use tracing::debug;

/// Name-keyed schema validators with optional JSON-LD contexts.
///
/// Names are case-insensitive; registering an existing name replaces the
/// earlier validator. An alias is just the same validator registered under
/// a second name.
pub struct SchemaRegistry {
    validators: BTreeMap<String, Arc<dyn SchemaValidator>>,
    contexts: BTreeMap<String, Value>,
}

impl SchemaRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self {
            validators: BTreeMap::new(),
            contexts: BTreeMap::new(),
        }
    }

    /// Registry with the bundled passport schemas: `dpp` (alias
    /// `digital_product_passport`) and `battery_passport` (alias
    /// `battery_pass`), each with its JSON-LD context.
    pub fn with_bundled_schemas() -> Result<Self, ValidationError> {
        let mut registry = Self::new();

        let dpp: Arc<dyn SchemaValidator> =
            Arc::new(JsonSchemaValidator::from_json("dpp", embedded::DPP_SCHEMA)?);
        let dpp_context = parse_context("dpp", embedded::DPP_CONTEXT)?;
        registry.register_with_context("dpp", Arc::clone(&dpp), dpp_context.clone());
        registry.register_with_context("digital_product_passport", dpp, dpp_context);

        let battery: Arc<dyn SchemaValidator> = Arc::new(JsonSchemaValidator::from_json(
            "battery_passport",
            embedded::BATTERY_PASSPORT_SCHEMA,
        )?);
        let battery_context =
            parse_context("battery_passport", embedded::BATTERY_PASSPORT_CONTEXT)?;
        registry.register_with_context(
            "battery_passport",
            Arc::clone(&battery),
            battery_context.clone(),
        );
        registry.register_with_context("battery_pass", battery, battery_context);

        Ok(registry)
    }

    /// Registers `validator` under `name`. Later registrations win.
    pub fn register(&mut self, name: &str, validator: Arc<dyn SchemaValidator>) {
        let key = name.to_lowercase();
        debug!(schema = %key, "registered schema");
        self.validators.insert(key, validator);
    }

    /// Registers a validator together with the JSON-LD context exports of
    /// this schema should carry.
    pub fn register_with_context(
        &mut self,
        name: &str,
        validator: Arc<dyn SchemaValidator>,
        context: Value,
    ) {
        self.contexts.insert(name.to_lowercase(), context);
        self.register(name, validator);
    }

    /// Looks up a validator by name, case-insensitively.
    pub fn get(&self, name: &str) -> Result<&Arc<dyn SchemaValidator>, SchemaNotFoundError> {
        self.validators
            .get(&name.to_lowercase())
            .ok_or_else(|| SchemaNotFoundError {
                name: name.to_string(),
                available: if self.validators.is_empty() {
                    vec!["(none)".to_string()]
                } else {
                    self.names()
                },
            })
    }

    /// The JSON-LD context registered for `name`, if any.
    pub fn context(&self, name: &str) -> Option<&Value> {
        self.contexts.get(&name.to_lowercase())
    }

    /// Validates `document` against the named schema.
    pub fn validate(&self, name: &str, document: &Value) -> dpp_model::Result<()> {
        let validator = self.get(name)?;
        validator.validate(document)?;
        Ok(())
    }

    /// Registered schema names, sorted.
    pub fn names(&self) -> Vec<String> {
        self.validators.keys().cloned().collect()
    }
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_context(name: &str, text: &str) -> Result<Value, ValidationError> {
    serde_json::from_str(text).map_err(|error| ValidationError::InvalidSchema {
        schema: name.to_string(),
        detail: format!("bundled context is not valid JSON: {error}"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use dpp_model::BridgeError;
    use serde_json::json;

    #[test]
    fn bundled_schemas_and_aliases_resolve() {
        let registry = SchemaRegistry::with_bundled_schemas().unwrap();
        assert_eq!(
            registry.names(),
            vec![
                "battery_pass",
                "battery_passport",
                "digital_product_passport",
                "dpp"
            ]
        );
        // Aliases resolve to the same validator identity.
        assert_eq!(registry.get("digital_product_passport").unwrap().name(), "dpp");
        assert_eq!(registry.get("BATTERY_PASS").unwrap().name(), "battery_passport");
    }

    #[test]
    fn lookup_is_case_insensitive() {
        let registry = SchemaRegistry::with_bundled_schemas().unwrap();
        assert!(registry.get("DPP").is_ok());
        assert!(registry.get("Battery_Passport").is_ok());
    }

    #[test]
    fn unknown_schema_lists_what_exists() {
        let registry = SchemaRegistry::with_bundled_schemas().unwrap();
        let error = registry.get("textile_passport").unwrap_err();
        assert_eq!(error.name, "textile_passport");
        assert!(error.available.contains(&"dpp".to_string()));

        let empty = SchemaRegistry::new();
        let error = empty.get("dpp").unwrap_err();
        assert_eq!(error.available, vec!["(none)".to_string()]);
    }

    #[test]
    fn later_registration_replaces_earlier() {
        let mut registry = SchemaRegistry::with_bundled_schemas().unwrap();
        let permissive: Arc<dyn SchemaValidator> =
            Arc::new(JsonSchemaValidator::new("dpp", &json!({"type": "object"})).unwrap());
        registry.register("DPP", permissive);

        // The strict metadata enum no longer applies.
        let document = json!({"metadata": {"status": "not-a-real-status"}});
        assert!(registry.validate("dpp", &document).is_ok());
    }

    #[test]
    fn dpp_documents_validate_against_the_bundled_schema() {
        let registry = SchemaRegistry::with_bundled_schemas().unwrap();
        let document = json!({
            "metadata": {"status": "active", "version": "1.0.0"},
            "productIdentifier": {"batchID": "BCH-1", "productStatus": "original"},
            "carbonFootprint": {"productCarbonFootprint": 87.5}
        });
        assert!(registry.validate("dpp", &document).is_ok());

        let broken = json!({"metadata": {"status": "zombie"}});
        let error = registry.validate("dpp", &broken).unwrap_err();
        assert!(matches!(error, BridgeError::Validation(_)));
    }

    #[test]
    fn battery_passport_requires_its_core_sections() {
        let registry = SchemaRegistry::with_bundled_schemas().unwrap();
        let error = registry
            .validate("battery_pass", &json!({"circularity": {}}))
            .unwrap_err();
        let message = error.to_string();
        assert!(message.contains("generalProductInformation"));
        assert!(message.contains("materialComposition"));
    }

    #[test]
    fn contexts_ride_along_with_registration() {
        let registry = SchemaRegistry::with_bundled_schemas().unwrap();
        let context = registry.context("dpp").unwrap();
        assert_eq!(context["@vocab"], json!("https://schema.org/"));
        assert!(registry.context("battery_pass").is_some());
        assert!(registry.context("unregistered").is_none());
    }
}
