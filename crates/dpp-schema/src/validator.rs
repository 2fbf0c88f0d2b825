use dpp_model::ValidationError;
use serde_json::Value;

/// A named schema a document can be checked against.
///
/// The bundled implementation is [`JsonSchemaValidator`]; the trait is the
/// seam for registering hand-written validators (cross-field checks JSON
/// Schema cannot express).
pub trait SchemaValidator: Send + Sync {
    fn name(&self) -> &str;

    /// `Ok` when the document conforms; otherwise a
    /// [`ValidationError::Nonconforming`] listing every violation.
    fn validate(&self, document: &Value) -> Result<(), ValidationError>;
}

/// JSON Schema (draft 7) validation.
pub struct JsonSchemaValidator {
    name: String,
    compiled: jsonschema::Validator,
}

impl JsonSchemaValidator {
    /// Compiles `schema`; fails with [`ValidationError::InvalidSchema`] when
    /// the definition itself is unusable.
    pub fn new(name: impl Into<String>, schema: &Value) -> Result<Self, ValidationError> {
        let name = name.into();
        let compiled =
            jsonschema::draft7::new(schema).map_err(|error| ValidationError::InvalidSchema {
                schema: name.clone(),
                detail: error.to_string(),
            })?;
        Ok(Self { name, compiled })
    }

    /// Compiles a schema from JSON text, e.g. an embedded definition.
    pub fn from_json(name: impl Into<String>, text: &str) -> Result<Self, ValidationError> {
        let name = name.into();
        let schema: Value =
            serde_json::from_str(text).map_err(|error| ValidationError::InvalidSchema {
                schema: name.clone(),
                detail: error.to_string(),
            })?;
        Self::new(name, &schema)
    }
}

impl SchemaValidator for JsonSchemaValidator {
    fn name(&self) -> &str {
        &self.name
    }

    fn validate(&self, document: &Value) -> Result<(), ValidationError> {
        let violations: Vec<String> = self
            .compiled
            .iter_errors(document)
            .map(|error| {
                let location = error.instance_path().to_string();
                if location.is_empty() {
                    error.to_string()
                } else {
                    format!("{location}: {error}")
                }
            })
            .collect();
        if violations.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::Nonconforming {
                schema: self.name.clone(),
                violations,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn conforming_document_passes() {
        let validator = JsonSchemaValidator::new(
            "sample",
            &json!({
                "type": "object",
                "required": ["id"],
                "properties": {"id": {"type": "string"}}
            }),
        )
        .unwrap();
        assert!(validator.validate(&json!({"id": "BAT-001"})).is_ok());
    }

    #[test]
    fn violations_carry_instance_paths() {
        let validator = JsonSchemaValidator::new(
            "sample",
            &json!({
                "type": "object",
                "required": ["id"],
                "properties": {
                    "id": {"type": "string"},
                    "mass": {"type": "number"}
                }
            }),
        )
        .unwrap();

        let error = validator
            .validate(&json!({"mass": "heavy"}))
            .unwrap_err();
        match error {
            ValidationError::Nonconforming { schema, violations } => {
                assert_eq!(schema, "sample");
                assert_eq!(violations.len(), 2);
                assert!(violations.iter().any(|violation| violation.contains("/mass")));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn broken_schema_definition_is_rejected() {
        let error = JsonSchemaValidator::new("broken", &json!({"type": 42})).unwrap_err();
        assert!(matches!(error, ValidationError::InvalidSchema { .. }));

        let error = JsonSchemaValidator::from_json("broken", "not json").unwrap_err();
        assert!(matches!(error, ValidationError::InvalidSchema { .. }));
    }
}
