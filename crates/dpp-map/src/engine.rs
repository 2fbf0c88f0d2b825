//! Rule application: flat records in, nested documents out.
//!
//! Rules run in declaration order against each record. A missing required
//! source aborts the whole batch; optional rules fall back to their default.
//! Non-null values pass through the rule's transform before the typed-path
//! write into the document. Soft transform failures land in the audit.

use crate::document::set_path;
use dpp_model::{DataRecord, Document, MappingConfig, MappingError, MappingRule, TransformSpec};
use dpp_transform::{TransformFn, TransformOutcome, TransformRegistry};
use serde_json::Value;
use tracing::debug;

pub struct MappingEngine {
    transforms: TransformRegistry,
}

/// One rule with its transform resolved. Resolution happens once per batch,
/// so an unknown transform name fails before any record is touched.
struct CompiledRule<'a> {
    rule: &'a MappingRule,
    transform: Option<(&'a TransformSpec, &'a TransformFn)>,
}

/// Soft failures recorded while mapping a batch.
#[derive(Debug, Default, Clone)]
pub struct MappingAudit {
    pub fallbacks: Vec<FallbackEvent>,
}

impl MappingAudit {
    pub fn is_clean(&self) -> bool {
        self.fallbacks.is_empty()
    }
}

/// A transform that could not handle its input and substituted a default.
#[derive(Debug, Clone)]
pub struct FallbackEvent {
    pub record_index: usize,
    pub source_path: String,
    pub target: String,
    pub reason: String,
}

impl MappingEngine {
    pub fn new() -> Self {
        Self {
            transforms: TransformRegistry::with_builtins(),
        }
    }

    /// Engine over a caller-assembled transform set.
    pub fn with_transforms(transforms: TransformRegistry) -> Self {
        Self { transforms }
    }

    /// The transform registry, for registering custom transforms.
    pub fn transforms_mut(&mut self) -> &mut TransformRegistry {
        &mut self.transforms
    }

    /// Applies a configuration's rules to a batch of records.
    pub fn apply(
        &self,
        config: &MappingConfig,
        records: &[DataRecord],
    ) -> Result<Vec<Document>, MappingError> {
        self.apply_rules(&config.rules, records)
    }

    /// Applies rules to a batch, one document per record, in input order.
    pub fn apply_rules(
        &self,
        rules: &[MappingRule],
        records: &[DataRecord],
    ) -> Result<Vec<Document>, MappingError> {
        self.apply_rules_audited(rules, records)
            .map(|(documents, _)| documents)
    }

    /// Like [`MappingEngine::apply_rules`], also returning the audit of
    /// transform fallbacks.
    pub fn apply_rules_audited(
        &self,
        rules: &[MappingRule],
        records: &[DataRecord],
    ) -> Result<(Vec<Document>, MappingAudit), MappingError> {
        let compiled = self.compile(rules)?;
        let mut audit = MappingAudit::default();
        let mut documents = Vec::with_capacity(records.len());
        for (index, record) in records.iter().enumerate() {
            documents.push(map_record(&compiled, record, index, &mut audit)?);
        }
        debug!(
            records = records.len(),
            fallbacks = audit.fallbacks.len(),
            "mapped batch"
        );
        Ok((documents, audit))
    }

    fn compile<'a>(&'a self, rules: &'a [MappingRule]) -> Result<Vec<CompiledRule<'a>>, MappingError> {
        rules
            .iter()
            .map(|rule| {
                let transform = match &rule.transform {
                    Some(spec) => {
                        let function = self.transforms.get(&spec.kind).ok_or_else(|| {
                            MappingError::UnknownTransform {
                                name: spec.kind.clone(),
                                available: self.transforms.names(),
                            }
                        })?;
                        Some((spec, function))
                    }
                    None => None,
                };
                Ok(CompiledRule { rule, transform })
            })
            .collect()
    }
}

impl Default for MappingEngine {
    fn default() -> Self {
        Self::new()
    }
}

fn map_record(
    rules: &[CompiledRule<'_>],
    record: &DataRecord,
    index: usize,
    audit: &mut MappingAudit,
) -> Result<Document, MappingError> {
    let mut document = Document::new();
    for compiled in rules {
        let rule = compiled.rule;

        // A key holding null counts as absent, same as no key at all.
        let mut value = match record.get(&rule.source) {
            Some(found) if !found.is_null() => found.clone(),
            _ => {
                if rule.required {
                    return Err(MappingError::required(&rule.source));
                }
                rule.default.clone().unwrap_or(Value::Null)
            }
        };

        if !value.is_null()
            && let Some((spec, function)) = compiled.transform
        {
            let outcome = function(&value, spec);
            if let TransformOutcome::Fallback { reason, .. } = &outcome {
                debug!(
                    record = index,
                    source = %rule.source,
                    target = %rule.target,
                    reason = %reason,
                    "transform fell back"
                );
                audit.fallbacks.push(FallbackEvent {
                    record_index: index,
                    source_path: rule.source.clone(),
                    target: rule.target.to_string(),
                    reason: reason.clone(),
                });
            }
            value = outcome.into_value();
        }

        // Nothing resolved and nothing defaulted: the target key stays out.
        if !value.is_null() {
            set_path(&mut document, &rule.target, value);
        }
    }
    Ok(document)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rule(source: &str, target: &str) -> MappingRule {
        MappingRule::new(source, target.parse().unwrap())
    }

    fn record(entries: &[(&str, Value)]) -> DataRecord {
        entries
            .iter()
            .map(|(path, value)| (path.to_string(), value.clone()))
            .collect()
    }

    fn as_value(document: &Document) -> Value {
        Value::Object(document.clone())
    }

    #[test]
    fn maps_records_in_order() {
        let engine = MappingEngine::new();
        let rules = vec![
            rule("MaterialLot/ID", "identifier.id"),
            rule("MaterialLot/Status", "status"),
        ];
        let records = vec![
            record(&[
                ("MaterialLot/ID", json!("BAT-001")),
                ("MaterialLot/Status", json!("Released")),
            ]),
            record(&[("MaterialLot/ID", json!("BAT-002"))]),
        ];

        let documents = engine.apply_rules(&rules, &records).unwrap();
        assert_eq!(documents.len(), 2);
        assert_eq!(
            as_value(&documents[0]),
            json!({"identifier": {"id": "BAT-001"}, "status": "Released"})
        );
        // No status in the second record, no default: key stays out.
        assert_eq!(
            as_value(&documents[1]),
            json!({"identifier": {"id": "BAT-002"}})
        );
    }

    #[test]
    fn sibling_targets_merge_into_one_object() {
        let engine = MappingEngine::new();
        let rules = vec![rule("a", "nested.first"), rule("b", "nested.second")];
        let records = vec![record(&[("a", json!(1)), ("b", json!(2))])];
        let documents = engine.apply_rules(&rules, &records).unwrap();
        assert_eq!(
            as_value(&documents[0]),
            json!({"nested": {"first": 1, "second": 2}})
        );
    }

    #[test]
    fn later_rule_overwrites_same_target() {
        let engine = MappingEngine::new();
        let rules = vec![rule("a", "id"), rule("b", "id")];
        let records = vec![record(&[("a", json!("old")), ("b", json!("new"))])];
        let documents = engine.apply_rules(&rules, &records).unwrap();
        assert_eq!(as_value(&documents[0]), json!({"id": "new"}));
    }

    #[test]
    fn required_missing_aborts_the_batch() {
        let engine = MappingEngine::new();
        let rules = vec![rule("present", "a"), rule("absent", "b").required()];
        let records = vec![record(&[("present", json!(1))])];
        let error = engine.apply_rules(&rules, &records).unwrap_err();
        assert!(
            matches!(error, MappingError::RequiredFieldMissing { ref source_path } if source_path == "absent")
        );
    }

    #[test]
    fn null_value_counts_as_missing_for_required() {
        let engine = MappingEngine::new();
        let rules = vec![rule("cell", "a").required()];
        let records = vec![record(&[("cell", Value::Null)])];
        assert!(engine.apply_rules(&rules, &records).is_err());
    }

    #[test]
    fn default_substitutes_and_feeds_the_transform() {
        let engine = MappingEngine::new();
        let rules = vec![
            rule("absent", "count")
                .with_default(json!("41.9"))
                .with_transform(TransformSpec::new("int")),
        ];
        let documents = engine.apply_rules(&rules, &[DataRecord::new()]).unwrap();
        assert_eq!(as_value(&documents[0]), json!({"count": 41}));
    }

    #[test]
    fn transform_fallback_lands_in_the_audit() {
        let engine = MappingEngine::new();
        let rules = vec![
            rule("grade", "quality.grade").with_transform(
                TransformSpec::new("lookup")
                    .with_param("table", json!({"A": "Grade A"}))
                    .with_param("default", json!("unknown")),
            ),
        ];
        let records = vec![
            record(&[("grade", json!("A"))]),
            record(&[("grade", json!("Z"))]),
        ];

        let (documents, audit) = engine.apply_rules_audited(&rules, &records).unwrap();
        assert_eq!(as_value(&documents[1]), json!({"quality": {"grade": "unknown"}}));
        assert_eq!(audit.fallbacks.len(), 1);
        let event = &audit.fallbacks[0];
        assert_eq!(event.record_index, 1);
        assert_eq!(event.source_path, "grade");
        assert_eq!(event.target, "quality.grade");
        assert!(event.reason.contains("\"Z\""));
    }

    #[test]
    fn null_transform_result_is_not_written() {
        let engine = MappingEngine::new();
        // int of "abc" with no default produces null, which drops the key.
        let rules = vec![rule("raw", "n").with_transform(TransformSpec::new("int"))];
        let records = vec![record(&[("raw", json!("abc"))])];
        let (documents, audit) = engine.apply_rules_audited(&rules, &records).unwrap();
        assert_eq!(as_value(&documents[0]), json!({}));
        assert_eq!(audit.fallbacks.len(), 1);
    }

    #[test]
    fn unknown_transform_fails_before_any_record() {
        let engine = MappingEngine::new();
        let rules = vec![rule("a", "b").with_transform(TransformSpec::new("uppercase"))];
        let error = engine.apply_rules(&rules, &[]).unwrap_err();
        match error {
            MappingError::UnknownTransform { name, available } => {
                assert_eq!(name, "uppercase");
                assert!(available.contains(&"str".to_string()));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn array_targets_build_element_objects() {
        let engine = MappingEngine::new();
        let rules = vec![
            rule("mat1", "materials[0].name"),
            rule("mat2", "materials[1].name"),
        ];
        let records = vec![record(&[("mat1", json!("lithium")), ("mat2", json!("cobalt"))])];
        let documents = engine.apply_rules(&rules, &records).unwrap();
        assert_eq!(
            as_value(&documents[0]),
            json!({"materials": [{"name": "lithium"}, {"name": "cobalt"}]})
        );
    }

    #[test]
    fn mapping_is_deterministic() {
        let engine = MappingEngine::new();
        let rules = vec![rule("a", "x.y"), rule("b", "x.z")];
        let records = vec![record(&[("a", json!(1)), ("b", json!(2))])];
        let first = engine.apply_rules(&rules, &records).unwrap();
        let second = engine.apply_rules(&rules, &records).unwrap();
        assert_eq!(first, second);
    }
}
