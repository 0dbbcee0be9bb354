//! # Run Orchestrator
//!
//! One synchronous pass: extract capabilities, resolve defaults, normalize,
//! validate, and list unknown fields. The schema and both documents are only
//! borrowed by each stage.

use rips_core::{CapabilitySet, NormalizedDocument, OriginalDocument};

use crate::model::SchemaTree;
use crate::normalize::normalize;
use crate::report::{report, ErrorReport};
use crate::resolver::resolve;
use crate::validate::{unknown_fields, validate, ValidationError};

/// Result of checking one document.
#[derive(Debug, Clone)]
pub struct CheckOutcome {
    pub capabilities: CapabilitySet,
    pub normalized: NormalizedDocument,
    /// Fatal findings. The run fails iff this is non-empty.
    pub errors: Vec<ValidationError>,
    /// Non-fatal `UnknownFieldIgnored` notices.
    pub notices: Vec<ValidationError>,
}

impl CheckOutcome {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Summary of errors and notices together.
    pub fn report(&self) -> ErrorReport {
        let all: Vec<ValidationError> = self
            .errors
            .iter()
            .chain(self.notices.iter())
            .cloned()
            .collect();
        report(&all)
    }
}

/// Check `original` against `schema` (which should already carry its
/// resolver bindings).
pub fn check(schema: &SchemaTree, original: &OriginalDocument) -> CheckOutcome {
    let capabilities = original.capabilities();
    tracing::debug!(capabilities = %capabilities, "extracted capability set");

    let resolved = resolve(schema, &capabilities, original);
    let normalized = normalize(original, &resolved);
    let errors = validate(&normalized, &resolved);
    let notices = unknown_fields(&normalized, schema);

    tracing::debug!(
        errors = errors.len(),
        notices = notices.len(),
        "validation complete"
    );

    CheckOutcome {
        capabilities,
        normalized,
        errors,
        notices,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn check_runs_all_stages() {
        let schema = SchemaTree::bundled().unwrap();
        let original = OriginalDocument::new(json!({
            "ISA": ["I", "M", "U"],
            "custom": 1,
            "mstatus": {"TVM": {"readonly": false}}
        }))
        .unwrap();

        let outcome = check(&schema, &original);
        assert!(outcome.capabilities.has_user());
        assert!(!outcome.is_valid());
        assert_eq!(outcome.errors.len(), 1);
        assert_eq!(outcome.errors[0].path.to_string(), "mstatus.TVM");
        assert_eq!(outcome.notices.len(), 1);

        let report = outcome.report();
        assert_eq!(report.fatal, 1);
        assert_eq!(report.notices, 1);
    }

    #[test]
    fn original_is_left_untouched() {
        let schema = SchemaTree::bundled().unwrap();
        let original = OriginalDocument::new(json!({"ISA": ["I"]})).unwrap();
        let before = original.clone();
        let outcome = check(&schema, &original);
        assert_eq!(original, before);
        assert!(outcome.normalized.as_mapping().len() > original.as_mapping().len());
    }

    #[test]
    fn absent_static_readonly_descriptor_fills_in_valid() {
        let schema = SchemaTree::load(&json!({
            "mstatus": {
                "type": "dict",
                "schema": {
                    "FS": {
                        "type": "dict",
                        "readonly": true,
                        "hardwired": 0,
                        "schema": {
                            "readonly": {"type": "boolean"},
                            "hardwired": {"type": "integer"}
                        }
                    }
                }
            }
        }))
        .unwrap();
        let original = OriginalDocument::new(json!({})).unwrap();

        let outcome = check(&schema, &original);
        assert!(outcome.is_valid(), "{:?}", outcome.errors);
        assert_eq!(
            outcome.normalized.as_mapping()["mstatus"]["FS"],
            json!({"readonly": true, "hardwired": 0})
        );

        let again = OriginalDocument::new(outcome.normalized.clone().into_value()).unwrap();
        let second = check(&schema, &again);
        assert!(second.is_valid());
        assert_eq!(second.normalized, outcome.normalized);
    }
}
