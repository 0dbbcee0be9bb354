//! # Normalizer
//!
//! Merges resolved defaults into the original document. Supplied values are
//! copied as-is, absent schema fields receive their effective default, and
//! keys the schema does not know are carried through unchanged.
//!
//! The result is a superset of the original's keys, and normalizing an
//! already-normalized document changes nothing.

use rips_core::{FieldPath, Mapping, NormalizedDocument, OriginalDocument};
use serde_json::Value;

use crate::model::{SchemaField, ValueType};
use crate::resolver::ResolvedSchema;

/// Produce the normalized document. Never fails: shape problems are left
/// in place for the validator to report.
pub fn normalize(original: &OriginalDocument, resolved: &ResolvedSchema<'_>) -> NormalizedDocument {
    let mut root = original.as_mapping().clone();
    fill_group(&mut root, resolved.schema().fields(), &FieldPath::root(), resolved);
    NormalizedDocument::from_mapping(root)
}

fn fill_group(
    group: &mut Mapping,
    fields: &[SchemaField],
    parent: &FieldPath,
    resolved: &ResolvedSchema<'_>,
) {
    for field in fields {
        let path = parent.child(field.name());

        if !group.contains_key(field.name()) {
            if let Some(default) = resolved.effective_default(&path, field) {
                group.insert(field.name().to_string(), default);
            } else if field.value_type() == ValueType::Dict && field.is_group() {
                group.insert(field.name().to_string(), Value::Object(Mapping::new()));
            }
        }

        if field.is_group() {
            if let Some(Value::Object(child)) = group.get_mut(field.name()) {
                fill_group(child, field.children(), &path, resolved);
            }
        }
    }
}
