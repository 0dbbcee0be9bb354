//! # Documents
//!
//! Two views of the hardware-configuration document exist during a run:
//!
//! - [`OriginalDocument`] — exactly what the user supplied. It has no
//!   mutating API, so resolvers and the validator can rely on it to answer
//!   "was this field explicitly given?".
//! - [`NormalizedDocument`] — the original values plus computed defaults,
//!   produced by the normalizer.
//!
//! Both wrap an insertion-ordered `serde_json` mapping so that output keeps
//! the key order of the input.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::capability::CapabilitySet;
use crate::error::DocumentError;
use crate::path::FieldPath;

/// Ordered string-keyed mapping used for document groups.
pub type Mapping = Map<String, Value>;

/// The document as supplied. Never mutated after load.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct OriginalDocument(Mapping);

impl OriginalDocument {
    /// Wrap a parsed document.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::NotAMapping`] if the root is not a mapping.
    pub fn new(root: Value) -> Result<Self, DocumentError> {
        match root {
            Value::Object(map) => Ok(Self(map)),
            other => Err(DocumentError::NotAMapping {
                found: type_name(&other),
            }),
        }
    }

    /// Wrap an already-built root mapping.
    pub fn from_mapping(map: Mapping) -> Self {
        Self(map)
    }

    /// Look up a field. `None` means the user did not supply it.
    pub fn field(&self, path: &FieldPath) -> Option<&Value> {
        lookup(&self.0, path)
    }

    /// Whether the user explicitly supplied `path`.
    pub fn contains(&self, path: &FieldPath) -> bool {
        self.field(path).is_some()
    }

    /// The capability set declared by this document.
    pub fn capabilities(&self) -> CapabilitySet {
        CapabilitySet::from_document(self)
    }

    /// Read-only access to the root mapping.
    pub fn as_mapping(&self) -> &Mapping {
        &self.0
    }
}

/// The original document with every resolvable default filled in.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct NormalizedDocument(Mapping);

impl NormalizedDocument {
    /// Wrap a root mapping produced by the normalizer.
    pub fn from_mapping(map: Mapping) -> Self {
        Self(map)
    }

    /// Look up a field.
    pub fn field(&self, path: &FieldPath) -> Option<&Value> {
        lookup(&self.0, path)
    }

    pub fn as_mapping(&self) -> &Mapping {
        &self.0
    }

    /// Re-read this document as user input, e.g. to normalize it again.
    pub fn into_original(self) -> OriginalDocument {
        OriginalDocument(self.0)
    }

    /// Consume into a plain JSON value for serialization.
    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

fn lookup<'a>(root: &'a Mapping, path: &FieldPath) -> Option<&'a Value> {
    let (first, rest) = path.segments().split_first()?;
    let mut current = root.get(first)?;
    for segment in rest {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}

/// JSON type name of a value, for diagnostics.
pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_f64() => "float",
        Value::Number(_) => "integer",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "dict",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn path(s: &str) -> FieldPath {
        FieldPath::parse(s).unwrap()
    }

    #[test]
    fn new_rejects_non_mapping_root() {
        assert_eq!(
            OriginalDocument::new(json!(["S", "U"])),
            Err(DocumentError::NotAMapping { found: "list" })
        );
        assert_eq!(
            OriginalDocument::new(json!(null)),
            Err(DocumentError::NotAMapping { found: "null" })
        );
    }

    #[test]
    fn field_walks_nested_groups() {
        let doc = OriginalDocument::new(json!({
            "mstatus": {"UPIE": {"readonly": false}}
        }))
        .unwrap();
        assert_eq!(
            doc.field(&path("mstatus.UPIE.readonly")),
            Some(&json!(false))
        );
        assert!(doc.contains(&path("mstatus.UPIE")));
        assert!(!doc.contains(&path("mstatus.UIE")));
    }

    #[test]
    fn field_through_scalar_is_absent() {
        let doc = OriginalDocument::new(json!({"mstatus": 3})).unwrap();
        assert_eq!(doc.field(&path("mstatus.TW")), None);
        assert_eq!(doc.field(&FieldPath::root()), None);
    }

    #[test]
    fn normalized_round_trips_to_original() {
        let mut map = Mapping::new();
        map.insert("ISA".into(), json!(["S"]));
        let normalized = NormalizedDocument::from_mapping(map.clone());
        assert_eq!(normalized.field(&path("ISA")), Some(&json!(["S"])));
        assert_eq!(normalized.into_original(), OriginalDocument::from_mapping(map));
    }

    #[test]
    fn serializes_transparently() {
        let doc = OriginalDocument::new(json!({"b": 1, "a": 2})).unwrap();
        assert_eq!(serde_json::to_string(&doc).unwrap(), r#"{"b":1,"a":2}"#);
    }
}
