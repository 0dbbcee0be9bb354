//! # Schema Model
//!
//! In-memory declarative tree describing every recognized field of a
//! hardware-configuration document: its type, static default, range,
//! allowed-value set, static immutability, and (after registration) the
//! default resolver bound to it.
//!
//! ## Source Format
//!
//! A schema source is a mapping of field name to rule mapping:
//!
//! ```yaml
//! misa:
//!   type: dict
//!   schema:
//!     Extensions:
//!       type: dict
//!       schema:
//!         readonly: { type: boolean }
//! ```
//!
//! Recognized rule keys are `type`, `default`, `min`, `max`, `allowed`,
//! `readonly`, `hardwired` and `schema`. Anything else is rejected at load
//! time. Resolvers cannot be expressed in the source; they are attached
//! afterwards from the static binding table in [`crate::resolver`].

use std::fmt;

use rips_core::{ConfigurationError, FieldPath, Mapping};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::resolver::{register_default_resolvers, ResolverId, RESOLVER_BINDINGS};
use crate::yaml::{parse_yaml_str, LoadError};

/// The schema shipped with the checker.
const BUNDLED_SCHEMA: &str = include_str!("../schemas/rips.schema.yaml");

const RULE_KEYS: &[&str] = &[
    "type",
    "default",
    "min",
    "max",
    "allowed",
    "readonly",
    "hardwired",
    "schema",
];

/// Declared type of a field value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    Integer,
    String,
    Boolean,
    Dict,
    List,
}

impl ValueType {
    /// Parse a schema type name.
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "integer" => Some(Self::Integer),
            "string" => Some(Self::String),
            "boolean" => Some(Self::Boolean),
            "dict" => Some(Self::Dict),
            "list" => Some(Self::List),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Integer => "integer",
            Self::String => "string",
            Self::Boolean => "boolean",
            Self::Dict => "dict",
            Self::List => "list",
        }
    }

    /// Whether `value` is of this type. Floats are never integers.
    pub fn matches(self, value: &Value) -> bool {
        match self {
            Self::Integer => as_i128(value).is_some(),
            Self::String => value.is_string(),
            Self::Boolean => value.is_boolean(),
            Self::Dict => value.is_object(),
            Self::List => value.is_array(),
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Inclusive integer bounds. Either side may be open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Range {
    pub min: Option<i128>,
    pub max: Option<i128>,
}

impl Range {
    pub fn contains(&self, n: i128) -> bool {
        self.min.map_or(true, |min| n >= min) && self.max.map_or(true, |max| n <= max)
    }
}

/// One schema entry. Dict fields may carry child entries.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaField {
    name: String,
    value_type: ValueType,
    default: Option<Value>,
    allowed: Option<Vec<Value>>,
    range: Option<Range>,
    readonly: bool,
    hardwired: Option<Value>,
    resolver: Option<ResolverId>,
    children: Vec<SchemaField>,
}

impl SchemaField {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value_type(&self) -> ValueType {
        self.value_type
    }

    /// Static default from the schema source, if any.
    pub fn static_default(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    pub fn allowed(&self) -> Option<&[Value]> {
        self.allowed.as_deref()
    }

    pub fn range(&self) -> Option<Range> {
        self.range
    }

    /// Static immutability declared in the schema source.
    pub fn is_static_readonly(&self) -> bool {
        self.readonly
    }

    pub fn static_hardwired(&self) -> Option<&Value> {
        self.hardwired.as_ref()
    }

    /// Resolver bound to this field by registration.
    pub fn resolver(&self) -> Option<ResolverId> {
        self.resolver
    }

    pub fn children(&self) -> &[SchemaField] {
        &self.children
    }

    /// Whether this field is a group with declared sub-fields.
    pub fn is_group(&self) -> bool {
        !self.children.is_empty()
    }

    pub(crate) fn bind_resolver(&mut self, resolver: ResolverId) {
        self.resolver = Some(resolver);
    }
}

/// The full schema: an ordered list of top-level fields.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaTree {
    fields: Vec<SchemaField>,
}

impl SchemaTree {
    /// Build a schema tree from a parsed schema source.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::InvalidSchema`] for a non-mapping root,
    /// a non-mapping rule, an unknown rule key or type name, a malformed
    /// rule value, or `schema` on a non-dict field.
    pub fn load(source: &Value) -> Result<Self, ConfigurationError> {
        let root = source
            .as_object()
            .ok_or_else(|| invalid(&FieldPath::root(), "schema root must be a mapping"))?;
        Ok(Self {
            fields: parse_fields(root, &FieldPath::root())?,
        })
    }

    /// Load the bundled schema and register the standard resolver bindings.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError`] if the bundled source is malformed or a
    /// binding names a path it does not declare.
    pub fn bundled() -> Result<Self, LoadError> {
        let source = parse_yaml_str(BUNDLED_SCHEMA, "bundled schema")?;
        let tree = Self::load(&source)?;
        Ok(register_default_resolvers(tree, RESOLVER_BINDINGS)?)
    }

    pub fn fields(&self) -> &[SchemaField] {
        &self.fields
    }

    /// Look up a field by path.
    pub fn field(&self, path: &FieldPath) -> Option<&SchemaField> {
        let (first, rest) = path.segments().split_first()?;
        let mut current = self.fields.iter().find(|f| &f.name == first)?;
        for segment in rest {
            current = current.children.iter().find(|f| &f.name == segment)?;
        }
        Some(current)
    }

    pub(crate) fn field_mut(&mut self, path: &FieldPath) -> Option<&mut SchemaField> {
        let (first, rest) = path.segments().split_first()?;
        let mut current = self.fields.iter_mut().find(|f| &f.name == first)?;
        for segment in rest {
            current = current.children.iter_mut().find(|f| &f.name == segment)?;
        }
        Some(current)
    }

    /// Every field with its path, depth-first in declaration order.
    pub fn walk(&self) -> Vec<(FieldPath, &SchemaField)> {
        let mut out = Vec::new();
        walk_into(&self.fields, &FieldPath::root(), &mut out);
        out
    }
}

fn walk_into<'a>(
    fields: &'a [SchemaField],
    parent: &FieldPath,
    out: &mut Vec<(FieldPath, &'a SchemaField)>,
) {
    for field in fields {
        let path = parent.child(&field.name);
        out.push((path.clone(), field));
        walk_into(&field.children, &path, out);
    }
}

fn parse_fields(map: &Mapping, parent: &FieldPath) -> Result<Vec<SchemaField>, ConfigurationError> {
    map.iter()
        .map(|(name, rule)| parse_field(name, &parent.child(name), rule))
        .collect()
}

fn parse_field(name: &str, path: &FieldPath, rule: &Value) -> Result<SchemaField, ConfigurationError> {
    let rule = rule
        .as_object()
        .ok_or_else(|| invalid(path, "rule must be a mapping"))?;

    if let Some(key) = rule.keys().find(|k| !RULE_KEYS.contains(&k.as_str())) {
        return Err(invalid(path, format!("unknown rule '{key}'")));
    }

    let type_name = rule
        .get("type")
        .and_then(Value::as_str)
        .ok_or_else(|| invalid(path, "missing 'type'"))?;
    let value_type = ValueType::parse(type_name)
        .ok_or_else(|| invalid(path, format!("unknown type '{type_name}'")))?;

    let min = integer_rule(rule, "min", path)?;
    let max = integer_rule(rule, "max", path)?;
    if let (Some(lo), Some(hi)) = (min, max) {
        if lo > hi {
            return Err(invalid(path, format!("'min' {lo} exceeds 'max' {hi}")));
        }
    }
    let range = (min.is_some() || max.is_some()).then_some(Range { min, max });

    let allowed = match rule.get("allowed") {
        None => None,
        Some(Value::Array(items)) => Some(items.clone()),
        Some(_) => return Err(invalid(path, "'allowed' must be a list")),
    };

    let readonly = match rule.get("readonly") {
        None => false,
        Some(Value::Bool(b)) => *b,
        Some(_) => return Err(invalid(path, "'readonly' must be a boolean")),
    };

    let children = match rule.get("schema") {
        None => Vec::new(),
        Some(Value::Object(map)) if value_type == ValueType::Dict => parse_fields(map, path)?,
        Some(Value::Object(_)) => {
            return Err(invalid(path, "'schema' is only allowed on dict fields"))
        }
        Some(_) => return Err(invalid(path, "'schema' must be a mapping")),
    };

    Ok(SchemaField {
        name: name.to_string(),
        value_type,
        default: rule.get("default").cloned(),
        allowed,
        range,
        readonly,
        hardwired: rule.get("hardwired").cloned(),
        resolver: None,
        children,
    })
}

fn integer_rule(rule: &Mapping, key: &str, path: &FieldPath) -> Result<Option<i128>, ConfigurationError> {
    rule.get(key)
        .map(|v| as_i128(v).ok_or_else(|| invalid(path, format!("'{key}' must be an integer"))))
        .transpose()
}

fn invalid(path: &FieldPath, reason: impl Into<String>) -> ConfigurationError {
    ConfigurationError::InvalidSchema {
        path: if path.is_root() { String::new() } else { path.to_string() },
        reason: reason.into(),
    }
}

/// Integer view of a JSON number, covering both `i64` and `u64` ranges.
pub(crate) fn as_i128(value: &Value) -> Option<i128> {
    value
        .as_i64()
        .map(i128::from)
        .or_else(|| value.as_u64().map(i128::from))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn path(s: &str) -> FieldPath {
        FieldPath::parse(s).unwrap()
    }

    #[test]
    fn load_parses_nested_rules() {
        let tree = SchemaTree::load(&json!({
            "misa": {
                "type": "dict",
                "schema": {
                    "MXL": {"type": "integer", "min": 1, "max": 3, "default": 2},
                    "mode": {"type": "string", "allowed": ["a", "b"]}
                }
            }
        }))
        .unwrap();

        let mxl = tree.field(&path("misa.MXL")).unwrap();
        assert_eq!(mxl.value_type(), ValueType::Integer);
        assert_eq!(mxl.range(), Some(Range { min: Some(1), max: Some(3) }));
        assert_eq!(mxl.static_default(), Some(&json!(2)));
        assert!(tree.field(&path("misa")).unwrap().is_group());
        assert_eq!(
            tree.field(&path("misa.mode")).unwrap().allowed(),
            Some(&[json!("a"), json!("b")][..])
        );
        assert!(tree.field(&path("misa.nope")).is_none());
    }

    #[test]
    fn load_rejects_unknown_rule_key() {
        let err = SchemaTree::load(&json!({"x": {"type": "integer", "regex": "^a$"}})).unwrap_err();
        assert_eq!(
            err,
            ConfigurationError::InvalidSchema {
                path: "x".into(),
                reason: "unknown rule 'regex'".into()
            }
        );
    }

    #[test]
    fn load_rejects_bad_types_and_shapes() {
        for source in [
            json!({"x": {"type": "float"}}),
            json!({"x": {}}),
            json!({"x": 5}),
            json!({"x": {"type": "integer", "min": "zero"}}),
            json!({"x": {"type": "integer", "min": 4, "max": 1}}),
            json!({"x": {"type": "integer", "schema": {}}}),
            json!({"x": {"type": "list", "allowed": "S"}}),
            json!({"x": {"type": "boolean", "readonly": "yes"}}),
            json!(["x"]),
        ] {
            assert!(
                matches!(SchemaTree::load(&source), Err(ConfigurationError::InvalidSchema { .. })),
                "expected InvalidSchema for {source}"
            );
        }
    }

    #[test]
    fn walk_is_depth_first_in_declaration_order() {
        let tree = SchemaTree::load(&json!({
            "b": {"type": "dict", "schema": {"z": {"type": "boolean"}, "a": {"type": "boolean"}}},
            "a": {"type": "string"}
        }))
        .unwrap();
        let paths: Vec<String> = tree.walk().iter().map(|(p, _)| p.to_string()).collect();
        assert_eq!(paths, ["b", "b.z", "b.a", "a"]);
    }

    #[test]
    fn value_type_matches_json_values() {
        assert!(ValueType::Integer.matches(&json!(u64::MAX)));
        assert!(ValueType::Integer.matches(&json!(-4)));
        assert!(!ValueType::Integer.matches(&json!(1.5)));
        assert!(!ValueType::Boolean.matches(&json!(0)));
        assert!(ValueType::List.matches(&json!([])));
        assert!(ValueType::Dict.matches(&json!({})));
    }

    #[test]
    fn range_bounds_are_inclusive() {
        let range = Range { min: Some(0), max: Some(1) };
        assert!(range.contains(0) && range.contains(1));
        assert!(!range.contains(2) && !range.contains(-1));
        assert!(Range { min: None, max: Some(5) }.contains(i128::from(i64::MIN)));
    }

    #[test]
    fn bundled_schema_loads_with_bindings() {
        let tree = SchemaTree::bundled().unwrap();
        assert_eq!(
            tree.field(&path("mstatus.TVM")).unwrap().resolver(),
            Some(ResolverId::SupervisorGated)
        );
        assert_eq!(
            tree.field(&path("misa.Extensions.readonly")).unwrap().resolver(),
            Some(ResolverId::ExtensionsReadonly)
        );
        assert!(tree.field(&path("mstatus.MIE")).unwrap().resolver().is_none());
    }
}
