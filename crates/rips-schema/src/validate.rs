//! # Validator
//!
//! Checks a normalized document against the resolved schema and returns
//! every violation found. No check stops the others: a field with the wrong
//! type is still range-, set- and immutability-checked where those checks
//! apply, and siblings are always visited.
//!
//! Fields the schema does not declare are permitted. They are listed by
//! [`unknown_fields`] as non-fatal `UnknownFieldIgnored` notices and never
//! appear in the output of [`validate`].

use std::fmt;

use rips_core::{type_name, FieldPath, Mapping, NormalizedDocument};
use serde::Serialize;
use serde_json::Value;

use crate::model::{as_i128, SchemaField, SchemaTree, ValueType};
use crate::resolver::{ConstraintOverride, ResolvedSchema};

/// Category of a validation finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum ErrorKind {
    TypeMismatch,
    OutOfRange,
    NotInAllowedSet,
    ImmutabilityViolation,
    /// Informational; never makes a document invalid.
    UnknownFieldIgnored,
}

impl ErrorKind {
    /// Whether findings of this kind make the run a failure.
    pub fn is_fatal(self) -> bool {
        !matches!(self, Self::UnknownFieldIgnored)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::TypeMismatch => "TypeMismatch",
            Self::OutOfRange => "OutOfRange",
            Self::NotInAllowedSet => "NotInAllowedSet",
            Self::ImmutabilityViolation => "ImmutabilityViolation",
            Self::UnknownFieldIgnored => "UnknownFieldIgnored",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single finding with the path of the offending field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationError {
    pub path: FieldPath,
    pub kind: ErrorKind,
    pub message: String,
}

impl ValidationError {
    fn new(path: &FieldPath, kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            path: path.clone(),
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]: {}", self.path, self.kind, self.message)
    }
}

/// Validate every schema-declared field present in `normalized`.
///
/// The document is valid iff the returned list is empty.
pub fn validate(normalized: &NormalizedDocument, resolved: &ResolvedSchema<'_>) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    check_group(
        normalized.as_mapping(),
        resolved.schema().fields(),
        &FieldPath::root(),
        resolved,
        &mut errors,
    );
    errors
}

fn check_group(
    group: &Mapping,
    fields: &[SchemaField],
    parent: &FieldPath,
    resolved: &ResolvedSchema<'_>,
    errors: &mut Vec<ValidationError>,
) {
    for field in fields {
        let Some(value) = group.get(field.name()) else {
            continue;
        };
        let path = parent.child(field.name());

        check_type(value, field, &path, errors);
        check_range(value, field, &path, errors);
        check_allowed(value, field, &path, errors);
        check_immutable(value, field, &path, resolved, errors);

        if field.is_group() {
            if let Value::Object(child) = value {
                check_group(child, field.children(), &path, resolved, errors);
            }
        }
    }
}

fn check_type(value: &Value, field: &SchemaField, path: &FieldPath, errors: &mut Vec<ValidationError>) {
    if !field.value_type().matches(value) {
        errors.push(ValidationError::new(
            path,
            ErrorKind::TypeMismatch,
            format!("must be of {} type, found {}", field.value_type(), type_name(value)),
        ));
    }
}

fn check_range(value: &Value, field: &SchemaField, path: &FieldPath, errors: &mut Vec<ValidationError>) {
    let (Some(range), Some(n)) = (field.range(), as_i128(value)) else {
        return;
    };
    let message = match (range.min, range.max) {
        (Some(min), _) if n < min => format!("value {n} is below the minimum {min}"),
        (_, Some(max)) if n > max => format!("value {n} is above the maximum {max}"),
        _ => return,
    };
    errors.push(ValidationError::new(path, ErrorKind::OutOfRange, message));
}

fn check_allowed(value: &Value, field: &SchemaField, path: &FieldPath, errors: &mut Vec<ValidationError>) {
    let Some(allowed) = field.allowed() else {
        return;
    };
    let is_allowed = |v: &Value| allowed.iter().any(|a| values_equal(a, v));

    match value {
        Value::Array(items) => {
            let rejected: Vec<String> = items
                .iter()
                .filter(|item| !is_allowed(item))
                .map(Value::to_string)
                .collect();
            if !rejected.is_empty() {
                errors.push(ValidationError::new(
                    path,
                    ErrorKind::NotInAllowedSet,
                    format!("unallowed values [{}]", rejected.join(", ")),
                ));
            }
        }
        other if !is_allowed(other) => {
            errors.push(ValidationError::new(
                path,
                ErrorKind::NotInAllowedSet,
                format!("unallowed value {other}"),
            ));
        }
        _ => {}
    }
}

fn check_immutable(
    value: &Value,
    field: &SchemaField,
    path: &FieldPath,
    resolved: &ResolvedSchema<'_>,
    errors: &mut Vec<ValidationError>,
) {
    let Some(constraint) = resolved.effective_constraint(path, field) else {
        return;
    };
    if !constraint.readonly || conforms(value, field, &constraint) {
        return;
    }
    let message = match &constraint.hardwired {
        Some(h) => format!("field is read-only and hardwired to {h}, found {value}"),
        None => format!("field is read-only, found {value}"),
    };
    errors.push(ValidationError::new(path, ErrorKind::ImmutabilityViolation, message));
}

/// Whether `value` honors a read-only constraint. Bit descriptors must
/// declare themselves read-only and carry the hardwired value; scalars must
/// equal it.
fn conforms(value: &Value, field: &SchemaField, constraint: &ConstraintOverride) -> bool {
    match value {
        Value::Object(descriptor) if field.value_type() == ValueType::Dict => {
            let declared_readonly = descriptor.get("readonly") == Some(&Value::Bool(true));
            let hardwired_matches = constraint.hardwired.as_ref().map_or(true, |expected| {
                descriptor
                    .get("hardwired")
                    .is_some_and(|actual| values_equal(actual, expected))
            });
            declared_readonly && hardwired_matches
        }
        _ => match constraint.hardwired.as_ref().or(field.static_default()) {
            Some(expected) => values_equal(value, expected),
            None => true,
        },
    }
}

/// Equality that ignores signed/unsigned integer representation.
fn values_equal(a: &Value, b: &Value) -> bool {
    match (as_i128(a), as_i128(b)) {
        (Some(x), Some(y)) => x == y,
        _ => a == b,
    }
}

/// List keys that the schema does not declare, as non-fatal notices.
///
/// Only groups with declared children are inspected; unknown subtrees are
/// reported once at their top and not descended into.
pub fn unknown_fields(normalized: &NormalizedDocument, schema: &SchemaTree) -> Vec<ValidationError> {
    let mut notices = Vec::new();
    collect_unknown(normalized.as_mapping(), schema.fields(), &FieldPath::root(), &mut notices);
    notices
}

fn collect_unknown(
    group: &Mapping,
    fields: &[SchemaField],
    parent: &FieldPath,
    notices: &mut Vec<ValidationError>,
) {
    for (key, value) in group {
        let path = parent.child(key);
        match fields.iter().find(|f| f.name() == key) {
            None => notices.push(ValidationError::new(
                &path,
                ErrorKind::UnknownFieldIgnored,
                "field is not in the schema and was passed through",
            )),
            Some(field) if field.is_group() => {
                if let Value::Object(child) = value {
                    collect_unknown(child, field.children(), &path, notices);
                }
            }
            Some(_) => {}
        }
    }
}
