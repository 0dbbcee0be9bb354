//! # YAML Boundary
//!
//! Schema sources and hardware-configuration documents are written in YAML,
//! while the engine works on `serde_json` value trees. This module parses
//! YAML text, converts it into the JSON value model, and renders a
//! normalized document back to YAML.

use rips_core::{ConfigurationError, DocumentError, NormalizedDocument, OriginalDocument};
use serde_json::Value;
use thiserror::Error;

/// Error loading a schema or document from YAML text.
#[derive(Error, Debug)]
pub enum LoadError {
    /// The text is not valid YAML.
    #[error("invalid YAML in {origin}: {source}")]
    Yaml {
        /// What was being parsed (file path or "bundled schema").
        origin: String,
        #[source]
        source: serde_yaml::Error,
    },

    /// The YAML uses constructs with no JSON equivalent.
    #[error("YAML-to-JSON conversion failed for {origin}: {reason}")]
    Conversion {
        /// What was being parsed.
        origin: String,
        /// Reason the conversion failed.
        reason: String,
    },

    /// The schema is malformed or a resolver binding is invalid.
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    /// The document root is unusable.
    #[error(transparent)]
    Document(#[from] DocumentError),
}

/// Parse YAML text into a JSON value tree. `origin` names the source in errors.
///
/// # Errors
///
/// Returns [`LoadError::Yaml`] for malformed YAML and
/// [`LoadError::Conversion`] for values JSON cannot represent.
pub fn parse_yaml_str(text: &str, origin: &str) -> Result<Value, LoadError> {
    let yaml: serde_yaml::Value = serde_yaml::from_str(text).map_err(|source| LoadError::Yaml {
        origin: origin.to_string(),
        source,
    })?;
    yaml_to_json_value(&yaml).map_err(|reason| LoadError::Conversion {
        origin: origin.to_string(),
        reason,
    })
}

/// Parse an input document from YAML text.
///
/// # Errors
///
/// As [`parse_yaml_str`], plus [`LoadError::Document`] when the root is not
/// a mapping.
pub fn parse_document(text: &str, origin: &str) -> Result<OriginalDocument, LoadError> {
    let value = parse_yaml_str(text, origin)?;
    Ok(OriginalDocument::new(value)?)
}

/// Render a normalized document as YAML, keeping key order.
///
/// # Errors
///
/// Returns the underlying `serde_yaml` error if serialization fails.
pub fn to_yaml_string(doc: &NormalizedDocument) -> Result<String, serde_yaml::Error> {
    serde_yaml::to_string(doc)
}

/// Convert a `serde_yaml::Value` to a `serde_json::Value`.
///
/// Tags are dropped and their inner value converted. Scalar mapping keys
/// (numbers, booleans) are stringified; anything else as a key is rejected.
fn yaml_to_json_value(yaml: &serde_yaml::Value) -> Result<Value, String> {
    match yaml {
        serde_yaml::Value::Null => Ok(Value::Null),
        serde_yaml::Value::Bool(b) => Ok(Value::Bool(*b)),
        serde_yaml::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(Value::from(i))
            } else if let Some(u) = n.as_u64() {
                Ok(Value::from(u))
            } else if let Some(f) = n.as_f64() {
                serde_json::Number::from_f64(f)
                    .map(Value::Number)
                    .ok_or_else(|| format!("cannot represent float {f} in JSON"))
            } else {
                Err(format!("unsupported YAML number: {n:?}"))
            }
        }
        serde_yaml::Value::String(s) => Ok(Value::String(s.clone())),
        serde_yaml::Value::Sequence(seq) => seq
            .iter()
            .map(yaml_to_json_value)
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        serde_yaml::Value::Mapping(map) => {
            let mut json_map = serde_json::Map::new();
            for (k, v) in map {
                let key = match k {
                    serde_yaml::Value::String(s) => s.clone(),
                    serde_yaml::Value::Number(n) => n.to_string(),
                    serde_yaml::Value::Bool(b) => b.to_string(),
                    other => return Err(format!("unsupported YAML map key: {other:?}")),
                };
                json_map.insert(key, yaml_to_json_value(v)?);
            }
            Ok(Value::Object(json_map))
        }
        serde_yaml::Value::Tagged(tagged) => yaml_to_json_value(&tagged.value),
    }
}
