//! # Error Hierarchy
//!
//! Structured error types for the checker, built with `thiserror`.
//! No `Box<dyn Error>`, no `.unwrap()` outside tests.
//!
//! Data-validity problems in an input document are never errors at this
//! level: they are collected by the validator as `ValidationError` entries.
//! The types here cover the failures that abort a run outright; I/O and
//! YAML failures belong to the crates that perform them.

use thiserror::Error;

/// Load-time configuration errors.
///
/// These are raised while the schema is loaded and resolvers are bound,
/// before any input document is read.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    /// A resolver was bound to a path that the schema does not declare.
    #[error("resolver '{resolver}' bound to unknown schema path '{path}'")]
    UnboundPath {
        /// The dotted path named by the binding.
        path: String,
        /// Name of the resolver being bound.
        resolver: String,
    },

    /// The same path appears twice in the binding table.
    #[error("schema path '{path}' has more than one resolver bound")]
    DuplicateBinding {
        /// The dotted path bound twice.
        path: String,
    },

    /// A binding names a syntactically invalid path.
    #[error("invalid resolver binding path: {0}")]
    InvalidBindingPath(#[from] PathError),

    /// The schema source itself is malformed.
    #[error("invalid schema at '{path}': {reason}")]
    InvalidSchema {
        /// Dotted path of the offending rule (empty for the root).
        path: String,
        /// What is wrong with it.
        reason: String,
    },
}

/// Errors about the overall shape of an input document.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DocumentError {
    /// The document root must be a mapping.
    #[error("document root must be a mapping, found {found}")]
    NotAMapping {
        /// JSON type name of what was found instead.
        found: &'static str,
    },
}

/// Errors parsing a dotted field path.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PathError {
    /// The path string was empty.
    #[error("field path is empty")]
    Empty,

    /// The path contained an empty segment (e.g. `mstatus..TVM`).
    #[error("field path \"{0}\" contains an empty segment")]
    EmptySegment(String),
}

/// Errors constructing a capability identifier.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CapabilityError {
    /// Capability identifiers are single ASCII letters.
    #[error("invalid capability identifier '{0}' (expected a single ASCII letter)")]
    NotALetter(char),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_error_wraps_into_binding_error() {
        let err: ConfigurationError = PathError::Empty.into();
        assert!(matches!(err, ConfigurationError::InvalidBindingPath(PathError::Empty)));
    }

    #[test]
    fn not_a_mapping_names_found_type() {
        let err = DocumentError::NotAMapping { found: "array" };
        assert_eq!(err.to_string(), "document root must be a mapping, found array");
    }
}
