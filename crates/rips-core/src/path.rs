//! # Field Paths
//!
//! A [`FieldPath`] addresses one field in a nested document or schema,
//! written as dot-separated segments (`mstatus.TVM`, `misa.Extensions.readonly`).
//! The root path has no segments and is only used as the starting point
//! for building child paths.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::PathError;

/// Dotted path to a field in a document or schema tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FieldPath(Vec<String>);

impl FieldPath {
    /// The empty root path.
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Parse a dotted path string.
    ///
    /// # Errors
    ///
    /// Returns [`PathError::Empty`] for an empty string and
    /// [`PathError::EmptySegment`] when any segment is empty.
    pub fn parse(s: &str) -> Result<Self, PathError> {
        if s.is_empty() {
            return Err(PathError::Empty);
        }
        let segments: Vec<String> = s.split('.').map(str::to_string).collect();
        if segments.iter().any(String::is_empty) {
            return Err(PathError::EmptySegment(s.to_string()));
        }
        Ok(Self(segments))
    }

    /// Build the path of a direct child of this path.
    pub fn child(&self, name: &str) -> Self {
        let mut segments = self.0.clone();
        segments.push(name.to_string());
        Self(segments)
    }

    /// The individual segments, outermost first.
    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// The last segment, or `None` for the root.
    pub fn leaf(&self) -> Option<&str> {
        self.0.last().map(String::as_str)
    }

    /// True for the empty root path.
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return write!(f, "(root)");
        }
        write!(f, "{}", self.0.join("."))
    }
}

impl std::str::FromStr for FieldPath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for FieldPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for FieldPath {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_splits_on_dots() {
        let path = FieldPath::parse("misa.Extensions.readonly").unwrap();
        assert_eq!(path.segments(), &["misa", "Extensions", "readonly"]);
        assert_eq!(path.leaf(), Some("readonly"));
    }

    #[test]
    fn parse_rejects_empty_and_hollow_segments() {
        assert_eq!(FieldPath::parse(""), Err(PathError::Empty));
        assert!(matches!(
            FieldPath::parse("mstatus..TVM"),
            Err(PathError::EmptySegment(_))
        ));
        assert!(matches!(
            FieldPath::parse("mstatus."),
            Err(PathError::EmptySegment(_))
        ));
    }

    #[test]
    fn child_extends_path() {
        let path = FieldPath::root().child("mstatus").child("TW");
        assert_eq!(path, FieldPath::parse("mstatus.TW").unwrap());
        assert_eq!(path.to_string(), "mstatus.TW");
    }

    #[test]
    fn root_displays_as_marker() {
        assert!(FieldPath::root().is_root());
        assert_eq!(FieldPath::root().to_string(), "(root)");
    }

    #[test]
    fn serializes_as_dotted_string() {
        let path = FieldPath::parse("mideleg.implemented").unwrap();
        let json = serde_json::to_string(&path).unwrap();
        assert_eq!(json, "\"mideleg.implemented\"");
        let back: FieldPath = serde_json::from_str(&json).unwrap();
        assert_eq!(back, path);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Parsing arbitrary text never panics.
        #[test]
        fn parse_never_panics(s in ".{0,40}") {
            let _ = FieldPath::parse(&s);
        }

        /// Any path built from non-empty, dot-free segments displays back to
        /// the same dotted string it parses from.
        #[test]
        fn display_matches_parse(segments in prop::collection::vec("[A-Za-z_][A-Za-z0-9_]{0,8}", 1..5)) {
            let dotted = segments.join(".");
            let path = FieldPath::parse(&dotted).unwrap();
            prop_assert_eq!(path.segments(), &segments[..]);
            prop_assert_eq!(path.to_string(), dotted);
        }
    }
}
