//! # Capabilities
//!
//! An ISA implementation declares its optional architectural features as a
//! list of single-letter extension identifiers under the top-level `ISA`
//! key. The [`CapabilitySet`] is extracted once per run and passed
//! explicitly to every default resolver; nothing reads it implicitly.

use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;
use serde_json::Value;

use crate::document::OriginalDocument;
use crate::error::CapabilityError;
use crate::path::FieldPath;

/// Top-level document key holding the extension list.
pub const ISA_FIELD: &str = "ISA";

/// A single-letter extension identifier, always stored uppercase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Capability(char);

impl Capability {
    /// Supervisor mode.
    pub const SUPERVISOR: Capability = Capability('S');
    /// User mode.
    pub const USER: Capability = Capability('U');
    /// User-level interrupts.
    pub const USER_INTERRUPTS: Capability = Capability('N');

    /// Create a capability from a letter. Lowercase letters are uppercased.
    ///
    /// # Errors
    ///
    /// Returns [`CapabilityError::NotALetter`] for anything that is not an
    /// ASCII letter.
    pub fn new(letter: char) -> Result<Self, CapabilityError> {
        if letter.is_ascii_alphabetic() {
            Ok(Self(letter.to_ascii_uppercase()))
        } else {
            Err(CapabilityError::NotALetter(letter))
        }
    }

    /// The identifying letter.
    pub fn as_char(self) -> char {
        self.0
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The set of extensions declared by a document. Immutable once built.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CapabilitySet(BTreeSet<Capability>);

impl CapabilitySet {
    /// The empty set.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Extract the capability set from the document's `ISA` list.
    ///
    /// Only entries that are single uppercase letters contribute, matching
    /// the allowed set the validator checks `ISA` against. Anything else,
    /// including lowercase letters, is skipped here and left for the validator to report, so
    /// extraction never fails. An absent `ISA` yields the empty set.
    pub fn from_document(doc: &OriginalDocument) -> Self {
        let isa_path = FieldPath::root().child(ISA_FIELD);
        match doc.field(&isa_path) {
            Some(Value::Array(entries)) => entries.iter().filter_map(entry_capability).collect(),
            _ => Self::empty(),
        }
    }

    /// Parse a string of letters, e.g. `"IMSU"`.
    ///
    /// # Errors
    ///
    /// Returns [`CapabilityError::NotALetter`] on the first non-letter.
    pub fn from_letters(letters: &str) -> Result<Self, CapabilityError> {
        letters.chars().map(Capability::new).collect()
    }

    /// Whether the set declares `capability`.
    pub fn contains(&self, capability: Capability) -> bool {
        self.0.contains(&capability)
    }

    /// Whether supervisor mode (`S`) is declared.
    pub fn has_supervisor(&self) -> bool {
        self.contains(Capability::SUPERVISOR)
    }

    /// Whether user mode (`U`) is declared.
    pub fn has_user(&self) -> bool {
        self.contains(Capability::USER)
    }

    /// Whether user-level interrupts (`N`) are declared.
    pub fn has_user_interrupts(&self) -> bool {
        self.contains(Capability::USER_INTERRUPTS)
    }

    /// Iterate in alphabetical order.
    pub fn iter(&self) -> impl Iterator<Item = Capability> + '_ {
        self.0.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

fn entry_capability(entry: &Value) -> Option<Capability> {
    let s = entry.as_str()?;
    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(letter), None) if letter.is_ascii_uppercase() => Capability::new(letter).ok(),
        _ => None,
    }
}

impl FromIterator<Capability> for CapabilitySet {
    fn from_iter<I: IntoIterator<Item = Capability>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl fmt::Display for CapabilitySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return write!(f, "(none)");
        }
        for cap in &self.0 {
            write!(f, "{cap}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: Value) -> OriginalDocument {
        OriginalDocument::new(value).unwrap()
    }

    #[test]
    fn capability_rejects_non_letters() {
        assert_eq!(Capability::new('3'), Err(CapabilityError::NotALetter('3')));
        assert_eq!(Capability::new('s').unwrap(), Capability::SUPERVISOR);
    }

    #[test]
    fn from_document_reads_isa_list() {
        let caps = CapabilitySet::from_document(&doc(json!({"ISA": ["I", "M", "S", "U"]})));
        assert!(caps.has_supervisor());
        assert!(caps.has_user());
        assert!(!caps.has_user_interrupts());
        assert_eq!(caps.to_string(), "IMSU");
    }

    #[test]
    fn from_document_skips_malformed_entries() {
        let caps = CapabilitySet::from_document(&doc(json!({"ISA": ["S", "SU", 7, "", "N"]})));
        assert_eq!(caps, CapabilitySet::from_letters("NS").unwrap());
    }

    #[test]
    fn serializes_as_letter_list() {
        let caps = CapabilitySet::from_letters("US").unwrap();
        assert_eq!(serde_json::to_value(&caps).unwrap(), json!(["S", "U"]));
    }

    #[test]
    fn from_document_ignores_lowercase_letters() {
        let caps = CapabilitySet::from_document(&doc(json!({"ISA": ["s", "u", "I"]})));
        assert!(!caps.has_supervisor());
        assert!(!caps.has_user());
        assert_eq!(caps.to_string(), "I");
    }

    #[test]
    fn missing_or_non_list_isa_is_empty() {
        assert!(CapabilitySet::from_document(&doc(json!({}))).is_empty());
        assert!(CapabilitySet::from_document(&doc(json!({"ISA": "RV64IMSU"}))).is_empty());
    }

    #[test]
    fn from_letters_reports_first_bad_char() {
        assert_eq!(
            CapabilitySet::from_letters("S-U"),
            Err(CapabilityError::NotALetter('-'))
        );
        assert_eq!(CapabilitySet::empty().to_string(), "(none)");
    }
}
