//! # Error Reporter
//!
//! Pure formatting of validation findings for the boundary logger. Produces
//! a sorted, counted summary that renders as text via `Display` or as JSON
//! via `Serialize`.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::validate::{ErrorKind, ValidationError};

/// Structured summary of a run's findings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorReport {
    /// Findings sorted by path, then kind.
    pub entries: Vec<ValidationError>,
    /// Number of entries that make the document invalid.
    pub fatal: usize,
    /// Number of informational entries.
    pub notices: usize,
    /// Entry count per kind.
    pub by_kind: BTreeMap<ErrorKind, usize>,
}

impl ErrorReport {
    /// True when no fatal entries are present.
    pub fn is_valid(&self) -> bool {
        self.fatal == 0
    }
}

/// Build a report from validation findings and notices.
pub fn report(errors: &[ValidationError]) -> ErrorReport {
    let mut entries = errors.to_vec();
    entries.sort_by(|a, b| a.path.cmp(&b.path).then(a.kind.cmp(&b.kind)));

    let mut by_kind = BTreeMap::new();
    for entry in &entries {
        *by_kind.entry(entry.kind).or_insert(0) += 1;
    }
    let fatal = entries.iter().filter(|e| e.kind.is_fatal()).count();

    ErrorReport {
        notices: entries.len() - fatal,
        fatal,
        by_kind,
        entries,
    }
}

impl fmt::Display for ErrorReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_valid() {
            write!(f, "validation passed")?;
        } else {
            write!(f, "validation failed with {} error(s)", self.fatal)?;
        }
        if self.notices > 0 {
            write!(f, ", {} notice(s)", self.notices)?;
        }
        for entry in &self.entries {
            write!(f, "\n  {entry}")?;
        }
        Ok(())
    }
}
