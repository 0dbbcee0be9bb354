//! # rips-core — Foundational Types for the RIPS Checker
//!
//! Domain primitives shared by the schema engine and the CLI. Every other
//! crate in the workspace depends on `rips-core`; it depends on nothing
//! internal.
//!
//! ## Key Design Principles
//!
//! 1. **Explicit capability passing.** The [`CapabilitySet`] is extracted
//!    once from the document's `ISA` list and handed to each resolver as an
//!    argument. There is no ambient or global capability state.
//!
//! 2. **Original vs normalized documents are distinct types.**
//!    [`OriginalDocument`] has no mutating API; presence checks
//!    ("did the user supply this field?") go through
//!    [`OriginalDocument::field`], which returns `Option`.
//!
//! 3. **Validated newtypes.** [`FieldPath`] and [`Capability`] reject
//!    malformed input at construction time.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `rips-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod capability;
pub mod document;
pub mod error;
pub mod path;

// Re-export primary types for ergonomic imports.
pub use capability::{Capability, CapabilitySet, ISA_FIELD};
pub use document::{type_name, Mapping, NormalizedDocument, OriginalDocument};
pub use error::{CapabilityError, ConfigurationError, DocumentError, PathError};
pub use path::FieldPath;
