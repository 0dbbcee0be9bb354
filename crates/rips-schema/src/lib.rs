//! # rips-schema — Default Resolution, Normalization & Validation
//!
//! The engine behind the RIPS checker. Given a hardware-configuration
//! document and a declarative schema, it computes dependency-driven
//! defaults, fills them into a normalized document, and reports every
//! violation of the schema's constraints.
//!
//! ## Pipeline
//!
//! 1. [`model`] — load the [`SchemaTree`] from its YAML source.
//! 2. [`resolver`] — bind dependency rules to schema paths, then evaluate
//!    them once against the capability set and the original document.
//! 3. [`normalize`] — merge resolved defaults into a copy of the document.
//! 4. [`validate`] — check types, ranges, allowed sets and immutability,
//!    collecting every finding.
//! 5. [`report`] — summarize findings for display.
//!
//! [`pipeline::check`] runs all of the above for one document.
//!
//! ## Crate Policy
//!
//! - Depends only on `rips-core` internally.
//! - Resolution and normalization never fail on document content; all
//!   data problems surface from validation as a list.
//! - Resolver bindings are static. A binding to a path absent from the
//!   schema is a load-time `ConfigurationError`.

pub mod model;
pub mod normalize;
pub mod pipeline;
pub mod report;
pub mod resolver;
pub mod validate;
pub mod yaml;

pub use model::{Range, SchemaField, SchemaTree, ValueType};
pub use normalize::normalize;
pub use pipeline::{check, CheckOutcome};
pub use report::{report, ErrorReport};
pub use resolver::{
    register_default_resolvers, resolve, ConstraintOverride, Resolution, ResolvedSchema,
    ResolverBinding, ResolverId, RESOLVER_BINDINGS,
};
pub use validate::{unknown_fields, validate, ErrorKind, ValidationError};
pub use yaml::{parse_document, parse_yaml_str, to_yaml_string, LoadError};
