//! # rips-cli — Command-Line Checker
//!
//! Provides the `rips` command-line interface around the `rips-schema`
//! engine. This crate owns everything outside the engine: argument parsing,
//! logging setup, file I/O and exit codes.
//!
//! ## Subcommands
//!
//! - `rips check <INPUT>` — resolve, normalize and validate a document; on
//!   success write `<stem>_checked.<ext>` next to it.
//! - `rips resolve <INPUT>` — print what each dependency rule resolves to
//!   for the document's declared extensions.
//!
//! ## Exit Codes
//!
//! | Code | Meaning |
//! |------|---------|
//! | 0 | Document valid (normalized output written for `check`) |
//! | 1 | Validation failed; nothing written |
//! | 2 | Operational error (I/O, YAML, schema configuration) |

pub mod check;
pub mod resolve;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rips_core::OriginalDocument;
use rips_schema::{parse_document, parse_yaml_str, register_default_resolvers, SchemaTree, RESOLVER_BINDINGS};

pub const EXIT_OK: u8 = 0;
pub const EXIT_INVALID: u8 = 1;
pub const EXIT_ERROR: u8 = 2;

/// Load the schema from `path`, or the bundled schema when `None`, with the
/// standard resolver bindings registered.
///
/// Binding errors surface here, before any input document is read.
pub fn load_schema(path: Option<&Path>) -> Result<SchemaTree> {
    let Some(path) = path else {
        tracing::debug!("using bundled schema");
        return SchemaTree::bundled().context("failed to load bundled schema");
    };

    tracing::info!(schema = %path.display(), "loading schema");
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read schema {}", path.display()))?;
    let origin = path.display().to_string();
    let source = parse_yaml_str(&text, &origin)?;
    let tree = SchemaTree::load(&source).with_context(|| format!("invalid schema {origin}"))?;
    register_default_resolvers(tree, RESOLVER_BINDINGS)
        .with_context(|| format!("cannot bind resolvers to schema {origin}"))
}

/// Read and parse an input document.
pub fn read_document(path: &Path) -> Result<OriginalDocument> {
    tracing::info!(input = %path.display(), "loading input file");
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read input {}", path.display()))?;
    Ok(parse_document(&text, &path.display().to_string())?)
}

/// Output path for a checked document: `<stem>_checked.<ext>`, placed in
/// `output_dir` when given, otherwise next to the input. Inputs without an
/// extension get `yaml`.
pub fn derive_output_path(input: &Path, output_dir: Option<&Path>) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "input".to_string());
    let ext = input
        .extension()
        .map(|e| e.to_string_lossy().into_owned())
        .unwrap_or_else(|| "yaml".to_string());
    let file_name = format!("{stem}_checked.{ext}");

    match output_dir {
        Some(dir) => dir.join(file_name),
        None => input.with_file_name(file_name),
    }
}
