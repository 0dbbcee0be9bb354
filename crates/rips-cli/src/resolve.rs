//! # Resolve Subcommand
//!
//! Shows what every dependency rule resolves to for a document's declared
//! extensions, without normalizing or validating. Useful when a field's
//! computed default is not what a configuration author expected.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use rips_core::OriginalDocument;
use rips_schema::{resolve, Resolution, ResolvedSchema};

use crate::{load_schema, read_document, EXIT_OK};

/// Arguments for `rips resolve`.
#[derive(Args, Debug)]
pub struct ResolveArgs {
    /// Hardware-configuration YAML whose `ISA` list drives resolution.
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Schema YAML to use instead of the bundled schema.
    #[arg(long)]
    pub schema: Option<PathBuf>,
}

/// Execute the resolve subcommand.
pub fn run_resolve(args: &ResolveArgs) -> Result<u8> {
    let schema = load_schema(args.schema.as_deref())?;
    let original = read_document(&args.input)?;
    let resolved = resolve(&schema, &original.capabilities(), &original);

    for line in render(&resolved, &original) {
        println!("{line}");
    }
    Ok(EXIT_OK)
}

fn render(resolved: &ResolvedSchema<'_>, original: &OriginalDocument) -> Vec<String> {
    let mut lines = vec![format!("capabilities: {}", resolved.capabilities())];
    for (path, resolution) in resolved.resolutions() {
        let supplied = if original.contains(path) { " (supplied)" } else { "" };
        lines.push(format!("{path}: {}{supplied}", describe(resolution)));
    }
    lines
}

fn describe(resolution: &Resolution) -> String {
    match resolution {
        Resolution::Literal(value) => format!("default {value}"),
        Resolution::Constraint(c) if c.readonly => match &c.hardwired {
            Some(h) => format!("read-only, hardwired {h}"),
            None => "read-only".to_string(),
        },
        Resolution::Constraint(_) => "writable".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rips_schema::SchemaTree;
    use serde_json::json;

    #[test]
    fn render_lists_every_bound_field() {
        let schema = SchemaTree::bundled().unwrap();
        let original = OriginalDocument::new(json!({
            "ISA": ["I", "U"],
            "mstatus": {"UIE": {"readonly": true, "hardwired": 1}}
        }))
        .unwrap();
        let resolved = resolve(&schema, &original.capabilities(), &original);
        let lines = render(&resolved, &original);

        assert_eq!(lines[0], "capabilities: IU");
        assert!(lines.contains(&"mstatus.TVM: read-only, hardwired 0".to_string()));
        assert!(lines.contains(&"mstatus.MPRV: writable".to_string()));
        assert!(lines.contains(&"mideleg.implemented: default false".to_string()));
        assert!(lines.contains(
            &r#"mstatus.UIE: default {"readonly":true,"hardwired":1} (supplied)"#.to_string()
        ));
        assert_eq!(lines.len(), 1 + rips_schema::RESOLVER_BINDINGS.len());
    }

    #[test]
    fn run_resolve_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("core.yaml");
        std::fs::write(&input, "ISA: [S]\n").unwrap();
        let code = run_resolve(&ResolveArgs { input, schema: None }).unwrap();
        assert_eq!(code, EXIT_OK);
    }
}
