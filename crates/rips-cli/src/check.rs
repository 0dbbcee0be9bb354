//! # Check Subcommand
//!
//! Resolve dependent defaults, normalize and validate one hardware
//! configuration document. A document with any validation error is never
//! written out: the output file would otherwise claim to be normalized
//! while carrying invalid user data.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};

use rips_schema::{check, to_yaml_string, ErrorReport};

use crate::{derive_output_path, load_schema, read_document, EXIT_INVALID, EXIT_OK};

/// Arguments for `rips check`.
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Hardware-configuration YAML to check.
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Schema YAML to validate against instead of the bundled schema.
    #[arg(long)]
    pub schema: Option<PathBuf>,

    /// Exact path for the normalized output.
    #[arg(short, long, conflicts_with = "output_dir")]
    pub output: Option<PathBuf>,

    /// Directory for the derived `<stem>_checked.<ext>` output.
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Report format.
    #[arg(long, value_enum, default_value_t = ReportFormat::Text)]
    pub format: ReportFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    Text,
    Json,
}

/// Execute the check subcommand.
///
/// Returns exit code: 0 on success, 1 on validation failure.
pub fn run_check(args: &CheckArgs) -> Result<u8> {
    tracing::info!("running RIPS checker on input file");

    let schema = load_schema(args.schema.as_deref())?;
    let original = read_document(&args.input)?;

    tracing::info!("initiating validation");
    let outcome = check(&schema, &original);

    for notice in &outcome.notices {
        tracing::debug!(path = %notice.path, "{}", notice.message);
    }

    let report = outcome.report();
    if !outcome.is_valid() {
        print_report(&report, args.format)?;
        tracing::error!(
            input = %args.input.display(),
            errors = report.fatal,
            "validation failed; no output written"
        );
        return Ok(EXIT_INVALID);
    }
    tracing::info!(capabilities = %outcome.capabilities, "no errors in input YAML");

    let output = args
        .output
        .clone()
        .unwrap_or_else(|| derive_output_path(&args.input, args.output_dir.as_deref()));
    let yaml = to_yaml_string(&outcome.normalized).context("failed to serialize normalized document")?;
    std::fs::write(&output, yaml)
        .with_context(|| format!("failed to write {}", output.display()))?;
    tracing::info!(output = %output.display(), "dumped normalized checked YAML");

    match args.format {
        ReportFormat::Text => println!("OK: {} -> {}", args.input.display(), output.display()),
        ReportFormat::Json => print_report(&report, args.format)?,
    }
    Ok(EXIT_OK)
}

fn print_report(report: &ErrorReport, format: ReportFormat) -> Result<()> {
    match format {
        ReportFormat::Text => println!("{report}"),
        ReportFormat::Json => println!(
            "{}",
            serde_json::to_string_pretty(report).context("failed to encode report")?
        ),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    const VALID_INPUT: &str = "\
ISA: [I, M, A, S, U]
misa:
  Extensions:
    bitmask:
      base: 1315073
vendor_note: kept as-is
";

    fn args(input: &Path) -> CheckArgs {
        CheckArgs {
            input: input.to_path_buf(),
            schema: None,
            output: None,
            output_dir: None,
            format: ReportFormat::Text,
        }
    }

    #[test]
    fn valid_input_writes_checked_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("core.yaml");
        std::fs::write(&input, VALID_INPUT).unwrap();

        let code = run_check(&args(&input)).unwrap();
        assert_eq!(code, EXIT_OK);

        let written = std::fs::read_to_string(dir.path().join("core_checked.yaml")).unwrap();
        let value: serde_yaml::Value = serde_yaml::from_str(&written).unwrap();
        assert_eq!(value["vendor_note"], serde_yaml::Value::from("kept as-is"));
        assert_eq!(value["misa"]["Extensions"]["readonly"], serde_yaml::Value::from(false));
        assert_eq!(value["mideleg"]["implemented"], serde_yaml::Value::from(true));
        assert!(written.starts_with("ISA:"), "key order lost:\n{written}");
    }

    #[test]
    fn invalid_input_returns_1_and_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("bad.yaml");
        std::fs::write(&input, "ISA: [I]\nmstatus:\n  TVM:\n    readonly: false\n").unwrap();

        let code = run_check(&args(&input)).unwrap();
        assert_eq!(code, EXIT_INVALID);
        assert!(!dir.path().join("bad_checked.yaml").exists());
    }

    #[test]
    fn explicit_output_and_json_format() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("core.yaml");
        let output = dir.path().join("nested.yaml");
        std::fs::write(&input, VALID_INPUT).unwrap();

        let mut a = args(&input);
        a.output = Some(output.clone());
        a.format = ReportFormat::Json;
        assert_eq!(run_check(&a).unwrap(), EXIT_OK);
        assert!(output.exists());
        assert!(!dir.path().join("core_checked.yaml").exists());
    }

    #[test]
    fn output_dir_redirects_derived_path() {
        let dir = tempfile::tempdir().unwrap();
        let out_dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("core.yaml");
        std::fs::write(&input, VALID_INPUT).unwrap();

        let mut a = args(&input);
        a.output_dir = Some(out_dir.path().to_path_buf());
        assert_eq!(run_check(&a).unwrap(), EXIT_OK);
        assert!(out_dir.path().join("core_checked.yaml").exists());
    }

    #[test]
    fn schema_error_aborts_before_reading_input() {
        let dir = tempfile::tempdir().unwrap();
        let schema = dir.path().join("schema.yaml");
        std::fs::write(&schema, "ISA:\n  type: list\n").unwrap();

        let mut a = args(&dir.path().join("does-not-exist.yaml"));
        a.schema = Some(schema);
        let err = run_check(&a).unwrap_err();
        let msg = format!("{err:#}");
        assert!(msg.contains("cannot bind resolvers"), "{msg}");
        assert!(!msg.contains("does-not-exist"), "{msg}");
    }

    #[test]
    fn missing_input_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = run_check(&args(&dir.path().join("nope.yaml"))).unwrap_err();
        assert!(format!("{err:#}").contains("cannot read input"));
    }
}
