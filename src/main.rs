//! provsheet - Main entry point
//!
//! Thin CLI over the extraction library: read an export, run the pipeline,
//! write the normalized document, and surface every recoverable issue so
//! mis-detection is never silent.

use std::fs;
use std::path::Path;
use std::str::FromStr;

use anyhow::{bail, Context};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use provsheet::cli::{Cli, Commands};
use provsheet::{
    extract_document, inspect_document, ExtractOptions, NormalizedDocument, ShapeSelection,
};

/// Initialize the tracing subscriber. Diagnostics go to stderr so stdout
/// stays clean for piped JSON.
fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse_args();
    debug!("CLI arguments parsed");

    match cli.command {
        Commands::Extract {
            input,
            output,
            shape,
            delimiter,
            pretty,
        } => run_extract(&input, &output, &shape, delimiter, pretty),
        Commands::Inspect {
            input,
            shape,
            delimiter,
        } => run_inspect(&input, &shape, delimiter),
        Commands::Validate { document } => run_validate(&document),
    }
}

fn parse_shape(raw: &str) -> anyhow::Result<ShapeSelection> {
    ShapeSelection::from_str(raw)
        .map_err(|_| anyhow::anyhow!("unknown shape '{raw}' (valid: auto, legacy, matrix)"))
}

fn run_extract(
    input: &Path,
    output: &Path,
    shape: &str,
    delimiter: char,
    pretty: bool,
) -> anyhow::Result<()> {
    let options = ExtractOptions {
        shape: parse_shape(shape)?,
        delimiter,
        ..Default::default()
    };

    let raw = fs::read_to_string(input)
        .with_context(|| format!("Failed to read export from {input:?}"))?;

    info!("Extracting {:?}", input);
    let extraction = match extract_document(&raw, &options) {
        Ok(extraction) => extraction,
        Err(e) => {
            eprintln!("✗ Extraction failed: {e}");
            std::process::exit(1);
        }
    };

    let json = extraction.document.to_json(pretty)?;
    fs::write(output, &json)
        .with_context(|| format!("Failed to write document to {output:?}"))?;

    let doc = &extraction.document;
    println!(
        "✓ Extracted {} user(s) across {} host(s) → {}",
        doc.users.len(),
        doc.resource_index.len(),
        output.display()
    );
    println!(
        "  rows: {} seen, {} valid, {} skipped ({} shape)",
        doc.metadata.total_rows,
        doc.metadata.valid_rows,
        doc.metadata.skipped_rows,
        doc.metadata.header_shape
    );
    for line in extraction.report.issue_lines() {
        println!("  ⚠ {line}");
    }

    Ok(())
}

fn run_inspect(input: &Path, shape: &str, delimiter: char) -> anyhow::Result<()> {
    let options = ExtractOptions {
        shape: parse_shape(shape)?,
        delimiter,
        ..Default::default()
    };

    let raw = fs::read_to_string(input)
        .with_context(|| format!("Failed to read export from {input:?}"))?;

    let inspection = match inspect_document(&raw, &options) {
        Ok(inspection) => inspection,
        Err(e) => {
            eprintln!("✗ Inspection failed: {e}");
            std::process::exit(1);
        }
    };

    let schema = &inspection.schema;
    println!("✓ Header shape: {}", inspection.shape);
    for (role, column) in [
        ("username", schema.username),
        ("password", schema.password),
        ("ssh_key", schema.ssh_key),
    ] {
        let origin = if column.detected { "detected" } else { "defaulted" };
        println!("  {role}: column {} ({origin})", column.index);
    }
    println!("  host columns: {}", schema.hosts.len());
    for host in &schema.hosts {
        println!("    column {} → {}", host.index, host.address);
    }
    for line in inspection.report.issue_lines() {
        println!("  ⚠ {line}");
    }

    Ok(())
}

fn run_validate(document: &Path) -> anyhow::Result<()> {
    let raw = fs::read_to_string(document)
        .with_context(|| format!("Failed to read document from {document:?}"))?;

    let doc = match NormalizedDocument::from_json(&raw) {
        Ok(doc) => doc,
        Err(e) => {
            eprintln!("✗ Document failed to parse: {e}");
            std::process::exit(1);
        }
    };

    if doc.users.is_empty() {
        bail!("document contains no users");
    }

    match doc.validate() {
        Ok(summary) => {
            println!(
                "✓ Document is valid: {} user(s), {} host(s)",
                doc.users.len(),
                doc.resource_index.len()
            );
            if summary.users_without_hosts > 0 {
                println!("  ⚠ {} user(s) have no host assignments", summary.users_without_hosts);
            }
            if summary.hosts_without_users > 0 {
                println!("  ⚠ {} host(s) have no assigned users", summary.hosts_without_users);
            }
            Ok(())
        }
        Err(e) => {
            eprintln!("✗ Document validation failed: {e}");
            std::process::exit(1);
        }
    }
}
