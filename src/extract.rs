//! The extraction pipeline
//!
//! Wires the stages in a strict line: tokenize, detect schema, classify and
//! extract rows, map assignments, aggregate, serialize and validate. One
//! input document in, one normalized document out. All diagnostics live in
//! a per-invocation report, so independent documents can be processed
//! concurrently.

use chrono::{DateTime, Utc};
use tracing::info;

use crate::aggregate::{aggregate, ExtractedRow};
use crate::assignment::map_assignments;
use crate::document::{ColumnDetection, Metadata, NormalizedDocument, ValidationSummary};
use crate::error::{ProvsheetError, Result};
use crate::report::ExtractionReport;
use crate::row::{classify_row, RawRecord, RowOutcome};
use crate::schema::{host_address, SchemaMap};
use crate::tokenizer::{tokenize_line, DEFAULT_DELIMITER, DEFAULT_QUOTE};
use crate::types::{HeaderShape, ShapeSelection};

/// Per-invocation extraction options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractOptions {
    pub shape: ShapeSelection,
    pub delimiter: char,
    pub quote: char,
    /// Pin the generation timestamp for reproducible output; `None` stamps
    /// the wall clock.
    pub generated_at: Option<DateTime<Utc>>,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            shape: ShapeSelection::Auto,
            delimiter: DEFAULT_DELIMITER,
            quote: DEFAULT_QUOTE,
            generated_at: None,
        }
    }
}

/// A successful extraction: the validated document plus the full account of
/// recoverable issues.
#[derive(Debug, Clone, PartialEq)]
pub struct Extraction {
    pub document: NormalizedDocument,
    pub report: ExtractionReport,
    pub validation: ValidationSummary,
}

/// Schema detection results without a full extraction, for judging how much
/// to trust a sheet before running it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inspection {
    pub shape: HeaderShape,
    pub schema: SchemaMap,
    pub report: ExtractionReport,
}

/// Run the full pipeline over one export document.
///
/// Hard errors: empty input, a header block shorter than the shape
/// requires, zero valid data rows, or a document that fails validation.
/// Everything else is recorded on the report and the run continues.
pub fn extract_document(input: &str, options: &ExtractOptions) -> Result<Extraction> {
    let records = tokenize_input(input, options)?;
    let (shape, header_len) = resolve_shape(&records, options.shape)?;
    info!(%shape, lines = records.len(), "starting extraction");

    let mut report = ExtractionReport::new();
    let header_rows: Vec<Vec<String>> = records[..header_len]
        .iter()
        .map(|r| r.fields.clone())
        .collect();
    let schema = SchemaMap::detect(&header_rows, shape, &mut report);

    let mut extracted: Vec<ExtractedRow> = Vec::new();
    for record in &records[header_len..] {
        report.record_row();
        match classify_row(record, &schema) {
            RowOutcome::Valid(credentials) => {
                let hosts = map_assignments(record, &schema);
                report.record_valid();
                extracted.push(ExtractedRow { credentials, hosts });
            }
            RowOutcome::Skipped(reason) => report.record_skip(record.line, reason),
        }
    }

    if extracted.is_empty() {
        return Err(ProvsheetError::input(format!(
            "no valid rows among {} data rows",
            report.total_rows
        )));
    }

    let (users, resource_index) = aggregate(extracted);

    let document = NormalizedDocument {
        metadata: Metadata {
            generated_at: options.generated_at.unwrap_or_else(Utc::now),
            header_shape: shape,
            column_detection: ColumnDetection::from(&schema),
            total_rows: report.total_rows,
            valid_rows: report.valid_rows,
            skipped_rows: report.skipped_rows(),
        },
        users,
        resource_index,
    };

    let validation = document.validate()?;
    if validation.users_without_hosts > 0 {
        report.record_warning(format!(
            "{} user(s) have no host assignments",
            validation.users_without_hosts
        ));
    }
    if validation.hosts_without_users > 0 {
        report.record_warning(format!(
            "{} host(s) have no assigned users",
            validation.hosts_without_users
        ));
    }

    info!(
        users = document.users.len(),
        hosts = document.resource_index.len(),
        valid_rows = report.valid_rows,
        skipped = report.skipped_rows(),
        "extraction complete"
    );

    Ok(Extraction {
        document,
        report,
        validation,
    })
}

/// Run schema detection only.
///
/// Works even on sheets whose data rows are all broken; that is its point.
pub fn inspect_document(input: &str, options: &ExtractOptions) -> Result<Inspection> {
    let records = tokenize_input(input, options)?;
    let (shape, header_len) = resolve_shape(&records, options.shape)?;

    let mut report = ExtractionReport::new();
    let header_rows: Vec<Vec<String>> = records[..header_len]
        .iter()
        .map(|r| r.fields.clone())
        .collect();
    let schema = SchemaMap::detect(&header_rows, shape, &mut report);

    Ok(Inspection {
        shape,
        schema,
        report,
    })
}

fn tokenize_input(input: &str, options: &ExtractOptions) -> Result<Vec<RawRecord>> {
    if input.trim().is_empty() {
        return Err(ProvsheetError::input("input document is empty"));
    }

    // str::lines handles both \n and \r\n endings.
    Ok(input
        .lines()
        .enumerate()
        .map(|(i, line)| RawRecord {
            line: i + 1,
            fields: tokenize_line(line, options.delimiter, options.quote),
        })
        .collect())
}

/// Resolve the header shape and the number of rows its block occupies.
///
/// Auto-detection: a document is matrix-shaped iff it has at least three
/// lines and line 3 declares at least one host column.
fn resolve_shape(records: &[RawRecord], selection: ShapeSelection) -> Result<(HeaderShape, usize)> {
    let shape = match selection {
        ShapeSelection::Legacy => HeaderShape::Legacy,
        ShapeSelection::Matrix => HeaderShape::Matrix,
        ShapeSelection::Auto => {
            let matrix = records.len() >= 3
                && records[2]
                    .fields
                    .iter()
                    .any(|cell| host_address(cell).is_some());
            if matrix {
                HeaderShape::Matrix
            } else {
                HeaderShape::Legacy
            }
        }
    };

    let header_len = shape.header_rows();
    if records.len() < header_len {
        return Err(ProvsheetError::input(format!(
            "{shape} header needs {header_len} row(s), document has {}",
            records.len()
        )));
    }

    Ok((shape, header_len))
}
