//! provsheet library
//!
//! Converts loosely structured spreadsheet exports of account credentials
//! and per-host access flags into a normalized, bidirectionally consistent
//! JSON dataset consumed by provisioning steps.

pub mod aggregate;
pub mod assignment;
pub mod cli;
pub mod document;
pub mod error;
pub mod extract;
pub mod report;
pub mod row;
pub mod schema;
pub mod tokenizer;
pub mod types;

// Re-export main types for convenience
pub use aggregate::{aggregate, ExtractedRow};
pub use document::{
    ColumnDetection, Metadata, NormalizedDocument, ResourceEntry, ResourceIndex, UserAccount,
    ValidationSummary,
};
pub use error::{ProvsheetError, Result};
pub use extract::{extract_document, inspect_document, ExtractOptions, Extraction, Inspection};
pub use report::{DefaultedRole, ExtractionReport, SkippedRow};
pub use row::{classify_row, is_valid_username, Credentials, RawRecord, RowOutcome, SkipReason};
pub use schema::{host_address, HostColumn, RoleColumn, SchemaMap, HOST_COLUMN_PREFIX};
pub use tokenizer::{tokenize_line, DEFAULT_DELIMITER, DEFAULT_QUOTE};
pub use types::{ColumnRole, HeaderShape, ShapeSelection};
