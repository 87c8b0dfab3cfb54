//! Per-invocation extraction report
//!
//! Every recoverable issue the pipeline encounters lands here: skipped rows,
//! defaulted header roles, duplicate host columns, aggregation warnings.
//! The report is threaded through the stages explicitly so concurrent
//! extractions never share state.

use tracing::{debug, warn};

use crate::row::SkipReason;
use crate::types::ColumnRole;

/// A data row the pipeline skipped, with its location and reason.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SkippedRow {
    pub line: usize,
    pub reason: SkipReason,
}

/// A header role that was not detected and fell back to its default index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DefaultedRole {
    pub role: ColumnRole,
    pub fallback_index: usize,
}

/// Structured account of every recoverable issue in one extraction run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractionReport {
    /// Data rows seen (header block excluded).
    pub total_rows: usize,
    /// Data rows that produced credentials.
    pub valid_rows: usize,
    pub skipped: Vec<SkippedRow>,
    pub defaulted_roles: Vec<DefaultedRole>,
    /// Host addresses declared by more than one header column.
    pub duplicate_host_columns: Vec<String>,
    /// Aggregation/validation warnings (empty assignment sets and the like).
    pub warnings: Vec<String>,
}

impl ExtractionReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one data row as seen.
    pub fn record_row(&mut self) {
        self.total_rows += 1;
    }

    /// Count one data row as valid.
    pub fn record_valid(&mut self) {
        self.valid_rows += 1;
    }

    /// Record a skipped row with its reason.
    pub fn record_skip(&mut self, line: usize, reason: SkipReason) {
        debug!(line, %reason, "row skipped");
        self.skipped.push(SkippedRow { line, reason });
    }

    /// Record a header role that fell back to its default index.
    pub fn record_defaulted_role(&mut self, role: ColumnRole, fallback_index: usize) {
        warn!(%role, fallback_index, "header role not detected, using default column");
        self.defaulted_roles.push(DefaultedRole {
            role,
            fallback_index,
        });
    }

    /// Record a duplicate host column; the first occurrence stays in effect.
    pub fn record_duplicate_host(&mut self, address: &str) {
        warn!(address, "duplicate host column ignored");
        self.duplicate_host_columns.push(address.to_string());
    }

    /// Record a free-form warning.
    pub fn record_warning(&mut self, message: impl Into<String>) {
        let message = message.into();
        warn!("{}", message);
        self.warnings.push(message);
    }

    /// Number of skipped data rows.
    pub fn skipped_rows(&self) -> usize {
        self.skipped.len()
    }

    /// True when a role was detected from the header rather than defaulted.
    pub fn role_detected(&self, role: ColumnRole) -> bool {
        !self.defaulted_roles.iter().any(|d| d.role == role)
    }

    /// Human-readable issue lines for CLI output, worst first.
    pub fn issue_lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        for defaulted in &self.defaulted_roles {
            lines.push(format!(
                "{} column not detected, defaulted to index {}",
                defaulted.role, defaulted.fallback_index
            ));
        }
        for address in &self.duplicate_host_columns {
            lines.push(format!("duplicate host column HOST_{address} ignored"));
        }
        for skip in &self.skipped {
            lines.push(format!("line {}: skipped ({})", skip.line, skip.reason));
        }
        lines.extend(self.warnings.iter().cloned());
        lines
    }
}
