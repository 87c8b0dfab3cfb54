//! Row classification and credential extraction
//!
//! Decides whether a tokenized line is user data and pulls the credential
//! fields out of it. A row that fails classification is skipped with a
//! reason, never an error; only document-level integrity failures abort a
//! run.

use strum::Display;

use crate::schema::SchemaMap;
use crate::types::HeaderShape;

/// Marker prefix a matrix-shape data row carries in its username cell,
/// e.g. `User carol`. Stripped to obtain the real username.
pub const USER_ROW_MARKER: &str = "User ";

/// One tokenized input line plus its 1-based line number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRecord {
    pub line: usize,
    pub fields: Vec<String>,
}

impl RawRecord {
    /// Field value at `index`, or the empty string when the row is short.
    pub fn field(&self, index: usize) -> &str {
        self.fields.get(index).map(String::as_str).unwrap_or("")
    }

    /// True when every field is empty after trimming.
    pub fn is_blank(&self) -> bool {
        self.fields.iter().all(|f| f.trim().is_empty())
    }
}

/// Why a row was skipped instead of extracted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum SkipReason {
    #[strum(serialize = "blank line")]
    Blank,
    #[strum(serialize = "not a user row")]
    NotUserRow,
    #[strum(serialize = "invalid username")]
    InvalidUsername,
    #[strum(serialize = "empty password")]
    EmptyPassword,
}

/// Credentials extracted from one valid row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
    /// Empty when the column is absent or the row is short.
    pub ssh_key: String,
}

/// Outcome of classifying one row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowOutcome {
    Valid(Credentials),
    Skipped(SkipReason),
}

/// Classify a data row and extract its credentials.
///
/// Legacy shape treats any non-blank row as user data. Matrix shape only
/// accepts rows whose username cell starts with [`USER_ROW_MARKER`]; the
/// marker is stripped. Field values are trimmed, since the exports are
/// hand-maintained.
pub fn classify_row(record: &RawRecord, schema: &SchemaMap) -> RowOutcome {
    if record.is_blank() {
        return RowOutcome::Skipped(SkipReason::Blank);
    }

    let identity_cell = record.field(schema.username.index).trim();
    let username = match schema.shape {
        HeaderShape::Legacy => identity_cell,
        HeaderShape::Matrix => match identity_cell.strip_prefix(USER_ROW_MARKER) {
            Some(rest) => rest.trim(),
            None => return RowOutcome::Skipped(SkipReason::NotUserRow),
        },
    };

    if !is_valid_username(username) {
        return RowOutcome::Skipped(SkipReason::InvalidUsername);
    }

    let password = record.field(schema.password.index).trim();
    if password.is_empty() {
        return RowOutcome::Skipped(SkipReason::EmptyPassword);
    }

    let ssh_key = record.field(schema.ssh_key.index).trim();

    RowOutcome::Valid(Credentials {
        username: username.to_string(),
        password: password.to_string(),
        ssh_key: ssh_key.to_string(),
    })
}

/// Allowed username pattern: an ASCII letter or underscore first, then
/// ASCII alphanumerics, `_`, `-`, or `.`.
pub fn is_valid_username(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::ExtractionReport;
    use crate::types::HeaderShape;

    fn record(fields: &[&str]) -> RawRecord {
        RawRecord {
            line: 5,
            fields: fields.iter().map(|f| f.to_string()).collect(),
        }
    }

    fn legacy_schema() -> SchemaMap {
        let mut report = ExtractionReport::new();
        let header = vec![vec![
            "Username".to_string(),
            "Password".to_string(),
            "SSH Key".to_string(),
        ]];
        SchemaMap::detect(&header, HeaderShape::Legacy, &mut report)
    }

    fn matrix_schema() -> SchemaMap {
        let mut report = ExtractionReport::new();
        let header = vec![
            vec![
                "Username".to_string(),
                "Password".to_string(),
                "SSH Key".to_string(),
                "Servers".to_string(),
            ],
            vec![String::new(), String::new(), String::new(), "Web".to_string()],
            vec![
                String::new(),
                String::new(),
                String::new(),
                "HOST_10.0.0.5".to_string(),
            ],
        ];
        SchemaMap::detect(&header, HeaderShape::Matrix, &mut report)
    }

    #[test]
    fn test_legacy_row_extracts_credentials() {
        let outcome = classify_row(&record(&["alice", "Secret1", "keyA"]), &legacy_schema());
        assert_eq!(
            outcome,
            RowOutcome::Valid(Credentials {
                username: "alice".to_string(),
                password: "Secret1".to_string(),
                ssh_key: "keyA".to_string(),
            })
        );
    }

    #[test]
    fn test_short_row_yields_empty_ssh_key() {
        let outcome = classify_row(&record(&["bob", "Secret2"]), &legacy_schema());
        match outcome {
            RowOutcome::Valid(creds) => assert_eq!(creds.ssh_key, ""),
            other => panic!("expected valid row, got {:?}", other),
        }
    }

    #[test]
    fn test_blank_row_is_skipped() {
        let outcome = classify_row(&record(&["", "  ", ""]), &legacy_schema());
        assert_eq!(outcome, RowOutcome::Skipped(SkipReason::Blank));
    }

    #[test]
    fn test_matrix_row_strips_marker() {
        let outcome = classify_row(
            &record(&["User carol", "Secret3", "keyC", "TRUE"]),
            &matrix_schema(),
        );
        match outcome {
            RowOutcome::Valid(creds) => assert_eq!(creds.username, "carol"),
            other => panic!("expected valid row, got {:?}", other),
        }
    }

    #[test]
    fn test_matrix_row_without_marker_is_skipped() {
        let outcome = classify_row(
            &record(&["Totals", "4", "", "2"]),
            &matrix_schema(),
        );
        assert_eq!(outcome, RowOutcome::Skipped(SkipReason::NotUserRow));
    }

    #[test]
    fn test_empty_password_is_skipped() {
        let outcome = classify_row(&record(&["dave", "   ", "keyD"]), &legacy_schema());
        assert_eq!(outcome, RowOutcome::Skipped(SkipReason::EmptyPassword));
    }

    #[test]
    fn test_invalid_username_is_skipped() {
        let outcome = classify_row(&record(&["1dave", "pw", ""]), &legacy_schema());
        assert_eq!(outcome, RowOutcome::Skipped(SkipReason::InvalidUsername));

        let outcome = classify_row(&record(&["da ve", "pw", ""]), &legacy_schema());
        assert_eq!(outcome, RowOutcome::Skipped(SkipReason::InvalidUsername));
    }

    #[test]
    fn test_username_pattern() {
        assert!(is_valid_username("alice"));
        assert!(is_valid_username("_svc-backup"));
        assert!(is_valid_username("j.doe"));
        assert!(is_valid_username("web01"));
        assert!(!is_valid_username(""));
        assert!(!is_valid_username("1alice"));
        assert!(!is_valid_username("-alice"));
        assert!(!is_valid_username("al ice"));
        assert!(!is_valid_username("böb"));
    }

    #[test]
    fn test_field_accessor_out_of_range() {
        let r = record(&["only"]);
        assert_eq!(r.field(0), "only");
        assert_eq!(r.field(7), "");
    }

    #[test]
    fn test_skip_reason_display() {
        assert_eq!(SkipReason::EmptyPassword.to_string(), "empty password");
        assert_eq!(SkipReason::NotUserRow.to_string(), "not a user row");
    }
}
