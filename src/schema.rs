//! Header schema detection for export documents
//!
//! Locates the credential columns and the dynamically-sized family of
//! per-host boolean columns from the header block. Detection failure is
//! never fatal: an undetected role falls back to a documented default index
//! and is flagged in the report so callers can judge how much to trust the
//! result.

use tracing::debug;

use crate::report::ExtractionReport;
use crate::types::{ColumnRole, HeaderShape};

/// Literal prefix a header cell must carry to declare a host column.
/// The suffix is the host's dotted-quad address, e.g. `HOST_10.0.0.5`.
pub const HOST_COLUMN_PREFIX: &str = "HOST_";

/// Fallback column index when the username header is not detected.
pub const DEFAULT_USERNAME_COLUMN: usize = 0;
/// Fallback column index when the password header is not detected.
pub const DEFAULT_PASSWORD_COLUMN: usize = 1;
/// Fallback column index when the ssh-key header is not detected.
pub const DEFAULT_SSH_KEY_COLUMN: usize = 2;

// Header aliases, matched against trimmed lower-cased cells. Rules are
// evaluated in this order; a column claimed by an earlier rule is skipped.
const USERNAME_ALIASES: &[&str] = &["username", "user name", "user", "login", "account"];
const PASSWORD_ALIASES: &[&str] = &["password", "passwd", "pass", "secret"];
const SSH_KEY_ALIASES: &[&str] = &["ssh key", "ssh_key", "sshkey", "public key", "pubkey", "key"];

/// A resolved column role: where it lives, and whether the header actually
/// named it or the index is a fallback default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoleColumn {
    pub index: usize,
    pub detected: bool,
}

/// One detected host column: the address it grants and its column index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostColumn {
    pub address: String,
    pub index: usize,
}

/// Detected column roles for one document. Computed once per document from
/// the header block, then immutable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaMap {
    pub shape: HeaderShape,
    pub username: RoleColumn,
    pub password: RoleColumn,
    pub ssh_key: RoleColumn,
    /// Host columns in declaration order. Addresses are unique; a duplicate
    /// header keeps its first occurrence.
    pub hosts: Vec<HostColumn>,
}

impl SchemaMap {
    /// Detect column roles from the header block.
    ///
    /// `header_rows` must hold exactly `shape.header_rows()` tokenized rows.
    /// Credential roles are matched against the first row; host columns are
    /// read from the last row of the block. Undetected roles and duplicate
    /// host columns are recorded on the report.
    pub fn detect(
        header_rows: &[Vec<String>],
        shape: HeaderShape,
        report: &mut ExtractionReport,
    ) -> SchemaMap {
        let role_row: &[String] = header_rows.first().map(Vec::as_slice).unwrap_or(&[]);
        let mut claimed = vec![false; role_row.len()];

        let username = resolve_role(
            role_row,
            &mut claimed,
            USERNAME_ALIASES,
            ColumnRole::Username,
            DEFAULT_USERNAME_COLUMN,
            report,
        );
        let password = resolve_role(
            role_row,
            &mut claimed,
            PASSWORD_ALIASES,
            ColumnRole::Password,
            DEFAULT_PASSWORD_COLUMN,
            report,
        );
        let ssh_key = resolve_role(
            role_row,
            &mut claimed,
            SSH_KEY_ALIASES,
            ColumnRole::SshKey,
            DEFAULT_SSH_KEY_COLUMN,
            report,
        );

        // Host columns live on the last row of the header block: the only
        // row for legacy, the identifier row for matrix.
        let host_row: &[String] = header_rows.last().map(Vec::as_slice).unwrap_or(&[]);
        let mut hosts: Vec<HostColumn> = Vec::new();
        for (index, cell) in host_row.iter().enumerate() {
            if let Some(address) = host_address(cell) {
                if hosts.iter().any(|h| h.address == address) {
                    report.record_duplicate_host(address);
                    continue;
                }
                hosts.push(HostColumn {
                    address: address.to_string(),
                    index,
                });
            }
        }

        debug!(
            shape = %shape,
            host_columns = hosts.len(),
            "schema detection complete"
        );

        SchemaMap {
            shape,
            username,
            password,
            ssh_key,
            hosts,
        }
    }

    /// Addresses of all detected host columns, in declaration order.
    pub fn host_addresses(&self) -> Vec<String> {
        self.hosts.iter().map(|h| h.address.clone()).collect()
    }
}

fn resolve_role(
    role_row: &[String],
    claimed: &mut [bool],
    aliases: &[&str],
    role: ColumnRole,
    fallback: usize,
    report: &mut ExtractionReport,
) -> RoleColumn {
    let found = role_row
        .iter()
        .enumerate()
        .filter(|(i, _)| !claimed[*i])
        .find(|(_, cell)| aliases.contains(&cell.trim().to_ascii_lowercase().as_str()))
        .map(|(i, _)| i);

    match found {
        Some(index) => {
            claimed[index] = true;
            RoleColumn {
                index,
                detected: true,
            }
        }
        None => {
            report.record_defaulted_role(role, fallback);
            RoleColumn {
                index: fallback,
                detected: false,
            }
        }
    }
}

/// Extract the host address from a header cell, if the cell declares one.
///
/// A host cell is the literal prefix followed by a dotted-quad address;
/// anything else (including a malformed address) is not a host column.
pub fn host_address(cell: &str) -> Option<&str> {
    let suffix = cell.trim().strip_prefix(HOST_COLUMN_PREFIX)?;
    is_dotted_quad(suffix).then_some(suffix)
}

fn is_dotted_quad(s: &str) -> bool {
    let mut octets = 0;
    for part in s.split('.') {
        if part.is_empty()
            || part.len() > 3
            || !part.chars().all(|c| c.is_ascii_digit())
            || part.parse::<u16>().map(|v| v > 255).unwrap_or(true)
        {
            return false;
        }
        octets += 1;
    }
    octets == 4
}
