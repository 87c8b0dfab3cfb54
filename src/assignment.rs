//! Assignment mapping: boolean flag cells to granted hosts
//!
//! Evaluates each host column's raw cell value against the truthy
//! vocabulary and returns the hosts granted to the row's user, in
//! column-declaration order. That order is what downstream consumers see,
//! so it is never sorted.

use tracing::debug;

use crate::row::RawRecord;
use crate::schema::SchemaMap;

// The tri-state vocabulary: these grant, everything else does not.
const TRUTHY_TOKENS: &[&str] = &["true", "1", "yes"];

/// True when a flag cell grants access. Matching is trimmed and
/// case-insensitive; any unrecognized token means not granted.
pub fn is_truthy(value: &str) -> bool {
    TRUTHY_TOKENS.contains(&value.trim().to_ascii_lowercase().as_str())
}

/// Hosts granted to this row's user, in host-column declaration order.
pub fn map_assignments(record: &RawRecord, schema: &SchemaMap) -> Vec<String> {
    let mut granted = Vec::new();
    for column in &schema.hosts {
        let value = record.field(column.index);
        if is_truthy(value) {
            granted.push(column.address.clone());
        } else if !value.trim().is_empty() {
            // Unrecognized tokens are treated as not granted, but worth a
            // trace when hunting mis-filled sheets.
            debug!(
                line = record.line,
                host = %column.address,
                value = value.trim(),
                "unrecognized flag token treated as not granted"
            );
        }
    }
    granted
}
