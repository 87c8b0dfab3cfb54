//! Normalized document model, serialization and validation
//!
//! The self-describing JSON document the pipeline emits: `metadata`
//! (detection results, row counts), `users` (ordered credential records),
//! and `resource_index` (host address to ordered username list). Validation
//! enforces the hard invariants before any output is declared authoritative.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{ProvsheetError, Result};
use crate::schema::SchemaMap;
use crate::types::HeaderShape;

/// One credential holder in the output document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAccount {
    pub username: String,
    pub password: String,
    /// Empty string when the export carried no key material.
    pub ssh_key: String,
    /// Assigned hosts in column-declaration order, deduplicated.
    pub hosts: Vec<String>,
    pub host_count: usize,
}

/// One host's entry in the reverse index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceEntry {
    pub address: String,
    /// Usernames in first-seen order.
    pub users: Vec<String>,
}

/// Reverse mapping from host address to the users assigned to it.
///
/// Serialized as a JSON object whose key order is the first-seen order of
/// the hosts; stored as a vector so that order survives a round trip.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceIndex {
    entries: Vec<ResourceEntry>,
}

impl ResourceIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `username` under `address`, creating the entry on first use.
    /// Both hosts and usernames keep first-seen order; duplicates are no-ops.
    pub fn add(&mut self, address: &str, username: &str) {
        match self.entries.iter_mut().find(|e| e.address == address) {
            Some(entry) => {
                if !entry.users.iter().any(|u| u == username) {
                    entry.users.push(username.to_string());
                }
            }
            None => self.entries.push(ResourceEntry {
                address: address.to_string(),
                users: vec![username.to_string()],
            }),
        }
    }

    /// Usernames assigned to `address`, in first-seen order.
    pub fn users_for(&self, address: &str) -> Option<&[String]> {
        self.entries
            .iter()
            .find(|e| e.address == address)
            .map(|e| e.users.as_slice())
    }

    pub fn entries(&self) -> &[ResourceEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for ResourceIndex {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for entry in &self.entries {
            map.serialize_entry(&entry.address, &entry.users)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for ResourceIndex {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct IndexVisitor;

        impl<'de> Visitor<'de> for IndexVisitor {
            type Value = ResourceIndex;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of host addresses to username lists")
            }

            fn visit_map<A: MapAccess<'de>>(
                self,
                mut access: A,
            ) -> std::result::Result<Self::Value, A::Error> {
                let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((address, users)) = access.next_entry::<String, Vec<String>>()? {
                    entries.push(ResourceEntry { address, users });
                }
                Ok(ResourceIndex { entries })
            }
        }

        deserializer.deserialize_map(IndexVisitor)
    }
}

/// Which columns the detector found, and where.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDetection {
    pub username_detected: bool,
    pub username_column: usize,
    pub password_detected: bool,
    pub password_column: usize,
    pub ssh_key_detected: bool,
    pub ssh_key_column: usize,
    /// Host addresses in column-declaration order; empty for legacy exports.
    pub host_columns: Vec<String>,
}

impl From<&SchemaMap> for ColumnDetection {
    fn from(schema: &SchemaMap) -> Self {
        Self {
            username_detected: schema.username.detected,
            username_column: schema.username.index,
            password_detected: schema.password.detected,
            password_column: schema.password.index,
            ssh_key_detected: schema.ssh_key.detected,
            ssh_key_column: schema.ssh_key.index,
            host_columns: schema.host_addresses(),
        }
    }
}

/// Document metadata: when and how this dataset was produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    pub generated_at: DateTime<Utc>,
    pub header_shape: HeaderShape,
    pub column_detection: ColumnDetection,
    /// Data rows seen (header block excluded).
    pub total_rows: usize,
    /// Data rows that produced credentials.
    pub valid_rows: usize,
    pub skipped_rows: usize,
}

/// Warning counts from validation. These never fail a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ValidationSummary {
    pub users_without_hosts: usize,
    pub hosts_without_users: usize,
}

/// The normalized credential dataset plus its metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedDocument {
    pub metadata: Metadata,
    pub users: Vec<UserAccount>,
    pub resource_index: ResourceIndex,
}

impl NormalizedDocument {
    /// Check the hard invariants and count the soft ones.
    ///
    /// Hard errors: the rendered JSON does not re-parse to an equal
    /// document; a user with an empty password; a stale `host_count`;
    /// broken symmetry between `users` and `resource_index` in either
    /// direction. Users without hosts and hosts without users are counted
    /// as warnings only.
    pub fn validate(&self) -> Result<ValidationSummary> {
        let rendered = serde_json::to_string(self)?;
        let reparsed: NormalizedDocument = serde_json::from_str(&rendered)?;
        if reparsed != *self {
            return Err(ProvsheetError::validation(
                "rendered document does not re-parse to an identical structure",
            ));
        }

        let mut summary = ValidationSummary::default();

        for user in &self.users {
            if user.password.is_empty() {
                return Err(ProvsheetError::validation(format!(
                    "user {} has an empty password",
                    user.username
                )));
            }
            if user.host_count != user.hosts.len() {
                return Err(ProvsheetError::validation(format!(
                    "user {} declares host_count {} but lists {} hosts",
                    user.username,
                    user.host_count,
                    user.hosts.len()
                )));
            }
            if user.hosts.is_empty() {
                summary.users_without_hosts += 1;
            }
            for host in &user.hosts {
                let listed = self
                    .resource_index
                    .users_for(host)
                    .is_some_and(|users| users.iter().any(|u| u == &user.username));
                if !listed {
                    return Err(ProvsheetError::validation(format!(
                        "user {} is assigned host {} but the index does not list them",
                        user.username, host
                    )));
                }
            }
        }

        for entry in self.resource_index.entries() {
            if entry.users.is_empty() {
                summary.hosts_without_users += 1;
            }
            for username in &entry.users {
                let assigned = self
                    .users
                    .iter()
                    .find(|u| &u.username == username)
                    .is_some_and(|u| u.hosts.iter().any(|h| h == &entry.address));
                if !assigned {
                    return Err(ProvsheetError::validation(format!(
                        "index lists user {} for host {} but the user is not assigned it",
                        username, entry.address
                    )));
                }
            }
        }

        Ok(summary)
    }

    /// Render the document as JSON.
    pub fn to_json(&self, pretty: bool) -> Result<String> {
        let rendered = if pretty {
            serde_json::to_string_pretty(self)?
        } else {
            serde_json::to_string(self)?
        };
        Ok(rendered)
    }

    /// Parse a previously rendered document.
    pub fn from_json(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }
}
