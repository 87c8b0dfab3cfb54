//! Type-safe enums shared across the extraction pipeline
//!
//! This module replaces stringly-typed shape and role values with proper
//! Rust enums that provide compile-time validation and exhaustive matching.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Header shape of an export document.
///
/// Legacy exports carry a single header row naming the credential columns.
/// Matrix exports carry a three-row header block whose third row declares
/// one boolean column per host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[derive(Display, EnumString, EnumIter)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum HeaderShape {
    #[default]
    #[strum(serialize = "legacy")]
    Legacy,
    #[strum(serialize = "matrix")]
    Matrix,
}

impl HeaderShape {
    /// Number of rows the header block occupies.
    pub fn header_rows(&self) -> usize {
        match self {
            Self::Legacy => 1,
            Self::Matrix => 3,
        }
    }
}

/// Caller-facing shape selection: force a shape or let the pipeline decide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[derive(Display, EnumString, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum ShapeSelection {
    #[default]
    #[strum(serialize = "auto")]
    Auto,
    #[strum(serialize = "legacy")]
    Legacy,
    #[strum(serialize = "matrix")]
    Matrix,
}

/// Semantic column roles the schema detector resolves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[derive(Display, EnumString, EnumIter)]
pub enum ColumnRole {
    #[strum(serialize = "username")]
    Username,
    #[strum(serialize = "password")]
    Password,
    #[strum(serialize = "ssh_key")]
    SshKey,
}
