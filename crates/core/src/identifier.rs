//! Identifier allow-list for Cypher query construction
//!
//! Labels and relationship types cannot be passed as query parameters, so they
//! are spliced into query text. Every such name comes from database
//! introspection and is untrusted: it must pass [`validate_identifier`] before
//! any query string is built from it.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum accepted identifier length in characters
pub const MAX_IDENTIFIER_LEN: usize = 256;

/// What an identifier names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentifierKind {
    Label,
    RelationshipType,
    Property,
}

impl fmt::Display for IdentifierKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Label => write!(f, "label"),
            Self::RelationshipType => write!(f, "relationship type"),
            Self::Property => write!(f, "property"),
        }
    }
}

fn is_allowed_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '-' || c == '.'
}

/// Validate an identifier against the allow-list
///
/// Accepts non-empty names of at most [`MAX_IDENTIFIER_LEN`] characters made of
/// Unicode alphanumerics, `_`, `-` and `.`. Backticks, quotes, whitespace,
/// brackets, colons, semicolons and every other character that could alter
/// query structure are rejected.
///
/// # Errors
///
/// Returns [`Error::UnsafeIdentifier`] when the name fails the allow-list.
pub fn validate_identifier(kind: IdentifierKind, value: &str) -> Result<&str> {
    if value.is_empty()
        || value.chars().count() > MAX_IDENTIFIER_LEN
        || !value.chars().all(is_allowed_char)
    {
        return Err(Error::unsafe_identifier(kind, value));
    }
    Ok(value)
}

/// Validate an identifier and wrap it in backticks for use in query text
pub fn quote_identifier(kind: IdentifierKind, value: &str) -> Result<String> {
    let value = validate_identifier(kind, value)?;
    Ok(format!("`{value}`"))
}
