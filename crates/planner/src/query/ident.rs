//! Validation of table and column names before they are spliced into SQL.
//!
//! Table and column names cannot be bound as parameters, so every name taken
//! from configuration passes through here first.

use crate::error::QueryError;

pub const MAX_IDENT_LEN: usize = 128;

/// Accepts `[A-Za-z_][A-Za-z0-9_]*`.
pub fn validate_identifier(name: &str) -> Result<(), QueryError> {
    if name.is_empty() {
        return Err(QueryError::EmptyIdentifier);
    }

    if name.len() > MAX_IDENT_LEN {
        return Err(QueryError::IdentifierTooLong(name.len()));
    }

    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => {
            return Err(QueryError::InvalidIdentifier {
                ident: name.to_string(),
                reason: "must start with a letter or underscore".into(),
            });
        }
    }

    if let Some(c) = chars.find(|c| !c.is_ascii_alphanumeric() && *c != '_') {
        return Err(QueryError::InvalidIdentifier {
            ident: name.to_string(),
            reason: format!("contains invalid character '{c}'"),
        });
    }

    Ok(())
}

/// Like [`validate_identifier`], but allows a single `schema.table` qualifier.
/// Returns the name split into its parts.
pub fn validate_table_name(name: &str) -> Result<Vec<&str>, QueryError> {
    let parts: Vec<&str> = name.split('.').collect();
    if parts.len() > 2 {
        return Err(QueryError::InvalidIdentifier {
            ident: name.to_string(),
            reason: "at most one schema qualifier is allowed".into(),
        });
    }

    for part in &parts {
        validate_identifier(part)?;
    }

    Ok(parts)
}
