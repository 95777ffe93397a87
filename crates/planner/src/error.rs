use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    #[error("SQL identifier cannot be empty")]
    EmptyIdentifier,

    #[error("SQL identifier too long: {0} chars (max {max})", max = crate::query::ident::MAX_IDENT_LEN)]
    IdentifierTooLong(usize),

    #[error("Invalid SQL identifier '{ident}': {reason}")]
    InvalidIdentifier { ident: String, reason: String },
}
