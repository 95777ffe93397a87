use crate::records::row::SourceRow;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A row identifier paired with the token that replaces its value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenizedPair {
    pub id: i64,
    pub token: String,
}

impl TokenizedPair {
    pub fn new(id: i64, token: impl Into<String>) -> Self {
        TokenizedPair {
            id,
            token: token.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("expected {expected} tokens, received {actual}")]
pub struct LengthMismatch {
    pub expected: usize,
    pub actual: usize,
}

/// Pairs tokens with rows by position. The lengths must agree exactly;
/// nothing is truncated or padded.
pub fn pair_tokens(
    rows: &[SourceRow],
    tokens: Vec<String>,
) -> Result<Vec<TokenizedPair>, LengthMismatch> {
    if rows.len() != tokens.len() {
        return Err(LengthMismatch {
            expected: rows.len(),
            actual: tokens.len(),
        });
    }

    Ok(rows
        .iter()
        .zip(tokens)
        .map(|(row, token)| TokenizedPair::new(row.id, token))
        .collect())
}
