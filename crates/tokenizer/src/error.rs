use thiserror::Error;

#[derive(Error, Debug)]
pub enum TokenizerError {
    #[error("Failed to build HTTP client: {0}")]
    Build(String),

    #[error("Tokenization request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Tokenization service returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Malformed tokenization response: {0}")]
    Decode(String),

    #[error("Tokenization service returned {actual} tokens for {expected} values")]
    ResponseLengthMismatch { expected: usize, actual: usize },
}

impl TokenizerError {
    pub fn is_length_mismatch(&self) -> bool {
        matches!(self, TokenizerError::ResponseLengthMismatch { .. })
    }
}
