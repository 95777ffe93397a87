use crate::error::TokenizerError;
use async_trait::async_trait;

/// Turns plaintext values into opaque tokens.
///
/// Implementations make exactly one remote call per method invocation and do
/// not retry. Values are sent as given, empty strings included.
#[async_trait]
pub trait TokenizationClient: Send + Sync {
    async fn tokenize_one(&self, value: &str) -> Result<String, TokenizerError>;

    /// Returns one token per value, in request order. A response with a
    /// different number of tokens is reported as
    /// [`TokenizerError::ResponseLengthMismatch`], never truncated or padded.
    async fn tokenize_many(&self, values: &[String]) -> Result<Vec<String>, TokenizerError>;
}
