//! JSON shapes exchanged with the tokenization service.

use crate::error::TokenizerError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub struct TokenizeRequest<'a> {
    pub tokengroup: &'a str,
    pub data: &'a str,
    pub tokentemplate: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    #[serde(default)]
    pub token: Option<String>,
}

/// The batch endpoint answers with an array; some deployments answer a
/// single-item batch with a bare object.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum BatchResponse {
    Many(Vec<TokenResponse>),
    One(TokenResponse),
}

impl BatchResponse {
    fn into_items(self) -> Vec<TokenResponse> {
        match self {
            BatchResponse::Many(items) => items,
            BatchResponse::One(item) => vec![item],
        }
    }
}

fn require_token(item: TokenResponse, index: usize) -> Result<String, TokenizerError> {
    match item.token {
        Some(token) if !token.is_empty() => Ok(token),
        Some(_) => Err(TokenizerError::Decode(format!(
            "empty token at index {index}"
        ))),
        None => Err(TokenizerError::Decode(format!(
            "missing token at index {index}"
        ))),
    }
}

pub fn decode_one(body: &[u8]) -> Result<String, TokenizerError> {
    let item: TokenResponse =
        serde_json::from_slice(body).map_err(|e| TokenizerError::Decode(e.to_string()))?;
    require_token(item, 0)
}

/// Decodes a batch response and checks it holds exactly `expected` tokens.
pub fn decode_many(body: &[u8], expected: usize) -> Result<Vec<String>, TokenizerError> {
    let items = serde_json::from_slice::<BatchResponse>(body)
        .map_err(|e| TokenizerError::Decode(e.to_string()))?
        .into_items();

    if items.len() != expected {
        return Err(TokenizerError::ResponseLengthMismatch {
            expected,
            actual: items.len(),
        });
    }

    items
        .into_iter()
        .enumerate()
        .map(|(i, item)| require_token(item, i))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_field_names() {
        let req = TokenizeRequest {
            tokengroup: "cards",
            data: "4111111111111111",
            tokentemplate: "ccn",
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"tokengroup": "cards", "data": "4111111111111111", "tokentemplate": "ccn"})
        );
    }

    #[test]
    fn test_decode_one() {
        assert_eq!(decode_one(br#"{"token":"TOK-1"}"#).unwrap(), "TOK-1");
        assert!(matches!(
            decode_one(br#"{"token":""}"#),
            Err(TokenizerError::Decode(_))
        ));
        assert!(matches!(
            decode_one(br#"{"status":"ok"}"#),
            Err(TokenizerError::Decode(_))
        ));
        assert!(matches!(
            decode_one(b"not json"),
            Err(TokenizerError::Decode(_))
        ));
    }

    #[test]
    fn test_decode_many_preserves_order() {
        let body = br#"[{"token":"TOK-1"},{"token":"TOK-2"}]"#;
        assert_eq!(decode_many(body, 2).unwrap(), vec!["TOK-1", "TOK-2"]);
    }

    #[test]
    fn test_decode_many_accepts_single_object() {
        assert_eq!(
            decode_many(br#"{"token":"TOK-1"}"#, 1).unwrap(),
            vec!["TOK-1"]
        );
    }

    #[test]
    fn test_decode_many_length_mismatch() {
        let err = decode_many(br#"[{"token":"TOK-1"}]"#, 2).unwrap_err();
        let TokenizerError::ResponseLengthMismatch { expected, actual } = err else {
            panic!("expected a length mismatch, got {err:?}");
        };
        assert_eq!((expected, actual), (2, 1));

        let err = decode_many(br#"[{"token":"A"},{"token":"B"},{"token":"C"}]"#, 2).unwrap_err();
        assert!(err.is_length_mismatch());
    }

    #[test]
    fn test_decode_many_missing_token_in_item() {
        let err = decode_many(br#"[{"token":"TOK-1"},{}]"#, 2).unwrap_err();
        assert!(matches!(err, TokenizerError::Decode(msg) if msg.contains("index 1")));
    }
}
