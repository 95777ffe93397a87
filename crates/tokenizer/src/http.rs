//! Tokenization client speaking JSON over HTTP(S).

use crate::{
    client::TokenizationClient,
    error::TokenizerError,
    wire::{self, TokenizeRequest},
};
use async_trait::async_trait;
use std::{fmt, time::Duration};
use tracing::{debug, warn};

const MAX_ERROR_BODY: usize = 256;

#[derive(Clone)]
pub struct HttpTokenizerConfig {
    pub base_url: String,
    pub token_group: String,
    pub token_template: String,
    pub username: String,
    pub password: String,
    pub accept_invalid_certs: bool,
    pub timeout: Option<Duration>,
    pub tokenize_path: String,
    pub batch_path: String,
}

impl fmt::Debug for HttpTokenizerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpTokenizerConfig")
            .field("base_url", &self.base_url)
            .field("token_group", &self.token_group)
            .field("token_template", &self.token_template)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("accept_invalid_certs", &self.accept_invalid_certs)
            .field("timeout", &self.timeout)
            .field("tokenize_path", &self.tokenize_path)
            .field("batch_path", &self.batch_path)
            .finish()
    }
}

#[derive(Debug)]
pub struct HttpTokenizer {
    client: reqwest::Client,
    config: HttpTokenizerConfig,
    tokenize_url: String,
    batch_url: String,
}

impl HttpTokenizer {
    pub fn new(config: HttpTokenizerConfig) -> Result<Self, TokenizerError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        if config.accept_invalid_certs {
            warn!("TLS certificate validation disabled for the tokenization service");
            builder = builder.danger_accept_invalid_certs(true);
        }
        let client = builder
            .build()
            .map_err(|e| TokenizerError::Build(e.to_string()))?;

        let tokenize_url = join_url(&config.base_url, &config.tokenize_path);
        let batch_url = join_url(&config.base_url, &config.batch_path);

        Ok(HttpTokenizer {
            client,
            config,
            tokenize_url,
            batch_url,
        })
    }

    pub fn tokenize_url(&self) -> &str {
        &self.tokenize_url
    }

    pub fn batch_url(&self) -> &str {
        &self.batch_url
    }

    fn request<'a>(&'a self, value: &'a str) -> TokenizeRequest<'a> {
        TokenizeRequest {
            tokengroup: &self.config.token_group,
            data: value,
            tokentemplate: &self.config.token_template,
        }
    }

    async fn post<T: serde::Serialize + ?Sized>(
        &self,
        url: &str,
        body: &T,
    ) -> Result<Vec<u8>, TokenizerError> {
        let resp = self
            .client
            .post(url)
            .basic_auth(&self.config.username, Some(&self.config.password))
            .json(body)
            .send()
            .await?;

        let status = resp.status();
        let bytes = resp.bytes().await?;

        if !status.is_success() {
            return Err(TokenizerError::Status {
                status: status.as_u16(),
                body: error_excerpt(&bytes),
            });
        }

        Ok(bytes.to_vec())
    }
}

#[async_trait]
impl TokenizationClient for HttpTokenizer {
    async fn tokenize_one(&self, value: &str) -> Result<String, TokenizerError> {
        let body = self.post(&self.tokenize_url, &self.request(value)).await?;
        wire::decode_one(&body)
    }

    async fn tokenize_many(&self, values: &[String]) -> Result<Vec<String>, TokenizerError> {
        if values.is_empty() {
            return Ok(Vec::new());
        }

        let items: Vec<TokenizeRequest<'_>> = values.iter().map(|v| self.request(v)).collect();
        debug!(count = items.len(), url = %self.batch_url, "Sending tokenization batch");

        let body = self.post(&self.batch_url, &items).await?;
        wire::decode_many(&body, values.len())
    }
}

/// First [`MAX_ERROR_BODY`] bytes of an error body, cut on a char boundary.
/// Services may echo the rejected value, so long digit runs are masked.
fn error_excerpt(bytes: &[u8]) -> String {
    let mut body = mask_digit_runs(&String::from_utf8_lossy(bytes));
    if body.len() > MAX_ERROR_BODY {
        let mut end = MAX_ERROR_BODY;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        body.truncate(end);
    }
    body
}

/// Replaces each digit of a run longer than four with `*`, keeping the run's
/// last four digits.
fn mask_digit_runs(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut i = 0;

    while i < chars.len() {
        if !chars[i].is_ascii_digit() {
            out.push(chars[i]);
            i += 1;
            continue;
        }

        let start = i;
        while i < chars.len() && chars[i].is_ascii_digit() {
            i += 1;
        }
        let run = &chars[start..i];
        if run.len() > 4 {
            out.extend(std::iter::repeat_n('*', run.len() - 4));
            out.extend(&run[run.len() - 4..]);
        } else {
            out.extend(run);
        }
    }

    out
}

fn join_url(base: &str, path: &str) -> String {
    let path = path.trim_start_matches('/');
    if path.is_empty() {
        return base.trim_end_matches('/').to_string();
    }
    format!("{}/{}", base.trim_end_matches('/'), path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::{
        io::{AsyncReadExt, AsyncWriteExt},
        net::TcpListener,
        task::JoinHandle,
    };

    /// Accepts a single connection, answers it with `status` and `body`, and
    /// returns the raw request it received.
    async fn one_shot_server(
        status: &'static str,
        body: &'static str,
    ) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = Vec::new();
            let mut chunk = [0u8; 4096];

            loop {
                let n = socket.read(&mut chunk).await.unwrap();
                if n == 0 {
                    break;
                }
                buf.extend_from_slice(&chunk[..n]);

                let text = String::from_utf8_lossy(&buf).into_owned();
                if let Some(header_end) = text.find("\r\n\r\n") {
                    let content_length = text[..header_end]
                        .lines()
                        .find_map(|l| {
                            let (name, value) = l.split_once(':')?;
                            name.eq_ignore_ascii_case("content-length")
                                .then(|| value.trim().parse::<usize>().ok())
                                .flatten()
                        })
                        .unwrap_or(0);
                    if buf.len() >= header_end + 4 + content_length {
                        break;
                    }
                }
            }

            let response = format!(
                "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();

            String::from_utf8_lossy(&buf).into_owned()
        });

        (format!("http://{addr}"), handle)
    }

    fn config(base_url: String) -> HttpTokenizerConfig {
        HttpTokenizerConfig {
            base_url,
            token_group: "cards".into(),
            token_template: "ccn".into(),
            username: "svc".into(),
            password: "secret".into(),
            accept_invalid_certs: false,
            timeout: Some(Duration::from_secs(5)),
            tokenize_path: "tokenize".into(),
            batch_path: "tokenize".into(),
        }
    }

    #[test]
    fn test_join_url() {
        assert_eq!(
            join_url("https://h:8443/", "/tokenize"),
            "https://h:8443/tokenize"
        );
        assert_eq!(
            join_url("https://h/api", "tokenize"),
            "https://h/api/tokenize"
        );
        assert_eq!(join_url("https://h/api/", ""), "https://h/api");
    }

    #[test]
    fn test_error_excerpt_respects_char_boundaries() {
        let body = "é".repeat(MAX_ERROR_BODY);
        let excerpt = error_excerpt(body.as_bytes());
        assert!(excerpt.len() <= MAX_ERROR_BODY);
        assert!(excerpt.chars().all(|c| c == 'é'));
    }

    #[test]
    fn test_error_excerpt_masks_card_numbers() {
        let body = br#"{"error":"invalid card number 4111111111111111","code":422}"#;
        assert_eq!(
            error_excerpt(body),
            r#"{"error":"invalid card number ************1111","code":422}"#
        );
    }

    #[test]
    fn test_mask_keeps_short_digit_runs() {
        assert_eq!(mask_digit_runs("row 42 at 2026"), "row 42 at 2026");
        assert_eq!(mask_digit_runs("12345"), "*2345");
        assert_eq!(mask_digit_runs(""), "");
    }

    #[test]
    fn test_debug_redacts_password() {
        let dbg = format!("{:?}", config("http://localhost".into()));
        assert!(!dbg.contains("secret"));
        assert!(dbg.contains("<redacted>"));
    }

    #[tokio::test]
    async fn test_tokenize_one_sends_basic_auth_and_payload() {
        let (base, server) = one_shot_server("200 OK", r#"{"token":"TOK-1"}"#).await;
        let client = HttpTokenizer::new(config(base)).unwrap();

        let token = client.tokenize_one("4111111111111111").await.unwrap();
        assert_eq!(token, "TOK-1");

        let request = server.await.unwrap();
        assert!(request.starts_with("POST /tokenize HTTP/1.1"));
        assert!(
            request
                .to_ascii_lowercase()
                .contains("authorization: basic c3zjonnly3jlda==")
        );
        assert!(request.contains(r#""tokengroup":"cards""#));
        assert!(request.contains(r#""data":"4111111111111111""#));
        assert!(request.contains(r#""tokentemplate":"ccn""#));
    }

    #[tokio::test]
    async fn test_tokenize_many_sends_ordered_array() {
        let (base, server) =
            one_shot_server("200 OK", r#"[{"token":"TOK-1"},{"token":"TOK-2"}]"#).await;
        let client = HttpTokenizer::new(config(base)).unwrap();

        let values = vec!["4111111111111111".to_string(), "4222222222222222".to_string()];
        let tokens = client.tokenize_many(&values).await.unwrap();
        assert_eq!(tokens, vec!["TOK-1", "TOK-2"]);

        let request = server.await.unwrap();
        let first = request.find("4111111111111111").unwrap();
        let second = request.find("4222222222222222").unwrap();
        assert!(first < second);
    }

    #[tokio::test]
    async fn test_non_success_status_is_an_error() {
        let (base, server) =
            one_shot_server("500 Internal Server Error", r#"{"error":"boom"}"#).await;
        let client = HttpTokenizer::new(config(base)).unwrap();

        let err = client.tokenize_one("4111").await.unwrap_err();
        assert!(matches!(err, TokenizerError::Status { status: 500, .. }));
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_rejected_value_is_masked_in_status_error() {
        let (base, server) = one_shot_server(
            "422 Unprocessable Entity",
            r#"{"error":"invalid card number 4111111111111111"}"#,
        )
        .await;
        let client = HttpTokenizer::new(config(base)).unwrap();

        let err = client.tokenize_one("4111111111111111").await.unwrap_err();
        let text = err.to_string();
        assert!(!text.contains("4111111111111111"));
        assert!(text.contains("************1111"));
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_empty_batch_makes_no_call() {
        // Nothing listens on this address; a request would fail.
        let client = HttpTokenizer::new(config("http://127.0.0.1:9".into())).unwrap();
        assert!(client.tokenize_many(&[]).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_connection_refused_is_transport_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = HttpTokenizer::new(config(format!("http://{addr}"))).unwrap();
        let err = client.tokenize_one("4111").await.unwrap_err();
        assert!(matches!(err, TokenizerError::Transport(_)));
    }
}
