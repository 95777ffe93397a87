use crate::error::ConfigError;
use serde::Deserialize;
use std::{fmt, time::Duration};
use tokenizer::HttpTokenizerConfig;
use url::Url;

fn default_path() -> String {
    "tokenize".into()
}

fn default_accept_invalid_certs() -> bool {
    true
}

#[derive(Clone, Deserialize)]
pub struct TokenizationSettings {
    pub base_url: String,
    pub token_group: String,
    pub token_template: String,
    #[serde(default)]
    pub tokenize_user: String,
    #[serde(default)]
    pub tokenize_password: String,
    #[serde(default = "default_accept_invalid_certs")]
    pub accept_invalid_certs: bool,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    #[serde(default = "default_path")]
    pub tokenize_path: String,
    #[serde(default = "default_path")]
    pub batch_path: String,
}

impl TokenizationSettings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = Url::parse(&self.base_url).map_err(|e| {
            ConfigError::Invalid(format!("tokenization.base_url '{}': {e}", self.base_url))
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::Invalid(format!(
                "tokenization.base_url must be http or https, got '{}'",
                url.scheme()
            )));
        }
        if self.token_group.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "tokenization.token_group is required".into(),
            ));
        }
        if self.token_template.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "tokenization.token_template is required".into(),
            ));
        }
        if self.timeout_secs == Some(0) {
            return Err(ConfigError::Invalid(
                "tokenization.timeout_secs must be positive".into(),
            ));
        }
        Ok(())
    }

    pub fn client_config(&self) -> HttpTokenizerConfig {
        HttpTokenizerConfig {
            base_url: self.base_url.clone(),
            token_group: self.token_group.clone(),
            token_template: self.token_template.clone(),
            username: self.tokenize_user.clone(),
            password: self.tokenize_password.clone(),
            accept_invalid_certs: self.accept_invalid_certs,
            timeout: self.timeout_secs.map(Duration::from_secs),
            tokenize_path: self.tokenize_path.clone(),
            batch_path: self.batch_path.clone(),
        }
    }
}

impl fmt::Debug for TokenizationSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenizationSettings")
            .field("base_url", &self.base_url)
            .field("token_group", &self.token_group)
            .field("token_template", &self.token_template)
            .field("tokenize_user", &self.tokenize_user)
            .field("tokenize_password", &"<redacted>")
            .field("accept_invalid_certs", &self.accept_invalid_certs)
            .field("timeout_secs", &self.timeout_secs)
            .field("tokenize_path", &self.tokenize_path)
            .field("batch_path", &self.batch_path)
            .finish()
    }
}
