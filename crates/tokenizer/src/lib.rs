pub mod client;
pub mod error;
pub mod http;
pub mod wire;

pub use client::TokenizationClient;
pub use error::TokenizerError;
pub use http::{HttpTokenizer, HttpTokenizerConfig};
