use serde::Serialize;
use thiserror::Error;

use crate::color::ColorError;

#[derive(Debug, Error)]
pub enum SuiteError {
    #[error("Transport error requesting {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Request to {url} timed out")]
    Timeout { url: String },

    #[error("Expected HTTP 200 from {url}, got {status}")]
    UnexpectedStatus { url: String, status: u16 },

    #[error("Response from {url} is not a decodable image: {source}")]
    Decode {
        url: String,
        #[source]
        source: image::ImageError,
    },

    #[error("Color resolution error: {0}")]
    Color(#[from] ColorError),

    #[error("Malformed JSON from {url}: {source}")]
    Json {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Blocking task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Broad classification of why a case or test failed, used in reports so a
/// reader can tell "wrong content" from "wrong color" at a glance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailureCause {
    Assertion,
    Status,
    Transport,
    Timeout,
    Decode,
    ColorResolution,
    Discovery,
    Internal,
}

impl SuiteError {
    /// Wrap a reqwest error, keeping timeouts apart from other transport failures.
    pub fn from_reqwest(url: &str, source: reqwest::Error) -> Self {
        if source.is_timeout() {
            SuiteError::Timeout {
                url: url.to_string(),
            }
        } else {
            SuiteError::Transport {
                url: url.to_string(),
                source,
            }
        }
    }

    pub fn cause(&self) -> FailureCause {
        match self {
            SuiteError::Transport { .. } => FailureCause::Transport,
            SuiteError::Timeout { .. } => FailureCause::Timeout,
            SuiteError::UnexpectedStatus { .. } => FailureCause::Status,
            SuiteError::Decode { .. } => FailureCause::Decode,
            SuiteError::Color(_) => FailureCause::ColorResolution,
            SuiteError::Json { .. } | SuiteError::Url(_) => FailureCause::Discovery,
            SuiteError::Config(_) | SuiteError::Task(_) => FailureCause::Internal,
        }
    }
}

pub type SuiteResult<T> = Result<T, SuiteError>;
