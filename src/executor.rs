use std::time::Duration;

use bytes::Bytes;
use reqwest::header::{self, HeaderMap};
use reqwest::StatusCode;
use url::Url;

use crate::error::{SuiteError, SuiteResult};

/// Connect and read budgets for one class of request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub connect: Duration,
    pub read: Duration,
}

impl Timeouts {
    pub const fn from_secs(connect: u64, read: u64) -> Self {
        Self {
            connect: Duration::from_secs(connect),
            read: Duration::from_secs(read),
        }
    }
}

/// A fully buffered map response
#[derive(Debug, Clone)]
pub struct MapResponse {
    pub url: Url,
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl MapResponse {
    pub fn ensure_ok(&self) -> SuiteResult<()> {
        if self.status == StatusCode::OK {
            Ok(())
        } else {
            Err(SuiteError::UnexpectedStatus {
                url: self.url.to_string(),
                status: self.status.as_u16(),
            })
        }
    }

    pub fn content_type(&self) -> Option<&str> {
        self.headers
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
    }
}

/// Issues GET requests for map images. No retries: transport failures and
/// status codes go back to the caller untouched.
#[derive(Debug, Clone)]
pub struct MapRequestExecutor {
    client: reqwest::Client,
    accept: String,
}

impl MapRequestExecutor {
    pub fn new(timeouts: Timeouts, accept: impl Into<String>) -> SuiteResult<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(timeouts.connect)
            .read_timeout(timeouts.read)
            .build()
            .map_err(|e| SuiteError::from_reqwest("<client>", e))?;

        Ok(Self {
            client,
            accept: accept.into(),
        })
    }

    pub async fn execute(&self, url: &Url) -> SuiteResult<MapResponse> {
        tracing::debug!(%url, accept = %self.accept, "GET");

        let response = self
            .client
            .get(url.clone())
            .header(header::ACCEPT, &self.accept)
            .send()
            .await
            .map_err(|e| SuiteError::from_reqwest(url.as_str(), e))?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .bytes()
            .await
            .map_err(|e| SuiteError::from_reqwest(url.as_str(), e))?;

        tracing::debug!(%url, status = status.as_u16(), bytes = body.len(), "Response received");

        Ok(MapResponse {
            url: url.clone(),
            status,
            headers,
            body,
        })
    }
}
