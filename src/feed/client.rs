use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use super::FeedError;

/// Anything that can fetch a JSON document by URL.
#[async_trait]
pub trait FeedSource: Send + Sync {
    async fn fetch_json(&self, url: &str) -> Result<Value, FeedError>;
}

/// Fetches feeds over HTTP(S).
#[derive(Clone)]
pub struct HttpFeedSource {
    client: Client,
}

impl HttpFeedSource {
    /// Every request made through this source is abandoned after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("quakemap/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }

    fn request_error(url: &str, source: reqwest::Error) -> FeedError {
        if source.is_timeout() {
            FeedError::Timeout { url: url.to_string() }
        } else {
            FeedError::Http { url: url.to_string(), source }
        }
    }
}

#[async_trait]
impl FeedSource for HttpFeedSource {
    async fn fetch_json(&self, url: &str) -> Result<Value, FeedError> {
        debug!(url, "fetching feed");
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| Self::request_error(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| Self::request_error(url, e))?;
        debug!(url, bytes = body.len(), "feed downloaded");

        serde_json::from_slice(&body).map_err(|source| FeedError::Decode {
            url: url.to_string(),
            source,
        })
    }
}
