//! HTTP poller for gold-api.com style endpoints (`GET {base}/price/{SYMBOL}`).

use async_trait::async_trait;
use serde_json::Value;

use super::{extract_price, PriceSource};
use crate::config::FeedConfig;
use crate::{Error, Result};

#[derive(Clone, Debug)]
pub struct GoldApiSource {
    client: reqwest::Client,
    feed: FeedConfig,
}

impl GoldApiSource {
    /// Build a source from the feed settings. No timeout is applied unless
    /// `request_timeout_secs` is set.
    pub fn new(feed: &FeedConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = feed.request_timeout() {
            builder = builder.timeout(timeout);
        }
        Ok(Self { client: builder.build()?, feed: feed.clone() })
    }

    pub fn url_for(&self, symbol: &str) -> String {
        self.feed.price_url(symbol)
    }
}

#[async_trait]
impl PriceSource for GoldApiSource {
    async fn fetch_price(&self, symbol: &str) -> Result<Option<f64>> {
        let url = self.url_for(symbol);
        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| Error::ConnectionError(e.to_string()))?;

        let body = resp.text().await.map_err(|e| Error::ConnectionError(e.to_string()))?;
        let value: Value = serde_json::from_str(&body)
            .map_err(|e| Error::DataError(format!("malformed JSON from {}: {}", url, e)))?;
        extract_price(&value)
    }
}
