use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use crate::error::Result;
use crate::price_infra::connectors::PriceFetcher;

/// Fetches price documents over HTTPS.
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("price-relay/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(HttpFetcher { client })
    }
}

#[async_trait]
impl PriceFetcher for HttpFetcher {
    async fn fetch_json(&self, url: &str) -> Result<serde_json::Value> {
        let response = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?;

        let document = response.json::<serde_json::Value>().await?;
        Ok(document)
    }
}
