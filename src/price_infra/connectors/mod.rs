pub mod http;

use async_trait::async_trait;
use crate::error::Result;

pub use http::HttpFetcher;

/// One-shot fetch of a JSON document.
#[async_trait]
pub trait PriceFetcher: Send + Sync {
    async fn fetch_json(&self, url: &str) -> Result<serde_json::Value>;
}
