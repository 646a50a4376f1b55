use futures::future::join_all;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use crate::config::{Catalog, Provider};
use crate::error::{Error, Result};
use crate::observability::metrics;
use crate::price_infra::connectors::PriceFetcher;
use crate::price_infra::extract::extract_price;
use crate::price_infra::{Sample, SampleSet};

/// Concurrent fan-out over all providers of a quote.
///
/// A failing provider never fails the quote; it is recorded in
/// `SampleSet::failures` and the remaining providers still count.
pub struct Sampler {
    fetcher: Arc<dyn PriceFetcher>,
    fetch_timeout: Duration,
}

impl Sampler {
    pub fn new(fetcher: Arc<dyn PriceFetcher>, fetch_timeout: Duration) -> Self {
        Sampler {
            fetcher,
            fetch_timeout,
        }
    }

    pub async fn sample_quote(&self, quote: &str, providers: &[Provider]) -> SampleSet {
        let results = join_all(providers.iter().map(|p| self.sample_provider(p))).await;

        let mut samples = Vec::with_capacity(providers.len());
        let mut failures = Vec::new();

        for (provider, result) in providers.iter().zip(results) {
            match result {
                Ok(price) => samples.push(Sample {
                    url: provider.url.clone(),
                    price,
                }),
                Err(e) => {
                    tracing::warn!(quote, url = %provider.url, error = %e, "Source dropped");
                    metrics::SOURCE_FETCH_FAILURES.inc();
                    failures.push(Error::SourceFetch {
                        url: provider.url.clone(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        tracing::debug!(
            quote,
            ok = samples.len(),
            failed = failures.len(),
            "Quote sampled"
        );

        SampleSet {
            quote: quote.to_string(),
            samples,
            failures,
        }
    }

    /// Samples the named quotes concurrently. Names absent from the catalog
    /// yield an empty `SampleSet`.
    pub async fn sample_catalog(
        &self,
        catalog: &Catalog,
        quotes: &[&str],
    ) -> BTreeMap<String, SampleSet> {
        let sets = join_all(quotes.iter().map(|&quote| {
            let providers = catalog.get(quote).map(Vec::as_slice).unwrap_or(&[]);
            self.sample_quote(quote, providers)
        }))
        .await;

        sets.into_iter().map(|set| (set.quote.clone(), set)).collect()
    }

    async fn sample_provider(&self, provider: &Provider) -> Result<f64> {
        let document = tokio::time::timeout(self.fetch_timeout, self.fetcher.fetch_json(&provider.url))
            .await
            .map_err(|_| Error::Timeout(format!("fetch exceeded {:?}", self.fetch_timeout)))??;

        extract_price(&document, &provider.path)
    }
}
