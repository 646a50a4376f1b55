use std::collections::BTreeMap;
use crate::config::DerivationConfig;
use crate::error::{Error, Result};
use crate::price_infra::SampleSet;
use crate::types::price::LedgerPrice;

/// Result of reducing one cycle's samples to the relayed price.
#[derive(Clone, Debug, PartialEq)]
pub struct Consensus {
    pub quote_medians: BTreeMap<String, f64>,
    /// One candidate per configured route, in route order.
    pub route_values: Vec<f64>,
    pub value: f64,
    pub ledger_price: LedgerPrice,
    pub sample_count: usize,
}

pub struct PriceAggregator {
    derivation: DerivationConfig,
}

impl PriceAggregator {
    pub fn new(derivation: DerivationConfig) -> Self {
        PriceAggregator { derivation }
    }

    pub fn scale(&self) -> u32 {
        self.derivation.scale
    }

    /// Quotes that must be sampled each cycle.
    pub fn quotes(&self) -> Vec<&str> {
        self.derivation.referenced_quotes()
    }

    pub fn aggregate(&self, sets: &BTreeMap<String, SampleSet>) -> Result<Consensus> {
        // Step 1: Median per referenced quote
        let mut quote_medians = BTreeMap::new();
        for quote in self.derivation.referenced_quotes() {
            let set = sets.get(quote).ok_or_else(|| {
                Error::ConsensusInvalid(format!("quote {} was not sampled", quote))
            })?;
            let value = median(&set.values()).map_err(|_| {
                Error::ConsensusInvalid(format!(
                    "quote {} has no usable samples ({} providers failed)",
                    quote,
                    set.failures.len()
                ))
            })?;
            quote_medians.insert(quote.to_string(), value);
        }

        // Step 2: Product along each route
        let route_values = self
            .derivation
            .routes
            .iter()
            .map(|route| {
                let product: f64 = route.iter().map(|q| quote_medians[q.as_str()]).product();
                if product.is_finite() {
                    Ok(product)
                } else {
                    Err(Error::ConsensusInvalid(format!(
                        "route {:?} produced {}",
                        route, product
                    )))
                }
            })
            .collect::<Result<Vec<f64>>>()?;

        // Step 3: Median across routes, then fixed point
        let value = median(&route_values)?;
        let ledger_price = LedgerPrice::from_consensus(value, self.derivation.scale)?;

        Ok(Consensus {
            sample_count: sets.values().map(|s| s.samples.len()).sum(),
            quote_medians,
            route_values,
            value,
            ledger_price,
        })
    }
}

/// Median of the finite values; even counts average the two middle values.
pub fn median(values: &[f64]) -> Result<f64> {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if sorted.is_empty() {
        return Err(Error::ConsensusInvalid("no finite samples".to_string()));
    }
    sorted.sort_by(|a, b| a.total_cmp(b));

    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Ok((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Ok(sorted[mid])
    }
}
