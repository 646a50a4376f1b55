pub mod aggregator;
pub mod connectors;
pub mod extract;
pub mod sampler;

use crate::error::Error;

/// One price observed from one provider in one cycle.
#[derive(Clone, Debug, PartialEq)]
pub struct Sample {
    pub url: String,
    pub price: f64,
}

/// Everything one quote produced in one cycle.
///
/// Every provider lands in exactly one of `samples` or `failures`.
#[derive(Debug)]
pub struct SampleSet {
    pub quote: String,
    pub samples: Vec<Sample>,
    /// `Error::SourceFetch` per failed provider.
    pub failures: Vec<Error>,
}

impl SampleSet {
    pub fn values(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.price).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn provider_count(&self) -> usize {
        self.samples.len() + self.failures.len()
    }
}
