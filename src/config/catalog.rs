use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One price source: where to fetch and where the number lives in the reply.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Provider {
    pub url: String,
    /// Slash-delimited object keys / array indices, e.g. `result/XXBTZUSD/c/0`.
    #[serde(default)]
    pub path: String,
}

impl Provider {
    pub fn new(url: impl Into<String>, path: impl Into<String>) -> Self {
        Provider {
            url: url.into(),
            path: path.into(),
        }
    }
}

/// Quote name -> ordered providers.
pub type Catalog = BTreeMap<String, Vec<Provider>>;

/// How the relayed price is composed from quote medians.
///
/// Each route is a product of quote consensus values; the relayed value is
/// the median over all routes.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct DerivationConfig {
    pub routes: Vec<Vec<String>>,
    #[serde(default = "default_scale")]
    pub scale: u32,
}

fn default_scale() -> u32 {
    crate::types::price::LedgerPrice::DEFAULT_SCALE
}

impl DerivationConfig {
    /// Quotes referenced by any route, deduplicated.
    pub fn referenced_quotes(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .routes
            .iter()
            .flatten()
            .map(|q| q.as_str())
            .collect();
        names.sort_unstable();
        names.dedup();
        names
    }
}
