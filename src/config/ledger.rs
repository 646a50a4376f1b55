use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Ledger RPC address. Order in `LedgerConfig::endpoints` is preference order.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(transparent)]
pub struct Endpoint(pub String);

impl Endpoint {
    pub fn new(url: impl Into<String>) -> Self {
        Endpoint(url.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct LedgerConfig {
    pub endpoints: Vec<Endpoint>,
    /// Account that hosts the oracle contract.
    pub contract: String,
    pub expire_seconds: u32,
    pub blocks_behind: u32,
    pub attempt_timeout_secs: u64,
    pub update: UpdateActionConfig,
    pub follow_up: FollowUpActionConfig,
}

impl LedgerConfig {
    pub fn attempt_timeout(&self) -> Duration {
        Duration::from_secs(self.attempt_timeout_secs)
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct UpdateActionConfig {
    pub name: String,
    pub actor: String,
    pub permission: String,
    /// Payload field that carries the fixed-point price.
    pub price_field: String,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct FollowUpActionConfig {
    pub name: String,
    pub actor: String,
    pub permission: String,
    #[serde(default = "default_follow_up_data")]
    pub data: serde_json::Value,
}

fn default_follow_up_data() -> serde_json::Value {
    serde_json::json!({ "max": 50 })
}
