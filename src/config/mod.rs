use std::path::PathBuf;
use std::time::Duration;
use serde::{Deserialize, Serialize};

pub mod catalog;
pub mod ledger;
pub mod loader;

pub use catalog::{Catalog, DerivationConfig, Provider};
pub use ledger::{Endpoint, FollowUpActionConfig, LedgerConfig, UpdateActionConfig};
pub use loader::AppConfig;

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ScheduleConfig {
    pub period_secs: u64,
    /// Cycles still running after this long are cancelled.
    pub cycle_deadline_secs: u64,
    pub fetch_timeout_secs: u64,
}

impl ScheduleConfig {
    pub fn period(&self) -> Duration {
        Duration::from_secs(self.period_secs)
    }

    pub fn cycle_deadline(&self) -> Duration {
        Duration::from_secs(self.cycle_deadline_secs)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        ScheduleConfig {
            period_secs: 300,          // 5 minutes
            cycle_deadline_secs: 240,
            fetch_timeout_secs: 10,
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct StateConfig {
    pub checkpoint_path: PathBuf,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct LoggingConfig {
    #[serde(default)]
    pub json: bool,
}

/// Prometheus scrape endpoint. Not served when `listen` is unset.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct MetricsConfig {
    #[serde(default)]
    pub listen: Option<String>,
}
