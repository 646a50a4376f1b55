use std::sync::Arc;
use crate::config::{AppConfig, Catalog, ScheduleConfig};
use crate::interfaces::{CheckpointStore, LedgerSubmitter};
use crate::price_infra::aggregator::PriceAggregator;
use crate::price_infra::connectors::PriceFetcher;
use crate::price_infra::sampler::Sampler;
use crate::relay::actions::validity_window;
use crate::relay::{ActionTemplates, Relay};

/// Everything a cycle needs, built once at startup and shared read-only.
pub struct OracleContext {
    pub catalog: Catalog,
    pub sampler: Sampler,
    pub aggregator: PriceAggregator,
    pub relay: Relay,
    pub actions: ActionTemplates,
    pub checkpoint: Arc<dyn CheckpointStore>,
    pub schedule: ScheduleConfig,
}

impl OracleContext {
    pub fn new(
        config: &AppConfig,
        fetcher: Arc<dyn PriceFetcher>,
        submitter: Arc<dyn LedgerSubmitter>,
        checkpoint: Arc<dyn CheckpointStore>,
    ) -> Self {
        OracleContext {
            catalog: config.catalog.clone(),
            sampler: Sampler::new(fetcher, config.schedule.fetch_timeout()),
            aggregator: PriceAggregator::new(config.derivation.clone()),
            relay: Relay::new(
                submitter,
                config.ledger.endpoints.clone(),
                validity_window(&config.ledger),
                config.ledger.attempt_timeout(),
            ),
            actions: ActionTemplates::from_config(&config.ledger),
            checkpoint,
            schedule: config.schedule.clone(),
        }
    }
}
