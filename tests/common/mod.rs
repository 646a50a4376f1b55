#![allow(dead_code)]

use async_trait::async_trait;
use price_relay::config::{AppConfig, Endpoint};
use price_relay::core::OracleContext;
use price_relay::error::{Error, Result};
use price_relay::interfaces::{CheckpointStore, LedgerSubmitter};
use price_relay::price_infra::connectors::PriceFetcher;
use price_relay::relay::{SubmissionAction, ValidityWindow};
use price_relay::types::ids::TransactionId;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const BTC_A: &str = "https://a.example/btc";
pub const BTC_B: &str = "https://b.example/btc";
pub const EOS_BTC: &str = "https://a.example/eosbtc";
pub const EOS_USD: &str = "https://c.example/eosusd";

pub struct Timing {
    pub period_secs: u64,
    pub deadline_secs: u64,
    pub attempt_timeout_secs: u64,
}

impl Default for Timing {
    fn default() -> Self {
        Timing {
            period_secs: 60,
            deadline_secs: 50,
            attempt_timeout_secs: 5,
        }
    }
}

pub fn oracle_config(timing: Timing) -> AppConfig {
    let contents = format!(
        r#"
        [catalog]
        btc_usd = [
            {{ url = "{BTC_A}", path = "price" }},
            {{ url = "{BTC_B}", path = "data/amount" }},
        ]
        eos_btc = [{{ url = "{EOS_BTC}", path = "price" }}]
        eos_usd = [{{ url = "{EOS_USD}", path = "0/last" }}]

        [derivation]
        routes = [["btc_usd", "eos_btc"], ["eos_usd"]]

        [ledger]
        endpoints = ["A", "B"]
        contract = "buckprotocol"
        attempt_timeout_secs = {attempt}

        [ledger.update]
        actor = "buckprotocol"

        [ledger.follow_up]
        actor = "scrugeoracle"

        [schedule]
        period_secs = {period}
        cycle_deadline_secs = {deadline}
        fetch_timeout_secs = 5
        "#,
        attempt = timing.attempt_timeout_secs,
        period = timing.period_secs,
        deadline = timing.deadline_secs,
    );
    AppConfig::from_toml_str(&contents).expect("test config must load")
}

/// btc_usd median 40050, eos_btc 0.0001, eos_usd 4.3: relayed price 415.
pub fn healthy_documents() -> HashMap<String, Value> {
    HashMap::from([
        (BTC_A.to_string(), json!({ "price": "40000.00" })),
        (BTC_B.to_string(), json!({ "data": { "amount": "40100.00" } })),
        (EOS_BTC.to_string(), json!({ "price": "0.00010000" })),
        (EOS_USD.to_string(), json!([{ "last": 4.3 }])),
    ])
}

/// Serves canned documents; unknown URLs fail.
pub struct StaticFetcher {
    documents: HashMap<String, Value>,
    calls: AtomicUsize,
}

impl StaticFetcher {
    pub fn new(documents: HashMap<String, Value>) -> Self {
        StaticFetcher {
            documents,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn healthy() -> Self {
        Self::new(healthy_documents())
    }

    pub fn unreachable() -> Self {
        Self::new(HashMap::new())
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PriceFetcher for StaticFetcher {
    async fn fetch_json(&self, url: &str) -> Result<Value> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.documents
            .get(url)
            .cloned()
            .ok_or_else(|| Error::Http(format!("connection refused: {}", url)))
    }
}

/// Records every push as `(endpoint, action name)`.
#[derive(Default)]
pub struct RecordingSubmitter {
    calls: Mutex<Vec<(String, String)>>,
    /// `(endpoint, action)` pairs that are rejected; `*` matches any endpoint.
    rejects: Vec<(String, String)>,
    latency: Duration,
    hang: bool,
}

impl RecordingSubmitter {
    pub fn accepting() -> Self {
        Self::default()
    }

    pub fn rejecting(mut self, endpoint: &str, action: &str) -> Self {
        self.rejects.push((endpoint.to_string(), action.to_string()));
        self
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn hanging(mut self) -> Self {
        self.hang = true;
        self
    }

    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn action_names(&self) -> Vec<String> {
        self.calls().into_iter().map(|(_, action)| action).collect()
    }

    fn rejects(&self, endpoint: &str, action: &str) -> bool {
        self.rejects
            .iter()
            .any(|(e, a)| (e == "*" || e == endpoint) && a == action)
    }
}

#[async_trait]
impl LedgerSubmitter for RecordingSubmitter {
    async fn submit(
        &self,
        endpoint: &Endpoint,
        action: &SubmissionAction,
        _validity: &ValidityWindow,
    ) -> Result<TransactionId> {
        self.calls
            .lock()
            .unwrap()
            .push((endpoint.to_string(), action.name.clone()));

        if self.hang {
            std::future::pending::<()>().await;
        }
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        if self.rejects(endpoint.as_str(), &action.name) {
            Err(Error::Submission {
                endpoint: endpoint.to_string(),
                reason: "transaction declared invalid".to_string(),
            })
        } else {
            Ok(TransactionId::new(format!("{}-{}", action.name, endpoint)))
        }
    }
}

#[derive(Default)]
pub struct MemoryCheckpoint {
    value: Mutex<Option<i64>>,
    stores: AtomicUsize,
}

impl MemoryCheckpoint {
    pub fn with_value(ms: i64) -> Self {
        MemoryCheckpoint {
            value: Mutex::new(Some(ms)),
            stores: AtomicUsize::new(0),
        }
    }

    pub fn value(&self) -> Option<i64> {
        *self.value.lock().unwrap()
    }

    pub fn stores(&self) -> usize {
        self.stores.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CheckpointStore for MemoryCheckpoint {
    async fn load(&self) -> Option<i64> {
        self.value()
    }

    async fn store(&self, submitted_at_ms: i64) -> Result<()> {
        *self.value.lock().unwrap() = Some(submitted_at_ms);
        self.stores.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

pub fn context(
    config: &AppConfig,
    fetcher: Arc<StaticFetcher>,
    submitter: Arc<RecordingSubmitter>,
    checkpoint: Arc<MemoryCheckpoint>,
) -> Arc<OracleContext> {
    Arc::new(OracleContext::new(config, fetcher, submitter, checkpoint))
}

/// Panics on load, taking the scheduler task down with it.
pub struct BrokenCheckpoint;

#[async_trait]
impl CheckpointStore for BrokenCheckpoint {
    async fn load(&self) -> Option<i64> {
        panic!("checkpoint backend unavailable");
    }

    async fn store(&self, _submitted_at_ms: i64) -> Result<()> {
        Ok(())
    }
}
