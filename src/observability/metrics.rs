use lazy_static::lazy_static;
use prometheus::{
    Encoder, Histogram, HistogramOpts, IntCounter, IntCounterVec, IntGauge, Opts, Registry,
    TextEncoder,
};

lazy_static! {
    pub static ref REGISTRY: Registry = Registry::new();

    // Cycle metrics
    pub static ref CYCLES: IntCounterVec = IntCounterVec::new(
        Opts::new("oracle_cycles_total", "Oracle cycles by outcome"),
        &["outcome"]
    ).unwrap();

    pub static ref TICKS_SKIPPED: IntCounter = IntCounter::new(
        "oracle_ticks_skipped_total",
        "Ticks skipped because a cycle was still in flight"
    ).unwrap();

    pub static ref CYCLE_LATENCY: Histogram = Histogram::with_opts(
        HistogramOpts::new(
            "oracle_cycle_duration_seconds",
            "Wall time of one oracle cycle"
        ).buckets(vec![0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0, 120.0, 300.0])
    ).unwrap();

    // Sampling metrics
    pub static ref SOURCE_FETCH_FAILURES: IntCounter = IntCounter::new(
        "oracle_source_fetch_failures_total",
        "Provider fetches dropped from a sample set"
    ).unwrap();

    // Relay metrics
    pub static ref SUBMISSION_ATTEMPTS: IntCounter = IntCounter::new(
        "oracle_submission_attempts_total",
        "Ledger submission attempts across all endpoints"
    ).unwrap();

    pub static ref SUBMISSION_FAILOVERS: IntCounter = IntCounter::new(
        "oracle_submission_failovers_total",
        "Times a submission moved on to the next endpoint"
    ).unwrap();

    pub static ref LAST_RELAYED_PRICE: IntGauge = IntGauge::new(
        "oracle_last_relayed_price",
        "Fixed-point price of the last accepted update"
    ).unwrap();
}

pub fn register_metrics() -> prometheus::Result<()> {
    REGISTRY.register(Box::new(CYCLES.clone()))?;
    REGISTRY.register(Box::new(TICKS_SKIPPED.clone()))?;
    REGISTRY.register(Box::new(CYCLE_LATENCY.clone()))?;
    REGISTRY.register(Box::new(SOURCE_FETCH_FAILURES.clone()))?;
    REGISTRY.register(Box::new(SUBMISSION_ATTEMPTS.clone()))?;
    REGISTRY.register(Box::new(SUBMISSION_FAILOVERS.clone()))?;
    REGISTRY.register(Box::new(LAST_RELAYED_PRICE.clone()))?;
    Ok(())
}

/// Prometheus text exposition of everything registered.
pub fn render() -> String {
    let mut buffer = Vec::new();
    if let Err(e) = TextEncoder::new().encode(&REGISTRY.gather(), &mut buffer) {
        tracing::warn!(error = %e, "Could not encode metrics");
    }
    String::from_utf8(buffer).unwrap_or_default()
}
