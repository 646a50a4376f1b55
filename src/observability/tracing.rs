use tracing::Span;
use tracing_subscriber::EnvFilter;
use crate::types::ids::CycleId;

/// Installs the global subscriber. `RUST_LOG` overrides the default filter.
pub fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,price_relay=info"));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

pub fn trace_cycle(cycle_id: &CycleId, started_at_ms: i64) -> Span {
    tracing::info_span!(
        "oracle_cycle",
        cycle_id = %cycle_id,
        started_at_ms,
    )
}
