use std::sync::Arc;
use anyhow::Context;
use tokio::sync::watch;
use price_relay::api;
use price_relay::config::AppConfig;
use price_relay::core::{OracleContext, Scheduler};
use price_relay::observability::metrics;
use price_relay::observability::tracing::init_tracing;
use price_relay::persistence::FileCheckpointStore;
use price_relay::price_infra::connectors::HttpFetcher;
use price_relay::relay::HttpSubmitter;
use price_relay::{DEFAULT_ENV, ENV_VAR};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env = std::env::var(ENV_VAR).unwrap_or_else(|_| DEFAULT_ENV.to_string());
    let config = AppConfig::load(&env).context("loading configuration")?;

    init_tracing(config.logging.json);
    metrics::register_metrics().context("registering metrics")?;
    tracing::info!(env = %env, config = %config.digest(), "Starting price relay");

    let fetcher = Arc::new(HttpFetcher::new(config.schedule.fetch_timeout())?);
    let submitter = Arc::new(HttpSubmitter::new(config.ledger.attempt_timeout())?);
    let checkpoint = Arc::new(FileCheckpointStore::new(&config.state.checkpoint_path));
    let ctx = Arc::new(OracleContext::new(&config, fetcher, submitter, checkpoint));

    let (shutdown_tx, _) = watch::channel(false);
    if let Some(listen) = config.metrics.listen.clone() {
        let shutdown_rx = shutdown_tx.subscribe();
        tokio::spawn(async move {
            if let Err(e) = api::serve(&listen, shutdown_rx).await {
                tracing::error!(error = %e, listen = %listen, "Metrics endpoint stopped");
            }
        });
    }

    let ctrl_c = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => tracing::info!("Received CTRL+C, shutting down"),
            Err(e) => tracing::error!(error = %e, "Failed to listen for CTRL+C"),
        }
    };

    let stats = Scheduler::new(ctx)
        .supervise(shutdown_tx, ctrl_c)
        .await
        .context("scheduler stopped")?;
    tracing::info!(
        cycles = stats.cycles_started,
        skipped = stats.ticks_skipped,
        "Price relay stopped"
    );
    Ok(())
}
