use tokio::sync::watch;
use crate::core::context::OracleContext;
use crate::core::state_machine::{CyclePhase, CycleStateMachine};
use crate::error::{Error, Result};
use crate::observability::metrics;
use crate::relay::Receipt;
use crate::types::price::LedgerPrice;
use crate::utils::helper::format_timestamp_ms;

/// How a cycle ended. Only `Completed` and `PartialSuccess` moved the
/// checkpoint forward.
#[derive(Debug)]
pub enum CycleOutcome {
    Completed {
        price: LedgerPrice,
        update: Receipt,
        follow_up: Receipt,
    },
    /// The price landed but the follow-up action did not.
    PartialSuccess {
        price: LedgerPrice,
        update: Receipt,
        follow_up_error: Error,
    },
    UpdateFailed {
        price: LedgerPrice,
        error: Error,
    },
    ConsensusInvalid(Error),
    DeadlineExceeded,
    Aborted(Error),
}

/// Filled in once the price update is accepted. It lives outside the cycle
/// future so a cycle cancelled during the follow-up still knows the price
/// reached the ledger.
pub type UpdateProgress = watch::Sender<Option<(LedgerPrice, Receipt)>>;

impl CycleOutcome {
    /// Outcome of a cycle cut off at its deadline.
    pub fn cancelled(progress: Option<(LedgerPrice, Receipt)>) -> Self {
        match progress {
            Some((price, update)) => CycleOutcome::PartialSuccess {
                price,
                update,
                follow_up_error: Error::Timeout(
                    "follow-up cancelled at cycle deadline".to_string(),
                ),
            },
            None => CycleOutcome::DeadlineExceeded,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            CycleOutcome::Completed { .. } => "completed",
            CycleOutcome::PartialSuccess { .. } => "partial_success",
            CycleOutcome::UpdateFailed { .. } => "update_failed",
            CycleOutcome::ConsensusInvalid(_) => "consensus_invalid",
            CycleOutcome::DeadlineExceeded => "deadline_exceeded",
            CycleOutcome::Aborted(_) => "aborted",
        }
    }

    /// True when the price update reached the ledger.
    pub fn price_relayed(&self) -> bool {
        matches!(
            self,
            CycleOutcome::Completed { .. } | CycleOutcome::PartialSuccess { .. }
        )
    }

    pub fn log(&self) {
        match self {
            CycleOutcome::Completed { price, update, follow_up } => tracing::info!(
                price = %price,
                update_tx = %update.transaction_id,
                follow_up_tx = %follow_up.transaction_id,
                "Update complete"
            ),
            CycleOutcome::PartialSuccess { price, update, follow_up_error } => tracing::warn!(
                price = %price,
                update_tx = %update.transaction_id,
                error = %follow_up_error,
                "Update went through, but follow-up action failed"
            ),
            CycleOutcome::UpdateFailed { price, error } => tracing::error!(
                price = %price,
                error = %error,
                "Update completely failed"
            ),
            CycleOutcome::ConsensusInvalid(error) => tracing::error!(
                error = %error,
                "Price fetch completely failed"
            ),
            CycleOutcome::DeadlineExceeded => tracing::error!("Cycle cancelled at deadline"),
            CycleOutcome::Aborted(error) => tracing::error!(error = %error, "Cycle aborted"),
        }
    }
}

/// Sample, aggregate and relay once.
///
/// `started_at_ms` is what gets checkpointed when the update lands.
pub async fn run_cycle(ctx: &OracleContext, started_at_ms: i64) -> CycleOutcome {
    let (progress, _) = watch::channel(None);
    run_cycle_tracked(ctx, started_at_ms, &progress).await
}

/// Like [`run_cycle`], reporting the accepted update through `progress`.
pub async fn run_cycle_tracked(
    ctx: &OracleContext,
    started_at_ms: i64,
    progress: &UpdateProgress,
) -> CycleOutcome {
    let mut machine = CycleStateMachine::new();
    match drive(ctx, started_at_ms, progress, &mut machine).await {
        Ok(outcome) => outcome,
        Err(e) => CycleOutcome::Aborted(e),
    }
}

async fn drive(
    ctx: &OracleContext,
    started_at_ms: i64,
    progress: &UpdateProgress,
    machine: &mut CycleStateMachine,
) -> Result<CycleOutcome> {
    tracing::info!(started = %format_timestamp_ms(started_at_ms), "Starting cycle");

    // Step 1: Sample every quote the derivation needs
    machine.advance(CyclePhase::Sampling)?;
    let sets = ctx
        .sampler
        .sample_catalog(&ctx.catalog, &ctx.aggregator.quotes())
        .await;

    // Step 2: Reduce to one fixed-point price
    machine.advance(CyclePhase::Aggregating)?;
    let consensus = match ctx.aggregator.aggregate(&sets) {
        Ok(consensus) => consensus,
        Err(e) => {
            machine.advance(CyclePhase::Idle)?;
            return Ok(CycleOutcome::ConsensusInvalid(e));
        }
    };
    tracing::info!(
        samples = consensus.sample_count,
        price = %consensus.ledger_price,
        value = consensus.value,
        "Fetched prices"
    );

    // Step 3: Price update, checkpoint, then the dependent follow-up
    machine.advance(CyclePhase::Relaying)?;
    let price = consensus.ledger_price;
    let update = match ctx.relay.submit(&ctx.actions.price_update(price)).await {
        Ok(receipt) => receipt,
        Err(error) => {
            machine.advance(CyclePhase::Idle)?;
            return Ok(CycleOutcome::UpdateFailed { price, error });
        }
    };
    metrics::LAST_RELAYED_PRICE.set(price.to_i64());
    progress.send_replace(Some((price, update.clone())));

    if let Err(e) = ctx.checkpoint.store(started_at_ms).await {
        tracing::error!(error = %e, "Could not save checkpoint");
    }

    let outcome = match ctx.relay.submit(&ctx.actions.follow_up()).await {
        Ok(follow_up) => CycleOutcome::Completed {
            price,
            update,
            follow_up,
        },
        Err(follow_up_error) => CycleOutcome::PartialSuccess {
            price,
            update,
            follow_up_error,
        },
    };

    machine.advance(CyclePhase::Idle)?;
    Ok(outcome)
}
