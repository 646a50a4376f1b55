pub mod actions;
pub mod http;

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use crate::config::Endpoint;
use crate::error::{Error, Result};
use crate::interfaces::LedgerSubmitter;
use crate::observability::metrics;
use crate::types::ids::TransactionId;

pub use actions::ActionTemplates;
pub use http::HttpSubmitter;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Authorization {
    pub actor: String,
    pub permission: String,
}

/// Description of one ledger state change.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SubmissionAction {
    pub account: String,
    pub name: String,
    pub authorization: Authorization,
    pub data: serde_json::Value,
}

/// Validity horizon attached to every push so a late attempt is rejected by
/// the ledger instead of applied.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidityWindow {
    pub expire_seconds: u32,
    pub blocks_behind: u32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Receipt {
    pub transaction_id: TransactionId,
    pub endpoint: Endpoint,
    pub attempts: usize,
}

/// Endpoint failover for one action.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FailoverState {
    Trying(usize),
    Done { index: usize, transaction_id: TransactionId },
    Exhausted,
}

impl FailoverState {
    pub fn start(endpoint_count: usize) -> Self {
        if endpoint_count == 0 {
            FailoverState::Exhausted
        } else {
            FailoverState::Trying(0)
        }
    }

    pub fn on_success(self, transaction_id: TransactionId) -> Self {
        match self {
            FailoverState::Trying(index) => FailoverState::Done { index, transaction_id },
            terminal => terminal,
        }
    }

    pub fn on_failure(self, endpoint_count: usize) -> Self {
        match self {
            FailoverState::Trying(i) if i + 1 < endpoint_count => FailoverState::Trying(i + 1),
            FailoverState::Trying(_) => FailoverState::Exhausted,
            terminal => terminal,
        }
    }
}

/// Pushes actions through an ordered endpoint list, one attempt at a time.
pub struct Relay {
    submitter: Arc<dyn LedgerSubmitter>,
    endpoints: Vec<Endpoint>,
    validity: ValidityWindow,
    attempt_timeout: Duration,
}

impl Relay {
    pub fn new(
        submitter: Arc<dyn LedgerSubmitter>,
        endpoints: Vec<Endpoint>,
        validity: ValidityWindow,
        attempt_timeout: Duration,
    ) -> Self {
        Relay {
            submitter,
            endpoints,
            validity,
            attempt_timeout,
        }
    }

    pub async fn submit(&self, action: &SubmissionAction) -> Result<Receipt> {
        let mut state = FailoverState::start(self.endpoints.len());
        let mut attempts = 0;

        loop {
            state = match state {
                FailoverState::Trying(index) => {
                    let endpoint = &self.endpoints[index];
                    attempts += 1;
                    tracing::info!(action = %action.name, endpoint = %endpoint, "Pushing action");
                    metrics::SUBMISSION_ATTEMPTS.inc();

                    match self.attempt(endpoint, action).await {
                        Ok(transaction_id) => {
                            tracing::info!(
                                action = %action.name,
                                endpoint = %endpoint,
                                transaction_id = %transaction_id,
                                "Action accepted"
                            );
                            FailoverState::Trying(index).on_success(transaction_id)
                        }
                        Err(e) => {
                            tracing::warn!(
                                action = %action.name,
                                endpoint = %endpoint,
                                error = %e,
                                "Action rejected"
                            );
                            let next = FailoverState::Trying(index).on_failure(self.endpoints.len());
                            if matches!(next, FailoverState::Trying(_)) {
                                metrics::SUBMISSION_FAILOVERS.inc();
                            }
                            next
                        }
                    }
                }
                FailoverState::Done { index, transaction_id } => {
                    return Ok(Receipt {
                        transaction_id,
                        endpoint: self.endpoints[index].clone(),
                        attempts,
                    });
                }
                FailoverState::Exhausted => {
                    return Err(Error::SubmissionExhausted {
                        action: action.name.clone(),
                        attempts,
                    });
                }
            };
        }
    }

    async fn attempt(&self, endpoint: &Endpoint, action: &SubmissionAction) -> Result<TransactionId> {
        tokio::time::timeout(
            self.attempt_timeout,
            self.submitter.submit(endpoint, action, &self.validity),
        )
        .await
        .map_err(|_| Error::Submission {
            endpoint: endpoint.to_string(),
            reason: format!("no response within {:?}", self.attempt_timeout),
        })?
    }
}
