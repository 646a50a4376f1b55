use async_trait::async_trait;
use crate::config::Endpoint;
use crate::error::Result;
use crate::relay::{SubmissionAction, ValidityWindow};
use crate::types::ids::TransactionId;

/// One signed state change pushed to one ledger endpoint.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LedgerSubmitter: Send + Sync {
    async fn submit(
        &self,
        endpoint: &Endpoint,
        action: &SubmissionAction,
        validity: &ValidityWindow,
    ) -> Result<TransactionId>;
}
