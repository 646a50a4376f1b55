use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use crate::config::Endpoint;
use crate::error::{Error, Result};
use crate::interfaces::LedgerSubmitter;
use crate::relay::{Authorization, SubmissionAction, ValidityWindow};
use crate::types::ids::TransactionId;

/// Posts actions as JSON to a transaction gateway; the gateway signs,
/// serializes and broadcasts to the chain.
pub struct HttpSubmitter {
    client: Client,
}

impl HttpSubmitter {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("price-relay/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(HttpSubmitter { client })
    }
}

#[derive(Serialize)]
struct TransactRequest<'a> {
    actions: [ActionBody<'a>; 1],
    blocks_behind: u32,
    expire_seconds: u32,
}

#[derive(Serialize)]
struct ActionBody<'a> {
    account: &'a str,
    name: &'a str,
    authorization: [&'a Authorization; 1],
    data: &'a serde_json::Value,
}

#[derive(Deserialize)]
struct TransactResponse {
    transaction_id: String,
    #[serde(default)]
    processed: Option<Processed>,
}

#[derive(Deserialize)]
struct Processed {
    receipt: Option<ProcessedReceipt>,
}

#[derive(Deserialize)]
struct ProcessedReceipt {
    cpu_usage_us: Option<u64>,
}

#[async_trait]
impl LedgerSubmitter for HttpSubmitter {
    async fn submit(
        &self,
        endpoint: &Endpoint,
        action: &SubmissionAction,
        validity: &ValidityWindow,
    ) -> Result<TransactionId> {
        let request = TransactRequest {
            actions: [ActionBody {
                account: &action.account,
                name: &action.name,
                authorization: [&action.authorization],
                data: &action.data,
            }],
            blocks_behind: validity.blocks_behind,
            expire_seconds: validity.expire_seconds,
        };

        let response = self
            .client
            .post(endpoint.as_str())
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Submission {
                endpoint: endpoint.to_string(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Submission {
                endpoint: endpoint.to_string(),
                reason: format!("{}: {}", status, body.trim()),
            });
        }

        let parsed: TransactResponse = response.json().await.map_err(|e| Error::Submission {
            endpoint: endpoint.to_string(),
            reason: format!("unreadable response: {}", e),
        })?;

        if let Some(cpu_us) = parsed
            .processed
            .and_then(|p| p.receipt)
            .and_then(|r| r.cpu_usage_us)
        {
            tracing::debug!(endpoint = %endpoint, cpu_usage_us = cpu_us, "Ledger receipt");
        }

        Ok(TransactionId::new(parsed.transaction_id))
    }
}
