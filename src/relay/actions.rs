use crate::config::{FollowUpActionConfig, LedgerConfig, UpdateActionConfig};
use crate::relay::{Authorization, SubmissionAction, ValidityWindow};
use crate::types::price::LedgerPrice;

/// Builds the two actions of a cycle from configuration.
#[derive(Clone, Debug)]
pub struct ActionTemplates {
    contract: String,
    update: UpdateActionConfig,
    follow_up: FollowUpActionConfig,
}

impl ActionTemplates {
    pub fn new(contract: impl Into<String>, update: UpdateActionConfig, follow_up: FollowUpActionConfig) -> Self {
        ActionTemplates {
            contract: contract.into(),
            update,
            follow_up,
        }
    }

    pub fn from_config(ledger: &LedgerConfig) -> Self {
        Self::new(ledger.contract.clone(), ledger.update.clone(), ledger.follow_up.clone())
    }

    pub fn price_update(&self, price: LedgerPrice) -> SubmissionAction {
        let mut data = serde_json::Map::new();
        data.insert(self.update.price_field.clone(), serde_json::json!(price));

        SubmissionAction {
            account: self.contract.clone(),
            name: self.update.name.clone(),
            authorization: Authorization {
                actor: self.update.actor.clone(),
                permission: self.update.permission.clone(),
            },
            data: serde_json::Value::Object(data),
        }
    }

    pub fn follow_up(&self) -> SubmissionAction {
        SubmissionAction {
            account: self.contract.clone(),
            name: self.follow_up.name.clone(),
            authorization: Authorization {
                actor: self.follow_up.actor.clone(),
                permission: self.follow_up.permission.clone(),
            },
            data: self.follow_up.data.clone(),
        }
    }
}

pub fn validity_window(ledger: &LedgerConfig) -> ValidityWindow {
    ValidityWindow {
        expire_seconds: ledger.expire_seconds,
        blocks_behind: ledger.blocks_behind,
    }
}
