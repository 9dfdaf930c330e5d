//! Transaction models.

use serde::{Deserialize, Serialize};

use crate::amount::Amount;

/// One `(address, amount)` entry on either side of a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct LineItem {
    pub address: String,
    pub amount: Amount,
}

impl LineItem {
    pub fn new(address: impl Into<String>, amount: impl Into<Amount>) -> Self {
        Self {
            address: address.into(),
            amount: amount.into(),
        }
    }
}

/// A transaction as served by the list and detail endpoints.
///
/// `senders` being empty marks a coinbase (mining) transaction.
/// `change_outputs` mirror `receivers` structurally but hold value returned
/// to the spending side.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub txid: String,
    /// `None` while the transaction sits in the mempool.
    #[serde(default)]
    pub block_height: Option<u64>,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub weight: u64,
    pub senders: Vec<LineItem>,
    pub receivers: Vec<LineItem>,
    #[serde(default)]
    pub change_outputs: Vec<LineItem>,
    #[serde(default)]
    pub total_amount: Amount,
    #[serde(default)]
    pub fee: Amount,
    #[serde(default)]
    pub timestamp: String,
    #[serde(default)]
    pub confirmations: u64,
}

impl Transaction {
    /// Returns `true` for a transaction with no inputs.
    pub fn is_coinbase(&self) -> bool {
        self.senders.is_empty()
    }

    /// Returns `true` if `address` appears on any side of the transaction.
    pub fn involves(&self, address: &str) -> bool {
        self.senders
            .iter()
            .chain(&self.receivers)
            .chain(&self.change_outputs)
            .any(|item| item.address == address)
    }
}

/// Response of the transaction detail endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionDetailResponse {
    pub processed_transaction: Transaction,
}
