//! Address detail model.

use serde::Deserialize;

use crate::amount::Amount;

use super::graph::AddressTag;

/// Summary statistics for a single address.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressDetail {
    pub address: String,
    pub balance: Amount,
    #[serde(default)]
    pub transaction_count: u64,
    pub received: Amount,
    pub sent: Amount,
    #[serde(default)]
    pub first_seen: Option<String>,
    #[serde(default)]
    pub last_seen: Option<String>,
    #[serde(default)]
    pub address_tags: Vec<AddressTag>,
}
