//! Address graph endpoint models.

use serde::{Deserialize, Serialize};

use crate::amount::Amount;

/// One-hop fund flows around a center address.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphResponse {
    pub center: String,
    #[serde(default)]
    pub center_tags: Vec<AddressTag>,
    /// Flows paying into the center, one entry per input line item.
    #[serde(default)]
    pub incoming: Vec<FlowItem>,
    /// Flows paid out by the center, one entry per output line item.
    #[serde(default)]
    pub outgoing: Vec<FlowItem>,
}

/// A single counterparty line item of an incoming or outgoing flow.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct FlowItem {
    pub address: String,
    pub txid: String,
    pub amount: Amount,
    #[serde(default)]
    pub timestamp: String,
    #[serde(default)]
    pub tags: Vec<AddressTag>,
}

impl FlowItem {
    /// Returns the name of the first tag, used as a node label.
    pub fn primary_tag(&self) -> Option<&str> {
        self.tags.first().map(|t| t.name.as_str())
    }
}

/// A community-supplied label attached to an address.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct AddressTag {
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: TagKind,
    #[serde(default)]
    pub description: String,
}

/// What an [`AddressTag`] refers to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TagKind {
    #[default]
    Text,
    Website,
    GroupChat,
    #[serde(other)]
    Other,
}
