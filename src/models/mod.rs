//! Response models for the explorer backend.
//!
//! Contains the transaction, address-detail and address-graph payloads plus
//! the shared pagination envelope. Field names follow the backend's
//! camelCase JSON.

pub mod address;
pub mod graph;
pub mod transaction;

use serde::Deserialize;

pub use address::AddressDetail;
pub use graph::{AddressTag, FlowItem, GraphResponse, TagKind};
pub use transaction::{LineItem, Transaction, TransactionDetailResponse};

/// A page of results from a list endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct Page<T> {
    pub list: Vec<T>,
    pub pagination: Pagination,
}

/// Pagination metadata attached to every [`Page`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub total: u64,
    pub total_pages: u32,
    pub current_page: u32,
    #[serde(default)]
    pub take: u32,
}

/// Error body returned alongside non-success statuses.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub message: Option<String>,
}
