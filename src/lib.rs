//! Blockchain explorer client core.
//!
//! Classifies transactions from the point of view of one address using
//! exact decimal arithmetic, and builds an interactive fund-flow graph
//! around an address that grows one hop at a time as the user clicks on
//! counterparties.

pub mod amount;
pub mod api;
pub mod classify;
pub mod config;
pub mod error;
pub mod graph;
pub mod merge;
pub mod models;
pub mod session;
pub mod tui;

pub use error::{FlowscopeError, Result};
