//! Per-address expansion state machine.
//!
//! ```text
//! Unseen --begin--> InFlight --complete(Ok)--> Expanded
//!                      |
//!                      +--complete(Err)--> Unseen
//! ```
//!
//! `begin` on an address that is already in flight or expanded is refused,
//! so each address triggers at most one fetch at a time and at most one
//! successful merge per graph. State is only cleared by [`reset`], which
//! runs when the graph is rebuilt around a new center.
//!
//! [`reset`]: ExpansionController::reset

use std::collections::HashSet;

use tracing::{info, warn};

use crate::Result;
use crate::models::GraphResponse;

use super::model::{FlowGraph, MergeStats};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExpansionState {
    Unseen,
    InFlight,
    Expanded,
}

/// Permission to fetch one more hop for `address`, issued by
/// [`ExpansionController::begin`] and redeemed by
/// [`ExpansionController::complete`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExpansionTicket {
    pub address: String,
    /// Node the new hop hangs off.
    pub node_id: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ExpansionOutcome {
    Merged(MergeStats),
    /// The fetch failed; the address is retryable and the graph unchanged.
    Failed(String),
}

#[derive(Debug, Default)]
pub struct ExpansionController {
    expanded: HashSet<String>,
    in_flight: HashSet<String>,
}

impl ExpansionController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self, address: &str) -> ExpansionState {
        if self.expanded.contains(address) {
            ExpansionState::Expanded
        } else if self.in_flight.contains(address) {
            ExpansionState::InFlight
        } else {
            ExpansionState::Unseen
        }
    }

    /// Moves `address` to in-flight and returns a ticket, or `None` if it is
    /// already in flight or expanded.
    pub fn begin(&mut self, address: &str, node_id: &str) -> Option<ExpansionTicket> {
        match self.state(address) {
            ExpansionState::Expanded => {
                info!(address, "skip expand, already expanded");
                None
            }
            ExpansionState::InFlight => {
                info!(address, "skip expand, in flight");
                None
            }
            ExpansionState::Unseen => {
                self.in_flight.insert(address.to_string());
                info!(address, node_id, "expand start");
                Some(ExpansionTicket {
                    address: address.to_string(),
                    node_id: node_id.to_string(),
                })
            }
        }
    }

    /// Settles a ticket with its fetch result.
    ///
    /// The address always leaves the in-flight set. On success the flows are
    /// merged into `graph` and the address becomes expanded; on failure the
    /// graph is untouched and the address may be clicked again.
    pub fn complete(
        &mut self,
        ticket: &ExpansionTicket,
        result: Result<GraphResponse>,
        graph: &mut FlowGraph,
    ) -> ExpansionOutcome {
        self.in_flight.remove(&ticket.address);
        match result {
            Ok(flows) => {
                info!(
                    address = %ticket.address,
                    incoming = flows.incoming.len(),
                    outgoing = flows.outgoing.len(),
                    "expand fetched"
                );
                let stats = graph.expand(&ticket.address, &ticket.node_id, &flows);
                self.expanded.insert(ticket.address.clone());
                info!(
                    address = %ticket.address,
                    nodes_added = stats.nodes_added,
                    edges_added = stats.edges_added,
                    "expand merged"
                );
                ExpansionOutcome::Merged(stats)
            }
            Err(e) => {
                warn!(address = %ticket.address, error = %e, "expand error");
                ExpansionOutcome::Failed(e.to_string())
            }
        }
    }

    /// Forgets every address and marks `center` as already expanded, since
    /// its hop is the initial graph.
    pub fn reset(&mut self, center: &str) {
        self.expanded.clear();
        self.in_flight.clear();
        self.expanded.insert(center.to_string());
    }

    pub fn in_flight_count(&self) -> usize {
        self.in_flight.len()
    }
}
