//! Deterministic identifiers for nodes, edges and combos.
//!
//! Every id is a pure function of the inputs that produced the element, so
//! rebuilding the same flows always yields the same ids. Root-hop ids use
//! the `in-` / `out-` prefixes; an expansion of address `A` uses
//! `exp-in-A-` / `exp-out-A-` so hops never collide with each other.

use std::fmt;

/// Which way funds move relative to the node being expanded.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    Incoming,
    Outgoing,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Incoming => f.write_str("in"),
            Direction::Outgoing => f.write_str("out"),
        }
    }
}

/// Namespace for the ids of one hop.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IdScheme<'a> {
    /// The initial one-hop graph around the center.
    Root,
    /// One further hop around `address`.
    Expansion { address: &'a str },
}

impl IdScheme<'_> {
    /// Prefix shared by every id in `direction` for this hop.
    pub fn prefix(&self, direction: Direction) -> String {
        match self {
            IdScheme::Root => format!("{direction}-"),
            IdScheme::Expansion { address } => format!("exp-{direction}-{address}-"),
        }
    }

    /// Combo grouping all nodes of `txid` on one side.
    pub fn combo_id(&self, direction: Direction, txid: &str) -> String {
        format!("{}{txid}", self.prefix(direction))
    }

    /// Node for the `occurrence`-th line item of `txid`, paid by or to
    /// `address`.
    pub fn address_node_id(
        &self,
        direction: Direction,
        txid: &str,
        address: &str,
        occurrence: usize,
    ) -> String {
        format!("{}{txid}-{address}-{occurrence}", self.prefix(direction))
    }

    /// Fan-in anchor for the inputs of incoming transaction `txid`.
    pub fn anchor_id(&self, txid: &str) -> String {
        format!("{}{txid}-tx-anchor", self.prefix(Direction::Incoming))
    }
}

/// The center node is keyed by its bare address.
pub fn center_id(address: &str) -> String {
    address.to_string()
}

pub fn edge_id(source: &str, target: &str) -> String {
    format!("{source}->{target}")
}
