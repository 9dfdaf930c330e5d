//! The address-centric fund-flow graph.
//!
//! [`FlowGraph`] owns every node, edge and combo currently on screen. It is
//! built once from the center address's flows and then grows append-only
//! through [`FlowGraph::expand`]. Because all ids are derived
//! deterministically (see [`super::ids`]), merging the same flows twice adds
//! nothing.

use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::amount::{Amount, format_amount};
use crate::models::{FlowItem, GraphResponse};

use super::geometry::Size;
use super::ids::{Direction, IdScheme, center_id, edge_id};

pub const CENTER_SIZE: Size = Size::new(220.0, 42.0);
pub const ADDRESS_SIZE: Size = Size::new(240.0, 54.0);
pub const ANCHOR_SIZE: Size = Size::new(20.0, 20.0);

/// Characters kept on each side when shortening an address label.
pub const ADDRESS_LABEL_KEEP: usize = 12;
/// Characters kept on each side when shortening a combo's txid.
pub const TXID_LABEL_KEEP: usize = 6;

/// Role a node plays in the graph.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Center,
    /// Counterparty paying into a transaction that feeds its hop's target.
    Input,
    /// Counterparty paid by its hop's source.
    Output,
    /// Zero-content fan-in point for one incoming transaction.
    Anchor,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Node {
    pub id: String,
    pub kind: NodeKind,
    /// `None` only for anchors.
    pub address: Option<String>,
    /// `None` only for the center.
    pub txid: Option<String>,
    pub amount: Option<Amount>,
    pub combo: Option<String>,
    pub label: String,
    /// Set while the node is being, or has been, expanded.
    pub highlighted: bool,
}

impl Node {
    pub fn size(&self) -> Size {
        match self.kind {
            NodeKind::Center => CENTER_SIZE,
            NodeKind::Input | NodeKind::Output => ADDRESS_SIZE,
            NodeKind::Anchor => ANCHOR_SIZE,
        }
    }

    /// Returns `true` for nodes that stand for an address (not anchors).
    pub fn is_address(&self) -> bool {
        self.address.is_some()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Edge {
    pub id: String,
    pub source: String,
    pub target: String,
    pub amount: Option<Amount>,
}

impl Edge {
    /// Amount label drawn at the edge midpoint, if any.
    pub fn label(&self) -> Option<String> {
        self.amount.map(format_amount)
    }
}

/// Visual container for the nodes of one counterparty transaction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Combo {
    pub id: String,
    pub txid: String,
    pub direction: Direction,
    pub label: String,
}

/// Counts of elements added by one merge.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MergeStats {
    pub nodes_added: usize,
    pub edges_added: usize,
    pub combos_added: usize,
}

impl MergeStats {
    pub fn is_empty(&self) -> bool {
        self.nodes_added == 0 && self.edges_added == 0 && self.combos_added == 0
    }
}

/// The graph data model. Elements keep insertion order.
#[derive(Clone, Debug, Default)]
pub struct FlowGraph {
    center: String,
    nodes: Vec<Node>,
    node_index: HashMap<String, usize>,
    edges: Vec<Edge>,
    edge_ids: HashSet<String>,
    combos: Vec<Combo>,
    combo_ids: HashSet<String>,
}

impl FlowGraph {
    /// Builds the initial one-hop graph around `response.center`.
    pub fn init(response: &GraphResponse) -> Self {
        let mut graph = FlowGraph {
            center: response.center.clone(),
            ..Default::default()
        };

        let label = response
            .center_tags
            .first()
            .map(|t| t.name.clone())
            .unwrap_or_else(|| truncate_middle(&response.center, ADDRESS_LABEL_KEEP));
        graph.push_node(Node {
            id: center_id(&response.center),
            kind: NodeKind::Center,
            address: Some(response.center.clone()),
            txid: None,
            amount: None,
            combo: None,
            label,
            highlighted: false,
        });

        let center = center_id(&response.center);
        let stats = graph.add_flows(
            IdScheme::Root,
            &center,
            &response.incoming,
            &response.outgoing,
        );
        debug!(
            center = %response.center,
            nodes = stats.nodes_added,
            edges = stats.edges_added,
            combos = stats.combos_added,
            "graph initialized"
        );
        graph
    }

    /// Merges one more hop of flows around `address` into the graph.
    ///
    /// New incoming anchors connect to `anchor_node_id` and new outputs hang
    /// off it; edges touching an unknown `anchor_node_id` are skipped. Ids
    /// are namespaced by `address`, so calling this twice with the same
    /// inputs adds nothing the second time.
    pub fn expand(
        &mut self,
        address: &str,
        anchor_node_id: &str,
        flows: &GraphResponse,
    ) -> MergeStats {
        self.add_flows(
            IdScheme::Expansion { address },
            anchor_node_id,
            &flows.incoming,
            &flows.outgoing,
        )
    }

    fn add_flows(
        &mut self,
        scheme: IdScheme<'_>,
        target: &str,
        incoming: &[FlowItem],
        outgoing: &[FlowItem],
    ) -> MergeStats {
        let mut stats = MergeStats::default();
        let target_exists = self.node_index.contains_key(target);

        for (txid, items) in group_by_txid(incoming) {
            let combo = scheme.combo_id(Direction::Incoming, txid);
            let added = self.push_combo(combo.clone(), txid, Direction::Incoming);
            stats.combos_added += usize::from(added);

            let anchor = scheme.anchor_id(txid);
            let mut input_ids = Vec::with_capacity(items.len());
            let mut total = Amount::ZERO;
            for (i, item) in items.iter().enumerate() {
                let id = scheme.address_node_id(Direction::Incoming, txid, &item.address, i);
                total += item.amount;
                let node = counterparty(id.clone(), NodeKind::Input, item, &combo);
                stats.nodes_added += usize::from(self.push_node(node));
                input_ids.push(id);
            }

            stats.nodes_added += usize::from(self.push_node(Node {
                id: anchor.clone(),
                kind: NodeKind::Anchor,
                address: None,
                txid: Some(txid.to_string()),
                amount: Some(total),
                combo: Some(combo),
                label: String::new(),
                highlighted: false,
            }));

            for id in &input_ids {
                stats.edges_added += usize::from(self.push_edge(id, &anchor, None));
            }
            if target_exists {
                stats.edges_added += usize::from(self.push_edge(&anchor, target, Some(total)));
            }
        }

        for (txid, items) in group_by_txid(outgoing) {
            let combo = scheme.combo_id(Direction::Outgoing, txid);
            let added = self.push_combo(combo.clone(), txid, Direction::Outgoing);
            stats.combos_added += usize::from(added);

            for (i, item) in items.iter().enumerate() {
                let id = scheme.address_node_id(Direction::Outgoing, txid, &item.address, i);
                let node = counterparty(id.clone(), NodeKind::Output, item, &combo);
                stats.nodes_added += usize::from(self.push_node(node));
                if target_exists {
                    stats.edges_added += usize::from(self.push_edge(target, &id, Some(item.amount)));
                }
            }
        }

        stats
    }

    fn push_node(&mut self, node: Node) -> bool {
        if self.node_index.contains_key(&node.id) {
            return false;
        }
        self.node_index.insert(node.id.clone(), self.nodes.len());
        self.nodes.push(node);
        true
    }

    fn push_edge(&mut self, source: &str, target: &str, amount: Option<Amount>) -> bool {
        let id = edge_id(source, target);
        if !self.edge_ids.insert(id.clone()) {
            return false;
        }
        self.edges.push(Edge {
            id,
            source: source.to_string(),
            target: target.to_string(),
            amount,
        });
        true
    }

    fn push_combo(&mut self, id: String, txid: &str, direction: Direction) -> bool {
        if !self.combo_ids.insert(id.clone()) {
            return false;
        }
        self.combos.push(Combo {
            id,
            txid: txid.to_string(),
            direction,
            label: format!("TX {}", truncate_middle(txid, TXID_LABEL_KEEP)),
        });
        true
    }

    /// Address the graph was initialized around.
    pub fn center(&self) -> &str {
        &self.center
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.node_index.get(id).map(|&i| &self.nodes[i])
    }

    pub fn contains_node(&self, id: &str) -> bool {
        self.node_index.contains_key(id)
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Nodes that carry an address (every node except anchors).
    pub fn address_nodes(&self) -> impl DoubleEndedIterator<Item = &Node> {
        self.nodes.iter().filter(|n| n.is_address())
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn combos(&self) -> &[Combo] {
        &self.combos
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Marks or unmarks a node as highlighted. Unknown ids are ignored.
    pub fn set_highlight(&mut self, id: &str, highlighted: bool) {
        if let Some(&i) = self.node_index.get(id) {
            self.nodes[i].highlighted = highlighted;
        }
    }

    /// Hover text for a node: address, txid and amount lines when present.
    pub fn tooltip(&self, id: &str) -> Option<Vec<String>> {
        let node = self.node(id)?;
        let mut lines = Vec::with_capacity(3);
        if let Some(address) = &node.address {
            lines.push(format!("address: {address}"));
        }
        if let Some(txid) = &node.txid {
            lines.push(format!("txid: {txid}"));
        }
        if let Some(amount) = node.amount {
            lines.push(format!("amount: {}", format_amount(amount)));
        }
        (!lines.is_empty()).then_some(lines)
    }
}

fn counterparty(id: String, kind: NodeKind, item: &FlowItem, combo: &str) -> Node {
    let label = item
        .primary_tag()
        .map(str::to_string)
        .unwrap_or_else(|| truncate_middle(&item.address, ADDRESS_LABEL_KEEP));
    Node {
        id,
        kind,
        address: Some(item.address.clone()),
        txid: Some(item.txid.clone()),
        amount: Some(item.amount),
        combo: Some(combo.to_string()),
        label,
        highlighted: false,
    }
}

/// Groups flows by transaction id, keeping first-appearance order of both
/// groups and items.
fn group_by_txid(items: &[FlowItem]) -> Vec<(&str, Vec<&FlowItem>)> {
    let mut groups: Vec<(&str, Vec<&FlowItem>)> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();
    for item in items {
        match index.get(item.txid.as_str()) {
            Some(&i) => groups[i].1.push(item),
            None => {
                index.insert(item.txid.as_str(), groups.len());
                groups.push((item.txid.as_str(), vec![item]));
            }
        }
    }
    groups
}

/// Shortens `text` to its first and last `keep` characters joined by
/// `...`. Text no longer than `2 * keep + 3` characters is returned as is.
pub fn truncate_middle(text: &str, keep: usize) -> String {
    let count = text.chars().count();
    if count <= keep * 2 + 3 {
        return text.to_string();
    }
    let head: String = text.chars().take(keep).collect();
    let tail: String = text.chars().skip(count - keep).collect();
    format!("{head}...{tail}")
}
