//! Layered top-to-bottom layout.
//!
//! Nodes are ranked by longest path from the sources, then every node with
//! successors is pulled down to sit one rank above its nearest successor.
//! Inputs therefore land directly above their anchor, anchors directly
//! above the node they feed, and outputs one rank below their source.
//!
//! Horizontally, every combo is a band spanning all of its ranks. Bands
//! are placed breadth-first from the center: the incoming and outgoing
//! bands hanging off a node are laid side by side, centered under that
//! node, and pushed right until they clear every band already placed on
//! the same ranks. A combo's box therefore never encloses a node of
//! another combo.

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::ops::RangeInclusive;

use super::geometry::{Point, Rect};
use super::model::{FlowGraph, Node, NodeKind};

/// Spacing parameters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LayoutConfig {
    /// Horizontal gap between neighbours in a rank.
    pub nodesep: f64,
    /// Vertical gap between ranks.
    pub ranksep: f64,
    /// Padding between a combo's members and its border.
    pub combo_padding: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            nodesep: 24.0,
            ranksep: 80.0,
            combo_padding: 16.0,
        }
    }
}

impl LayoutConfig {
    /// Gap between neighbouring bands, wide enough that padded combo boxes
    /// stay `nodesep` apart.
    fn band_gap(&self) -> f64 {
        self.nodesep + 2.0 * self.combo_padding
    }
}

/// Canvas-space positions computed for one version of a [`FlowGraph`].
#[derive(Clone, Debug, Default)]
pub struct Layout {
    nodes: HashMap<String, Rect>,
    ranks: HashMap<String, usize>,
    combos: HashMap<String, Rect>,
    bounds: Option<Rect>,
}

impl Layout {
    /// Runs the layered layout over `graph`.
    pub fn compute(graph: &FlowGraph, config: &LayoutConfig) -> Self {
        let ranks = assign_ranks(graph);
        let nodes = graph.nodes();
        let node_ranks: Vec<usize> = nodes
            .iter()
            .map(|n| ranks.get(n.id.as_str()).copied().unwrap_or(0))
            .collect();

        let row_count = node_ranks.iter().map(|r| r + 1).max().unwrap_or(0);
        let mut heights = vec![0.0_f64; row_count];
        for (node, &rank) in nodes.iter().zip(&node_ranks) {
            heights[rank] = heights[rank].max(node.size().height);
        }
        let mut mids = Vec::with_capacity(row_count);
        let mut top = 0.0;
        for &height in &heights {
            mids.push(top + height / 2.0);
            if height > 0.0 {
                top += height + config.ranksep;
            }
        }

        let xs = Placement::new(graph, &node_ranks, config).run();

        let mut layout = Layout::default();
        for (i, node) in nodes.iter().enumerate() {
            let center = Point::new(xs[i], mids[node_ranks[i]]);
            let rect = Rect::from_center(center, node.size());
            layout.bounds = Some(layout.bounds.map_or(rect, |b| b.union(&rect)));
            layout.nodes.insert(node.id.clone(), rect);
        }

        for node in nodes {
            let (Some(combo), Some(rect)) = (&node.combo, layout.nodes.get(&node.id)) else {
                continue;
            };
            let rect = *rect;
            layout
                .combos
                .entry(combo.clone())
                .and_modify(|r| *r = r.union(&rect))
                .or_insert(rect);
        }
        for rect in layout.combos.values_mut() {
            *rect = rect.inflate(config.combo_padding);
            layout.bounds = Some(layout.bounds.map_or(*rect, |b| b.union(rect)));
        }

        layout.ranks = ranks
            .into_iter()
            .map(|(id, rank)| (id.to_string(), rank))
            .collect();
        layout
    }

    /// Canvas-space box of a node.
    pub fn node_rect(&self, id: &str) -> Option<Rect> {
        self.nodes.get(id).copied()
    }

    pub fn rank(&self, id: &str) -> Option<usize> {
        self.ranks.get(id).copied()
    }

    pub fn combo_rect(&self, id: &str) -> Option<Rect> {
        self.combos.get(id).copied()
    }

    /// Box covering every node and combo; `None` for an empty graph.
    pub fn bounds(&self) -> Option<Rect> {
        self.bounds
    }
}

/// A combo, or a single node outside any combo, laid out as one band.
struct Band {
    /// Member node indices per rank, in insertion order.
    rows: BTreeMap<usize, Vec<usize>>,
    /// Node the band hangs off, if any.
    parent: Option<usize>,
    /// `true` when the band holds outputs and sits below its parent.
    below: bool,
    width: f64,
}

impl Band {
    fn empty() -> Self {
        Self {
            rows: BTreeMap::new(),
            parent: None,
            below: false,
            width: 0.0,
        }
    }

    fn ranks(&self) -> RangeInclusive<usize> {
        let first = self.rows.keys().next().copied().unwrap_or(0);
        let last = self.rows.keys().next_back().copied().unwrap_or(first);
        first..=last
    }
}

struct Placement<'a> {
    graph: &'a FlowGraph,
    config: &'a LayoutConfig,
    bands: Vec<Band>,
    /// Bands hanging off each node, in band order.
    children: HashMap<usize, Vec<usize>>,
    /// Horizontal extents already taken, per rank.
    taken: Vec<Vec<(f64, f64)>>,
    xs: Vec<f64>,
}

impl<'a> Placement<'a> {
    fn new(graph: &'a FlowGraph, node_ranks: &[usize], config: &'a LayoutConfig) -> Self {
        let nodes = graph.nodes();
        let mut bands: Vec<Band> = Vec::new();
        let mut band_of = vec![0; nodes.len()];
        let mut combo_band: HashMap<&str, usize> = HashMap::new();

        for (i, node) in nodes.iter().enumerate() {
            let band = match node.combo.as_deref() {
                Some(combo) => *combo_band.entry(combo).or_insert_with(|| {
                    bands.push(Band::empty());
                    bands.len() - 1
                }),
                None => {
                    bands.push(Band::empty());
                    bands.len() - 1
                }
            };
            band_of[i] = band;
            bands[band].rows.entry(node_ranks[i]).or_default().push(i);
            bands[band].below |= node.kind == NodeKind::Output;
        }

        // An anchor's band hangs off the node the anchor feeds; an output's
        // band hangs off the node paying it.
        let index: HashMap<&str, usize> = nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (n.id.as_str(), i))
            .collect();
        for edge in graph.edges() {
            let (Some(&s), Some(&t)) =
                (index.get(edge.source.as_str()), index.get(edge.target.as_str()))
            else {
                continue;
            };
            if band_of[s] == band_of[t] {
                continue;
            }
            let (band, parent) = if nodes[s].kind == NodeKind::Anchor {
                (band_of[s], t)
            } else if nodes[t].kind == NodeKind::Output {
                (band_of[t], s)
            } else {
                continue;
            };
            if bands[band].parent.is_none() && band_of[parent] != band {
                bands[band].parent = Some(parent);
            }
        }

        let mut children: HashMap<usize, Vec<usize>> = HashMap::new();
        for (b, band) in bands.iter_mut().enumerate() {
            band.width = band
                .rows
                .values()
                .map(|row| row_width(nodes, row, config.nodesep))
                .fold(0.0, f64::max);
            if let Some(parent) = band.parent {
                children.entry(parent).or_default().push(b);
            }
        }

        let row_count = node_ranks.iter().map(|r| r + 1).max().unwrap_or(0);
        Self {
            graph,
            config,
            bands,
            children,
            taken: vec![Vec::new(); row_count],
            xs: vec![0.0; nodes.len()],
        }
    }

    /// Places every band and returns each node's center x.
    fn run(mut self) -> Vec<f64> {
        let mut placed = vec![false; self.bands.len()];
        // Parentless bands (the center, or hops whose parent is gone) go
        // first; anything still unplaced afterwards sits on a parent cycle.
        for b in 0..self.bands.len() {
            if self.bands[b].parent.is_none() {
                self.spread_from(b, &mut placed);
            }
        }
        for b in 0..self.bands.len() {
            if !placed[b] {
                self.spread_from(b, &mut placed);
            }
        }
        self.xs
    }

    /// Places `root` and then, breadth-first, every band hanging below it.
    fn spread_from(&mut self, root: usize, placed: &mut [bool]) {
        let mut queue: VecDeque<usize> = self.place_block(&[root], 0.0, placed).into();
        while let Some(node) = queue.pop_front() {
            let Some(hanging) = self.children.get(&node).cloned() else {
                continue;
            };
            let (below, above): (Vec<usize>, Vec<usize>) = hanging
                .into_iter()
                .filter(|&b| !placed[b])
                .partition(|&b| self.bands[b].below);
            let x = self.xs[node];
            queue.extend(self.place_block(&above, x, placed));
            queue.extend(self.place_block(&below, x, placed));
        }
    }

    /// Lays `block` out side by side, centered on `center_x` where room
    /// allows, and returns the nodes it placed.
    fn place_block(&mut self, block: &[usize], center_x: f64, placed: &mut [bool]) -> Vec<usize> {
        if block.is_empty() {
            return Vec::new();
        }
        let nodes = self.graph.nodes();
        let gap = self.config.band_gap();
        let width = block.iter().map(|&b| self.bands[b].width).sum::<f64>()
            + gap * (block.len() - 1) as f64;
        let ranks = block
            .iter()
            .map(|&b| self.bands[b].ranks())
            .reduce(|a, b| (*a.start()).min(*b.start())..=(*a.end()).max(*b.end()))
            .unwrap_or(0..=0);

        let mut left = self.free_left(ranks, center_x - width / 2.0, width, gap);
        let mut newly = Vec::new();
        for &b in block {
            let band = &self.bands[b];
            let band_width = band.width;
            for row in band.rows.values() {
                let mut x = left + (band_width - row_width(nodes, row, self.config.nodesep)) / 2.0;
                for &i in row {
                    let w = nodes[i].size().width;
                    self.xs[i] = x + w / 2.0;
                    x += w + self.config.nodesep;
                    newly.push(i);
                }
            }
            for rank in band.ranks() {
                self.taken[rank].push((left, left + band_width));
            }
            placed[b] = true;
            left += band_width + gap;
        }
        newly
    }

    /// Smallest left edge at or after `left` where `width` fits on every
    /// rank in `ranks`, at least `gap` away from what is already there.
    fn free_left(&self, ranks: RangeInclusive<usize>, mut left: f64, width: f64, gap: f64) -> f64 {
        loop {
            let right = left + width;
            let blocker = ranks
                .clone()
                .filter_map(|rank| self.taken.get(rank))
                .flatten()
                .filter(|(l, r)| *l < right + gap && left < *r + gap)
                .map(|&(_, r)| r)
                .reduce(f64::max);
            match blocker {
                Some(edge) => left = edge + gap,
                None => return left,
            }
        }
    }
}

fn row_width(nodes: &[Node], row: &[usize], nodesep: f64) -> f64 {
    row.iter().map(|&i| nodes[i].size().width).sum::<f64>()
        + nodesep * row.len().saturating_sub(1) as f64
}

/// Longest-path ranking followed by pulling nodes towards their successors.
fn assign_ranks(graph: &FlowGraph) -> HashMap<&str, usize> {
    let mut successors: HashMap<&str, Vec<&str>> = HashMap::new();
    let mut in_degree: HashMap<&str, usize> = graph
        .nodes()
        .iter()
        .map(|n| (n.id.as_str(), 0))
        .collect();

    for edge in graph.edges() {
        if !graph.contains_node(&edge.source) || !graph.contains_node(&edge.target) {
            continue;
        }
        successors
            .entry(edge.source.as_str())
            .or_default()
            .push(edge.target.as_str());
        if let Some(d) = in_degree.get_mut(edge.target.as_str()) {
            *d += 1;
        }
    }

    // Kahn's algorithm; sources in insertion order.
    let mut queue: VecDeque<&str> = graph
        .nodes()
        .iter()
        .map(|n| n.id.as_str())
        .filter(|id| in_degree.get(id) == Some(&0))
        .collect();
    let mut order: Vec<&str> = Vec::with_capacity(graph.node_count());
    let mut ranks: HashMap<&str, usize> = HashMap::new();

    while let Some(id) = queue.pop_front() {
        order.push(id);
        let rank = *ranks.entry(id).or_insert(0);
        for &next in successors.get(id).map(Vec::as_slice).unwrap_or_default() {
            let r = ranks.entry(next).or_insert(0);
            *r = (*r).max(rank + 1);
            if let Some(d) = in_degree.get_mut(next) {
                *d -= 1;
                if *d == 0 {
                    queue.push_back(next);
                }
            }
        }
    }

    // Nodes on a cycle never reach in-degree zero; they keep whatever rank
    // their acyclic predecessors gave them and are not tightened.
    for node in graph.nodes() {
        ranks.entry(node.id.as_str()).or_insert(0);
    }

    for &id in order.iter().rev() {
        let nearest = successors
            .get(id)
            .and_then(|next| next.iter().filter_map(|n| ranks.get(n)).min().copied());
        if let Some(nearest) = nearest
            && nearest > 0
        {
            ranks.insert(id, nearest - 1);
        }
    }

    ranks
}
