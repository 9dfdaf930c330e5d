//! Interactive hit regions kept in sync with the rendered graph.
//!
//! The overlay holds one viewport-space box per address node, keyed by
//! node id. [`HitOverlay::refresh`] is called after every layout or
//! viewport change; it creates regions lazily, moves existing ones in
//! place, and drops regions whose node left the graph.

use std::collections::HashMap;

use super::geometry::{Point, Rect};
use super::layout::Layout;
use super::model::FlowGraph;
use super::viewport::Viewport;

/// A node resolved from a pointer position.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NodeHit {
    pub node_id: String,
    pub address: String,
}

/// Something that can name the element under a viewport point.
pub trait ElementLocator {
    fn element_at(&self, point: Point) -> Option<NodeHit>;
}

#[derive(Clone, Debug, PartialEq)]
pub struct HitRegion {
    pub node_id: String,
    pub address: String,
    pub rect: Rect,
    /// Stacking order; later regions are on top.
    z: u64,
}

#[derive(Debug, Default)]
pub struct HitOverlay {
    regions: HashMap<String, HitRegion>,
    next_z: u64,
}

impl HitOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Repositions every region to its node's current viewport box.
    pub fn refresh(&mut self, graph: &FlowGraph, layout: &Layout, viewport: &Viewport) {
        self.regions.retain(|id, _| graph.contains_node(id));

        for node in graph.address_nodes() {
            let (Some(address), Some(rect)) = (&node.address, layout.node_rect(&node.id)) else {
                continue;
            };
            let rect = viewport.rect_to_viewport(rect);
            match self.regions.get_mut(&node.id) {
                Some(region) => region.rect = rect,
                None => {
                    let z = self.next_z;
                    self.next_z += 1;
                    self.regions.insert(
                        node.id.clone(),
                        HitRegion {
                            node_id: node.id.clone(),
                            address: address.clone(),
                            rect,
                            z,
                        },
                    );
                }
            }
        }
    }

    /// Topmost region containing `point`.
    pub fn region_at(&self, point: Point) -> Option<&HitRegion> {
        self.regions
            .values()
            .filter(|r| r.rect.contains(point, 0.0))
            .max_by_key(|r| r.z)
    }

    pub fn region(&self, node_id: &str) -> Option<&HitRegion> {
        self.regions.get(node_id)
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }
}

impl ElementLocator for HitOverlay {
    fn element_at(&self, point: Point) -> Option<NodeHit> {
        self.region_at(point).map(|r| NodeHit {
            node_id: r.node_id.clone(),
            address: r.address.clone(),
        })
    }
}
