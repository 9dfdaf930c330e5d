//! A mounted graph: data model plus everything needed to draw and
//! interact with it.

use std::time::Instant;

use crate::Result;
use crate::models::GraphResponse;

use super::expansion::{ExpansionController, ExpansionOutcome, ExpansionState, ExpansionTicket};
use super::geometry::{Point, Size};
use super::hit_test::{HitTester, HoverTarget, Resolved};
use super::layout::{Layout, LayoutConfig};
use super::model::{FlowGraph, Node};
use super::overlay::HitOverlay;
use super::viewport::Viewport;

/// Graph state for one center address.
///
/// Every operation that moves nodes on screen (layout, pan, zoom, resize)
/// refreshes the hit overlay before returning, so hit-testing always sees
/// current coordinates.
#[derive(Debug)]
pub struct GraphScene {
    graph: FlowGraph,
    layout: Layout,
    layout_config: LayoutConfig,
    viewport: Viewport,
    overlay: HitOverlay,
    controller: ExpansionController,
    hover: Option<HoverTarget>,
}

impl GraphScene {
    /// Builds, lays out and fits the initial graph.
    pub fn new(response: &GraphResponse, size: Size) -> Self {
        let graph = FlowGraph::init(response);
        let mut controller = ExpansionController::new();
        controller.reset(graph.center());

        let mut scene = Self {
            graph,
            layout: Layout::default(),
            layout_config: LayoutConfig::default(),
            viewport: Viewport::new(size),
            overlay: HitOverlay::new(),
            controller,
            hover: None,
        };
        scene.relayout();
        scene.fit();
        scene
    }

    pub fn graph(&self) -> &FlowGraph {
        &self.graph
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn overlay(&self) -> &HitOverlay {
        &self.overlay
    }

    pub fn expansion_state(&self, address: &str) -> ExpansionState {
        self.controller.state(address)
    }

    pub fn in_flight_count(&self) -> usize {
        self.controller.in_flight_count()
    }

    fn tester(&self) -> HitTester<'_, HitOverlay> {
        HitTester {
            graph: &self.graph,
            layout: &self.layout,
            viewport: &self.viewport,
            locator: &self.overlay,
            last_hover: self.hover.as_ref(),
        }
    }

    /// Resolves a viewport point through the full hit-test chain.
    pub fn hit_test(&self, point: Point, now: Instant) -> Option<Resolved> {
        self.tester().resolve(point, now)
    }

    /// Handles a click: resolves the node and, if its address is unseen,
    /// returns the ticket for the fetch that should follow.
    pub fn click(&mut self, point: Point, now: Instant) -> Option<ExpansionTicket> {
        let resolved = self.hit_test(point, now)?;
        let ticket = self
            .controller
            .begin(&resolved.hit.address, &resolved.hit.node_id)?;
        self.graph.set_highlight(&ticket.node_id, true);
        Some(ticket)
    }

    /// Updates the hover target. Returns the hovered node, if any.
    pub fn hover(&mut self, point: Point, now: Instant) -> Option<&Node> {
        let resolved = self.tester().exact(point);
        match resolved {
            Some(resolved) => {
                self.hover = Some(HoverTarget {
                    node_id: resolved.hit.node_id,
                    address: resolved.hit.address,
                    at: now,
                });
            }
            None => self.hover = None,
        }
        let id = self.hover.as_ref()?.node_id.as_str();
        self.graph.node(id)
    }

    pub fn hovered(&self) -> Option<&HoverTarget> {
        self.hover.as_ref()
    }

    /// Tooltip lines for the hovered node.
    pub fn hover_tooltip(&self) -> Option<Vec<String>> {
        self.graph.tooltip(&self.hover.as_ref()?.node_id)
    }

    /// Applies a finished fetch. A successful merge re-lays out and re-fits
    /// the view; a failure clears the node's highlight and nothing else.
    pub fn apply_expansion(
        &mut self,
        ticket: &ExpansionTicket,
        result: Result<GraphResponse>,
    ) -> ExpansionOutcome {
        let outcome = self.controller.complete(ticket, result, &mut self.graph);
        match &outcome {
            ExpansionOutcome::Merged(_) => {
                self.relayout();
                self.fit();
            }
            ExpansionOutcome::Failed(_) => self.graph.set_highlight(&ticket.node_id, false),
        }
        outcome
    }

    pub fn relayout(&mut self) {
        self.layout = Layout::compute(&self.graph, &self.layout_config);
        self.refresh_overlay();
    }

    pub fn fit(&mut self) {
        if let Some(bounds) = self.layout.bounds() {
            self.viewport.fit_view(bounds);
        }
        self.refresh_overlay();
    }

    pub fn pan(&mut self, dx: f64, dy: f64) {
        self.viewport.pan_by(dx, dy);
        self.refresh_overlay();
    }

    pub fn zoom(&mut self, factor: f64, origin: Point) {
        self.viewport.zoom_by(factor, origin);
        self.refresh_overlay();
    }

    pub fn resize(&mut self, size: Size) {
        if self.viewport.size() == size {
            return;
        }
        self.viewport.resize(size);
        self.fit();
    }

    fn refresh_overlay(&mut self) {
        self.overlay.refresh(&self.graph, &self.layout, &self.viewport);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FlowscopeError;
    use crate::amount::Amount;
    use crate::models::FlowItem;

    fn flow(address: &str, txid: &str) -> FlowItem {
        FlowItem {
            address: address.to_string(),
            txid: txid.to_string(),
            amount: Amount::from(1u64),
            timestamp: String::new(),
            tags: Vec::new(),
        }
    }

    fn scene() -> GraphScene {
        GraphScene::new(
            &GraphResponse {
                center: "C".to_string(),
                center_tags: Vec::new(),
                incoming: vec![flow("a", "t0")],
                outgoing: vec![flow("X", "t1")],
            },
            Size::new(1200.0, 800.0),
        )
    }

    fn point_on(scene: &GraphScene, id: &str) -> Point {
        scene.overlay().region(id).unwrap().rect.center()
    }

    #[test]
    fn double_click_while_in_flight_yields_one_ticket() {
        let mut s = scene();
        let p = point_on(&s, "out-t1-X-0");
        let now = Instant::now();

        let ticket = s.click(p, now).unwrap();
        assert_eq!(ticket.address, "X");
        assert!(s.click(p, now).is_none());
        assert_eq!(s.in_flight_count(), 1);
        assert!(s.graph().node("out-t1-X-0").unwrap().highlighted);

        let outcome = s.apply_expansion(
            &ticket,
            Ok(GraphResponse {
                center: "X".to_string(),
                center_tags: Vec::new(),
                incoming: Vec::new(),
                outgoing: vec![flow("Y", "t2")],
            }),
        );
        assert!(matches!(outcome, ExpansionOutcome::Merged(_)));
        assert!(s.overlay().region("exp-out-X-t2-Y-0").is_some());

        let p = point_on(&s, "out-t1-X-0");
        assert!(s.click(p, now).is_none());
    }

    #[test]
    fn clicking_the_center_is_a_no_op() {
        let mut s = scene();
        let p = point_on(&s, "C");
        assert!(s.click(p, Instant::now()).is_none());
    }

    #[test]
    fn failed_expansion_allows_retry() {
        let mut s = scene();
        let p = point_on(&s, "out-t1-X-0");
        let ticket = s.click(p, Instant::now()).unwrap();
        let nodes = s.graph().node_count();

        s.apply_expansion(&ticket, Err(FlowscopeError::Api("500".to_string())));
        assert_eq!(s.graph().node_count(), nodes);
        assert!(!s.graph().node("out-t1-X-0").unwrap().highlighted);
        assert!(s.click(p, Instant::now()).is_some());
    }

    #[test]
    fn hover_records_target_and_tooltip() {
        let mut s = scene();
        let p = point_on(&s, "in-t0-a-0");
        let node = s.hover(p, Instant::now()).unwrap();
        assert_eq!(node.address.as_deref(), Some("a"));
        assert_eq!(s.hover_tooltip().unwrap()[0], "address: a");

        assert!(s.hover(Point::new(-5000.0, -5000.0), Instant::now()).is_none());
        assert!(s.hovered().is_none());
    }

    #[test]
    fn pan_moves_overlay_with_view() {
        let mut s = scene();
        let before = point_on(&s, "C");
        s.pan(15.0, -4.0);
        let after = point_on(&s, "C");
        assert!((after.x - before.x - 15.0).abs() < 1e-9);
        assert!((after.y - before.y + 4.0).abs() < 1e-9);
    }
}
