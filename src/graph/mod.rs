//! The interactive fund-flow graph engine.
//!
//! - [`model`] and [`ids`]: nodes, edges and combos with deterministic ids.
//! - [`layout`], [`viewport`] and [`overlay`]: canvas positions, the
//!   zoom/pan transform, and hit regions kept in sync with both.
//! - [`hit_test`]: pointer-to-node resolution with layered fallbacks.
//! - [`expansion`]: the per-address expansion state machine.
//! - [`scene`]: one mounted graph tying all of the above together.
//!
//! Nothing here performs I/O; fetching lives in [`crate::session`].

pub mod expansion;
pub mod geometry;
pub mod ids;
pub mod layout;
pub mod model;
pub mod overlay;
pub mod scene;
pub mod viewport;

pub use expansion::{ExpansionController, ExpansionOutcome, ExpansionState, ExpansionTicket};
pub use geometry::{Point, Rect, Size};
pub use ids::Direction;
pub use layout::{Layout, LayoutConfig};
pub use model::{Combo, Edge, FlowGraph, MergeStats, Node, NodeKind, truncate_middle};
pub use scene::GraphScene;
pub use viewport::Viewport;
