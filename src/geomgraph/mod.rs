//! The topology graph shared by the overlay, buffer, relate and validity operations.
//!
//! Nodes, edges and directed edges live in arenas and refer to each other by index. The
//! directed edges of edge `k` are `2k` (forward) and `2k + 1` (backward).

mod depth;
mod edge;
mod edge_end;
mod edge_ring;
mod geometry_graph;
mod graph;
pub mod intersector;
mod label;
mod validator;

pub use depth::Depth;
pub use edge::{Edge, EdgeIntersection, EdgeList};
pub use edge_end::EdgeEnd;
pub use edge_ring::{EdgeRing, RingKind, build_minimal_rings};
pub use geometry_graph::GeometryGraph;
pub use graph::{DirectedEdge, Node, PlanarGraph, sym};
pub use intersector::SegmentIntersector;
pub use label::{Label, TopologyLocation, label_star};
pub use validator::validate_edge_noding;
