use crate::{
    error::Result,
    geomgraph::Edge,
    noding::{FastNodingValidator, NodedSegmentString},
};

/// Checks that a set of split edges is fully noded, failing with a topology error at the
/// first intersection that is not a shared end point.
pub fn validate_edge_noding(edges: &[Edge]) -> Result<()> {
    let mut strings: Vec<NodedSegmentString<()>> = edges
        .iter()
        .map(|edge| NodedSegmentString::new(edge.coords().to_vec(), ()))
        .collect();

    FastNodingValidator::check_valid(&mut strings)
}
