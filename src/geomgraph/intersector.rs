use tracing::trace;

use crate::{
    algorithm::LineIntersector,
    error::Result,
    geom::Coordinate,
    geomgraph::Edge,
    index::{StrTree, chain::{self, MonotoneChain}},
    interrupt,
};

/// Computes the intersections between segments of edges and records them in the edges.
#[derive(Debug, Clone)]
pub struct SegmentIntersector {
    li: LineIntersector,
    include_proper: bool,
    record_isolated: bool,
    boundary_nodes: Option<[Vec<Coordinate>; 2]>,
    has_intersection: bool,
    has_proper: bool,
    has_proper_interior: bool,
    proper_point: Option<Coordinate>,
    pub num_intersections: usize,
    pub num_tests: usize,
}

impl SegmentIntersector {
    /// Returns an intersector recording proper intersections only if `include_proper`, and
    /// clearing the isolated flag of intersecting edges if `record_isolated`.
    pub fn new(li: LineIntersector, include_proper: bool, record_isolated: bool) -> Self {
        Self {
            li,
            include_proper,
            record_isolated,
            boundary_nodes: None,
            has_intersection: false,
            has_proper: false,
            has_proper_interior: false,
            proper_point: None,
            num_intersections: 0,
            num_tests: 0,
        }
    }

    /// Sets the boundary nodes of both geometries, used to tell proper interior
    /// intersections apart.
    pub fn with_boundary_nodes(mut self, nodes0: Vec<Coordinate>, nodes1: Vec<Coordinate>) -> Self {
        self.boundary_nodes = Some([nodes0, nodes1]);
        self
    }

    /// Returns true if any non-trivial intersection was found.
    pub fn has_intersection(&self) -> bool {
        self.has_intersection
    }

    /// Returns true if a proper intersection was found.
    pub fn has_proper_intersection(&self) -> bool {
        self.has_proper
    }

    /// Returns true if a proper intersection not at a boundary node was found.
    pub fn has_proper_interior_intersection(&self) -> bool {
        self.has_proper_interior
    }

    /// The last proper intersection found.
    pub fn proper_intersection_point(&self) -> Option<Coordinate> {
        self.proper_point
    }

    /// Returns true if the intersection is the vertex shared by consecutive segments of
    /// the same edge.
    fn is_trivial(&self, edge: &Edge, segment0: usize, segment1: usize) -> bool {
        if self.li.intersection_num() != 1 {
            return false;
        }
        if segment0.abs_diff(segment1) == 1 {
            return true;
        }

        let last = edge.len() - 2;
        edge.is_closed()
            && ((segment0 == 0 && segment1 == last) || (segment1 == 0 && segment0 == last))
    }

    fn is_boundary_point(&self) -> bool {
        self.boundary_nodes.as_ref().is_some_and(|nodes| {
            nodes
                .iter()
                .flatten()
                .any(|node| self.li.is_intersection(node))
        })
    }

    /// Tests a pair of segments, returning true if the intersection has to be recorded
    /// in both edges.
    fn test(&mut self, e0: &Edge, segment0: usize, e1: &Edge, segment1: usize, same: bool) -> bool {
        self.num_tests += 1;
        self.li.compute_intersection(
            e0.coordinate(segment0),
            e0.coordinate(segment0 + 1),
            e1.coordinate(segment1),
            e1.coordinate(segment1 + 1),
        );
        if !self.li.has_intersection() {
            return false;
        }

        self.num_intersections += 1;
        if same && self.is_trivial(e0, segment0, segment1) {
            return false;
        }

        self.has_intersection = true;
        if self.li.is_proper() {
            self.proper_point = Some(self.li.intersection_at(0));
            self.has_proper = true;
            if !self.is_boundary_point() {
                self.has_proper_interior = true;
            }
        }

        self.include_proper || !self.li.is_proper()
    }

    /// Processes a pair of segments of two edges of the same list.
    fn add_intersections_within(&mut self, edges: &mut [Edge], (i0, s0): (usize, usize), (i1, s1): (usize, usize)) {
        if i0 == i1 && s0 == s1 {
            return;
        }

        let record = self.test(&edges[i0], s0, &edges[i1], s1, i0 == i1);
        if self.li.has_intersection() && self.record_isolated {
            edges[i0].is_isolated = false;
            edges[i1].is_isolated = false;
        }
        if record {
            edges[i0].add_intersections(&self.li, s0, 0);
            edges[i1].add_intersections(&self.li, s1, 1);
        }
    }

    /// Processes a pair of segments of edges of distinct lists.
    fn add_intersections_between(&mut self, e0: &mut Edge, s0: usize, e1: &mut Edge, s1: usize) {
        let record = self.test(e0, s0, e1, s1, false);
        if self.li.has_intersection() && self.record_isolated {
            e0.is_isolated = false;
            e1.is_isolated = false;
        }
        if record {
            e0.add_intersections(&self.li, s0, 0);
            e1.add_intersections(&self.li, s1, 1);
        }
    }
}

fn edge_chains(edges: &[Edge]) -> Vec<MonotoneChain> {
    edges
        .iter()
        .enumerate()
        .flat_map(|(context, edge)| chain::chains(edge.coords(), context))
        .collect()
}

fn chain_index(chains: &[MonotoneChain]) -> Result<StrTree<usize>> {
    let mut index = StrTree::new();
    for (id, chain) in chains.iter().enumerate() {
        index.insert(*chain.envelope(), id)?;
    }
    index.build();
    Ok(index)
}

/// Computes the intersections among the edges of a single geometry.
///
/// Segments of the same edge are only tested against each other if `test_all`.
pub fn compute_self_intersections(
    edges: &mut [Edge],
    intersector: &mut SegmentIntersector,
    test_all: bool,
) -> Result<()> {
    let chains = edge_chains(edges);
    let index = chain_index(&chains)?;

    let mut pairs = Vec::new();
    for (id, chain) in chains.iter().enumerate() {
        interrupt::check()?;
        index.query_visit(chain.envelope(), |&other_id| {
            let other = &chains[other_id];
            if other_id <= id || (!test_all && other.context == chain.context) {
                return;
            }

            chain.compute_overlaps(
                edges[chain.context].coords(),
                other,
                edges[other.context].coords(),
                0.0,
                |s0, s1| pairs.push(((chain.context, s0), (other.context, s1))),
            );
        });
    }

    trace!(chains = chains.len(), pairs = pairs.len(), "self intersection candidates");
    for (first, second) in pairs {
        intersector.add_intersections_within(edges, first, second);
    }

    Ok(())
}

/// Computes the intersections between the edges of two geometries.
pub fn compute_mutual_intersections(
    edges0: &mut [Edge],
    edges1: &mut [Edge],
    intersector: &mut SegmentIntersector,
) -> Result<()> {
    let chains0 = edge_chains(edges0);
    let chains1 = edge_chains(edges1);
    let index = chain_index(&chains0)?;

    let mut pairs = Vec::new();
    for chain1 in &chains1 {
        interrupt::check()?;
        index.query_visit(chain1.envelope(), |&id| {
            let chain0 = &chains0[id];
            chain0.compute_overlaps(
                edges0[chain0.context].coords(),
                chain1,
                edges1[chain1.context].coords(),
                0.0,
                |s0, s1| pairs.push((chain0.context, s0, chain1.context, s1)),
            );
        });
    }

    trace!(pairs = pairs.len(), "mutual intersection candidates");
    for (i0, s0, i1, s1) in pairs {
        intersector.add_intersections_between(&mut edges0[i0], s0, &mut edges1[i1], s1);
    }

    Ok(())
}
