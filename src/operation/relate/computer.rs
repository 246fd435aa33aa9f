use tracing::trace;

use crate::{
    algorithm::{BoundaryNodeRule, LineIntersector, PointLocator, locate::locate_in_area},
    error::Result,
    geom::{Dimension, Geometry, IntersectionMatrix, Location},
    geomgraph::{GeometryGraph, SegmentIntersector},
    operation::relate::{
        edge_ends::compute_edge_ends,
        node_graph::{RelateNodeGraph, update_im_from_label},
    },
};

/// Computes the intersection matrix of two geometries from their topology graphs.
///
/// Both graphs are noded against themselves and each other; the matrix is then read from
/// the labels of the nodes, of the edge ends around them and of the edges that meet
/// nothing of the other geometry.
pub(super) struct RelateComputer<'a> {
    args: [GeometryGraph<'a>; 2],
    rule: BoundaryNodeRule,
    nodes: RelateNodeGraph,
}

impl<'a> RelateComputer<'a> {
    pub fn new(g0: &'a Geometry, g1: &'a Geometry, rule: BoundaryNodeRule) -> Self {
        Self {
            args: [
                GeometryGraph::with_rule(0, g0, rule),
                GeometryGraph::with_rule(1, g1, rule),
            ],
            rule,
            nodes: RelateNodeGraph::default(),
        }
    }

    pub fn compute_im(mut self) -> Result<IntersectionMatrix> {
        let mut im = IntersectionMatrix::new();
        im.set(Location::Exterior, Location::Exterior, Dimension::Surface);

        let (g0, g1) = (self.args[0].geometry(), self.args[1].geometry());
        if !g0.envelope().intersects(&g1.envelope()) {
            self.compute_disjoint_im(&mut im);
            return Ok(im);
        }

        let li = LineIntersector::with_precision(g0.precision_model().most_precise(g1.precision_model()));
        let [arg0, arg1] = &mut self.args;
        arg0.compute_self_nodes(li.clone(), false)?;
        arg1.compute_self_nodes(li.clone(), false)?;
        let intersector = arg0.compute_edge_intersections(arg1, li, false)?;

        for arg in &self.args {
            self.nodes.compute_intersection_nodes(arg);
        }
        for arg in &self.args {
            self.nodes.copy_nodes_and_labels(arg);
        }
        self.label_isolated_nodes();
        self.compute_proper_intersection_im(&intersector, &mut im)?;

        for arg in &self.args {
            self.nodes.insert_ends(compute_edge_ends(arg.edges()));
        }
        self.label_node_edges()?;
        self.update_isolated_edges(&mut im);

        for (_, node) in self.nodes.iter() {
            node.update_im(&mut im);
        }

        trace!(%im, "intersection matrix computed");
        Ok(im)
    }

    /// Fills the matrix of geometries whose envelopes do not even intersect.
    fn compute_disjoint_im(&self, im: &mut IntersectionMatrix) {
        for arg in &self.args {
            let geometry = arg.geometry();
            if geometry.is_empty() {
                continue;
            }

            let dimension = Dimension::from_value(geometry.dimension());
            let boundary = boundary_dimension(arg);
            match arg.index() {
                0 => {
                    im.set(Location::Interior, Location::Exterior, dimension);
                    im.set(Location::Boundary, Location::Exterior, boundary);
                }
                _ => {
                    im.set(Location::Exterior, Location::Interior, dimension);
                    im.set(Location::Exterior, Location::Boundary, boundary);
                }
            }
        }
    }

    /// Locates the nodes known to a single geometry in the other one.
    fn label_isolated_nodes(&mut self) {
        let locator = PointLocator::new(self.rule);
        let geometries = [self.args[0].geometry(), self.args[1].geometry()];

        for (coord, node) in self.nodes.iter_mut() {
            if !node.is_isolated() {
                continue;
            }

            let target = if node.label.is_null(0) { 0 } else { 1 };
            let location = locator.locate(coord, geometries[target]);
            node.label.set_all_locations(target, location);
        }
    }

    /// Raises the entries implied by a proper intersection, which only happens between
    /// the interiors of segments and therefore is not seen by the node labels.
    fn compute_proper_intersection_im(
        &self,
        intersector: &SegmentIntersector,
        im: &mut IntersectionMatrix,
    ) -> Result<()> {
        let dim0 = self.args[0].geometry().dimension();
        let dim1 = self.args[1].geometry().dimension();
        let proper = intersector.has_proper_intersection();
        let proper_interior = intersector.has_proper_interior_intersection();

        match (dim0, dim1) {
            (2, 2) if proper => im.set_at_least_from("212101212")?,
            (2, 1) => {
                if proper {
                    im.set_at_least_from("FFF0FFFF2")?;
                }
                if proper_interior {
                    im.set_at_least_from("1FFFFF1FF")?;
                }
            }
            (1, 2) => {
                if proper {
                    im.set_at_least_from("F0FFFFFF2")?;
                }
                if proper_interior {
                    im.set_at_least_from("1F1FFFFFF")?;
                }
            }
            (1, 1) if proper_interior => im.set_at_least_from("0FFFFFFFF")?,
            _ => {}
        }
        Ok(())
    }

    fn label_node_edges(&mut self) -> Result<()> {
        let geometries = [self.args[0].geometry(), self.args[1].geometry()];
        for (coord, node) in self.nodes.iter_mut() {
            node.compute_labelling(coord, self.rule, |geometry, p| {
                locate_in_area(p, geometries[geometry])
            })?;
        }
        Ok(())
    }

    /// Locates the edges that meet nothing of the other geometry and adds them to the
    /// matrix.
    fn update_isolated_edges(&mut self, im: &mut IntersectionMatrix) {
        let locator = PointLocator::new(self.rule);
        for this in 0..2 {
            let target = 1 - this;
            let other = self.args[target].geometry();

            for edge in self.args[this].edges_mut().iter_mut().filter(|edge| edge.is_isolated) {
                let location = match other.dimension() > 0 {
                    true => locator.locate(edge.coordinate(0), other),
                    false => Location::Exterior,
                };
                edge.label.set_all_locations(target, location);
                update_im_from_label(&edge.label, im);
            }
        }
    }
}

/// The dimension of the boundary of a geometry, honouring the boundary node rule for
/// lines.
fn boundary_dimension(graph: &GeometryGraph<'_>) -> Dimension {
    let geometry = graph.geometry();
    match geometry.dimension() {
        1 if graph.boundary_nodes().is_empty() => Dimension::False,
        1 => Dimension::Point,
        2 => Dimension::from_value(geometry.boundary_dimension()),
        _ => Dimension::False,
    }
}
