use std::collections::BTreeMap;

use crate::{
    algorithm::BoundaryNodeRule,
    error::{GeometryError, Result},
    geom::{Coordinate, Dimension, IntersectionMatrix, Location, Position},
    geomgraph::{EdgeEnd, GeometryGraph, Label, label_star},
    operation::relate::edge_ends::{LabelledEnd, compute_edge_ends},
};

/// The edge ends of a node sharing the same direction, with their combined label.
#[derive(Debug, Clone)]
pub(crate) struct EdgeEndBundle {
    end: EdgeEnd,
    label: Label,
    ends: Vec<LabelledEnd>,
}

impl EdgeEndBundle {
    fn new(end: LabelledEnd) -> Self {
        Self {
            end: end.end,
            label: end.label,
            ends: vec![end],
        }
    }

    pub fn ends(&self) -> &[LabelledEnd] {
        &self.ends
    }

    /// Combines the labels of the bundled ends.
    ///
    /// The on-location is the boundary if an odd number of ends (under the boundary node
    /// rule) says so; a side is interior if any area end has the interior there.
    fn compute_label(&mut self, rule: BoundaryNodeRule) {
        let is_area = self.ends.iter().any(|end| end.label.is_area());
        self.label = match is_area {
            true => Label::area_both(Location::None, Location::None, Location::None),
            false => Label::on(Location::None),
        };

        for geometry in 0..2 {
            self.compute_label_on(geometry, rule);
            if is_area {
                self.compute_label_side(geometry, Position::Left);
                self.compute_label_side(geometry, Position::Right);
            }
        }
    }

    fn compute_label_on(&mut self, geometry: usize, rule: BoundaryNodeRule) {
        let locations = self.ends.iter().map(|end| end.label.on_location(geometry));
        let boundaries = locations.clone().filter(|&l| l == Location::Boundary).count();
        let found_interior = locations.clone().any(|l| l == Location::Interior);

        let location = if boundaries > 0 {
            match rule.is_in_boundary(boundaries) {
                true => Location::Boundary,
                false => Location::Interior,
            }
        } else if found_interior {
            Location::Interior
        } else {
            Location::None
        };
        self.label.set_on_location(geometry, location);
    }

    fn compute_label_side(&mut self, geometry: usize, side: Position) {
        for end in self.ends.iter().filter(|end| end.label.is_area()) {
            match end.label.location(geometry, side) {
                Location::Interior => {
                    self.label.set_location(geometry, side, Location::Interior);
                    return;
                }
                Location::Exterior => self.label.set_location(geometry, side, Location::Exterior),
                _ => {}
            }
        }
    }

    fn update_im(&self, im: &mut IntersectionMatrix) {
        update_im_from_label(&self.label, im);
    }
}

/// Raises the matrix entries implied by an edge with the given label.
pub(crate) fn update_im_from_label(label: &Label, im: &mut IntersectionMatrix) {
    im.set_at_least_if_valid(label.on_location(0), label.on_location(1), Dimension::Curve);
    if label.is_area() {
        for side in [Position::Left, Position::Right] {
            im.set_at_least_if_valid(
                label.location(0, side),
                label.location(1, side),
                Dimension::Surface,
            );
        }
    }
}

/// A node of the relate graph: its label and the bundles of edge ends leaving it, sorted
/// counter-clockwise.
#[derive(Debug, Clone, Default)]
pub(crate) struct RelateNode {
    pub label: Label,
    bundles: Vec<EdgeEndBundle>,
}

impl RelateNode {
    pub fn bundles(&self) -> &[EdgeEndBundle] {
        &self.bundles
    }

    /// Returns true if the node is known to a single geometry.
    pub fn is_isolated(&self) -> bool {
        self.label.geometry_count() == 1
    }

    fn insert(&mut self, end: LabelledEnd) {
        match self
            .bundles
            .binary_search_by(|bundle| bundle.end.compare_direction(&end.end))
        {
            Ok(position) => self.bundles[position].ends.push(end),
            Err(position) => self.bundles.insert(position, EdgeEndBundle::new(end)),
        }
    }

    fn compute_bundle_labels(&mut self, rule: BoundaryNodeRule) {
        self.bundles
            .iter_mut()
            .for_each(|bundle| bundle.compute_label(rule));
    }

    /// Labels every bundle, resolving unknown locations with `locate`.
    pub fn compute_labelling(
        &mut self,
        coord: &Coordinate,
        rule: BoundaryNodeRule,
        locate: impl FnMut(usize, &Coordinate) -> Location,
    ) -> Result<()> {
        self.compute_bundle_labels(rule);

        let mut labels: Vec<Label> = self.bundles.iter().map(|bundle| bundle.label).collect();
        label_star(&mut labels, coord, locate)?;
        for (bundle, label) in self.bundles.iter_mut().zip(labels) {
            bundle.label = label;
        }
        Ok(())
    }

    /// Returns true if the side locations of the area edges of the given geometry are
    /// consistent around the node.
    pub fn is_area_labels_consistent(&mut self, geometry: usize, rule: BoundaryNodeRule) -> Result<bool> {
        self.compute_bundle_labels(rule);

        let Some(last) = self.bundles.last() else {
            return Ok(true);
        };
        let mut current = last.label.location(geometry, Position::Left);
        if current.is_none() {
            return Err(GeometryError::assertion("found unlabelled area edge"));
        }

        for bundle in &self.bundles {
            if !bundle.label.is_area_of(geometry) {
                return Err(GeometryError::assertion("found non-area edge"));
            }

            let left = bundle.label.location(geometry, Position::Left);
            let right = bundle.label.location(geometry, Position::Right);
            if left == right || right != current {
                return Ok(false);
            }
            current = left;
        }

        Ok(true)
    }

    /// Raises the matrix entries implied by the node and its edges.
    pub fn update_im(&self, im: &mut IntersectionMatrix) {
        im.set_at_least_if_valid(self.label.on_location(0), self.label.on_location(1), Dimension::Point);
        self.bundles.iter().for_each(|bundle| bundle.update_im(im));
    }
}

/// The nodes of the relate graph, keyed by coordinate.
#[derive(Debug, Clone, Default)]
pub(crate) struct RelateNodeGraph {
    nodes: BTreeMap<Coordinate, RelateNode>,
}

impl RelateNodeGraph {
    /// Builds the node graph of a single geometry, with edge ends inserted.
    pub fn build(graph: &GeometryGraph<'_>) -> Self {
        let mut nodes = Self::default();
        nodes.compute_intersection_nodes(graph);
        nodes.copy_nodes_and_labels(graph);
        nodes.insert_ends(compute_edge_ends(graph.edges()));
        nodes
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Coordinate, &RelateNode)> {
        self.nodes.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&Coordinate, &mut RelateNode)> {
        self.nodes.iter_mut()
    }

    pub fn add_node(&mut self, coord: Coordinate) -> &mut RelateNode {
        self.nodes.entry(coord).or_default()
    }

    /// Adds a node at every intersection of the edges of the graph.
    ///
    /// Nodes on the boundary toggle between boundary and interior each time an edge
    /// boundary passes through them.
    pub fn compute_intersection_nodes(&mut self, graph: &GeometryGraph<'_>) {
        let index = graph.index();
        for edge in graph.edges() {
            let location = edge.label.on_location(index);
            for intersection in edge.intersections() {
                let label = &mut self.add_node(intersection.coord).label;
                if location == Location::Boundary {
                    let toggled = match label.on_location(index) {
                        Location::Boundary => Location::Interior,
                        _ => Location::Boundary,
                    };
                    label.set_on_location(index, toggled);
                } else if label.is_null(index) {
                    label.set_on_location(index, Location::Interior);
                }
            }
        }
    }

    /// Adds the nodes of the graph with their locations.
    pub fn copy_nodes_and_labels(&mut self, graph: &GeometryGraph<'_>) {
        let index = graph.index();
        for (coord, label) in graph.nodes() {
            self.add_node(*coord)
                .label
                .set_on_location(index, label.on_location(index));
        }
    }

    pub fn insert_ends(&mut self, ends: impl IntoIterator<Item = LabelledEnd>) {
        for end in ends {
            self.add_node(*end.end.coordinate()).insert(end);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{coord, geom::GeometryFactory};

    #[test]
    fn bundle_labels() {
        struct Test {
            name: &'static str,
            labels: Vec<Label>,
            on: Location,
            left: Location,
        }

        let area = |left, right| Label::area(0, Location::Boundary, left, right);
        vec![
            Test {
                name: "single area end",
                labels: vec![area(Location::Exterior, Location::Interior)],
                on: Location::Boundary,
                left: Location::Exterior,
            },
            Test {
                name: "two boundaries cancel out",
                labels: vec![
                    area(Location::Exterior, Location::Interior),
                    area(Location::Interior, Location::Exterior),
                ],
                on: Location::Interior,
                left: Location::Interior,
            },
        ]
        .into_iter()
        .for_each(|test| {
            let mut node = RelateNode::default();
            test.labels.into_iter().for_each(|label| {
                node.insert(LabelledEnd {
                    end: EdgeEnd::new(coord!(0, 0), coord!(1, 0)),
                    label,
                    edge: 0,
                })
            });

            assert_eq!(node.bundles().len(), 1, "{}", test.name);
            node.compute_bundle_labels(BoundaryNodeRule::Mod2);
            let label = &node.bundles()[0].label;
            assert_eq!(label.on_location(0), test.on, "{}", test.name);
            assert_eq!(label.location(0, Position::Left), test.left, "{}", test.name);
        });
    }

    #[test]
    fn polygon_nodes_are_consistent() {
        let factory = GeometryFactory::floating();
        let square = factory
            .polygon(
                vec![coord!(0, 0), coord!(0, 4), coord!(4, 4), coord!(4, 0), coord!(0, 0)],
                vec![],
            )
            .unwrap();

        let graph = GeometryGraph::new(0, &square);
        let mut nodes = RelateNodeGraph::build(&graph);
        let rule = graph.boundary_node_rule();
        for (_, node) in nodes.iter_mut() {
            assert_eq!(node.bundles().len(), 2);
            assert!(node.is_area_labels_consistent(0, rule).unwrap());
        }
    }
}
