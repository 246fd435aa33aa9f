use std::collections::BTreeMap;

use crate::{
    algorithm::{Orientation, angle::quadrant},
    error::{GeometryError, Result},
    geom::{Coordinate, Location, Position},
    geomgraph::{Edge, EdgeEnd, Label, label_star},
};

/// Marks a directed edge side whose depth has not been assigned.
const NO_DEPTH: i32 = -999;

/// Returns the index of the directed edge running opposite to the given one.
///
/// Directed edges are allocated in pairs, so the pair of an edge differ only in the lowest bit.
pub fn sym(directed_edge: usize) -> usize {
    directed_edge ^ 1
}

/// A point of the graph at which edges start or end.
#[derive(Debug, Clone)]
pub struct Node {
    coord: Coordinate,
    pub label: Label,
    /// The outgoing directed edges, sorted counter-clockwise.
    star: Vec<usize>,
    pub visited: bool,
}

impl Node {
    fn new(coord: Coordinate) -> Self {
        Self {
            coord,
            label: Label::default(),
            star: Vec::new(),
            visited: false,
        }
    }

    pub fn coordinate(&self) -> &Coordinate {
        &self.coord
    }

    /// The outgoing directed edges, sorted counter-clockwise.
    pub fn star(&self) -> &[usize] {
        &self.star
    }

    pub fn degree(&self) -> usize {
        self.star.len()
    }

    /// Returns true if the node is labelled by a single geometry.
    pub fn is_isolated(&self) -> bool {
        self.label.geometry_count() == 1
    }
}

/// One of the two directions of an [`Edge`], leaving from a node.
#[derive(Debug, Clone)]
pub struct DirectedEdge {
    end: EdgeEnd,
    edge: usize,
    forward: bool,
    node: usize,
    pub label: Label,
    pub in_result: bool,
    pub visited: bool,
    /// The next edge of the maximal ring this one belongs to.
    pub next: Option<usize>,
    /// The next edge of the minimal ring this one belongs to.
    pub next_min: Option<usize>,
    pub edge_ring: Option<usize>,
    pub min_edge_ring: Option<usize>,
    depth: [i32; 3],
}

impl DirectedEdge {
    pub fn end(&self) -> &EdgeEnd {
        &self.end
    }

    pub fn coordinate(&self) -> &Coordinate {
        self.end.coordinate()
    }

    /// The index of the underlying edge.
    pub fn edge(&self) -> usize {
        self.edge
    }

    pub fn is_forward(&self) -> bool {
        self.forward
    }

    /// The index of the node this edge leaves from.
    pub fn node(&self) -> usize {
        self.node
    }

    pub fn depth(&self, position: Position) -> i32 {
        self.depth[position.index()]
    }

    /// Assigns the depth of a side, failing if a different one was assigned before.
    pub fn set_depth(&mut self, position: Position, depth: i32) -> Result<()> {
        let current = self.depth[position.index()];
        if current != NO_DEPTH && current != depth {
            return Err(GeometryError::topology(
                "assigned depths do not match",
                *self.coordinate(),
            ));
        }

        self.depth[position.index()] = depth;
        Ok(())
    }

    /// Returns true if the edge is a line in some geometry and is not in the interior of
    /// any area of the geometries it is labelled by.
    pub fn is_line_edge(&self) -> bool {
        let is_line = self.label.is_line(0) || self.label.is_line(1);
        let is_exterior = |geometry| {
            !self.label.is_area_of(geometry)
                || self.label.all_positions_equal(geometry, Location::Exterior)
        };

        is_line && is_exterior(0) && is_exterior(1)
    }

    /// Returns true if the edge has the interior of both geometries on both sides.
    pub fn is_interior_area_edge(&self) -> bool {
        (0..2).all(|geometry| {
            self.label.is_area_of(geometry)
                && self.label.location(geometry, Position::Left) == Location::Interior
                && self.label.location(geometry, Position::Right) == Location::Interior
        })
    }

    /// Returns the depth change when crossing from one location to the other.
    pub fn depth_factor(current: Location, next: Location) -> i32 {
        match (current, next) {
            (Location::Exterior, Location::Interior) => 1,
            (Location::Interior, Location::Exterior) => -1,
            _ => 0,
        }
    }
}

/// A planar graph of nodes and the directed edges between them.
///
/// Nodes, edges and directed edges live in arenas and refer to each other by index. Every
/// edge owns the two directed edges `2 * edge` and `2 * edge + 1`.
#[derive(Debug, Clone, Default)]
pub struct PlanarGraph {
    nodes: Vec<Node>,
    node_map: BTreeMap<Coordinate, usize>,
    edges: Vec<Edge>,
    directed: Vec<DirectedEdge>,
}

impl PlanarGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the node at the given coordinate, creating it if it does not exist.
    pub fn add_node(&mut self, coord: Coordinate) -> usize {
        if let Some(&index) = self.node_map.get(&coord) {
            return index;
        }

        let index = self.nodes.len();
        self.nodes.push(Node::new(coord));
        self.node_map.insert(coord, index);
        index
    }

    pub fn find_node(&self, coord: &Coordinate) -> Option<usize> {
        self.node_map.get(coord).copied()
    }

    pub fn node(&self, index: usize) -> &Node {
        &self.nodes[index]
    }

    pub fn node_mut(&mut self, index: usize) -> &mut Node {
        &mut self.nodes[index]
    }

    /// Returns the node indices ordered by coordinate.
    pub fn node_indices(&self) -> Vec<usize> {
        self.node_map.values().copied().collect()
    }

    pub fn edge(&self, index: usize) -> &Edge {
        &self.edges[index]
    }

    pub fn edge_mut(&mut self, index: usize) -> &mut Edge {
        &mut self.edges[index]
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn directed_edge(&self, index: usize) -> &DirectedEdge {
        &self.directed[index]
    }

    pub fn directed_edge_mut(&mut self, index: usize) -> &mut DirectedEdge {
        &mut self.directed[index]
    }

    pub fn directed_edges(&self) -> &[DirectedEdge] {
        &self.directed
    }

    pub fn directed_edge_count(&self) -> usize {
        self.directed.len()
    }

    /// Adds the edges, with both their directed edges, and the nodes at their endpoints.
    pub fn add_edges(&mut self, edges: impl IntoIterator<Item = Edge>) {
        for edge in edges {
            let index = self.edges.len();
            let coords = edge.coords();
            let last = coords.len() - 1;
            let forward = (coords[0], coords[1]);
            let backward = (coords[last], coords[last - 1]);
            let label = edge.label;
            self.edges.push(edge);

            self.insert_directed(index, true, forward, label);
            self.insert_directed(index, false, backward, label.flipped());
        }
    }

    fn insert_directed(
        &mut self,
        edge: usize,
        forward: bool,
        (p0, p1): (Coordinate, Coordinate),
        label: Label,
    ) {
        let node = self.add_node(p0);
        let end = EdgeEnd::new(p0, p1);
        let index = self.directed.len();
        self.directed.push(DirectedEdge {
            end,
            edge,
            forward,
            node,
            label,
            in_result: false,
            visited: false,
            next: None,
            next_min: None,
            edge_ring: None,
            min_edge_ring: None,
            depth: [0, NO_DEPTH, NO_DEPTH],
        });

        let directed = &self.directed;
        let star = &mut self.nodes[node].star;
        let position = star.partition_point(|&other| directed[other].end.compare_direction(&end).is_le());
        star.insert(position, index);
    }

    /// Marks both directions of the edge as visited or not.
    pub fn set_visited_edge(&mut self, directed_edge: usize, visited: bool) {
        self.directed[directed_edge].visited = visited;
        self.directed[sym(directed_edge)].visited = visited;
    }

    /// Returns the depth change from the left to the right side of the directed edge.
    pub fn depth_delta(&self, directed_edge: usize) -> i32 {
        let de = &self.directed[directed_edge];
        let delta = self.edges[de.edge].depth_delta;
        if de.forward { delta } else { -delta }
    }

    /// Assigns the depth of one side and derives the opposite one from the depth delta.
    pub fn set_edge_depths(&mut self, directed_edge: usize, position: Position, depth: i32) -> Result<()> {
        let direction = if position == Position::Left { -1 } else { 1 };
        let opposite = depth + self.depth_delta(directed_edge) * direction;

        let de = &mut self.directed[directed_edge];
        de.set_depth(position, depth)?;
        de.set_depth(position.opposite(), opposite)
    }

    /// Copies the depths of the directed edge onto the opposite sides of its sym.
    pub fn copy_sym_depths(&mut self, directed_edge: usize) -> Result<()> {
        let left = self.directed[directed_edge].depth(Position::Left);
        let right = self.directed[directed_edge].depth(Position::Right);

        let sym = &mut self.directed[sym(directed_edge)];
        sym.set_depth(Position::Left, right)?;
        sym.set_depth(Position::Right, left)
    }

    /// Returns true if any edge incident to the node is part of the result.
    pub fn is_incident_edge_in_result(&self, node: usize) -> bool {
        self.nodes[node]
            .star
            .iter()
            .any(|&de| self.edges[self.directed[de].edge].in_result)
    }

    /// Returns the outgoing edge of the node with the right-most direction.
    pub fn rightmost_edge(&self, node: usize) -> Result<Option<usize>> {
        let star = &self.nodes[node].star;
        let (Some(&first), Some(&last)) = (star.first(), star.last()) else {
            return Ok(None);
        };
        if star.len() == 1 {
            return Ok(Some(first));
        }

        let first_end = &self.directed[first].end;
        let last_end = &self.directed[last].end;
        match (
            quadrant::is_northern(first_end.quadrant()),
            quadrant::is_northern(last_end.quadrant()),
        ) {
            (true, true) => Ok(Some(first)),
            (false, false) => Ok(Some(last)),
            // in different hemispheres, pick a non-horizontal one
            _ if first_end.dy() != 0.0 => Ok(Some(first)),
            _ if last_end.dy() != 0.0 => Ok(Some(last)),
            _ => Err(GeometryError::assertion(
                "found two horizontal edges incident on node",
            )),
        }
    }

    /// Completes the labels of the directed edges around the node.
    ///
    /// See [`label_star`]; `locate` returns the location of the node in the area of a
    /// geometry.
    pub fn compute_labelling(
        &mut self,
        node: usize,
        locate: impl FnMut(usize, &Coordinate) -> Location,
    ) -> Result<()> {
        let star = &self.nodes[node].star;
        let mut labels: Vec<Label> = star.iter().map(|&de| self.directed[de].label).collect();
        label_star(&mut labels, &self.nodes[node].coord, locate)?;

        for (&de, label) in star.iter().zip(labels) {
            self.directed[de].label = label;
        }
        Ok(())
    }

    /// Merges into every outgoing edge the label of its sym.
    pub fn merge_sym_labels(&mut self, node: usize) {
        for &de in &self.nodes[node].star {
            let label = self.directed[sym(de)].label;
            self.directed[de].label.merge(&label);
        }
    }

    /// Merges into the node label the locations implied by its incident edges.
    pub fn update_node_labelling(&mut self, node: usize) {
        let mut label = Label::default();
        for &de in &self.nodes[node].star {
            let edge_label = &self.edges[self.directed[de].edge].label;
            for geometry in 0..2 {
                if matches!(
                    edge_label.on_location(geometry),
                    Location::Interior | Location::Boundary
                ) {
                    label.set_on_location(geometry, Location::Interior);
                }
            }
        }

        self.nodes[node].label.merge(&label);
    }

    /// Fills the unknown locations of every outgoing edge with the node's.
    pub fn update_labelling(&mut self, node: usize) {
        let node_label = self.nodes[node].label;
        for &de in &self.nodes[node].star {
            let label = &mut self.directed[de].label;
            label.set_all_locations_if_null(0, node_label.on_location(0));
            label.set_all_locations_if_null(1, node_label.on_location(1));
        }
    }

    fn result_area_edges(&self, node: usize) -> Vec<usize> {
        self.nodes[node]
            .star
            .iter()
            .copied()
            .filter(|&de| self.directed[de].in_result || self.directed[sym(de)].in_result)
            .collect()
    }

    /// Links the result edges around every node into maximal rings.
    pub fn link_result_directed_edges(&mut self) -> Result<()> {
        for node in self.node_indices() {
            self.link_result_directed_edges_at(node)?;
        }
        Ok(())
    }

    /// Links every incoming result edge of the node to the next outgoing one, clockwise.
    pub fn link_result_directed_edges_at(&mut self, node: usize) -> Result<()> {
        let mut first_out = None;
        let mut incoming: Option<usize> = None;

        for next_out in self.result_area_edges(node) {
            let next_in = sym(next_out);
            if !self.directed[next_out].label.is_area() {
                continue;
            }

            if first_out.is_none() && self.directed[next_out].in_result {
                first_out = Some(next_out);
            }

            match incoming {
                None if self.directed[next_in].in_result => incoming = Some(next_in),
                Some(de) if self.directed[next_out].in_result => {
                    self.directed[de].next = Some(next_out);
                    incoming = None;
                }
                _ => {}
            }
        }

        if let Some(de) = incoming {
            let Some(first_out) = first_out else {
                return Err(GeometryError::topology(
                    "no outgoing directed edge found",
                    self.nodes[node].coord,
                ));
            };
            self.directed[de].next = Some(first_out);
        }

        Ok(())
    }

    /// Links the edges of the maximal ring at the node into minimal rings.
    pub fn link_minimal_directed_edges(&mut self, node: usize, ring: usize) -> Result<()> {
        let mut first_out = None;
        let mut incoming: Option<usize> = None;

        // iterated clockwise
        for next_out in self.result_area_edges(node).into_iter().rev() {
            let next_in = sym(next_out);
            if first_out.is_none() && self.directed[next_out].edge_ring == Some(ring) {
                first_out = Some(next_out);
            }

            match incoming {
                None if self.directed[next_in].edge_ring == Some(ring) => incoming = Some(next_in),
                Some(de) if self.directed[next_out].edge_ring == Some(ring) => {
                    self.directed[de].next_min = Some(next_out);
                    incoming = None;
                }
                _ => {}
            }
        }

        if let Some(de) = incoming {
            let Some(first_out) = first_out else {
                return Err(GeometryError::assertion(
                    "found no first outgoing directed edge",
                ));
            };
            self.directed[de].next_min = Some(first_out);
        }

        Ok(())
    }

    /// Links every incoming edge of the node to the next outgoing one, clockwise.
    pub fn link_all_directed_edges(&mut self, node: usize) {
        let star = self.nodes[node].star.clone();
        let mut prev_out: Option<usize> = None;
        let mut first_in = None;

        for &next_out in star.iter().rev() {
            let next_in = sym(next_out);
            first_in.get_or_insert(next_in);
            if let Some(prev_out) = prev_out {
                self.directed[next_in].next = Some(prev_out);
            }
            prev_out = Some(next_out);
        }

        if let (Some(first_in), Some(prev_out)) = (first_in, prev_out) {
            self.directed[first_in].next = Some(prev_out);
        }
    }

    /// Returns how many outgoing edges of the node belong to the given maximal ring.
    pub fn outgoing_degree(&self, node: usize, ring: usize) -> usize {
        self.nodes[node]
            .star
            .iter()
            .filter(|&&de| self.directed[de].edge_ring == Some(ring))
            .count()
    }

    /// Marks the line edges around the node covered by a result area.
    pub fn find_covered_line_edges(&mut self, node: usize) {
        let star = self.nodes[node].star.clone();

        let mut start = Location::None;
        for &next_out in &star {
            let out = &self.directed[next_out];
            if out.is_line_edge() {
                continue;
            }
            if out.in_result {
                start = Location::Interior;
                break;
            }
            if self.directed[sym(next_out)].in_result {
                start = Location::Exterior;
                break;
            }
        }
        if start.is_none() {
            return;
        }

        let mut current = start;
        for &next_out in &star {
            let out = &self.directed[next_out];
            if out.is_line_edge() {
                self.edges[out.edge].covered = Some(current == Location::Interior);
                continue;
            }

            if out.in_result {
                current = Location::Exterior;
            }
            if self.directed[sym(next_out)].in_result {
                current = Location::Interior;
            }
        }
    }

    /// Propagates the depths of the given directed edge around its node.
    pub fn compute_depths(&mut self, directed_edge: usize) -> Result<()> {
        let node = self.directed[directed_edge].node;
        let star = self.nodes[node].star.clone();
        let position = star
            .iter()
            .position(|&de| de == directed_edge)
            .ok_or_else(|| GeometryError::assertion("directed edge not found in its node"))?;

        let start = self.directed[directed_edge].depth(Position::Left);
        let target = self.directed[directed_edge].depth(Position::Right);

        let next = self.compute_star_depths(&star[position + 1..], start)?;
        let last = self.compute_star_depths(&star[..position], next)?;
        if last != target {
            return Err(GeometryError::topology(
                "depth mismatch",
                *self.directed[directed_edge].coordinate(),
            ));
        }

        Ok(())
    }

    fn compute_star_depths(&mut self, edges: &[usize], start: i32) -> Result<i32> {
        let mut current = start;
        for &de in edges {
            self.set_edge_depths(de, Position::Right, current)?;
            current = self.directed[de].depth(Position::Left);
        }
        Ok(current)
    }

    /// Returns the edge leaving `p0` in the direction of `p1`, if any.
    pub fn find_edge_in_same_direction(&self, p0: &Coordinate, p1: &Coordinate) -> Option<usize> {
        let matches = |e0: &Coordinate, e1: &Coordinate| {
            p0.equals_2d(e0)
                && Orientation::of(p0, p1, e1) == Orientation::Collinear
                && quadrant::of_unchecked(p1.x - p0.x, p1.y - p0.y)
                    == quadrant::of_unchecked(e1.x - e0.x, e1.y - e0.y)
        };

        self.edges.iter().position(|edge| {
            let coords = edge.coords();
            let last = coords.len() - 1;
            matches(&coords[0], &coords[1]) || matches(&coords[last], &coords[last - 1])
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coord;

    fn area_edge(coords: Vec<Coordinate>) -> Edge {
        Edge::new(
            coords,
            Label::area(0, Location::Boundary, Location::Exterior, Location::Interior),
        )
    }

    #[test]
    fn directed_edges_come_in_pairs() {
        let mut graph = PlanarGraph::new();
        graph.add_edges([area_edge(vec![coord!(0, 0), coord!(1, 0), coord!(1, 1)])]);

        assert_eq!(graph.directed_edge_count(), 2);
        assert_eq!(sym(0), 1);
        assert!(graph.directed_edge(0).is_forward());
        assert_eq!(graph.directed_edge(1).coordinate(), &coord!(1, 1));
        assert_eq!(
            graph.directed_edge(1).label.location(0, Position::Left),
            Location::Interior
        );
        assert_eq!(graph.node_indices().len(), 2);
    }

    #[test]
    fn star_is_sorted_counter_clockwise() {
        let mut graph = PlanarGraph::new();
        graph.add_edges([
            area_edge(vec![coord!(0, 0), coord!(0, -1)]),
            area_edge(vec![coord!(0, 0), coord!(-1, 0)]),
            area_edge(vec![coord!(0, 0), coord!(1, 0)]),
            area_edge(vec![coord!(0, 0), coord!(0, 1)]),
        ]);

        let origin = graph.find_node(&coord!(0, 0)).unwrap();
        let targets: Vec<Coordinate> = graph
            .node(origin)
            .star()
            .iter()
            .map(|&de| *graph.directed_edge(de).end().directed_coordinate())
            .collect();
        assert_eq!(
            targets,
            vec![coord!(1, 0), coord!(0, 1), coord!(-1, 0), coord!(0, -1)]
        );
        assert_eq!(graph.rightmost_edge(origin).unwrap(), Some(0));
    }

    #[test]
    fn conflicting_sides_are_a_topology_error() {
        let mut graph = PlanarGraph::new();
        graph.add_edges([
            area_edge(vec![coord!(0, 0), coord!(1, 0)]),
            area_edge(vec![coord!(0, 0), coord!(0, 1)]),
        ]);

        let origin = graph.find_node(&coord!(0, 0)).unwrap();
        let result = graph.compute_labelling(origin, |_, _| Location::Exterior);
        assert!(result.is_err_and(|err| err.is_topology()));
    }
}
