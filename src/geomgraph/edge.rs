use std::collections::HashMap;

use crate::{
    algorithm::LineIntersector,
    geom::{Coordinate, Envelope, Location, sequence::increasing_direction},
    geomgraph::{Depth, Label},
};

/// A point where an edge must be split, located by segment and distance along it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeIntersection {
    pub coord: Coordinate,
    pub segment_index: usize,
    pub distance: f64,
}

impl EdgeIntersection {
    fn key(&self) -> (usize, f64) {
        (self.segment_index, self.distance)
    }
}

/// A chain of coordinates of an input or result geometry, with its topology.
#[derive(Debug, Clone)]
pub struct Edge {
    coords: Vec<Coordinate>,
    envelope: Envelope,
    pub label: Label,
    pub depth: Depth,
    /// The change in area depth from the left to the right side.
    pub depth_delta: i32,
    /// Whether the edge intersects no edge of the other geometry.
    pub is_isolated: bool,
    /// Whether a line edge is covered by the result area, once known.
    pub covered: Option<bool>,
    pub in_result: bool,
    intersections: Vec<EdgeIntersection>,
}

impl PartialEq for Edge {
    /// Edges are equal if they have the same coordinates, in either direction.
    fn eq(&self, other: &Self) -> bool {
        if self.coords.len() != other.coords.len() {
            return false;
        }

        self.is_pointwise_equal(other)
            || self
                .coords
                .iter()
                .zip(other.coords.iter().rev())
                .all(|(a, b)| a.equals_2d(b))
    }
}

impl Edge {
    pub fn new(coords: Vec<Coordinate>, label: Label) -> Self {
        Self {
            envelope: Envelope::of_coordinates(&coords),
            coords,
            label,
            depth: Depth::default(),
            depth_delta: 0,
            is_isolated: true,
            covered: None,
            in_result: false,
            intersections: Vec::new(),
        }
    }

    pub fn coords(&self) -> &[Coordinate] {
        &self.coords
    }

    pub fn coordinate(&self, index: usize) -> &Coordinate {
        &self.coords[index]
    }

    pub fn len(&self) -> usize {
        self.coords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coords.is_empty()
    }

    pub fn envelope(&self) -> &Envelope {
        &self.envelope
    }

    pub fn is_closed(&self) -> bool {
        self.coords.len() > 1 && self.coords[0].equals_2d(&self.coords[self.coords.len() - 1])
    }

    /// Returns true if the coordinates are equal in the same order.
    pub fn is_pointwise_equal(&self, other: &Edge) -> bool {
        self.coords.len() == other.coords.len()
            && self
                .coords
                .iter()
                .zip(other.coords.iter())
                .all(|(a, b)| a.equals_2d(b))
    }

    /// Returns true if the edge is an area edge that folds back onto itself.
    pub fn is_collapsed(&self) -> bool {
        self.label.is_area() && self.coords.len() == 3 && self.coords[0].equals_2d(&self.coords[2])
    }

    /// Returns the line edge a collapsed edge stands for.
    pub fn collapsed_edge(&self) -> Edge {
        Edge::new(vec![self.coords[0], self.coords[1]], self.label.to_line())
    }

    /// Returns true if a line edge is known to be covered by the result area.
    pub fn is_covered(&self) -> bool {
        self.covered == Some(true)
    }

    pub fn intersections(&self) -> &[EdgeIntersection] {
        &self.intersections
    }

    /// Records every intersection found by the intersector, as seen from the given input
    /// segment of it.
    pub fn add_intersections(&mut self, li: &LineIntersector, segment_index: usize, input: usize) {
        for index in 0..li.intersection_num() {
            self.add_intersection(li, segment_index, input, index);
        }
    }

    fn add_intersection(&mut self, li: &LineIntersector, segment_index: usize, input: usize, index: usize) {
        let coord = li.intersection_at(index);
        let mut segment_index = segment_index;
        let mut distance = li.edge_distance(input, index);

        // an intersection at the end of a segment is recorded at the start of the next one
        let next = segment_index + 1;
        if next < self.coords.len() && coord.equals_2d(&self.coords[next]) {
            segment_index = next;
            distance = 0.0;
        }

        self.insert_intersection(EdgeIntersection {
            coord,
            segment_index,
            distance,
        });
    }

    fn insert_intersection(&mut self, intersection: EdgeIntersection) {
        let key = intersection.key();
        let position = self.intersections.partition_point(|other| {
            let other = other.key();
            other.0 < key.0 || (other.0 == key.0 && other.1 < key.1)
        });

        if self
            .intersections
            .get(position)
            .is_some_and(|other| other.key() == key)
        {
            return;
        }
        self.intersections.insert(position, intersection);
    }

    /// Returns true if the coordinate is one of the recorded intersections.
    pub fn is_intersection(&self, coord: &Coordinate) -> bool {
        self.intersections.iter().any(|node| node.coord.equals_2d(coord))
    }

    /// Returns the intersections together with both endpoints, in order along the edge.
    pub fn nodes(&self) -> Vec<EdgeIntersection> {
        let mut nodes = self.intersections.clone();
        let last = self.coords.len() - 1;
        for endpoint in [
            EdgeIntersection {
                coord: self.coords[0],
                segment_index: 0,
                distance: 0.0,
            },
            EdgeIntersection {
                coord: self.coords[last],
                segment_index: last,
                distance: 0.0,
            },
        ] {
            if !nodes.iter().any(|node| node.key() == endpoint.key()) {
                nodes.push(endpoint);
            }
        }

        nodes.sort_by(|a, b| {
            a.segment_index
                .cmp(&b.segment_index)
                .then_with(|| a.distance.total_cmp(&b.distance))
        });
        nodes
    }

    /// Returns the edges this one is split into by its intersections, in order.
    pub fn split(&self) -> Vec<Edge> {
        self.nodes()
            .windows(2)
            .map(|pair| Edge::new(self.split_coords(&pair[0], &pair[1]), self.label))
            .collect()
    }

    fn split_coords(&self, node0: &EdgeIntersection, node1: &EdgeIntersection) -> Vec<Coordinate> {
        let last_segment_start = &self.coords[node1.segment_index];
        let use_end = node1.distance > 0.0 || !node1.coord.equals_2d(last_segment_start);

        let mut coords = Vec::with_capacity(node1.segment_index - node0.segment_index + 2);
        coords.push(node0.coord);
        coords.extend_from_slice(&self.coords[node0.segment_index + 1..=node1.segment_index]);
        if use_end {
            coords.push(node1.coord);
        }
        coords
    }

    /// Returns the location of the edge itself relative to the given geometry.
    pub fn location(&self, geometry: usize) -> Location {
        self.label.on_location(geometry)
    }
}

/// Identifies a coordinate list regardless of its direction.
type OrientedKey = Vec<[u64; 2]>;

fn oriented_key(coords: &[Coordinate]) -> OrientedKey {
    // adding zero turns a negative zero into a positive one
    let key = |c: &Coordinate| [(c.x + 0.0).to_bits(), (c.y + 0.0).to_bits()];
    if increasing_direction(coords).is_gt() {
        coords.iter().rev().map(key).collect()
    } else {
        coords.iter().map(key).collect()
    }
}

/// A list of edges in which equal edges can be found quickly.
#[derive(Debug, Default, Clone)]
pub struct EdgeList {
    edges: Vec<Edge>,
    index: HashMap<OrientedKey, usize>,
}

impl EdgeList {
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    pub fn get(&self, index: usize) -> &Edge {
        &self.edges[index]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Edge> {
        self.edges.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Edge> {
        self.edges.iter_mut()
    }

    pub fn into_vec(self) -> Vec<Edge> {
        self.edges
    }

    pub fn as_slice(&self) -> &[Edge] {
        &self.edges
    }

    pub fn as_mut_slice(&mut self) -> &mut [Edge] {
        &mut self.edges
    }

    /// Appends an edge, returning its position.
    pub fn add(&mut self, edge: Edge) -> usize {
        let position = self.edges.len();
        self.index.insert(oriented_key(edge.coords()), position);
        self.edges.push(edge);
        position
    }

    /// Returns the position of an edge equal to the given one, if any.
    pub fn find_equal(&self, edge: &Edge) -> Option<usize> {
        self.index.get(&oriented_key(edge.coords())).copied()
    }

    /// Adds an edge unless an equal one exists, in which case its label, depth and depth
    /// delta are merged into the existing one.
    pub fn insert_unique(&mut self, edge: Edge) {
        let Some(position) = self.find_equal(&edge) else {
            self.add(edge);
            return;
        };

        let existing = &mut self.edges[position];
        let mut label = edge.label;
        let mut delta = edge.depth_delta;
        if !existing.is_pointwise_equal(&edge) {
            label.flip();
            delta = -delta;
        }

        if existing.depth.is_null() {
            let existing_label = existing.label;
            existing.depth.add(&existing_label);
        }
        existing.depth.add(&label);
        existing.depth_delta += delta;
        existing.label.merge(&label);
    }

    /// Replaces every collapsed edge by the line edge it stands for.
    pub fn replace_collapsed(&mut self) {
        let mut changed = false;
        for edge in &mut self.edges {
            if edge.is_collapsed() {
                *edge = edge.collapsed_edge();
                changed = true;
            }
        }

        if changed {
            self.index = self
                .edges
                .iter()
                .enumerate()
                .map(|(position, edge)| (oriented_key(edge.coords()), position))
                .collect();
        }
    }
}

impl FromIterator<Edge> for EdgeList {
    fn from_iter<I: IntoIterator<Item = Edge>>(iter: I) -> Self {
        let mut list = EdgeList::default();
        iter.into_iter().for_each(|edge| {
            list.add(edge);
        });
        list
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{coord, geom::Position};

    #[test]
    fn split_at_intersections() {
        let mut edge = Edge::new(
            vec![coord!(0, 0), coord!(10, 0), coord!(10, 10)],
            Label::line(0, Location::Interior),
        );

        let mut li = LineIntersector::new();
        li.compute_intersection(&coord!(0, 0), &coord!(10, 0), &coord!(5, -5), &coord!(5, 5));
        edge.add_intersections(&li, 0, 0);
        li.compute_intersection(&coord!(10, 0), &coord!(10, 10), &coord!(5, 0), &coord!(15, 0));
        edge.add_intersections(&li, 1, 0);

        let split: Vec<Vec<Coordinate>> = edge.split().iter().map(|e| e.coords().to_vec()).collect();
        assert_eq!(
            split,
            vec![
                vec![coord!(0, 0), coord!(5, 0)],
                vec![coord!(5, 0), coord!(10, 0)],
                vec![coord!(10, 0), coord!(10, 10)],
            ]
        );
    }

    #[test]
    fn unique_edges_merge_labels() {
        let mut list = EdgeList::default();
        list.insert_unique(Edge::new(
            vec![coord!(0, 0), coord!(1, 0)],
            Label::area(0, Location::Boundary, Location::Interior, Location::Exterior),
        ));
        list.insert_unique(Edge::new(
            vec![coord!(1, 0), coord!(0, 0)],
            Label::area(1, Location::Boundary, Location::Interior, Location::Exterior),
        ));

        assert_eq!(list.len(), 1);
        let edge = list.get(0);
        assert_eq!(edge.label.location(1, Position::Left), Location::Exterior);
        assert_eq!(edge.label.location(1, Position::Right), Location::Interior);
        assert_eq!(edge.depth.get(0, Position::Left), 1);
    }

    #[test]
    fn collapsed_edges() {
        let mut list: EdgeList = [Edge::new(
            vec![coord!(0, 0), coord!(1, 0), coord!(0, 0)],
            Label::area(0, Location::Boundary, Location::Interior, Location::Exterior),
        )]
        .into_iter()
        .collect();

        list.replace_collapsed();
        assert_eq!(list.get(0).coords(), &[coord!(0, 0), coord!(1, 0)]);
        assert!(list.get(0).label.is_line(0));
    }
}
