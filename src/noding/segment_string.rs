use std::cmp::Ordering;

use crate::{
    error::{GeometryError, Result},
    geom::Coordinate,
};

/// A point at which a segment string must be split.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentNode {
    pub coord: Coordinate,
    /// The index of the segment containing the node.
    pub segment_index: usize,
    /// Squared distance from the start of the containing segment.
    distance: f64,
    /// Whether the node lies strictly after the start vertex of its segment.
    is_interior: bool,
}

impl SegmentNode {
    pub fn is_interior(&self) -> bool {
        self.is_interior
    }

    /// Orders nodes along the string.
    fn compare(&self, other: &Self) -> Ordering {
        self.segment_index
            .cmp(&other.segment_index)
            .then_with(|| self.distance.total_cmp(&other.distance))
    }
}

/// The nodes of a segment string, kept sorted once split.
#[derive(Debug, Default, Clone)]
pub struct SegmentNodeList {
    nodes: Vec<SegmentNode>,
}

impl SegmentNodeList {
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SegmentNode> {
        self.nodes.iter()
    }

    fn add(&mut self, coords: &[Coordinate], coord: Coordinate, segment_index: usize) {
        let start = &coords[segment_index];
        let node = SegmentNode {
            coord,
            segment_index,
            distance: (coord.x - start.x).powi(2) + (coord.y - start.y).powi(2),
            is_interior: !coord.equals_2d(start),
        };

        let exists = self
            .nodes
            .iter()
            .any(|other| other.segment_index == segment_index && other.coord.equals_2d(&coord));
        if !exists {
            self.nodes.push(node);
        }
    }

    fn sort(&mut self) {
        self.nodes.sort_by(SegmentNode::compare);
        self.nodes
            .dedup_by(|a, b| a.segment_index == b.segment_index && a.coord.equals_2d(&b.coord));
    }
}

/// A chain of coordinates tagged with caller data, which records the nodes found on it.
#[derive(Debug, Clone)]
pub struct NodedSegmentString<D> {
    coords: Vec<Coordinate>,
    data: D,
    nodes: SegmentNodeList,
}

impl<D> NodedSegmentString<D> {
    pub fn new(coords: Vec<Coordinate>, data: D) -> Self {
        Self {
            coords,
            data,
            nodes: SegmentNodeList::default(),
        }
    }

    pub fn coords(&self) -> &[Coordinate] {
        &self.coords
    }

    pub fn into_coords(self) -> Vec<Coordinate> {
        self.coords
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

    pub fn data(&self) -> &D {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut D {
        &mut self.data
    }

    pub fn into_data(self) -> D {
        self.data
    }

    pub fn nodes(&self) -> &SegmentNodeList {
        &self.nodes
    }

    /// Returns true if the first and last coordinates are equal.
    pub fn is_closed(&self) -> bool {
        self.coords.len() > 1 && self.coords[0].equals_2d(&self.coords[self.coords.len() - 1])
    }

    /// Returns the number of segments.
    pub fn segment_count(&self) -> usize {
        self.coords.len().saturating_sub(1)
    }

    /// Returns the end points of the segment at the given index.
    pub fn segment(&self, index: usize) -> (Coordinate, Coordinate) {
        (self.coords[index], self.coords[index + 1])
    }

    /// Returns true if both segments are consecutive in this string, including the last and
    /// first segments of a closed string.
    pub fn is_adjacent(&self, segment0: usize, segment1: usize) -> bool {
        if segment0.abs_diff(segment1) == 1 {
            return true;
        }

        let last = self.segment_count().saturating_sub(1);
        self.is_closed()
            && ((segment0 == 0 && segment1 == last) || (segment1 == 0 && segment0 == last))
    }

    /// Records a node on the given segment.
    ///
    /// A node equal to the end of its segment is recorded at the start of the next one.
    pub fn add_intersection(&mut self, coord: Coordinate, segment_index: usize) -> Result<()> {
        if segment_index + 1 >= self.coords.len() {
            return Err(GeometryError::assertion(format!(
                "segment index {segment_index} out of range for a string of {} points",
                self.coords.len()
            )));
        }

        let mut index = segment_index;
        if coord.equals_2d(&self.coords[index + 1]) && index + 2 < self.coords.len() {
            index += 1;
        }

        self.nodes.add(&self.coords, coord, index);
        Ok(())
    }

    /// Splits the string at its nodes, returning the pieces in order.
    ///
    /// Both end points are always nodes. Collapsed A-B-A sequences get a node at their
    /// turning vertex so no piece doubles back on itself.
    pub fn into_substrings(mut self) -> Vec<NodedSegmentString<D>>
    where
        D: Clone,
    {
        if self.coords.len() < 2 {
            return Vec::new();
        }

        let last = self.coords.len() - 1;
        let (first_coord, last_coord) = (self.coords[0], self.coords[last]);
        self.nodes.add(&self.coords, first_coord, 0);
        self.nodes.add(&self.coords, last_coord, last - 1);
        self.add_collapsed_nodes();
        self.nodes.sort();

        let coords = &self.coords;
        let nodes = &self.nodes.nodes;
        let mut pieces = Vec::with_capacity(nodes.len().saturating_sub(1));
        for pair in nodes.windows(2) {
            let piece = split_between(coords, &pair[0], &pair[1]);
            if piece.len() >= 2 {
                pieces.push(NodedSegmentString::new(piece, self.data.clone()));
            }
        }

        pieces
    }

    fn add_collapsed_nodes(&mut self) {
        let mut collapsed = Vec::new();

        for i in 0..self.coords.len().saturating_sub(2) {
            if self.coords[i].equals_2d(&self.coords[i + 2]) {
                collapsed.push(i + 1);
            }
        }

        self.nodes.sort();
        for pair in self.nodes.nodes.windows(2) {
            let (node0, node1) = (&pair[0], &pair[1]);
            if !node0.coord.equals_2d(&node1.coord) {
                continue;
            }
            let mut between = node1.segment_index - node0.segment_index;
            if !node1.is_interior {
                between = between.saturating_sub(1);
            }
            if between == 1 {
                collapsed.push(node0.segment_index + 1);
            }
        }

        for index in collapsed {
            let coord = self.coords[index];
            self.nodes.add(&self.coords, coord, index.min(self.coords.len() - 2));
        }
    }
}

/// Returns the coordinates of the string between two sorted nodes.
fn split_between(coords: &[Coordinate], node0: &SegmentNode, node1: &SegmentNode) -> Vec<Coordinate> {
    let last_segment_start = &coords[node1.segment_index];
    let use_end = node1.is_interior || !node1.coord.equals_2d(last_segment_start);

    let mut piece = Vec::with_capacity(node1.segment_index - node0.segment_index + 2);
    piece.push(node0.coord);
    for coord in &coords[node0.segment_index + 1..=node1.segment_index] {
        if piece.last().is_none_or(|last: &Coordinate| !last.equals_2d(coord)) {
            piece.push(*coord);
        }
    }
    if use_end && piece.last().is_none_or(|last| !last.equals_2d(&node1.coord)) {
        piece.push(node1.coord);
    }

    piece
}

/// Returns the coordinates of every string with consecutive duplicates removed.
pub fn without_repeated_points(coords: &[Coordinate]) -> Vec<Coordinate> {
    let mut out: Vec<Coordinate> = Vec::with_capacity(coords.len());
    for coord in coords {
        if out.last().is_none_or(|last| !last.equals_2d(coord)) {
            out.push(*coord);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coord;

    fn pieces_of(string: NodedSegmentString<()>) -> Vec<Vec<Coordinate>> {
        string
            .into_substrings()
            .into_iter()
            .map(NodedSegmentString::into_coords)
            .collect()
    }

    #[test]
    fn split_at_nodes() {
        let mut string =
            NodedSegmentString::new(vec![coord!(0, 0), coord!(10, 0), coord!(10, 10)], ());
        string.add_intersection(coord!(5, 0), 0).unwrap();
        string.add_intersection(coord!(2, 0), 0).unwrap();
        string.add_intersection(coord!(10, 0), 0).unwrap();

        assert_eq!(
            pieces_of(string),
            vec![
                vec![coord!(0, 0), coord!(2, 0)],
                vec![coord!(2, 0), coord!(5, 0)],
                vec![coord!(5, 0), coord!(10, 0)],
                vec![coord!(10, 0), coord!(10, 10)],
            ]
        );
    }

    #[test]
    fn unnoded_string_is_kept_whole() {
        let coords = vec![coord!(0, 0), coord!(1, 0), coord!(1, 1)];
        let string = NodedSegmentString::new(coords.clone(), ());
        assert_eq!(pieces_of(string), vec![coords]);
    }

    #[test]
    fn adjacency() {
        let ring = NodedSegmentString::new(
            vec![coord!(0, 0), coord!(1, 0), coord!(1, 1), coord!(0, 0)],
            (),
        );
        assert!(ring.is_adjacent(0, 1));
        assert!(ring.is_adjacent(2, 0));
        assert!(!ring.is_adjacent(0, 0));
    }

    #[test]
    fn segment_index_out_of_range() {
        let mut string = NodedSegmentString::new(vec![coord!(0, 0), coord!(1, 0)], ());
        assert!(string.add_intersection(coord!(0.5, 0), 1).is_err());
    }
}
