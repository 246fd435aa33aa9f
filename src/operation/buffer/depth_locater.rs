use std::cmp::Ordering;

use crate::{
    algorithm::Orientation,
    geom::{Coordinate, Position},
    geomgraph::PlanarGraph,
    operation::buffer::subgraph::BufferSubgraph,
};

/// Returns the depth of a point, given the subgraphs lying to its right.
///
/// A ray is cast from the point to the right; the depth is the one on the left of the
/// closest upward segment it stabs, or zero if it stabs none.
pub(super) fn depth_at(graph: &PlanarGraph, subgraphs: &[BufferSubgraph], p: &Coordinate) -> i32 {
    subgraphs
        .iter()
        .filter(|subgraph| {
            let envelope = subgraph.envelope();
            p.y >= envelope.min_y && p.y <= envelope.max_y
        })
        .flat_map(|subgraph| stabbed_segments(graph, subgraph.directed_edges(), p))
        .min_by(DepthSegment::compare)
        .map(|segment| segment.left_depth)
        .unwrap_or(0)
}

fn stabbed_segments<'a>(
    graph: &'a PlanarGraph,
    directed_edges: &'a [usize],
    p: &'a Coordinate,
) -> impl Iterator<Item = DepthSegment> + 'a {
    directed_edges
        .iter()
        .map(|&de| graph.directed_edge(de))
        .filter(|directed| directed.is_forward())
        .flat_map(move |directed| {
            let coords = graph.edge(directed.edge()).coords();
            coords.windows(2).filter_map(move |segment| {
                let (p0, p1) = (segment[0], segment[1]);
                let upward = p0.y <= p1.y;
                let (low, high) = if upward { (p0, p1) } else { (p1, p0) };

                if low.x.max(high.x) < p.x || low.y == high.y {
                    return None;
                }
                if p.y < low.y || p.y > high.y {
                    return None;
                }
                if Orientation::of(&low, &high, p) == Orientation::Right {
                    return None;
                }

                let left_depth = match upward {
                    true => directed.depth(Position::Left),
                    false => directed.depth(Position::Right),
                };
                Some(DepthSegment { low, high, left_depth })
            })
        })
}

/// A segment oriented upwards with the depth on its left.
#[derive(Debug, Clone, Copy)]
struct DepthSegment {
    low: Coordinate,
    high: Coordinate,
    left_depth: i32,
}

impl DepthSegment {
    fn min_x(&self) -> f64 {
        self.low.x.min(self.high.x)
    }

    fn max_x(&self) -> f64 {
        self.low.x.max(self.high.x)
    }

    /// Orders segments from left to right, for segments stabbed by the same horizontal
    /// ray.
    fn compare(&self, other: &Self) -> Ordering {
        if self.min_x() >= other.max_x() {
            return Ordering::Greater;
        }
        if self.max_x() <= other.min_x() {
            return Ordering::Less;
        }

        match self.orientation_of(other) {
            0 => {}
            orientation => return orientation.cmp(&0),
        }
        match -other.orientation_of(self) {
            0 => {}
            orientation => return orientation.cmp(&0),
        }

        (self.low, self.high).cmp(&(other.low, other.high))
    }

    /// Returns on which side of this segment the other lies: 1 on the left, -1 on the
    /// right, 0 if it crosses or is collinear.
    fn orientation_of(&self, other: &Self) -> i32 {
        let first = Orientation::of(&self.low, &self.high, &other.low).value();
        let second = Orientation::of(&self.low, &self.high, &other.high).value();
        if first >= 0 && second >= 0 {
            first.max(second)
        } else if first <= 0 && second <= 0 {
            first.min(second)
        } else {
            0
        }
    }
}
