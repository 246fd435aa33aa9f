use std::cmp::Ordering;

use crate::{
    algorithm::{angle::quadrant, orientation},
    geom::Coordinate,
};

/// The direction in which an edge leaves a node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeEnd {
    p0: Coordinate,
    p1: Coordinate,
    dx: f64,
    dy: f64,
    quadrant: u8,
}

impl EdgeEnd {
    /// Returns the end leaving `p0` towards `p1`; both points must differ.
    pub fn new(p0: Coordinate, p1: Coordinate) -> Self {
        let dx = p1.x - p0.x;
        let dy = p1.y - p0.y;
        Self {
            p0,
            p1,
            dx,
            dy,
            quadrant: quadrant::of_unchecked(dx, dy),
        }
    }

    /// The node the end leaves from.
    pub fn coordinate(&self) -> &Coordinate {
        &self.p0
    }

    /// A point the end heads to.
    pub fn directed_coordinate(&self) -> &Coordinate {
        &self.p1
    }

    pub fn dx(&self) -> f64 {
        self.dx
    }

    pub fn dy(&self) -> f64 {
        self.dy
    }

    pub fn quadrant(&self) -> u8 {
        self.quadrant
    }

    /// Orders ends by the angle they make with the positive x-axis, counter-clockwise.
    ///
    /// Quadrants are compared first; ends in the same quadrant are ordered by a robust
    /// orientation test, so no angle is ever computed.
    pub fn compare_direction(&self, other: &EdgeEnd) -> Ordering {
        if self.dx == other.dx && self.dy == other.dy {
            return Ordering::Equal;
        }

        self.quadrant
            .cmp(&other.quadrant)
            .then_with(|| orientation::index(&other.p0, &other.p1, &self.p1).cmp(&0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coord;

    #[test]
    fn ends_sort_counter_clockwise() {
        let origin = coord!(0, 0);
        let mut ends = vec![
            EdgeEnd::new(origin, coord!(0, -1)),
            EdgeEnd::new(origin, coord!(-1, 1)),
            EdgeEnd::new(origin, coord!(1, 0)),
            EdgeEnd::new(origin, coord!(1, 1)),
            EdgeEnd::new(origin, coord!(2, 1)),
        ];

        ends.sort_by(EdgeEnd::compare_direction);
        let targets: Vec<Coordinate> = ends.iter().map(|end| *end.directed_coordinate()).collect();
        assert_eq!(
            targets,
            vec![coord!(1, 0), coord!(2, 1), coord!(1, 1), coord!(-1, 1), coord!(0, -1)]
        );
    }
}
