//! Convex hull of the vertices of a geometry.

use crate::{
    algorithm::orientation::{self, Orientation},
    geom::{Coordinate, CoordinateSequence, Geometry},
};

/// Returns the smallest convex geometry containing every vertex of the given one.
///
/// The result is an empty collection, a point, a line string when every vertex is
/// collinear, or a polygon whose shell runs clockwise.
pub fn convex_hull(geometry: &Geometry) -> Geometry {
    let factory = geometry.factory();
    let mut points = geometry.coordinates();
    points.sort();
    points.dedup_by(|a, b| a.equals_2d(b));

    match points.len() {
        0 => return factory.empty_collection(),
        1 => return factory.point(points[0]),
        _ => {}
    }

    let hull = monotone_chain(&points);
    if hull.len() < 3 {
        let line = vec![hull[0], hull[hull.len() - 1]];
        return factory
            .line_string(line)
            .unwrap_or_else(|_| factory.empty_line_string());
    }

    let mut shell = vec![hull[0]];
    shell.extend(hull[1..].iter().rev());
    shell.push(hull[0]);
    factory
        .polygon(CoordinateSequence::from(shell), Vec::new())
        .unwrap_or_else(|_| factory.empty_polygon())
}

/// Returns the strictly convex vertices of the hull of the given sorted, distinct points,
/// counter-clockwise from the smallest one.
fn monotone_chain(points: &[Coordinate]) -> Vec<Coordinate> {
    let turns_left = |chain: &[Coordinate], p: &Coordinate| {
        let n = chain.len();
        orientation::index(&chain[n - 2], &chain[n - 1], p) == Orientation::Left.value()
    };

    let mut lower: Vec<Coordinate> = Vec::with_capacity(points.len());
    for p in points {
        while lower.len() >= 2 && !turns_left(&lower, p) {
            lower.pop();
        }
        lower.push(*p);
    }

    let mut upper: Vec<Coordinate> = Vec::with_capacity(points.len());
    for p in points.iter().rev() {
        while upper.len() >= 2 && !turns_left(&upper, p) {
            upper.pop();
        }
        upper.push(*p);
    }

    lower.pop();
    upper.pop();
    lower.extend(upper);
    lower
}
