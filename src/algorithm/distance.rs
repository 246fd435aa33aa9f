//! Euclidean distances between points and segments.

use crate::geom::Coordinate;

/// Returns the distance from `p` to the segment `a`-`b`.
pub fn point_to_segment(p: &Coordinate, a: &Coordinate, b: &Coordinate) -> f64 {
    if a == b {
        return p.distance(a);
    }

    let len2 = (b.x - a.x).powi(2) + (b.y - a.y).powi(2);
    let r = ((p.x - a.x) * (b.x - a.x) + (p.y - a.y) * (b.y - a.y)) / len2;

    if r <= 0. {
        return p.distance(a);
    }
    if r >= 1. {
        return p.distance(b);
    }

    let s = ((a.y - p.y) * (b.x - a.x) - (a.x - p.x) * (b.y - a.y)) / len2;
    s.abs() * len2.sqrt()
}

/// Returns the distance from `p` to the infinite line through `a` and `b`.
pub fn point_to_line_perpendicular(p: &Coordinate, a: &Coordinate, b: &Coordinate) -> f64 {
    let len2 = (b.x - a.x).powi(2) + (b.y - a.y).powi(2);
    if len2 == 0. {
        return p.distance(a);
    }
    let s = ((a.y - p.y) * (b.x - a.x) - (a.x - p.x) * (b.y - a.y)) / len2;
    s.abs() * len2.sqrt()
}

/// Returns the distance from `p` to the polyline through the given points.
pub fn point_to_segment_string(p: &Coordinate, line: &[Coordinate]) -> f64 {
    match line {
        [] => f64::INFINITY,
        [only] => p.distance(only),
        _ => line
            .windows(2)
            .map(|w| point_to_segment(p, &w[0], &w[1]))
            .fold(f64::INFINITY, f64::min),
    }
}

/// Returns the distance between the segments `a`-`b` and `c`-`d`.
pub fn segment_to_segment(a: &Coordinate, b: &Coordinate, c: &Coordinate, d: &Coordinate) -> f64 {
    use crate::algorithm::intersector::LineIntersector;

    let mut li = LineIntersector::new();
    li.compute_intersection(a, b, c, d);
    if li.has_intersection() {
        return 0.;
    }

    [
        point_to_segment(a, c, d),
        point_to_segment(b, c, d),
        point_to_segment(c, a, b),
        point_to_segment(d, a, b),
    ]
    .into_iter()
    .fold(f64::INFINITY, f64::min)
}

/// Returns the point of segment `a`-`b` closest to `p`.
pub fn closest_point_on_segment(p: &Coordinate, a: &Coordinate, b: &Coordinate) -> Coordinate {
    let r = projection_factor(p, a, b);
    if r <= 0. {
        return *a;
    }
    if r >= 1. {
        return *b;
    }
    Coordinate::new(a.x + r * (b.x - a.x), a.y + r * (b.y - a.y))
}

/// Returns the position of the projection of `p` along `a`-`b`, 0 at `a` and 1 at `b`.
pub fn projection_factor(p: &Coordinate, a: &Coordinate, b: &Coordinate) -> f64 {
    if p == a {
        return 0.;
    }
    if p == b {
        return 1.;
    }
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let len2 = dx * dx + dy * dy;
    if len2 <= 0. {
        return f64::NAN;
    }
    ((p.x - a.x) * dx + (p.y - a.y) * dy) / len2
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coord;

    #[test]
    fn distances_to_segment() {
        struct Test {
            name: &'static str,
            p: Coordinate,
            want: f64,
        }

        let (a, b) = (coord!(0, 0), coord!(10, 0));
        vec![
            Test {
                name: "perpendicular foot inside",
                p: coord!(5, 3),
                want: 3.,
            },
            Test {
                name: "beyond the start",
                p: coord!(-3, 4),
                want: 5.,
            },
            Test {
                name: "beyond the end",
                p: coord!(13, -4),
                want: 5.,
            },
            Test {
                name: "on the segment",
                p: coord!(7, 0),
                want: 0.,
            },
        ]
        .into_iter()
        .for_each(|test| {
            let got = point_to_segment(&test.p, &a, &b);
            assert!((got - test.want).abs() < 1e-12, "{}: got {got}", test.name);
        });
    }

    #[test]
    fn distance_between_segments() {
        let d = segment_to_segment(&coord!(0, 0), &coord!(1, 0), &coord!(0, 2), &coord!(1, 2));
        assert_eq!(d, 2.);
        let d = segment_to_segment(&coord!(0, 0), &coord!(2, 2), &coord!(0, 2), &coord!(2, 0));
        assert_eq!(d, 0.);
    }
}
