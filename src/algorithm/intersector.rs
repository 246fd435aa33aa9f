//! Segment intersection.

use crate::{
    algorithm::{dd::DD, distance, orientation::Orientation},
    geom::{Coordinate, Envelope, PrecisionModel, wkt},
};

/// The kind of intersection found between two segments.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum IntersectionKind {
    /// The segments do not intersect.
    #[default]
    None,
    /// The segments intersect in a single point.
    Point,
    /// The segments are collinear and overlap in a segment.
    Collinear,
}

/// Computes the intersection of two segments, robustly.
///
/// The last computed intersection is kept as state and can be queried afterwards.
#[derive(Debug, Clone, Default)]
pub struct LineIntersector {
    precision: Option<PrecisionModel>,
    kind: IntersectionKind,
    input: [[Coordinate; 2]; 2],
    points: [Coordinate; 2],
    proper: bool,
}

impl LineIntersector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns an intersector rounding computed points to the given model.
    pub fn with_precision(precision: PrecisionModel) -> Self {
        Self {
            precision: (!precision.is_floating()).then_some(precision),
            ..Default::default()
        }
    }

    pub fn set_precision(&mut self, precision: PrecisionModel) {
        self.precision = (!precision.is_floating()).then_some(precision);
    }

    pub fn precision(&self) -> PrecisionModel {
        self.precision.unwrap_or_default()
    }

    /// Tests whether `p` lies on segment `p1`-`p2`.
    pub fn compute_point_intersection(&mut self, p: &Coordinate, p1: &Coordinate, p2: &Coordinate) {
        self.proper = false;
        self.kind = IntersectionKind::None;

        if Envelope::of_segment(p1, p2).intersects_point(p)
            && Orientation::of(p1, p2, p) == Orientation::Collinear
            && Orientation::of(p2, p1, p) == Orientation::Collinear
        {
            self.proper = p != p1 && p != p2;
            self.points[0] = *p;
            self.kind = IntersectionKind::Point;
        }
    }

    /// Computes the intersection of segments `p1`-`p2` and `q1`-`q2`.
    pub fn compute_intersection(
        &mut self,
        p1: &Coordinate,
        p2: &Coordinate,
        q1: &Coordinate,
        q2: &Coordinate,
    ) {
        self.input = [[*p1, *p2], [*q1, *q2]];
        self.kind = self.compute(p1, p2, q1, q2);
    }

    fn compute(
        &mut self,
        p1: &Coordinate,
        p2: &Coordinate,
        q1: &Coordinate,
        q2: &Coordinate,
    ) -> IntersectionKind {
        self.proper = false;

        if !Envelope::of_segment(p1, p2).intersects(&Envelope::of_segment(q1, q2)) {
            return IntersectionKind::None;
        }

        let pq1 = Orientation::of(p1, p2, q1).value();
        let pq2 = Orientation::of(p1, p2, q2).value();
        if (pq1 > 0 && pq2 > 0) || (pq1 < 0 && pq2 < 0) {
            return IntersectionKind::None;
        }

        let qp1 = Orientation::of(q1, q2, p1).value();
        let qp2 = Orientation::of(q1, q2, p2).value();
        if (qp1 > 0 && qp2 > 0) || (qp1 < 0 && qp2 < 0) {
            return IntersectionKind::None;
        }

        if pq1 == 0 && pq2 == 0 && qp1 == 0 && qp2 == 0 {
            return self.compute_collinear(p1, p2, q1, q2);
        }

        if pq1 == 0 || pq2 == 0 || qp1 == 0 || qp2 == 0 {
            // An endpoint touches the other segment; copy the exact vertex.
            self.points[0] = if p1 == q1 || p1 == q2 {
                copy_with_z(p1, q1, q2)
            } else if p2 == q1 || p2 == q2 {
                copy_with_z(p2, q1, q2)
            } else if pq1 == 0 {
                copy_with_z(q1, p1, p2)
            } else if pq2 == 0 {
                copy_with_z(q2, p1, p2)
            } else if qp1 == 0 {
                copy_with_z(p1, q1, q2)
            } else {
                copy_with_z(p2, q1, q2)
            };
        } else {
            self.proper = true;
            self.points[0] = self.intersection(p1, p2, q1, q2);
        }

        IntersectionKind::Point
    }

    fn compute_collinear(
        &mut self,
        p1: &Coordinate,
        p2: &Coordinate,
        q1: &Coordinate,
        q2: &Coordinate,
    ) -> IntersectionKind {
        let p_env = Envelope::of_segment(p1, p2);
        let q_env = Envelope::of_segment(q1, q2);
        let q1_in_p = p_env.intersects_point(q1);
        let q2_in_p = p_env.intersects_point(q2);
        let p1_in_q = q_env.intersects_point(p1);
        let p2_in_q = q_env.intersects_point(p2);

        if q1_in_p && q2_in_p {
            self.points = [copy_with_z(q1, p1, p2), copy_with_z(q2, p1, p2)];
            return IntersectionKind::Collinear;
        }
        if p1_in_q && p2_in_q {
            self.points = [copy_with_z(p1, q1, q2), copy_with_z(p2, q1, q2)];
            return IntersectionKind::Collinear;
        }

        let candidates = [
            (q1_in_p && p1_in_q, q1, p1, q2_in_p || p2_in_q),
            (q1_in_p && p2_in_q, q1, p2, q2_in_p || p1_in_q),
            (q2_in_p && p1_in_q, q2, p1, q1_in_p || p2_in_q),
            (q2_in_p && p2_in_q, q2, p2, q1_in_p || p1_in_q),
        ];

        for (applies, q, p, other) in candidates {
            if applies {
                self.points = [copy_with_z(q, p1, p2), copy_with_z(p, q1, q2)];
                return if q == p && !other {
                    IntersectionKind::Point
                } else {
                    IntersectionKind::Collinear
                };
            }
        }

        IntersectionKind::None
    }

    /// Computes the proper intersection point, falling back to the nearest endpoint when
    /// rounding pushes the computed point outside the segment envelopes.
    fn intersection(
        &self,
        p1: &Coordinate,
        p2: &Coordinate,
        q1: &Coordinate,
        q2: &Coordinate,
    ) -> Coordinate {
        let mut point = line_intersection(p1, p2, q1, q2)
            .filter(|pt| self.is_in_segment_envelopes(pt))
            .unwrap_or_else(|| nearest_endpoint(p1, p2, q1, q2));

        if let Some(precision) = &self.precision {
            point = precision.make_precise_coordinate(&point);
        }

        point.z = z_interpolate_pair(&point, p1, p2, q1, q2);
        point
    }

    fn is_in_segment_envelopes(&self, pt: &Coordinate) -> bool {
        let [[p1, p2], [q1, q2]] = &self.input;
        Envelope::of_segment(p1, p2).intersects_point(pt)
            && Envelope::of_segment(q1, q2).intersects_point(pt)
    }

    pub fn kind(&self) -> IntersectionKind {
        self.kind
    }

    pub fn has_intersection(&self) -> bool {
        self.kind != IntersectionKind::None
    }

    /// Returns the number of intersection points found, 0, 1 or 2.
    pub fn intersection_num(&self) -> usize {
        match self.kind {
            IntersectionKind::None => 0,
            IntersectionKind::Point => 1,
            IntersectionKind::Collinear => 2,
        }
    }

    pub fn intersection_at(&self, index: usize) -> Coordinate {
        self.points[index]
    }

    pub fn is_collinear(&self) -> bool {
        self.kind == IntersectionKind::Collinear
    }

    /// Returns true if the single intersection point is interior to both segments.
    pub fn is_proper(&self) -> bool {
        self.has_intersection() && self.proper
    }

    /// Returns true if any intersection point is interior to either input segment.
    pub fn is_interior_intersection(&self) -> bool {
        self.is_interior_intersection_of(0) || self.is_interior_intersection_of(1)
    }

    /// Returns true if any intersection point is interior to the given input segment.
    pub fn is_interior_intersection_of(&self, input: usize) -> bool {
        (0..self.intersection_num()).any(|i| {
            self.points[i] != self.input[input][0] && self.points[i] != self.input[input][1]
        })
    }

    /// Returns true if the given point is one of the computed intersection points.
    pub fn is_intersection(&self, pt: &Coordinate) -> bool {
        (0..self.intersection_num()).any(|i| self.points[i] == *pt)
    }

    /// Returns the distance along the given input segment of the given intersection point.
    pub fn edge_distance(&self, segment: usize, index: usize) -> f64 {
        edge_distance(
            &self.points[index],
            &self.input[segment][0],
            &self.input[segment][1],
        )
    }

    /// Returns the intersection points ordered along the given input segment.
    pub fn intersection_along_segment(&self, segment: usize, index: usize) -> Coordinate {
        if self.intersection_num() < 2 || index >= 2 {
            return self.points[index.min(1)];
        }
        let (d0, d1) = (self.edge_distance(segment, 0), self.edge_distance(segment, 1));
        let order = if d0 > d1 { [1, 0] } else { [0, 1] };
        self.points[order[index]]
    }

    /// Returns the topology of the last computed intersection as WKT, for diagnostics.
    pub fn describe(&self) -> String {
        let [[p1, p2], [q1, q2]] = &self.input;
        format!(
            "{} - {} : {:?}{}",
            wkt::segment(p1, p2),
            wkt::segment(q1, q2),
            self.kind,
            if self.is_proper() { " proper" } else { "" }
        )
    }
}

/// Returns a "distance" of `p` along segment `p0`-`p1`, suitable to order points on it.
///
/// This is the larger ordinate delta, not the euclidean distance.
pub fn edge_distance(p: &Coordinate, p0: &Coordinate, p1: &Coordinate) -> f64 {
    let dx = (p1.x - p0.x).abs();
    let dy = (p1.y - p0.y).abs();

    if p == p0 {
        return 0.;
    }
    if p == p1 {
        return dx.max(dy);
    }

    let pdx = (p.x - p0.x).abs();
    let pdy = (p.y - p0.y).abs();
    let dist = if dx > dy { pdx } else { pdy };
    if dist == 0. {
        // Ensures non-endpoints always have a non-zero distance.
        return pdx.max(pdy);
    }
    dist
}

/// Computes the intersection of the infinite lines through two segments in double-double
/// arithmetic, `None` if they are parallel.
pub fn line_intersection(
    p1: &Coordinate,
    p2: &Coordinate,
    q1: &Coordinate,
    q2: &Coordinate,
) -> Option<Coordinate> {
    let px = DD::from(p1.y) - p2.y;
    let py = DD::from(p2.x) - p1.x;
    let pw = DD::from(p1.x) * p2.y - DD::from(p2.x) * p1.y;

    let qx = DD::from(q1.y) - q2.y;
    let qy = DD::from(q2.x) - q1.x;
    let qw = DD::from(q1.x) * q2.y - DD::from(q2.x) * q1.y;

    let x = py * qw - qy * pw;
    let y = qx * pw - px * qw;
    let w = px * qy - qx * py;

    if w.signum() == 0 {
        return None;
    }

    let point = Coordinate::new((x / w).to_f64(), (y / w).to_f64());
    point.is_valid().then_some(point)
}

fn nearest_endpoint(p1: &Coordinate, p2: &Coordinate, q1: &Coordinate, q2: &Coordinate) -> Coordinate {
    [
        (*p1, distance::point_to_segment(p1, q1, q2)),
        (*p2, distance::point_to_segment(p2, q1, q2)),
        (*q1, distance::point_to_segment(q1, p1, p2)),
        (*q2, distance::point_to_segment(q2, p1, p2)),
    ]
    .into_iter()
    .fold((*p1, f64::INFINITY), |best, candidate| {
        if candidate.1 < best.1 { candidate } else { best }
    })
    .0
}

/// Interpolates the elevation of `p` along segment `a`-`b`, `NaN` if it has none.
pub fn z_interpolate(p: &Coordinate, a: &Coordinate, b: &Coordinate) -> f64 {
    match (a.has_z(), b.has_z()) {
        (false, false) => f64::NAN,
        (true, false) => a.z,
        (false, true) => b.z,
        (true, true) => {
            let len = a.distance(b);
            if len == 0. {
                return a.z;
            }
            let frac = (p.distance(a) / len).clamp(0., 1.);
            a.z + frac * (b.z - a.z)
        }
    }
}

fn z_interpolate_pair(
    p: &Coordinate,
    p1: &Coordinate,
    p2: &Coordinate,
    q1: &Coordinate,
    q2: &Coordinate,
) -> f64 {
    let zp = z_interpolate(p, p1, p2);
    let zq = z_interpolate(p, q1, q2);
    match (zp.is_nan(), zq.is_nan()) {
        (false, false) => (zp + zq) / 2.,
        (false, true) => zp,
        (true, false) => zq,
        (true, true) => f64::NAN,
    }
}

/// Returns a copy of the vertex `p`, taking its elevation from segment `a`-`b` if absent.
fn copy_with_z(p: &Coordinate, a: &Coordinate, b: &Coordinate) -> Coordinate {
    if p.has_z() {
        *p
    } else {
        p.with_z(z_interpolate(p, a, b))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coord;

    #[test]
    fn segment_intersections() {
        struct Test {
            name: &'static str,
            segments: [Coordinate; 4],
            kind: IntersectionKind,
            proper: bool,
            points: Vec<Coordinate>,
        }

        vec![
            Test {
                name: "crossing segments",
                segments: [coord!(0, 0), coord!(2, 2), coord!(0, 2), coord!(2, 0)],
                kind: IntersectionKind::Point,
                proper: true,
                points: vec![coord!(1, 1)],
            },
            Test {
                name: "segments sharing an endpoint",
                segments: [coord!(0, 0), coord!(4, 4), coord!(0, 0), coord!(-4, 4)],
                kind: IntersectionKind::Point,
                proper: false,
                points: vec![coord!(0, 0)],
            },
            Test {
                name: "endpoint touching the interior",
                segments: [coord!(4, 0), coord!(4, 4), coord!(2, 2), coord!(4, 2)],
                kind: IntersectionKind::Point,
                proper: false,
                points: vec![coord!(4, 2)],
            },
            Test {
                name: "collinear overlap",
                segments: [coord!(0, 0), coord!(4, 4), coord!(2, 2), coord!(6, 6)],
                kind: IntersectionKind::Collinear,
                proper: false,
                points: vec![coord!(2, 2), coord!(4, 4)],
            },
            Test {
                name: "collinear touching at an endpoint",
                segments: [coord!(0, 0), coord!(4, 4), coord!(4, 4), coord!(6, 6)],
                kind: IntersectionKind::Point,
                proper: false,
                points: vec![coord!(4, 4)],
            },
            Test {
                name: "collinear and disjoint",
                segments: [coord!(0, 0), coord!(1, 1), coord!(2, 2), coord!(3, 3)],
                kind: IntersectionKind::None,
                proper: false,
                points: vec![],
            },
            Test {
                name: "parallel segments",
                segments: [coord!(0, 0), coord!(4, 4), coord!(0, 4), coord!(4, 8)],
                kind: IntersectionKind::None,
                proper: false,
                points: vec![],
            },
        ]
        .into_iter()
        .for_each(|test| {
            let [p1, p2, q1, q2] = test.segments;
            let mut li = LineIntersector::new();
            li.compute_intersection(&p1, &p2, &q1, &q2);

            assert_eq!(li.kind(), test.kind, "{}", test.name);
            assert_eq!(li.is_proper(), test.proper, "{}", test.name);
            let mut got: Vec<_> = (0..li.intersection_num()).map(|i| li.intersection_at(i)).collect();
            got.sort();
            assert_eq!(got, test.points, "{}", test.name);
        });
    }

    #[test]
    fn elevation_is_averaged() {
        let mut li = LineIntersector::new();
        li.compute_intersection(
            &coord!(0, 0, 0),
            &coord!(2, 2, 10),
            &coord!(0, 2, 20),
            &coord!(2, 0, 20),
        );
        let point = li.intersection_at(0);
        assert!((point.z - 12.5).abs() < 1e-9, "got z = {}", point.z);
    }

    #[test]
    fn edge_distance_orders_points() {
        let (p0, p1) = (coord!(0, 0), coord!(10, 2));
        let a = edge_distance(&coord!(2, 0.4), &p0, &p1);
        let b = edge_distance(&coord!(5, 1), &p0, &p1);
        assert!(a < b);
        assert_eq!(edge_distance(&p0, &p0, &p1), 0.);
        assert_eq!(edge_distance(&p1, &p0, &p1), 10.);
    }

    #[test]
    fn point_on_segment() {
        let mut li = LineIntersector::new();
        li.compute_point_intersection(&coord!(1, 1), &coord!(0, 0), &coord!(2, 2));
        assert!(li.has_intersection());
        assert!(li.is_proper());
        li.compute_point_intersection(&coord!(1, 1.5), &coord!(0, 0), &coord!(2, 2));
        assert!(!li.has_intersection());
    }
}
