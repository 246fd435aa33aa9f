//! Locating points relative to rings, lines and geometries.

use crate::{
    algorithm::{BoundaryNodeRule, orientation},
    geom::{Coordinate, Envelope, Geometry, GeometryKind, Location, Polygon},
    index::StrTree,
};

/// Counts the crossings of a horizontal ray going right from a point with a set of
/// segments, detecting when the point lies on one of them.
///
/// Segments may be fed in any order, and do not need to form a closed ring.
#[derive(Debug, Clone)]
pub struct RayCrossingCounter {
    p: Coordinate,
    crossings: usize,
    on_segment: bool,
}

impl RayCrossingCounter {
    pub fn new(p: Coordinate) -> Self {
        Self {
            p,
            crossings: 0,
            on_segment: false,
        }
    }

    /// Counts the segment `p1`-`p2`.
    pub fn count_segment(&mut self, p1: &Coordinate, p2: &Coordinate) {
        let p = &self.p;
        if p1.x < p.x && p2.x < p.x {
            return;
        }
        if p.x == p2.x && p.y == p2.y {
            self.on_segment = true;
            return;
        }

        if p1.y == p.y && p2.y == p.y {
            let (min_x, max_x) = (p1.x.min(p2.x), p1.x.max(p2.x));
            if p.x >= min_x && p.x <= max_x {
                self.on_segment = true;
            }
            return;
        }

        // half-open in y, so that a vertex on the ray is counted once
        if (p1.y > p.y && p2.y <= p.y) || (p2.y > p.y && p1.y <= p.y) {
            let mut orient = orientation::index(p1, p2, p);
            if orient == 0 {
                self.on_segment = true;
                return;
            }
            if p2.y < p1.y {
                orient = -orient;
            }
            if orient > 0 {
                self.crossings += 1;
            }
        }
    }

    /// Returns true once the point is known to lie on a counted segment.
    pub fn is_on_segment(&self) -> bool {
        self.on_segment
    }

    pub fn location(&self) -> Location {
        if self.on_segment {
            Location::Boundary
        } else if self.crossings % 2 == 1 {
            Location::Interior
        } else {
            Location::Exterior
        }
    }
}

/// Returns the location of a point relative to a closed ring.
pub fn locate_in_ring(p: &Coordinate, ring: &[Coordinate]) -> Location {
    let mut counter = RayCrossingCounter::new(*p);
    for segment in ring.windows(2) {
        counter.count_segment(&segment[0], &segment[1]);
        if counter.is_on_segment() {
            break;
        }
    }
    counter.location()
}

/// Returns true if the point is inside or on a closed ring.
pub fn is_in_ring(p: &Coordinate, ring: &[Coordinate]) -> bool {
    locate_in_ring(p, ring) != Location::Exterior
}

/// Returns true if the point lies on the segment `p0`-`p1`.
pub fn is_on_segment(p: &Coordinate, p0: &Coordinate, p1: &Coordinate) -> bool {
    Envelope::of_segment(p0, p1).intersects_point(p) && orientation::index(p0, p1, p) == 0
}

/// Returns true if the point lies on some segment of the line.
pub fn is_on_line(p: &Coordinate, line: &[Coordinate]) -> bool {
    line.windows(2)
        .any(|segment| is_on_segment(p, &segment[0], &segment[1]))
}

/// Locates points relative to arbitrary geometries.
///
/// Multiple components are combined by the boundary node rule: a point on the boundary of
/// several components is on the boundary of the whole only if the rule says so, and in
/// the interior otherwise.
#[derive(Debug, Default, Clone, Copy)]
pub struct PointLocator {
    rule: BoundaryNodeRule,
}

impl PointLocator {
    pub fn new(rule: BoundaryNodeRule) -> Self {
        Self { rule }
    }

    /// Returns true if the point is not in the exterior of the geometry.
    pub fn intersects(&self, p: &Coordinate, geometry: &Geometry) -> bool {
        self.locate(p, geometry) != Location::Exterior
    }

    pub fn locate(&self, p: &Coordinate, geometry: &Geometry) -> Location {
        if geometry.is_empty() || !geometry.envelope().intersects_point(p) {
            return Location::Exterior;
        }

        match geometry.kind() {
            GeometryKind::LineString(line) => return locate_on_line(p, line.coords().as_slice()),
            GeometryKind::Polygon(polygon) => return locate_in_polygon(p, polygon),
            _ => {}
        }

        let mut state = (false, 0);
        self.locate_components(p, geometry, &mut state);
        let (is_in, boundaries) = state;

        if self.rule.is_in_boundary(boundaries) {
            Location::Boundary
        } else if boundaries > 0 || is_in {
            Location::Interior
        } else {
            Location::Exterior
        }
    }

    fn locate_components(&self, p: &Coordinate, geometry: &Geometry, state: &mut (bool, usize)) {
        let mut update = |location: Location| match location {
            Location::Interior => state.0 = true,
            Location::Boundary => state.1 += 1,
            _ => {}
        };

        match geometry.kind() {
            GeometryKind::Point(point) => {
                if point.coordinate().is_some_and(|c| c.equals_2d(p)) {
                    update(Location::Interior);
                }
            }
            GeometryKind::MultiPoint(points) => {
                if points
                    .iter()
                    .filter_map(|point| point.coordinate())
                    .any(|c| c.equals_2d(p))
                {
                    update(Location::Interior);
                }
            }
            GeometryKind::LineString(line) => update(locate_on_line(p, line.coords().as_slice())),
            GeometryKind::LinearRing(ring) => update(locate_on_line(p, ring.coords().as_slice())),
            GeometryKind::MultiLineString(lines) => lines
                .iter()
                .for_each(|line| update(locate_on_line(p, line.coords().as_slice()))),
            GeometryKind::Polygon(polygon) => update(locate_in_polygon(p, polygon)),
            GeometryKind::MultiPolygon(polygons) => polygons
                .iter()
                .for_each(|polygon| update(locate_in_polygon(p, polygon))),
            GeometryKind::GeometryCollection(geometries) => geometries
                .iter()
                .for_each(|geometry| self.locate_components(p, geometry, state)),
        }
    }
}

/// Returns the location of a point relative to a single line, whose end points are its
/// boundary unless it is closed.
pub fn locate_on_line(p: &Coordinate, line: &[Coordinate]) -> Location {
    if line.is_empty() || !Envelope::of_coordinates(line).intersects_point(p) {
        return Location::Exterior;
    }

    let (first, last) = (&line[0], &line[line.len() - 1]);
    if !first.equals_2d(last) && (p.equals_2d(first) || p.equals_2d(last)) {
        return Location::Boundary;
    }

    if is_on_line(p, line) {
        Location::Interior
    } else {
        Location::Exterior
    }
}

/// Returns the location of a point relative to a polygon with holes.
pub fn locate_in_polygon(p: &Coordinate, polygon: &Polygon) -> Location {
    if polygon.is_empty() {
        return Location::Exterior;
    }

    let shell = polygon.shell().coords();
    if !shell.envelope().intersects_point(p) {
        return Location::Exterior;
    }

    match locate_in_ring(p, shell.as_slice()) {
        Location::Interior => {}
        other => return other,
    }

    for hole in polygon.holes() {
        if !hole.envelope().intersects_point(p) {
            continue;
        }
        match locate_in_ring(p, hole.coords().as_slice()) {
            Location::Interior => return Location::Exterior,
            Location::Boundary => return Location::Boundary,
            _ => {}
        }
    }

    Location::Interior
}

/// Locates points in the polygonal components of a geometry without indexing.
pub fn locate_in_area(p: &Coordinate, geometry: &Geometry) -> Location {
    if geometry.is_empty() || !geometry.envelope().intersects_point(p) {
        return Location::Exterior;
    }

    for polygon in geometry.polygons() {
        let location = locate_in_polygon(p, polygon);
        if location != Location::Exterior {
            return location;
        }
    }

    Location::Exterior
}

/// Locates points in the polygonal components of a geometry, using an index of the
/// segments of every ring.
///
/// Suited for many queries against the same areal geometry.
#[derive(Debug, Clone)]
pub struct IndexedPointInAreaLocator {
    segments: StrTree<(Coordinate, Coordinate)>,
}

impl IndexedPointInAreaLocator {
    pub fn new(geometry: &Geometry) -> Self {
        let segments: StrTree<_> = geometry
            .polygons()
            .into_iter()
            .flat_map(|polygon| polygon.rings())
            .flat_map(|ring| ring.coords().as_slice().windows(2))
            .map(|segment| {
                let (p0, p1) = (segment[0], segment[1]);
                (Envelope::of_segment(&p0, &p1), (p0, p1))
            })
            .collect();

        segments.build();
        Self { segments }
    }

    pub fn locate(&self, p: &Coordinate) -> Location {
        let bounds = self.segments.envelope();
        if !bounds.intersects_point(p) {
            return Location::Exterior;
        }

        let ray = Envelope::new(p.x, bounds.max_x, p.y, p.y);
        let mut counter = RayCrossingCounter::new(*p);
        self.segments.query_until(&ray, |(p0, p1)| {
            counter.count_segment(p0, p1);
            !counter.is_on_segment()
        });
        counter.location()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{coord, geom::GeometryFactory};

    fn square_with_hole() -> Geometry {
        GeometryFactory::floating()
            .polygon(
                vec![coord!(0, 0), coord!(10, 0), coord!(10, 10), coord!(0, 10), coord!(0, 0)],
                vec![
                    vec![coord!(4, 4), coord!(6, 4), coord!(6, 6), coord!(4, 6), coord!(4, 4)]
                        .into(),
                ],
            )
            .unwrap()
    }

    #[test]
    fn ring_location() {
        let ring = [coord!(0, 0), coord!(4, 0), coord!(4, 4), coord!(0, 4), coord!(0, 0)];
        let cases = [
            (coord!(2, 2), Location::Interior),
            (coord!(4, 2), Location::Boundary),
            (coord!(0, 0), Location::Boundary),
            (coord!(5, 2), Location::Exterior),
            (coord!(-1, 0), Location::Exterior),
            (coord!(2, 4), Location::Boundary),
        ];

        for (p, want) in cases {
            assert_eq!(locate_in_ring(&p, &ring), want, "at {p}");
        }
    }

    #[test]
    fn polygon_location() {
        let polygon = square_with_hole();
        let indexed = IndexedPointInAreaLocator::new(&polygon);
        let cases = [
            (coord!(1, 1), Location::Interior),
            (coord!(5, 5), Location::Exterior),
            (coord!(4, 5), Location::Boundary),
            (coord!(10, 10), Location::Boundary),
            (coord!(11, 5), Location::Exterior),
        ];

        for (p, want) in cases {
            assert_eq!(locate_in_area(&p, &polygon), want, "simple at {p}");
            assert_eq!(indexed.locate(&p), want, "indexed at {p}");
            assert_eq!(PointLocator::default().locate(&p, &polygon), want, "locator at {p}");
        }
    }

    #[test]
    fn line_boundary_rule() {
        let factory = GeometryFactory::floating();
        let lines = factory.multi_line_string(vec![
            crate::geom::LineString::new(vec![coord!(0, 0), coord!(1, 0)].into()).unwrap(),
            crate::geom::LineString::new(vec![coord!(1, 0), coord!(2, 0)].into()).unwrap(),
        ]);

        let mod2 = PointLocator::default();
        assert_eq!(mod2.locate(&coord!(1, 0), &lines), Location::Interior);
        assert_eq!(mod2.locate(&coord!(0, 0), &lines), Location::Boundary);
        assert_eq!(mod2.locate(&coord!(0.5, 0), &lines), Location::Interior);

        let endpoint = PointLocator::new(BoundaryNodeRule::EndPoint);
        assert_eq!(endpoint.locate(&coord!(1, 0), &lines), Location::Boundary);
    }
}
