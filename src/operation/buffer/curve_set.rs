use crate::{
    algorithm::{distance::point_to_segment, orientation},
    geom::{Coordinate, CoordinateSequence, Geometry, GeometryKind, LinearRing, Location, Polygon, Position},
    geomgraph::Label,
    noding::NodedSegmentString,
    operation::buffer::curve_builder::OffsetCurveBuilder,
};

/// Collects the raw offset curves of every component of a geometry, labelled with the
/// locations on their sides.
pub(super) struct OffsetCurveSetBuilder<'a> {
    builder: &'a OffsetCurveBuilder,
    distance: f64,
    curves: Vec<NodedSegmentString<Label>>,
}

impl<'a> OffsetCurveSetBuilder<'a> {
    pub fn new(builder: &'a OffsetCurveBuilder, distance: f64) -> Self {
        Self {
            builder,
            distance,
            curves: Vec::new(),
        }
    }

    pub fn curves(mut self, geometry: &Geometry) -> Vec<NodedSegmentString<Label>> {
        self.add_kind(geometry.kind());
        self.curves
    }

    fn add_kind(&mut self, kind: &GeometryKind) {
        match kind {
            GeometryKind::Point(point) => {
                if let Some(coord) = point.coordinate() {
                    self.add_point(*coord);
                }
            }
            GeometryKind::LineString(line) => self.add_line(line.coords()),
            GeometryKind::LinearRing(ring) => self.add_line(ring.coords()),
            GeometryKind::Polygon(polygon) => self.add_polygon(polygon),
            GeometryKind::MultiPoint(points) => points
                .iter()
                .filter_map(|point| point.coordinate())
                .for_each(|coord| self.add_point(*coord)),
            GeometryKind::MultiLineString(lines) => {
                lines.iter().for_each(|line| self.add_line(line.coords()))
            }
            GeometryKind::MultiPolygon(polygons) => {
                polygons.iter().for_each(|polygon| self.add_polygon(polygon))
            }
            GeometryKind::GeometryCollection(geometries) => geometries
                .iter()
                .for_each(|geometry| self.add_kind(geometry.kind())),
        }
    }

    fn add_curve(&mut self, curve: Option<Vec<Coordinate>>, left: Location, right: Location) {
        let Some(curve) = curve else {
            return;
        };
        if curve.len() < 2 {
            return;
        }

        self.curves.push(NodedSegmentString::new(
            curve,
            Label::area(0, Location::Boundary, left, right),
        ));
    }

    fn add_point(&mut self, coord: Coordinate) {
        if self.distance <= 0.0 {
            return;
        }

        let curve = self.builder.line_curve(&[coord], self.distance);
        self.add_curve(curve, Location::Exterior, Location::Interior);
    }

    fn add_line(&mut self, coords: &CoordinateSequence) {
        if coords.is_empty() {
            return;
        }

        let coords = coords.without_repeated_points();
        if coords.is_ring() && !self.builder.params().is_single_sided() {
            self.add_ring_side(coords.as_slice(), self.distance, Position::Left, Location::Exterior, Location::Interior);
            self.add_ring_side(coords.as_slice(), self.distance, Position::Right, Location::Interior, Location::Exterior);
        } else {
            let curve = self.builder.line_curve(coords.as_slice(), self.distance);
            self.add_curve(curve, Location::Exterior, Location::Interior);
        }
    }

    fn add_polygon(&mut self, polygon: &Polygon) {
        if polygon.is_empty() {
            return;
        }

        let (offset, side) = match self.distance < 0.0 {
            true => (-self.distance, Position::Right),
            false => (self.distance, Position::Left),
        };

        let shell = polygon.shell();
        if self.distance < 0.0 && is_eroded_completely(shell, self.distance) {
            return;
        }

        let shell_coords = shell.coords().without_repeated_points();
        if self.distance <= 0.0 && shell_coords.len() < 3 {
            return;
        }
        self.add_ring_side(shell_coords.as_slice(), offset, side, Location::Exterior, Location::Interior);

        for hole in polygon.holes() {
            // a hole eroded by the buffer disappears from the result
            if self.distance > 0.0 && is_eroded_completely(hole, -self.distance) {
                continue;
            }

            let hole_coords = hole.coords().without_repeated_points();
            self.add_ring_side(
                hole_coords.as_slice(),
                offset,
                side.opposite(),
                Location::Interior,
                Location::Exterior,
            );
        }
    }

    /// Adds the curve of a ring on one side. The locations are those for a clockwise ring
    /// and are swapped, with the side, for a counter-clockwise one.
    fn add_ring_side(
        &mut self,
        coords: &[Coordinate],
        offset: f64,
        mut side: Position,
        mut left: Location,
        mut right: Location,
    ) {
        if offset == 0.0 && coords.len() < LinearRing::MINIMUM_VALID_SIZE {
            return;
        }

        if coords.len() >= LinearRing::MINIMUM_VALID_SIZE && orientation::is_ccw(coords) {
            std::mem::swap(&mut left, &mut right);
            side = side.opposite();
        }

        let curve = self.builder.ring_curve(coords, side, offset);
        self.add_curve(curve, left, right);
    }
}

/// Returns true if a negative buffer of the given distance leaves nothing of the ring.
///
/// Only cheap checks are made, so a false result does not mean the ring survives.
fn is_eroded_completely(ring: &LinearRing, distance: f64) -> bool {
    let coords = ring.coords().as_slice();
    if coords.len() < 4 {
        return distance < 0.0;
    }
    if coords.len() == 4 {
        return is_triangle_eroded_completely(coords, distance);
    }

    let envelope = ring.envelope();
    distance < 0.0 && 2.0 * distance.abs() > envelope.width().min(envelope.height())
}

fn is_triangle_eroded_completely(triangle: &[Coordinate], distance: f64) -> bool {
    let centre = in_centre(&triangle[0], &triangle[1], &triangle[2]);
    point_to_segment(&centre, &triangle[0], &triangle[1]) < distance.abs()
}

/// Returns the centre of the circle inscribed in the triangle.
fn in_centre(a: &Coordinate, b: &Coordinate, c: &Coordinate) -> Coordinate {
    let len_a = b.distance(c);
    let len_b = a.distance(c);
    let len_c = a.distance(b);
    let perimeter = len_a + len_b + len_c;

    Coordinate::new(
        (len_a * a.x + len_b * b.x + len_c * c.x) / perimeter,
        (len_a * a.y + len_b * b.y + len_c * c.y) / perimeter,
    )
}
