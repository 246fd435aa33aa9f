//! Centroid of a geometry, weighted by its highest non-degenerate dimension.

use crate::{
    algorithm::orientation::is_ccw,
    geom::{Coordinate, Geometry, GeometryKind, Polygon},
};

/// Accumulates the weighted centroid of areas, lines and points at once.
///
/// Polygon rings also contribute as lines, so that a polygon with no area still has the
/// centroid of its boundary.
#[derive(Debug, Default)]
struct CentroidSum {
    area_base: Option<Coordinate>,
    triangle_sum: (f64, f64),
    area_sum2: f64,
    line_sum: (f64, f64),
    total_length: f64,
    point_sum: (f64, f64),
    point_count: usize,
}

impl CentroidSum {
    fn add(&mut self, geometry: &Geometry) {
        match geometry.kind() {
            GeometryKind::Point(point) => {
                if let Some(c) = point.coordinate() {
                    self.add_point(c);
                }
            }
            GeometryKind::MultiPoint(points) => points
                .iter()
                .filter_map(|point| point.coordinate())
                .for_each(|c| self.add_point(c)),
            GeometryKind::LineString(line) => self.add_line(line.coords().as_slice()),
            GeometryKind::LinearRing(ring) => self.add_line(ring.coords().as_slice()),
            GeometryKind::MultiLineString(lines) => lines
                .iter()
                .for_each(|line| self.add_line(line.coords().as_slice())),
            GeometryKind::Polygon(polygon) => self.add_polygon(polygon),
            GeometryKind::MultiPolygon(polygons) => {
                polygons.iter().for_each(|polygon| self.add_polygon(polygon))
            }
            GeometryKind::GeometryCollection(geometries) => {
                geometries.iter().for_each(|geometry| self.add(geometry))
            }
        }
    }

    fn add_polygon(&mut self, polygon: &Polygon) {
        let shell = polygon.shell().coords().as_slice();
        let Some(base) = shell.first() else {
            return;
        };
        if self.area_base.is_none() {
            self.area_base = Some(*base);
        }

        self.add_ring(shell, !is_ccw(shell));
        for hole in polygon.holes() {
            let hole = hole.coords().as_slice();
            self.add_ring(hole, is_ccw(hole));
        }
    }

    fn add_ring(&mut self, ring: &[Coordinate], is_positive: bool) {
        if let Some(base) = self.area_base {
            for segment in ring.windows(2) {
                self.add_triangle(&base, &segment[0], &segment[1], is_positive);
            }
        }
        self.add_line(ring);
    }

    fn add_triangle(&mut self, p0: &Coordinate, p1: &Coordinate, p2: &Coordinate, positive: bool) {
        let sign = if positive { 1.0 } else { -1.0 };
        let area2 = (p1.x - p0.x) * (p2.y - p0.y) - (p2.x - p0.x) * (p1.y - p0.y);
        self.triangle_sum.0 += sign * area2 * (p0.x + p1.x + p2.x);
        self.triangle_sum.1 += sign * area2 * (p0.y + p1.y + p2.y);
        self.area_sum2 += sign * area2;
    }

    fn add_line(&mut self, line: &[Coordinate]) {
        let mut line_length = 0.0;
        for segment in line.windows(2) {
            let length = segment[0].distance(&segment[1]);
            if length == 0.0 {
                continue;
            }
            line_length += length;
            self.line_sum.0 += length * (segment[0].x + segment[1].x) / 2.0;
            self.line_sum.1 += length * (segment[0].y + segment[1].y) / 2.0;
        }

        self.total_length += line_length;
        if line_length == 0.0
            && let Some(first) = line.first()
        {
            self.add_point(first);
        }
    }

    fn add_point(&mut self, p: &Coordinate) {
        self.point_count += 1;
        self.point_sum.0 += p.x;
        self.point_sum.1 += p.y;
    }

    fn centroid(&self) -> Option<Coordinate> {
        if self.area_sum2 != 0.0 {
            let divisor = 3.0 * self.area_sum2;
            return Some(Coordinate::new(
                self.triangle_sum.0 / divisor,
                self.triangle_sum.1 / divisor,
            ));
        }
        if self.total_length > 0.0 {
            return Some(Coordinate::new(
                self.line_sum.0 / self.total_length,
                self.line_sum.1 / self.total_length,
            ));
        }
        if self.point_count > 0 {
            let count = self.point_count as f64;
            return Some(Coordinate::new(
                self.point_sum.0 / count,
                self.point_sum.1 / count,
            ));
        }
        None
    }
}

/// Returns the centroid of the geometry, or `None` if it is empty.
pub fn centroid(geometry: &Geometry) -> Option<Coordinate> {
    let mut sum = CentroidSum::default();
    sum.add(geometry);
    sum.centroid()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{coord, geom::GeometryFactory};

    #[test]
    fn centroid_of_polygon_with_hole() {
        let factory = GeometryFactory::floating();
        let polygon = factory
            .polygon(
                vec![coord!(0, 0), coord!(4, 0), coord!(4, 4), coord!(0, 4), coord!(0, 0)],
                vec![vec![coord!(2, 2), coord!(3, 2), coord!(3, 3), coord!(2, 3), coord!(2, 2)].into()],
            )
            .unwrap();
        let got = centroid(&polygon).unwrap();
        // (16 * 2 - 1 * 2.5) / 15
        let want = 29.5 / 15.0;
        assert!((got.x - want).abs() < 1e-12 && (got.y - want).abs() < 1e-12, "{got}");
    }

    #[test]
    fn centroid_of_lower_dimensions() {
        let factory = GeometryFactory::floating();
        let line = factory
            .line_string(vec![coord!(0, 0), coord!(2, 0), coord!(2, 1)])
            .unwrap();
        let got = centroid(&line).unwrap();
        assert!((got.x - 4.0 / 3.0).abs() < 1e-12 && (got.y - 1.0 / 6.0).abs() < 1e-12);

        let points = factory.multi_point(vec![
            crate::geom::Point::new(coord!(0, 0)),
            crate::geom::Point::new(coord!(2, 4)),
        ]);
        assert_eq!(centroid(&points), Some(coord!(1, 2)));
        assert_eq!(centroid(&factory.empty_polygon()), None);
    }
}
