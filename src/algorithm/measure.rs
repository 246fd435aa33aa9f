//! Area and length.

use crate::{
    algorithm::orientation::signed_ring_area,
    geom::{Coordinate, Geometry, Polygon},
};

/// Returns the unsigned area enclosed by a ring.
pub fn ring_area(ring: &[Coordinate]) -> f64 {
    signed_ring_area(ring).abs()
}

/// Returns the area of a polygon: its shell minus its holes.
pub fn polygon_area(polygon: &Polygon) -> f64 {
    let shell = ring_area(polygon.shell().coords().as_slice());
    polygon
        .holes()
        .iter()
        .fold(shell, |area, hole| area - ring_area(hole.coords().as_slice()))
}

/// Returns the length of a line.
pub fn line_length(line: &[Coordinate]) -> f64 {
    line.windows(2)
        .map(|segment| segment[0].distance(&segment[1]))
        .sum()
}

/// Returns the total area of the polygonal components of a geometry.
pub fn area(geometry: &Geometry) -> f64 {
    geometry.polygons().into_iter().map(polygon_area).sum()
}

/// Returns the total length of the lineal components of a geometry, including polygon
/// rings.
pub fn length(geometry: &Geometry) -> f64 {
    let lines: f64 = geometry
        .lines()
        .into_iter()
        .map(|line| line_length(line.as_slice()))
        .sum();
    let rings: f64 = geometry
        .polygons()
        .into_iter()
        .flat_map(Polygon::rings)
        .map(|ring| line_length(ring.coords().as_slice()))
        .sum();
    lines + rings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{coord, geom::GeometryFactory};

    #[test]
    fn area_and_length() {
        let factory = GeometryFactory::floating();
        let polygon = factory
            .polygon(
                vec![coord!(0, 0), coord!(0, 4), coord!(4, 4), coord!(4, 0), coord!(0, 0)],
                vec![vec![coord!(1, 1), coord!(2, 1), coord!(2, 2), coord!(1, 2), coord!(1, 1)].into()],
            )
            .unwrap();
        assert_eq!(area(&polygon), 15.0);
        assert_eq!(length(&polygon), 20.0);

        let line = factory
            .line_string(vec![coord!(0, 0), coord!(3, 4)])
            .unwrap();
        assert_eq!(area(&line), 0.0);
        assert_eq!(length(&line), 5.0);
    }
}
