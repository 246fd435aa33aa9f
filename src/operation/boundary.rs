//! The topological boundary of a geometry.

use std::collections::BTreeMap;

use crate::{
    algorithm::BoundaryNodeRule,
    error::{GeometryError, Result},
    geom::{Coordinate, CoordinateSequence, Geometry, GeometryKind, LineString, Point},
};

/// Computes the boundary of a geometry.
///
/// The boundary of an area is its rings, the boundary of a line is the set of end points
/// the boundary node rule selects and points have an empty boundary.
#[derive(Debug, Clone, Copy)]
pub struct BoundaryOp<'a> {
    geometry: &'a Geometry,
    rule: BoundaryNodeRule,
}

impl<'a> BoundaryOp<'a> {
    pub fn new(geometry: &'a Geometry) -> Self {
        Self {
            geometry,
            rule: BoundaryNodeRule::default(),
        }
    }

    pub fn with_rule(mut self, rule: BoundaryNodeRule) -> Self {
        self.rule = rule;
        self
    }

    /// Returns the boundary. Geometry collections have no well defined boundary.
    pub fn boundary(&self) -> Result<Geometry> {
        let factory = self.geometry.factory();
        match self.geometry.kind() {
            GeometryKind::Point(_) | GeometryKind::MultiPoint(_) => Ok(factory.empty_collection()),
            GeometryKind::LineString(_) | GeometryKind::LinearRing(_) | GeometryKind::MultiLineString(_) => {
                Ok(self.lineal_boundary())
            }
            GeometryKind::Polygon(polygon) if polygon.holes().is_empty() => match polygon.is_empty() {
                true => Ok(factory.multi_line_string(vec![])),
                false => factory.linear_ring(polygon.shell().coords().clone()),
            },
            GeometryKind::Polygon(_) | GeometryKind::MultiPolygon(_) => {
                let rings = self
                    .geometry
                    .polygons()
                    .into_iter()
                    .flat_map(|polygon| polygon.rings())
                    .filter(|ring| !ring.is_empty())
                    .map(|ring| LineString::from(ring.clone()))
                    .collect();
                Ok(factory.multi_line_string(rings))
            }
            GeometryKind::GeometryCollection(_) => Err(GeometryError::Unsupported(
                "the boundary of a geometry collection is not defined".into(),
            )),
        }
    }

    fn lineal_boundary(&self) -> Geometry {
        let factory = self.geometry.factory();
        let mut points: Vec<Point> = boundary_coordinates(&self.geometry.lines(), self.rule)
            .into_iter()
            .map(Point::new)
            .collect();

        match points.len() {
            1 => factory.from_kind(GeometryKind::Point(points.remove(0))),
            _ => factory.multi_point(points),
        }
    }
}

/// Returns the end points of the given lines that are in their boundary under the rule.
pub fn boundary_coordinates(lines: &[&CoordinateSequence], rule: BoundaryNodeRule) -> Vec<Coordinate> {
    let mut counts: BTreeMap<Coordinate, usize> = BTreeMap::new();
    for line in lines {
        for coord in [line.first(), line.last()].into_iter().flatten() {
            *counts.entry(*coord).or_default() += 1;
        }
    }

    counts
        .into_iter()
        .filter(|&(_, count)| rule.is_in_boundary(count))
        .map(|(coord, _)| coord)
        .collect()
}
