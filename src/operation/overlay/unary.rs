use tracing::trace;

use crate::{
    algorithm::PointLocator,
    error::Result,
    geom::{Geometry, GeometryKind, LineString, Location, Point},
    operation::overlay::{OpCode, robust},
};

/// Returns the union of every component of the geometry.
///
/// Polygons are merged pairwise in a balanced tree, lines and points are dissolved as a
/// whole. Points covered by the lineal or polygonal union are left out.
pub fn unary_union(geometry: &Geometry) -> Result<Geometry> {
    let factory = geometry.factory();
    if geometry.is_empty() {
        return Ok(factory.empty(geometry.dimension()));
    }

    let mut polygons = Vec::new();
    let mut lines = Vec::new();
    let mut points = Vec::new();
    for component in geometry.components() {
        if component.is_empty() {
            continue;
        }

        match component.into_kind() {
            GeometryKind::Polygon(polygon) => polygons.push(polygon),
            GeometryKind::LineString(line) => lines.push(line),
            GeometryKind::LinearRing(ring) => {
                lines.push(LineString::new(ring.coords().clone())?)
            }
            GeometryKind::Point(point) => points.push(point),
            _ => {}
        }
    }
    trace!(
        polygons = polygons.len(),
        lines = lines.len(),
        points = points.len(),
        "unary union"
    );

    let polygonal = union_polygons(
        polygons
            .into_iter()
            .map(|polygon| factory.from_polygon(polygon))
            .collect(),
    )?;
    let lineal = match lines.is_empty() {
        true => None,
        false => Some(robust::overlay_unary(&factory.multi_line_string(lines))?),
    };

    let mut result = match (lineal, polygonal) {
        (Some(lineal), Some(polygonal)) => Some(robust::overlay(&lineal, &polygonal, OpCode::Union)?),
        (lineal, polygonal) => lineal.or(polygonal),
    };

    if !points.is_empty() {
        let puntal = robust::overlay_unary(&factory.multi_point(points))?;
        result = Some(match result {
            Some(other) => union_points(&puntal, other),
            None => puntal,
        });
    }

    Ok(result.unwrap_or_else(|| factory.empty(geometry.dimension())))
}

/// Unions the polygons pairwise, halving their number on each round.
fn union_polygons(mut polygons: Vec<Geometry>) -> Result<Option<Geometry>> {
    match polygons.len() {
        0 => return Ok(None),
        1 => return robust::overlay_unary(&polygons[0]).map(Some),
        _ => {}
    }

    while polygons.len() > 1 {
        let mut merged = Vec::with_capacity(polygons.len().div_ceil(2));
        let mut pending = polygons.into_iter();
        while let Some(first) = pending.next() {
            match pending.next() {
                Some(second) => merged.push(robust::overlay(&first, &second, OpCode::Union)?),
                None => merged.push(first),
            }
        }
        polygons = merged;
    }

    Ok(polygons.pop())
}

/// Adds to the geometry the points lying in its exterior.
fn union_points(points: &Geometry, other: Geometry) -> Geometry {
    let locator = PointLocator::default();
    let exterior: Vec<Geometry> = points
        .points()
        .into_iter()
        .filter(|coord| locator.locate(coord, &other) == Location::Exterior)
        .map(|coord| other.factory().from_kind(GeometryKind::Point(Point::new(coord))))
        .collect();

    if exterior.is_empty() {
        return other;
    }

    let factory = other.factory().clone();
    let mut components = other.components();
    components.extend(exterior);
    factory.build_geometry(components)
}
