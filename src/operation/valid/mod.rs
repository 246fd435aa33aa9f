//! Validity of geometries: whether they satisfy the topological rules of their variant.

mod connected_interior;
mod consistent_area;

use std::fmt;

use thiserror::Error;
use tracing::debug;

use crate::{
    algorithm::{LineIntersector, locate::{is_in_ring, locate_in_ring}},
    error::{GeometryError, Result},
    geom::{Coordinate, Geometry, GeometryKind, LinearRing, Location, Polygon},
    geomgraph::{Edge, GeometryGraph},
    index::strtree::StrTree,
};

use self::{
    connected_interior::find_disconnected_interior,
    consistent_area::{Inconsistency, check_consistent_area},
};

/// The rule a geometry breaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValidationErrorKind {
    /// An ordinate is NaN or infinite.
    InvalidCoordinate,
    /// A line has fewer than 2 distinct points, or a ring fewer than 4.
    TooFewPoints,
    RingNotClosed,
    /// Rings cross or overlap each other.
    SelfIntersection,
    /// A ring touches itself.
    RingSelfIntersection,
    HoleOutsideShell,
    NestedHoles,
    /// Holes split the interior of a polygon into several pieces.
    DisconnectedInterior,
    /// A shell lies inside another shell of the same multipolygon.
    NestedShells,
    /// Two rings share the same edges.
    DuplicateRings,
}

impl ValidationErrorKind {
    pub fn message(&self) -> &'static str {
        match self {
            Self::InvalidCoordinate => "Invalid Coordinate",
            Self::TooFewPoints => "Too few distinct points in geometry component",
            Self::RingNotClosed => "Ring is not closed",
            Self::SelfIntersection => "Self-intersection",
            Self::RingSelfIntersection => "Ring Self-intersection",
            Self::HoleOutsideShell => "Hole lies outside shell",
            Self::NestedHoles => "Holes are nested",
            Self::DisconnectedInterior => "Interior is disconnected",
            Self::NestedShells => "Nested shells",
            Self::DuplicateRings => "Duplicate Rings",
        }
    }
}

impl fmt::Display for ValidationErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// The first reason found for a geometry to be invalid.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
#[error("{kind}{}", fmt_coordinate(.coordinate))]
pub struct ValidationError {
    pub kind: ValidationErrorKind,
    pub coordinate: Option<Coordinate>,
}

fn fmt_coordinate(coordinate: &Option<Coordinate>) -> String {
    coordinate
        .map(|c| format!(" at or near point {} {}", c.x, c.y))
        .unwrap_or_default()
}

impl ValidationError {
    pub fn new(kind: ValidationErrorKind, coordinate: impl Into<Option<Coordinate>>) -> Self {
        Self {
            kind,
            coordinate: coordinate.into(),
        }
    }
}

/// Why a check stopped.
enum Stop {
    Invalid(ValidationError),
    Failed(GeometryError),
}

impl From<GeometryError> for Stop {
    fn from(error: GeometryError) -> Self {
        Self::Failed(error)
    }
}

impl From<ValidationError> for Stop {
    fn from(error: ValidationError) -> Self {
        Self::Invalid(error)
    }
}

type Check = std::result::Result<(), Stop>;

fn invalid(kind: ValidationErrorKind, coordinate: impl Into<Option<Coordinate>>) -> Check {
    Err(ValidationError::new(kind, coordinate).into())
}

/// Tests whether a geometry is valid, reporting the first violation found.
///
/// Empty geometries are valid. Collections are valid if every component is; their
/// components may overlap.
#[derive(Debug, Clone, Copy)]
pub struct IsValidOp<'a> {
    geometry: &'a Geometry,
    self_touching_ring_forming_hole_valid: bool,
}

impl<'a> IsValidOp<'a> {
    pub fn new(geometry: &'a Geometry) -> Self {
        Self {
            geometry,
            self_touching_ring_forming_hole_valid: false,
        }
    }

    /// Accepts shells touching themselves at a point to enclose a hole, as some other
    /// models do, instead of requiring a separate hole ring.
    pub fn with_self_touching_ring_forming_hole_valid(mut self, valid: bool) -> Self {
        self.self_touching_ring_forming_hole_valid = valid;
        self
    }

    pub fn is_valid(&self) -> Result<bool> {
        self.validation_error().map(|error| error.is_none())
    }

    /// Returns the first violation found, if any.
    pub fn validation_error(&self) -> Result<Option<ValidationError>> {
        match self.check(self.geometry) {
            Ok(()) => Ok(None),
            Err(Stop::Invalid(error)) => {
                debug!(%error, geometry = self.geometry.geometry_type(), "invalid geometry");
                Ok(Some(error))
            }
            Err(Stop::Failed(error)) => Err(error),
        }
    }

    fn check(&self, geometry: &Geometry) -> Check {
        if geometry.is_empty() {
            return Ok(());
        }

        match geometry.kind() {
            GeometryKind::Point(_) | GeometryKind::MultiPoint(_) => check_coordinates(geometry),
            GeometryKind::LineString(_) | GeometryKind::MultiLineString(_) => {
                check_coordinates(geometry)?;
                let graph = GeometryGraph::new(0, geometry);
                check_too_few_points(&graph)
            }
            GeometryKind::LinearRing(ring) => self.check_ring(geometry, ring),
            GeometryKind::Polygon(_) | GeometryKind::MultiPolygon(_) => self.check_area(geometry),
            GeometryKind::GeometryCollection(geometries) => geometries
                .iter()
                .try_for_each(|geometry| self.check(geometry)),
        }
    }

    fn check_ring(&self, geometry: &Geometry, ring: &LinearRing) -> Check {
        check_coordinates(geometry)?;
        check_closed_ring(ring)?;

        let distinct = ring.coords().without_repeated_points();
        if distinct.len() < LinearRing::MINIMUM_VALID_SIZE {
            return invalid(ValidationErrorKind::TooFewPoints, distinct.first().copied());
        }

        let mut graph = GeometryGraph::new(0, geometry);
        graph.compute_self_nodes(LineIntersector::new(), true)?;
        check_no_self_intersecting_rings(&graph)
    }

    fn check_area(&self, geometry: &Geometry) -> Check {
        check_coordinates(geometry)?;
        let polygons = geometry.polygons();
        polygons
            .iter()
            .flat_map(|polygon| polygon.rings())
            .try_for_each(check_closed_ring)?;

        let mut graph = GeometryGraph::new(0, geometry);
        check_too_few_points(&graph)?;
        polygons.iter().copied().try_for_each(check_holes_in_shell)?;

        match check_consistent_area(&mut graph)? {
            Some(Inconsistency::SelfIntersection(coord)) => {
                return invalid(ValidationErrorKind::SelfIntersection, coord);
            }
            Some(Inconsistency::DuplicateRings(coord)) => {
                return invalid(ValidationErrorKind::DuplicateRings, coord);
            }
            None => {}
        }

        if !self.self_touching_ring_forming_hole_valid {
            check_no_self_intersecting_rings(&graph)?;
        }

        for (index, polygon) in polygons.iter().enumerate() {
            check_holes_not_nested(&graph, index, polygon)?;
        }
        if polygons.len() > 1 {
            check_shells_not_nested(&graph, &polygons)?;
        }

        match find_disconnected_interior(&graph)? {
            Some(coord) => invalid(ValidationErrorKind::DisconnectedInterior, coord),
            None => Ok(()),
        }
    }
}

fn check_coordinates(geometry: &Geometry) -> Check {
    match geometry.coordinates().into_iter().find(|coord| !coord.is_valid()) {
        Some(coord) => invalid(ValidationErrorKind::InvalidCoordinate, coord),
        None => Ok(()),
    }
}

fn check_closed_ring(ring: &LinearRing) -> Check {
    if ring.is_empty() || ring.coords().is_closed() {
        return Ok(());
    }
    invalid(ValidationErrorKind::RingNotClosed, ring.coords().first().copied())
}

fn check_too_few_points(graph: &GeometryGraph<'_>) -> Check {
    if graph.has_too_few_points() {
        return invalid(ValidationErrorKind::TooFewPoints, graph.invalid_point());
    }
    Ok(())
}

/// Checks that no ring passes twice through the same node.
fn check_no_self_intersecting_rings(graph: &GeometryGraph<'_>) -> Check {
    for edge in graph.edges() {
        let mut seen = std::collections::BTreeSet::new();
        // the start of a closed edge is also its end
        for node in edge.nodes().into_iter().skip(1) {
            if !seen.insert(node.coord) {
                return invalid(ValidationErrorKind::RingSelfIntersection, node.coord);
            }
        }
    }
    Ok(())
}

/// Checks that no vertex of a hole lies outside the shell.
///
/// A hole crossing the shell has at least one such vertex unless it only crosses through
/// edges, which the consistency check reports.
fn check_holes_in_shell(polygon: &Polygon) -> Check {
    let shell = polygon.shell().coords().as_slice();
    for hole in polygon.holes().iter().filter(|hole| !hole.is_empty()) {
        if let Some(&outside) = hole
            .coords()
            .iter()
            .find(|p| locate_in_ring(p, shell) == Location::Exterior)
        {
            return invalid(ValidationErrorKind::HoleOutsideShell, outside);
        }
    }
    Ok(())
}

/// Checks that no hole of the polygon lies inside another one.
fn check_holes_not_nested(graph: &GeometryGraph<'_>, index: usize, polygon: &Polygon) -> Check {
    let holes = polygon.holes();
    let mut tree = StrTree::new();
    for (position, hole) in holes.iter().enumerate() {
        tree.insert(hole.envelope(), position)?;
    }

    for (inner, hole) in holes.iter().enumerate() {
        for &outer in tree.query(&hole.envelope()) {
            if inner == outer {
                continue;
            }

            let search = holes[outer].coords().as_slice();
            let Some(point) = find_point_not_node(hole.coords().as_slice(), graph.ring_edge(index, outer + 1))
            else {
                continue;
            };
            if is_in_ring(&point, search) {
                return invalid(ValidationErrorKind::NestedHoles, point);
            }
        }
    }
    Ok(())
}

/// Checks that no shell of a multipolygon lies inside another polygon, unless it lies in
/// one of its holes.
fn check_shells_not_nested(graph: &GeometryGraph<'_>, polygons: &[&Polygon]) -> Check {
    for (i, inner) in polygons.iter().enumerate() {
        for (j, outer) in polygons.iter().enumerate() {
            if i == j || !outer.envelope().intersects(&inner.envelope()) {
                continue;
            }
            if let Some(point) = find_nested_shell_point(graph, (i, *inner), (j, *outer))? {
                return invalid(ValidationErrorKind::NestedShells, point);
            }
        }
    }
    Ok(())
}

fn find_nested_shell_point(
    graph: &GeometryGraph<'_>,
    (inner_index, inner): (usize, &Polygon),
    (index, outer): (usize, &Polygon),
) -> Result<Option<Coordinate>> {
    let shell = inner.shell().coords().as_slice();
    let outer_shell = outer.shell().coords().as_slice();

    let Some(point) = find_point_not_node(shell, graph.ring_edge(index, 0)) else {
        return Ok(None);
    };
    if !is_in_ring(&point, outer_shell) {
        return Ok(None);
    }
    if outer.holes().is_empty() {
        return Ok(Some(point));
    }

    // the shell is fine as long as it lies inside any of the holes
    let shell_edge = graph.ring_edge(inner_index, 0);
    let mut nested = None;
    for (position, hole) in outer.holes().iter().enumerate() {
        let hole_edge = graph.ring_edge(index, position + 1);
        nested = shell_outside_hole_point(shell, shell_edge, hole.coords().as_slice(), hole_edge)?;
        if nested.is_none() {
            return Ok(None);
        }
    }
    Ok(nested)
}

/// Returns a point of the shell proving it is not inside the hole, if any.
fn shell_outside_hole_point(
    shell: &[Coordinate],
    shell_edge: Option<&Edge>,
    hole: &[Coordinate],
    hole_edge: Option<&Edge>,
) -> Result<Option<Coordinate>> {
    if let Some(point) = find_point_not_node(shell, hole_edge) {
        return Ok((!is_in_ring(&point, hole)).then_some(point));
    }

    match find_point_not_node(hole, shell_edge) {
        Some(point) => Ok(is_in_ring(&point, shell).then_some(point)),
        None => Err(GeometryError::assertion("points in shell and hole appear to be equal")),
    }
}

/// Returns the first coordinate that is not a node of the given ring edge.
fn find_point_not_node(coords: &[Coordinate], edge: Option<&Edge>) -> Option<Coordinate> {
    let Some(edge) = edge else {
        return coords.first().copied();
    };
    coords
        .iter()
        .find(|p| !edge.is_intersection(p) && !edge.coordinate(0).equals_2d(p))
        .copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        coord,
        geom::{CoordinateSequence, GeometryFactory},
    };

    fn ring(coords: &[(f64, f64)]) -> CoordinateSequence {
        coords
            .iter()
            .map(|&(x, y)| Coordinate::new(x, y))
            .collect::<Vec<_>>()
            .into()
    }

    fn square(min: f64, max: f64) -> CoordinateSequence {
        ring(&[(min, min), (min, max), (max, max), (max, min), (min, min)])
    }

    #[test]
    fn validation_errors() {
        struct Test {
            name: &'static str,
            geometry: Geometry,
            want: Option<ValidationError>,
        }

        let factory = GeometryFactory::floating();
        let polygon = |shell, holes| factory.polygon(shell, holes).unwrap();
        let as_polygon = |geometry: Geometry| match geometry.into_kind() {
            GeometryKind::Polygon(polygon) => polygon,
            _ => unreachable!(),
        };

        vec![
            Test {
                name: "polygon with hole",
                geometry: polygon(
                    ring(&[(0., 0.), (4., 0.), (4., 4.), (0., 4.), (0., 0.)]),
                    vec![ring(&[(1., 1.), (1., 2.), (2., 2.), (2., 1.), (1., 1.)])],
                ),
                want: None,
            },
            Test {
                name: "hole exceeding the shell",
                geometry: polygon(
                    ring(&[(0., 0.), (4., 0.), (4., 4.), (0., 4.), (0., 0.)]),
                    vec![ring(&[(1., 1.), (1., 5.), (5., 5.), (5., 1.), (1., 1.)])],
                ),
                want: Some(ValidationError::new(ValidationErrorKind::HoleOutsideShell, coord!(1, 5))),
            },
            Test {
                name: "bow tie",
                geometry: polygon(ring(&[(0., 0.), (4., 4.), (4., 0.), (0., 4.), (0., 0.)]), vec![]),
                want: Some(ValidationError::new(ValidationErrorKind::SelfIntersection, coord!(2, 2))),
            },
            Test {
                name: "nested holes",
                geometry: polygon(square(0., 10.), vec![square(1., 9.), square(2., 3.)]),
                want: Some(ValidationError::new(ValidationErrorKind::NestedHoles, coord!(2, 2))),
            },
            Test {
                name: "nested shells",
                geometry: factory.multi_polygon(vec![
                    as_polygon(polygon(square(0., 10.), vec![])),
                    as_polygon(polygon(square(2., 3.), vec![])),
                ]),
                want: Some(ValidationError::new(ValidationErrorKind::NestedShells, coord!(2, 2))),
            },
            Test {
                name: "shell inside a hole",
                geometry: factory.multi_polygon(vec![
                    as_polygon(polygon(square(0., 10.), vec![square(1., 9.)])),
                    as_polygon(polygon(square(2., 3.), vec![])),
                ]),
                want: None,
            },
            Test {
                name: "diamond hole disconnecting the interior",
                geometry: polygon(
                    square(0., 10.),
                    vec![ring(&[(0., 5.), (5., 0.), (10., 5.), (5., 10.), (0., 5.)])],
                ),
                want: Some(ValidationError::new(ValidationErrorKind::DisconnectedInterior, None)),
            },
            Test {
                name: "shell touching itself",
                geometry: polygon(
                    ring(&[
                        (0., 0.),
                        (0., 10.),
                        (10., 10.),
                        (10., 0.),
                        (5., 0.),
                        (7., 5.),
                        (3., 5.),
                        (5., 0.),
                        (0., 0.),
                    ]),
                    vec![],
                ),
                want: Some(ValidationError::new(ValidationErrorKind::RingSelfIntersection, coord!(5, 0))),
            },
            Test {
                name: "unclosed shell",
                geometry: factory.from_polygon(
                    Polygon::new(
                        LinearRing::new_unchecked(ring(&[(0., 0.), (0., 4.), (4., 4.), (4., 0.)])),
                        vec![],
                    )
                    .unwrap(),
                ),
                want: Some(ValidationError::new(ValidationErrorKind::RingNotClosed, coord!(0, 0))),
            },
            Test {
                name: "collapsed line",
                geometry: factory.line_string(vec![coord!(1, 1), coord!(1, 1)]).unwrap(),
                want: Some(ValidationError::new(ValidationErrorKind::TooFewPoints, coord!(1, 1))),
            },
            Test {
                name: "not a number",
                geometry: factory.point(coord!(f64::NAN, 0)),
                want: Some(ValidationError::new(ValidationErrorKind::InvalidCoordinate, None)),
            },
            Test {
                name: "empty polygon",
                geometry: factory.empty_polygon(),
                want: None,
            },
        ]
        .into_iter()
        .for_each(|test| {
            let got = IsValidOp::new(&test.geometry).validation_error().unwrap();
            match (got, test.want) {
                (None, None) => {}
                (Some(got), Some(want)) => {
                    assert_eq!(got.kind, want.kind, "{}", test.name);
                    if let Some(coordinate) = want.coordinate {
                        assert_eq!(got.coordinate, Some(coordinate), "{}", test.name);
                    }
                }
                (got, want) => panic!("{}: got {got:?}, want {want:?}", test.name),
            }
        });
    }

    #[test]
    fn self_touching_shell_may_form_a_hole() {
        let factory = GeometryFactory::floating();
        let geometry = factory
            .polygon(
                ring(&[
                    (0., 0.),
                    (0., 10.),
                    (10., 10.),
                    (10., 0.),
                    (5., 0.),
                    (7., 5.),
                    (3., 5.),
                    (5., 0.),
                    (0., 0.),
                ]),
                vec![],
            )
            .unwrap();

        assert!(!IsValidOp::new(&geometry).is_valid().unwrap());
        assert!(
            IsValidOp::new(&geometry)
                .with_self_touching_ring_forming_hole_valid(true)
                .is_valid()
                .unwrap()
        );
    }

    #[test]
    fn error_display() {
        let error = ValidationError::new(ValidationErrorKind::HoleOutsideShell, coord!(1, 5));
        assert_eq!(error.to_string(), "Hole lies outside shell at or near point 1 5");
    }
}
