//! Simplicity of geometries, in the sense of the simple features model.
//!
//! Points are always simple, multipoints are simple if no point repeats, lines are simple
//! if they only touch themselves at their end points and areas are simple if their rings
//! are.

use std::collections::{BTreeMap, BTreeSet};

use crate::{
    algorithm::{BoundaryNodeRule, LineIntersector},
    error::Result,
    geom::{Coordinate, Geometry, GeometryKind},
    geomgraph::GeometryGraph,
};

/// Tests whether a geometry is simple.
#[derive(Debug, Clone, Copy)]
pub struct IsSimpleOp<'a> {
    geometry: &'a Geometry,
    rule: BoundaryNodeRule,
}

impl<'a> IsSimpleOp<'a> {
    pub fn new(geometry: &'a Geometry) -> Self {
        Self {
            geometry,
            rule: BoundaryNodeRule::default(),
        }
    }

    /// Uses the given rule to decide whether closed lines may touch at their end points.
    pub fn with_rule(mut self, rule: BoundaryNodeRule) -> Self {
        self.rule = rule;
        self
    }

    pub fn is_simple(&self) -> Result<bool> {
        self.non_simple_location().map(|location| location.is_none())
    }

    /// Returns a point where the geometry is not simple, if any.
    pub fn non_simple_location(&self) -> Result<Option<Coordinate>> {
        self.check(self.geometry)
    }

    fn check(&self, geometry: &Geometry) -> Result<Option<Coordinate>> {
        if geometry.is_empty() {
            return Ok(None);
        }

        match geometry.kind() {
            GeometryKind::Point(_) => Ok(None),
            GeometryKind::MultiPoint(_) => Ok(repeated_point(geometry)),
            GeometryKind::LineString(_) | GeometryKind::LinearRing(_) | GeometryKind::MultiLineString(_) => {
                self.check_lineal(geometry)
            }
            GeometryKind::Polygon(_) | GeometryKind::MultiPolygon(_) => {
                let factory = geometry.factory();
                for polygon in geometry.polygons() {
                    for ring in polygon.rings().filter(|ring| !ring.is_empty()) {
                        let line = factory.line_string(ring.coords().clone())?;
                        if let Some(location) = self.check_lineal(&line)? {
                            return Ok(Some(location));
                        }
                    }
                }
                Ok(None)
            }
            GeometryKind::GeometryCollection(geometries) => {
                for geometry in geometries {
                    if let Some(location) = self.check(geometry)? {
                        return Ok(Some(location));
                    }
                }
                Ok(None)
            }
        }
    }

    fn check_lineal(&self, geometry: &Geometry) -> Result<Option<Coordinate>> {
        let mut graph = GeometryGraph::with_rule(0, geometry, self.rule);
        let intersector = graph.compute_self_nodes(LineIntersector::new(), true)?;
        if !intersector.has_intersection() {
            return Ok(None);
        }
        if intersector.has_proper_intersection() {
            return Ok(intersector.proper_intersection_point());
        }
        if let Some(location) = non_endpoint_intersection(&graph) {
            return Ok(Some(location));
        }

        // closed lines may only touch others at their end points if those are interior
        if !self.rule.is_in_boundary(2) {
            return Ok(closed_endpoint_intersection(&graph));
        }
        Ok(None)
    }
}

fn repeated_point(geometry: &Geometry) -> Option<Coordinate> {
    let mut seen = BTreeSet::new();
    geometry.points().into_iter().find(|point| !seen.insert(*point))
}

/// Returns an intersection that is not at the end points of the edge it was found in.
fn non_endpoint_intersection(graph: &GeometryGraph<'_>) -> Option<Coordinate> {
    graph.edges().iter().find_map(|edge| {
        let last_segment = edge.len() - 1;
        edge.intersections()
            .iter()
            .find(|node| {
                let is_start = node.segment_index == 0 && node.distance == 0.0;
                !is_start && node.segment_index != last_segment
            })
            .map(|node| node.coord)
    })
}

/// Returns the end point of a closed line that other lines also end at, if any.
fn closed_endpoint_intersection(graph: &GeometryGraph<'_>) -> Option<Coordinate> {
    #[derive(Default)]
    struct Endpoint {
        is_closed: bool,
        degree: usize,
    }

    let mut endpoints: BTreeMap<Coordinate, Endpoint> = BTreeMap::new();
    for edge in graph.edges() {
        let is_closed = edge.is_closed();
        for coord in [edge.coordinate(0), edge.coordinate(edge.len() - 1)] {
            let endpoint = endpoints.entry(*coord).or_default();
            endpoint.is_closed |= is_closed;
            endpoint.degree += 1;
        }
    }

    endpoints
        .into_iter()
        .find(|(_, endpoint)| endpoint.is_closed && endpoint.degree != 2)
        .map(|(coord, _)| coord)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        coord,
        geom::{GeometryFactory, LineString, Point},
    };

    #[test]
    fn simplicity() {
        struct Test {
            name: &'static str,
            geometry: Geometry,
            want: Option<Coordinate>,
        }

        let factory = GeometryFactory::floating();
        let line = |coords: Vec<Coordinate>| LineString::new(coords.into()).unwrap();

        vec![
            Test {
                name: "straight line",
                geometry: factory.line_string(vec![coord!(0, 0), coord!(10, 0)]).unwrap(),
                want: None,
            },
            Test {
                name: "crossing itself",
                geometry: factory
                    .line_string(vec![coord!(0, 0), coord!(10, 10), coord!(10, 0), coord!(0, 10)])
                    .unwrap(),
                want: Some(coord!(5, 5)),
            },
            Test {
                name: "closed ring",
                geometry: factory
                    .line_string(vec![coord!(0, 0), coord!(0, 10), coord!(10, 10), coord!(0, 0)])
                    .unwrap(),
                want: None,
            },
            Test {
                name: "touching at a vertex",
                geometry: factory
                    .line_string(vec![
                        coord!(0, 0),
                        coord!(10, 0),
                        coord!(10, 10),
                        coord!(5, 0),
                        coord!(5, -5),
                    ])
                    .unwrap(),
                want: Some(coord!(5, 0)),
            },
            Test {
                name: "lines sharing end points",
                geometry: factory.multi_line_string(vec![
                    line(vec![coord!(0, 0), coord!(10, 0)]),
                    line(vec![coord!(10, 0), coord!(10, 10)]),
                ]),
                want: None,
            },
            Test {
                name: "closed line touched at its end point",
                geometry: factory.multi_line_string(vec![
                    line(vec![coord!(0, 0), coord!(0, 10), coord!(10, 10), coord!(0, 0)]),
                    line(vec![coord!(0, 0), coord!(-10, 0)]),
                ]),
                want: Some(coord!(0, 0)),
            },
            Test {
                name: "repeated point",
                geometry: factory.multi_point(vec![
                    Point::new(coord!(1, 1)),
                    Point::new(coord!(2, 2)),
                    Point::new(coord!(1, 1)),
                ]),
                want: Some(coord!(1, 1)),
            },
            Test {
                name: "polygon",
                geometry: factory
                    .polygon(
                        vec![coord!(0, 0), coord!(0, 4), coord!(4, 4), coord!(4, 0), coord!(0, 0)],
                        vec![],
                    )
                    .unwrap(),
                want: None,
            },
        ]
        .into_iter()
        .for_each(|test| {
            let got = IsSimpleOp::new(&test.geometry).non_simple_location().unwrap();
            assert_eq!(got, test.want, "{}", test.name);
        });
    }
}
