use std::collections::BTreeMap;

use tracing::trace;

use crate::{
    algorithm::{BoundaryNodeRule, IndexedPointInAreaLocator, LineIntersector, PointLocator, orientation::is_ccw},
    error::Result,
    geom::{Coordinate, Geometry, GeometryKind, LineString, Location, Polygon},
    geomgraph::{
        Edge, Label, SegmentIntersector,
        intersector::{compute_mutual_intersections, compute_self_intersections},
    },
    noding::without_repeated_points,
};

/// The topology graph of a single input geometry: its edges and the nodes that matter for
/// its boundary and self-intersections.
#[derive(Debug)]
pub struct GeometryGraph<'a> {
    index: usize,
    geometry: &'a Geometry,
    rule: BoundaryNodeRule,
    use_boundary_rule: bool,
    edges: Vec<Edge>,
    nodes: BTreeMap<Coordinate, Label>,
    points: Vec<Coordinate>,
    ring_edges: Vec<Vec<Option<usize>>>,
    has_too_few_points: bool,
    invalid_point: Option<Coordinate>,
    area_locator: Option<IndexedPointInAreaLocator>,
}

impl<'a> GeometryGraph<'a> {
    /// Builds the graph of the geometry at the given argument index, 0 or 1.
    pub fn new(index: usize, geometry: &'a Geometry) -> Self {
        Self::with_rule(index, geometry, BoundaryNodeRule::default())
    }

    pub fn with_rule(index: usize, geometry: &'a Geometry, rule: BoundaryNodeRule) -> Self {
        let mut graph = Self {
            index,
            geometry,
            rule,
            use_boundary_rule: true,
            edges: Vec::new(),
            nodes: BTreeMap::new(),
            points: Vec::new(),
            ring_edges: Vec::new(),
            has_too_few_points: false,
            invalid_point: None,
            area_locator: None,
        };

        graph.add(geometry);
        trace!(
            index,
            edges = graph.edges.len(),
            nodes = graph.nodes.len(),
            "geometry graph built"
        );
        graph
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn geometry(&self) -> &'a Geometry {
        self.geometry
    }

    pub fn boundary_node_rule(&self) -> BoundaryNodeRule {
        self.rule
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn edges_mut(&mut self) -> &mut [Edge] {
        &mut self.edges
    }

    /// Every node of the graph with its label.
    pub fn nodes(&self) -> impl Iterator<Item = (&Coordinate, &Label)> {
        self.nodes.iter()
    }

    /// The coordinates of the point components of the geometry.
    pub fn points(&self) -> &[Coordinate] {
        &self.points
    }

    pub fn has_too_few_points(&self) -> bool {
        self.has_too_few_points
    }

    /// The first vertex of a component with too few distinct points, if any.
    pub fn invalid_point(&self) -> Option<Coordinate> {
        self.invalid_point
    }

    pub fn is_boundary_node(&self, coord: &Coordinate) -> bool {
        self.nodes
            .get(coord)
            .is_some_and(|label| label.on_location(self.index) == Location::Boundary)
    }

    /// Returns the nodes on the boundary of the geometry.
    pub fn boundary_nodes(&self) -> Vec<Coordinate> {
        self.nodes
            .iter()
            .filter(|(_, label)| label.on_location(self.index) == Location::Boundary)
            .map(|(coord, _)| *coord)
            .collect()
    }

    /// Returns the edge built from the given ring of the given polygon, both counted in the
    /// order of [`Geometry::polygons`].
    pub fn ring_edge(&self, polygon: usize, ring: usize) -> Option<&Edge> {
        self.ring_edges
            .get(polygon)
            .and_then(|rings| rings.get(ring).copied().flatten())
            .map(|edge| &self.edges[edge])
    }

    /// Returns the location of the point relative to the geometry.
    pub fn locate(&mut self, p: &Coordinate) -> Location {
        if self.geometry.is_polygonal() {
            let geometry = self.geometry;
            return self
                .area_locator
                .get_or_insert_with(|| IndexedPointInAreaLocator::new(geometry))
                .locate(p);
        }

        PointLocator::new(self.rule).locate(p, self.geometry)
    }

    fn add(&mut self, geometry: &Geometry) {
        if geometry.is_empty() {
            return;
        }

        if matches!(geometry.kind(), GeometryKind::MultiPolygon(_)) {
            self.use_boundary_rule = false;
        }

        match geometry.kind() {
            GeometryKind::Point(point) => self.add_point(point.coordinate()),
            GeometryKind::MultiPoint(points) => points
                .iter()
                .for_each(|point| self.add_point(point.coordinate())),
            GeometryKind::LineString(line) => self.add_line_string(line.coords().as_slice()),
            GeometryKind::LinearRing(ring) => self.add_line_string(ring.coords().as_slice()),
            GeometryKind::MultiLineString(lines) => lines
                .iter()
                .filter(|line| !line.is_empty())
                .map(LineString::coords)
                .for_each(|coords| self.add_line_string(coords.as_slice())),
            GeometryKind::Polygon(polygon) => self.add_polygon(polygon),
            GeometryKind::MultiPolygon(polygons) => polygons
                .iter()
                .filter(|polygon| !polygon.is_empty())
                .for_each(|polygon| self.add_polygon(polygon)),
            GeometryKind::GeometryCollection(geometries) => {
                geometries.iter().for_each(|geometry| self.add(geometry))
            }
        }
    }

    fn add_point(&mut self, coord: Option<&Coordinate>) {
        if let Some(&coord) = coord {
            self.points.push(coord);
            self.insert_point(coord, Location::Interior);
        }
    }

    fn add_polygon(&mut self, polygon: &Polygon) {
        let mut rings = Vec::with_capacity(polygon.holes().len() + 1);
        rings.push(self.add_polygon_ring(
            polygon.shell().coords().as_slice(),
            Location::Exterior,
            Location::Interior,
        ));

        for hole in polygon.holes() {
            rings.push(self.add_polygon_ring(
                hole.coords().as_slice(),
                Location::Interior,
                Location::Exterior,
            ));
        }

        self.ring_edges.push(rings);
    }

    /// Adds a ring with the given locations on its left and right when walked clockwise.
    fn add_polygon_ring(&mut self, coords: &[Coordinate], cw_left: Location, cw_right: Location) -> Option<usize> {
        if coords.is_empty() {
            return None;
        }

        let coords = without_repeated_points(coords);
        if coords.len() < 4 {
            self.has_too_few_points = true;
            self.invalid_point = Some(coords[0]);
            return None;
        }

        let (left, right) = if is_ccw(&coords) {
            (cw_right, cw_left)
        } else {
            (cw_left, cw_right)
        };

        let start = coords[0];
        let label = Label::area(self.index, Location::Boundary, left, right);
        self.edges.push(Edge::new(coords, label));
        self.insert_point(start, Location::Boundary);
        Some(self.edges.len() - 1)
    }

    fn add_line_string(&mut self, coords: &[Coordinate]) {
        let coords = without_repeated_points(coords);
        let (Some(&first), Some(&last)) = (coords.first(), coords.last()) else {
            return;
        };

        if coords.len() < 2 {
            self.has_too_few_points = true;
            self.invalid_point = Some(first);
            return;
        }

        let label = Label::line(self.index, Location::Interior);
        self.edges.push(Edge::new(coords, label));
        self.insert_boundary_point(first);
        self.insert_boundary_point(last);
    }

    fn insert_point(&mut self, coord: Coordinate, location: Location) {
        let index = self.index;
        self.nodes
            .entry(coord)
            .and_modify(|label| label.set_on_location(index, location))
            .or_insert_with(|| Label::line(index, location));
    }

    /// Adds a line end point, resolving whether it is on the boundary with the boundary node
    /// rule.
    fn insert_boundary_point(&mut self, coord: Coordinate) {
        let index = self.index;
        let label = self.nodes.entry(coord).or_default();

        let count = 1 + usize::from(label.on_location(index) == Location::Boundary);
        let location = if self.rule.is_in_boundary(count) {
            Location::Boundary
        } else {
            Location::Interior
        };

        label.set_on_location(index, location);
    }

    /// Computes the self-intersections of the geometry and adds them as nodes.
    ///
    /// Segments of the same ring are not tested against each other unless
    /// `compute_ring_self_nodes`, since valid rings never self-intersect.
    pub fn compute_self_nodes(
        &mut self,
        li: LineIntersector,
        compute_ring_self_nodes: bool,
    ) -> Result<SegmentIntersector> {
        let mut intersector = SegmentIntersector::new(li, true, false);
        let is_rings = matches!(
            self.geometry.kind(),
            GeometryKind::LinearRing(_) | GeometryKind::Polygon(_) | GeometryKind::MultiPolygon(_)
        );

        compute_self_intersections(
            &mut self.edges,
            &mut intersector,
            compute_ring_self_nodes || !is_rings,
        )?;
        self.add_self_intersection_nodes();
        Ok(intersector)
    }

    fn add_self_intersection_nodes(&mut self) {
        let index = self.index;
        let found: Vec<(Coordinate, Location)> = self
            .edges
            .iter()
            .flat_map(|edge| {
                let location = edge.label.on_location(index);
                edge.intersections()
                    .iter()
                    .map(move |intersection| (intersection.coord, location))
            })
            .collect();

        for (coord, location) in found {
            if self.is_boundary_node(&coord) {
                continue;
            }

            if location == Location::Boundary && self.use_boundary_rule {
                self.insert_boundary_point(coord);
            } else {
                self.insert_point(coord, location);
            }
        }
    }

    /// Computes the intersections between the edges of this graph and the other's, and
    /// records them in the edges of both.
    pub fn compute_edge_intersections(
        &mut self,
        other: &mut GeometryGraph<'_>,
        li: LineIntersector,
        include_proper: bool,
    ) -> Result<SegmentIntersector> {
        let mut intersector = SegmentIntersector::new(li, include_proper, true)
            .with_boundary_nodes(self.boundary_nodes(), other.boundary_nodes());

        compute_mutual_intersections(&mut self.edges, &mut other.edges, &mut intersector)?;
        Ok(intersector)
    }

    /// Appends to `out` the edges of this graph split at their intersections.
    pub fn compute_split_edges(&self, out: &mut Vec<Edge>) {
        out.extend(self.edges.iter().flat_map(Edge::split));
    }
}
