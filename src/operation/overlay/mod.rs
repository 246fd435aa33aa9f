//! Boolean overlay of two geometries: intersection, union, difference and symmetric
//! difference.
//!
//! Every entry point builds a topology graph of both inputs, labels each edge with its
//! location relative to both, and assembles the result from the edges and nodes the
//! operation selects. Strategies differ only in how the input edges are noded.

pub mod heuristic;
mod line_builder;
mod point_builder;
mod polygon_builder;
pub mod robust;
pub mod snap;
mod unary;

use std::collections::BTreeSet;

use tracing::{debug, trace};

pub use self::polygon_builder::PolygonBuilder;
pub use self::unary::unary_union;

use crate::{
    algorithm::{LineIntersector, PointLocator, locate::locate_in_area},
    error::{GeometryError, Result},
    geom::{
        Coordinate, Geometry, GeometryFactory, GeometryKind, Location, Position, PrecisionModel,
    },
    geomgraph::{Edge, EdgeList, GeometryGraph, Label, PlanarGraph, sym, validate_edge_noding},
    noding::{
        IntersectionAdder, MCIndexNoder, NodedSegmentString, Noder, SnapRoundingNoder,
        SnappingNoder, ValidatingNoder, without_repeated_points,
    },
};

use self::{line_builder::build_lines, point_builder::build_points};

/// The overlay operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpCode {
    Intersection,
    Union,
    Difference,
    SymDifference,
}

impl OpCode {
    /// Returns true if a point at the given locations relative to both geometries belongs to
    /// the result of this operation.
    pub fn is_result_of(self, location0: Location, location1: Location) -> bool {
        let inside = |location| matches!(location, Location::Interior | Location::Boundary);
        let (in0, in1) = (inside(location0), inside(location1));

        match self {
            OpCode::Intersection => in0 && in1,
            OpCode::Union => in0 || in1,
            OpCode::Difference => in0 && !in1,
            OpCode::SymDifference => in0 != in1,
        }
    }

    /// Same as [`OpCode::is_result_of`] for the on-locations of a label.
    pub fn is_result(self, label: &Label) -> bool {
        self.is_result_of(label.on_location(0), label.on_location(1))
    }

    /// Returns the dimension of an empty result of this operation.
    fn result_dimension(self, dimension0: i32, dimension1: i32) -> i32 {
        match self {
            OpCode::Intersection => dimension0.min(dimension1),
            OpCode::Union | OpCode::SymDifference => dimension0.max(dimension1),
            OpCode::Difference => dimension0,
        }
    }
}

/// How the edges of both inputs are split at their intersections.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub enum NodingStrategy {
    /// Self and mutual intersection of the geometry graphs, rounding intersections to the
    /// precision model of the inputs.
    #[default]
    Graph,
    /// Monotone chain noding at full precision.
    Floating,
    /// Noding that snaps vertices and intersections closer than the given distance.
    Snapping { tolerance: f64 },
    /// Snap rounding to the grid of the given fixed precision model.
    SnapRounding { precision: PrecisionModel },
}

/// Configures an overlay.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayOptions {
    noding: NodingStrategy,
    validate: bool,
}

impl Default for OverlayOptions {
    fn default() -> Self {
        Self {
            noding: NodingStrategy::default(),
            validate: true,
        }
    }
}

impl OverlayOptions {
    pub fn with_noding(mut self, noding: NodingStrategy) -> Self {
        self.noding = noding;
        self
    }

    /// Sets whether the noded edges are checked to be fully noded. Snap-rounded edges
    /// are never checked.
    pub fn with_validation(mut self, validate: bool) -> Self {
        self.validate = validate;
        self
    }

    pub fn noding(&self) -> NodingStrategy {
        self.noding
    }

    pub fn validate(&self) -> bool {
        self.validate
    }
}

/// Computes the overlay of two geometries with a single noding strategy.
#[derive(Debug, Clone, Copy)]
pub struct OverlayOp<'a> {
    geometries: [&'a Geometry; 2],
    options: OverlayOptions,
}

impl<'a> OverlayOp<'a> {
    pub fn new(geometry0: &'a Geometry, geometry1: &'a Geometry) -> Self {
        Self {
            geometries: [geometry0, geometry1],
            options: OverlayOptions::default(),
        }
    }

    pub fn with_options(mut self, options: OverlayOptions) -> Self {
        self.options = options;
        self
    }

    /// Computes the result of the given operation.
    ///
    /// Empty and envelope-disjoint inputs are resolved without building any graph.
    /// Geometry collections are not supported.
    pub fn result(&self, op: OpCode) -> Result<Geometry> {
        let [g0, g1] = self.geometries;
        GeometryFactory::check_compatible(g0.factory(), g1.factory())?;

        if let Some(result) = trivial_result(g0, g1, op) {
            trace!(?op, "trivial overlay");
            return Ok(result);
        }

        for geometry in self.geometries {
            if geometry.is_collection() {
                return Err(GeometryError::illegal(
                    "overlay does not support GeometryCollection arguments",
                ));
            }
        }

        compute_overlay(g0, g1, op, &self.options)
    }
}

/// Overlays a geometry with nothing: nodes it and dissolves its coincident parts.
pub fn unary(geometry: &Geometry, options: OverlayOptions) -> Result<Geometry> {
    let empty = geometry.factory().empty_collection();
    compute_overlay(geometry, &empty, OpCode::Union, &options)
}

/// Resolves the operation for empty inputs and, when envelopes are disjoint, for every
/// input pair whose result is known without noding.
fn trivial_result(g0: &Geometry, g1: &Geometry, op: OpCode) -> Option<Geometry> {
    let factory = g0.factory();
    let empty = || factory.empty(op.result_dimension(g0.dimension(), g1.dimension()));
    let disjoint = !g0.envelope().intersects(&g1.envelope());

    match op {
        OpCode::Intersection if g0.is_empty() || g1.is_empty() || disjoint => Some(empty()),
        OpCode::Difference if g0.is_empty() => Some(empty()),
        OpCode::Difference if g1.is_empty() || disjoint => Some(g0.clone()),
        OpCode::Union | OpCode::SymDifference => match (g0.is_empty(), g1.is_empty()) {
            (true, true) => Some(empty()),
            (true, false) => Some(g1.clone()),
            (false, true) => Some(g0.clone()),
            _ if disjoint && g0.is_polygonal() && g1.is_polygonal() => {
                let mut components = g0.components();
                components.extend(g1.components());
                Some(factory.build_geometry(components))
            }
            _ => None,
        },
        _ => None,
    }
}

/// A node of an input graph to be carried over to the overlay graph.
struct InputNode {
    coord: Coordinate,
    geometry: usize,
    location: Location,
}

fn compute_overlay(
    g0: &Geometry,
    g1: &Geometry,
    op: OpCode,
    options: &OverlayOptions,
) -> Result<Geometry> {
    let factory = g0.factory();
    let mut arg0 = GeometryGraph::new(0, g0);
    let mut arg1 = GeometryGraph::new(1, g1);

    let (edges, input_nodes) = match options.noding {
        NodingStrategy::Graph => node_graphs(&mut arg0, &mut arg1, factory.precision_model())?,
        strategy => node_edges(&arg0, &arg1, strategy, options.validate)?,
    };

    let mut edge_list = EdgeList::default();
    edges.into_iter().for_each(|edge| edge_list.insert_unique(edge));
    compute_labels_from_depths(&mut edge_list);
    edge_list.replace_collapsed();

    if options.validate && options.noding == NodingStrategy::Graph {
        validate_edge_noding(edge_list.as_slice())?;
    }

    let mut graph = PlanarGraph::new();
    for node in input_nodes {
        let index = graph.add_node(node.coord);
        graph
            .node_mut(index)
            .label
            .set_on_location(node.geometry, node.location);
    }
    graph.add_edges(edge_list.into_vec());

    let geometries = [g0, g1];
    label_graph(&mut graph, geometries)?;
    find_result_area_edges(&mut graph, op);
    cancel_duplicate_result_edges(&mut graph);

    let mut polygon_builder = PolygonBuilder::new();
    polygon_builder.add(&mut graph)?;
    let polygons = polygon_builder.polygons()?;
    let lines = build_lines(&mut graph, op, &polygons)?;
    let points = build_points(&graph, op, &lines, &polygons);

    debug!(
        ?op,
        noding = ?options.noding,
        points = points.len(),
        lines = lines.len(),
        polygons = polygons.len(),
        "overlay computed"
    );

    let parts: Vec<Geometry> = points
        .into_iter()
        .map(|point| factory.from_kind(GeometryKind::Point(point)))
        .chain(lines.into_iter().map(|line| factory.from_line_string(line)))
        .chain(polygons.into_iter().map(|polygon| factory.from_polygon(polygon)))
        .collect();

    if parts.is_empty() {
        return Ok(factory.empty(op.result_dimension(g0.dimension(), g1.dimension())));
    }
    Ok(factory.build_geometry(parts))
}

/// Nodes both inputs through their geometry graphs, returning the split edges and every
/// input node.
fn node_graphs(
    arg0: &mut GeometryGraph<'_>,
    arg1: &mut GeometryGraph<'_>,
    precision: PrecisionModel,
) -> Result<(Vec<Edge>, Vec<InputNode>)> {
    let li = if precision.is_floating() {
        LineIntersector::new()
    } else {
        LineIntersector::with_precision(precision)
    };

    arg0.compute_self_nodes(li.clone(), false)?;
    arg1.compute_self_nodes(li.clone(), false)?;
    arg0.compute_edge_intersections(arg1, li, true)?;

    let mut edges = Vec::new();
    arg0.compute_split_edges(&mut edges);
    arg1.compute_split_edges(&mut edges);

    let mut nodes = Vec::new();
    copy_input_nodes(arg0, |_| true, &mut nodes);
    copy_input_nodes(arg1, |_| true, &mut nodes);

    Ok((edges, nodes))
}

/// Nodes the edges of both inputs together with a noder.
///
/// Only the input nodes still present after noding are returned: edge end points and
/// point components.
fn node_edges(
    arg0: &GeometryGraph<'_>,
    arg1: &GeometryGraph<'_>,
    strategy: NodingStrategy,
    validate: bool,
) -> Result<(Vec<Edge>, Vec<InputNode>)> {
    let strings: Vec<NodedSegmentString<Label>> = arg0
        .edges()
        .iter()
        .chain(arg1.edges())
        .map(|edge| NodedSegmentString::new(edge.coords().to_vec(), edge.label))
        .collect();

    let noded = match strategy {
        NodingStrategy::Floating if validate => {
            ValidatingNoder::new(MCIndexNoder::new(IntersectionAdder::default())).compute_nodes(strings)?
        }
        NodingStrategy::Floating | NodingStrategy::Graph => {
            MCIndexNoder::new(IntersectionAdder::default()).compute_nodes(strings)?
        }
        NodingStrategy::Snapping { tolerance } => SnappingNoder::new(tolerance).compute_nodes(strings)?,
        NodingStrategy::SnapRounding { precision } => {
            SnapRoundingNoder::new(precision).compute_nodes(strings)?
        }
    };

    let edges: Vec<Edge> = noded
        .into_iter()
        .filter_map(|string| {
            let label = *string.data();
            let coords = without_repeated_points(&string.into_coords());
            (coords.len() >= 2).then(|| Edge::new(coords, label))
        })
        .collect();

    let end_points: BTreeSet<Coordinate> = edges
        .iter()
        .flat_map(|edge| [edge.coords()[0], edge.coords()[edge.len() - 1]])
        .collect();

    let mut nodes = Vec::new();
    for arg in [arg0, arg1] {
        copy_input_nodes(
            arg,
            |coord| end_points.contains(coord) || arg.points().contains(coord),
            &mut nodes,
        );
    }

    Ok((edges, nodes))
}

fn copy_input_nodes(
    arg: &GeometryGraph<'_>,
    keep: impl Fn(&Coordinate) -> bool,
    out: &mut Vec<InputNode>,
) {
    let geometry = arg.index();
    out.extend(
        arg.nodes()
            .filter(|&(coord, _)| keep(coord))
            .map(|(coord, label)| InputNode {
                coord: *coord,
                geometry,
                location: label.on_location(geometry),
            }),
    );
}

/// Resolves the side locations of merged area edges from their depths. Edges with the
/// same depth on both sides are collapsed areas and become lines.
fn compute_labels_from_depths(edges: &mut EdgeList) {
    for edge in edges.iter_mut() {
        if edge.depth.is_null() {
            continue;
        }

        edge.depth.normalize();
        for geometry in 0..2 {
            if edge.label.is_null(geometry)
                || !edge.label.is_area()
                || edge.depth.is_null_of(geometry)
            {
                continue;
            }

            if edge.depth.delta(geometry) == 0 {
                edge.label.to_line_of(geometry);
            } else {
                for position in [Position::Left, Position::Right] {
                    let location = edge.depth.location(geometry, position);
                    edge.label.set_location(geometry, position, location);
                }
            }
        }
    }
}

/// Completes the labels of every node and directed edge of the graph.
fn label_graph(graph: &mut PlanarGraph, geometries: [&Geometry; 2]) -> Result<()> {
    let nodes = graph.node_indices();
    for &node in &nodes {
        graph.compute_labelling(node, |geometry, coord| {
            locate_in_area(coord, geometries[geometry])
        })?;
    }
    for &node in &nodes {
        graph.merge_sym_labels(node);
    }
    for &node in &nodes {
        graph.update_node_labelling(node);
    }

    // nodes known to a single geometry are located in the other one
    let locator = PointLocator::default();
    for &node in &nodes {
        let current = graph.node(node);
        if current.is_isolated() {
            let target = if current.label.is_null(0) { 0 } else { 1 };
            let location = locator.locate(current.coordinate(), geometries[target]);
            graph.node_mut(node).label.set_on_location(target, location);
        }
        graph.update_labelling(node);
    }

    Ok(())
}

fn find_result_area_edges(graph: &mut PlanarGraph, op: OpCode) {
    for de in 0..graph.directed_edge_count() {
        let directed = graph.directed_edge(de);
        let label = &directed.label;
        if label.is_area()
            && !directed.is_interior_area_edge()
            && op.is_result_of(
                label.location(0, Position::Right),
                label.location(1, Position::Right),
            )
        {
            graph.directed_edge_mut(de).in_result = true;
        }
    }
}

/// Removes from the result the edges selected in both directions, which would bound a
/// zero-width area.
fn cancel_duplicate_result_edges(graph: &mut PlanarGraph) {
    for de in 0..graph.directed_edge_count() {
        let sym = sym(de);
        if graph.directed_edge(de).in_result && graph.directed_edge(sym).in_result {
            graph.directed_edge_mut(de).in_result = false;
            graph.directed_edge_mut(sym).in_result = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{coord, geom::GeometryFactory};

    fn square(factory: &std::sync::Arc<GeometryFactory>, x: f64, y: f64, size: f64) -> Geometry {
        factory
            .polygon(
                vec![
                    coord!(x, y),
                    coord!(x + size, y),
                    coord!(x + size, y + size),
                    coord!(x, y + size),
                    coord!(x, y),
                ],
                vec![],
            )
            .unwrap()
    }

    #[test]
    fn result_locations() {
        use Location::*;

        struct Test {
            op: OpCode,
            locations: (Location, Location),
            want: bool,
        }

        vec![
            Test { op: OpCode::Intersection, locations: (Interior, Boundary), want: true },
            Test { op: OpCode::Intersection, locations: (Interior, Exterior), want: false },
            Test { op: OpCode::Union, locations: (Exterior, Boundary), want: true },
            Test { op: OpCode::Union, locations: (Exterior, Exterior), want: false },
            Test { op: OpCode::Difference, locations: (Interior, Exterior), want: true },
            Test { op: OpCode::Difference, locations: (Interior, Interior), want: false },
            Test { op: OpCode::SymDifference, locations: (Exterior, Interior), want: true },
            Test { op: OpCode::SymDifference, locations: (Boundary, Interior), want: false },
        ]
        .into_iter()
        .for_each(|test| {
            let (l0, l1) = test.locations;
            assert_eq!(test.op.is_result_of(l0, l1), test.want, "{:?} {l0:?} {l1:?}", test.op);
        });
    }

    #[test]
    fn overlapping_squares() {
        let factory = GeometryFactory::floating();
        let a = square(&factory, 0., 0., 2.);
        let b = square(&factory, 1., 1., 2.);

        struct Test {
            name: &'static str,
            op: OpCode,
            area: f64,
        }

        vec![
            Test { name: "intersection", op: OpCode::Intersection, area: 1. },
            Test { name: "union", op: OpCode::Union, area: 7. },
            Test { name: "difference", op: OpCode::Difference, area: 3. },
            Test { name: "symmetric difference", op: OpCode::SymDifference, area: 6. },
        ]
        .into_iter()
        .for_each(|test| {
            for noding in [NodingStrategy::Graph, NodingStrategy::Floating] {
                let options = OverlayOptions::default().with_noding(noding);
                let result = OverlayOp::new(&a, &b).with_options(options).result(test.op).unwrap();
                let area = crate::algorithm::measure::area(&result);
                assert!((area - test.area).abs() < 1e-9, "{} with {noding:?}: got {area}", test.name);
            }
        });
    }

    #[test]
    fn line_crossing_polygon() {
        let factory = GeometryFactory::floating();
        let polygon = square(&factory, 0., 0., 2.);
        let line = factory
            .line_string(vec![coord!(-1, 1), coord!(3, 1)])
            .unwrap();

        let inside = OverlayOp::new(&line, &polygon).result(OpCode::Intersection).unwrap();
        assert!(inside.is_lineal());
        assert!((crate::algorithm::measure::length(&inside) - 2.).abs() < 1e-12);

        let outside = OverlayOp::new(&line, &polygon).result(OpCode::Difference).unwrap();
        assert_eq!(outside.num_geometries(), 2);
        assert!((crate::algorithm::measure::length(&outside) - 2.).abs() < 1e-12);
    }

    #[test]
    fn point_on_polygon() {
        let factory = GeometryFactory::floating();
        let polygon = square(&factory, 0., 0., 2.);
        let point = factory.point(coord!(1, 1));

        let inside = OverlayOp::new(&point, &polygon).result(OpCode::Intersection).unwrap();
        assert_eq!(inside.points(), vec![coord!(1, 1)]);

        let outside = OverlayOp::new(&point, &polygon).result(OpCode::Difference).unwrap();
        assert!(outside.is_empty());
    }

    #[test]
    fn trivial_results() {
        let factory = GeometryFactory::floating();
        let a = square(&factory, 0., 0., 1.);
        let b = square(&factory, 5., 5., 1.);
        let empty = factory.empty_polygon();

        let intersection = OverlayOp::new(&a, &b).result(OpCode::Intersection).unwrap();
        assert!(intersection.is_empty());
        assert_eq!(intersection.dimension(), 2);

        let union = OverlayOp::new(&a, &b).result(OpCode::Union).unwrap();
        assert_eq!(union.num_geometries(), 2);

        let difference = OverlayOp::new(&empty, &a).result(OpCode::Difference).unwrap();
        assert!(difference.is_empty());

        assert_eq!(OverlayOp::new(&a, &empty).result(OpCode::Union).unwrap(), a);
    }

    #[test]
    fn collections_are_rejected() {
        let factory = GeometryFactory::floating();
        let a = square(&factory, 0., 0., 1.);
        let collection = factory.collection(vec![square(&factory, 0.5, 0.5, 1.)]);

        let err = OverlayOp::new(&a, &collection).result(OpCode::Union).unwrap_err();
        assert!(matches!(err, GeometryError::IllegalArgument(_)));
    }
}
