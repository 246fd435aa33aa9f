use tracing::trace;

use crate::{
    error::Result,
    geom::{Geometry, Location, Position, PrecisionModel},
    geomgraph::{Edge, EdgeList, Label, PlanarGraph},
    interrupt,
    noding::{
        IntersectionAdder, MCIndexNoder, NodedSegmentString, Noder, ScaledNoder, SnapRoundingNoder,
        ValidatingNoder,
    },
    operation::{
        buffer::{
            BufferParameters, curve_builder::OffsetCurveBuilder, curve_set::OffsetCurveSetBuilder,
            depth_locater, subgraph::BufferSubgraph,
        },
        overlay::PolygonBuilder,
    },
};

/// Builds the buffer of a geometry at a single precision.
///
/// The raw offset curves are noded, merged into a planar graph and labelled with depths;
/// the result is bounded by the edges having depth on the right and none on the left.
#[derive(Debug, Clone, Copy)]
pub(super) struct BufferBuilder {
    params: BufferParameters,
    precision: Option<PrecisionModel>,
}

impl BufferBuilder {
    pub fn new(params: BufferParameters) -> Self {
        Self {
            params,
            precision: None,
        }
    }

    /// Computes curves and nodes them snap-rounded at the given precision, instead of the
    /// precision of the input.
    pub fn with_precision(mut self, precision: PrecisionModel) -> Self {
        self.precision = Some(precision);
        self
    }

    pub fn buffer(&self, geometry: &Geometry, distance: f64) -> Result<Geometry> {
        let factory = geometry.factory();
        let precision = self.precision.unwrap_or_else(|| geometry.precision_model());

        let curve_builder = OffsetCurveBuilder::new(precision, self.params);
        let curves = OffsetCurveSetBuilder::new(&curve_builder, distance).curves(geometry);
        if curves.is_empty() {
            return Ok(factory.empty_polygon());
        }

        let noded = self.node(curves, precision, distance == 0.0)?;
        let edges = merge_edges(noded);
        trace!(edges = edges.len(), "buffer curves noded");

        let mut graph = PlanarGraph::new();
        graph.add_edges(edges.into_vec());

        let subgraphs = create_subgraphs(&mut graph)?;
        let mut builder = PolygonBuilder::new();
        let mut processed = Vec::with_capacity(subgraphs.len());
        for subgraph in subgraphs {
            interrupt::check()?;
            let outside = depth_locater::depth_at(&graph, &processed, &subgraph.rightmost_coordinate());
            subgraph.compute_depth(&mut graph, outside)?;
            subgraph.find_result_edges(&mut graph);
            builder.add_edges(&mut graph, subgraph.directed_edges(), subgraph.nodes())?;
            processed.push(subgraph);
        }

        let polygons = builder.polygons()?;
        if polygons.is_empty() {
            return Ok(factory.empty_polygon());
        }

        Ok(factory.build_geometry(
            polygons
                .into_iter()
                .map(|polygon| factory.from_polygon(polygon))
                .collect(),
        ))
    }

    fn node(
        &self,
        curves: Vec<NodedSegmentString<Label>>,
        precision: PrecisionModel,
        validate: bool,
    ) -> Result<Vec<NodedSegmentString<Label>>> {
        let mut noder: Box<dyn Noder<Label>> = match self.precision {
            Some(PrecisionModel::Fixed { scale }) => Box::new(ScaledNoder::new(
                SnapRoundingNoder::new(PrecisionModel::fixed(1.0)),
                scale,
            )),
            _ => Box::new(MCIndexNoder::new(IntersectionAdder::with_precision(precision))),
        };

        if validate {
            noder = Box::new(ValidatingNoder::new(noder));
        }
        noder.compute_nodes(curves)
    }
}

/// Returns the depth change from the left to the right side of an edge with the given
/// label.
fn depth_delta(label: &Label) -> i32 {
    match (
        label.location(0, Position::Left),
        label.location(0, Position::Right),
    ) {
        (Location::Interior, Location::Exterior) => 1,
        (Location::Exterior, Location::Interior) => -1,
        _ => 0,
    }
}

/// Converts the noded curves into edges, merging the labels and depth deltas of equal
/// ones.
fn merge_edges(noded: Vec<NodedSegmentString<Label>>) -> EdgeList {
    let mut edges = EdgeList::default();
    for string in noded {
        let label = *string.data();
        let coords = string.into_coords();
        if coords.len() == 2 && coords[0] == coords[1] {
            continue;
        }

        let edge = Edge::new(coords, label);
        let Some(position) = edges.find_equal(&edge) else {
            let delta = depth_delta(&edge.label);
            let position = edges.add(edge);
            edges.as_mut_slice()[position].depth_delta = delta;
            continue;
        };

        let existing = &mut edges.as_mut_slice()[position];
        let mut label = edge.label;
        if !existing.is_pointwise_equal(&edge) {
            label.flip();
        }
        existing.label.merge(&label);
        existing.depth_delta += depth_delta(&label);
    }

    edges
}

/// Splits the graph into its connected components, right-most first.
fn create_subgraphs(graph: &mut PlanarGraph) -> Result<Vec<BufferSubgraph>> {
    let mut subgraphs = Vec::new();
    for node in graph.node_indices() {
        if !graph.node(node).visited {
            subgraphs.push(BufferSubgraph::create(graph, node)?);
        }
    }

    subgraphs.sort_by(|a, b| {
        b.rightmost_coordinate()
            .x
            .total_cmp(&a.rightmost_coordinate().x)
    });
    Ok(subgraphs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{algorithm::measure, coord, geom::GeometryFactory};

    #[test]
    fn merged_edges_cancel_depth_deltas() {
        let coords = vec![coord!(0, 0), coord!(10, 0)];
        let label = Label::area(0, Location::Boundary, Location::Exterior, Location::Interior);

        let edges = merge_edges(vec![
            NodedSegmentString::new(coords.clone(), label),
            NodedSegmentString::new(coords.into_iter().rev().collect(), label),
        ]);

        assert_eq!(edges.len(), 1);
        assert_eq!(edges.get(0).depth_delta, 0);
    }

    #[test]
    fn buffers() {
        struct Test {
            name: &'static str,
            geometry: Geometry,
            distance: f64,
            area: f64,
        }

        let factory = GeometryFactory::floating();
        let square = factory
            .polygon(
                vec![coord!(0, 0), coord!(0, 10), coord!(10, 10), coord!(10, 0), coord!(0, 0)],
                vec![],
            )
            .unwrap();
        let params = BufferParameters::default().with_join_style(crate::operation::buffer::JoinStyle::Mitre);

        vec![
            Test {
                name: "square grown",
                geometry: square.clone(),
                distance: 1.0,
                area: 144.,
            },
            Test {
                name: "square shrunk",
                geometry: square.clone(),
                distance: -1.0,
                area: 64.,
            },
            Test {
                name: "square eroded",
                geometry: square,
                distance: -6.0,
                area: 0.,
            },
        ]
        .into_iter()
        .for_each(|test| {
            let buffer = BufferBuilder::new(params)
                .buffer(&test.geometry, test.distance)
                .unwrap();
            assert!(
                (measure::area(&buffer) - test.area).abs() < 1e-9,
                "{}: got area {}",
                test.name,
                measure::area(&buffer)
            );
        });
    }
}
