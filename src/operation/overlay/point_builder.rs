use crate::{
    algorithm::locate::locate_on_line,
    geom::{LineString, Location, Point, Polygon},
    geomgraph::PlanarGraph,
    operation::overlay::{OpCode, line_builder::is_covered_by_area},
};

/// Collects the nodes of the graph making up the puntal part of an overlay result: those
/// in the result but not on any result edge, line or polygon.
pub(super) fn build_points(
    graph: &PlanarGraph,
    op: OpCode,
    lines: &[LineString],
    polygons: &[Polygon],
) -> Vec<Point> {
    let mut points = Vec::new();
    for index in graph.node_indices() {
        if graph.is_incident_edge_in_result(index) {
            continue;
        }

        let node = graph.node(index);
        if node.degree() > 0 && op != OpCode::Intersection {
            continue;
        }
        if !op.is_result(&node.label) {
            continue;
        }

        let coord = node.coordinate();
        let on_line = lines
            .iter()
            .any(|line| locate_on_line(coord, line.coords().as_slice()) != Location::Exterior);
        if !on_line && !is_covered_by_area(coord, polygons) {
            points.push(Point::new(*coord));
        }
    }

    points
}
