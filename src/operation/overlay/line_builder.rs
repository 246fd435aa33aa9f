use crate::{
    algorithm::locate::locate_in_polygon,
    error::Result,
    geom::{Coordinate, LineString, Location, Polygon},
    geomgraph::PlanarGraph,
    operation::overlay::OpCode,
};

/// Returns true if the point is not in the exterior of some polygon.
pub(super) fn is_covered_by_area(p: &Coordinate, polygons: &[Polygon]) -> bool {
    polygons
        .iter()
        .any(|polygon| locate_in_polygon(p, polygon) != Location::Exterior)
}

/// Collects the edges of the graph making up the lineal part of an overlay result.
///
/// Lines covered by the result polygons are left out. An area boundary is a result line
/// only when the operation is an intersection and it is touched, but not crossed, by the
/// other geometry.
pub(super) fn build_lines(
    graph: &mut PlanarGraph,
    op: OpCode,
    polygons: &[Polygon],
) -> Result<Vec<LineString>> {
    find_covered_line_edges(graph, polygons);

    let mut edges = Vec::new();
    for de in 0..graph.directed_edge_count() {
        collect_line_edge(graph, de, op, &mut edges);
        collect_boundary_touch_edge(graph, de, op, &mut edges);
    }

    let mut lines = Vec::with_capacity(edges.len());
    for edge in edges {
        lines.push(LineString::new(graph.edge(edge).coords().to_vec().into())?);
        graph.edge_mut(edge).in_result = true;
    }

    Ok(lines)
}

fn find_covered_line_edges(graph: &mut PlanarGraph, polygons: &[Polygon]) {
    for node in graph.node_indices() {
        graph.find_covered_line_edges(node);
    }

    // line edges with no area edge around their nodes
    for de in 0..graph.directed_edge_count() {
        let directed = graph.directed_edge(de);
        let edge = directed.edge();
        if directed.is_line_edge() && graph.edge(edge).covered.is_none() {
            let covered = is_covered_by_area(directed.coordinate(), polygons);
            graph.edge_mut(edge).covered = Some(covered);
        }
    }
}

fn collect_line_edge(graph: &mut PlanarGraph, de: usize, op: OpCode, edges: &mut Vec<usize>) {
    let directed = graph.directed_edge(de);
    let edge = directed.edge();
    if directed.is_line_edge()
        && !directed.visited
        && op.is_result(&directed.label)
        && !graph.edge(edge).is_covered()
    {
        edges.push(edge);
        graph.set_visited_edge(de, true);
    }
}

fn collect_boundary_touch_edge(graph: &mut PlanarGraph, de: usize, op: OpCode, edges: &mut Vec<usize>) {
    let directed = graph.directed_edge(de);
    let edge = directed.edge();
    if directed.is_line_edge()
        || directed.visited
        || directed.is_interior_area_edge()
        || graph.edge(edge).in_result
    {
        return;
    }

    if op == OpCode::Intersection && op.is_result(&directed.label) {
        edges.push(edge);
        graph.set_visited_edge(de, true);
    }
}
