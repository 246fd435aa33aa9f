use crate::{
    error::{GeometryError, Result},
    geom::{Coordinate, Location, Position},
    geomgraph::{EdgeRing, GeometryGraph, PlanarGraph, RingKind, build_minimal_rings, sym},
};

/// Finds a point where the interior of a noded area is disconnected, if any.
///
/// The edges having the interior on their right are linked into rings. Walking from every
/// shell must visit all of the rings bounding the interior: a ring the walk never reaches
/// is an interior piece cut off by holes touching the shell or each other.
pub(super) fn find_disconnected_interior(graph: &GeometryGraph<'_>) -> Result<Option<Coordinate>> {
    let mut edges = Vec::new();
    graph.compute_split_edges(&mut edges);

    let mut planar = PlanarGraph::new();
    planar.add_edges(edges);
    for de in 0..planar.directed_edge_count() {
        let directed = planar.directed_edge_mut(de);
        if directed.label.location(0, Position::Right) == Location::Interior {
            directed.in_result = true;
        }
    }
    planar.link_result_directed_edges()?;

    let rings = build_edge_rings(&mut planar)?;
    for polygon in graph.geometry().polygons() {
        visit_interior_ring(&mut planar, polygon.shell().coords().as_slice())?;
    }

    Ok(rings
        .iter()
        .filter(|ring| !ring.is_hole())
        .filter(|ring| {
            ring.edges().first().is_some_and(|&de| {
                planar.directed_edge(de).label.location(0, Position::Right) == Location::Interior
            })
        })
        .flat_map(|ring| ring.edges())
        .find(|&&de| !planar.directed_edge(de).visited)
        .map(|&de| *planar.directed_edge(de).coordinate()))
}

/// Builds the minimal rings of every maximal ring formed by the result edges.
fn build_edge_rings(graph: &mut PlanarGraph) -> Result<Vec<EdgeRing>> {
    let mut rings = Vec::new();
    let mut minimal = Vec::new();
    for de in 0..graph.directed_edge_count() {
        let directed = graph.directed_edge(de);
        if !directed.in_result || directed.edge_ring.is_some() {
            continue;
        }

        let maximal = EdgeRing::build(graph, &mut rings, de, RingKind::Maximal)?;
        minimal.extend(build_minimal_rings(graph, &mut rings, maximal)?);
    }

    Ok(rings
        .into_iter()
        .enumerate()
        .filter(|(id, _)| minimal.contains(id))
        .map(|(_, ring)| ring)
        .collect())
}

/// Marks as visited the result edges reachable from the interior side of the given ring.
fn visit_interior_ring(graph: &mut PlanarGraph, ring: &[Coordinate]) -> Result<()> {
    let Some(&p0) = ring.first() else {
        return Ok(());
    };
    let Some(&p1) = ring.iter().find(|p| !p.equals_2d(&p0)) else {
        return Ok(());
    };
    let Some(edge) = graph.find_edge_in_same_direction(&p0, &p1) else {
        return Ok(());
    };

    let forward = 2 * edge;
    let start = [forward, sym(forward)]
        .into_iter()
        .find(|&de| graph.directed_edge(de).label.location(0, Position::Right) == Location::Interior)
        .ok_or_else(|| {
            GeometryError::assertion("unable to find directed edge with interior on its right")
        })?;

    let mut current = start;
    loop {
        graph.directed_edge_mut(current).visited = true;
        current = graph.directed_edge(current).next.ok_or_else(|| {
            GeometryError::topology(
                "found unlinked directed edge",
                *graph.directed_edge(current).coordinate(),
            )
        })?;
        if current == start {
            return Ok(());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{algorithm::LineIntersector, coord, geom::{CoordinateSequence, GeometryFactory}};

    #[test]
    fn interior_connectivity() {
        struct Test {
            name: &'static str,
            hole: Vec<Coordinate>,
            disconnected: bool,
        }

        let factory = GeometryFactory::floating();
        let shell = vec![coord!(0, 0), coord!(0, 10), coord!(10, 10), coord!(10, 0), coord!(0, 0)];

        vec![
            Test {
                name: "hole inside",
                hole: vec![coord!(2, 2), coord!(8, 2), coord!(8, 8), coord!(2, 8), coord!(2, 2)],
                disconnected: false,
            },
            Test {
                name: "hole touching the shell once",
                hole: vec![coord!(0, 5), coord!(5, 2), coord!(8, 5), coord!(5, 8), coord!(0, 5)],
                disconnected: false,
            },
            Test {
                name: "diamond hole touching every side",
                hole: vec![coord!(0, 5), coord!(5, 0), coord!(10, 5), coord!(5, 10), coord!(0, 5)],
                disconnected: true,
            },
        ]
        .into_iter()
        .for_each(|test| {
            let polygon = factory
                .polygon(shell.clone(), vec![CoordinateSequence::from(test.hole)])
                .unwrap();
            let mut graph = GeometryGraph::new(0, &polygon);
            graph.compute_self_nodes(LineIntersector::new(), true).unwrap();

            let found = find_disconnected_interior(&graph).unwrap();
            assert_eq!(found.is_some(), test.disconnected, "{}", test.name);
        });
    }
}
