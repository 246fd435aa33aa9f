use crate::{
    algorithm::LineIntersector,
    error::Result,
    geom::Coordinate,
    geomgraph::GeometryGraph,
    operation::relate::node_graph::RelateNodeGraph,
};

/// What makes the topology of an area inconsistent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(super) enum Inconsistency {
    /// Two rings cross, or the sides of the edges around a node disagree.
    SelfIntersection(Coordinate),
    /// Two rings share the same edge.
    DuplicateRings(Coordinate),
}

/// Checks that the noded rings of an area can form a consistent topology.
///
/// The rings must not cross properly, the interior and exterior sides of the edges around
/// every node must alternate, and no edge may be shared by two rings.
pub(super) fn check_consistent_area(graph: &mut GeometryGraph<'_>) -> Result<Option<Inconsistency>> {
    let intersector = graph.compute_self_nodes(LineIntersector::new(), true)?;
    if intersector.has_proper_intersection()
        && let Some(point) = intersector.proper_intersection_point()
    {
        return Ok(Some(Inconsistency::SelfIntersection(point)));
    }

    let rule = graph.boundary_node_rule();
    let mut nodes = RelateNodeGraph::build(graph);
    for (coord, node) in nodes.iter_mut() {
        if !node.is_area_labels_consistent(0, rule)? {
            return Ok(Some(Inconsistency::SelfIntersection(*coord)));
        }
    }

    let duplicate = nodes
        .iter()
        .flat_map(|(_, node)| node.bundles())
        .find(|bundle| bundle.ends().len() > 1)
        .map(|bundle| *graph.edges()[bundle.ends()[0].edge].coordinate(0));

    Ok(duplicate.map(Inconsistency::DuplicateRings))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{coord, geom::{Geometry, GeometryFactory}};

    #[test]
    fn area_consistency() {
        struct Test {
            name: &'static str,
            geometry: Geometry,
            want: Option<Inconsistency>,
        }

        let factory = GeometryFactory::floating();
        let square = |x: f64| {
            factory
                .polygon(
                    vec![coord!(x, 0), coord!(x, 4), coord!(x + 4., 4), coord!(x + 4., 0), coord!(x, 0)],
                    vec![],
                )
                .unwrap()
        };
        let polygon = |geometry: Geometry| match geometry.into_kind() {
            crate::geom::GeometryKind::Polygon(polygon) => polygon,
            _ => unreachable!(),
        };

        vec![
            Test {
                name: "simple square",
                geometry: square(0.),
                want: None,
            },
            Test {
                name: "bow tie",
                geometry: factory
                    .polygon(
                        vec![coord!(0, 0), coord!(4, 4), coord!(4, 0), coord!(0, 4), coord!(0, 0)],
                        vec![],
                    )
                    .unwrap(),
                want: Some(Inconsistency::SelfIntersection(coord!(2, 2))),
            },
            Test {
                name: "same polygon twice",
                geometry: factory.multi_polygon(vec![polygon(square(0.)), polygon(square(0.))]),
                want: Some(Inconsistency::DuplicateRings(coord!(0, 0))),
            },
        ]
        .into_iter()
        .for_each(|test| {
            let mut graph = GeometryGraph::new(0, &test.geometry);
            let got = check_consistent_area(&mut graph).unwrap();
            assert_eq!(got, test.want, "{}", test.name);
        });
    }
}
