use tracing::trace;

use crate::{
    algorithm::locate,
    error::{GeometryError, Result},
    geom::{Coordinate, Polygon, sequence::point_not_in_list},
    geomgraph::{EdgeRing, PlanarGraph, RingKind, build_minimal_rings},
};

/// Assembles the polygons bounded by the result directed edges of a graph.
#[derive(Debug, Default)]
pub struct PolygonBuilder {
    rings: Vec<EdgeRing>,
    shells: Vec<usize>,
}

impl PolygonBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds the rings formed by every result edge of the graph.
    pub fn add(&mut self, graph: &mut PlanarGraph) -> Result<()> {
        let directed_edges: Vec<usize> = (0..graph.directed_edge_count()).collect();
        let nodes = graph.node_indices();
        self.add_edges(graph, &directed_edges, &nodes)
    }

    /// Adds the rings formed by the given result edges, linking them at the given nodes.
    pub fn add_edges(
        &mut self,
        graph: &mut PlanarGraph,
        directed_edges: &[usize],
        nodes: &[usize],
    ) -> Result<()> {
        for &node in nodes {
            graph.link_result_directed_edges_at(node)?;
        }

        let maximal = self.build_maximal_rings(graph, directed_edges)?;
        let mut free_holes = Vec::new();
        let mut simple = Vec::new();

        for ring in maximal {
            if self.rings[ring].max_node_degree(graph, ring) <= 2 {
                simple.push(ring);
                continue;
            }

            let minimal = build_minimal_rings(graph, &mut self.rings, ring)?;
            match self.find_shell(&minimal)? {
                Some(shell) => {
                    let holes: Vec<usize> = minimal
                        .iter()
                        .copied()
                        .filter(|&r| self.rings[r].is_hole())
                        .collect();
                    for hole in holes {
                        self.set_shell(hole, shell);
                    }
                    self.shells.push(shell);
                }
                None => free_holes.extend(minimal),
            }
        }

        for ring in simple {
            if self.rings[ring].is_hole() {
                free_holes.push(ring);
            } else {
                self.shells.push(ring);
            }
        }

        trace!(
            shells = self.shells.len(),
            free_holes = free_holes.len(),
            "edge rings built"
        );
        self.place_free_holes(&free_holes)
    }

    fn build_maximal_rings(&mut self, graph: &mut PlanarGraph, directed_edges: &[usize]) -> Result<Vec<usize>> {
        let mut maximal = Vec::new();
        for &de in directed_edges {
            let directed = graph.directed_edge(de);
            if !directed.in_result || !directed.label.is_area() || directed.edge_ring.is_some() {
                continue;
            }

            let ring = EdgeRing::build(graph, &mut self.rings, de, RingKind::Maximal)?;
            self.rings[ring].set_in_result(graph);
            maximal.push(ring);
        }

        Ok(maximal)
    }

    /// Returns the only non-hole ring among the given minimal rings, if any.
    fn find_shell(&self, minimal: &[usize]) -> Result<Option<usize>> {
        let mut shells = minimal.iter().filter(|&&ring| !self.rings[ring].is_hole());
        let shell = shells.next().copied();
        if shells.next().is_some() {
            return Err(GeometryError::assertion(
                "found two shells in minimal edge ring list",
            ));
        }

        Ok(shell)
    }

    fn set_shell(&mut self, hole: usize, shell: usize) {
        self.rings[hole].shell = Some(shell);
        self.rings[shell].holes.push(hole);
    }

    fn place_free_holes(&mut self, free_holes: &[usize]) -> Result<()> {
        for &hole in free_holes {
            if self.rings[hole].shell.is_some() {
                continue;
            }

            let Some(shell) = self.find_ring_containing(hole) else {
                return Err(GeometryError::topology(
                    "unable to assign hole to a shell",
                    self.rings[hole].coords().first().copied(),
                ));
            };
            self.set_shell(hole, shell);
        }

        Ok(())
    }

    /// Returns the smallest shell containing the given hole.
    ///
    /// A shell with the same envelope as the hole is never a candidate, since it can only be
    /// the hole's own ring walked in the opposite direction.
    fn find_ring_containing(&self, hole: usize) -> Option<usize> {
        let test = &self.rings[hole];
        let test_env = test.envelope();

        let mut smallest: Option<usize> = None;
        for &shell in &self.shells {
            let candidate = &self.rings[shell];
            let env = candidate.envelope();
            if env == test_env || !env.contains(test_env) {
                continue;
            }

            let Some(p) = point_not_in_list(test.coords(), candidate.coords())
                .or_else(|| test.coords().first().copied())
            else {
                continue;
            };

            if locate::is_in_ring(&p, candidate.coords())
                && smallest.is_none_or(|current| self.rings[current].envelope().contains(env))
            {
                smallest = Some(shell);
            }
        }

        smallest
    }

    /// Returns the polygons built so far.
    pub fn polygons(&self) -> Result<Vec<Polygon>> {
        self.shells
            .iter()
            .map(|&shell| self.rings[shell].to_polygon(&self.rings))
            .collect()
    }

    /// Returns true if the point lies inside any of the polygons built so far.
    pub fn contains_point(&self, p: &Coordinate) -> bool {
        self.shells
            .iter()
            .any(|&shell| self.rings[shell].contains_point(&self.rings, p))
    }
}
