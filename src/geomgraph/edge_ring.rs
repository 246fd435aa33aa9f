use crate::{
    algorithm::{locate, orientation::is_ccw},
    error::{GeometryError, Result},
    geom::{Coordinate, Envelope, LinearRing, Polygon, Position},
    geomgraph::{Label, PlanarGraph},
};

/// How the directed edges of a ring are linked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RingKind {
    /// Follows [`DirectedEdge::next`](super::DirectedEdge::next); nodes may have any degree.
    Maximal,
    /// Follows [`DirectedEdge::next_min`](super::DirectedEdge::next_min); every node has
    /// degree two.
    Minimal,
}

/// A closed cycle of directed edges bounding part of a result area.
#[derive(Debug, Clone)]
pub struct EdgeRing {
    kind: RingKind,
    start: usize,
    edges: Vec<usize>,
    coords: Vec<Coordinate>,
    envelope: Envelope,
    label: Label,
    is_hole: bool,
    pub shell: Option<usize>,
    pub holes: Vec<usize>,
}

impl EdgeRing {
    pub fn kind(&self) -> RingKind {
        self.kind
    }

    /// The directed edge the ring was built from.
    pub fn start(&self) -> usize {
        self.start
    }

    /// The directed edges of the ring, in order.
    pub fn edges(&self) -> &[usize] {
        &self.edges
    }

    pub fn coords(&self) -> &[Coordinate] {
        &self.coords
    }

    pub fn envelope(&self) -> &Envelope {
        &self.envelope
    }

    pub fn label(&self) -> &Label {
        &self.label
    }

    /// Returns true if the ring is counter-clockwise, having the area on its outside.
    pub fn is_hole(&self) -> bool {
        self.is_hole
    }

    pub fn is_shell(&self) -> bool {
        self.shell.is_none()
    }

    fn next(&self, graph: &PlanarGraph, directed_edge: usize) -> Option<usize> {
        let de = graph.directed_edge(directed_edge);
        match self.kind {
            RingKind::Maximal => de.next,
            RingKind::Minimal => de.next_min,
        }
    }

    fn owner(&self, graph: &PlanarGraph, directed_edge: usize) -> Option<usize> {
        let de = graph.directed_edge(directed_edge);
        match self.kind {
            RingKind::Maximal => de.edge_ring,
            RingKind::Minimal => de.min_edge_ring,
        }
    }

    fn set_owner(&self, graph: &mut PlanarGraph, directed_edge: usize, ring: usize) {
        let de = graph.directed_edge_mut(directed_edge);
        match self.kind {
            RingKind::Maximal => de.edge_ring = Some(ring),
            RingKind::Minimal => de.min_edge_ring = Some(ring),
        }
    }

    /// Walks the ring from the given directed edge and registers it in the arena.
    pub fn build(
        graph: &mut PlanarGraph,
        rings: &mut Vec<EdgeRing>,
        start: usize,
        kind: RingKind,
    ) -> Result<usize> {
        let id = rings.len();
        let mut ring = EdgeRing {
            kind,
            start,
            edges: Vec::new(),
            coords: Vec::new(),
            envelope: Envelope::default(),
            label: Label::default(),
            is_hole: false,
            shell: None,
            holes: Vec::new(),
        };

        let mut current = start;
        loop {
            if ring.owner(graph, current) == Some(id) {
                return Err(GeometryError::topology(
                    "directed edge visited twice during ring-building",
                    *graph.directed_edge(current).coordinate(),
                ));
            }

            let de = graph.directed_edge(current);
            if !de.label.is_area() {
                return Err(GeometryError::assertion("ring edge is not an area edge"));
            }

            ring.merge_label(&de.label.clone());
            ring.add_points(graph, current);
            ring.edges.push(current);
            ring.set_owner(graph, current, id);

            current = ring.next(graph, current).ok_or_else(|| {
                GeometryError::topology(
                    "found null directed edge",
                    *graph.directed_edge(current).coordinate(),
                )
            })?;
            if current == start {
                break;
            }
        }

        ring.envelope = Envelope::of_coordinates(&ring.coords);
        ring.is_hole = is_ccw(&ring.coords);
        rings.push(ring);
        Ok(id)
    }

    fn merge_label(&mut self, label: &Label) {
        for geometry in 0..2 {
            let location = label.location(geometry, Position::Right);
            if !location.is_none() && self.label.on_location(geometry).is_none() {
                self.label.set_on_location(geometry, location);
            }
        }
    }

    fn add_points(&mut self, graph: &PlanarGraph, directed_edge: usize) {
        let de = graph.directed_edge(directed_edge);
        let coords = graph.edge(de.edge()).coords();
        let skip = usize::from(!self.coords.is_empty());

        if de.is_forward() {
            self.coords.extend(coords.iter().skip(skip));
        } else {
            self.coords.extend(coords.iter().rev().skip(skip));
        }
    }

    /// Returns the largest number of outgoing edges of this ring at any of its nodes.
    pub fn max_node_degree(&self, graph: &PlanarGraph, id: usize) -> usize {
        self.edges
            .iter()
            .map(|&de| graph.outgoing_degree(graph.directed_edge(de).node(), id))
            .max()
            .unwrap_or_default()
            * 2
    }

    /// Marks every edge of the ring as part of the result.
    pub fn set_in_result(&self, graph: &mut PlanarGraph) {
        for &de in &self.edges {
            let edge = graph.directed_edge(de).edge();
            graph.edge_mut(edge).in_result = true;
        }
    }

    /// Returns true if the point is inside the area this ring bounds, holes excluded.
    pub fn contains_point(&self, rings: &[EdgeRing], p: &Coordinate) -> bool {
        if !self.envelope.covers_point(p) || !locate::is_in_ring(p, &self.coords) {
            return false;
        }

        !self
            .holes
            .iter()
            .any(|&hole| rings[hole].contains_point(rings, p))
    }

    /// Returns the polygon this shell and its holes bound.
    pub fn to_polygon(&self, rings: &[EdgeRing]) -> Result<Polygon> {
        let holes = self
            .holes
            .iter()
            .map(|&hole| LinearRing::new(rings[hole].coords.clone().into()))
            .collect::<Result<Vec<_>>>()?;

        Polygon::new(LinearRing::new(self.coords.clone().into())?, holes)
    }
}

/// Links the minimal rings within a maximal one and builds them.
pub fn build_minimal_rings(
    graph: &mut PlanarGraph,
    rings: &mut Vec<EdgeRing>,
    maximal: usize,
) -> Result<Vec<usize>> {
    let edges = rings[maximal].edges.clone();
    for &de in &edges {
        let node = graph.directed_edge(de).node();
        graph.link_minimal_directed_edges(node, maximal)?;
    }

    let mut minimal = Vec::new();
    for &de in &edges {
        if graph.directed_edge(de).min_edge_ring.is_none() {
            minimal.push(EdgeRing::build(graph, rings, de, RingKind::Minimal)?);
        }
    }

    Ok(minimal)
}
