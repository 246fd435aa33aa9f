use std::collections::{BTreeSet, VecDeque};

use crate::{
    algorithm::Orientation,
    error::{GeometryError, Result},
    geom::{Coordinate, Envelope, Position},
    geomgraph::{PlanarGraph, sym},
};

/// A connected component of the buffer graph.
///
/// Subgraphs are processed from right to left, so the depth of the outside of each one can
/// be found from the subgraphs already processed.
#[derive(Debug, Clone)]
pub(super) struct BufferSubgraph {
    directed_edges: Vec<usize>,
    nodes: Vec<usize>,
    rightmost: RightmostEdge,
    envelope: Envelope,
}

impl BufferSubgraph {
    /// Collects the subgraph reachable from the given node, marking its nodes as visited.
    pub fn create(graph: &mut PlanarGraph, start: usize) -> Result<Self> {
        let mut directed_edges = Vec::new();
        let mut nodes = Vec::new();

        let mut pending = vec![start];
        while let Some(node) = pending.pop() {
            if graph.node(node).visited {
                continue;
            }

            graph.node_mut(node).visited = true;
            nodes.push(node);
            for &de in graph.node(node).star() {
                directed_edges.push(de);
                let other = graph.directed_edge(sym(de)).node();
                if !graph.node(other).visited {
                    pending.push(other);
                }
            }
        }

        let rightmost = RightmostEdge::find(graph, &directed_edges)?;
        let envelope = directed_edges
            .iter()
            .flat_map(|&de| graph.edge(graph.directed_edge(de).edge()).coords())
            .fold(Envelope::default(), |mut envelope, coord| {
                envelope.expand_to_include(coord);
                envelope
            });

        Ok(Self {
            directed_edges,
            nodes,
            rightmost,
            envelope,
        })
    }

    pub fn directed_edges(&self) -> &[usize] {
        &self.directed_edges
    }

    pub fn nodes(&self) -> &[usize] {
        &self.nodes
    }

    pub fn envelope(&self) -> &Envelope {
        &self.envelope
    }

    /// The right-most coordinate of the subgraph.
    pub fn rightmost_coordinate(&self) -> Coordinate {
        self.rightmost.coord
    }

    /// Assigns the depths of every directed edge, given the depth outside the subgraph.
    pub fn compute_depth(&self, graph: &mut PlanarGraph, outside: i32) -> Result<()> {
        for &de in &self.directed_edges {
            graph.directed_edge_mut(de).visited = false;
        }

        let start = self.rightmost.directed_edge;
        graph.set_edge_depths(start, Position::Right, outside)?;
        graph.copy_sym_depths(start)?;
        self.compute_depths(graph, start)
    }

    /// Visits the nodes breadth first, propagating depths around each star from an edge
    /// whose depths are known.
    fn compute_depths(&self, graph: &mut PlanarGraph, start: usize) -> Result<()> {
        let start_node = graph.directed_edge(start).node();
        let mut visited = BTreeSet::from([start_node]);
        let mut queue = VecDeque::from([start_node]);
        graph.directed_edge_mut(start).visited = true;

        while let Some(node) = queue.pop_front() {
            compute_node_depth(graph, node)?;

            for &de in graph.node(node).star() {
                let sym = graph.directed_edge(sym(de));
                if sym.visited {
                    continue;
                }

                let adjacent = sym.node();
                if visited.insert(adjacent) {
                    queue.push_back(adjacent);
                }
            }
        }

        Ok(())
    }

    /// Marks as part of the result the directed edges with the buffer interior on their
    /// right and its exterior on their left.
    pub fn find_result_edges(&self, graph: &mut PlanarGraph) {
        for &de in &self.directed_edges {
            let directed = graph.directed_edge_mut(de);
            if directed.depth(Position::Right) >= 1
                && directed.depth(Position::Left) <= 0
                && !directed.is_interior_area_edge()
            {
                directed.in_result = true;
            }
        }
    }
}

fn compute_node_depth(graph: &mut PlanarGraph, node: usize) -> Result<()> {
    let star = graph.node(node).star().to_vec();
    let start = star
        .iter()
        .copied()
        .find(|&de| graph.directed_edge(de).visited || graph.directed_edge(sym(de)).visited)
        .ok_or_else(|| {
            GeometryError::topology(
                "unable to find edge to compute depths",
                *graph.node(node).coordinate(),
            )
        })?;

    graph.compute_depths(start)?;
    for de in star {
        graph.directed_edge_mut(de).visited = true;
        graph.copy_sym_depths(de)?;
    }

    Ok(())
}

/// The directed edge of a subgraph having the right-most coordinate, oriented so that the
/// exterior of the subgraph lies on its right.
#[derive(Debug, Clone, Copy)]
struct RightmostEdge {
    directed_edge: usize,
    coord: Coordinate,
}

impl RightmostEdge {
    fn find(graph: &PlanarGraph, directed_edges: &[usize]) -> Result<Self> {
        let mut finder = RightmostFinder {
            graph,
            directed_edge: None,
            index: 0,
            coord: None,
        };

        directed_edges
            .iter()
            .copied()
            .filter(|&de| graph.directed_edge(de).is_forward())
            .for_each(|de| finder.check_coordinates(de));

        let (Some(mut directed_edge), Some(coord)) = (finder.directed_edge, finder.coord) else {
            return Err(GeometryError::assertion("subgraph has no forward edges"));
        };

        if finder.index == 0 {
            if coord != *graph.directed_edge(directed_edge).coordinate() {
                return Err(GeometryError::assertion("inconsistency in rightmost processing"));
            }
            finder.at_node()?;
        } else {
            finder.at_vertex();
        }

        let rightmost = finder.directed_edge.unwrap_or(directed_edge);
        directed_edge = match finder.rightmost_side(rightmost) {
            Some(Position::Left) => sym(rightmost),
            _ => rightmost,
        };

        Ok(Self {
            directed_edge,
            coord: finder.coord.unwrap_or(coord),
        })
    }
}

struct RightmostFinder<'a> {
    graph: &'a PlanarGraph,
    directed_edge: Option<usize>,
    index: usize,
    coord: Option<Coordinate>,
}

impl<'a> RightmostFinder<'a> {
    fn coords(&self, directed_edge: usize) -> &'a [Coordinate] {
        let graph = self.graph;
        graph.edge(graph.directed_edge(directed_edge).edge()).coords()
    }

    fn check_coordinates(&mut self, directed_edge: usize) {
        let coords = self.coords(directed_edge);
        for (index, coord) in coords[..coords.len() - 1].iter().enumerate() {
            if self.coord.is_none_or(|min| coord.x > min.x) {
                self.directed_edge = Some(directed_edge);
                self.index = index;
                self.coord = Some(*coord);
            }
        }
    }

    /// The right-most point is a node: picks the right-most edge of its star.
    fn at_node(&mut self) -> Result<()> {
        let Some(current) = self.directed_edge else {
            return Ok(());
        };

        let node = self.graph.directed_edge(current).node();
        let Some(rightmost) = self.graph.rightmost_edge(node)? else {
            return Ok(());
        };

        if self.graph.directed_edge(rightmost).is_forward() {
            self.directed_edge = Some(rightmost);
        } else {
            let forward = sym(rightmost);
            self.directed_edge = Some(forward);
            self.index = self.coords(forward).len() - 1;
        }

        Ok(())
    }

    /// The right-most point is inside an edge: picks the segment that is not horizontal
    /// towards it.
    fn at_vertex(&mut self) {
        let (Some(current), Some(coord)) = (self.directed_edge, self.coord) else {
            return;
        };

        let coords = self.coords(current);
        let previous = coords[self.index - 1];
        let next = coords[self.index + 1];
        let orientation = Orientation::of(&coord, &next, &previous);

        let use_previous = (previous.y < coord.y
            && next.y < coord.y
            && orientation == Orientation::COUNTER_CLOCKWISE)
            || (previous.y > coord.y && next.y > coord.y && orientation == Orientation::CLOCKWISE);
        if use_previous {
            self.index -= 1;
        }
    }

    fn rightmost_side(&mut self, directed_edge: usize) -> Option<Position> {
        let side = self.rightmost_side_of_segment(directed_edge, Some(self.index)).or_else(|| {
            self.rightmost_side_of_segment(directed_edge, self.index.checked_sub(1))
        });

        if side.is_none() {
            // both segments are horizontal: rescan the edge for its right-most coordinate
            self.coord = None;
            self.check_coordinates(directed_edge);
        }
        side
    }

    fn rightmost_side_of_segment(&self, directed_edge: usize, index: Option<usize>) -> Option<Position> {
        let index = index?;
        let coords = self.coords(directed_edge);
        if index + 1 >= coords.len() || coords[index].y == coords[index + 1].y {
            return None;
        }

        Some(match coords[index].y < coords[index + 1].y {
            true => Position::Right,
            false => Position::Left,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        coord,
        geom::Location,
        geomgraph::{Edge, Label},
    };

    fn square_graph(size: f64, ccw: bool) -> PlanarGraph {
        let mut coords = vec![
            coord!(0, 0),
            coord!(0, size),
            coord!(size, size),
            coord!(size, 0),
            coord!(0, 0),
        ];
        let mut label = Label::area(0, Location::Boundary, Location::Exterior, Location::Interior);
        if ccw {
            coords.reverse();
            label.flip();
        }

        let mut edge = Edge::new(coords, label);
        edge.depth_delta = if ccw { 1 } else { -1 };

        let mut graph = PlanarGraph::new();
        graph.add_node(coord!(0, 0));
        graph.add_edges([edge]);
        graph
    }

    #[test]
    fn rightmost_edge_has_exterior_on_the_right() {
        [false, true].into_iter().for_each(|ccw| {
            let mut graph = square_graph(10., ccw);
            let subgraph = BufferSubgraph::create(&mut graph, 0).unwrap();

            assert_eq!(subgraph.rightmost_coordinate().x, 10.);
            assert_eq!(subgraph.directed_edges().len(), 2);
            assert_eq!(subgraph.nodes(), &[0]);

            subgraph.compute_depth(&mut graph, 0).unwrap();
            subgraph.find_result_edges(&mut graph);

            let in_result: Vec<usize> = (0..2)
                .filter(|&de| graph.directed_edge(de).in_result)
                .collect();
            assert_eq!(in_result.len(), 1, "ccw: {ccw}");

            let de = graph.directed_edge(in_result[0]);
            assert_eq!(de.depth(Position::Right), 1, "ccw: {ccw}");
            assert_eq!(de.depth(Position::Left), 0, "ccw: {ccw}");
        });
    }
}
