use crate::geomgraph::{Edge, EdgeEnd, EdgeIntersection, Label};

/// The end of a noded edge at one of its nodes, labelled as seen leaving that node.
#[derive(Debug, Clone, Copy)]
pub(crate) struct LabelledEnd {
    pub end: EdgeEnd,
    pub label: Label,
    /// The index of the edge the end belongs to.
    pub edge: usize,
}

/// Returns the ends of the given edges at each of their intersection nodes.
///
/// Every node inside an edge yields two ends, one towards the previous node and one
/// towards the next; the edge end points yield one each.
pub(crate) fn compute_edge_ends(edges: &[Edge]) -> Vec<LabelledEnd> {
    let mut ends = Vec::new();
    for (index, edge) in edges.iter().enumerate() {
        let nodes = edge.nodes();
        for (position, current) in nodes.iter().enumerate() {
            let previous = position.checked_sub(1).map(|p| &nodes[p]);
            let next = nodes.get(position + 1);

            ends.extend(end_to_previous(edge, index, current, previous));
            ends.extend(end_to_next(edge, index, current, next));
        }
    }
    ends
}

fn end_to_previous(
    edge: &Edge,
    index: usize,
    current: &EdgeIntersection,
    previous: Option<&EdgeIntersection>,
) -> Option<LabelledEnd> {
    let mut segment = current.segment_index;
    if current.distance == 0.0 {
        // the node is a vertex: the previous point is the start of the previous segment
        segment = segment.checked_sub(1)?;
    }

    let towards = match previous {
        Some(previous) if previous.segment_index >= segment => previous.coord,
        _ => *edge.coordinate(segment),
    };

    Some(LabelledEnd {
        end: EdgeEnd::new(current.coord, towards),
        label: edge.label.flipped(),
        edge: index,
    })
}

fn end_to_next(
    edge: &Edge,
    index: usize,
    current: &EdgeIntersection,
    next: Option<&EdgeIntersection>,
) -> Option<LabelledEnd> {
    let segment = current.segment_index + 1;
    if segment >= edge.len() && next.is_none() {
        return None;
    }

    let towards = match next {
        Some(next) if next.segment_index == current.segment_index => next.coord,
        _ => *edge.coordinate(segment),
    };

    Some(LabelledEnd {
        end: EdgeEnd::new(current.coord, towards),
        label: edge.label,
        edge: index,
    })
}
