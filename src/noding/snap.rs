//! Noding with snapping: vertices and intersections closer than a tolerance are merged
//! into a single point.

use tracing::trace;

use crate::{
    algorithm::{LineIntersector, distance},
    error::Result,
    geom::Coordinate,
    index::KdTree,
    interrupt,
    noding::{MCIndexNoder, NodedSegmentString, Noder, SegmentIntersector},
};

/// Divides the number of vertices of a string to get how many of them seed the index.
const SEED_SIZE_FACTOR: usize = 100;

/// The golden ratio conjugate, step of the quasi-random seed sequence.
const PHI_INV: f64 = 0.618_033_988_749_894_8;

/// Snaps points to the first indexed point within a tolerance, indexing them otherwise.
#[derive(Debug, Clone)]
pub struct SnappingPointIndex {
    tolerance: f64,
    tree: KdTree<()>,
}

impl SnappingPointIndex {
    pub fn new(tolerance: f64) -> Self {
        Self {
            tolerance,
            tree: KdTree::new(tolerance),
        }
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// Returns the indexed point the given one snaps to, which may be itself.
    pub fn snap(&mut self, p: &Coordinate) -> Coordinate {
        let inserted = self.tree.insert(*p, ());
        *self.tree.node(inserted.node).coordinate()
    }

    pub fn len(&self) -> usize {
        self.tree.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }
}

/// Records intersections snapped to a shared point index, and nodes vertices lying
/// within the snap tolerance of another segment.
#[derive(Debug)]
pub struct SnappingIntersectionAdder<'a> {
    li: LineIntersector,
    tolerance: f64,
    index: &'a mut SnappingPointIndex,
}

impl<'a> SnappingIntersectionAdder<'a> {
    pub fn new(tolerance: f64, index: &'a mut SnappingPointIndex) -> Self {
        Self {
            li: LineIntersector::new(),
            tolerance,
            index,
        }
    }

    /// Nodes both strings at a vertex of the first one if it lies near the segment
    /// `p0`-`p1` of the second, but not near either end point.
    #[allow(clippy::too_many_arguments)]
    fn process_near_vertex<D>(
        &self,
        strings: &mut [NodedSegmentString<D>],
        source: usize,
        source_segment: usize,
        p: &Coordinate,
        target: usize,
        target_segment: usize,
        p0: &Coordinate,
        p1: &Coordinate,
    ) -> Result<()> {
        if p.distance(p0) < self.tolerance || p.distance(p1) < self.tolerance {
            return Ok(());
        }

        if distance::point_to_segment(p, p0, p1) < self.tolerance {
            strings[target].add_intersection(*p, target_segment)?;
            strings[source].add_intersection(*p, source_segment)?;
        }

        Ok(())
    }
}

impl<D> SegmentIntersector<D> for SnappingIntersectionAdder<'_> {
    fn process_intersections(
        &mut self,
        strings: &mut [NodedSegmentString<D>],
        string0: usize,
        segment0: usize,
        string1: usize,
        segment1: usize,
    ) -> Result<()> {
        if string0 == string1 && segment0 == segment1 {
            return Ok(());
        }

        let (p00, p01) = strings[string0].segment(segment0);
        let (p10, p11) = strings[string1].segment(segment1);

        let is_adjacent = string0 == string1 && strings[string0].is_adjacent(segment0, segment1);
        if !is_adjacent {
            self.li.compute_intersection(&p00, &p01, &p10, &p11);
            if self.li.has_intersection() && self.li.intersection_num() == 1 {
                let snapped = self.index.snap(&self.li.intersection_at(0));
                strings[string0].add_intersection(snapped, segment0)?;
                strings[string1].add_intersection(snapped, segment1)?;
            }
        }

        self.process_near_vertex(strings, string0, segment0, &p00, string1, segment1, &p10, &p11)?;
        self.process_near_vertex(strings, string0, segment0, &p01, string1, segment1, &p10, &p11)?;
        self.process_near_vertex(strings, string1, segment1, &p10, string0, segment0, &p00, &p01)?;
        self.process_near_vertex(strings, string1, segment1, &p11, string0, segment0, &p00, &p01)
    }
}

/// Nodes segment strings after snapping every vertex to vertices within a tolerance.
///
/// Intersections are snapped to the same index, so nearly coincident nodes merge. The
/// output is not guaranteed to be fully noded; wrap it in a validating noder when that
/// matters.
#[derive(Debug, Clone)]
pub struct SnappingNoder {
    tolerance: f64,
}

impl SnappingNoder {
    pub fn new(tolerance: f64) -> Self {
        Self { tolerance }
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// Loads a spread sample of the vertices of every string first, so that the index
    /// tree does not degenerate on vertices sorted along lines.
    fn seed<D>(index: &mut SnappingPointIndex, strings: &[NodedSegmentString<D>]) {
        for string in strings {
            let coords = string.coords();
            let mut position = 0.0;
            for _ in 0..coords.len() / SEED_SIZE_FACTOR {
                let at = (coords.len() as f64 * position) as usize;
                index.snap(&coords[at.min(coords.len() - 1)]);
                position = (position + PHI_INV).fract();
            }
        }
    }

    fn snap_vertices<D>(
        index: &mut SnappingPointIndex,
        strings: Vec<NodedSegmentString<D>>,
    ) -> Vec<NodedSegmentString<D>> {
        Self::seed(index, &strings);

        strings
            .into_iter()
            .map(|string| {
                let mut coords: Vec<Coordinate> = Vec::with_capacity(string.len());
                for p in string.coords() {
                    let snapped = index.snap(p);
                    if coords.last().is_none_or(|last| !last.equals_2d(&snapped)) {
                        coords.push(snapped);
                    }
                }
                NodedSegmentString::new(coords, string.into_data())
            })
            .collect()
    }
}

impl<D> Noder<D> for SnappingNoder
where
    D: Clone,
{
    fn compute_nodes(&mut self, strings: Vec<NodedSegmentString<D>>) -> Result<Vec<NodedSegmentString<D>>> {
        interrupt::check()?;

        let mut index = SnappingPointIndex::new(self.tolerance);
        let mut snapped: Vec<NodedSegmentString<D>> = Self::snap_vertices(&mut index, strings)
            .into_iter()
            .filter(|string| string.len() >= 2)
            .collect();

        let adder = SnappingIntersectionAdder::new(self.tolerance, &mut index);
        MCIndexNoder::new(adder)
            .with_overlap_tolerance(2.0 * self.tolerance)
            .compute_intersections(&mut snapped)?;

        trace!(
            tolerance = self.tolerance,
            points = index.len(),
            "snapped vertices and intersections"
        );
        Ok(snapped
            .into_iter()
            .flat_map(NodedSegmentString::into_substrings)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coord;

    #[test]
    fn point_index_snaps_within_tolerance() {
        let mut index = SnappingPointIndex::new(0.1);
        assert_eq!(index.snap(&coord!(1, 1)), coord!(1, 1));
        assert_eq!(index.snap(&coord!(1.05, 1)), coord!(1, 1));
        assert_eq!(index.snap(&coord!(1.2, 1)), coord!(1.2, 1));
    }

    #[test]
    fn merges_nearly_coincident_vertices() {
        let strings = vec![
            NodedSegmentString::new(vec![coord!(0, 0), coord!(10, 0)], 0),
            NodedSegmentString::new(vec![coord!(5, 5), coord!(5, 0.0001)], 1),
        ];

        let noded = SnappingNoder::new(0.001).compute_nodes(strings).unwrap();
        let first: Vec<Vec<Coordinate>> = noded
            .iter()
            .filter(|s| *s.data() == 0)
            .map(|s| s.coords().to_vec())
            .collect();
        assert_eq!(
            first,
            vec![vec![coord!(0, 0), coord!(5, 0.0001)], vec![coord!(5, 0.0001), coord!(10, 0)]]
        );
    }
}
