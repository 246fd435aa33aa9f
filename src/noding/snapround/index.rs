use rand::{SeedableRng, rngs::StdRng, seq::SliceRandom};

use crate::{
    geom::{Coordinate, Envelope, PrecisionModel},
    index::KdTree,
    noding::snapround::HotPixel,
};

/// Seed of the insertion order shuffle, fixed so that results are reproducible.
const SHUFFLE_SEED: u64 = 13;

/// The hot pixels of a snap-rounding run, indexed by their rounded centre.
#[derive(Debug, Clone)]
pub struct HotPixelIndex {
    precision: PrecisionModel,
    scale: f64,
    tree: KdTree<HotPixel>,
}

impl HotPixelIndex {
    pub fn new(precision: PrecisionModel) -> Self {
        Self {
            precision,
            scale: precision.scale(),
            tree: KdTree::new(0.0),
        }
    }

    pub fn len(&self) -> usize {
        self.tree.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    /// Returns the pixel at the given position.
    pub fn pixel(&self, index: usize) -> &HotPixel {
        &self.tree.node(index).data
    }

    pub fn pixel_mut(&mut self, index: usize) -> &mut HotPixel {
        &mut self.tree.node_mut(index).data
    }

    fn round(&self, p: &Coordinate) -> Coordinate {
        self.precision.make_precise_coordinate(p)
    }

    /// Adds the pixel containing the given point, returning its position.
    ///
    /// A pixel added more than once contains several vertices, so it becomes a node.
    pub fn add(&mut self, p: &Coordinate) -> usize {
        let rounded = self.round(p);
        if let Some(index) = self.tree.query_point(&rounded) {
            self.pixel_mut(index).set_to_node();
            return index;
        }

        self.tree
            .insert(rounded, HotPixel::new(rounded, self.scale))
            .node
    }

    /// Adds the pixels of every point.
    ///
    /// Points are inserted in a shuffled order, since the tree is not balanced and input
    /// vertices tend to come sorted along lines.
    pub fn add_all(&mut self, points: &[Coordinate]) {
        let mut order: Vec<usize> = (0..points.len()).collect();
        order.shuffle(&mut StdRng::seed_from_u64(SHUFFLE_SEED));
        for index in order {
            self.add(&points[index]);
        }
    }

    /// Adds the pixels of every point, marking them as nodes.
    pub fn add_nodes(&mut self, points: &[Coordinate]) {
        for p in points {
            let index = self.add(p);
            self.pixel_mut(index).set_to_node();
        }
    }

    /// Returns the positions of the pixels which may intersect the segment `p0`-`p1`.
    pub fn query(&self, p0: &Coordinate, p1: &Coordinate) -> Vec<usize> {
        let mut envelope = Envelope::of_segment(p0, p1);
        envelope.expand_by(1.0 / self.scale);
        self.tree.query(&envelope)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coord;

    #[test]
    fn repeated_pixels_are_nodes() {
        let mut index = HotPixelIndex::new(PrecisionModel::fixed(1.0));
        index.add_all(&[coord!(0.1, 0.1), coord!(2, 2), coord!(-0.2, 0.3)]);
        assert_eq!(index.len(), 2);

        let origin = index.query(&coord!(0, 0), &coord!(0, 0));
        assert_eq!(origin.len(), 1);
        assert!(index.pixel(origin[0]).is_node());
        assert_eq!(*index.pixel(origin[0]).coordinate(), coord!(0, 0));

        let far = index.query(&coord!(2, 2), &coord!(2, 2));
        assert!(!index.pixel(far[0]).is_node());
    }
}
