//! Monotone chains: maximal runs of segments whose direction stays in one quadrant.
//!
//! Segments in a monotone chain cannot intersect each other, and the envelope of any
//! sub-range is given by its two end points, which allows binary subdivision when testing
//! two chains for overlap.

use crate::{
    algorithm::angle::quadrant,
    geom::{Coordinate, Envelope},
};

/// A monotone run of segments over the coordinates of some segment string.
///
/// The chain does not own its coordinates: every operation takes the slice the chain was
/// computed from.
#[derive(Debug, Clone, PartialEq)]
pub struct MonotoneChain {
    start: usize,
    end: usize,
    envelope: Envelope,
    /// The position of the owning segment string.
    pub context: usize,
}

impl MonotoneChain {
    fn new(coords: &[Coordinate], start: usize, end: usize, context: usize) -> Self {
        Self {
            start,
            end,
            envelope: Envelope::of_segment(&coords[start], &coords[end]),
            context,
        }
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn end(&self) -> usize {
        self.end
    }

    pub fn envelope(&self) -> &Envelope {
        &self.envelope
    }

    /// Returns the envelope of the chain expanded by the given distance.
    pub fn envelope_expanded(&self, distance: f64) -> Envelope {
        let mut envelope = self.envelope;
        if distance > 0.0 {
            envelope.expand_by(distance);
        }
        envelope
    }

    /// Reports the start index of every segment of this chain whose envelope intersects
    /// the search envelope.
    pub fn select(&self, coords: &[Coordinate], search: &Envelope, mut f: impl FnMut(usize)) {
        self.select_range(coords, search, self.start, self.end, &mut f);
    }

    fn select_range(
        &self,
        coords: &[Coordinate],
        search: &Envelope,
        start: usize,
        end: usize,
        f: &mut impl FnMut(usize),
    ) {
        if !search.intersects_segment(&coords[start], &coords[end]) {
            return;
        }
        if end - start == 1 {
            f(start);
            return;
        }

        let mid = (start + end) / 2;
        if start < mid {
            self.select_range(coords, search, start, mid, f);
        }
        if mid < end {
            self.select_range(coords, search, mid, end, f);
        }
    }

    /// Reports every pair of segment start indexes, one from each chain, whose envelopes
    /// overlap within the given tolerance.
    pub fn compute_overlaps(
        &self,
        coords: &[Coordinate],
        other: &MonotoneChain,
        other_coords: &[Coordinate],
        tolerance: f64,
        mut f: impl FnMut(usize, usize),
    ) {
        self.overlap_ranges(
            coords,
            self.start,
            self.end,
            other,
            other_coords,
            other.start,
            other.end,
            tolerance,
            &mut f,
        );
    }

    #[allow(clippy::too_many_arguments)]
    fn overlap_ranges(
        &self,
        coords: &[Coordinate],
        start0: usize,
        end0: usize,
        other: &MonotoneChain,
        other_coords: &[Coordinate],
        start1: usize,
        end1: usize,
        tolerance: f64,
        f: &mut impl FnMut(usize, usize),
    ) {
        let mut env0 = Envelope::of_segment(&coords[start0], &coords[end0]);
        let mut env1 = Envelope::of_segment(&other_coords[start1], &other_coords[end1]);
        if tolerance > 0.0 {
            env0.expand_by(tolerance);
            env1.expand_by(tolerance);
        }
        if !env0.intersects(&env1) {
            return;
        }

        if end0 - start0 == 1 && end1 - start1 == 1 {
            f(start0, start1);
            return;
        }

        let mid0 = (start0 + end0) / 2;
        let mid1 = (start1 + end1) / 2;
        let halves0 = [(start0, mid0), (mid0, end0)];
        let halves1 = [(start1, mid1), (mid1, end1)];

        for (s0, e0) in halves0 {
            if s0 >= e0 {
                continue;
            }
            for (s1, e1) in halves1 {
                if s1 < e1 {
                    self.overlap_ranges(
                        coords,
                        s0,
                        e0,
                        other,
                        other_coords,
                        s1,
                        e1,
                        tolerance,
                        f,
                    );
                }
            }
        }
    }
}

/// Splits the coordinates into monotone chains, in order.
pub fn chains(coords: &[Coordinate], context: usize) -> Vec<MonotoneChain> {
    let mut chains = Vec::new();
    if coords.len() < 2 {
        return chains;
    }

    let mut start = 0;
    while start < coords.len() - 1 {
        let end = chain_end(coords, start);
        chains.push(MonotoneChain::new(coords, start, end, context));
        start = end;
    }

    chains
}

/// Returns the index of the last coordinate in the chain starting at the given index.
fn chain_end(coords: &[Coordinate], start: usize) -> usize {
    let mut safe_start = start;
    // skip any zero-length segments at the start
    while safe_start < coords.len() - 1 && coords[safe_start].equals_2d(&coords[safe_start + 1]) {
        safe_start += 1;
    }
    if safe_start >= coords.len() - 1 {
        return coords.len() - 1;
    }

    let chain_quad = quadrant::of_unchecked(
        coords[safe_start + 1].x - coords[safe_start].x,
        coords[safe_start + 1].y - coords[safe_start].y,
    );

    let mut last = start + 1;
    while last < coords.len() {
        if !coords[last - 1].equals_2d(&coords[last]) {
            let quad = quadrant::of_unchecked(
                coords[last].x - coords[last - 1].x,
                coords[last].y - coords[last - 1].y,
            );
            if quad != chain_quad {
                break;
            }
        }
        last += 1;
    }

    last - 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coord;

    #[test]
    fn splits_by_quadrant() {
        let coords = [
            coord!(0, 0),
            coord!(1, 1),
            coord!(2, 3),
            coord!(3, 2),
            coord!(4, 0),
            coord!(4, 0),
            coord!(5, 1),
        ];
        let found: Vec<(usize, usize)> = chains(&coords, 0)
            .iter()
            .map(|chain| (chain.start(), chain.end()))
            .collect();
        assert_eq!(found, vec![(0, 2), (2, 5), (5, 6)]);
    }

    #[test]
    fn overlapping_chains() {
        let a = [coord!(0, 0), coord!(1, 1), coord!(2, 2), coord!(3, 3)];
        let b = [coord!(0, 3), coord!(1, 2), coord!(2, 1), coord!(3, 0)];
        let (chain_a, chain_b) = (&chains(&a, 0)[0], &chains(&b, 1)[0]);

        let mut pairs = Vec::new();
        chain_a.compute_overlaps(&a, chain_b, &b, 0.0, |i, j| pairs.push((i, j)));
        assert!(pairs.contains(&(1, 1)));
        assert!(!pairs.contains(&(0, 0)));
    }

    #[test]
    fn select_segments() {
        let coords = [coord!(0, 0), coord!(1, 1), coord!(2, 2), coord!(3, 3)];
        let chain = &chains(&coords, 0)[0];
        let mut found = Vec::new();
        chain.select(&coords, &Envelope::new(1.5, 1.6, 1.5, 1.6), |i| found.push(i));
        assert_eq!(found, vec![1]);
    }
}
