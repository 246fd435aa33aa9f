use tracing::trace;

use crate::{
    error::Result,
    index::{StrTree, chain},
    interrupt,
    noding::{NodedSegmentString, Noder, SegmentIntersector},
};

/// Nodes segment strings by indexing their monotone chains in an STR-tree and testing
/// every pair of overlapping chains.
#[derive(Debug, Clone)]
pub struct MCIndexNoder<I> {
    intersector: I,
    overlap_tolerance: f64,
}

impl<I> MCIndexNoder<I> {
    pub fn new(intersector: I) -> Self {
        Self {
            intersector,
            overlap_tolerance: 0.0,
        }
    }

    /// Tests chains whose envelopes are within the given distance of each other too.
    pub fn with_overlap_tolerance(mut self, tolerance: f64) -> Self {
        self.overlap_tolerance = tolerance;
        self
    }

    pub fn intersector(&self) -> &I {
        &self.intersector
    }

    pub fn intersector_mut(&mut self) -> &mut I {
        &mut self.intersector
    }

    pub fn into_intersector(self) -> I {
        self.intersector
    }

    /// Passes every pair of potentially intersecting segments to the intersector, without
    /// splitting the strings.
    pub fn compute_intersections<D>(&mut self, strings: &mut [NodedSegmentString<D>]) -> Result<()>
    where
        I: SegmentIntersector<D>,
    {
        let chains: Vec<chain::MonotoneChain> = strings
            .iter()
            .enumerate()
            .flat_map(|(context, string)| chain::chains(string.coords(), context))
            .collect();

        let mut index = StrTree::new();
        for (id, chain) in chains.iter().enumerate() {
            index.insert(chain.envelope_expanded(self.overlap_tolerance), id)?;
        }
        index.build();

        let tolerance = self.overlap_tolerance;
        let mut pairs = Vec::new();
        let mut overlaps = 0;
        for (id, chain) in chains.iter().enumerate() {
            interrupt::check()?;

            let query = chain.envelope_expanded(tolerance);
            index.query_visit(&query, |&other_id| {
                // every pair of chains is tested once
                if other_id <= id {
                    return;
                }
                let other = &chains[other_id];
                chain.compute_overlaps(
                    strings[chain.context].coords(),
                    other,
                    strings[other.context].coords(),
                    tolerance,
                    |segment0, segment1| pairs.push((other.context, segment0, segment1)),
                );
            });

            overlaps += pairs.len();
            for (other_context, segment0, segment1) in pairs.drain(..) {
                self.intersector.process_intersections(
                    strings,
                    chain.context,
                    segment0,
                    other_context,
                    segment1,
                )?;
                if self.intersector.is_done() {
                    return Ok(());
                }
            }
        }

        trace!(
            strings = strings.len(),
            chains = chains.len(),
            overlaps,
            "computed monotone chain overlaps"
        );
        Ok(())
    }
}

impl<D, I> Noder<D> for MCIndexNoder<I>
where
    D: Clone,
    I: SegmentIntersector<D>,
{
    fn compute_nodes(
        &mut self,
        mut strings: Vec<NodedSegmentString<D>>,
    ) -> Result<Vec<NodedSegmentString<D>>> {
        self.compute_intersections(&mut strings)?;
        Ok(strings
            .into_iter()
            .flat_map(NodedSegmentString::into_substrings)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{coord, geom::Coordinate, noding::IntersectionAdder};

    #[test]
    fn nodes_crossing_strings() {
        let strings = vec![
            NodedSegmentString::new(vec![coord!(0, 0), coord!(10, 10)], 'a'),
            NodedSegmentString::new(vec![coord!(0, 10), coord!(10, 0)], 'b'),
            NodedSegmentString::new(vec![coord!(20, 20), coord!(30, 20)], 'c'),
        ];

        let mut noder = MCIndexNoder::new(IntersectionAdder::default());
        let noded = noder.compute_nodes(strings).unwrap();
        assert_eq!(noded.len(), 5);

        let pieces_of = |tag: char| -> Vec<Vec<Coordinate>> {
            noded
                .iter()
                .filter(|string| *string.data() == tag)
                .map(|string| string.coords().to_vec())
                .collect()
        };
        assert_eq!(
            pieces_of('a'),
            vec![vec![coord!(0, 0), coord!(5, 5)], vec![coord!(5, 5), coord!(10, 10)]]
        );
        assert_eq!(pieces_of('c'), vec![vec![coord!(20, 20), coord!(30, 20)]]);
        assert!(noder.intersector().has_proper_intersection());
    }

    #[test]
    fn nodes_self_intersection() {
        let strings = vec![NodedSegmentString::new(
            vec![coord!(0, 0), coord!(4, 4), coord!(4, 0), coord!(0, 4)],
            (),
        )];

        let noded = MCIndexNoder::new(IntersectionAdder::default())
            .compute_nodes(strings)
            .unwrap();
        // split at the crossing only: the middle piece is a closed loop
        assert_eq!(noded.len(), 3);
        assert!(noded.iter().any(|string| string.coords().contains(&coord!(2, 2))));
    }
}
