use crate::{
    algorithm::LineIntersector,
    error::{GeometryError, Result},
    geom::{Coordinate, wkt},
    noding::{MCIndexNoder, NodedSegmentString, Noder, SegmentIntersector},
};

/// Finds the first pair of segments which are not correctly noded: crossing or touching
/// in the interior of one of them, or sharing a vertex which is not an end point of both
/// strings.
#[derive(Debug, Default, Clone)]
pub struct NodingIntersectionFinder {
    li: LineIntersector,
    found: Option<(Coordinate, [Coordinate; 4])>,
    interior_only: bool,
}

impl NodingIntersectionFinder {
    /// Returns a finder reporting only intersections in the interior of some segment.
    pub fn interior_only() -> Self {
        Self {
            interior_only: true,
            ..Default::default()
        }
    }

    pub fn has_intersection(&self) -> bool {
        self.found.is_some()
    }

    /// Returns the intersection point found, if any.
    pub fn intersection(&self) -> Option<Coordinate> {
        self.found.map(|(p, _)| p)
    }

    /// Returns the segments of the intersection found, if any.
    pub fn segments(&self) -> Option<[Coordinate; 4]> {
        self.found.map(|(_, segments)| segments)
    }
}

/// Returns the shared vertex of two segments, unless it is an end point of both strings.
fn interior_vertex_intersection(
    ends0: [(Coordinate, bool); 2],
    ends1: [(Coordinate, bool); 2],
) -> Option<Coordinate> {
    ends0.iter().find_map(|(p0, is_end0)| {
        ends1.iter().find_map(|(p1, is_end1)| {
            (!(*is_end0 && *is_end1) && p0.equals_2d(p1)).then_some(*p0)
        })
    })
}

impl<D> SegmentIntersector<D> for NodingIntersectionFinder {
    fn process_intersections(
        &mut self,
        strings: &mut [NodedSegmentString<D>],
        string0: usize,
        segment0: usize,
        string1: usize,
        segment1: usize,
    ) -> Result<()> {
        if self.found.is_some() || (string0 == string1 && segment0 == segment1) {
            return Ok(());
        }

        let (p00, p01) = strings[string0].segment(segment0);
        let (p10, p11) = strings[string1].segment(segment1);
        self.li.compute_intersection(&p00, &p01, &p10, &p11);

        let segments = [p00, p01, p10, p11];
        if self.li.has_intersection() && self.li.is_interior_intersection() {
            self.found = Some((self.li.intersection_at(0), segments));
            return Ok(());
        }

        if self.interior_only {
            return Ok(());
        }

        let is_adjacent_segment = string0 == string1 && segment0.abs_diff(segment1) <= 1;
        if is_adjacent_segment {
            return Ok(());
        }

        let (len0, len1) = (strings[string0].len(), strings[string1].len());
        let ends0 = [(p00, segment0 == 0), (p01, segment0 + 2 == len0)];
        let ends1 = [(p10, segment1 == 0), (p11, segment1 + 2 == len1)];
        if let Some(p) = interior_vertex_intersection(ends0, ends1) {
            self.found = Some((p, segments));
        }

        Ok(())
    }

    fn is_done(&self) -> bool {
        self.found.is_some()
    }
}

/// Checks that a set of segment strings is fully noded.
#[derive(Debug, Default, Clone, Copy)]
pub struct FastNodingValidator;

impl FastNodingValidator {
    /// Fails with a topology error at the first non-noded intersection found.
    pub fn check_valid<D>(strings: &mut [NodedSegmentString<D>]) -> Result<()> {
        let mut noder = MCIndexNoder::new(NodingIntersectionFinder::default());
        noder.compute_intersections(strings)?;

        let finder = noder.intersector();
        match (finder.intersection(), finder.segments()) {
            (Some(p), Some([p00, p01, p10, p11])) => Err(GeometryError::topology(
                format!(
                    "found non-noded intersection between {} and {}",
                    wkt::segment(&p00, &p01),
                    wkt::segment(&p10, &p11)
                ),
                p,
            )),
            _ => Ok(()),
        }
    }

    /// Returns true if the strings are fully noded.
    pub fn is_valid<D>(strings: &mut [NodedSegmentString<D>]) -> bool {
        Self::check_valid(strings).is_ok()
    }
}

/// Wraps a noder, checking its output is fully noded.
#[derive(Debug, Clone)]
pub struct ValidatingNoder<N> {
    noder: N,
}

impl<N> ValidatingNoder<N> {
    pub fn new(noder: N) -> Self {
        Self { noder }
    }
}

impl<D, N> Noder<D> for ValidatingNoder<N>
where
    N: Noder<D>,
{
    fn compute_nodes(&mut self, strings: Vec<NodedSegmentString<D>>) -> Result<Vec<NodedSegmentString<D>>> {
        let mut noded = self.noder.compute_nodes(strings)?;
        FastNodingValidator::check_valid(&mut noded)?;
        Ok(noded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        coord,
        noding::{IntersectionAdder, MCIndexNoder},
    };

    fn crossing() -> Vec<NodedSegmentString<()>> {
        vec![
            NodedSegmentString::new(vec![coord!(0, 0), coord!(2, 2)], ()),
            NodedSegmentString::new(vec![coord!(0, 2), coord!(2, 0)], ()),
        ]
    }

    #[test]
    fn detects_crossing() {
        let error = FastNodingValidator::check_valid(&mut crossing()).unwrap_err();
        assert!(error.is_topology());
        assert_eq!(error.coordinate(), Some(coord!(1, 1)));
    }

    #[test]
    fn detects_shared_interior_vertex() {
        let mut strings = vec![
            NodedSegmentString::new(vec![coord!(0, 0), coord!(1, 1), coord!(2, 0)], ()),
            NodedSegmentString::new(vec![coord!(1, 1), coord!(1, 3)], ()),
        ];
        assert!(!FastNodingValidator::is_valid(&mut strings));
    }

    #[test]
    fn accepts_noded_output() {
        let mut noder = ValidatingNoder::new(MCIndexNoder::new(IntersectionAdder::default()));
        let noded = noder.compute_nodes(crossing()).unwrap();
        assert_eq!(noded.len(), 4);

        let ring = NodedSegmentString::new(
            vec![coord!(0, 0), coord!(1, 0), coord!(1, 1), coord!(0, 0)],
            (),
        );
        assert!(FastNodingValidator::is_valid(&mut [ring]));
    }
}
