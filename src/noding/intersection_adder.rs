use crate::{
    algorithm::LineIntersector,
    error::Result,
    geom::PrecisionModel,
    noding::{NodedSegmentString, SegmentIntersector},
};

/// Computes the intersections of segment pairs and records them as nodes on both strings,
/// keeping counts of what was found.
#[derive(Debug, Default, Clone)]
pub struct IntersectionAdder {
    li: LineIntersector,
    has_intersection: bool,
    has_proper: bool,
    has_proper_interior: bool,
    has_interior: bool,
    pub num_intersections: usize,
    pub num_interior_intersections: usize,
    pub num_proper_intersections: usize,
    pub num_tests: usize,
}

impl IntersectionAdder {
    /// Returns an adder whose intersection points are rounded to the given precision.
    pub fn with_precision(precision: PrecisionModel) -> Self {
        Self {
            li: LineIntersector::with_precision(precision),
            ..Default::default()
        }
    }

    /// Returns true if a non-trivial intersection was found.
    pub fn has_intersection(&self) -> bool {
        self.has_intersection
    }

    /// Returns true if a proper intersection was found, that is, one in the interior of
    /// both segments.
    pub fn has_proper_intersection(&self) -> bool {
        self.has_proper
    }

    /// Returns true if a proper intersection was found whose point is not a vertex of
    /// either string.
    pub fn has_proper_interior_intersection(&self) -> bool {
        self.has_proper_interior
    }

    /// Returns true if an intersection in the interior of some segment was found.
    pub fn has_interior_intersection(&self) -> bool {
        self.has_interior
    }

    /// An intersection is trivial when it is just the shared vertex of two consecutive
    /// segments of the same string.
    fn is_trivial<D>(&self, string: &NodedSegmentString<D>, segment0: usize, segment1: usize) -> bool {
        self.li.intersection_num() == 1 && string.is_adjacent(segment0, segment1)
    }
}

impl<D> SegmentIntersector<D> for IntersectionAdder {
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

        self.num_tests += 1;
        let (p00, p01) = strings[string0].segment(segment0);
        let (p10, p11) = strings[string1].segment(segment1);
        self.li.compute_intersection(&p00, &p01, &p10, &p11);
        if !self.li.has_intersection() {
            return Ok(());
        }

        self.num_intersections += 1;
        if self.li.is_interior_intersection() {
            self.num_interior_intersections += 1;
            self.has_interior = true;
        }

        if string0 == string1 && self.is_trivial(&strings[string0], segment0, segment1) {
            return Ok(());
        }

        self.has_intersection = true;
        for index in 0..self.li.intersection_num() {
            let point = self.li.intersection_at(index);
            strings[string0].add_intersection(point, segment0)?;
            strings[string1].add_intersection(point, segment1)?;
        }

        if self.li.is_proper() {
            self.num_proper_intersections += 1;
            self.has_proper = true;
            if ![p00, p01, p10, p11].iter().any(|p| self.li.is_intersection(p)) {
                self.has_proper_interior = true;
            }
        }

        Ok(())
    }
}
