//! Noding: splitting sets of segment strings at every mutual intersection, so that the
//! resulting segments only meet at their end points.

mod intersection_adder;
mod mc_index;
mod scaled;
mod segment_string;
mod snap;
pub mod snapround;
mod validator;

pub use intersection_adder::IntersectionAdder;
pub use mc_index::MCIndexNoder;
pub use scaled::ScaledNoder;
pub use segment_string::{NodedSegmentString, SegmentNode, SegmentNodeList, without_repeated_points};
pub use snap::{SnappingIntersectionAdder, SnappingNoder, SnappingPointIndex};
pub use snapround::{HotPixel, HotPixelIndex, SnapRoundingNoder};
pub use validator::{FastNodingValidator, NodingIntersectionFinder, ValidatingNoder};

use crate::error::Result;

/// Computes the noding of a set of segment strings.
pub trait Noder<D> {
    /// Returns the fully noded substrings of the given strings, each carrying the data of
    /// the string it was split from.
    fn compute_nodes(&mut self, strings: Vec<NodedSegmentString<D>>) -> Result<Vec<NodedSegmentString<D>>>;
}

/// Processes the pairs of segments found close to each other by a noder.
///
/// Strings are passed by slice and addressed by position, so that an implementation may
/// record nodes on both of them.
pub trait SegmentIntersector<D> {
    fn process_intersections(
        &mut self,
        strings: &mut [NodedSegmentString<D>],
        string0: usize,
        segment0: usize,
        string1: usize,
        segment1: usize,
    ) -> Result<()>;

    /// Returns true once no further pair needs to be processed.
    fn is_done(&self) -> bool {
        false
    }
}

impl<D, N> Noder<D> for Box<N>
where
    N: Noder<D> + ?Sized,
{
    fn compute_nodes(&mut self, strings: Vec<NodedSegmentString<D>>) -> Result<Vec<NodedSegmentString<D>>> {
        (**self).compute_nodes(strings)
    }
}
