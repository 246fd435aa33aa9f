use tracing::{debug, trace};

use crate::{
    algorithm::{LineIntersector, distance},
    error::{GeometryError, Result},
    geom::{Coordinate, PrecisionModel},
    interrupt,
    noding::{
        MCIndexNoder, NodedSegmentString, Noder, SegmentIntersector, snapround::HotPixelIndex,
        without_repeated_points,
    },
};

/// Divides the grid size to obtain the distance under which a vertex is considered to
/// touch a segment.
const NEARNESS_FACTOR: f64 = 100.0;

/// Upper bound of snap rounding rounds, each one splitting what the previous one moved.
const MAX_ROUNDS: usize = 16;

/// Nodes segment strings by snap rounding them to the grid of a fixed precision model.
///
/// The output is fully noded, every vertex lies on the grid and no segment goes through
/// the pixel of a vertex other than its end points, so noding it again changes nothing.
/// Segments may move by up to half a grid cell, which can collapse thin features.
#[derive(Debug, Clone)]
pub struct SnapRoundingNoder {
    precision: PrecisionModel,
}

impl SnapRoundingNoder {
    pub fn new(precision: PrecisionModel) -> Self {
        Self { precision }
    }

    pub fn precision(&self) -> PrecisionModel {
        self.precision
    }

    fn round(&self, p: &Coordinate) -> Coordinate {
        self.precision.make_precise_coordinate(p)
    }

    /// Creates pixels at every intersection of the input, and at every vertex.
    fn hot_pixels<D>(&self, strings: &mut [NodedSegmentString<D>]) -> Result<HotPixelIndex> {
        let nearness = self.precision.grid_size() / NEARNESS_FACTOR;
        let adder = IntersectionCollector {
            li: LineIntersector::new(),
            nearness,
            intersections: Vec::new(),
        };

        let mut noder = MCIndexNoder::new(adder).with_overlap_tolerance(nearness);
        noder.compute_intersections(strings)?;

        let mut pixels = HotPixelIndex::new(self.precision);
        pixels.add_nodes(&noder.intersector().intersections);
        for string in strings.iter() {
            pixels.add_all(string.coords());
        }

        Ok(pixels)
    }

    /// Returns the string rounded to the grid, with a node at every pixel its segments go
    /// through, or `None` if it collapses to a point.
    fn snap_segments<D>(
        &self,
        pixels: &mut HotPixelIndex,
        string: NodedSegmentString<D>,
    ) -> Result<Option<NodedSegmentString<D>>> {
        let coords = string.coords().to_vec();
        let rounded: Vec<Coordinate> = coords.iter().map(|p| self.round(p)).collect();
        let rounded = without_repeated_points(&rounded);
        if rounded.len() <= 1 {
            return Ok(None);
        }

        let mut snapped = NodedSegmentString::new(rounded, string.into_data());
        let mut segment = 0;
        for pair in coords.windows(2) {
            let current = *snapped.coordinate(segment);
            if self.round(&pair[1]).equals_2d(&current) {
                continue;
            }

            snap_segment(pixels, &pair[0], &pair[1], &mut snapped, segment)?;
            segment += 1;
        }

        Ok(Some(snapped))
    }
}

/// Adds a node at every pixel the segment goes through.
///
/// A pixel which is not a node yet and contains an end point of the segment is the pixel
/// of that very vertex, so it does not split the segment.
fn snap_segment<D>(
    pixels: &mut HotPixelIndex,
    p0: &Coordinate,
    p1: &Coordinate,
    string: &mut NodedSegmentString<D>,
    segment: usize,
) -> Result<()> {
    for index in pixels.query(p0, p1) {
        let pixel = pixels.pixel(index);
        if !pixel.is_node() && (pixel.intersects_point(p0) || pixel.intersects_point(p1)) {
            continue;
        }

        if pixel.intersects(p0, p1) {
            let centre = *pixel.coordinate();
            string.add_intersection(centre, segment)?;
            pixels.pixel_mut(index).set_to_node();
        }
    }

    Ok(())
}

/// Adds a node at every interior vertex of the string lying at the centre of a node
/// pixel.
fn snap_vertex_nodes<D>(pixels: &HotPixelIndex, string: &mut NodedSegmentString<D>) -> Result<()> {
    for index in 1..string.len().saturating_sub(1) {
        let p = *string.coordinate(index);
        let is_node = pixels.query(&p, &p).into_iter().any(|pixel| {
            let pixel = pixels.pixel(pixel);
            pixel.is_node() && pixel.coordinate().equals_2d(&p)
        });

        if is_node {
            string.add_intersection(p, index)?;
        }
    }

    Ok(())
}

impl SnapRoundingNoder {
    /// Snap rounds the strings once. Rounding moves segments, so the output of a single
    /// round may still cross the pixel of some other output vertex.
    fn round_once<D: Clone>(
        &self,
        mut strings: Vec<NodedSegmentString<D>>,
    ) -> Result<Vec<NodedSegmentString<D>>> {
        let mut pixels = self.hot_pixels(&mut strings)?;

        let mut snapped = Vec::with_capacity(strings.len());
        for string in strings {
            interrupt::check()?;
            if let Some(string) = self.snap_segments(&mut pixels, string)? {
                snapped.push(string);
            }
        }

        for string in &mut snapped {
            snap_vertex_nodes(&pixels, string)?;
        }

        trace!(pixels = pixels.len(), strings = snapped.len(), "snap rounded");
        Ok(snapped
            .into_iter()
            .flat_map(NodedSegmentString::into_substrings)
            .collect())
    }
}

impl<D> Noder<D> for SnapRoundingNoder
where
    D: Clone,
{
    /// Snap rounds until no segment goes through the pixel of a vertex it does not end at.
    ///
    /// Rounding on-grid strings only ever splits them, so a round that leaves the number of
    /// strings unchanged leaves them untouched and the output is stable.
    fn compute_nodes(&mut self, strings: Vec<NodedSegmentString<D>>) -> Result<Vec<NodedSegmentString<D>>> {
        if self.precision.is_floating() {
            return Err(GeometryError::illegal(
                "snap rounding requires a fixed precision model",
            ));
        }

        let mut noded = self.round_once(strings)?;
        for round in 1..MAX_ROUNDS {
            let count = noded.len();
            noded = self.round_once(noded)?;
            if noded.len() == count {
                trace!(rounds = round + 1, "snap rounding is stable");
                return Ok(noded);
            }
        }

        debug!(rounds = MAX_ROUNDS, "snap rounding did not stabilize");
        Ok(noded)
    }
}

/// Collects the interior intersections of segment pairs, along with vertices lying
/// nearly on a segment of another string.
struct IntersectionCollector {
    li: LineIntersector,
    nearness: f64,
    intersections: Vec<Coordinate>,
}

impl IntersectionCollector {
    fn process_near_vertex(&mut self, p: &Coordinate, p0: &Coordinate, p1: &Coordinate) {
        if p.distance(p0) < self.nearness || p.distance(p1) < self.nearness {
            return;
        }

        if distance::point_to_segment(p, p0, p1) < self.nearness {
            self.intersections.push(*p);
        }
    }
}

impl<D> SegmentIntersector<D> for IntersectionCollector {
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
        self.li.compute_intersection(&p00, &p01, &p10, &p11);
        if self.li.has_intersection() && self.li.is_interior_intersection() {
            for index in 0..self.li.intersection_num() {
                self.intersections.push(self.li.intersection_at(index));
            }
            return Ok(());
        }

        self.process_near_vertex(&p00, &p10, &p11);
        self.process_near_vertex(&p01, &p10, &p11);
        self.process_near_vertex(&p10, &p00, &p01);
        self.process_near_vertex(&p11, &p00, &p01);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coord;

    #[test]
    fn rounds_and_nodes_crossings() {
        let strings = vec![
            NodedSegmentString::new(vec![coord!(0, 0), coord!(10, 10.4)], 0),
            NodedSegmentString::new(vec![coord!(0, 10), coord!(10, 0.2)], 1),
        ];

        let noded = SnapRoundingNoder::new(PrecisionModel::fixed(1.0))
            .compute_nodes(strings)
            .unwrap();
        assert_eq!(noded.len(), 4);
        for string in &noded {
            for c in string.coords() {
                assert_eq!((c.x.round(), c.y.round()), (c.x, c.y), "{c}");
            }
        }
    }

    #[test]
    fn nodes_near_vertex() {
        // the end point of the second string lies within a pixel crossed by the first one
        let strings = vec![
            NodedSegmentString::new(vec![coord!(0, 0), coord!(10, 0)], 0),
            NodedSegmentString::new(vec![coord!(5, 10), coord!(5.1, 0.3)], 1),
        ];

        let noded = SnapRoundingNoder::new(PrecisionModel::fixed(1.0))
            .compute_nodes(strings)
            .unwrap();
        let first: Vec<_> = noded.iter().filter(|s| *s.data() == 0).collect();
        assert_eq!(first.len(), 2);
        assert_eq!(*first[0].coords().last().unwrap(), coord!(5, 0));
    }

    #[test]
    fn rounded_segment_through_vertex_pixel_is_split() {
        // the first string only reaches the pixel at (4, 0) once rounded
        let strings = vec![
            NodedSegmentString::new(vec![coord!(0, 0.4), coord!(10, 1.4)], 0),
            NodedSegmentString::new(vec![coord!(4.1, -5), coord!(4.1, -0.2)], 1),
        ];

        let mut noder = SnapRoundingNoder::new(PrecisionModel::fixed(1.0));
        let noded = noder.compute_nodes(strings).unwrap();
        let first: Vec<_> = noded
            .iter()
            .filter(|s| *s.data() == 0)
            .map(|s| s.coords().to_vec())
            .collect();
        assert_eq!(
            first,
            vec![vec![coord!(0, 0), coord!(4, 0)], vec![coord!(4, 0), coord!(10, 1)]]
        );

        let count = noded.len();
        assert_eq!(noder.compute_nodes(noded).unwrap().len(), count);
    }

    #[test]
    fn floating_precision_is_rejected() {
        let strings = vec![NodedSegmentString::new(vec![coord!(0, 0), coord!(1, 1)], ())];
        assert!(SnapRoundingNoder::new(PrecisionModel::Floating)
            .compute_nodes(strings)
            .is_err());
    }
}
