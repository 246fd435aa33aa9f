use crate::{
    geom::{Coordinate, Position, PrecisionModel},
    operation::buffer::{
        BufferParameters, EndCapStyle, segment_generator::OffsetSegmentGenerator, simplifier,
    },
};

/// Computes the raw offset curves of lines and rings.
///
/// Raw curves may self-intersect and have reversed sections; they only make sense once
/// noded and labelled by depth.
#[derive(Debug, Clone, Copy)]
pub(super) struct OffsetCurveBuilder {
    precision: PrecisionModel,
    params: BufferParameters,
}

impl OffsetCurveBuilder {
    pub fn new(precision: PrecisionModel, params: BufferParameters) -> Self {
        Self { precision, params }
    }

    pub fn params(&self) -> &BufferParameters {
        &self.params
    }

    fn generator(&self, distance: f64) -> OffsetSegmentGenerator {
        OffsetSegmentGenerator::new(self.precision, self.params, distance)
    }

    fn simplify_tolerance(&self, distance: f64) -> f64 {
        distance * self.params.simplify_factor()
    }

    /// Returns the curve around a line, `None` if the buffer of a line at that distance is
    /// empty.
    pub fn line_curve(&self, coords: &[Coordinate], distance: f64) -> Option<Vec<Coordinate>> {
        if distance <= 0.0 && !self.params.is_single_sided() {
            return None;
        }

        let mut generator = self.generator(distance.abs());
        match coords {
            [] => return None,
            [point] => self.point_curve(*point, &mut generator),
            _ if self.params.is_single_sided() => {
                self.single_sided_curve(coords, distance, &mut generator)
            }
            _ => self.line_buffer_curve(coords, distance, &mut generator),
        }

        Some(generator.into_coords())
    }

    /// Returns the curve offsetting a ring on the given side.
    pub fn ring_curve(&self, coords: &[Coordinate], side: Position, distance: f64) -> Option<Vec<Coordinate>> {
        if distance == 0.0 {
            return Some(coords.to_vec());
        }
        if coords.len() <= 2 {
            return self.line_curve(coords, distance);
        }

        let mut generator = self.generator(distance.abs());
        self.ring_buffer_curve(coords, side, distance, &mut generator);
        Some(generator.into_coords())
    }

    fn point_curve(&self, point: Coordinate, generator: &mut OffsetSegmentGenerator) {
        match self.params.end_cap_style() {
            EndCapStyle::Round => generator.create_circle(point),
            EndCapStyle::Square => generator.create_square(point),
            EndCapStyle::Flat => {}
        }
    }

    fn line_buffer_curve(&self, coords: &[Coordinate], distance: f64, generator: &mut OffsetSegmentGenerator) {
        let tolerance = self.simplify_tolerance(distance);

        // left side, forward
        let forward = simplifier::simplify(coords, tolerance);
        let last = forward.len() - 1;
        generator.init_side_segments(forward[0], forward[1], Position::Left);
        for &coord in &forward[2..] {
            generator.add_next_segment(coord, true);
        }
        generator.add_last_segment();
        generator.add_line_end_cap(forward[last - 1], forward[last]);

        // right side, backward
        let backward = simplifier::simplify(coords, -tolerance);
        let last = backward.len() - 1;
        generator.init_side_segments(backward[last], backward[last - 1], Position::Left);
        for &coord in backward[..last - 1].iter().rev() {
            generator.add_next_segment(coord, true);
        }
        generator.add_last_segment();
        generator.add_line_end_cap(backward[1], backward[0]);

        generator.close_ring();
    }

    fn single_sided_curve(&self, coords: &[Coordinate], distance: f64, generator: &mut OffsetSegmentGenerator) {
        let tolerance = self.simplify_tolerance(distance.abs());

        if distance < 0.0 {
            generator.add_segments(coords, true);

            let simplified = simplifier::simplify(coords, -tolerance);
            let last = simplified.len() - 1;
            generator.init_side_segments(simplified[last], simplified[last - 1], Position::Left);
            generator.add_first_segment();
            for &coord in simplified[..last - 1].iter().rev() {
                generator.add_next_segment(coord, true);
            }
        } else {
            generator.add_segments(coords, false);

            let simplified = simplifier::simplify(coords, tolerance);
            generator.init_side_segments(simplified[0], simplified[1], Position::Left);
            generator.add_first_segment();
            for &coord in &simplified[2..] {
                generator.add_next_segment(coord, true);
            }
        }

        generator.add_last_segment();
        generator.close_ring();
    }

    fn ring_buffer_curve(
        &self,
        coords: &[Coordinate],
        side: Position,
        distance: f64,
        generator: &mut OffsetSegmentGenerator,
    ) {
        let mut tolerance = self.simplify_tolerance(distance);
        if side == Position::Right {
            tolerance = -tolerance;
        }

        let simplified = simplifier::simplify(coords, tolerance);
        let last = simplified.len() - 1;
        generator.init_side_segments(simplified[last - 1], simplified[0], side);
        for (index, &coord) in simplified.iter().enumerate().skip(1) {
            generator.add_next_segment(coord, index != 1);
        }
        generator.close_ring();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{algorithm::measure::ring_area, coord};

    #[test]
    fn line_curves() {
        struct Test {
            name: &'static str,
            cap: EndCapStyle,
            area: f64,
        }

        vec![
            Test { name: "flat", cap: EndCapStyle::Flat, area: 40. },
            Test { name: "square", cap: EndCapStyle::Square, area: 56. },
        ]
        .into_iter()
        .for_each(|test| {
            let params = BufferParameters::default().with_end_cap_style(test.cap);
            let builder = OffsetCurveBuilder::new(PrecisionModel::Floating, params);

            let curve = builder
                .line_curve(&[coord!(0, 0), coord!(10, 0)], 2.0)
                .unwrap();
            assert_eq!(curve.first(), curve.last(), "{}", test.name);
            assert!((ring_area(&curve) - test.area).abs() < 1e-9, "{}", test.name);
        });
    }

    #[test]
    fn non_positive_line_distance_has_no_curve() {
        let builder = OffsetCurveBuilder::new(PrecisionModel::Floating, BufferParameters::default());
        assert!(builder.line_curve(&[coord!(0, 0), coord!(10, 0)], 0.0).is_none());
        assert!(builder.line_curve(&[coord!(0, 0), coord!(10, 0)], -1.0).is_none());
    }

    #[test]
    fn ring_curve_outside_square() {
        let params = BufferParameters::default().with_join_style(crate::operation::buffer::JoinStyle::Mitre);
        let builder = OffsetCurveBuilder::new(PrecisionModel::Floating, params);

        // clockwise shell, offset to the left is outwards
        let square = [coord!(0, 0), coord!(0, 10), coord!(10, 10), coord!(10, 0), coord!(0, 0)];
        let curve = builder.ring_curve(&square, Position::Left, 1.0).unwrap();
        assert!((ring_area(&curve) - 144.).abs() < 1e-9);
    }
}
