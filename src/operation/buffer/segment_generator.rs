//! Generation of the offset segments, joins and caps making up a raw buffer curve.

use std::f64::consts::PI;

use crate::{
    algorithm::{
        LineIntersector, Orientation,
        angle::{self, PI_OVER_2, PI_TIMES_2},
        intersector::line_intersection,
    },
    geom::{Coordinate, Position, PrecisionModel},
    operation::buffer::{BufferParameters, EndCapStyle, JoinStyle},
};

/// Offset segments closer than this fraction of the distance are joined by a single point.
const OFFSET_SEGMENT_SEPARATION_FACTOR: f64 = 1e-3;

/// Inside turn offsets closer than this fraction of the distance are joined by a single
/// point.
const INSIDE_TURN_VERTEX_SNAP_DISTANCE_FACTOR: f64 = 1e-3;

/// Curve vertices closer than this fraction of the distance to the previous one are dropped.
const CURVE_VERTEX_SNAP_DISTANCE_FACTOR: f64 = 1e-6;

/// How far from the vertex, as a fraction of the offset length, the closing segments of
/// an inside turn are placed.
const MAX_CLOSING_SEG_LEN_FACTOR: f64 = 80.0;

/// A segment, directed from `p0` to `p1`.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub(super) struct Segment {
    pub p0: Coordinate,
    pub p1: Coordinate,
}

impl Segment {
    pub fn new(p0: Coordinate, p1: Coordinate) -> Self {
        Self { p0, p1 }
    }

    /// Returns the segment parallel to this one at the given distance on the given side.
    fn offset(&self, side: Position, distance: f64) -> Segment {
        let sign = if side == Position::Left { 1.0 } else { -1.0 };
        let dx = self.p1.x - self.p0.x;
        let dy = self.p1.y - self.p0.y;
        let len = dx.hypot(dy);
        let ux = sign * distance * dx / len;
        let uy = sign * distance * dy / len;

        Segment::new(
            Coordinate::new(self.p0.x - uy, self.p0.y + ux),
            Coordinate::new(self.p1.x - uy, self.p1.y + ux),
        )
    }

    /// Returns the point at the given fraction along the segment, moved perpendicularly by
    /// the given distance, to the left if positive.
    fn point_along_offset(&self, fraction: f64, offset: f64) -> Coordinate {
        let dx = self.p1.x - self.p0.x;
        let dy = self.p1.y - self.p0.y;
        let x = self.p0.x + fraction * dx;
        let y = self.p0.y + fraction * dy;

        let len = dx.hypot(dy);
        if offset == 0.0 || len == 0.0 {
            return Coordinate::new(x, y);
        }

        let ux = offset * dx / len;
        let uy = offset * dy / len;
        Coordinate::new(x - uy, y + ux)
    }
}

/// The vertices of a curve under construction, rounded to a precision model and with
/// near-duplicate vertices dropped.
#[derive(Debug, Clone)]
struct CurveVertices {
    coords: Vec<Coordinate>,
    precision: PrecisionModel,
    min_vertex_distance: f64,
}

impl CurveVertices {
    fn push(&mut self, coord: Coordinate) {
        let coord = self.precision.make_precise_coordinate(&coord);
        if self
            .coords
            .last()
            .is_some_and(|last| coord.distance(last) < self.min_vertex_distance)
        {
            return;
        }
        self.coords.push(coord);
    }

    fn push_all(&mut self, coords: impl IntoIterator<Item = Coordinate>) {
        coords.into_iter().for_each(|coord| self.push(coord));
    }

    fn close_ring(&mut self) {
        let (Some(&first), Some(last)) = (self.coords.first(), self.coords.last()) else {
            return;
        };
        if !first.equals_2d(last) {
            self.coords.push(first);
        }
    }
}

/// Builds one buffer curve, segment by segment.
///
/// The generator walks a line keeping its last three vertices and the offset segments of
/// the two segments they form; every vertex adds the join between both offsets.
#[derive(Debug, Clone)]
pub(super) struct OffsetSegmentGenerator {
    params: BufferParameters,
    distance: f64,
    fillet_angle_quantum: f64,
    closing_seg_length_factor: f64,
    li: LineIntersector,
    curve: CurveVertices,
    side: Position,
    s0: Coordinate,
    s1: Coordinate,
    s2: Coordinate,
    seg0: Segment,
    seg1: Segment,
    offset0: Segment,
    offset1: Segment,
}

impl OffsetSegmentGenerator {
    pub fn new(precision: PrecisionModel, params: BufferParameters, distance: f64) -> Self {
        let quadrant_segments = params.quadrant_segments().max(1);
        let closing_seg_length_factor =
            if quadrant_segments >= 8 && params.join_style() == JoinStyle::Round {
                1.0
            } else {
                MAX_CLOSING_SEG_LEN_FACTOR
            };

        Self {
            params,
            distance,
            fillet_angle_quantum: PI_OVER_2 / quadrant_segments as f64,
            closing_seg_length_factor,
            li: LineIntersector::with_precision(precision),
            curve: CurveVertices {
                coords: Vec::new(),
                precision,
                min_vertex_distance: distance * CURVE_VERTEX_SNAP_DISTANCE_FACTOR,
            },
            side: Position::Left,
            s0: Coordinate::default(),
            s1: Coordinate::default(),
            s2: Coordinate::default(),
            seg0: Segment::default(),
            seg1: Segment::default(),
            offset0: Segment::default(),
            offset1: Segment::default(),
        }
    }

    pub fn into_coords(self) -> Vec<Coordinate> {
        self.curve.coords
    }

    pub fn close_ring(&mut self) {
        self.curve.close_ring();
    }

    /// Appends the given vertices as they are.
    pub fn add_segments(&mut self, coords: &[Coordinate], forward: bool) {
        if forward {
            self.curve.push_all(coords.iter().copied());
        } else {
            self.curve.push_all(coords.iter().rev().copied());
        }
    }

    pub fn init_side_segments(&mut self, s1: Coordinate, s2: Coordinate, side: Position) {
        self.s1 = s1;
        self.s2 = s2;
        self.side = side;
        self.seg1 = Segment::new(s1, s2);
        self.offset1 = self.seg1.offset(side, self.distance);
    }

    pub fn add_first_segment(&mut self) {
        self.curve.push(self.offset1.p0);
    }

    pub fn add_last_segment(&mut self) {
        self.curve.push(self.offset1.p1);
    }

    /// Moves the generator to the next vertex, adding the join at the current one.
    pub fn add_next_segment(&mut self, p: Coordinate, add_start_point: bool) {
        self.s0 = self.s1;
        self.s1 = self.s2;
        self.s2 = p;
        self.seg0 = Segment::new(self.s0, self.s1);
        self.offset0 = self.seg0.offset(self.side, self.distance);
        self.seg1 = Segment::new(self.s1, self.s2);
        self.offset1 = self.seg1.offset(self.side, self.distance);

        // a repeated vertex adds nothing
        if self.s1 == self.s2 {
            return;
        }

        let orientation = Orientation::of(&self.s0, &self.s1, &self.s2);
        let outside_turn = (orientation == Orientation::CLOCKWISE && self.side == Position::Left)
            || (orientation == Orientation::COUNTER_CLOCKWISE && self.side == Position::Right);

        match orientation {
            Orientation::Collinear => self.add_collinear(add_start_point),
            _ if outside_turn => self.add_outside_turn(orientation, add_start_point),
            _ => self.add_inside_turn(),
        }
    }

    fn add_collinear(&mut self, add_start_point: bool) {
        // only a segment folding back on the previous one needs a join
        self.li
            .compute_intersection(&self.s0, &self.s1, &self.s1, &self.s2);
        if self.li.intersection_num() < 2 {
            return;
        }

        match self.params.join_style() {
            JoinStyle::Bevel | JoinStyle::Mitre => {
                if add_start_point {
                    self.curve.push(self.offset0.p1);
                }
                self.curve.push(self.offset1.p0);
            }
            JoinStyle::Round => self.add_corner_fillet(
                self.s1,
                self.offset0.p1,
                self.offset1.p0,
                Orientation::CLOCKWISE,
                self.distance,
            ),
        }
    }

    fn add_outside_turn(&mut self, orientation: Orientation, add_start_point: bool) {
        if self.offset0.p1.distance(&self.offset1.p0)
            < self.distance * OFFSET_SEGMENT_SEPARATION_FACTOR
        {
            self.curve.push(self.offset0.p1);
            return;
        }

        match self.params.join_style() {
            JoinStyle::Mitre => self.add_mitre_join(),
            JoinStyle::Bevel => {
                self.curve.push(self.offset0.p1);
                self.curve.push(self.offset1.p0);
            }
            JoinStyle::Round => {
                if add_start_point {
                    self.curve.push(self.offset0.p1);
                }
                self.add_corner_fillet(
                    self.s1,
                    self.offset0.p1,
                    self.offset1.p0,
                    orientation,
                    self.distance,
                );
                self.curve.push(self.offset1.p0);
            }
        }
    }

    fn add_inside_turn(&mut self) {
        self.li.compute_intersection(
            &self.offset0.p0,
            &self.offset0.p1,
            &self.offset1.p0,
            &self.offset1.p1,
        );
        if self.li.has_intersection() {
            self.curve.push(self.li.intersection_at(0));
            return;
        }

        // the offsets do not meet: the turn is sharp or the segments are short
        if self.offset0.p1.distance(&self.offset1.p0)
            < self.distance * INSIDE_TURN_VERTEX_SNAP_DISTANCE_FACTOR
        {
            self.curve.push(self.offset0.p1);
            return;
        }

        self.curve.push(self.offset0.p1);
        if self.closing_seg_length_factor > 0.0 {
            let factor = self.closing_seg_length_factor;
            let towards_vertex = |p: &Coordinate| {
                Coordinate::new(
                    (factor * p.x + self.s1.x) / (factor + 1.0),
                    (factor * p.y + self.s1.y) / (factor + 1.0),
                )
            };
            let mid0 = towards_vertex(&self.offset0.p1);
            let mid1 = towards_vertex(&self.offset1.p0);
            self.curve.push(mid0);
            self.curve.push(mid1);
        } else {
            self.curve.push(self.s1);
        }
        self.curve.push(self.offset1.p0);
    }

    fn add_mitre_join(&mut self) {
        let vertex = self.s1;
        if let Some(intersection) = line_intersection(
            &self.offset0.p0,
            &self.offset0.p1,
            &self.offset1.p0,
            &self.offset1.p1,
        ) {
            let ratio = if self.distance <= 0.0 {
                1.0
            } else {
                intersection.distance(&vertex) / self.distance.abs()
            };
            if ratio <= self.params.mitre_limit() {
                self.curve.push(intersection);
                return;
            }
        }

        self.add_limited_mitre_join();
    }

    /// Cuts the mitre perpendicularly to its bisector, at the mitre limit distance from the
    /// vertex.
    fn add_limited_mitre_join(&mut self) {
        let base = self.seg0.p1;
        let start_angle = angle::angle(&base, &self.seg0.p0);
        let half_diff = angle::angle_between_oriented(&self.seg0.p0, &base, &self.seg1.p1) / 2.0;

        let mid_angle = angle::normalize(start_angle + half_diff);
        let mitre_mid_angle = angle::normalize(mid_angle + PI);

        let mitre_distance = self.params.mitre_limit() * self.distance;
        let bevel_delta = mitre_distance * half_diff.sin().abs();
        let bevel_half_len = self.distance - bevel_delta;

        let bevel_mid = Coordinate::new(
            base.x + mitre_distance * mitre_mid_angle.cos(),
            base.y + mitre_distance * mitre_mid_angle.sin(),
        );
        let mitre_mid_line = Segment::new(base, bevel_mid);
        let left = mitre_mid_line.point_along_offset(1.0, bevel_half_len);
        let right = mitre_mid_line.point_along_offset(1.0, -bevel_half_len);

        if self.side == Position::Left {
            self.curve.push(left);
            self.curve.push(right);
        } else {
            self.curve.push(right);
            self.curve.push(left);
        }
    }

    /// Adds the cap at the end `p1` of the segment `p0`-`p1`.
    pub fn add_line_end_cap(&mut self, p0: Coordinate, p1: Coordinate) {
        let segment = Segment::new(p0, p1);
        let left = segment.offset(Position::Left, self.distance);
        let right = segment.offset(Position::Right, self.distance);
        let angle = (p1.y - p0.y).atan2(p1.x - p0.x);

        match self.params.end_cap_style() {
            EndCapStyle::Round => {
                self.curve.push(left.p1);
                self.add_directed_fillet(
                    p1,
                    angle + PI_OVER_2,
                    angle - PI_OVER_2,
                    Orientation::CLOCKWISE,
                    self.distance,
                );
                self.curve.push(right.p1);
            }
            EndCapStyle::Flat => {
                self.curve.push(left.p1);
                self.curve.push(right.p1);
            }
            EndCapStyle::Square => {
                let dx = self.distance.abs() * angle.cos();
                let dy = self.distance.abs() * angle.sin();
                self.curve.push(Coordinate::new(left.p1.x + dx, left.p1.y + dy));
                self.curve.push(Coordinate::new(right.p1.x + dx, right.p1.y + dy));
            }
        }
    }

    /// Adds the arc around `p` from `p0` to `p1`, both at the given radius.
    fn add_corner_fillet(
        &mut self,
        p: Coordinate,
        p0: Coordinate,
        p1: Coordinate,
        direction: Orientation,
        radius: f64,
    ) {
        let mut start_angle = (p0.y - p.y).atan2(p0.x - p.x);
        let end_angle = (p1.y - p.y).atan2(p1.x - p.x);

        if direction == Orientation::CLOCKWISE {
            if start_angle <= end_angle {
                start_angle += PI_TIMES_2;
            }
        } else if start_angle >= end_angle {
            start_angle -= PI_TIMES_2;
        }

        self.curve.push(p0);
        self.add_directed_fillet(p, start_angle, end_angle, direction, radius);
        self.curve.push(p1);
    }

    /// Adds the vertices of the arc around `p` between both angles, excluding the end one.
    fn add_directed_fillet(
        &mut self,
        p: Coordinate,
        start_angle: f64,
        end_angle: f64,
        direction: Orientation,
        radius: f64,
    ) {
        let direction_factor = if direction == Orientation::CLOCKWISE { -1.0 } else { 1.0 };
        let total_angle = (start_angle - end_angle).abs();
        let segments = (total_angle / self.fillet_angle_quantum + 0.5) as usize;
        if segments < 1 {
            return;
        }

        let increment = total_angle / segments as f64;
        for i in 0..segments {
            let angle = start_angle + direction_factor * i as f64 * increment;
            self.curve.push(Coordinate::new(
                p.x + radius * angle.cos(),
                p.y + radius * angle.sin(),
            ));
        }
    }

    /// Adds a closed circle of the buffer distance around the point.
    pub fn create_circle(&mut self, p: Coordinate) {
        self.curve.push(Coordinate::new(p.x + self.distance, p.y));
        self.add_directed_fillet(p, 0.0, PI_TIMES_2, Orientation::CLOCKWISE, self.distance);
        self.curve.close_ring();
    }

    /// Adds a closed square of half side the buffer distance around the point.
    pub fn create_square(&mut self, p: Coordinate) {
        let d = self.distance;
        self.curve.push(Coordinate::new(p.x + d, p.y + d));
        self.curve.push(Coordinate::new(p.x + d, p.y - d));
        self.curve.push(Coordinate::new(p.x - d, p.y - d));
        self.curve.push(Coordinate::new(p.x - d, p.y + d));
        self.curve.close_ring();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{algorithm::measure::ring_area, coord};

    #[test]
    fn circle_has_four_arcs_of_quadrant_segments() {
        vec![1usize, 4, 8, 16].into_iter().for_each(|segments| {
            let params = BufferParameters::default().with_quadrant_segments(segments);
            let mut generator = OffsetSegmentGenerator::new(PrecisionModel::Floating, params, 1.0);
            generator.create_circle(coord!(0, 0));

            let coords = generator.into_coords();
            assert_eq!(coords.len(), 4 * segments + 1, "{segments} segments");
            assert_eq!(coords.first(), coords.last());
        });
    }

    #[test]
    fn square_around_point() {
        let mut generator =
            OffsetSegmentGenerator::new(PrecisionModel::Floating, BufferParameters::default(), 2.0);
        generator.create_square(coord!(1, 1));

        let coords = generator.into_coords();
        assert_eq!(coords.len(), 5);
        assert!((ring_area(&coords) - 16.0).abs() < 1e-12);
    }

    #[test]
    fn offset_segment() {
        let segment = Segment::new(coord!(0, 0), coord!(10, 0));
        assert_eq!(
            segment.offset(Position::Left, 2.0),
            Segment::new(coord!(0, 2), coord!(10, 2))
        );
        assert_eq!(
            segment.offset(Position::Right, 2.0),
            Segment::new(coord!(0, -2), coord!(10, -2))
        );
    }

    #[test]
    fn mitre_join_at_right_angle() {
        let params = BufferParameters::default().with_join_style(JoinStyle::Mitre);
        let mut generator = OffsetSegmentGenerator::new(PrecisionModel::Floating, params, 1.0);

        // a right turn on the left side is an outside turn
        generator.init_side_segments(coord!(0, 0), coord!(10, 0), Position::Left);
        generator.add_next_segment(coord!(10, -10), true);
        assert_eq!(generator.into_coords(), vec![coord!(11, 1)]);
    }
}
