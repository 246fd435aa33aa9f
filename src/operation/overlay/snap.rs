//! Geometry-to-geometry snapping and pointwise precision reduction, the input conditioning
//! steps of the heuristic overlay.

use std::{collections::BTreeSet, sync::Arc};

use crate::{
    algorithm::distance::point_to_segment,
    geom::{Coordinate, CoordinateSequence, Geometry, GeometryFactory, PrecisionModel},
};

/// Fraction of the smallest envelope extent used as snap tolerance.
const SNAP_PRECISION_FACTOR: f64 = 1e-9;

/// Returns the snap tolerance for overlaying the given geometry: a small fraction of its
/// extent, or a couple of grid cells if its precision model is fixed and that is larger.
pub fn overlay_snap_tolerance(geometry: &Geometry) -> f64 {
    let envelope = geometry.envelope();
    let mut tolerance = envelope.width().min(envelope.height()) * SNAP_PRECISION_FACTOR;

    let precision = geometry.precision_model();
    if !precision.is_floating() {
        let fixed = 2.0 / precision.scale() / 1.415;
        tolerance = tolerance.max(fixed);
    }

    tolerance
}

/// Same as [`overlay_snap_tolerance`] for a pair of geometries.
pub fn overlay_snap_tolerance_of(g0: &Geometry, g1: &Geometry) -> f64 {
    overlay_snap_tolerance(g0).min(overlay_snap_tolerance(g1))
}

/// Snaps the vertices and segments of a geometry to the vertices of another.
///
/// A vertex closer than the tolerance to a target vertex is moved onto it; a target
/// vertex closer than the tolerance to a segment is inserted into that segment.
#[derive(Debug, Clone, Copy)]
pub struct GeometrySnapper<'a> {
    source: &'a Geometry,
}

impl<'a> GeometrySnapper<'a> {
    pub fn new(source: &'a Geometry) -> Self {
        Self { source }
    }

    /// Returns a copy of the source with its coordinates snapped to the target's.
    pub fn snap_to(&self, target: &Geometry, tolerance: f64) -> Geometry {
        let snap_points: Vec<Coordinate> = target
            .coordinates()
            .into_iter()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let mut snapped = self.source.clone();
        snapped.apply_sequences(|seq| {
            *seq = LineSnapper::new(seq.as_slice(), tolerance).snap_to(&snap_points);
        });
        snapped
    }
}

/// Snaps two geometries to each other: the first to the second, and then the second to the
/// snapped first.
pub fn snap(g0: &Geometry, g1: &Geometry, tolerance: f64) -> (Geometry, Geometry) {
    let snapped0 = GeometrySnapper::new(g0).snap_to(g1, tolerance);
    let snapped1 = GeometrySnapper::new(g1).snap_to(&snapped0, tolerance);
    (snapped0, snapped1)
}

struct LineSnapper {
    coords: Vec<Coordinate>,
    tolerance: f64,
    is_closed: bool,
}

impl LineSnapper {
    fn new(coords: &[Coordinate], tolerance: f64) -> Self {
        Self {
            coords: coords.to_vec(),
            tolerance,
            is_closed: coords.len() > 1 && coords.first() == coords.last(),
        }
    }

    fn snap_to(mut self, snap_points: &[Coordinate]) -> CoordinateSequence {
        self.snap_vertices(snap_points);
        self.snap_segments(snap_points);
        self.coords.into()
    }

    fn snap_vertices(&mut self, snap_points: &[Coordinate]) {
        // the closing point follows the first one
        let end = if self.is_closed {
            self.coords.len() - 1
        } else {
            self.coords.len()
        };

        for index in 0..end {
            let Some(snapped) = self.find_snap_for_vertex(&self.coords[index], snap_points) else {
                continue;
            };

            self.coords[index] = snapped;
            if index == 0 && self.is_closed {
                let last = self.coords.len() - 1;
                self.coords[last] = snapped;
            }
        }
    }

    fn find_snap_for_vertex(&self, p: &Coordinate, snap_points: &[Coordinate]) -> Option<Coordinate> {
        for snap_point in snap_points {
            if p.equals_2d(snap_point) {
                return None;
            }
            if p.distance(snap_point) < self.tolerance {
                return Some(*snap_point);
            }
        }

        None
    }

    fn snap_segments(&mut self, snap_points: &[Coordinate]) {
        for snap_point in snap_points {
            if let Some(index) = self.find_segment_to_snap(snap_point) {
                self.insert_distinct(index + 1, *snap_point);
            }
        }
    }

    /// Returns the segment nearest to the point within tolerance, unless the point is
    /// already a vertex of a segment.
    fn find_segment_to_snap(&self, p: &Coordinate) -> Option<usize> {
        let mut nearest = None;
        let mut min_distance = f64::MAX;

        for (index, segment) in self.coords.windows(2).enumerate() {
            if segment[0].equals_2d(p) || segment[1].equals_2d(p) {
                return None;
            }

            let distance = point_to_segment(p, &segment[0], &segment[1]);
            if distance < self.tolerance && distance < min_distance {
                min_distance = distance;
                nearest = Some(index);
            }
        }

        nearest
    }

    fn insert_distinct(&mut self, index: usize, coord: Coordinate) {
        let repeats_previous = index > 0 && self.coords[index - 1].equals_2d(&coord);
        let repeats_next = self.coords.get(index).is_some_and(|next| next.equals_2d(&coord));
        if !repeats_previous && !repeats_next {
            self.coords.insert(index, coord);
        }
    }
}

/// Rounds every coordinate of a geometry to a precision model.
///
/// Reduction is pointwise: the structure of the geometry is kept as is, even if some of
/// its components collapse.
#[derive(Debug, Clone)]
pub struct PrecisionReducer {
    precision: PrecisionModel,
    factory: Option<Arc<GeometryFactory>>,
}

impl PrecisionReducer {
    pub fn new(precision: PrecisionModel) -> Self {
        Self {
            precision,
            factory: None,
        }
    }

    /// Makes the reduced geometries belong to the given factory instead of the input's.
    pub fn with_factory(mut self, factory: Arc<GeometryFactory>) -> Self {
        self.factory = Some(factory);
        self
    }

    pub fn precision(&self) -> PrecisionModel {
        self.precision
    }

    pub fn reduce(&self, geometry: &Geometry) -> Geometry {
        let factory = self
            .factory
            .clone()
            .unwrap_or_else(|| geometry.factory().clone());

        let mut reduced = Geometry::new(geometry.kind().clone(), factory);
        reduced.apply_coordinates(|coord| *coord = self.precision.make_precise_coordinate(coord));
        reduced
    }
}
