//! Buffering: the area within a distance of a geometry.
//!
//! Offset curves are generated around every component, noded, and resolved into polygons
//! by labelling the noded edges with the number of curves covering each of their sides.

mod builder;
mod curve_builder;
mod curve_set;
mod depth_locater;
mod parameters;
mod segment_generator;
mod simplifier;
mod subgraph;

pub use parameters::{BufferParameters, EndCapStyle, JoinStyle};

use tracing::{debug, warn};

use crate::{
    error::{GeometryError, Result},
    geom::{Geometry, PrecisionModel},
};

use self::builder::BufferBuilder;

/// The most significant digits tried when falling back to a fixed precision.
const MAX_PRECISION_DIGITS: i32 = 12;

/// The least significant digits tried before giving up.
const MIN_PRECISION_DIGITS: i32 = 6;

/// Computes the buffer of a geometry.
///
/// The buffer is first computed at the precision of the input. On a topology failure, a
/// fixed input precision is retried with snap-rounding, and a floating one is retried at
/// fixed precisions of decreasing significant digits.
#[derive(Debug, Clone, Copy)]
pub struct BufferOp<'a> {
    geometry: &'a Geometry,
    params: BufferParameters,
}

impl<'a> BufferOp<'a> {
    pub fn new(geometry: &'a Geometry) -> Self {
        Self {
            geometry,
            params: BufferParameters::default(),
        }
    }

    pub fn with_params(mut self, params: BufferParameters) -> Self {
        self.params = params;
        self
    }

    /// Returns the buffer at the given distance. Negative distances erode areas; the buffer
    /// of a point or line at a non-positive distance is empty.
    pub fn result(&self, distance: f64) -> Result<Geometry> {
        if !distance.is_finite() {
            return Err(GeometryError::illegal(format!(
                "buffer distance must be finite, got {distance}"
            )));
        }

        self.precision_ladder(distance, &|precision| {
            let builder = match precision {
                Some(precision) => BufferBuilder::new(self.params).with_precision(precision),
                None => BufferBuilder::new(self.params),
            };
            builder.buffer(self.geometry, distance)
        })
    }

    /// Runs `stage` at the input precision, then at the fixed precisions to fall back to,
    /// until one does not fail on topology. Fails with the error of the first stage.
    fn precision_ladder<S>(&self, distance: f64, stage: &S) -> Result<Geometry>
    where
        S: Fn(Option<PrecisionModel>) -> Result<Geometry>,
    {
        let first = match stage(None) {
            Err(err) if err.is_topology() => err,
            result => return result,
        };
        debug!(error = %first, "buffer at original precision failed");

        if let precision @ PrecisionModel::Fixed { .. } = self.geometry.precision_model() {
            return stage(Some(precision)).or_else(|err| match err.is_topology() {
                true => Err(first),
                false => Err(err),
            });
        }

        for digits in (MIN_PRECISION_DIGITS..=MAX_PRECISION_DIGITS).rev() {
            let precision = PrecisionModel::fixed(precision_scale(self.geometry, distance, digits));
            match stage(Some(precision)) {
                Err(err) if err.is_topology() => {
                    debug!(digits, error = %err, "buffer at reduced precision failed");
                }
                result => return result,
            }
        }

        warn!(error = %first, "buffer failed at every precision");
        Err(first)
    }
}

/// Returns the scale keeping the given number of significant digits for every ordinate of
/// the buffer.
fn precision_scale(geometry: &Geometry, distance: f64, digits: i32) -> f64 {
    let envelope = geometry.envelope();
    let magnitude = [envelope.min_x, envelope.max_x, envelope.min_y, envelope.max_y]
        .into_iter()
        .map(f64::abs)
        .fold(0.0, f64::max);

    let buffer_magnitude = magnitude + 2.0 * distance.max(0.0);
    let magnitude_digits = (buffer_magnitude.log10() + 1.0) as i32;
    10f64.powi(digits - magnitude_digits)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        algorithm::measure,
        coord,
        geom::{GeometryFactory, GeometryKind},
    };

    #[test]
    fn point_buffer_approximates_circle() {
        let factory = GeometryFactory::floating();
        let point = factory.point(coord!(0, 0));

        let buffer = BufferOp::new(&point)
            .with_params(BufferParameters::default().with_quadrant_segments(8))
            .result(1.0)
            .unwrap();

        let GeometryKind::Polygon(polygon) = buffer.kind() else {
            panic!("expected a polygon, got {}", buffer.geometry_type());
        };
        assert_eq!(polygon.shell().len() - 1, 32);
        assert!(polygon.holes().is_empty());

        let area = measure::area(&buffer);
        assert!((area - std::f64::consts::PI).abs() / std::f64::consts::PI < 0.02);
    }

    #[test]
    fn empty_buffers() {
        struct Test {
            name: &'static str,
            geometry: Geometry,
            distance: f64,
        }

        let factory = GeometryFactory::floating();
        vec![
            Test {
                name: "point at zero distance",
                geometry: factory.point(coord!(1, 1)),
                distance: 0.0,
            },
            Test {
                name: "line at negative distance",
                geometry: factory.line_string(vec![coord!(0, 0), coord!(1, 1)]).unwrap(),
                distance: -1.0,
            },
            Test {
                name: "empty polygon",
                geometry: factory.empty_polygon(),
                distance: 1.0,
            },
        ]
        .into_iter()
        .for_each(|test| {
            let buffer = BufferOp::new(&test.geometry).result(test.distance).unwrap();
            assert!(buffer.is_empty(), "{}", test.name);
            assert_eq!(buffer.geometry_type(), "Polygon", "{}", test.name);
        });
    }

    #[test]
    fn line_buffers() {
        struct Test {
            name: &'static str,
            params: BufferParameters,
            area: f64,
        }

        let factory = GeometryFactory::floating();
        let line = factory.line_string(vec![coord!(0, 0), coord!(10, 0)]).unwrap();

        vec![
            Test {
                name: "flat caps",
                params: BufferParameters::default().with_end_cap_style(EndCapStyle::Flat),
                area: 20.,
            },
            Test {
                name: "square caps",
                params: BufferParameters::default().with_end_cap_style(EndCapStyle::Square),
                area: 24.,
            },
        ]
        .into_iter()
        .for_each(|test| {
            let buffer = BufferOp::new(&line).with_params(test.params).result(1.0).unwrap();
            assert!((measure::area(&buffer) - test.area).abs() < 1e-9, "{}", test.name);
        });
    }

    #[test]
    fn overlapping_points_are_merged() {
        let factory = GeometryFactory::floating();
        let points = factory.multi_point(vec![
            crate::geom::Point::new(coord!(0, 0)),
            crate::geom::Point::new(coord!(1, 0)),
        ]);

        let buffer = BufferOp::new(&points).result(1.0).unwrap();
        assert_eq!(buffer.geometry_type(), "Polygon");

        let single = measure::area(&BufferOp::new(&factory.point(coord!(0, 0))).result(1.0).unwrap());
        let merged = measure::area(&buffer);
        assert!(merged > single && merged < 2.0 * single);
    }

    #[test]
    fn precision_scale_follows_magnitude() {
        let factory = GeometryFactory::floating();
        let point = factory.point(coord!(123.0, -45.0));

        // 123 + 2 has three digits
        assert_eq!(precision_scale(&point, 1.0, 12), 1e9);
        assert_eq!(precision_scale(&point, -1.0, 6), 1e3);
    }

    #[test]
    fn precision_fallback() {
        struct Test {
            name: &'static str,
            /// Stages at or above this scale fail, `None` if every stage fails.
            failing_from: Option<f64>,
            want_attempts: usize,
            want_ok: bool,
        }

        let factory = GeometryFactory::floating();
        let point = factory.point(coord!(123.0, -45.0));

        vec![
            Test {
                name: "recovers at 9 digits",
                failing_from: Some(1e7),
                want_attempts: 5,
                want_ok: true,
            },
            Test {
                name: "every precision fails",
                failing_from: None,
                want_attempts: 8,
                want_ok: false,
            },
        ]
        .into_iter()
        .for_each(|test| {
            let attempts = std::cell::RefCell::new(Vec::new());
            let op = BufferOp::new(&point);
            let result = op.precision_ladder(1.0, &|precision: Option<PrecisionModel>| {
                attempts.borrow_mut().push(precision);
                let fails = match (precision, test.failing_from) {
                    (_, None) | (None, _) => true,
                    (Some(precision), Some(scale)) => precision.scale() >= scale,
                };
                if fails {
                    return Err(GeometryError::topology(format!("failed at {precision:?}"), None));
                }
                BufferBuilder::new(BufferParameters::default())
                    .with_precision(precision.unwrap_or_default())
                    .buffer(&point, 1.0)
            });

            let attempts = attempts.into_inner();
            assert_eq!(attempts.len(), test.want_attempts, "{}", test.name);
            assert_eq!(attempts[0], None, "{}", test.name);
            let scales: Vec<f64> = attempts[1..].iter().flatten().map(|p| p.scale()).collect();
            assert!(scales.windows(2).all(|w| w[0] > w[1]), "{}: {scales:?}", test.name);

            match result {
                Ok(buffer) => {
                    assert!(test.want_ok, "{}", test.name);
                    assert_eq!(scales.last(), Some(&1e6), "{}", test.name);
                    buffer.for_each_coordinate(|c| {
                        let scaled = c.x * 1e6;
                        assert!((scaled.round() - scaled).abs() < 1e-6, "{}: {c}", test.name);
                    });
                }
                Err(err) => {
                    assert!(!test.want_ok, "{}", test.name);
                    assert_eq!(
                        err,
                        GeometryError::topology("failed at None", None),
                        "{}",
                        test.name
                    );
                }
            }
        });
    }

    #[test]
    fn non_finite_distance_is_rejected() {
        let factory = GeometryFactory::floating();
        let point = factory.point(coord!(0, 0));
        assert!(matches!(
            BufferOp::new(&point).result(f64::NAN),
            Err(GeometryError::IllegalArgument(_))
        ));
    }
}
