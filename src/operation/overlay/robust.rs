//! The default overlay: a ladder of noding strategies tried in order of increasing
//! robustness until one yields a consistent topology.
//!
//! 1. Floating noding, validated.
//! 2. Snapping noding, with a tolerance growing tenfold on each try. Each try also
//!    snaps every input to itself before overlaying.
//! 3. Snap rounding to a grid fine enough for the magnitude of the inputs.
//!
//! Inputs with a fixed precision model are snap rounded to it directly.

use tracing::{debug, instrument, warn};

use crate::{
    error::Result,
    geom::{Geometry, PrecisionModel},
    operation::overlay::{
        NodingStrategy, OpCode, OverlayOp, OverlayOptions, snap::PrecisionReducer, unary,
    },
};

/// How many times the snapping tolerance grows before giving up on snapping.
const SNAP_TRIES: usize = 5;

/// Ratio of the ordinate magnitude to the initial snapping tolerance.
const SNAP_TOLERANCE_FACTOR: f64 = 1e12;

/// Significant digits kept when snap rounding.
const MAX_ROBUST_DIGITS: i32 = 14;

/// Computes the overlay of two geometries.
#[instrument(level = "debug", skip(g0, g1))]
pub fn overlay(g0: &Geometry, g1: &Geometry, op: OpCode) -> Result<Geometry> {
    overlay_ladder(g0, g1, op, &overlay_with)
}

/// Climbs the ladder, running each stage through `stage`. Fails with the error of the
/// floating stage if no stage succeeds.
fn overlay_ladder<S>(g0: &Geometry, g1: &Geometry, op: OpCode, stage: &S) -> Result<Geometry>
where
    S: Fn(&Geometry, &Geometry, OpCode, NodingStrategy) -> Result<Geometry>,
{
    let precision = g0.precision_model();
    if !precision.is_floating() {
        return stage(g0, g1, op, NodingStrategy::SnapRounding { precision });
    }

    let first = match stage(g0, g1, op, NodingStrategy::Floating) {
        Ok(result) => return Ok(result),
        Err(err) if err.is_topology() => err,
        Err(err) => return Err(err),
    };
    debug!(?op, error = %first, "floating overlay failed");

    if let Some(result) = overlay_snap_tries(g0, g1, op, stage)? {
        return Ok(result);
    }

    let precision = robust_precision(&[g0, g1]);
    let reducer = PrecisionReducer::new(precision);
    let (r0, r1) = (reducer.reduce(g0), reducer.reduce(g1));
    if let Some(result) = attempt(stage(&r0, &r1, op, NodingStrategy::SnapRounding { precision }))? {
        debug!(?op, scale = precision.scale(), "snap-rounded overlay succeeded");
        return Ok(result);
    }

    warn!(?op, error = %first, "every overlay strategy failed");
    Err(first)
}

/// Nodes and dissolves a single geometry with the same ladder as [`overlay`].
pub fn overlay_unary(geometry: &Geometry) -> Result<Geometry> {
    let precision = geometry.precision_model();
    if !precision.is_floating() {
        return unary_with(geometry, NodingStrategy::SnapRounding { precision });
    }

    let first = match unary_with(geometry, NodingStrategy::Floating) {
        Ok(result) => return Ok(result),
        Err(err) if err.is_topology() => err,
        Err(err) => return Err(err),
    };
    debug!(error = %first, "floating unary union failed");

    let mut tolerance = snap_tolerance(&[geometry]);
    for _ in 0..SNAP_TRIES {
        if let Some(result) = attempt(unary_with(geometry, NodingStrategy::Snapping { tolerance }))? {
            return Ok(result);
        }
        tolerance *= 10.;
    }

    let precision = robust_precision(&[geometry]);
    let reduced = PrecisionReducer::new(precision).reduce(geometry);
    if let Some(result) = attempt(unary_with(&reduced, NodingStrategy::SnapRounding { precision }))? {
        return Ok(result);
    }

    warn!(error = %first, "every unary union strategy failed");
    Err(first)
}

fn overlay_with(g0: &Geometry, g1: &Geometry, op: OpCode, noding: NodingStrategy) -> Result<Geometry> {
    OverlayOp::new(g0, g1)
        .with_options(OverlayOptions::default().with_noding(noding))
        .result(op)
}

fn unary_with(geometry: &Geometry, noding: NodingStrategy) -> Result<Geometry> {
    unary(geometry, OverlayOptions::default().with_noding(noding))
}

fn overlay_snap_tries<S>(g0: &Geometry, g1: &Geometry, op: OpCode, stage: &S) -> Result<Option<Geometry>>
where
    S: Fn(&Geometry, &Geometry, OpCode, NodingStrategy) -> Result<Geometry>,
{
    let mut tolerance = snap_tolerance(&[g0, g1]);
    for _ in 0..SNAP_TRIES {
        let snapping = NodingStrategy::Snapping { tolerance };
        if let Some(result) = attempt(stage(g0, g1, op, snapping))? {
            debug!(?op, tolerance, "snapping overlay succeeded");
            return Ok(Some(result));
        }

        // self-snapping removes near-coincident vertices within each input
        let snapped = unary_with(g0, snapping)
            .and_then(|snapped0| Ok((snapped0, unary_with(g1, snapping)?)))
            .and_then(|(snapped0, snapped1)| stage(&snapped0, &snapped1, op, snapping));
        if let Some(result) = attempt(snapped)? {
            debug!(?op, tolerance, "self-snapped overlay succeeded");
            return Ok(Some(result));
        }

        tolerance *= 10.;
    }

    Ok(None)
}

/// Turns a topology failure into `None`, propagating any other error.
fn attempt(result: Result<Geometry>) -> Result<Option<Geometry>> {
    match result {
        Ok(geometry) => Ok(Some(geometry)),
        Err(err) if err.is_topology() => {
            debug!(error = %err, "overlay attempt failed");
            Ok(None)
        }
        Err(err) => Err(err),
    }
}

/// Returns the largest absolute value of the envelope bounds of the geometries.
fn ordinate_magnitude(geometries: &[&Geometry]) -> f64 {
    geometries
        .iter()
        .map(|geometry| geometry.envelope())
        .filter(|envelope| !envelope.is_null())
        .flat_map(|envelope| {
            [envelope.min_x, envelope.max_x, envelope.min_y, envelope.max_y].map(f64::abs)
        })
        .fold(0., f64::max)
}

fn snap_tolerance(geometries: &[&Geometry]) -> f64 {
    ordinate_magnitude(geometries) / SNAP_TOLERANCE_FACTOR
}

/// Returns a fixed precision model keeping [`MAX_ROBUST_DIGITS`] significant digits for
/// the largest ordinate of the geometries.
fn robust_precision(geometries: &[&Geometry]) -> PrecisionModel {
    let magnitude = ordinate_magnitude(geometries);
    let digits = if magnitude > 0. {
        (magnitude.log10() + 1.) as i32
    } else {
        0
    };

    PrecisionModel::fixed(10f64.powi(MAX_ROBUST_DIGITS - digits))
}
