//! An overlay that retries with conditioned inputs when the topology cannot be built.
//!
//! The [robust](super::robust) ladder is tried first. On a topology failure, the classic
//! graph noding is tried on the inputs as given, then translated by their common bits,
//! then snapped to each other, and finally rounded to coarser and coarser grids. The
//! first stage to succeed wins; if none does, the first failure is returned.

use tracing::{debug, warn};

use crate::{
    algorithm::common_bits::CommonBitsRemover,
    error::{GeometryError, Result},
    geom::{Geometry, GeometryFactory, PrecisionModel},
    operation::overlay::{
        OpCode, OverlayOp, robust,
        snap::{self, PrecisionReducer},
    },
};

/// The most significant digits tried by the precision reduction stage.
const MAX_PRECISION_DIGITS: i32 = 16;

/// Computes the overlay of two geometries with every retry stage available.
pub fn overlay(g0: &Geometry, g1: &Geometry, op: OpCode) -> Result<Geometry> {
    let first = match robust::overlay(g0, g1, op) {
        Ok(result) => return Ok(result),
        Err(err) if err.is_topology() => err,
        Err(err) => return Err(err),
    };
    debug!(?op, error = %first, "robust overlay failed, trying heuristics");

    let stages: [(&str, fn(&Geometry, &Geometry, OpCode) -> Result<Geometry>); 4] = [
        ("original", classic),
        ("common bits", common_bits),
        ("snapping", snapping),
        ("precision reduction", precision_reduction),
    ];

    for (stage, overlay) in stages {
        match overlay(g0, g1, op) {
            Ok(result) => {
                debug!(?op, stage, "heuristic overlay succeeded");
                return Ok(result);
            }
            Err(err) if err.is_topology() => debug!(?op, stage, error = %err, "stage failed"),
            Err(err) => return Err(err),
        }
    }

    warn!(?op, error = %first, "every heuristic failed");
    Err(first)
}

fn classic(g0: &Geometry, g1: &Geometry, op: OpCode) -> Result<Geometry> {
    OverlayOp::new(g0, g1).result(op)
}

fn common_bits(g0: &Geometry, g1: &Geometry, op: OpCode) -> Result<Geometry> {
    let mut remover = CommonBitsRemover::new();
    remover.add(g0);
    remover.add(g1);

    let mut result = classic(
        &remover.remove_common_bits(g0),
        &remover.remove_common_bits(g1),
        op,
    )?;
    remover.add_common_bits(&mut result);
    Ok(result)
}

fn snapping(g0: &Geometry, g1: &Geometry, op: OpCode) -> Result<Geometry> {
    let tolerance = snap::overlay_snap_tolerance_of(g0, g1);

    let mut remover = CommonBitsRemover::new();
    remover.add(g0);
    remover.add(g1);

    let (snapped0, snapped1) = snap::snap(
        &remover.remove_common_bits(g0),
        &remover.remove_common_bits(g1),
        tolerance,
    );
    let mut result = classic(&snapped0, &snapped1, op)?;
    remover.add_common_bits(&mut result);
    Ok(result)
}

/// Rounds both inputs to grids of decreasing precision, from 10^16 down to unit cells.
fn precision_reduction(g0: &Geometry, g1: &Geometry, op: OpCode) -> Result<Geometry> {
    let mut last = None;
    for digits in (0..=MAX_PRECISION_DIGITS).rev() {
        let precision = PrecisionModel::fixed(10f64.powi(digits));
        let factory = GeometryFactory::new(precision, g0.srid());
        let reducer = PrecisionReducer::new(precision).with_factory(factory);

        match classic(&reducer.reduce(g0), &reducer.reduce(g1), op) {
            Ok(result) => {
                debug!(digits, "reduced precision overlay succeeded");
                return Ok(g0.factory().from_kind(result.into_kind()));
            }
            Err(err) if err.is_topology() => last = Some(err),
            Err(err) => return Err(err),
        }
    }

    Err(last.unwrap_or_else(|| GeometryError::topology("precision reduction exhausted", None)))
}
