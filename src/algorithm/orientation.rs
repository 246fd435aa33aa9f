//! Robust orientation of a point relative to a directed line.
//!
//! The determinant is first evaluated in plain doubles together with a dynamic error
//! bound; only when its sign cannot be trusted it is recomputed in double-double
//! arithmetic.

use crate::{
    algorithm::dd::DD,
    error::{GeometryError, Result},
    geom::Coordinate,
};

/// Relative error bound of the filtered determinant.
const DP_SAFE_EPSILON: f64 = 1e-15;

/// Where a point lies relative to a directed line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Orientation {
    /// To the left, counter-clockwise turn.
    Left,
    /// To the right, clockwise turn.
    Right,
    Collinear,
}

impl Orientation {
    pub const COUNTER_CLOCKWISE: Orientation = Orientation::Left;
    pub const CLOCKWISE: Orientation = Orientation::Right;

    /// Returns the orientation of `q` relative to the directed line `p1`-`p2`.
    ///
    /// Total over finite input; use [`orientation_index`] to reject non-finite ordinates.
    pub fn of(p1: &Coordinate, p2: &Coordinate, q: &Coordinate) -> Self {
        Self::from_index(index(p1, p2, q))
    }

    /// Returns +1, -1 or 0.
    pub fn value(&self) -> i32 {
        match self {
            Orientation::Left => 1,
            Orientation::Right => -1,
            Orientation::Collinear => 0,
        }
    }

    pub fn from_index(value: i32) -> Self {
        match value.signum() {
            1 => Orientation::Left,
            -1 => Orientation::Right,
            _ => Orientation::Collinear,
        }
    }

    pub fn reversed(self) -> Self {
        match self {
            Orientation::Left => Orientation::Right,
            Orientation::Right => Orientation::Left,
            Orientation::Collinear => Orientation::Collinear,
        }
    }
}

/// Returns the orientation index of `q` relative to the directed line `p1`-`p2`:
/// `1` left, `-1` right, `0` collinear.
///
/// Fails if any ordinate is not finite.
pub fn orientation_index(p1: &Coordinate, p2: &Coordinate, q: &Coordinate) -> Result<i32> {
    if let Some(invalid) = [p1, p2, q].into_iter().find(|c| !c.is_valid()) {
        return Err(GeometryError::illegal(format!(
            "non-finite coordinate in orientation test: {invalid}"
        )));
    }

    Ok(index(p1, p2, q))
}

pub(crate) fn index(p1: &Coordinate, p2: &Coordinate, q: &Coordinate) -> i32 {
    if let Some(sign) = index_filter(p1, p2, q) {
        return sign;
    }

    let dx1 = DD::from(p2.x) - p1.x;
    let dy1 = DD::from(p2.y) - p1.y;
    let dx2 = DD::from(q.x) - p2.x;
    let dy2 = DD::from(q.y) - p2.y;

    DD::determinant(dx1, dy1, dx2, dy2).signum()
}

/// Returns the sign of the determinant if it can be decided in double precision.
fn index_filter(pa: &Coordinate, pb: &Coordinate, pc: &Coordinate) -> Option<i32> {
    let det_left = (pa.x - pc.x) * (pb.y - pc.y);
    let det_right = (pa.y - pc.y) * (pb.x - pc.x);
    let det = det_left - det_right;

    let det_sum = if det_left > 0. {
        if det_right <= 0. {
            return Some(signum(det));
        }
        det_left + det_right
    } else if det_left < 0. {
        if det_right >= 0. {
            return Some(signum(det));
        }
        -det_left - det_right
    } else {
        return Some(signum(det));
    };

    let err_bound = DP_SAFE_EPSILON * det_sum;
    if det >= err_bound || -det >= err_bound {
        return Some(signum(det));
    }

    None
}

fn signum(x: f64) -> i32 {
    if x > 0. {
        1
    } else if x < 0. {
        -1
    } else {
        0
    }
}

/// Returns the sign of the determinant of the 2x2 matrix `[[x1, y1], [x2, y2]]`, computed
/// exactly enough to be trusted.
pub fn sign_of_det2x2(x1: f64, y1: f64, x2: f64, y2: f64) -> i32 {
    DD::determinant(x1.into(), y1.into(), x2.into(), y2.into()).signum()
}

/// Returns true if the given closed ring is oriented counter-clockwise.
///
/// Rings with fewer than 3 distinct vertices are reported as not counter-clockwise.
pub fn is_ccw(ring: &[Coordinate]) -> bool {
    if ring.len() < 4 {
        return false;
    }

    let points = ring.len() - 1;

    let (hi_index, hi) = ring[..points]
        .iter()
        .enumerate()
        .fold((0, ring[0]), |(index, hi), (i, c)| {
            if c.y > hi.y { (i, *c) } else { (index, hi) }
        });

    let mut prev = hi_index;
    loop {
        prev = if prev == 0 { points - 1 } else { prev - 1 };
        if ring[prev] != hi || prev == hi_index {
            break;
        }
    }

    let mut next = hi_index;
    loop {
        next = (next + 1) % points;
        if ring[next] != hi || next == hi_index {
            break;
        }
    }

    let (prev, next) = (ring[prev], ring[next]);
    if prev == hi || next == hi || prev == next {
        return false;
    }

    match Orientation::of(&prev, &hi, &next) {
        Orientation::Collinear => prev.x > next.x,
        orientation => orientation == Orientation::Left,
    }
}

/// Returns the signed area of a ring, positive when it is oriented clockwise.
pub fn signed_ring_area(ring: &[Coordinate]) -> f64 {
    if ring.len() < 3 {
        return 0.;
    }

    let x0 = ring[0].x;
    let sum: f64 = (1..ring.len() - 1)
        .map(|i| {
            let x = ring[i].x - x0;
            x * (ring[i - 1].y - ring[i + 1].y)
        })
        .sum();

    sum / 2.
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coord;

    #[test]
    fn orientation_of_simple_points() {
        struct Test {
            name: &'static str,
            points: [Coordinate; 3],
            want: i32,
        }

        vec![
            Test {
                name: "left of the line",
                points: [coord!(0, 0), coord!(1, 0), coord!(0.5, 1)],
                want: 1,
            },
            Test {
                name: "right of the line",
                points: [coord!(0, 0), coord!(1, 0), coord!(0.5, -1)],
                want: -1,
            },
            Test {
                name: "on the line",
                points: [coord!(0, 0), coord!(1, 0), coord!(0.5, 0)],
                want: 0,
            },
            Test {
                name: "degenerate line",
                points: [coord!(1, 1), coord!(1, 1), coord!(3, 2)],
                want: 0,
            },
        ]
        .into_iter()
        .for_each(|test| {
            let [p1, p2, q] = test.points;
            assert_eq!(orientation_index(&p1, &p2, &q).unwrap(), test.want, "{}", test.name);
        });
    }

    #[test]
    fn near_collinear_points_are_decided_exactly() {
        // A classic failure case of the naive determinant.
        let p1 = coord!(0.5, 0.5);
        let p2 = coord!(12., 12.);
        let q = coord!(24., 24.);
        assert_eq!(Orientation::of(&p1, &p2, &q), Orientation::Collinear);

        let q = coord!(24.00000000000001, 24.);
        assert_eq!(Orientation::of(&p1, &p2, &q), Orientation::Right);
    }

    #[test]
    fn non_finite_input_is_rejected() {
        let err = orientation_index(&coord!(0, 0), &coord!(f64::NAN, 0), &coord!(1, 1));
        assert!(matches!(err, Err(GeometryError::IllegalArgument(_))));
        let err = orientation_index(&coord!(0, 0), &coord!(1, 0), &coord!(f64::INFINITY, 1));
        assert!(err.is_err());
    }

    #[test]
    fn ring_orientation() {
        let ccw = [coord!(0, 0), coord!(4, 0), coord!(4, 4), coord!(0, 4), coord!(0, 0)];
        assert!(is_ccw(&ccw));
        let mut cw = ccw;
        cw.reverse();
        assert!(!is_ccw(&cw));
        assert_eq!(signed_ring_area(&cw), 16.);
        assert_eq!(signed_ring_area(&ccw), -16.);
    }
}
