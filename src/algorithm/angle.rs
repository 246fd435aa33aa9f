//! Angles and quadrants of vectors.

use std::f64::consts::PI;

use crate::geom::Coordinate;

pub const PI_TIMES_2: f64 = 2.0 * PI;
pub const PI_OVER_2: f64 = PI / 2.0;
pub const PI_OVER_4: f64 = PI / 4.0;

/// Returns the angle of the vector from p0 to p1, in radians in (-π, π].
pub fn angle(p0: &Coordinate, p1: &Coordinate) -> f64 {
    (p1.y - p0.y).atan2(p1.x - p0.x)
}

/// Returns the unoriented smallest angle between the vectors tip1-tail and tip2-tail.
pub fn angle_between(tip1: &Coordinate, tail: &Coordinate, tip2: &Coordinate) -> f64 {
    let a1 = angle(tail, tip1);
    let a2 = angle(tail, tip2);
    diff(a1, a2)
}

/// Returns the oriented smallest angle between the vectors tip1-tail and tip2-tail,
/// positive if tip2 is counter-clockwise from tip1.
pub fn angle_between_oriented(tip1: &Coordinate, tail: &Coordinate, tip2: &Coordinate) -> f64 {
    let delta = angle(tail, tip2) - angle(tail, tip1);
    if delta <= -PI {
        delta + PI_TIMES_2
    } else if delta > PI {
        delta - PI_TIMES_2
    } else {
        delta
    }
}

/// Returns the smallest difference between two angles, in [0, π].
pub fn diff(a1: f64, a2: f64) -> f64 {
    let delta = (a1 - a2).abs();
    if delta > PI {
        PI_TIMES_2 - delta
    } else {
        delta
    }
}

/// Normalizes an angle to (-π, π].
pub fn normalize(mut angle: f64) -> f64 {
    while angle > PI {
        angle -= PI_TIMES_2;
    }
    while angle <= -PI {
        angle += PI_TIMES_2;
    }
    angle
}

/// Normalizes an angle to [0, 2π).
pub fn normalize_positive(mut angle: f64) -> f64 {
    if angle < 0.0 {
        while angle < 0.0 {
            angle += PI_TIMES_2;
        }
        if angle >= PI_TIMES_2 {
            angle = 0.0;
        }
    } else {
        while angle >= PI_TIMES_2 {
            angle -= PI_TIMES_2;
        }
    }
    angle
}

/// Quadrants are numbered counter-clockwise starting at the north-east one.
///
/// ```text
///  1 | 0
///  --+--
///  2 | 3
/// ```
pub mod quadrant {
    use crate::{
        error::{GeometryError, Result},
        geom::Coordinate,
    };

    pub const NE: u8 = 0;
    pub const NW: u8 = 1;
    pub const SW: u8 = 2;
    pub const SE: u8 = 3;

    /// Returns the quadrant of a non-zero direction vector.
    pub fn of(dx: f64, dy: f64) -> Result<u8> {
        if dx == 0.0 && dy == 0.0 {
            return Err(GeometryError::illegal(format!(
                "cannot compute the quadrant for point ({dx} {dy})"
            )));
        }

        Ok(of_unchecked(dx, dy))
    }

    /// Returns the quadrant of a direction vector, taking zero as positive.
    pub fn of_unchecked(dx: f64, dy: f64) -> u8 {
        match (dx >= 0.0, dy >= 0.0) {
            (true, true) => NE,
            (false, true) => NW,
            (false, false) => SW,
            (true, false) => SE,
        }
    }

    /// Returns the quadrant of the vector from p0 to p1.
    pub fn of_segment(p0: &Coordinate, p1: &Coordinate) -> Result<u8> {
        if p0.x == p1.x && p0.y == p1.y {
            return Err(GeometryError::illegal(format!(
                "cannot compute the quadrant for two identical points {p0}"
            )));
        }

        Ok(of_unchecked(p1.x - p0.x, p1.y - p0.y))
    }

    /// Returns true if the quadrants are opposite each other.
    pub fn is_opposite(q1: u8, q2: u8) -> bool {
        q1 != q2 && (q1 + 2) % 4 == q2
    }

    /// Returns true if the given quadrant lies in the northern half plane.
    pub fn is_northern(quad: u8) -> bool {
        quad == NE || quad == NW
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coord;

    #[test]
    fn angles() {
        let origin = coord!(0, 0);
        assert!((angle(&origin, &coord!(1, 1)) - PI_OVER_4).abs() < 1e-12);
        assert!((angle_between(&coord!(1, 0), &origin, &coord!(0, 1)) - PI_OVER_2).abs() < 1e-12);
        assert!(
            (angle_between_oriented(&coord!(0, 1), &origin, &coord!(1, 0)) + PI_OVER_2).abs()
                < 1e-12
        );
    }

    #[test]
    fn normalization() {
        assert!((normalize(3.0 * PI) - PI).abs() < 1e-12);
        assert!((normalize_positive(-PI_OVER_2) - 1.5 * PI).abs() < 1e-12);
    }

    #[test]
    fn quadrants() {
        assert_eq!(quadrant::of(1., 1.).unwrap(), quadrant::NE);
        assert_eq!(quadrant::of(-1., 0.).unwrap(), quadrant::NW);
        assert_eq!(quadrant::of(-1., -1.).unwrap(), quadrant::SW);
        assert_eq!(quadrant::of(0., -1.).unwrap(), quadrant::SE);
        assert!(quadrant::of(0., 0.).is_err());
        assert!(quadrant::is_opposite(quadrant::NE, quadrant::SW));
    }
}
