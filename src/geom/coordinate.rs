use std::{cmp::Ordering, fmt};

use crate::tolerance::{IsClose, Tolerance};

/// A location in the plane, optionally carrying an elevation.
///
/// Equality and ordering only account for the `x` and `y` ordinates; `z` is informational and
/// `NaN` when absent.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Coordinate {
    /// The horizontal ordinate.
    pub x: f64,
    /// The vertical ordinate.
    pub y: f64,
    /// The elevation, `NaN` if absent.
    pub z: f64,
}

impl Coordinate {
    /// The coordinate representing an absent location.
    pub const NULL: Coordinate = Coordinate {
        x: f64::NAN,
        y: f64::NAN,
        z: f64::NAN,
    };

    /// Returns a new 2D coordinate.
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y, z: f64::NAN }
    }

    /// Returns a new 3D coordinate.
    pub const fn new_xyz(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Returns true if, and only if, this coordinate represents an absent location.
    pub fn is_null(&self) -> bool {
        self.x.is_nan() || self.y.is_nan()
    }

    /// Returns true if, and only if, both planar ordinates are finite.
    pub fn is_valid(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Returns true if this coordinate carries an elevation.
    pub fn has_z(&self) -> bool {
        !self.z.is_nan()
    }

    /// Returns the elevation, if any.
    pub fn z(&self) -> Option<f64> {
        self.has_z().then_some(self.z)
    }

    /// Returns self with the given elevation.
    pub fn with_z(self, z: f64) -> Self {
        Self { z, ..self }
    }

    /// Returns true if both planar ordinates are equal.
    pub fn equals_2d(&self, other: &Coordinate) -> bool {
        self.x == other.x && self.y == other.y
    }

    /// Returns true if all ordinates are equal, treating two absent elevations as equal.
    pub fn equals_3d(&self, other: &Coordinate) -> bool {
        self.equals_2d(other) && (self.z == other.z || (self.z.is_nan() && other.z.is_nan()))
    }

    /// Returns the planar euclidean distance to other.
    pub fn distance(&self, other: &Coordinate) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Returns the euclidean distance to other, accounting for elevation when both have one.
    pub fn distance_3d(&self, other: &Coordinate) -> f64 {
        let dz = if self.has_z() && other.has_z() {
            self.z - other.z
        } else {
            0.
        };
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2) + dz.powi(2)).sqrt()
    }

    /// Returns the middle point between self and other.
    pub fn midpoint(&self, other: &Coordinate) -> Coordinate {
        Coordinate::new((self.x + other.x) / 2., (self.y + other.y) / 2.)
    }

    /// Compares the planar ordinates lexicographically, `x` first.
    pub fn compare_2d(&self, other: &Coordinate) -> Ordering {
        compare_ordinate(self.x, other.x).then_with(|| compare_ordinate(self.y, other.y))
    }
}

fn compare_ordinate(a: f64, b: f64) -> Ordering {
    a.partial_cmp(&b).unwrap_or_else(|| a.total_cmp(&b))
}

impl Default for Coordinate {
    fn default() -> Self {
        Self::new(0., 0.)
    }
}

impl PartialEq for Coordinate {
    fn eq(&self, other: &Self) -> bool {
        self.compare_2d(other) == Ordering::Equal
    }
}

impl Eq for Coordinate {}

impl PartialOrd for Coordinate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Coordinate {
    fn cmp(&self, other: &Self) -> Ordering {
        self.compare_2d(other)
    }
}

impl From<[f64; 2]> for Coordinate {
    fn from([x, y]: [f64; 2]) -> Self {
        Self::new(x, y)
    }
}

impl From<[f64; 3]> for Coordinate {
    fn from([x, y, z]: [f64; 3]) -> Self {
        Self::new_xyz(x, y, z)
    }
}

impl From<(f64, f64)> for Coordinate {
    fn from((x, y): (f64, f64)) -> Self {
        Self::new(x, y)
    }
}

impl IsClose for Coordinate {
    type Scalar = f64;

    fn is_close(&self, rhs: &Self, tolerance: &Tolerance<f64>) -> bool {
        self.x.is_close(&rhs.x, tolerance) && self.y.is_close(&rhs.y, tolerance)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.has_z() {
            write!(f, "{} {} {}", self.x, self.y, self.z)
        } else {
            write!(f, "{} {}", self.x, self.y)
        }
    }
}

/// A constructor macro for [`Coordinate`].
#[macro_export]
macro_rules! coord {
    ($x:expr, $y:expr) => {
        $crate::geom::Coordinate::new($x as f64, $y as f64)
    };
    ($x:expr, $y:expr, $z:expr) => {
        $crate::geom::Coordinate::new_xyz($x as f64, $y as f64, $z as f64)
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equality_ignores_elevation() {
        let a = Coordinate::new_xyz(1., 2., 3.);
        let b = Coordinate::new(1., 2.);
        assert_eq!(a, b);
        assert!(!a.equals_3d(&b));
        assert!(Coordinate::new(0., 0.).equals_3d(&Coordinate::new(-0., 0.)));
    }

    #[test]
    fn ordering_is_x_then_y() {
        let mut coords = vec![coord!(1, 1), coord!(0, 2), coord!(1, 0), coord!(0, 1)];
        coords.sort();
        assert_eq!(coords, vec![coord!(0, 1), coord!(0, 2), coord!(1, 0), coord!(1, 1)]);
    }

    #[test]
    fn null_coordinate() {
        assert!(Coordinate::NULL.is_null());
        assert!(!Coordinate::NULL.is_valid());
        assert!(!coord!(1, 1).is_null());
        assert!(!coord!(f64::INFINITY, 1).is_valid());
    }
}
