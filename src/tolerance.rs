//! Approximate comparison of ordinates and coordinates.

use num_traits::{Float, Signed};

/// A magnitude, stored as the absolute value of whatever it was built from.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct Positive<T>(T);

impl<T: Signed> From<T> for Positive<T> {
    fn from(value: T) -> Self {
        Self(value.abs())
    }
}

impl<T: Copy> Positive<T> {
    pub fn into_inner(self) -> T {
        self.0
    }
}

/// How far apart two ordinates may be and still compare as equal.
///
/// Two values match when their difference is within either bound: `absolute` covers
/// ordinates near the origin, `relative` scales with the larger magnitude. The default
/// only accepts exact equality.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct Tolerance<T> {
    pub relative: Positive<T>,
    pub absolute: Positive<T>,
}

impl<T> Tolerance<T>
where
    T: Signed + Copy,
{
    /// Accepts ordinates at most `distance` apart, as used by exact vertex comparison.
    pub fn absolute(distance: T) -> Self {
        Self {
            relative: Positive(T::zero()),
            absolute: distance.into(),
        }
    }

    /// Accepts ordinates differing by at most `fraction` of their magnitude.
    pub fn relative(fraction: T) -> Self {
        Self {
            relative: fraction.into(),
            absolute: Positive(T::zero()),
        }
    }

    pub fn with_absolute(self, distance: T) -> Self {
        Self {
            absolute: distance.into(),
            ..self
        }
    }

    /// Returns the absolute bound.
    pub fn distance(&self) -> T {
        self.absolute.0
    }
}

/// Equality up to a [`Tolerance`].
pub trait IsClose {
    type Scalar;

    fn is_close(&self, rhs: &Self, tolerance: &Tolerance<Self::Scalar>) -> bool;
}

impl<T: Float> IsClose for T {
    type Scalar = T;

    fn is_close(&self, rhs: &Self, tolerance: &Tolerance<T>) -> bool {
        let bound = T::max(
            tolerance.relative.0 * self.abs().max(rhs.abs()),
            tolerance.absolute.0,
        );
        (*self - *rhs).abs() <= bound
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coord;

    #[test]
    fn ordinates_are_close() {
        struct Test {
            name: &'static str,
            lhs: f64,
            rhs: f64,
            tolerance: Tolerance<f64>,
            want: bool,
        }

        vec![
            Test {
                name: "same ordinate",
                lhs: 3.5,
                rhs: 3.5,
                tolerance: Tolerance::default(),
                want: true,
            },
            Test {
                name: "default tolerance is exact",
                lhs: 3.5,
                rhs: 3.5 + f64::EPSILON * 4.,
                tolerance: Tolerance::default(),
                want: false,
            },
            Test {
                name: "snapped within grid size",
                lhs: 10.,
                rhs: 10.004,
                tolerance: Tolerance::absolute(0.005),
                want: true,
            },
            Test {
                name: "beyond grid size",
                lhs: 10.,
                rhs: 10.006,
                tolerance: Tolerance::absolute(0.005),
                want: false,
            },
            Test {
                name: "large ordinates within relative bound",
                lhs: 1e9,
                rhs: 1e9 + 5.,
                tolerance: Tolerance::relative(1e-8),
                want: true,
            },
            Test {
                name: "negative distance is a magnitude",
                lhs: -2.,
                rhs: -2.5,
                tolerance: Tolerance::absolute(-1.),
                want: true,
            },
        ]
        .into_iter()
        .for_each(|test| {
            let got = test.lhs.is_close(&test.rhs, &test.tolerance);
            assert_eq!(got, test.want, "{}", test.name);
        });
    }

    #[test]
    fn coordinates_compare_per_ordinate() {
        let tolerance = Tolerance::absolute(0.1);
        assert!(coord!(1, 1).is_close(&coord!(1.05, 0.95), &tolerance));
        assert!(!coord!(1, 1).is_close(&coord!(1.05, 1.2), &tolerance));
    }
}
