//! Double-double arithmetic.
//!
//! A [`DD`] holds a value as the unevaluated sum of two doubles, `hi + lo` with
//! `|lo| <= ulp(hi) / 2`, giving about 106 bits of mantissa.

use std::ops::{Add, Div, Mul, Neg, Sub};

use num_traits::{One, Zero};

/// An extended precision value.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct DD {
    hi: f64,
    lo: f64,
}

/// Returns `(s, e)` with `s = fl(a + b)` and `a + b = s + e` exactly.
fn two_sum(a: f64, b: f64) -> (f64, f64) {
    let s = a + b;
    let bb = s - a;
    let e = (a - (s - bb)) + (b - bb);
    (s, e)
}

/// Same as [`two_sum`], requiring `|a| >= |b|`.
fn quick_two_sum(a: f64, b: f64) -> (f64, f64) {
    let s = a + b;
    let e = b - (s - a);
    (s, e)
}

/// Returns `(p, e)` with `p = fl(a * b)` and `a * b = p + e` exactly.
fn two_prod(a: f64, b: f64) -> (f64, f64) {
    let p = a * b;
    let e = a.mul_add(b, -p);
    (p, e)
}

impl From<f64> for DD {
    fn from(value: f64) -> Self {
        Self { hi: value, lo: 0. }
    }
}

impl DD {
    pub fn new(hi: f64, lo: f64) -> Self {
        let (hi, lo) = two_sum(hi, lo);
        Self { hi, lo }
    }

    pub fn hi(&self) -> f64 {
        self.hi
    }

    pub fn lo(&self) -> f64 {
        self.lo
    }

    /// Returns the closest double to self.
    pub fn to_f64(&self) -> f64 {
        self.hi + self.lo
    }

    pub fn is_nan(&self) -> bool {
        self.hi.is_nan()
    }

    /// Returns -1, 0 or 1 following the sign of the represented value.
    pub fn signum(&self) -> i32 {
        if self.hi > 0. {
            1
        } else if self.hi < 0. {
            -1
        } else if self.lo > 0. {
            1
        } else if self.lo < 0. {
            -1
        } else {
            0
        }
    }

    pub fn abs(self) -> Self {
        if self.signum() < 0 { -self } else { self }
    }

    pub fn sqr(self) -> Self {
        self * self
    }

    /// Returns the determinant `x1 * y2 - y1 * x2`.
    pub fn determinant(x1: DD, y1: DD, x2: DD, y2: DD) -> DD {
        x1 * y2 - y1 * x2
    }
}

impl Neg for DD {
    type Output = DD;

    fn neg(self) -> DD {
        DD {
            hi: -self.hi,
            lo: -self.lo,
        }
    }
}

impl Add for DD {
    type Output = DD;

    fn add(self, rhs: DD) -> DD {
        let (s, e) = two_sum(self.hi, rhs.hi);
        let (t, f) = two_sum(self.lo, rhs.lo);
        let (s, e) = quick_two_sum(s, e + t);
        let (hi, lo) = quick_two_sum(s, e + f);
        DD { hi, lo }
    }
}

impl Add<f64> for DD {
    type Output = DD;

    fn add(self, rhs: f64) -> DD {
        let (s, e) = two_sum(self.hi, rhs);
        let (hi, lo) = quick_two_sum(s, e + self.lo);
        DD { hi, lo }
    }
}

impl Sub for DD {
    type Output = DD;

    fn sub(self, rhs: DD) -> DD {
        self + (-rhs)
    }
}

impl Sub<f64> for DD {
    type Output = DD;

    fn sub(self, rhs: f64) -> DD {
        self + (-rhs)
    }
}

impl Mul for DD {
    type Output = DD;

    fn mul(self, rhs: DD) -> DD {
        let (p, e) = two_prod(self.hi, rhs.hi);
        let e = e + (self.hi * rhs.lo + self.lo * rhs.hi);
        let (hi, lo) = quick_two_sum(p, e);
        DD { hi, lo }
    }
}

impl Mul<f64> for DD {
    type Output = DD;

    fn mul(self, rhs: f64) -> DD {
        self * DD::from(rhs)
    }
}

impl Div for DD {
    type Output = DD;

    fn div(self, rhs: DD) -> DD {
        let q1 = self.hi / rhs.hi;
        let r = self - rhs * q1;
        let q2 = r.hi / rhs.hi;
        let r = r - rhs * q2;
        let q3 = r.hi / rhs.hi;
        let (hi, lo) = quick_two_sum(q1, q2);
        DD { hi, lo } + q3
    }
}

impl Div<f64> for DD {
    type Output = DD;

    fn div(self, rhs: f64) -> DD {
        self / DD::from(rhs)
    }
}

impl Zero for DD {
    fn zero() -> Self {
        DD::from(0.)
    }

    fn is_zero(&self) -> bool {
        self.hi == 0. && self.lo == 0.
    }
}

impl One for DD {
    fn one() -> Self {
        DD::from(1.)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_bits_lost_by_doubles() {
        let tiny = 1e-20;
        let sum = DD::from(1.) + tiny;
        assert_eq!(1. + tiny, 1.);
        assert_eq!((sum - 1.).to_f64(), tiny);
    }

    #[test]
    fn exact_products() {
        let a = DD::from(1. + f64::EPSILON);
        let square = a * a;
        // (1 + e)^2 = 1 + 2e + e^2, where e^2 does not fit in a double.
        let rest = square - DD::from(1.) - DD::from(2. * f64::EPSILON);
        assert_eq!(rest.to_f64(), f64::EPSILON * f64::EPSILON);
    }

    #[test]
    fn division() {
        let third = DD::one() / 3.;
        let back = third * 3.;
        assert!((back - 1.).abs().to_f64() < 1e-30);
    }

    #[test]
    fn signum() {
        assert_eq!(DD::new(0., -1e-300).signum(), -1);
        assert_eq!(DD::zero().signum(), 0);
        assert_eq!(DD::from(2.).signum(), 1);
    }
}
