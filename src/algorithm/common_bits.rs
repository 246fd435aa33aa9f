//! Removal of the high-order bits shared by every ordinate of a set of geometries.
//!
//! Translating geometries by their common bits leaves more mantissa bits for the
//! fractional part of the ordinates, which can make overlay computations succeed on
//! inputs far from the origin.

use crate::geom::{Coordinate, Geometry};

/// The longest run of leading bits shared by a set of doubles.
#[derive(Debug, Default, Clone, Copy)]
pub struct CommonBits {
    bits: Option<u64>,
    sign_exp: u64,
}

impl CommonBits {
    pub fn add(&mut self, value: f64) {
        let bits = value.to_bits();
        let Some(common) = self.bits else {
            self.bits = Some(bits);
            self.sign_exp = bits >> 52;
            return;
        };

        if bits >> 52 != self.sign_exp {
            self.bits = Some(0);
            return;
        }

        let shared = common_mantissa_bits(common, bits);
        self.bits = Some(zero_lower_bits(common, 64 - (12 + shared)));
    }

    /// Returns the common bits as a double, zero if nothing has been added.
    pub fn common(&self) -> f64 {
        f64::from_bits(self.bits.unwrap_or(0))
    }
}

/// Returns how many of the most significant mantissa bits are equal.
fn common_mantissa_bits(a: u64, b: u64) -> u32 {
    let count = (0..=52u32)
        .rev()
        .take_while(|i| (a >> *i) & 1 == (b >> *i) & 1)
        .count();
    (count as u32).min(52)
}

fn zero_lower_bits(bits: u64, count: u32) -> u64 {
    if count >= 64 {
        return 0;
    }
    bits & !((1u64 << count) - 1)
}

/// Translates geometries so that the bits common to every ordinate are removed, and back.
#[derive(Debug, Default, Clone, Copy)]
pub struct CommonBitsRemover {
    x: CommonBits,
    y: CommonBits,
}

impl CommonBitsRemover {
    pub fn new() -> Self {
        Self::default()
    }

    /// Includes the ordinates of the geometry in the common bits.
    pub fn add(&mut self, geometry: &Geometry) {
        geometry.for_each_coordinate(|c| {
            self.x.add(c.x);
            self.y.add(c.y);
        });
    }

    /// Returns the translation removed by [`CommonBitsRemover::remove_common_bits`].
    pub fn common_coordinate(&self) -> Coordinate {
        Coordinate::new(self.x.common(), self.y.common())
    }

    /// Returns a copy of the geometry with the common bits removed.
    pub fn remove_common_bits(&self, geometry: &Geometry) -> Geometry {
        let common = self.common_coordinate();
        if common.x == 0.0 && common.y == 0.0 {
            return geometry.clone();
        }

        let mut moved = geometry.clone();
        moved.apply_coordinates(|c| {
            c.x -= common.x;
            c.y -= common.y;
        });
        moved
    }

    /// Adds the common bits back to a geometry computed from translated ones.
    pub fn add_common_bits(&self, geometry: &mut Geometry) {
        let common = self.common_coordinate();
        if common.x == 0.0 && common.y == 0.0 {
            return;
        }

        geometry.apply_coordinates(|c| {
            c.x += common.x;
            c.y += common.y;
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn common_bits_of_close_values() {
        let mut bits = CommonBits::default();
        bits.add(1000.5);
        bits.add(1000.25);
        bits.add(1001.0);
        let common = bits.common();
        assert!(common > 0.0 && common <= 1000.25, "common = {common}");
        assert!(1001.0 - common < 2.0);
    }

    #[test]
    fn no_common_bits_across_signs() {
        let mut bits = CommonBits::default();
        bits.add(10.0);
        bits.add(-10.0);
        assert_eq!(bits.common(), 0.0);
    }
}
