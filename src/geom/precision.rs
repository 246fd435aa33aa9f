use std::cmp::Ordering;

use crate::geom::Coordinate;

/// How coordinates are rounded when written.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PrecisionModel {
    /// Full double precision, no rounding.
    #[default]
    Floating,
    /// Coordinates are rounded to a grid of cell size `1 / scale`.
    Fixed { scale: f64 },
}

impl PrecisionModel {
    /// Returns a fixed model with the given scale.
    ///
    /// A negative scale is interpreted as a grid size, as in `-10 => 1 / 10`.
    pub fn fixed(scale: f64) -> Self {
        let scale = if scale < 0. { 1. / scale.abs() } else { scale };
        Self::Fixed { scale }
    }

    /// Returns a fixed model whose grid has the given cell size.
    pub fn with_grid_size(size: f64) -> Self {
        Self::Fixed {
            scale: 1. / size.abs(),
        }
    }

    pub fn is_floating(&self) -> bool {
        matches!(self, Self::Floating)
    }

    /// Returns the scale of a fixed model, zero when floating.
    pub fn scale(&self) -> f64 {
        match self {
            Self::Floating => 0.,
            Self::Fixed { scale } => *scale,
        }
    }

    /// Returns the cell size of the grid, zero when floating.
    pub fn grid_size(&self) -> f64 {
        match self {
            Self::Floating => 0.,
            Self::Fixed { scale } => 1. / scale,
        }
    }

    /// Returns the number of decimal digits this model is able to represent.
    pub fn maximum_significant_digits(&self) -> i32 {
        match self {
            Self::Floating => 16,
            Self::Fixed { scale } => 1 + scale.log10().ceil() as i32,
        }
    }

    /// Rounds the given value to this model.
    pub fn make_precise(&self, value: f64) -> f64 {
        match self {
            Self::Floating => value,
            Self::Fixed { .. } if value.is_nan() => value,
            Self::Fixed { scale } => {
                // round to whole grid cells when the grid is coarser than one unit
                if *scale < 1. {
                    let grid = 1. / scale;
                    (value / grid + 0.5).floor() * grid
                } else {
                    (value * scale + 0.5).floor() / scale
                }
            }
        }
    }

    /// Rounds the planar ordinates of the given coordinate to this model.
    pub fn make_precise_coordinate(&self, coord: &Coordinate) -> Coordinate {
        Coordinate {
            x: self.make_precise(coord.x),
            y: self.make_precise(coord.y),
            z: coord.z,
        }
    }

    /// Returns the model able to represent the most precision of self and other.
    pub fn most_precise(self, other: Self) -> Self {
        match self.partial_cmp(&other) {
            Some(Ordering::Less) => other,
            _ => self,
        }
    }
}

impl PartialOrd for PrecisionModel {
    /// Orders models by the precision they can represent.
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.maximum_significant_digits()
            .partial_cmp(&other.maximum_significant_digits())
    }
}
