use std::{fmt, str::FromStr};

use crate::{
    error::{GeometryError, Result},
    geom::{Dimension, Location},
};

/// A Dimensionally Extended 9-Intersection Matrix.
///
/// Rows are the interior, boundary and exterior of the first geometry; columns those of the
/// second one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntersectionMatrix {
    cells: [[Dimension; 3]; 3],
}

impl Default for IntersectionMatrix {
    fn default() -> Self {
        Self {
            cells: [[Dimension::False; 3]; 3],
        }
    }
}

impl FromStr for IntersectionMatrix {
    type Err = GeometryError;

    /// Parses a 9 character dimension string such as `212101212`.
    fn from_str(s: &str) -> Result<Self> {
        let mut im = Self::default();
        im.set_all_from(s)?;
        Ok(im)
    }
}

impl fmt::Display for IntersectionMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.cells
            .iter()
            .flatten()
            .try_for_each(|d| write!(f, "{}", d.to_char()))
    }
}

impl IntersectionMatrix {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, row: Location, col: Location) -> Dimension {
        match (row.index(), col.index()) {
            (Some(r), Some(c)) => self.cells[r][c],
            _ => Dimension::False,
        }
    }

    pub fn set(&mut self, row: Location, col: Location, dimension: Dimension) {
        if let (Some(r), Some(c)) = (row.index(), col.index()) {
            self.cells[r][c] = dimension;
        }
    }

    /// Raises the entry to at least the given dimension.
    pub fn set_at_least(&mut self, row: Location, col: Location, dimension: Dimension) {
        if let (Some(r), Some(c)) = (row.index(), col.index())
            && self.cells[r][c].value() < dimension.value()
        {
            self.cells[r][c] = dimension;
        }
    }

    /// Raises the entry to at least the given dimension, if both locations are known.
    pub fn set_at_least_if_valid(&mut self, row: Location, col: Location, dimension: Dimension) {
        if !row.is_none() && !col.is_none() {
            self.set_at_least(row, col, dimension);
        }
    }

    /// Raises each entry to at least the dimension at the same position in the pattern.
    pub fn set_at_least_from(&mut self, pattern: &str) -> Result<()> {
        let dims = parse(pattern)?;
        for (index, dim) in dims.into_iter().enumerate() {
            let (r, c) = (index / 3, index % 3);
            let min = match dim {
                Dimension::True => Dimension::Point,
                Dimension::DontCare | Dimension::False => continue,
                other => other,
            };
            if self.cells[r][c].value() < min.value() {
                self.cells[r][c] = min;
            }
        }
        Ok(())
    }

    /// Overwrites every entry from a 9 character dimension string.
    pub fn set_all_from(&mut self, s: &str) -> Result<()> {
        let dims = parse(s)?;
        for (index, dim) in dims.into_iter().enumerate() {
            self.cells[index / 3][index % 3] = dim;
        }
        Ok(())
    }

    pub fn set_all(&mut self, dimension: Dimension) {
        self.cells = [[dimension; 3]; 3];
    }

    /// Swaps rows and columns.
    pub fn transpose(&mut self) {
        for r in 0..3 {
            for c in (r + 1)..3 {
                let tmp = self.cells[r][c];
                self.cells[r][c] = self.cells[c][r];
                self.cells[c][r] = tmp;
            }
        }
    }

    /// Returns true if every entry satisfies the pattern at the same position.
    ///
    /// Fails if the pattern is not 9 characters from `T F * 0 1 2`.
    pub fn matches(&self, pattern: &str) -> Result<bool> {
        let dims = parse(pattern)?;
        Ok(dims
            .iter()
            .enumerate()
            .all(|(index, required)| matches_dimension(self.cells[index / 3][index % 3], *required)))
    }

    fn at(&self, r: usize, c: usize) -> Dimension {
        self.cells[r][c]
    }

    fn is_true(d: Dimension) -> bool {
        d.value() >= 0
    }

    pub fn is_disjoint(&self) -> bool {
        !Self::is_true(self.at(0, 0))
            && !Self::is_true(self.at(0, 1))
            && !Self::is_true(self.at(1, 0))
            && !Self::is_true(self.at(1, 1))
    }

    pub fn is_intersects(&self) -> bool {
        !self.is_disjoint()
    }

    /// Returns true if the geometries touch, given their dimensions.
    pub fn is_touches(&self, dim_a: i32, dim_b: i32) -> bool {
        if dim_a > dim_b {
            return self.is_touches(dim_b, dim_a);
        }
        if (dim_a == 2 && dim_b == 2)
            || (dim_a == 1 && dim_b == 1)
            || (dim_a == 1 && dim_b == 2)
            || (dim_a == 0 && dim_b == 2)
            || (dim_a == 0 && dim_b == 1)
        {
            return !Self::is_true(self.at(0, 0))
                && (Self::is_true(self.at(0, 1))
                    || Self::is_true(self.at(1, 0))
                    || Self::is_true(self.at(1, 1)));
        }
        false
    }

    pub fn is_crosses(&self, dim_a: i32, dim_b: i32) -> bool {
        if (dim_a == 0 && dim_b == 1)
            || (dim_a == 0 && dim_b == 2)
            || (dim_a == 1 && dim_b == 2)
        {
            return Self::is_true(self.at(0, 0)) && Self::is_true(self.at(0, 2));
        }
        if (dim_a == 1 && dim_b == 0)
            || (dim_a == 2 && dim_b == 0)
            || (dim_a == 2 && dim_b == 1)
        {
            return Self::is_true(self.at(0, 0)) && Self::is_true(self.at(2, 0));
        }
        if dim_a == 1 && dim_b == 1 {
            return self.at(0, 0) == Dimension::Point;
        }
        false
    }

    pub fn is_within(&self) -> bool {
        Self::is_true(self.at(0, 0))
            && !Self::is_true(self.at(0, 2))
            && !Self::is_true(self.at(1, 2))
    }

    pub fn is_contains(&self) -> bool {
        Self::is_true(self.at(0, 0))
            && !Self::is_true(self.at(2, 0))
            && !Self::is_true(self.at(2, 1))
    }

    pub fn is_covers(&self) -> bool {
        let has_point_in_common = Self::is_true(self.at(0, 0))
            || Self::is_true(self.at(0, 1))
            || Self::is_true(self.at(1, 0))
            || Self::is_true(self.at(1, 1));
        has_point_in_common && !Self::is_true(self.at(2, 0)) && !Self::is_true(self.at(2, 1))
    }

    pub fn is_covered_by(&self) -> bool {
        let has_point_in_common = Self::is_true(self.at(0, 0))
            || Self::is_true(self.at(0, 1))
            || Self::is_true(self.at(1, 0))
            || Self::is_true(self.at(1, 1));
        has_point_in_common && !Self::is_true(self.at(0, 2)) && !Self::is_true(self.at(1, 2))
    }

    pub fn is_equals(&self, dim_a: i32, dim_b: i32) -> bool {
        if dim_a != dim_b {
            return false;
        }
        Self::is_true(self.at(0, 0))
            && !Self::is_true(self.at(0, 2))
            && !Self::is_true(self.at(1, 2))
            && !Self::is_true(self.at(2, 0))
            && !Self::is_true(self.at(2, 1))
    }

    pub fn is_overlaps(&self, dim_a: i32, dim_b: i32) -> bool {
        if (dim_a == 0 && dim_b == 0) || (dim_a == 2 && dim_b == 2) {
            return Self::is_true(self.at(0, 0))
                && Self::is_true(self.at(0, 2))
                && Self::is_true(self.at(2, 0));
        }
        if dim_a == 1 && dim_b == 1 {
            return self.at(0, 0) == Dimension::Curve
                && Self::is_true(self.at(0, 2))
                && Self::is_true(self.at(2, 0));
        }
        false
    }
}

fn parse(pattern: &str) -> Result<Vec<Dimension>> {
    let dims = pattern
        .chars()
        .map(|c| {
            Dimension::from_char(c).ok_or_else(|| {
                GeometryError::illegal(format!("unknown dimension symbol {c:?} in {pattern:?}"))
            })
        })
        .collect::<Result<Vec<_>>>()?;

    if dims.len() != 9 {
        return Err(GeometryError::illegal(format!(
            "should be length 9: {pattern:?}"
        )));
    }

    Ok(dims)
}

fn matches_dimension(actual: Dimension, required: Dimension) -> bool {
    match required {
        Dimension::DontCare => true,
        Dimension::True => actual.value() >= 0,
        Dimension::False => actual == Dimension::False,
        other => actual == other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip() {
        ["212101212", "FF0FFF102", "0FFFFFFF2", "FFFFFFFFF"]
            .into_iter()
            .for_each(|pattern| {
                let im: IntersectionMatrix = pattern.parse().unwrap();
                assert_eq!(im.to_string(), pattern);
            });
    }

    #[test]
    fn pattern_matching() {
        struct Test {
            name: &'static str,
            matrix: &'static str,
            pattern: &'static str,
            want: bool,
        }

        vec![
            Test {
                name: "wildcards",
                matrix: "212101212",
                pattern: "*********",
                want: true,
            },
            Test {
                name: "true matches any dimension",
                matrix: "212101212",
                pattern: "T*T***T**",
                want: true,
            },
            Test {
                name: "false requires empty",
                matrix: "212101212",
                pattern: "F********",
                want: false,
            },
            Test {
                name: "exact dimension",
                matrix: "FF2FF1212",
                pattern: "FF2FF1212",
                want: true,
            },
        ]
        .into_iter()
        .for_each(|test| {
            let im: IntersectionMatrix = test.matrix.parse().unwrap();
            assert_eq!(im.matches(test.pattern).unwrap(), test.want, "{}", test.name);
        });
    }

    #[test]
    fn wrong_length_pattern_is_rejected() {
        let im = IntersectionMatrix::new();
        assert!(matches!(im.matches("T*F"), Err(GeometryError::IllegalArgument(_))));
        assert!("21210121".parse::<IntersectionMatrix>().is_err());
    }

    #[test]
    fn transpose() {
        let mut im: IntersectionMatrix = "012FFF102".parse().unwrap();
        im.transpose();
        assert_eq!(im.to_string(), "0F11F02F2");
    }
}
