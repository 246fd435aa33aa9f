use std::fmt;

/// The topological location of a point relative to a geometry.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Location {
    Interior,
    Boundary,
    Exterior,
    /// Unknown or not applicable.
    #[default]
    None,
}

impl Location {
    /// Returns the index of self as a row or column of an intersection matrix.
    pub fn index(&self) -> Option<usize> {
        match self {
            Location::Interior => Some(0),
            Location::Boundary => Some(1),
            Location::Exterior => Some(2),
            Location::None => None,
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Location::None)
    }

    pub fn to_char(&self) -> char {
        match self {
            Location::Interior => 'i',
            Location::Boundary => 'b',
            Location::Exterior => 'e',
            Location::None => '-',
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_char())
    }
}

/// A side of a directed edge, or the edge itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Position {
    On = 0,
    Left = 1,
    Right = 2,
}

impl Position {
    /// Returns the side opposite to self; `On` is its own opposite.
    pub fn opposite(self) -> Self {
        match self {
            Position::Left => Position::Right,
            Position::Right => Position::Left,
            Position::On => Position::On,
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }
}

/// The dimension of a geometry or of an intersection matrix entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Dimension {
    /// Any non-empty dimension, used in patterns only.
    True,
    /// The empty set.
    False,
    Point,
    Curve,
    Surface,
    /// Any value, used in patterns only.
    DontCare,
}

impl Dimension {
    /// Returns the numeric value of a concrete dimension, -1 for `False`.
    pub fn value(&self) -> i32 {
        match self {
            Dimension::False => -1,
            Dimension::Point => 0,
            Dimension::Curve => 1,
            Dimension::Surface => 2,
            Dimension::True => -2,
            Dimension::DontCare => -3,
        }
    }

    /// Returns the concrete dimension with the given numeric value.
    pub fn from_value(value: i32) -> Self {
        match value {
            0 => Dimension::Point,
            1 => Dimension::Curve,
            2 => Dimension::Surface,
            _ => Dimension::False,
        }
    }

    pub fn to_char(&self) -> char {
        match self {
            Dimension::False => 'F',
            Dimension::True => 'T',
            Dimension::DontCare => '*',
            Dimension::Point => '0',
            Dimension::Curve => '1',
            Dimension::Surface => '2',
        }
    }

    pub fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'F' => Some(Dimension::False),
            'T' => Some(Dimension::True),
            '*' => Some(Dimension::DontCare),
            '0' => Some(Dimension::Point),
            '1' => Some(Dimension::Curve),
            '2' => Some(Dimension::Surface),
            _ => None,
        }
    }

    /// Returns the greater of two concrete dimensions.
    pub fn max(self, other: Dimension) -> Dimension {
        Dimension::from_value(self.value().max(other.value()))
    }
}
