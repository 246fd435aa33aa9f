use crate::{
    geom::{Location, Position},
    geomgraph::Label,
};

/// Marks a depth as not computed.
const NULL_DEPTH: i32 = -1;

/// Counts how many times each side of an edge is covered by the area of each geometry.
///
/// Used to merge coincident edges: the depth of the merged edge is the sum of the depths
/// of its parts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Depth {
    depth: [[i32; 3]; 2],
}

impl Default for Depth {
    fn default() -> Self {
        Self {
            depth: [[NULL_DEPTH; 3]; 2],
        }
    }
}

impl Depth {
    /// Returns the depth contributed by a side location.
    pub fn of_location(location: Location) -> i32 {
        match location {
            Location::Exterior => 0,
            Location::Interior => 1,
            _ => NULL_DEPTH,
        }
    }

    pub fn get(&self, geometry: usize, position: Position) -> i32 {
        self.depth[geometry][position.index()]
    }

    pub fn set(&mut self, geometry: usize, position: Position, depth: i32) {
        self.depth[geometry][position.index()] = depth;
    }

    /// Returns the location implied by the depth of a side.
    pub fn location(&self, geometry: usize, position: Position) -> Location {
        if self.get(geometry, position) <= 0 {
            Location::Exterior
        } else {
            Location::Interior
        }
    }

    /// Accumulates the side locations of a label.
    pub fn add(&mut self, label: &Label) {
        for geometry in 0..2 {
            for position in [Position::Left, Position::Right] {
                let location = label.location(geometry, position);
                if !matches!(location, Location::Exterior | Location::Interior) {
                    continue;
                }

                let depth = &mut self.depth[geometry][position.index()];
                if *depth == NULL_DEPTH {
                    *depth = Self::of_location(location);
                } else {
                    *depth += Self::of_location(location);
                }
            }
        }
    }

    pub fn is_null(&self) -> bool {
        self.depth.iter().flatten().all(|depth| *depth == NULL_DEPTH)
    }

    pub fn is_null_of(&self, geometry: usize) -> bool {
        self.depth[geometry][1] == NULL_DEPTH
    }

    /// Returns the right depth minus the left depth.
    pub fn delta(&self, geometry: usize) -> i32 {
        self.depth[geometry][Position::Right.index()] - self.depth[geometry][Position::Left.index()]
    }

    /// Reduces the side depths so the smaller one is zero and the larger one at most one.
    ///
    /// Duplicated collapsed edges may add up to depths larger than one, which mean the same
    /// as one.
    pub fn normalize(&mut self) {
        for geometry in 0..2 {
            if self.is_null_of(geometry) {
                continue;
            }

            let sides = &mut self.depth[geometry];
            let min_depth = sides[1].min(sides[2]).max(0);
            for side in &mut sides[1..] {
                *side = i32::from(*side > min_depth);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accumulates_and_normalizes() {
        let mut depth = Depth::default();
        assert!(depth.is_null());

        let label = Label::area(0, Location::Boundary, Location::Interior, Location::Exterior);
        depth.add(&label);
        depth.add(&label);
        assert_eq!(depth.get(0, Position::Left), 2);
        assert_eq!(depth.get(0, Position::Right), 0);
        assert_eq!(depth.delta(0), -2);
        assert!(depth.is_null_of(1));

        depth.normalize();
        assert_eq!(depth.get(0, Position::Left), 1);
        assert_eq!(depth.location(0, Position::Left), Location::Interior);
        assert_eq!(depth.location(0, Position::Right), Location::Exterior);
    }
}
