use std::fmt;

use crate::{
    error::{GeometryError, Result},
    geom::{Coordinate, Location, Position},
};

/// The locations of an edge or node relative to one geometry.
///
/// Nodes and line edges only have an `On` location; area edges also have a location on
/// each side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TopologyLocation {
    locations: [Location; 3],
    is_area: bool,
}

impl Default for TopologyLocation {
    fn default() -> Self {
        Self::line(Location::None)
    }
}

impl TopologyLocation {
    pub fn line(on: Location) -> Self {
        Self {
            locations: [on, Location::None, Location::None],
            is_area: false,
        }
    }

    pub fn area(on: Location, left: Location, right: Location) -> Self {
        Self {
            locations: [on, left, right],
            is_area: true,
        }
    }

    pub fn get(&self, position: Position) -> Location {
        self.locations[position.index()]
    }

    pub fn set(&mut self, position: Position, location: Location) {
        if position != Position::On {
            self.is_area = true;
        }
        self.locations[position.index()] = location;
    }

    pub fn is_area(&self) -> bool {
        self.is_area
    }

    pub fn is_line(&self) -> bool {
        !self.is_area
    }

    fn len(&self) -> usize {
        if self.is_area { 3 } else { 1 }
    }

    /// Returns true if every location is unknown.
    pub fn is_null(&self) -> bool {
        self.locations[..self.len()].iter().all(Location::is_none)
    }

    /// Returns true if any location is unknown.
    pub fn is_any_null(&self) -> bool {
        self.locations[..self.len()].iter().any(Location::is_none)
    }

    pub fn is_equal_on_side(&self, other: &Self, position: Position) -> bool {
        self.get(position) == other.get(position)
    }

    pub fn all_positions_equal(&self, location: Location) -> bool {
        self.locations[..self.len()].iter().all(|loc| *loc == location)
    }

    /// Swaps the side locations.
    pub fn flip(&mut self) {
        if self.is_area {
            self.locations.swap(Position::Left.index(), Position::Right.index());
        }
    }

    pub fn set_all(&mut self, location: Location) {
        let len = self.len();
        self.locations[..len].fill(location);
    }

    pub fn set_all_if_null(&mut self, location: Location) {
        let len = self.len();
        self.locations[..len]
            .iter_mut()
            .filter(|loc| loc.is_none())
            .for_each(|loc| *loc = location);
    }

    pub fn set_locations(&mut self, on: Location, left: Location, right: Location) {
        self.locations = [on, left, right];
        self.is_area = true;
    }

    /// Fills the unknown locations of self with those of other, becoming an area location
    /// if other is one.
    pub fn merge(&mut self, other: &Self) {
        if other.is_area && !self.is_area {
            self.is_area = true;
            self.locations[1] = Location::None;
            self.locations[2] = Location::None;
        }

        for i in 0..self.len() {
            if self.locations[i].is_none() && i < other.len() {
                self.locations[i] = other.locations[i];
            }
        }
    }
}

impl fmt::Display for TopologyLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_area {
            write!(
                f,
                "{}{}{}",
                self.locations[1], self.locations[0], self.locations[2]
            )
        } else {
            write!(f, "{}", self.locations[0])
        }
    }
}

/// The topological relationship of an edge or node with each of the (up to two) input
/// geometries of an operation.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Label {
    elements: [TopologyLocation; 2],
}

impl Label {
    /// Returns a label with the given on-location for both geometries.
    pub fn on(location: Location) -> Self {
        Self {
            elements: [TopologyLocation::line(location); 2],
        }
    }

    /// Returns a line label for one geometry, unknown for the other.
    pub fn line(geometry: usize, on: Location) -> Self {
        let mut label = Self::default();
        label.elements[geometry] = TopologyLocation::line(on);
        label
    }

    /// Returns an area label with the same locations for both geometries.
    pub fn area_both(on: Location, left: Location, right: Location) -> Self {
        Self {
            elements: [TopologyLocation::area(on, left, right); 2],
        }
    }

    /// Returns an area label for one geometry, an unknown area label for the other.
    pub fn area(geometry: usize, on: Location, left: Location, right: Location) -> Self {
        let mut label = Self::area_both(Location::None, Location::None, Location::None);
        label.elements[geometry] = TopologyLocation::area(on, left, right);
        label
    }

    /// Returns a line label with the on-locations of the given label.
    pub fn to_line(&self) -> Self {
        let mut label = Self::default();
        for i in 0..2 {
            label.elements[i] = TopologyLocation::line(self.elements[i].get(Position::On));
        }
        label
    }

    pub fn element(&self, geometry: usize) -> &TopologyLocation {
        &self.elements[geometry]
    }

    pub fn flip(&mut self) {
        self.elements.iter_mut().for_each(TopologyLocation::flip);
    }

    pub fn flipped(mut self) -> Self {
        self.flip();
        self
    }

    pub fn location(&self, geometry: usize, position: Position) -> Location {
        self.elements[geometry].get(position)
    }

    /// Returns the on-location for the given geometry.
    pub fn on_location(&self, geometry: usize) -> Location {
        self.location(geometry, Position::On)
    }

    pub fn set_location(&mut self, geometry: usize, position: Position, location: Location) {
        self.elements[geometry].set(position, location);
    }

    pub fn set_on_location(&mut self, geometry: usize, location: Location) {
        self.elements[geometry].set(Position::On, location);
    }

    pub fn set_all_locations(&mut self, geometry: usize, location: Location) {
        self.elements[geometry].set_all(location);
    }

    pub fn set_all_locations_if_null(&mut self, geometry: usize, location: Location) {
        self.elements[geometry].set_all_if_null(location);
    }

    pub fn set_all_locations_if_null_both(&mut self, location: Location) {
        (0..2).for_each(|i| self.set_all_locations_if_null(i, location));
    }

    pub fn set_element(&mut self, geometry: usize, element: TopologyLocation) {
        self.elements[geometry] = element;
    }

    /// Fills the unknown locations of self with those of other.
    pub fn merge(&mut self, other: &Label) {
        for i in 0..2 {
            self.elements[i].merge(&other.elements[i]);
        }
    }

    /// Returns the number of geometries this label has some location for.
    pub fn geometry_count(&self) -> usize {
        self.elements.iter().filter(|elt| !elt.is_null()).count()
    }

    pub fn is_null(&self, geometry: usize) -> bool {
        self.elements[geometry].is_null()
    }

    pub fn is_any_null(&self, geometry: usize) -> bool {
        self.elements[geometry].is_any_null()
    }

    /// Returns true if the label is an area label for either geometry.
    pub fn is_area(&self) -> bool {
        self.elements.iter().any(TopologyLocation::is_area)
    }

    pub fn is_area_of(&self, geometry: usize) -> bool {
        self.elements[geometry].is_area()
    }

    pub fn is_line(&self, geometry: usize) -> bool {
        self.elements[geometry].is_line()
    }

    pub fn is_equal_on_side(&self, other: &Label, position: Position) -> bool {
        (0..2).all(|i| self.elements[i].is_equal_on_side(&other.elements[i], position))
    }

    pub fn all_positions_equal(&self, geometry: usize, location: Location) -> bool {
        self.elements[geometry].all_positions_equal(location)
    }

    /// Turns the element of the given geometry into a line element, keeping its
    /// on-location.
    pub fn to_line_of(&mut self, geometry: usize) {
        if self.elements[geometry].is_area() {
            self.elements[geometry] = TopologyLocation::line(self.elements[geometry].get(Position::On));
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "A:{} B:{}", self.elements[0], self.elements[1])
    }
}

/// Completes the labels of the edges around a node, sorted counter-clockwise.
///
/// Side locations are propagated around the star; anything left unknown is resolved with
/// `locate`, or set to exterior for a geometry having a collapsed edge at the node.
pub fn label_star(
    labels: &mut [Label],
    coord: &Coordinate,
    mut locate: impl FnMut(usize, &Coordinate) -> Location,
) -> Result<()> {
    propagate_side_labels(labels, coord, 0)?;
    propagate_side_labels(labels, coord, 1)?;

    let mut has_collapse = [false; 2];
    for label in labels.iter() {
        for (geometry, collapse) in has_collapse.iter_mut().enumerate() {
            if label.is_line(geometry) && label.on_location(geometry) == Location::Boundary {
                *collapse = true;
            }
        }
    }

    for label in labels.iter_mut() {
        for (geometry, &collapse) in has_collapse.iter().enumerate() {
            if !label.is_any_null(geometry) {
                continue;
            }

            let location = if collapse {
                Location::Exterior
            } else {
                locate(geometry, coord)
            };
            label.set_all_locations_if_null(geometry, location);
        }
    }

    Ok(())
}

fn propagate_side_labels(labels: &mut [Label], coord: &Coordinate, geometry: usize) -> Result<()> {
    // moving counter-clockwise around the node goes from the right side of an edge to its
    // left side
    let Some(start) = labels
        .iter()
        .filter(|label| label.is_area_of(geometry))
        .map(|label| label.location(geometry, Position::Left))
        .filter(|location| !location.is_none())
        .last()
    else {
        return Ok(());
    };

    let mut current = start;
    for label in labels.iter_mut() {
        if label.on_location(geometry).is_none() {
            label.set_on_location(geometry, current);
        }

        if !label.is_area_of(geometry) {
            continue;
        }

        let left = label.location(geometry, Position::Left);
        let right = label.location(geometry, Position::Right);
        if !right.is_none() {
            if right != current {
                return Err(GeometryError::topology("side location conflict", *coord));
            }
            if left.is_none() {
                return Err(GeometryError::assertion(format!("found single null side at {coord}")));
            }
            current = left;
        } else {
            if !left.is_none() {
                return Err(GeometryError::assertion(format!("found single null side at {coord}")));
            }
            label.set_location(geometry, Position::Right, current);
            label.set_location(geometry, Position::Left, current);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_fills_unknowns() {
        let mut label = Label::line(0, Location::Interior);
        label.merge(&Label::area(1, Location::Boundary, Location::Exterior, Location::Interior));

        // merging with an area promotes the line entry, whose sides stay unknown
        assert_eq!(label.on_location(0), Location::Interior);
        assert!(label.element(0).is_area());
        assert_eq!(label.location(0, Position::Left), Location::None);
        assert_eq!(label.location(0, Position::Right), Location::None);
        assert!(label.is_area_of(1));
        assert_eq!(label.location(1, Position::Right), Location::Interior);
        assert_eq!(label.geometry_count(), 2);
    }

    #[test]
    fn flip_swaps_sides() {
        let label = Label::area(0, Location::Boundary, Location::Exterior, Location::Interior);
        let flipped = label.flipped();
        assert_eq!(flipped.location(0, Position::Left), Location::Interior);
        assert_eq!(flipped.location(0, Position::Right), Location::Exterior);
        assert_eq!(label.to_string(), "A:ebi B:---");
    }

    #[test]
    fn nulls() {
        let mut label = Label::area(0, Location::Boundary, Location::None, Location::Interior);
        assert!(label.is_any_null(0));
        assert!(!label.is_null(0));
        assert!(label.is_null(1));
        label.set_all_locations_if_null(0, Location::Exterior);
        assert!(label.all_positions_equal(1, Location::None));
        assert_eq!(label.location(0, Position::Left), Location::Exterior);
    }
}
