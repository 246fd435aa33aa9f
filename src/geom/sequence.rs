use std::{cmp::Ordering, ops::Index};

use crate::geom::{Coordinate, Envelope};

/// An ordered, mutable list of vertices.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CoordinateSequence {
    coords: Vec<Coordinate>,
    /// The declared dimension, 2 or 3.
    dimension: u8,
}

impl From<Vec<Coordinate>> for CoordinateSequence {
    fn from(coords: Vec<Coordinate>) -> Self {
        let dimension = if coords.iter().any(Coordinate::has_z) { 3 } else { 2 };
        Self { coords, dimension }
    }
}

impl<P> FromIterator<P> for CoordinateSequence
where
    P: Into<Coordinate>,
{
    fn from_iter<I: IntoIterator<Item = P>>(iter: I) -> Self {
        iter.into_iter().map(Into::into).collect::<Vec<_>>().into()
    }
}

impl Index<usize> for CoordinateSequence {
    type Output = Coordinate;

    fn index(&self, index: usize) -> &Self::Output {
        &self.coords[index]
    }
}

impl IntoIterator for CoordinateSequence {
    type Item = Coordinate;
    type IntoIter = std::vec::IntoIter<Coordinate>;

    fn into_iter(self) -> Self::IntoIter {
        self.coords.into_iter()
    }
}

impl<'a> IntoIterator for &'a CoordinateSequence {
    type Item = &'a Coordinate;
    type IntoIter = std::slice::Iter<'a, Coordinate>;

    fn into_iter(self) -> Self::IntoIter {
        self.coords.iter()
    }
}

impl CoordinateSequence {
    pub fn new() -> Self {
        Self {
            coords: Vec::new(),
            dimension: 2,
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            coords: Vec::with_capacity(capacity),
            dimension: 2,
        }
    }

    pub fn dimension(&self) -> u8 {
        self.dimension
    }

    pub fn len(&self) -> usize {
        self.coords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coords.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Coordinate> {
        self.coords.get(index)
    }

    pub fn set(&mut self, index: usize, coord: Coordinate) {
        if coord.has_z() {
            self.dimension = 3;
        }
        self.coords[index] = coord;
    }

    pub fn push(&mut self, coord: Coordinate) {
        if coord.has_z() {
            self.dimension = 3;
        }
        self.coords.push(coord);
    }

    /// Appends the given coordinate unless it equals the last one.
    pub fn push_distinct(&mut self, coord: Coordinate) {
        if self.coords.last() != Some(&coord) {
            self.push(coord);
        }
    }

    pub fn first(&self) -> Option<&Coordinate> {
        self.coords.first()
    }

    pub fn last(&self) -> Option<&Coordinate> {
        self.coords.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Coordinate> {
        self.coords.iter()
    }

    pub fn as_slice(&self) -> &[Coordinate] {
        &self.coords
    }

    /// Returns a copy of every coordinate.
    pub fn to_vec(&self) -> Vec<Coordinate> {
        self.coords.clone()
    }

    pub fn into_vec(self) -> Vec<Coordinate> {
        self.coords
    }

    pub fn envelope(&self) -> Envelope {
        Envelope::of_coordinates(&self.coords)
    }

    /// Returns true if the first and last coordinates are equal.
    pub fn is_closed(&self) -> bool {
        match (self.coords.first(), self.coords.last()) {
            (Some(first), Some(last)) => first == last,
            _ => false,
        }
    }

    /// Returns true if self is closed and has at least 4 points.
    pub fn is_ring(&self) -> bool {
        self.len() >= 4 && self.is_closed()
    }

    pub fn reverse(&mut self) {
        self.coords.reverse();
    }

    pub fn reversed(mut self) -> Self {
        self.reverse();
        self
    }

    pub fn has_repeated_points(&self) -> bool {
        self.coords.windows(2).any(|w| w[0] == w[1])
    }

    /// Returns a copy without consecutive duplicates.
    pub fn without_repeated_points(&self) -> Self {
        let mut seq = Self::with_capacity(self.len());
        self.coords.iter().for_each(|c| seq.push_distinct(*c));
        seq
    }

    /// Visits every coordinate in order, allowing it to be rewritten in place.
    pub fn apply(&mut self, mut filter: impl FnMut(usize, &mut Coordinate)) {
        self.coords
            .iter_mut()
            .enumerate()
            .for_each(|(index, coord)| filter(index, coord));
        self.dimension = if self.coords.iter().any(Coordinate::has_z) { 3 } else { 2 };
    }

    /// Visits every coordinate in order until the filter returns false.
    pub fn visit(&self, mut filter: impl FnMut(usize, &Coordinate) -> bool) {
        for (index, coord) in self.coords.iter().enumerate() {
            if !filter(index, coord) {
                return;
            }
        }
    }

    /// Returns a new sequence with every coordinate transformed.
    pub fn map(&self, f: impl FnMut(&Coordinate) -> Coordinate) -> Self {
        self.coords.iter().map(f).collect::<Vec<_>>().into()
    }

    /// Returns true if self reads the same in reverse order.
    pub fn is_palindrome(&self) -> bool {
        increasing_direction(&self.coords) == Ordering::Equal
    }

    pub fn any_invalid(&self) -> Option<Coordinate> {
        self.coords.iter().find(|c| !c.is_valid()).copied()
    }
}

/// Determines which orientation of a sequence is smaller: `Less` if the forward reading
/// is not greater than the reverse one, `Greater` if reversed reads smaller, `Equal` for
/// palindromes.
pub fn increasing_direction(coords: &[Coordinate]) -> Ordering {
    let len = coords.len();
    for i in 0..len / 2 {
        match coords[i].cmp(&coords[len - 1 - i]) {
            Ordering::Equal => continue,
            other => return other,
        }
    }
    Ordering::Equal
}

/// Returns the index of the smallest coordinate.
pub fn min_coordinate_index(coords: &[Coordinate]) -> Option<usize> {
    coords
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| a.cmp(b))
        .map(|(index, _)| index)
}

/// Returns the first coordinate of `test` not present in `list`.
pub fn point_not_in_list(test: &[Coordinate], list: &[Coordinate]) -> Option<Coordinate> {
    test.iter()
        .find(|p| !list.iter().any(|q| q.equals_2d(p)))
        .copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coord;

    #[test]
    fn ring_detection() {
        let ring: CoordinateSequence =
            vec![coord!(0, 0), coord!(1, 0), coord!(1, 1), coord!(0, 0)].into();
        assert!(ring.is_ring());

        let open: CoordinateSequence = vec![coord!(0, 0), coord!(1, 0), coord!(1, 1)].into();
        assert!(!open.is_ring());
        assert!(!open.is_closed());
    }

    #[test]
    fn repeated_points_are_removed() {
        let seq: CoordinateSequence =
            vec![coord!(0, 0), coord!(0, 0), coord!(1, 0), coord!(1, 0)].into();
        assert!(seq.has_repeated_points());
        assert_eq!(seq.without_repeated_points().len(), 2);
    }

    #[test]
    fn palindrome() {
        let seq: CoordinateSequence = vec![coord!(0, 0), coord!(1, 0), coord!(0, 0)].into();
        assert!(seq.is_palindrome());
        let seq: CoordinateSequence = vec![coord!(0, 0), coord!(1, 0)].into();
        assert!(!seq.is_palindrome());
    }

    #[test]
    fn dimension_follows_elevation() {
        let mut seq: CoordinateSequence = vec![coord!(0, 0)].into();
        assert_eq!(seq.dimension(), 2);
        seq.push(coord!(1, 1, 5));
        assert_eq!(seq.dimension(), 3);
    }
}
