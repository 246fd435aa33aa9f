use crate::{
    algorithm::{Orientation, distance::point_to_segment},
    geom::Coordinate,
};

/// How many vertices of a removed span are checked to be shallow.
const SAMPLED_POINTS: usize = 10;

/// Removes the shallow concavities of a line on the side it is buffered on.
///
/// Concavities shallower than the tolerance cannot affect the buffer curve, so removing
/// them saves work without changing the result. The tolerance sign selects the side: left
/// when positive, right when negative.
pub(super) fn simplify(coords: &[Coordinate], tolerance: f64) -> Vec<Coordinate> {
    let orientation = if tolerance < 0.0 {
        Orientation::CLOCKWISE
    } else {
        Orientation::COUNTER_CLOCKWISE
    };

    let mut simplifier = Simplifier {
        coords,
        tolerance: tolerance.abs(),
        orientation,
        deleted: vec![false; coords.len()],
    };
    while simplifier.delete_shallow_concavities() {}

    coords
        .iter()
        .zip(simplifier.deleted)
        .filter(|(_, deleted)| !deleted)
        .map(|(coord, _)| *coord)
        .collect()
}

struct Simplifier<'a> {
    coords: &'a [Coordinate],
    tolerance: f64,
    orientation: Orientation,
    deleted: Vec<bool>,
}

impl Simplifier<'_> {
    /// Deletes every other middle vertex of a shallow concavity, returning true if any was.
    fn delete_shallow_concavities(&mut self) -> bool {
        let mut index = 1;
        let mut middle = self.next_index(index);
        let mut last = self.next_index(middle);

        let mut changed = false;
        while last < self.coords.len() {
            let mut middle_deleted = false;
            if self.is_deletable(index, middle, last) {
                self.deleted[middle] = true;
                middle_deleted = true;
                changed = true;
            }

            index = if middle_deleted { last } else { middle };
            middle = self.next_index(index);
            last = self.next_index(middle);
        }

        changed
    }

    fn next_index(&self, index: usize) -> usize {
        let mut next = index + 1;
        while next < self.coords.len() && self.deleted[next] {
            next += 1;
        }
        next
    }

    fn is_deletable(&self, i0: usize, i1: usize, i2: usize) -> bool {
        let (p0, p1, p2) = (&self.coords[i0], &self.coords[i1], &self.coords[i2]);
        Orientation::of(p0, p1, p2) == self.orientation
            && self.is_shallow(p0, p1, p2)
            && self.is_shallow_sampled(p0, p2, i0, i2)
    }

    fn is_shallow_sampled(&self, p0: &Coordinate, p2: &Coordinate, i0: usize, i2: usize) -> bool {
        let step = ((i2 - i0) / SAMPLED_POINTS).max(1);
        (i0..i2)
            .step_by(step)
            .all(|i| self.is_shallow(p0, &self.coords[i], p2))
    }

    fn is_shallow(&self, p0: &Coordinate, p1: &Coordinate, p2: &Coordinate) -> bool {
        point_to_segment(p1, p0, p2) < self.tolerance
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coord;

    #[test]
    fn shallow_concavities() {
        struct Test {
            name: &'static str,
            apex: Coordinate,
            tolerance: f64,
            kept: bool,
        }

        vec![
            Test {
                name: "shallow dent on the buffered side is removed",
                apex: coord!(10, 0.01),
                tolerance: -0.1,
                kept: false,
            },
            Test {
                name: "bump on the other side is kept",
                apex: coord!(10, 0.01),
                tolerance: 0.1,
                kept: true,
            },
            Test {
                name: "deep dent is kept",
                apex: coord!(10, 3),
                tolerance: -0.1,
                kept: true,
            },
        ]
        .into_iter()
        .for_each(|test| {
            let coords = vec![coord!(0, 0), coord!(5, 0), test.apex, coord!(15, 0), coord!(20, 0)];
            let simplified = simplify(&coords, test.tolerance);
            assert_eq!(simplified.contains(&test.apex), test.kept, "{}", test.name);
            assert_eq!(simplified.first(), coords.first(), "{}", test.name);
            assert_eq!(simplified.last(), coords.last(), "{}", test.name);
        });
    }
}
