use crate::geom::Coordinate;

/// An axis-aligned bounding rectangle.
///
/// The null envelope (`min_x > max_x`) is empty: it contains and intersects nothing.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Envelope {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
}

impl Default for Envelope {
    fn default() -> Self {
        Self::null()
    }
}

impl Envelope {
    /// Returns the empty envelope.
    pub const fn null() -> Self {
        Self {
            min_x: 0.,
            max_x: -1.,
            min_y: 0.,
            max_y: -1.,
        }
    }

    /// Returns the envelope bounded by the given ordinates, in any order.
    pub fn new(x1: f64, x2: f64, y1: f64, y2: f64) -> Self {
        Self {
            min_x: x1.min(x2),
            max_x: x1.max(x2),
            min_y: y1.min(y2),
            max_y: y1.max(y2),
        }
    }

    /// Returns the envelope of a single coordinate.
    pub fn of_point(p: &Coordinate) -> Self {
        Self::new(p.x, p.x, p.y, p.y)
    }

    /// Returns the envelope spanned by two coordinates.
    pub fn of_segment(p: &Coordinate, q: &Coordinate) -> Self {
        Self::new(p.x, q.x, p.y, q.y)
    }

    /// Returns the envelope of all the given coordinates.
    pub fn of_coordinates<'a>(coords: impl IntoIterator<Item = &'a Coordinate>) -> Self {
        let mut env = Self::null();
        coords.into_iter().for_each(|c| env.expand_to_include(c));
        env
    }

    pub fn is_null(&self) -> bool {
        self.max_x < self.min_x
    }

    pub fn set_to_null(&mut self) {
        *self = Self::null();
    }

    pub fn width(&self) -> f64 {
        if self.is_null() { 0. } else { self.max_x - self.min_x }
    }

    pub fn height(&self) -> f64 {
        if self.is_null() { 0. } else { self.max_y - self.min_y }
    }

    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }

    /// Returns the length of the diagonal.
    pub fn diameter(&self) -> f64 {
        self.width().hypot(self.height())
    }

    /// Returns the larger of width and height.
    pub fn max_extent(&self) -> f64 {
        self.width().max(self.height())
    }

    pub fn centre(&self) -> Option<Coordinate> {
        (!self.is_null()).then(|| {
            Coordinate::new(
                (self.min_x + self.max_x) / 2.,
                (self.min_y + self.max_y) / 2.,
            )
        })
    }

    /// Grows self to cover the given coordinate. Never shrinks.
    pub fn expand_to_include(&mut self, p: &Coordinate) {
        self.expand_to_include_xy(p.x, p.y);
    }

    pub fn expand_to_include_xy(&mut self, x: f64, y: f64) {
        if self.is_null() {
            *self = Self::new(x, x, y, y);
            return;
        }

        self.min_x = self.min_x.min(x);
        self.max_x = self.max_x.max(x);
        self.min_y = self.min_y.min(y);
        self.max_y = self.max_y.max(y);
    }

    /// Grows self to cover the given envelope. Never shrinks.
    pub fn expand_to_include_envelope(&mut self, other: &Envelope) {
        if other.is_null() {
            return;
        }

        if self.is_null() {
            *self = *other;
            return;
        }

        self.min_x = self.min_x.min(other.min_x);
        self.max_x = self.max_x.max(other.max_x);
        self.min_y = self.min_y.min(other.min_y);
        self.max_y = self.max_y.max(other.max_y);
    }

    /// Expands every side of self by the given distance; a negative distance may empty it.
    pub fn expand_by(&mut self, distance: f64) {
        if self.is_null() {
            return;
        }

        self.min_x -= distance;
        self.max_x += distance;
        self.min_y -= distance;
        self.max_y += distance;

        if self.min_x > self.max_x || self.min_y > self.max_y {
            self.set_to_null();
        }
    }

    /// Returns the union of self and other.
    pub fn union(&self, other: &Envelope) -> Envelope {
        let mut env = *self;
        env.expand_to_include_envelope(other);
        env
    }

    /// Returns the common area of self and other, null if they do not intersect.
    pub fn intersection(&self, other: &Envelope) -> Envelope {
        if !self.intersects(other) {
            return Self::null();
        }

        Self::new(
            self.min_x.max(other.min_x),
            self.max_x.min(other.max_x),
            self.min_y.max(other.min_y),
            self.max_y.min(other.max_y),
        )
    }

    pub fn intersects(&self, other: &Envelope) -> bool {
        !self.is_null()
            && !other.is_null()
            && other.min_x <= self.max_x
            && other.max_x >= self.min_x
            && other.min_y <= self.max_y
            && other.max_y >= self.min_y
    }

    pub fn intersects_point(&self, p: &Coordinate) -> bool {
        !self.is_null()
            && p.x >= self.min_x
            && p.x <= self.max_x
            && p.y >= self.min_y
            && p.y <= self.max_y
    }

    /// Returns true if the envelope of segment `p`-`q` intersects self.
    pub fn intersects_segment(&self, p: &Coordinate, q: &Coordinate) -> bool {
        self.intersects(&Envelope::of_segment(p, q))
    }

    /// Returns true if other lies within self, boundary included.
    pub fn covers(&self, other: &Envelope) -> bool {
        !self.is_null()
            && !other.is_null()
            && other.min_x >= self.min_x
            && other.max_x <= self.max_x
            && other.min_y >= self.min_y
            && other.max_y <= self.max_y
    }

    /// Same as [`Envelope::covers`].
    pub fn contains(&self, other: &Envelope) -> bool {
        self.covers(other)
    }

    pub fn covers_point(&self, p: &Coordinate) -> bool {
        self.intersects_point(p)
    }

    /// Returns true if other lies within self without touching its sides.
    pub fn contains_properly(&self, other: &Envelope) -> bool {
        self.covers(other)
            && other.min_x > self.min_x
            && other.max_x < self.max_x
            && other.min_y > self.min_y
            && other.max_y < self.max_y
    }

    /// Returns the distance between self and other, zero if they intersect.
    pub fn distance(&self, other: &Envelope) -> f64 {
        if self.intersects(other) {
            return 0.;
        }

        let dx = if self.max_x < other.min_x {
            other.min_x - self.max_x
        } else if self.min_x > other.max_x {
            self.min_x - other.max_x
        } else {
            0.
        };
        let dy = if self.max_y < other.min_y {
            other.min_y - self.max_y
        } else if self.min_y > other.max_y {
            self.min_y - other.max_y
        } else {
            0.
        };

        dx.hypot(dy)
    }

    /// Moves self by the given offsets.
    pub fn translate(&mut self, dx: f64, dy: f64) {
        if self.is_null() {
            return;
        }
        *self = Self::new(self.min_x + dx, self.max_x + dx, self.min_y + dy, self.max_y + dy);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coord;

    #[test]
    fn null_envelope() {
        let env = Envelope::null();
        assert!(env.is_null());
        assert!(!env.intersects(&env));
        assert!(!env.covers_point(&coord!(0, 0)));
        assert_eq!(env.area(), 0.);
    }

    #[test]
    fn intersection_tests() {
        struct Test {
            name: &'static str,
            a: Envelope,
            b: Envelope,
            intersects: bool,
            covers: bool,
        }

        vec![
            Test {
                name: "overlapping",
                a: Envelope::new(0., 2., 0., 2.),
                b: Envelope::new(1., 3., 1., 3.),
                intersects: true,
                covers: false,
            },
            Test {
                name: "touching corners",
                a: Envelope::new(0., 1., 0., 1.),
                b: Envelope::new(1., 2., 1., 2.),
                intersects: true,
                covers: false,
            },
            Test {
                name: "disjoint",
                a: Envelope::new(0., 1., 0., 1.),
                b: Envelope::new(2., 3., 0., 1.),
                intersects: false,
                covers: false,
            },
            Test {
                name: "nested",
                a: Envelope::new(0., 4., 0., 4.),
                b: Envelope::new(1., 2., 1., 2.),
                intersects: true,
                covers: true,
            },
        ]
        .into_iter()
        .for_each(|test| {
            assert_eq!(test.a.intersects(&test.b), test.intersects, "{}", test.name);
            assert_eq!(test.a.covers(&test.b), test.covers, "{}", test.name);
        });
    }

    #[test]
    fn distance_between_disjoint_envelopes() {
        let a = Envelope::new(0., 1., 0., 1.);
        let b = Envelope::new(4., 5., 5., 6.);
        assert_eq!(a.distance(&b), 5.);
    }

    #[test]
    fn expand_by_negative_collapses() {
        let mut env = Envelope::new(0., 1., 0., 1.);
        env.expand_by(-1.);
        assert!(env.is_null());
    }
}
