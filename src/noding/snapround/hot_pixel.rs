use crate::{algorithm::orientation, geom::Coordinate};

/// Half the side of a pixel, in scaled units.
const TOLERANCE: f64 = 0.5;

/// The square grid cell around a rounded vertex or intersection point.
///
/// Segments passing through a hot pixel are snapped to its centre. The pixel is
/// half-open: it includes its left and bottom sides but not the right and top ones, so
/// that neighbouring pixels do not overlap.
#[derive(Debug, Clone, PartialEq)]
pub struct HotPixel {
    original: Coordinate,
    scale: f64,
    x: f64,
    y: f64,
    is_node: bool,
}

impl HotPixel {
    /// Returns the pixel of an already rounded point, for the given grid scale.
    pub fn new(p: Coordinate, scale: f64) -> Self {
        let (x, y) = if scale == 1.0 {
            (p.x, p.y)
        } else {
            ((p.x * scale).round(), (p.y * scale).round())
        };

        Self {
            original: p,
            scale,
            x,
            y,
            is_node: false,
        }
    }

    /// Returns the centre of the pixel, in input units.
    pub fn coordinate(&self) -> &Coordinate {
        &self.original
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Returns true if the pixel must become a node of every segment through it.
    pub fn is_node(&self) -> bool {
        self.is_node
    }

    pub fn set_to_node(&mut self) {
        self.is_node = true;
    }

    fn scaled(&self, value: f64) -> f64 {
        if self.scale == 1.0 {
            value
        } else {
            value * self.scale
        }
    }

    /// Returns true if the pixel contains the given point.
    pub fn intersects_point(&self, p: &Coordinate) -> bool {
        let (x, y) = (self.scaled(p.x), self.scaled(p.y));
        x >= self.x - TOLERANCE && x < self.x + TOLERANCE && y >= self.y - TOLERANCE && y < self.y + TOLERANCE
    }

    /// Returns true if the segment `p0`-`p1` intersects the pixel.
    pub fn intersects(&self, p0: &Coordinate, p1: &Coordinate) -> bool {
        let p0 = Coordinate::new(self.scaled(p0.x), self.scaled(p0.y));
        let p1 = Coordinate::new(self.scaled(p1.x), self.scaled(p1.y));
        self.intersects_scaled(p0, p1)
    }

    fn intersects_scaled(&self, p0: Coordinate, p1: Coordinate) -> bool {
        // orient the segment left to right
        let (p, q) = if p0.x > p1.x { (p1, p0) } else { (p0, p1) };

        let max_x = self.x + TOLERANCE;
        let min_x = self.x - TOLERANCE;
        let max_y = self.y + TOLERANCE;
        let min_y = self.y - TOLERANCE;
        if p.x.min(q.x) >= max_x
            || p.x.max(q.x) < min_x
            || p.y.min(q.y) >= max_y
            || p.y.max(q.y) < min_y
        {
            return false;
        }

        // axis-parallel segments now cross the interior or the closed sides
        if p.x == q.x || p.y == q.y {
            return true;
        }

        let orient = |x: f64, y: f64| orientation::index(&p, &q, &Coordinate::new(x, y));

        let upper_left = orient(min_x, max_y);
        if upper_left == 0 {
            return p.y >= q.y;
        }

        let upper_right = orient(max_x, max_y);
        if upper_right == 0 {
            return p.y <= q.y;
        }
        if upper_left != upper_right {
            return true;
        }

        let lower_left = orient(min_x, min_y);
        if lower_left == 0 || lower_left != upper_left {
            return true;
        }

        let lower_right = orient(max_x, min_y);
        if lower_right == 0 {
            return p.y >= q.y;
        }

        lower_left != lower_right || lower_right != upper_right
    }
}
