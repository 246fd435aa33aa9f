//! The operations on geometries, and their entry points on [`Geometry`].

pub mod boundary;
pub mod buffer;
pub mod overlay;
pub mod relate;
pub mod simple;
pub mod valid;

use crate::{
    algorithm::{centroid, hull, measure},
    error::Result,
    geom::{Geometry, IntersectionMatrix},
};

use self::{
    boundary::BoundaryOp,
    buffer::{BufferOp, BufferParameters},
    overlay::{OpCode, robust},
    relate::RelateOp,
    simple::IsSimpleOp,
    valid::{IsValidOp, ValidationError},
};

impl Geometry {
    /// Returns true if the geometry satisfies the topological rules of its variant.
    pub fn is_valid(&self) -> Result<bool> {
        IsValidOp::new(self).is_valid()
    }

    /// Returns the first reason found for the geometry to be invalid, if any.
    pub fn validation_error(&self) -> Result<Option<ValidationError>> {
        IsValidOp::new(self).validation_error()
    }

    pub fn is_simple(&self) -> Result<bool> {
        IsSimpleOp::new(self).is_simple()
    }

    /// Returns the area within the given distance of the geometry, with round joins and
    /// caps.
    pub fn buffer(&self, distance: f64) -> Result<Geometry> {
        BufferOp::new(self).result(distance)
    }

    pub fn buffer_with(&self, distance: f64, params: BufferParameters) -> Result<Geometry> {
        BufferOp::new(self).with_params(params).result(distance)
    }

    pub fn intersection(&self, other: &Geometry) -> Result<Geometry> {
        robust::overlay(self, other, OpCode::Intersection)
    }

    /// Returns the union of both geometries. Collections are dissolved as a whole.
    pub fn union(&self, other: &Geometry) -> Result<Geometry> {
        if self.is_collection() || other.is_collection() {
            return self
                .factory()
                .collection(vec![self.clone(), other.clone()])
                .unary_union();
        }
        robust::overlay(self, other, OpCode::Union)
    }

    pub fn difference(&self, other: &Geometry) -> Result<Geometry> {
        robust::overlay(self, other, OpCode::Difference)
    }

    pub fn sym_difference(&self, other: &Geometry) -> Result<Geometry> {
        robust::overlay(self, other, OpCode::SymDifference)
    }

    /// Returns the union of every component of the geometry.
    pub fn unary_union(&self) -> Result<Geometry> {
        overlay::unary_union(self)
    }

    pub fn convex_hull(&self) -> Geometry {
        hull::convex_hull(self)
    }

    /// Returns the centroid as a point, empty for an empty geometry.
    pub fn centroid(&self) -> Geometry {
        match centroid::centroid(self) {
            Some(coord) => self.factory().point(coord),
            None => self.factory().empty_point(),
        }
    }

    pub fn area(&self) -> f64 {
        measure::area(self)
    }

    pub fn length(&self) -> f64 {
        measure::length(self)
    }

    /// Returns the topological boundary, failing for geometry collections.
    pub fn boundary(&self) -> Result<Geometry> {
        BoundaryOp::new(self).boundary()
    }

    pub fn relate(&self, other: &Geometry) -> Result<IntersectionMatrix> {
        RelateOp::new(self, other).matrix()
    }

    /// Returns true if the intersection matrix with the other geometry matches the
    /// pattern.
    pub fn relate_pattern(&self, other: &Geometry, pattern: &str) -> Result<bool> {
        RelateOp::new(self, other).relate_pattern(pattern)
    }

    pub fn intersects(&self, other: &Geometry) -> Result<bool> {
        RelateOp::new(self, other).intersects()
    }

    pub fn disjoint(&self, other: &Geometry) -> Result<bool> {
        RelateOp::new(self, other).disjoint()
    }

    pub fn contains(&self, other: &Geometry) -> Result<bool> {
        RelateOp::new(self, other).contains()
    }

    pub fn within(&self, other: &Geometry) -> Result<bool> {
        RelateOp::new(self, other).within()
    }

    pub fn touches(&self, other: &Geometry) -> Result<bool> {
        RelateOp::new(self, other).touches()
    }

    pub fn crosses(&self, other: &Geometry) -> Result<bool> {
        RelateOp::new(self, other).crosses()
    }

    pub fn overlaps(&self, other: &Geometry) -> Result<bool> {
        RelateOp::new(self, other).overlaps()
    }

    pub fn covers(&self, other: &Geometry) -> Result<bool> {
        RelateOp::new(self, other).covers()
    }

    pub fn covered_by(&self, other: &Geometry) -> Result<bool> {
        RelateOp::new(self, other).covered_by()
    }

    /// Returns true if both geometries cover the same points, whatever their vertices.
    pub fn equals_topo(&self, other: &Geometry) -> Result<bool> {
        RelateOp::new(self, other).equals_topo()
    }
}
