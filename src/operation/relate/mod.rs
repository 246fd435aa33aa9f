//! The DE-9IM relationship between two geometries, and the named predicates derived from
//! it.

mod computer;
pub(crate) mod edge_ends;
pub(crate) mod node_graph;

use crate::{
    algorithm::BoundaryNodeRule,
    error::{GeometryError, Result},
    geom::{Geometry, IntersectionMatrix},
};

use self::computer::RelateComputer;

/// Computes the intersection matrix of two geometries.
///
/// Geometry collections are not supported, since their components may overlap and the
/// labels of such overlaps are ambiguous.
#[derive(Debug, Clone, Copy)]
pub struct RelateOp<'a> {
    a: &'a Geometry,
    b: &'a Geometry,
    rule: BoundaryNodeRule,
}

impl<'a> RelateOp<'a> {
    pub fn new(a: &'a Geometry, b: &'a Geometry) -> Self {
        Self {
            a,
            b,
            rule: BoundaryNodeRule::default(),
        }
    }

    /// Uses the given rule to decide which line end points are in the boundary.
    pub fn with_rule(mut self, rule: BoundaryNodeRule) -> Self {
        self.rule = rule;
        self
    }

    pub fn matrix(&self) -> Result<IntersectionMatrix> {
        for geometry in [self.a, self.b] {
            if matches!(geometry.kind(), crate::geom::GeometryKind::GeometryCollection(_)) {
                return Err(GeometryError::illegal(
                    "relate does not support geometry collection arguments",
                ));
            }
        }

        RelateComputer::new(self.a, self.b, self.rule).compute_im()
    }

    /// Returns true if the matrix matches the given 9-character pattern.
    pub fn relate_pattern(&self, pattern: &str) -> Result<bool> {
        self.matrix()?.matches(pattern)
    }

    pub fn intersects(&self) -> Result<bool> {
        if !self.envelopes_intersect() {
            return Ok(false);
        }
        Ok(self.matrix()?.is_intersects())
    }

    pub fn disjoint(&self) -> Result<bool> {
        self.intersects().map(|intersects| !intersects)
    }

    pub fn contains(&self) -> Result<bool> {
        if self.b.dimension() > self.a.dimension() || !self.a.envelope().covers(&self.b.envelope()) {
            return Ok(false);
        }
        Ok(self.matrix()?.is_contains())
    }

    pub fn within(&self) -> Result<bool> {
        RelateOp { a: self.b, b: self.a, rule: self.rule }.contains()
    }

    pub fn covers(&self) -> Result<bool> {
        if self.b.dimension() > self.a.dimension() || !self.a.envelope().covers(&self.b.envelope()) {
            return Ok(false);
        }
        Ok(self.matrix()?.is_covers())
    }

    pub fn covered_by(&self) -> Result<bool> {
        RelateOp { a: self.b, b: self.a, rule: self.rule }.covers()
    }

    pub fn touches(&self) -> Result<bool> {
        if !self.envelopes_intersect() {
            return Ok(false);
        }
        Ok(self
            .matrix()?
            .is_touches(self.a.dimension(), self.b.dimension()))
    }

    pub fn crosses(&self) -> Result<bool> {
        if !self.envelopes_intersect() {
            return Ok(false);
        }
        Ok(self
            .matrix()?
            .is_crosses(self.a.dimension(), self.b.dimension()))
    }

    pub fn overlaps(&self) -> Result<bool> {
        if !self.envelopes_intersect() {
            return Ok(false);
        }
        Ok(self
            .matrix()?
            .is_overlaps(self.a.dimension(), self.b.dimension()))
    }

    /// Returns true if both geometries are topologically equal, regardless of their
    /// vertices.
    pub fn equals_topo(&self) -> Result<bool> {
        if self.a.envelope() != self.b.envelope() {
            return Ok(false);
        }
        Ok(self
            .matrix()?
            .is_equals(self.a.dimension(), self.b.dimension()))
    }

    fn envelopes_intersect(&self) -> bool {
        self.a.envelope().intersects(&self.b.envelope())
    }
}
