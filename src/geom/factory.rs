use std::sync::Arc;

use crate::{
    error::{GeometryError, Result},
    geom::{
        Coordinate, CoordinateSequence, Geometry, GeometryKind, LineString, LinearRing, Point,
        Polygon, PrecisionModel,
    },
};

/// Builds geometries sharing a precision model and a spatial reference id.
///
/// Factories are shared through an [`Arc`]; two geometries are compatible operands of a
/// binary operation if, and only if, their factories are equal.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct GeometryFactory {
    precision: PrecisionModel,
    srid: i32,
}

impl GeometryFactory {
    /// Returns a shared factory with the given configuration.
    pub fn new(precision: PrecisionModel, srid: i32) -> Arc<Self> {
        Arc::new(Self { precision, srid })
    }

    /// Returns a shared floating precision factory with no spatial reference.
    pub fn floating() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn precision_model(&self) -> PrecisionModel {
        self.precision
    }

    pub fn srid(&self) -> i32 {
        self.srid
    }

    fn precise(&self, coords: impl Into<CoordinateSequence>) -> CoordinateSequence {
        let mut seq = coords.into();
        if !self.precision.is_floating() {
            let precision = self.precision;
            seq.apply(|_, c| *c = precision.make_precise_coordinate(c));
        }
        seq
    }

    fn wrap(self: &Arc<Self>, kind: GeometryKind) -> Geometry {
        Geometry::new(kind, Arc::clone(self))
    }

    pub fn point(self: &Arc<Self>, coord: impl Into<Coordinate>) -> Geometry {
        let coord = self.precision.make_precise_coordinate(&coord.into());
        self.wrap(GeometryKind::Point(Point::new(coord)))
    }

    pub fn empty_point(self: &Arc<Self>) -> Geometry {
        self.wrap(GeometryKind::Point(Point::empty()))
    }

    /// Returns a line string; fails if it has exactly one point.
    pub fn line_string(self: &Arc<Self>, coords: impl Into<CoordinateSequence>) -> Result<Geometry> {
        let line = LineString::new(self.precise(coords))?;
        Ok(self.wrap(GeometryKind::LineString(line)))
    }

    /// Returns a linear ring; fails unless it is empty or closed with at least 4 points.
    pub fn linear_ring(self: &Arc<Self>, coords: impl Into<CoordinateSequence>) -> Result<Geometry> {
        let ring = LinearRing::new(self.precise(coords))?;
        Ok(self.wrap(GeometryKind::LinearRing(ring)))
    }

    /// Returns a polygon from a shell and its holes, each given as closed coordinate lists.
    pub fn polygon(
        self: &Arc<Self>,
        shell: impl Into<CoordinateSequence>,
        holes: Vec<CoordinateSequence>,
    ) -> Result<Geometry> {
        let shell = LinearRing::new(self.precise(shell))?;
        let holes = holes
            .into_iter()
            .map(|hole| LinearRing::new(self.precise(hole)))
            .collect::<Result<Vec<_>>>()?;
        Ok(self.wrap(GeometryKind::Polygon(Polygon::new(shell, holes)?)))
    }

    pub fn empty_polygon(self: &Arc<Self>) -> Geometry {
        self.wrap(GeometryKind::Polygon(Polygon::empty()))
    }

    pub fn empty_line_string(self: &Arc<Self>) -> Geometry {
        self.wrap(GeometryKind::LineString(LineString::empty()))
    }

    pub fn empty_collection(self: &Arc<Self>) -> Geometry {
        self.wrap(GeometryKind::GeometryCollection(Vec::new()))
    }

    /// Returns an empty geometry of the natural type for the given dimension.
    pub fn empty(self: &Arc<Self>, dimension: i32) -> Geometry {
        match dimension {
            0 => self.empty_point(),
            1 => self.empty_line_string(),
            2 => self.empty_polygon(),
            _ => self.empty_collection(),
        }
    }

    pub fn multi_point(self: &Arc<Self>, points: Vec<Point>) -> Geometry {
        self.wrap(GeometryKind::MultiPoint(points))
    }

    pub fn multi_line_string(self: &Arc<Self>, lines: Vec<LineString>) -> Geometry {
        self.wrap(GeometryKind::MultiLineString(lines))
    }

    pub fn multi_polygon(self: &Arc<Self>, polygons: Vec<Polygon>) -> Geometry {
        self.wrap(GeometryKind::MultiPolygon(polygons))
    }

    pub fn collection(self: &Arc<Self>, geometries: Vec<Geometry>) -> Geometry {
        self.wrap(GeometryKind::GeometryCollection(geometries))
    }

    /// Wraps already-built components into a geometry of the given kind.
    pub fn from_kind(self: &Arc<Self>, kind: GeometryKind) -> Geometry {
        self.wrap(kind)
    }

    pub fn from_polygon(self: &Arc<Self>, polygon: Polygon) -> Geometry {
        self.wrap(GeometryKind::Polygon(polygon))
    }

    pub fn from_line_string(self: &Arc<Self>, line: LineString) -> Geometry {
        self.wrap(GeometryKind::LineString(line))
    }

    /// Builds the most specific geometry able to hold all the given ones.
    ///
    /// A single geometry is returned as is; homogeneous atomic lists become the matching
    /// multi-geometry; anything else becomes a collection.
    pub fn build_geometry(self: &Arc<Self>, mut geometries: Vec<Geometry>) -> Geometry {
        if geometries.is_empty() {
            return self.empty_collection();
        }

        if geometries.len() == 1 {
            return geometries.remove(0);
        }

        if geometries
            .iter()
            .all(|g| matches!(g.kind(), GeometryKind::Polygon(_)))
        {
            let polygons = geometries
                .into_iter()
                .filter_map(|g| match g.into_kind() {
                    GeometryKind::Polygon(p) => Some(p),
                    _ => None,
                })
                .collect();
            return self.multi_polygon(polygons);
        }

        if geometries
            .iter()
            .all(|g| matches!(g.kind(), GeometryKind::LineString(_) | GeometryKind::LinearRing(_)))
        {
            let lines = geometries
                .into_iter()
                .filter_map(|g| match g.into_kind() {
                    GeometryKind::LineString(l) => Some(l),
                    GeometryKind::LinearRing(r) => Some(LineString::from(r)),
                    _ => None,
                })
                .collect();
            return self.multi_line_string(lines);
        }

        if geometries
            .iter()
            .all(|g| matches!(g.kind(), GeometryKind::Point(_)))
        {
            let points = geometries
                .into_iter()
                .filter_map(|g| match g.into_kind() {
                    GeometryKind::Point(p) => Some(p),
                    _ => None,
                })
                .collect();
            return self.multi_point(points);
        }

        self.collection(geometries)
    }

    /// Fails if the given factories are not compatible operands.
    pub fn check_compatible(a: &GeometryFactory, b: &GeometryFactory) -> Result<()> {
        if a != b {
            return Err(GeometryError::illegal(
                "operands have different precision models or SRIDs",
            ));
        }
        Ok(())
    }
}
