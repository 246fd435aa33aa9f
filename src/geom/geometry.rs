use std::sync::{Arc, OnceLock};

use crate::{
    algorithm::orientation::is_ccw,
    error::{GeometryError, Result},
    geom::{
        Coordinate, CoordinateSequence, Envelope, GeometryFactory, PrecisionModel,
        sequence::{increasing_direction, min_coordinate_index},
    },
    tolerance::{IsClose, Tolerance},
};

/// A single, possibly empty, location.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Point {
    coord: Option<Coordinate>,
}

impl Point {
    pub fn new(coord: Coordinate) -> Self {
        Self { coord: Some(coord) }
    }

    pub fn empty() -> Self {
        Self { coord: None }
    }

    pub fn coordinate(&self) -> Option<&Coordinate> {
        self.coord.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.coord.is_none()
    }
}

/// A sequence of connected segments.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LineString {
    coords: CoordinateSequence,
}

impl LineString {
    /// Returns a line through the given coordinates; a single point is not a line.
    pub fn new(coords: CoordinateSequence) -> Result<Self> {
        if coords.len() == 1 {
            return Err(GeometryError::illegal(
                "invalid number of points in LineString (found 1 - must be 0 or >= 2)",
            ));
        }
        Ok(Self { coords })
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn coords(&self) -> &CoordinateSequence {
        &self.coords
    }

    pub fn coords_mut(&mut self) -> &mut CoordinateSequence {
        &mut self.coords
    }

    pub fn is_empty(&self) -> bool {
        self.coords.is_empty()
    }

    pub fn is_closed(&self) -> bool {
        !self.is_empty() && self.coords.is_closed()
    }

    pub fn is_ring(&self) -> bool {
        self.coords.is_ring()
    }

    pub fn len(&self) -> usize {
        self.coords.len()
    }
}

impl From<LinearRing> for LineString {
    fn from(ring: LinearRing) -> Self {
        Self { coords: ring.coords }
    }
}

/// A closed, simple line string bounding an area.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LinearRing {
    coords: CoordinateSequence,
}

impl LinearRing {
    /// The fewest points a non-empty ring may have.
    pub const MINIMUM_VALID_SIZE: usize = 4;

    /// Returns a ring over the given coordinates; it must be empty or closed with at least
    /// 4 points.
    pub fn new(coords: CoordinateSequence) -> Result<Self> {
        if !coords.is_empty() && !coords.is_closed() {
            return Err(GeometryError::illegal("points of LinearRing do not form a closed linestring"));
        }
        if !coords.is_empty() && coords.len() < Self::MINIMUM_VALID_SIZE {
            return Err(GeometryError::illegal(format!(
                "invalid number of points in LinearRing (found {} - must be 0 or >= 4)",
                coords.len()
            )));
        }
        Ok(Self { coords })
    }

    /// Returns a ring without checking its closure nor its size.
    ///
    /// Used to carry externally decoded data into validity checking.
    pub fn new_unchecked(coords: CoordinateSequence) -> Self {
        Self { coords }
    }

    pub fn coords(&self) -> &CoordinateSequence {
        &self.coords
    }

    pub fn coords_mut(&mut self) -> &mut CoordinateSequence {
        &mut self.coords
    }

    pub fn is_empty(&self) -> bool {
        self.coords.is_empty()
    }

    pub fn len(&self) -> usize {
        self.coords.len()
    }

    pub fn envelope(&self) -> Envelope {
        self.coords.envelope()
    }

    /// Returns true if the ring is oriented counter-clockwise.
    pub fn is_ccw(&self) -> bool {
        is_ccw(self.coords.as_slice())
    }

    fn normalize(&mut self, clockwise: bool) {
        if self.coords.len() < 4 {
            return;
        }

        let mut coords = self.coords.to_vec();
        coords.pop();
        if let Some(min) = min_coordinate_index(&coords) {
            coords.rotate_left(min);
        }
        if let Some(first) = coords.first().copied() {
            coords.push(first);
        }
        if is_ccw(&coords) == clockwise {
            coords.reverse();
        }
        self.coords = coords.into();
    }
}

/// An area bounded by one shell and any number of holes.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Polygon {
    shell: LinearRing,
    holes: Vec<LinearRing>,
}

impl Polygon {
    pub fn new(shell: LinearRing, holes: Vec<LinearRing>) -> Result<Self> {
        if shell.is_empty() && holes.iter().any(|hole| !hole.is_empty()) {
            return Err(GeometryError::illegal("shell is empty but holes are not"));
        }
        Ok(Self { shell, holes })
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn shell(&self) -> &LinearRing {
        &self.shell
    }

    pub fn holes(&self) -> &[LinearRing] {
        &self.holes
    }

    /// Returns an iterator over the shell followed by the holes.
    pub fn rings(&self) -> impl Iterator<Item = &LinearRing> {
        std::iter::once(&self.shell).chain(self.holes.iter())
    }

    pub(crate) fn rings_mut(&mut self) -> impl Iterator<Item = &mut LinearRing> {
        std::iter::once(&mut self.shell).chain(self.holes.iter_mut())
    }

    pub fn is_empty(&self) -> bool {
        self.shell.is_empty()
    }

    pub fn envelope(&self) -> Envelope {
        self.shell.envelope()
    }
}

/// The closed set of geometry variants.
#[derive(Debug, Clone, PartialEq)]
pub enum GeometryKind {
    Point(Point),
    LineString(LineString),
    LinearRing(LinearRing),
    Polygon(Polygon),
    MultiPoint(Vec<Point>),
    MultiLineString(Vec<LineString>),
    MultiPolygon(Vec<Polygon>),
    GeometryCollection(Vec<Geometry>),
}

/// A geometry variant together with the factory that built it.
///
/// The envelope is computed lazily and cached; every mutable access through
/// [`Geometry::kind_mut`] or [`Geometry::apply_coordinates`] invalidates it.
#[derive(Debug, Clone)]
pub struct Geometry {
    kind: GeometryKind,
    factory: Arc<GeometryFactory>,
    envelope: OnceLock<Envelope>,
}

impl PartialEq for Geometry {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
    }
}

impl Geometry {
    pub fn new(kind: GeometryKind, factory: Arc<GeometryFactory>) -> Self {
        Self {
            kind,
            factory,
            envelope: OnceLock::new(),
        }
    }

    pub fn kind(&self) -> &GeometryKind {
        &self.kind
    }

    /// Returns the variant for mutation, discarding the cached envelope.
    pub fn kind_mut(&mut self) -> &mut GeometryKind {
        self.geometry_changed();
        &mut self.kind
    }

    pub fn into_kind(self) -> GeometryKind {
        self.kind
    }

    pub fn factory(&self) -> &Arc<GeometryFactory> {
        &self.factory
    }

    pub fn srid(&self) -> i32 {
        self.factory.srid()
    }

    pub fn precision_model(&self) -> PrecisionModel {
        self.factory.precision_model()
    }

    /// Discards cached derived data after the coordinates have been changed.
    pub fn geometry_changed(&mut self) {
        self.envelope = OnceLock::new();
    }

    pub fn envelope(&self) -> Envelope {
        *self.envelope.get_or_init(|| {
            let mut env = Envelope::null();
            self.for_each_coordinate(|c| env.expand_to_include(c));
            env
        })
    }

    /// Returns the name of the variant, as written in WKT.
    pub fn geometry_type(&self) -> &'static str {
        match &self.kind {
            GeometryKind::Point(_) => "Point",
            GeometryKind::LineString(_) => "LineString",
            GeometryKind::LinearRing(_) => "LinearRing",
            GeometryKind::Polygon(_) => "Polygon",
            GeometryKind::MultiPoint(_) => "MultiPoint",
            GeometryKind::MultiLineString(_) => "MultiLineString",
            GeometryKind::MultiPolygon(_) => "MultiPolygon",
            GeometryKind::GeometryCollection(_) => "GeometryCollection",
        }
    }

    pub fn is_empty(&self) -> bool {
        match &self.kind {
            GeometryKind::Point(p) => p.is_empty(),
            GeometryKind::LineString(l) => l.is_empty(),
            GeometryKind::LinearRing(r) => r.is_empty(),
            GeometryKind::Polygon(p) => p.is_empty(),
            GeometryKind::MultiPoint(ps) => ps.iter().all(Point::is_empty),
            GeometryKind::MultiLineString(ls) => ls.iter().all(LineString::is_empty),
            GeometryKind::MultiPolygon(ps) => ps.iter().all(Polygon::is_empty),
            GeometryKind::GeometryCollection(gs) => gs.iter().all(Geometry::is_empty),
        }
    }

    /// Returns the topological dimension: 0, 1, 2, or -1 for an empty collection.
    pub fn dimension(&self) -> i32 {
        match &self.kind {
            GeometryKind::Point(_) | GeometryKind::MultiPoint(_) => 0,
            GeometryKind::LineString(_)
            | GeometryKind::LinearRing(_)
            | GeometryKind::MultiLineString(_) => 1,
            GeometryKind::Polygon(_) | GeometryKind::MultiPolygon(_) => 2,
            GeometryKind::GeometryCollection(gs) => {
                gs.iter().map(Geometry::dimension).max().unwrap_or(-1)
            }
        }
    }

    /// Returns the dimension of the boundary, -1 if it is empty.
    pub fn boundary_dimension(&self) -> i32 {
        match &self.kind {
            GeometryKind::Point(_) | GeometryKind::MultiPoint(_) => -1,
            GeometryKind::LineString(l) if l.is_closed() => -1,
            GeometryKind::LinearRing(_) => -1,
            GeometryKind::LineString(_) => 0,
            GeometryKind::MultiLineString(ls) => {
                if ls.iter().all(LineString::is_closed) { -1 } else { 0 }
            }
            GeometryKind::Polygon(_) | GeometryKind::MultiPolygon(_) => 1,
            GeometryKind::GeometryCollection(gs) => gs
                .iter()
                .map(Geometry::boundary_dimension)
                .max()
                .unwrap_or(-1),
        }
    }

    pub fn is_polygonal(&self) -> bool {
        matches!(self.kind, GeometryKind::Polygon(_) | GeometryKind::MultiPolygon(_))
    }

    pub fn is_lineal(&self) -> bool {
        matches!(
            self.kind,
            GeometryKind::LineString(_) | GeometryKind::LinearRing(_) | GeometryKind::MultiLineString(_)
        )
    }

    pub fn is_puntal(&self) -> bool {
        matches!(self.kind, GeometryKind::Point(_) | GeometryKind::MultiPoint(_))
    }

    pub fn is_collection(&self) -> bool {
        matches!(self.kind, GeometryKind::GeometryCollection(_))
    }

    /// Visits every vertex in order.
    pub fn for_each_coordinate(&self, mut f: impl FnMut(&Coordinate)) {
        self.visit_coordinates(&mut f);
    }

    fn visit_coordinates(&self, f: &mut impl FnMut(&Coordinate)) {
        match &self.kind {
            GeometryKind::Point(p) => p.coordinate().into_iter().for_each(&mut *f),
            GeometryKind::LineString(l) => l.coords().iter().for_each(&mut *f),
            GeometryKind::LinearRing(r) => r.coords().iter().for_each(&mut *f),
            GeometryKind::Polygon(p) => p.rings().flat_map(|r| r.coords().iter()).for_each(&mut *f),
            GeometryKind::MultiPoint(ps) => ps.iter().filter_map(Point::coordinate).for_each(&mut *f),
            GeometryKind::MultiLineString(ls) => {
                ls.iter().flat_map(|l| l.coords().iter()).for_each(&mut *f)
            }
            GeometryKind::MultiPolygon(ps) => ps
                .iter()
                .flat_map(Polygon::rings)
                .flat_map(|r| r.coords().iter())
                .for_each(&mut *f),
            GeometryKind::GeometryCollection(gs) => gs.iter().for_each(|g| g.visit_coordinates(f)),
        }
    }

    /// Rewrites every vertex in place and invalidates the cached envelope.
    pub fn apply_coordinates(&mut self, mut f: impl FnMut(&mut Coordinate)) {
        self.geometry_changed();
        self.kind.apply(&mut f);
    }

    /// Rewrites every coordinate sequence in place, points being sequences of one
    /// coordinate, and invalidates the cached envelope.
    pub fn apply_sequences(&mut self, mut f: impl FnMut(&mut CoordinateSequence)) {
        self.geometry_changed();
        self.kind.apply_sequences(&mut f);
    }

    pub fn coordinates(&self) -> Vec<Coordinate> {
        let mut coords = Vec::new();
        self.for_each_coordinate(|c| coords.push(*c));
        coords
    }

    pub fn num_points(&self) -> usize {
        let mut count = 0;
        self.for_each_coordinate(|_| count += 1);
        count
    }

    /// Returns the first vertex, if any.
    pub fn coordinate(&self) -> Option<Coordinate> {
        let mut first = None;
        self.for_each_coordinate(|c| {
            if first.is_none() {
                first = Some(*c);
            }
        });
        first
    }

    /// Returns every non-empty polygon, recursing into collections.
    pub fn polygons(&self) -> Vec<&Polygon> {
        let mut out = Vec::new();
        self.collect_polygons(&mut out);
        out
    }

    fn collect_polygons<'a>(&'a self, out: &mut Vec<&'a Polygon>) {
        match &self.kind {
            GeometryKind::Polygon(p) if !p.is_empty() => out.push(p),
            GeometryKind::MultiPolygon(ps) => out.extend(ps.iter().filter(|p| !p.is_empty())),
            GeometryKind::GeometryCollection(gs) => gs.iter().for_each(|g| g.collect_polygons(out)),
            _ => {}
        }
    }

    /// Returns the vertices of every non-empty line string or linear ring, recursing into
    /// collections. Polygon rings are not included.
    pub fn lines(&self) -> Vec<&CoordinateSequence> {
        let mut out = Vec::new();
        self.collect_lines(&mut out);
        out
    }

    fn collect_lines<'a>(&'a self, out: &mut Vec<&'a CoordinateSequence>) {
        match &self.kind {
            GeometryKind::LineString(l) if !l.is_empty() => out.push(l.coords()),
            GeometryKind::LinearRing(r) if !r.is_empty() => out.push(r.coords()),
            GeometryKind::MultiLineString(ls) => out.extend(
                ls.iter().filter(|l| !l.is_empty()).map(LineString::coords),
            ),
            GeometryKind::GeometryCollection(gs) => gs.iter().for_each(|g| g.collect_lines(out)),
            _ => {}
        }
    }

    /// Returns the location of every non-empty point, recursing into collections.
    pub fn points(&self) -> Vec<Coordinate> {
        let mut out = Vec::new();
        self.collect_points(&mut out);
        out
    }

    fn collect_points(&self, out: &mut Vec<Coordinate>) {
        match &self.kind {
            GeometryKind::Point(p) => out.extend(p.coordinate()),
            GeometryKind::MultiPoint(ps) => out.extend(ps.iter().filter_map(Point::coordinate)),
            GeometryKind::GeometryCollection(gs) => gs.iter().for_each(|g| g.collect_points(out)),
            _ => {}
        }
    }

    /// Returns every atomic component as its own geometry.
    pub fn components(&self) -> Vec<Geometry> {
        let factory = &self.factory;
        match &self.kind {
            GeometryKind::MultiPoint(ps) => ps
                .iter()
                .map(|p| factory.from_kind(GeometryKind::Point(p.clone())))
                .collect(),
            GeometryKind::MultiLineString(ls) => ls
                .iter()
                .map(|l| factory.from_kind(GeometryKind::LineString(l.clone())))
                .collect(),
            GeometryKind::MultiPolygon(ps) => ps
                .iter()
                .map(|p| factory.from_kind(GeometryKind::Polygon(p.clone())))
                .collect(),
            GeometryKind::GeometryCollection(gs) => {
                gs.iter().flat_map(Geometry::components).collect()
            }
            _ => vec![self.clone()],
        }
    }

    /// Returns the number of direct children, 1 for atomic geometries.
    pub fn num_geometries(&self) -> usize {
        match &self.kind {
            GeometryKind::MultiPoint(ps) => ps.len(),
            GeometryKind::MultiLineString(ls) => ls.len(),
            GeometryKind::MultiPolygon(ps) => ps.len(),
            GeometryKind::GeometryCollection(gs) => gs.len(),
            _ => 1,
        }
    }

    /// Returns self with shells clockwise, holes counter-clockwise, rings starting at their
    /// smallest vertex, lines in their smallest direction and components sorted.
    pub fn normalized(&self) -> Geometry {
        let mut geometry = self.clone();
        geometry.normalize();
        geometry
    }

    pub fn normalize(&mut self) {
        self.geometry_changed();
        self.kind.normalize();
    }

    /// Returns true if both geometries have the same structure and vertices within the given
    /// tolerance.
    pub fn equals_exact(&self, other: &Geometry, tolerance: f64) -> bool {
        let tolerance = Tolerance::absolute(tolerance);
        if self.geometry_type() != other.geometry_type()
            || self.num_geometries() != other.num_geometries()
            || self.num_points() != other.num_points()
        {
            return false;
        }

        self.coordinates()
            .iter()
            .zip(other.coordinates().iter())
            .all(|(a, b)| a.is_close(b, &tolerance))
    }
}

impl GeometryKind {
    fn apply(&mut self, f: &mut impl FnMut(&mut Coordinate)) {
        fn on_seq(seq: &mut CoordinateSequence, f: &mut impl FnMut(&mut Coordinate)) {
            seq.apply(|_, c| f(c));
        }

        match self {
            GeometryKind::Point(p) => p.coord.iter_mut().for_each(|c| f(c)),
            GeometryKind::LineString(l) => on_seq(&mut l.coords, f),
            GeometryKind::LinearRing(r) => on_seq(&mut r.coords, f),
            GeometryKind::Polygon(p) => p.rings_mut().for_each(|r| on_seq(&mut r.coords, f)),
            GeometryKind::MultiPoint(ps) => ps
                .iter_mut()
                .flat_map(|p| p.coord.iter_mut())
                .for_each(|c| f(c)),
            GeometryKind::MultiLineString(ls) => {
                ls.iter_mut().for_each(|l| on_seq(&mut l.coords, f))
            }
            GeometryKind::MultiPolygon(ps) => ps
                .iter_mut()
                .flat_map(Polygon::rings_mut)
                .for_each(|r| on_seq(&mut r.coords, f)),
            GeometryKind::GeometryCollection(gs) => gs.iter_mut().for_each(|g| {
                g.geometry_changed();
                g.kind.apply(f)
            }),
        }
    }

    fn apply_sequences(&mut self, f: &mut impl FnMut(&mut CoordinateSequence)) {
        fn on_point(point: &mut Point, f: &mut impl FnMut(&mut CoordinateSequence)) {
            if let Some(coord) = point.coord.as_mut() {
                let mut seq = CoordinateSequence::from(vec![*coord]);
                f(&mut seq);
                if let Some(first) = seq.first() {
                    *coord = *first;
                }
            }
        }

        match self {
            GeometryKind::Point(p) => on_point(p, f),
            GeometryKind::LineString(l) => f(&mut l.coords),
            GeometryKind::LinearRing(r) => f(&mut r.coords),
            GeometryKind::Polygon(p) => p.rings_mut().for_each(|r| f(&mut r.coords)),
            GeometryKind::MultiPoint(ps) => ps.iter_mut().for_each(|p| on_point(p, f)),
            GeometryKind::MultiLineString(ls) => ls.iter_mut().for_each(|l| f(&mut l.coords)),
            GeometryKind::MultiPolygon(ps) => ps
                .iter_mut()
                .flat_map(Polygon::rings_mut)
                .for_each(|r| f(&mut r.coords)),
            GeometryKind::GeometryCollection(gs) => gs.iter_mut().for_each(|g| {
                g.geometry_changed();
                g.kind.apply_sequences(f)
            }),
        }
    }

    fn normalize(&mut self) {
        fn normalize_line(line: &mut LineString) {
            if increasing_direction(line.coords.as_slice()).is_gt() {
                line.coords.reverse();
            }
        }

        fn normalize_polygon(polygon: &mut Polygon) {
            polygon.shell.normalize(true);
            polygon.holes.iter_mut().for_each(|h| h.normalize(false));
            polygon.holes.sort_by(|a, b| compare_sequences(a.coords(), b.coords()));
        }

        match self {
            GeometryKind::Point(_) => {}
            GeometryKind::LineString(l) => normalize_line(l),
            GeometryKind::LinearRing(r) => r.normalize(true),
            GeometryKind::Polygon(p) => normalize_polygon(p),
            GeometryKind::MultiPoint(ps) => ps.sort_by(|a, b| a.coordinate().cmp(&b.coordinate())),
            GeometryKind::MultiLineString(ls) => {
                ls.iter_mut().for_each(normalize_line);
                ls.sort_by(|a, b| compare_sequences(a.coords(), b.coords()));
            }
            GeometryKind::MultiPolygon(ps) => {
                ps.iter_mut().for_each(normalize_polygon);
                ps.sort_by(|a, b| compare_sequences(a.shell().coords(), b.shell().coords()));
            }
            GeometryKind::GeometryCollection(gs) => {
                gs.iter_mut().for_each(Geometry::normalize);
                gs.sort_by(|a, b| {
                    a.dimension()
                        .cmp(&b.dimension())
                        .then_with(|| a.coordinates().cmp(&b.coordinates()))
                });
            }
        }
    }
}

fn compare_sequences(a: &CoordinateSequence, b: &CoordinateSequence) -> std::cmp::Ordering {
    a.as_slice().cmp(b.as_slice())
}
