//! Coordinates, envelopes, sequences and the geometry model.

mod coordinate;
mod envelope;
mod factory;
mod geometry;
mod location;
mod matrix;
mod precision;
pub mod sequence;
pub mod wkt;

pub use self::coordinate::Coordinate;
pub use self::envelope::Envelope;
pub use self::factory::GeometryFactory;
pub use self::geometry::{Geometry, GeometryKind, LineString, LinearRing, Point, Polygon};
pub use self::location::{Dimension, Location, Position};
pub use self::matrix::IntersectionMatrix;
pub use self::precision::PrecisionModel;
pub use self::sequence::CoordinateSequence;
