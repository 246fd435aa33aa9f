//! Robust planar topology for vector geometries: noding, boolean overlay, buffering,
//! relate and validity.

pub mod algorithm;
pub mod error;
pub mod geom;
pub mod geomgraph;
pub mod index;
pub mod interrupt;
pub mod noding;
pub mod operation;
mod tolerance;

pub use self::error::{GeometryError, Result};
pub use self::geom::{
    Coordinate, Dimension, Envelope, Geometry, GeometryFactory, GeometryKind,
    IntersectionMatrix, Location, PrecisionModel,
};
pub use self::operation::{
    buffer::{BufferParameters, EndCapStyle, JoinStyle},
    overlay::OpCode,
    valid::{ValidationError, ValidationErrorKind},
};
pub use self::tolerance::{IsClose, Positive, Tolerance};
