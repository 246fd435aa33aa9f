//! Computational geometry primitives.

pub mod angle;
mod boundary;
pub mod centroid;
pub mod common_bits;
pub mod dd;
pub mod distance;
pub mod hull;
pub mod intersector;
pub mod locate;
pub mod measure;
pub mod orientation;

pub use boundary::BoundaryNodeRule;
pub use intersector::{IntersectionKind, LineIntersector};
pub use locate::{IndexedPointInAreaLocator, PointLocator, RayCrossingCounter};
pub use orientation::{Orientation, orientation_index};
