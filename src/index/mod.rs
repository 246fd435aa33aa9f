//! Spatial indexes.

pub mod chain;
pub mod kdtree;
pub mod strtree;

pub use kdtree::KdTree;
pub use strtree::StrTree;
