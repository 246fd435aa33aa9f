//! Snap rounding: noding in which every vertex and intersection is rounded to a fixed
//! grid, and every segment passing through the pixel of a rounded point is snapped to it.

mod hot_pixel;
mod index;
mod noder;

pub use hot_pixel::HotPixel;
pub use index::HotPixelIndex;
pub use noder::SnapRoundingNoder;
