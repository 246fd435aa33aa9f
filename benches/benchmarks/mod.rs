pub mod noding;
pub mod overlay;
