pub mod background;
pub mod tiling;
