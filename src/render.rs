pub mod canvas;
pub mod cpu;
pub mod crossfade;
#[cfg(feature = "gpu")]
pub mod gpu;
pub mod recording;
pub mod texture;
