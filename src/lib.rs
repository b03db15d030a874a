//! Backdrop renders the blurred, cross-fading, horizontally tiled background
//! that sits behind a gallery viewer.
//!
//! - [`ThumbnailCompositor`] letterboxes a source image into a small 2:1 canvas,
//!   tints it and box-blurs it
//! - [`CrossFade`] blends the newest thumbnail texture over the previous one
//! - [`BackgroundView`] queues images, drives the fade from the canvas clock and
//!   tiles the blend across the viewport
//!
//! Drawing goes through the [`Canvas`] trait. [`CpuCanvas`] rasterizes in software,
//! [`RecordingCanvas`] records calls for inspection, and `WgpuCanvas` (feature `gpu`)
//! draws with wgpu.
#![forbid(unsafe_code)]

pub mod animation;
pub mod config;
pub mod effects;
pub mod foundation;
pub mod render;
pub mod thumbnail;
pub mod view;

pub use crate::animation::ease::Ease;
pub use crate::animation::float_anim::FloatAnimation;
pub use crate::config::{BackdropConfig, ThumbnailConfig, TransitionConfig};
pub use crate::effects::blur::{EdgeMode, box_blur_image, box_blur_rgba8_premul};
pub use crate::foundation::core::{
    Affine, ContextId, FrameRGBA, NativeTextureId, Point, Rect, TileRect,
};
pub use crate::foundation::error::{BackdropError, BackdropResult};
pub use crate::render::canvas::{Canvas, DrawSource};
pub use crate::render::cpu::{CpuCanvas, CpuCanvasOpts};
pub use crate::render::crossfade::CrossFade;
#[cfg(feature = "gpu")]
pub use crate::render::gpu::{WgpuCanvas, WgpuCanvasOpts};
pub use crate::render::recording::{CanvasEvent, RecordingCanvas};
pub use crate::render::texture::{ReleaseResult, Texture, TextureHandle, TextureState};
pub use crate::thumbnail::{Placement, ThumbnailCompositor, fit_placement};
pub use crate::view::background::{BackgroundView, RedrawFlag, RedrawScheduler, ViewState};
pub use crate::view::tiling::{TileLayout, tile_width};
