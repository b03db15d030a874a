use image::RgbaImage;

use crate::foundation::core::{ContextId, NativeTextureId, TileRect};
use crate::foundation::error::BackdropResult;

/// What a single draw call samples from.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DrawSource {
    /// One texture, drawn as-is.
    Single(NativeTextureId),
    /// Per-pixel linear mix: `from * (1 - ratio) + to * ratio`.
    Mixed {
        from: NativeTextureId,
        to: NativeTextureId,
        ratio: f32,
    },
}

/// The rendering context a background draws into.
///
/// This mirrors a GL canvas: textures are named by [`NativeTextureId`], errors are
/// polled after the fact with [`Canvas::take_error`], and every texture belongs
/// to the canvas whose [`Canvas::context_id`] was current when it was created.
pub trait Canvas {
    /// Identity of the underlying rendering context.
    fn context_id(&self) -> ContextId;

    /// Monotonic animation clock in milliseconds.
    fn current_animation_time_ms(&self) -> u64;

    /// Create storage for a `width` x `height` RGBA8 texture.
    fn create_texture(&mut self, width: u32, height: u32) -> NativeTextureId;

    /// Pop the pending error code, if the last operations raised one.
    fn take_error(&mut self) -> Option<u32>;

    /// Copy premultiplied RGBA8 pixels into a texture created by this canvas.
    fn upload_texture(&mut self, id: NativeTextureId, pixels: &RgbaImage) -> BackdropResult<()>;

    fn delete_texture(&mut self, id: NativeTextureId);

    /// Stretch `source` over `rect`.
    fn draw_texture(&mut self, source: DrawSource, rect: TileRect) -> BackdropResult<()>;
}
