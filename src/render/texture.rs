use image::RgbaImage;
use tracing::{debug, warn};

use crate::foundation::core::{ContextId, NativeTextureId, TileRect};
use crate::foundation::error::{BackdropError, BackdropResult};
use crate::render::canvas::{Canvas, DrawSource};

/// Capabilities shared by every drawable texture.
pub trait Texture {
    /// Make the texture usable on `canvas`, allocating GPU storage on first use.
    fn bind(&mut self, canvas: &mut dyn Canvas) -> BackdropResult<()>;

    /// Draw the texture stretched over `rect`.
    fn draw(&mut self, canvas: &mut dyn Canvas, rect: TileRect) -> BackdropResult<()>;

    fn is_opaque(&self) -> bool;
}

/// Outcome of a consuming release: on failure the value comes back with the error.
pub type ReleaseResult<T> = Result<(), (T, BackdropError)>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextureState {
    /// Pixels are held on the CPU, nothing allocated yet.
    Unloaded,
    Loaded,
    /// Allocation or upload failed; the handle is unusable.
    Error,
}

/// A raw RGBA8 texture bound to the context that allocated it.
///
/// The handle owns its GPU storage: it must be given back with
/// [`TextureHandle::release`] on the same canvas, which consumes the handle so
/// storage cannot be freed twice.
#[derive(Debug)]
pub struct TextureHandle {
    width: u32,
    height: u32,
    pixels: Option<RgbaImage>,
    native: Option<(ContextId, NativeTextureId)>,
    state: TextureState,
}

impl TextureHandle {
    /// Wrap premultiplied pixels; storage is allocated on the first [`Texture::bind`].
    pub fn from_image(pixels: RgbaImage) -> Self {
        Self {
            width: pixels.width(),
            height: pixels.height(),
            pixels: Some(pixels),
            native: None,
            state: TextureState::Unloaded,
        }
    }

    /// Allocate empty storage on `canvas` right away.
    ///
    /// The canvas error flag is checked immediately after creation; a non-zero
    /// code fails the allocation and nothing is retried.
    pub fn allocate(canvas: &mut dyn Canvas, width: u32, height: u32) -> BackdropResult<Self> {
        let id = create_checked(canvas, width, height)?;
        Ok(Self {
            width,
            height,
            pixels: None,
            native: Some((canvas.context_id(), id)),
            state: TextureState::Loaded,
        })
    }

    pub fn state(&self) -> TextureState {
        self.state
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Context that owns the storage, once allocated.
    pub fn context(&self) -> Option<ContextId> {
        self.native.map(|(ctx, _)| ctx)
    }

    pub fn native_id(&self) -> Option<NativeTextureId> {
        self.native.map(|(_, id)| id)
    }

    /// Free GPU storage. Unloaded handles have nothing to free.
    ///
    /// A handle owned by another context is handed back untouched along with
    /// the error, so its storage can still be freed on the right canvas.
    pub fn release(self, canvas: &mut dyn Canvas) -> ReleaseResult<Self> {
        if let Err(err) = self.check_owner(&*canvas) {
            return Err((self, err));
        }
        self.delete_from(canvas);
        Ok(())
    }

    /// Fails with [`BackdropError::ContextMismatch`] if the storage belongs to
    /// another context. Unloaded handles belong to every context.
    pub fn check_owner(&self, canvas: &dyn Canvas) -> BackdropResult<()> {
        match self.native {
            Some((owner, _)) => check_context(owner, canvas.context_id()),
            None => Ok(()),
        }
    }

    /// Delete storage without the owner check; callers run [`Self::check_owner`] first.
    pub(crate) fn delete_from(self, canvas: &mut dyn Canvas) {
        if let Some((owner, id)) = self.native {
            canvas.delete_texture(id);
            debug!(texture = id.0, %owner, "released texture");
        }
    }

    fn load(&mut self, canvas: &mut dyn Canvas) -> BackdropResult<NativeTextureId> {
        let result = create_checked(canvas, self.width, self.height).and_then(|id| {
            if let Some(pixels) = self.pixels.as_ref() {
                if let Err(err) = canvas.upload_texture(id, pixels) {
                    canvas.delete_texture(id);
                    return Err(err);
                }
            }
            Ok(id)
        });

        match result {
            Ok(id) => {
                self.native = Some((canvas.context_id(), id));
                self.state = TextureState::Loaded;
                self.pixels = None;
                Ok(id)
            }
            Err(err) => {
                warn!(error = %err, "texture upload failed");
                self.state = TextureState::Error;
                Err(err)
            }
        }
    }

    pub(crate) fn bound_id(&mut self, canvas: &mut dyn Canvas) -> BackdropResult<NativeTextureId> {
        match (self.state, self.native) {
            (TextureState::Loaded, Some((owner, id))) => {
                check_context(owner, canvas.context_id())?;
                Ok(id)
            }
            (TextureState::Unloaded, _) => self.load(canvas),
            _ => Err(BackdropError::render("texture is in the error state")),
        }
    }
}

impl Texture for TextureHandle {
    fn bind(&mut self, canvas: &mut dyn Canvas) -> BackdropResult<()> {
        self.bound_id(canvas).map(|_| ())
    }

    fn draw(&mut self, canvas: &mut dyn Canvas, rect: TileRect) -> BackdropResult<()> {
        let id = self.bound_id(canvas)?;
        canvas.draw_texture(DrawSource::Single(id), rect)
    }

    fn is_opaque(&self) -> bool {
        true
    }
}

fn create_checked(
    canvas: &mut dyn Canvas,
    width: u32,
    height: u32,
) -> BackdropResult<NativeTextureId> {
    let id = canvas.create_texture(width, height);
    if let Some(code) = canvas.take_error() {
        return Err(BackdropError::Allocation { code });
    }
    debug!(texture = id.0, width, height, "allocated texture");
    Ok(id)
}

fn check_context(owner: ContextId, bound: ContextId) -> BackdropResult<()> {
    if owner != bound {
        return Err(BackdropError::ContextMismatch { owner, bound });
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/render/texture.rs"]
mod tests;
