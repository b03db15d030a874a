use tracing::debug;

use crate::foundation::core::TileRect;
use crate::foundation::error::BackdropResult;
use crate::render::canvas::{Canvas, DrawSource};
use crate::render::texture::{ReleaseResult, Texture, TextureHandle};

/// Two-texture blend: the current destination and, while a fade is in flight,
/// the texture it fades from.
///
/// At most one fade exists. Calling [`CrossFade::set_destination`] again before
/// the ratio reaches 1 restarts from ratio 0 against the new pair, and the
/// texture that drops out is retired. Retired textures are released on the next
/// [`Texture::bind`], since releasing needs the canvas that owns them.
#[derive(Debug)]
pub struct CrossFade {
    destination: TextureHandle,
    previous: Option<TextureHandle>,
    ratio: f32,
    retired: Vec<TextureHandle>,
}

impl CrossFade {
    /// Start with a single texture at ratio 1.
    pub fn new(destination: TextureHandle) -> Self {
        Self {
            destination,
            previous: None,
            ratio: 1.0,
            retired: Vec::new(),
        }
    }

    /// Make `texture` the new destination and fade from the old one.
    pub fn set_destination(&mut self, texture: TextureHandle) {
        let old = std::mem::replace(&mut self.destination, texture);
        if let Some(superseded) = self.previous.replace(old) {
            debug!(state = ?superseded.state(), "retiring superseded texture");
            self.retired.push(superseded);
        }
        self.ratio = 0.0;
    }

    /// Set the blend weight of the destination. Values outside `[0, 1]` are clamped,
    /// NaN counts as 0.
    pub fn set_mixture_ratio(&mut self, ratio: f32) {
        self.ratio = if ratio.is_nan() {
            0.0
        } else {
            ratio.clamp(0.0, 1.0)
        };
    }

    pub fn mixture_ratio(&self) -> f32 {
        self.ratio
    }

    pub fn destination(&self) -> &TextureHandle {
        &self.destination
    }

    pub fn previous(&self) -> Option<&TextureHandle> {
        self.previous.as_ref()
    }

    /// Textures waiting to be released on the next bind.
    pub fn retired_len(&self) -> usize {
        self.retired.len()
    }

    /// Fails if any texture held by the blend belongs to another context.
    pub fn check_owner(&self, canvas: &dyn Canvas) -> BackdropResult<()> {
        self.retired
            .iter()
            .chain(self.previous.iter())
            .chain(std::iter::once(&self.destination))
            .try_for_each(|texture| texture.check_owner(&*canvas))
    }

    /// Release everything this blend still owns.
    ///
    /// Either every texture is released or none is: on a context mismatch the
    /// blend is handed back intact.
    pub fn release(self, canvas: &mut dyn Canvas) -> ReleaseResult<Self> {
        if let Err(err) = self.check_owner(&*canvas) {
            return Err((self, err));
        }
        self.delete_from(canvas);
        Ok(())
    }

    /// Delete every texture without the owner check; callers run [`Self::check_owner`] first.
    pub(crate) fn delete_from(self, canvas: &mut dyn Canvas) {
        let Self {
            destination,
            previous,
            retired,
            ..
        } = self;
        for texture in retired.into_iter().chain(previous).chain([destination]) {
            texture.delete_from(canvas);
        }
    }

    fn release_retired(&mut self, canvas: &mut dyn Canvas) -> BackdropResult<()> {
        self.retired
            .iter()
            .try_for_each(|texture| texture.check_owner(&*canvas))?;
        for texture in self.retired.drain(..) {
            texture.delete_from(canvas);
        }
        Ok(())
    }

    fn source(&mut self, canvas: &mut dyn Canvas) -> BackdropResult<DrawSource> {
        let to = self.destination.bound_id(canvas)?;
        let from = match self.previous.as_mut() {
            Some(previous) => previous.bound_id(canvas)?,
            None => return Ok(DrawSource::Single(to)),
        };

        Ok(if self.ratio >= 1.0 {
            DrawSource::Single(to)
        } else if self.ratio <= 0.0 {
            DrawSource::Single(from)
        } else {
            DrawSource::Mixed {
                from,
                to,
                ratio: self.ratio,
            }
        })
    }
}

impl Texture for CrossFade {
    fn bind(&mut self, canvas: &mut dyn Canvas) -> BackdropResult<()> {
        self.release_retired(canvas)?;
        self.source(canvas).map(|_| ())
    }

    fn draw(&mut self, canvas: &mut dyn Canvas, rect: TileRect) -> BackdropResult<()> {
        let source = self.source(canvas)?;
        canvas.draw_texture(source, rect)
    }

    fn is_opaque(&self) -> bool {
        self.destination.is_opaque()
            && self.previous.as_ref().is_none_or(|previous| previous.is_opaque())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/crossfade.rs"]
mod tests;
