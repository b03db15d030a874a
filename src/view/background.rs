use image::RgbaImage;
use tracing::{debug, trace};

use crate::animation::float_anim::FloatAnimation;
use crate::config::{BackdropConfig, TransitionConfig};
use crate::foundation::error::BackdropResult;
use crate::render::canvas::Canvas;
use crate::render::crossfade::CrossFade;
use crate::render::texture::{ReleaseResult, Texture, TextureHandle};
use crate::thumbnail::ThumbnailCompositor;
use crate::view::tiling::TileLayout;

/// Receiver of redraw requests.
///
/// Implementations are expected to coalesce: any number of `invalidate` calls
/// between two ticks schedule a single tick.
pub trait RedrawScheduler {
    fn invalidate(&mut self);
}

/// Coalescing redraw request: a single flag, cleared by [`RedrawFlag::take`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RedrawFlag {
    requested: bool,
}

impl RedrawFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_requested(&self) -> bool {
        self.requested
    }

    /// Whether a tick was requested since the previous call.
    pub fn take(&mut self) -> bool {
        std::mem::take(&mut self.requested)
    }
}

impl RedrawScheduler for RedrawFlag {
    fn invalidate(&mut self) {
        self.requested = true;
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ViewState {
    /// No image yet; render draws nothing.
    Idle,
    /// One image on screen, no fade running.
    Steady,
    /// A fade is in flight.
    Transitioning,
}

/// Tiled, cross-fading backdrop.
///
/// Images become thumbnails as soon as they arrive. While a fade runs, newer
/// images wait in a single pending slot (latest wins) and start their own fade
/// once the running one completes. The fade is advanced by [`BackgroundView::render`],
/// which keeps asking the scheduler for another tick until there is nothing
/// left to animate.
#[derive(Debug)]
pub struct BackgroundView<R: RedrawScheduler> {
    compositor: ThumbnailCompositor,
    transition: TransitionConfig,
    scheduler: R,
    blend: Option<CrossFade>,
    animation: FloatAnimation,
    pending: Option<TextureHandle>,
    scroll: i32,
    viewport_width: u32,
    viewport_height: u32,
}

impl<R: RedrawScheduler> BackgroundView<R> {
    pub fn new(config: BackdropConfig, scheduler: R) -> BackdropResult<Self> {
        config.validate()?;
        let animation = FloatAnimation::new(0.0, 1.0, config.transition.duration_ms)
            .with_ease(config.transition.ease);
        Ok(Self {
            compositor: ThumbnailCompositor::new(config.thumbnail),
            transition: config.transition,
            scheduler,
            blend: None,
            animation,
            pending: None,
            scroll: 0,
            viewport_width: 0,
            viewport_height: 0,
        })
    }

    pub fn state(&self) -> ViewState {
        match self.blend {
            None => ViewState::Idle,
            Some(_) if self.animation.is_active() => ViewState::Transitioning,
            Some(_) => ViewState::Steady,
        }
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn scroll_position(&self) -> i32 {
        self.scroll
    }

    pub fn viewport(&self) -> (u32, u32) {
        (self.viewport_width, self.viewport_height)
    }

    /// Blend weight of the newest image; 0 before the first image.
    pub fn mixture_ratio(&self) -> f32 {
        self.blend.as_ref().map_or(0.0, CrossFade::mixture_ratio)
    }

    pub fn compositor(&self) -> &ThumbnailCompositor {
        &self.compositor
    }

    pub fn scheduler(&self) -> &R {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut R {
        &mut self.scheduler
    }

    /// Show `image` next.
    ///
    /// Starts a fade right away unless one is running, in which case the image
    /// replaces whatever was pending. Thumbnail errors (e.g. a zero-sized image)
    /// are returned before any state changes.
    #[tracing::instrument(skip(self, image), fields(w = image.width(), h = image.height()))]
    pub fn set_image(&mut self, image: &RgbaImage) -> BackdropResult<()> {
        let texture = TextureHandle::from_image(self.compositor.build(image)?);
        if self.state() == ViewState::Transitioning {
            if self.pending.replace(texture).is_some() {
                debug!("replaced pending image");
            } else {
                debug!("queued pending image");
            }
            return Ok(());
        }
        self.start_transition(texture);
        Ok(())
    }

    pub fn set_scroll_position(&mut self, position: i32) {
        if position != self.scroll {
            self.scroll = position;
            self.scheduler.invalidate();
        }
    }

    pub fn set_viewport(&mut self, width: u32, height: u32) {
        if (width, height) != (self.viewport_width, self.viewport_height) {
            self.viewport_width = width;
            self.viewport_height = height;
            self.scheduler.invalidate();
        }
    }

    /// Advance the fade and draw the tiles covering the viewport.
    ///
    /// Returns the number of tiles drawn. Degenerate viewports draw nothing.
    /// All textures are bound before the first tile, so a bind failure leaves
    /// the tick without any draws.
    #[tracing::instrument(level = "trace", skip(self, canvas))]
    pub fn render(&mut self, canvas: &mut dyn Canvas) -> BackdropResult<usize> {
        if self.animation.is_active() {
            self.advance(canvas.current_animation_time_ms());
        }
        let Some(blend) = self.blend.as_mut() else {
            return Ok(0);
        };
        let Some(layout) = TileLayout::new(
            self.scroll,
            self.viewport_width,
            self.viewport_height,
            self.compositor.config().width,
            self.compositor.config().height,
        ) else {
            return Ok(0);
        };

        blend.bind(canvas)?;
        let mut drawn = 0;
        for tile in layout.tiles() {
            blend.draw(canvas, tile)?;
            drawn += 1;
        }
        trace!(tiles = drawn, ratio = blend.mixture_ratio(), "rendered background");
        Ok(drawn)
    }

    /// Give every texture back to `canvas`.
    ///
    /// Nothing is released if any texture belongs to another context; the view
    /// is handed back with the error instead.
    pub fn release(self, canvas: &mut dyn Canvas) -> ReleaseResult<Self> {
        let owned = self
            .pending
            .as_ref()
            .map_or(Ok(()), |pending| pending.check_owner(&*canvas))
            .and_then(|()| {
                self.blend
                    .as_ref()
                    .map_or(Ok(()), |blend| blend.check_owner(&*canvas))
            });
        if let Err(err) = owned {
            return Err((self, err));
        }
        if let Some(pending) = self.pending {
            pending.delete_from(canvas);
        }
        if let Some(blend) = self.blend {
            blend.delete_from(canvas);
        }
        Ok(())
    }

    fn advance(&mut self, now_ms: u64) {
        let running = self.animation.calculate(now_ms);
        if let Some(blend) = self.blend.as_mut() {
            blend.set_mixture_ratio(self.animation.get());
        }
        if running {
            self.scheduler.invalidate();
        } else if let Some(next) = self.pending.take() {
            debug!("starting pending transition");
            self.start_transition(next);
        } else {
            debug!("transition finished");
        }
    }

    fn start_transition(&mut self, texture: TextureHandle) {
        match self.blend.as_mut() {
            Some(blend) => blend.set_destination(texture),
            None => self.blend = Some(CrossFade::new(texture)),
        }
        if let Some(blend) = self.blend.as_mut() {
            blend.set_mixture_ratio(0.0);
        }
        self.animation = FloatAnimation::new(0.0, 1.0, self.transition.duration_ms)
            .with_ease(self.transition.ease);
        self.animation.start();
        debug!(duration_ms = self.transition.duration_ms, "transition started");
        self.scheduler.invalidate();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/view/background.rs"]
mod tests;
