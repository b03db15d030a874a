//! Letterboxed, tinted and blurred thumbnails used as background tiles.

use image::RgbaImage;
use tracing::debug;

use crate::config::ThumbnailConfig;
use crate::effects::blur::{EdgeMode, box_blur_image};
use crate::effects::composite::{sample_bilinear, tint};
use crate::foundation::core::{Affine, Point};
use crate::foundation::error::{BackdropError, BackdropResult};
use crate::foundation::math::round_half_up;

/// Where a scaled source lands on the thumbnail canvas.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Placement {
    /// Uniform scale from source pixels to canvas pixels.
    pub scale: f32,
    pub left: i32,
    pub top: i32,
    pub scaled_width: u32,
    pub scaled_height: u32,
}

impl Placement {
    /// Source-to-canvas transform.
    pub fn transform(&self) -> Affine {
        Affine::translate((f64::from(self.left), f64::from(self.top)))
            * Affine::scale(f64::from(self.scale))
    }
}

/// Fit a `src_w` x `src_h` image inside a `canvas_w` x `canvas_h` canvas with a
/// uniform scale, centered on the axis that has slack.
///
/// The constrained axis is chosen by cross-multiplying the two aspect ratios in
/// integers, so sources whose aspect equals the canvas aspect always take the
/// same branch and fill the canvas exactly.
pub fn fit_placement(
    src_w: u32,
    src_h: u32,
    canvas_w: u32,
    canvas_h: u32,
) -> BackdropResult<Placement> {
    if src_w == 0 || src_h == 0 {
        return Err(BackdropError::validation(format!(
            "source image must be non-empty, got {src_w}x{src_h}"
        )));
    }
    if canvas_w == 0 || canvas_h == 0 {
        return Err(BackdropError::validation(
            "thumbnail canvas must be non-empty",
        ));
    }

    let wider = u64::from(src_w) * u64::from(canvas_h) > u64::from(src_h) * u64::from(canvas_w);
    if wider {
        let scale = canvas_w as f32 / src_w as f32;
        let scaled_height = round_half_up(src_h as f32 * scale).clamp(0, i64::from(canvas_h));
        Ok(Placement {
            scale,
            left: 0,
            top: ((i64::from(canvas_h) - scaled_height) / 2) as i32,
            scaled_width: canvas_w,
            scaled_height: scaled_height as u32,
        })
    } else {
        let scale = canvas_h as f32 / src_h as f32;
        let scaled_width = round_half_up(src_w as f32 * scale).clamp(0, i64::from(canvas_w));
        Ok(Placement {
            scale,
            left: ((i64::from(canvas_w) - scaled_width) / 2) as i32,
            top: 0,
            scaled_width: scaled_width as u32,
            scaled_height: canvas_h,
        })
    }
}

/// Builds fixed-size background thumbnails from arbitrary source images.
#[derive(Clone, Debug)]
pub struct ThumbnailCompositor {
    config: ThumbnailConfig,
}

impl Default for ThumbnailCompositor {
    fn default() -> Self {
        Self::new(ThumbnailConfig::default())
    }
}

impl ThumbnailCompositor {
    pub fn new(config: ThumbnailConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ThumbnailConfig {
        &self.config
    }

    pub fn placement(&self, src_w: u32, src_h: u32) -> BackdropResult<Placement> {
        fit_placement(src_w, src_h, self.config.width, self.config.height)
    }

    /// Render `source` (straight alpha) into a premultiplied thumbnail canvas.
    ///
    /// Pixels outside the placed image stay transparent. The horizontal blur
    /// wraps because the result is tiled horizontally; the vertical blur clamps.
    #[tracing::instrument(skip(self, source), fields(w = source.width(), h = source.height()))]
    pub fn build(&self, source: &RgbaImage) -> BackdropResult<RgbaImage> {
        let (src_w, src_h) = source.dimensions();
        let placement = self.placement(src_w, src_h)?;
        let mut canvas = RgbaImage::new(self.config.width, self.config.height);

        let to_source = placement.transform().inverse();
        let x_end = placement.left + placement.scaled_width as i32;
        let y_end = placement.top + placement.scaled_height as i32;
        for y in placement.top.max(0)..y_end.min(self.config.height as i32) {
            for x in placement.left.max(0)..x_end.min(self.config.width as i32) {
                let center = Point::new(f64::from(x) + 0.5, f64::from(y) + 0.5);
                let p = to_source * center;
                let px = sample_bilinear(source, p.x - 0.5, p.y - 0.5, false);
                canvas.put_pixel(
                    x as u32,
                    y as u32,
                    image::Rgba(tint(px, self.config.tint_rgb)),
                );
            }
        }

        box_blur_image(
            &mut canvas,
            self.config.blur_radius,
            EdgeMode::Repeat,
            EdgeMode::Clamp,
        )?;
        debug!(?placement, "built thumbnail");
        Ok(canvas)
    }
}

#[cfg(test)]
#[path = "../tests/unit/thumbnail.rs"]
mod tests;
