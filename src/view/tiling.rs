//! Geometry of the horizontally repeated background.

use crate::foundation::core::TileRect;
use crate::foundation::math::round_half_up;

/// Width of one tile when a `thumb_w` x `thumb_h` thumbnail is scaled to
/// `viewport_h` pixels tall. Zero when either height is zero.
pub fn tile_width(viewport_h: u32, thumb_w: u32, thumb_h: u32) -> u32 {
    if viewport_h == 0 || thumb_h == 0 {
        return 0;
    }
    let scale = viewport_h as f32 / thumb_h as f32;
    round_half_up(thumb_w as f32 * scale).clamp(0, i64::from(u32::MAX)) as u32
}

/// Tiles covering `[scroll, scroll + viewport_w)` in content space.
///
/// Tiles sit on a fixed grid of `tile_width` multiples measured from content
/// origin 0, so they don't shift as the viewport scrolls. Rects are reported in
/// screen space (`x = grid position - scroll`).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TileLayout {
    pub tile_width: u32,
    pub height: u32,
    pub scroll: i32,
    /// Content-space x of the first tile.
    pub start: i64,
    /// Exclusive content-space end of the visible range.
    pub end: i64,
}

impl TileLayout {
    /// `None` for degenerate geometry (no height, no width, zero-width tiles);
    /// such a tick draws nothing.
    pub fn new(
        scroll: i32,
        viewport_w: u32,
        viewport_h: u32,
        thumb_w: u32,
        thumb_h: u32,
    ) -> Option<Self> {
        let tile_width = tile_width(viewport_h, thumb_w, thumb_h);
        if tile_width == 0 || viewport_w == 0 {
            return None;
        }
        let tw = i64::from(tile_width);
        let scroll_i = i64::from(scroll);
        Some(Self {
            tile_width,
            height: viewport_h,
            scroll,
            start: scroll_i.div_euclid(tw) * tw,
            end: scroll_i + i64::from(viewport_w),
        })
    }

    pub fn len(&self) -> usize {
        let tw = i64::from(self.tile_width);
        ((self.end - self.start + tw - 1) / tw).max(0) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn tiles(&self) -> impl Iterator<Item = TileRect> + use<> {
        let layout = *self;
        (0..layout.len()).map(move |i| {
            let content_x = layout.start + i as i64 * i64::from(layout.tile_width);
            TileRect::new(
                (content_x - i64::from(layout.scroll)) as i32,
                0,
                layout.tile_width,
                layout.height,
            )
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/view/tiling.rs"]
mod tests;
