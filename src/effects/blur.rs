//! Separable box blur over RGBA8 buffers.
//!
//! The filter runs two independent 1-D passes (rows, then columns), each a
//! sliding-window sum divided by the window size with integer arithmetic, so a
//! uniform buffer comes back bit-identical at any radius.

use image::RgbaImage;

use crate::foundation::core::rgba8_len;
use crate::foundation::error::{BackdropError, BackdropResult};

/// Largest radius accepted; keeps every per-channel window sum inside a `u32`.
pub const MAX_BLUR_RADIUS: u32 = 255;

/// How samples outside the buffer are resolved along one axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum EdgeMode {
    /// Wrap the sample index modulo the dimension.
    Repeat,
    /// Saturate the sample index to `[0, dim - 1]`.
    Clamp,
}

impl EdgeMode {
    fn resolve(self, i: i64, len: usize) -> usize {
        let n = len as i64;
        match self {
            Self::Repeat => i.rem_euclid(n) as usize,
            Self::Clamp => i.clamp(0, n - 1) as usize,
        }
    }
}

/// Blur `buf` (tightly packed RGBA8, row-major) in place.
///
/// `horizontal` applies to the row pass, `vertical` to the column pass. A
/// `radius` of 0 (window size 1) leaves the buffer untouched.
pub fn box_blur_rgba8_premul(
    buf: &mut [u8],
    width: u32,
    height: u32,
    radius: u32,
    horizontal: EdgeMode,
    vertical: EdgeMode,
) -> BackdropResult<()> {
    let expected_len = rgba8_len(width, height)
        .ok_or_else(|| BackdropError::validation("blur buffer size overflow"))?;
    if buf.len() != expected_len {
        return Err(BackdropError::validation(
            "box_blur_rgba8_premul expects buf matching width*height*4",
        ));
    }
    if radius > MAX_BLUR_RADIUS {
        return Err(BackdropError::validation(format!(
            "blur radius {radius} exceeds {MAX_BLUR_RADIUS}"
        )));
    }
    if radius == 0 || expected_len == 0 {
        return Ok(());
    }

    let (w, h) = (width as usize, height as usize);
    let mut transposed = vec![0u8; expected_len];
    // Each pass writes its output transposed, so the second pass walks the
    // original columns as contiguous rows and lands back in row-major order.
    blur_rows_transposed(buf, &mut transposed, w, h, radius, horizontal);
    blur_rows_transposed(&transposed, buf, h, w, radius, vertical);
    Ok(())
}

/// Convenience wrapper over [`box_blur_rgba8_premul`] for an [`RgbaImage`].
pub fn box_blur_image(
    img: &mut RgbaImage,
    radius: u32,
    horizontal: EdgeMode,
    vertical: EdgeMode,
) -> BackdropResult<()> {
    let (w, h) = img.dimensions();
    box_blur_rgba8_premul(img, w, h, radius, horizontal, vertical)
}

/// Box-filter every row of `src` (`width` x `height`) and store the result
/// transposed in `dst` (`height` x `width`).
fn blur_rows_transposed(
    src: &[u8],
    dst: &mut [u8],
    width: usize,
    height: usize,
    radius: u32,
    mode: EdgeMode,
) {
    let r = i64::from(radius);
    let window = 2 * radius + 1;

    for y in 0..height {
        let row = &src[y * width * 4..(y + 1) * width * 4];
        let px = |i: i64| {
            let idx = mode.resolve(i, width) * 4;
            [row[idx], row[idx + 1], row[idx + 2], row[idx + 3]]
        };

        let mut acc = [0u32; 4];
        for k in -r..=r {
            let p = px(k);
            for c in 0..4 {
                acc[c] += u32::from(p[c]);
            }
        }

        for x in 0..width {
            let out_idx = (x * height + y) * 4;
            for c in 0..4 {
                dst[out_idx + c] = (acc[c] / window) as u8;
            }

            let xi = x as i64;
            let incoming = px(xi + r + 1);
            let outgoing = px(xi - r);
            for c in 0..4 {
                acc[c] = acc[c] + u32::from(incoming[c]) - u32::from(outgoing[c]);
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/effects/blur.rs"]
mod tests;
