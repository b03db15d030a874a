use std::collections::HashMap;

use image::RgbaImage;

use crate::effects::composite::{PremulRgba8, crossfade, over, sample_bilinear};
use crate::foundation::core::{ContextId, FrameRGBA, NativeTextureId, TileRect, rgba8_len};
use crate::foundation::error::{BackdropError, BackdropResult};
use crate::render::canvas::{Canvas, DrawSource};

/// Options for [`CpuCanvas`].
#[derive(Clone, Debug)]
pub struct CpuCanvasOpts {
    pub width: u32,
    pub height: u32,
    /// Premultiplied color the frame is cleared to by [`CpuCanvas::clear`].
    pub clear_rgba: [u8; 4],
}

impl Default for CpuCanvasOpts {
    fn default() -> Self {
        Self {
            width: 640,
            height: 64,
            clear_rgba: [0, 0, 0, 255],
        }
    }
}

/// Software canvas: textures live in memory and draws rasterize into an RGBA8
/// premultiplied frame with bilinear sampling.
pub struct CpuCanvas {
    context: ContextId,
    opts: CpuCanvasOpts,
    time_ms: u64,
    frame: Vec<u8>,
    textures: HashMap<NativeTextureId, Option<RgbaImage>>,
    next_id: u32,
    pending_error: Option<u32>,
}

impl CpuCanvas {
    pub fn new(opts: CpuCanvasOpts) -> BackdropResult<Self> {
        let len = rgba8_len(opts.width, opts.height)
            .ok_or_else(|| BackdropError::validation("cpu canvas size overflow"))?;
        let mut canvas = Self {
            context: ContextId::allocate(),
            opts,
            time_ms: 0,
            frame: vec![0; len],
            textures: HashMap::new(),
            next_id: 1,
            pending_error: None,
        };
        canvas.clear();
        Ok(canvas)
    }

    pub fn width(&self) -> u32 {
        self.opts.width
    }

    pub fn height(&self) -> u32 {
        self.opts.height
    }

    pub fn set_time_ms(&mut self, time_ms: u64) {
        self.time_ms = time_ms;
    }

    pub fn advance_ms(&mut self, delta_ms: u64) {
        self.time_ms = self.time_ms.saturating_add(delta_ms);
    }

    pub fn clear(&mut self) {
        let c = self.opts.clear_rgba;
        for px in self.frame.chunks_exact_mut(4) {
            px.copy_from_slice(&c);
        }
    }

    pub fn texture_count(&self) -> usize {
        self.textures.len()
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<PremulRgba8> {
        if x >= self.opts.width || y >= self.opts.height {
            return None;
        }
        let i = ((y as usize) * (self.opts.width as usize) + (x as usize)) * 4;
        Some([
            self.frame[i],
            self.frame[i + 1],
            self.frame[i + 2],
            self.frame[i + 3],
        ])
    }

    pub fn frame(&self) -> FrameRGBA {
        FrameRGBA {
            width: self.opts.width,
            height: self.opts.height,
            data: self.frame.clone(),
            premultiplied: true,
        }
    }

    fn texture(&self, id: NativeTextureId) -> BackdropResult<&RgbaImage> {
        match self.textures.get(&id) {
            Some(Some(img)) => Ok(img),
            Some(None) => Err(BackdropError::render(format!(
                "texture {} has no pixels",
                id.0
            ))),
            None => Err(BackdropError::render(format!("unknown texture {}", id.0))),
        }
    }
}

impl Canvas for CpuCanvas {
    fn context_id(&self) -> ContextId {
        self.context
    }

    fn current_animation_time_ms(&self) -> u64 {
        self.time_ms
    }

    fn create_texture(&mut self, width: u32, height: u32) -> NativeTextureId {
        let id = NativeTextureId(self.next_id);
        self.next_id += 1;
        if width == 0 || height == 0 {
            // GL_INVALID_VALUE
            self.pending_error = Some(0x0501);
            return id;
        }
        self.textures.insert(id, None);
        id
    }

    fn take_error(&mut self) -> Option<u32> {
        self.pending_error.take()
    }

    fn upload_texture(&mut self, id: NativeTextureId, pixels: &RgbaImage) -> BackdropResult<()> {
        let slot = self
            .textures
            .get_mut(&id)
            .ok_or_else(|| BackdropError::render(format!("unknown texture {}", id.0)))?;
        *slot = Some(pixels.clone());
        Ok(())
    }

    fn delete_texture(&mut self, id: NativeTextureId) {
        self.textures.remove(&id);
    }

    fn draw_texture(&mut self, source: DrawSource, rect: TileRect) -> BackdropResult<()> {
        if rect.is_empty() {
            return Ok(());
        }
        let (from, to, ratio) = match source {
            DrawSource::Single(id) => (self.texture(id)?, None, 1.0),
            DrawSource::Mixed { from, to, ratio } => {
                (self.texture(from)?, Some(self.texture(to)?), ratio)
            }
        };

        let fw = i64::from(self.opts.width);
        let fh = i64::from(self.opts.height);
        let x0 = i64::from(rect.x).clamp(0, fw);
        let x1 = rect.right().clamp(0, fw);
        let y0 = i64::from(rect.y).clamp(0, fh);
        let y1 = rect.bottom().clamp(0, fh);

        let mut out = Vec::with_capacity(((x1 - x0).max(0) * (y1 - y0).max(0)) as usize);
        for y in y0..y1 {
            let ny = ((y - i64::from(rect.y)) as f64 + 0.5) / f64::from(rect.height);
            for x in x0..x1 {
                let nx = ((x - i64::from(rect.x)) as f64 + 0.5) / f64::from(rect.width);
                let a = sample_normalized(from, nx, ny);
                let px = match to {
                    Some(to) => crossfade(a, sample_normalized(to, nx, ny), ratio),
                    None => a,
                };
                out.push(px);
            }
        }

        let width = self.opts.width as usize;
        let mut it = out.into_iter();
        for y in y0..y1 {
            for x in x0..x1 {
                let Some(src) = it.next() else { break };
                let i = ((y as usize) * width + x as usize) * 4;
                let dst = [
                    self.frame[i],
                    self.frame[i + 1],
                    self.frame[i + 2],
                    self.frame[i + 3],
                ];
                self.frame[i..i + 4].copy_from_slice(&over(dst, src));
            }
        }
        Ok(())
    }
}

/// Sample `img` at normalized coordinates, `(0, 0)` top-left and `(1, 1)` bottom-right.
fn sample_normalized(img: &RgbaImage, nx: f64, ny: f64) -> PremulRgba8 {
    let u = nx * f64::from(img.width()) - 0.5;
    let v = ny * f64::from(img.height()) - 0.5;
    sample_bilinear(img, u, v, true)
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
