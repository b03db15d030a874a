use std::collections::BTreeSet;

use image::RgbaImage;

use crate::foundation::core::{ContextId, NativeTextureId, TileRect};
use crate::foundation::error::{BackdropError, BackdropResult};
use crate::render::canvas::{Canvas, DrawSource};

/// One call observed by a [`RecordingCanvas`].
#[derive(Clone, Debug, PartialEq)]
pub enum CanvasEvent {
    Create {
        id: NativeTextureId,
        width: u32,
        height: u32,
    },
    Upload {
        id: NativeTextureId,
    },
    Delete {
        id: NativeTextureId,
    },
    Draw {
        source: DrawSource,
        rect: TileRect,
    },
}

/// A canvas that draws nothing and remembers everything.
///
/// Useful for asserting on draw geometry and texture lifetimes without a GPU.
/// Drawing with a texture that was never created, or was already deleted, fails.
#[derive(Debug)]
pub struct RecordingCanvas {
    context: ContextId,
    time_ms: u64,
    next_id: u32,
    pending_error: Option<u32>,
    fail_next_create: Option<u32>,
    live: BTreeSet<NativeTextureId>,
    events: Vec<CanvasEvent>,
}

impl Default for RecordingCanvas {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingCanvas {
    pub fn new() -> Self {
        Self::with_context(ContextId::allocate())
    }

    pub fn with_context(context: ContextId) -> Self {
        Self {
            context,
            time_ms: 0,
            next_id: 1,
            pending_error: None,
            fail_next_create: None,
            live: BTreeSet::new(),
            events: Vec::new(),
        }
    }

    pub fn set_time_ms(&mut self, time_ms: u64) {
        self.time_ms = time_ms;
    }

    pub fn advance_ms(&mut self, delta_ms: u64) {
        self.time_ms = self.time_ms.saturating_add(delta_ms);
    }

    /// Make the next `create_texture` raise `code` on the error flag.
    pub fn fail_next_create(&mut self, code: u32) {
        self.fail_next_create = Some(code);
    }

    pub fn events(&self) -> &[CanvasEvent] {
        &self.events
    }

    pub fn clear_events(&mut self) {
        self.events.clear();
    }

    pub fn draws(&self) -> Vec<(DrawSource, TileRect)> {
        self.events
            .iter()
            .filter_map(|e| match *e {
                CanvasEvent::Draw { source, rect } => Some((source, rect)),
                _ => None,
            })
            .collect()
    }

    pub fn deleted(&self) -> Vec<NativeTextureId> {
        self.events
            .iter()
            .filter_map(|e| match *e {
                CanvasEvent::Delete { id } => Some(id),
                _ => None,
            })
            .collect()
    }

    pub fn live_textures(&self) -> usize {
        self.live.len()
    }

    fn require_live(&self, id: NativeTextureId) -> BackdropResult<()> {
        if !self.live.contains(&id) {
            return Err(BackdropError::render(format!(
                "texture {} is not live on {}",
                id.0, self.context
            )));
        }
        Ok(())
    }
}

impl Canvas for RecordingCanvas {
    fn context_id(&self) -> ContextId {
        self.context
    }

    fn current_animation_time_ms(&self) -> u64 {
        self.time_ms
    }

    fn create_texture(&mut self, width: u32, height: u32) -> NativeTextureId {
        let id = NativeTextureId(self.next_id);
        self.next_id += 1;
        if let Some(code) = self.fail_next_create.take() {
            self.pending_error = Some(code);
            return id;
        }
        self.live.insert(id);
        self.events.push(CanvasEvent::Create { id, width, height });
        id
    }

    fn take_error(&mut self) -> Option<u32> {
        self.pending_error.take()
    }

    fn upload_texture(&mut self, id: NativeTextureId, _pixels: &RgbaImage) -> BackdropResult<()> {
        self.require_live(id)?;
        self.events.push(CanvasEvent::Upload { id });
        Ok(())
    }

    fn delete_texture(&mut self, id: NativeTextureId) {
        self.live.remove(&id);
        self.events.push(CanvasEvent::Delete { id });
    }

    fn draw_texture(&mut self, source: DrawSource, rect: TileRect) -> BackdropResult<()> {
        match source {
            DrawSource::Single(id) => self.require_live(id)?,
            DrawSource::Mixed { from, to, .. } => {
                self.require_live(from)?;
                self.require_live(to)?;
            }
        }
        self.events.push(CanvasEvent::Draw { source, rect });
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/recording.rs"]
mod tests;
