//! Tunables for the background pipeline.
//!
//! Every field has a default, so an empty JSON object (or no config at all)
//! reproduces the stock 128x64 thumbnail, radius-4 blur, grey tint and 500 ms
//! linear fade.

use std::path::Path;

use crate::animation::ease::Ease;
use crate::effects::blur::MAX_BLUR_RADIUS;
use crate::foundation::error::{BackdropError, BackdropResult};

/// Full configuration document.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BackdropConfig {
    pub thumbnail: ThumbnailConfig,
    pub transition: TransitionConfig,
}

/// Thumbnail canvas and filter settings.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ThumbnailConfig {
    /// Canvas width in pixels; must be twice `height`.
    pub width: u32,
    pub height: u32,
    /// Box blur radius (window size `2 * radius + 1`).
    pub blur_radius: u32,
    /// Multiplicative color applied while drawing the source.
    pub tint_rgb: [u8; 3],
}

impl Default for ThumbnailConfig {
    fn default() -> Self {
        Self {
            width: 128,
            height: 64,
            blur_radius: 4,
            tint_rgb: [0xaa, 0xaa, 0xaa],
        }
    }
}

/// Cross-fade timing.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TransitionConfig {
    pub duration_ms: u64,
    pub ease: Ease,
}

impl Default for TransitionConfig {
    fn default() -> Self {
        Self {
            duration_ms: 500,
            ease: Ease::Linear,
        }
    }
}

impl BackdropConfig {
    pub fn validate(&self) -> BackdropResult<()> {
        let t = &self.thumbnail;
        if t.width == 0 || t.height == 0 {
            return Err(BackdropError::validation(
                "thumbnail width and height must be > 0",
            ));
        }
        if u64::from(t.width) != 2 * u64::from(t.height) {
            return Err(BackdropError::validation(format!(
                "thumbnail must keep a 2:1 aspect, got {}x{}",
                t.width, t.height
            )));
        }
        if t.blur_radius > MAX_BLUR_RADIUS {
            return Err(BackdropError::validation(format!(
                "thumbnail.blur_radius must be <= {MAX_BLUR_RADIUS}"
            )));
        }
        if self.transition.duration_ms == 0 {
            return Err(BackdropError::validation(
                "transition.duration_ms must be > 0",
            ));
        }
        Ok(())
    }

    /// Parse and validate a JSON document.
    pub fn from_json_str(s: &str) -> BackdropResult<Self> {
        let cfg: Self = serde_json::from_str(s).map_err(|e| BackdropError::serde(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_json_path(path: &Path) -> BackdropResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            BackdropError::Other(anyhow::Error::new(e).context(format!(
                "read config '{}'",
                path.display()
            )))
        })?;
        Self::from_json_str(&text)
    }
}

#[cfg(test)]
#[path = "../tests/unit/config/config.rs"]
mod tests;
