/// Shape of a cross-fade: maps elapsed time to a mixture ratio in `[0, 1]`.
///
/// Config files name curves by variant (`"Linear"`, `"OutCubic"`, ...).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Ease {
    #[default]
    Linear,
    /// Starts slow: the old image lingers.
    InQuad,
    /// Starts fast, settles gently.
    OutQuad,
    OutCubic,
    /// Hermite `3t^2 - 2t^3`, flat at both ends.
    Smoothstep,
}

impl Ease {
    /// Ratio after `elapsed_ms` of a `duration_ms` fade. A zero duration is already complete.
    pub fn progress(self, elapsed_ms: u64, duration_ms: u64) -> f32 {
        if elapsed_ms >= duration_ms {
            return 1.0;
        }
        self.apply(elapsed_ms as f32 / duration_ms as f32)
    }

    /// Shape normalized time `t`; input outside `[0, 1]` is clamped.
    pub fn apply(self, t: f32) -> f32 {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        match self {
            Self::Linear => t,
            Self::InQuad => t * t,
            Self::OutQuad => t * (2.0 - t),
            Self::OutCubic => {
                let rest = 1.0 - t;
                1.0 - rest * rest * rest
            }
            Self::Smoothstep => t * t * (3.0 - 2.0 * t),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/ease.rs"]
mod tests;
