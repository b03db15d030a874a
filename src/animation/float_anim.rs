use crate::animation::ease::Ease;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Clock {
    Idle,
    /// `start()` was called; the next `calculate` anchors the start time.
    Armed,
    Running { start_ms: u64 },
}

/// A scalar animation from `from` to `to` over `duration_ms`, sampled by the caller.
///
/// The animation never reads a clock itself: each render tick passes the canvas
/// time into [`FloatAnimation::calculate`]. Starting only arms the animation, and
/// the first sample after that becomes time zero.
#[derive(Clone, Debug)]
pub struct FloatAnimation {
    from: f32,
    to: f32,
    duration_ms: u64,
    ease: Ease,
    clock: Clock,
    current: f32,
}

impl FloatAnimation {
    pub fn new(from: f32, to: f32, duration_ms: u64) -> Self {
        Self {
            from,
            to,
            duration_ms,
            ease: Ease::Linear,
            clock: Clock::Idle,
            current: to,
        }
    }

    pub fn with_ease(mut self, ease: Ease) -> Self {
        self.ease = ease;
        self
    }

    pub fn duration_ms(&self) -> u64 {
        self.duration_ms
    }

    /// Restart from `from`. Any run in progress is abandoned.
    pub fn start(&mut self) {
        self.clock = Clock::Armed;
        self.current = self.from;
    }

    /// True between `start()` and the sample that reaches the duration.
    pub fn is_active(&self) -> bool {
        self.clock != Clock::Idle
    }

    /// Sample at `now_ms`. Returns whether the animation is still running after this sample.
    ///
    /// The sample that reaches the duration stores the end value and returns `false`.
    pub fn calculate(&mut self, now_ms: u64) -> bool {
        let start_ms = match self.clock {
            Clock::Idle => return false,
            Clock::Armed => {
                self.clock = Clock::Running { start_ms: now_ms };
                now_ms
            }
            Clock::Running { start_ms } => start_ms,
        };

        let elapsed = now_ms.saturating_sub(start_ms);
        let eased = self.ease.progress(elapsed, self.duration_ms);
        self.current = self.from + (self.to - self.from) * eased;

        if elapsed >= self.duration_ms {
            self.current = self.to;
            self.clock = Clock::Idle;
        }
        self.is_active()
    }

    /// Value produced by the most recent sample.
    pub fn get(&self) -> f32 {
        self.current
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/float_anim.rs"]
mod tests;
