//! Time management utilities

use std::time::{Duration, Instant};

/// Frame clock producing the per-frame elapsed time handed to the frame context.
///
/// The elapsed time is clamped to `max_frame_time` so that a long stall (window
/// drag, swapchain recreation, breakpoint) does not turn into a large jump in
/// the animation.
pub struct FrameClock {
    last_frame: Instant,
    max_frame_time: f32,
    frame_count: u64,
}

impl FrameClock {
    /// Create a new clock starting now
    pub fn new(max_frame_time: f32) -> Self {
        Self {
            last_frame: Instant::now(),
            max_frame_time,
            frame_count: 0,
        }
    }

    /// Advance the clock and return the clamped time since the previous tick, in seconds
    pub fn tick(&mut self) -> f32 {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_frame);
        self.last_frame = now;
        self.frame_count += 1;
        self.clamp(elapsed)
    }

    /// Clamp a raw elapsed duration to the configured upper bound
    pub fn clamp(&self, elapsed: Duration) -> f32 {
        elapsed.as_secs_f32().min(self.max_frame_time)
    }

    /// Number of ticks since creation
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Upper bound applied to each frame time
    pub fn max_frame_time(&self) -> f32 {
        self.max_frame_time
    }
}
