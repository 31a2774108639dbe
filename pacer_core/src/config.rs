// Copyright 2026 the Pacer Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tuning knobs for the runner and the fallback frame scheduler.

use crate::time::Duration;

/// Configuration for the [`AnimationRunner`](crate::runner::AnimationRunner).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RunnerConfig {
    /// Nominal refresh rate. Sets the frame interval used to detect dropped
    /// frames and the baseline of the reported effective frame rate.
    pub desired_fps: f64,
    /// Upper bound on virtual catch-up steps per real frame.
    pub max_catch_up: u32,
    /// Every `compaction_interval`-th issued handle triggers a registry
    /// compaction pass. `0` disables compaction.
    pub compaction_interval: u64,
}

impl RunnerConfig {
    /// 60 fps, at most 4 catch-up steps per frame, compaction every 20
    /// handles.
    pub const STANDARD: Self = Self {
        desired_fps: 60.0,
        max_catch_up: 4,
        compaction_interval: 20,
    };

    /// Nominal frame interval in milliseconds.
    #[inline]
    #[must_use]
    pub fn frame_interval_ms(&self) -> f64 {
        1000.0 / self.desired_fps
    }
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self::STANDARD
    }
}

/// Configuration for the
/// [`TimerFallbackScheduler`](crate::fallback::TimerFallbackScheduler).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FallbackConfig {
    /// Period of the recurring host timer.
    pub period: Duration,
    /// The timer stops once no callback has run for longer than this.
    pub idle_timeout: Duration,
}

impl FallbackConfig {
    /// ~60 ticks per second, idling after 2.5 s without work.
    pub const SIXTY_HZ: Self = Self {
        // 1000 / 60 ms, rounded to the nearest microsecond.
        period: Duration::from_micros(16_667),
        idle_timeout: Duration::from_millis(2_500),
    };
}

impl Default for FallbackConfig {
    fn default() -> Self {
        Self::SIXTY_HZ
    }
}
