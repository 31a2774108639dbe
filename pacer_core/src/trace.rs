// Copyright 2026 the Pacer Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tracing and diagnostics for animation runs and frame scheduling.
//!
//! This module provides a [`TraceSink`] trait with per-event methods that the
//! [`AnimationRunner`](crate::runner::AnimationRunner) and
//! [`TimerFallbackScheduler`](crate::fallback::TimerFallbackScheduler) call as
//! they work. All method bodies default to no-ops, so implementing only the
//! events you care about is fine.
//!
//! [`Tracer`] wraps an optional shared sink. When the `trace` feature is
//! **off**, every `Tracer` method compiles to nothing (zero overhead). When
//! **on**, each method performs a single `Option` branch before dispatching.
//!
//! # Crate features
//!
//! - `trace`: enables the `Tracer` method bodies (one branch per call).

use alloc::rc::Rc;
use core::cell::RefCell;

use crate::animation::{AnimationId, FrameKind};
use crate::time::{Duration, HostTime};

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Why an animation run ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EndReason {
    /// The configured duration elapsed and percent reached `1`.
    Elapsed,
    /// The step callback asked to finish.
    StepFinished,
    /// The run was stopped through
    /// [`AnimationRunner::stop`](crate::runner::AnimationRunner::stop).
    Stopped,
    /// The verify callback rejected the next step.
    Rejected,
}

/// A state change of the fallback interval timer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FallbackTimerEvent {
    /// The recurring timer was (re)started by a scheduling request.
    Started {
        /// Tick period requested from the host.
        period: Duration,
    },
    /// The recurring timer was stopped after a quiet period.
    Idled {
        /// Tick at which the timer went idle.
        at: HostTime,
        /// Time since callbacks last ran.
        idle_for: Duration,
    },
}

// ---------------------------------------------------------------------------
// Event structs
// ---------------------------------------------------------------------------

/// Emitted when an animation is registered.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AnimationStartEvent {
    /// Handle issued to the animation.
    pub id: AnimationId,
    /// Start time read from the runner's clock.
    pub at: HostTime,
    /// Configured duration, if the run is time-bound.
    pub duration: Option<Duration>,
}

/// Emitted for every executed step, real or virtual.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StepEvent {
    /// Animation being stepped.
    pub id: AnimationId,
    /// Timestamp passed to the step callback.
    pub at: HostTime,
    /// Raw progress before easing.
    pub percent: f64,
    /// Eased value passed to the step callback.
    pub value: f64,
    /// Whether this step renders or only catches up.
    pub kind: FrameKind,
}

/// Emitted when a real frame detects skipped refresh ticks.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CatchUpEvent {
    /// Animation catching up.
    pub id: AnimationId,
    /// Timestamp of the real frame.
    pub at: HostTime,
    /// Number of refresh ticks the host skipped.
    pub dropped_frames: u32,
    /// Number of virtual steps executed (bounded by the runner config).
    pub synthesized: u32,
}

/// Emitted exactly once per animation when it terminates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AnimationEndEvent {
    /// Animation that ended.
    pub id: AnimationId,
    /// Timestamp of the terminating step.
    pub at: HostTime,
    /// Why the run ended.
    pub reason: EndReason,
    /// Frame rate reported to the completion callback.
    pub effective_fps: f64,
    /// Total virtual steps executed over the run.
    pub drop_count: u32,
    /// Value of the completion callback's `finished` flag.
    pub finished: bool,
}

/// Emitted when the runner compacts its registry.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CompactionEvent {
    /// Handle whose issuance triggered the pass.
    pub trigger: AnimationId,
    /// Stale entries discarded.
    pub removed: usize,
    /// Running entries kept.
    pub retained: usize,
}

/// Emitted when the fallback timer dispatches a batch of callbacks.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FallbackBatchEvent {
    /// Tick timestamp passed to every callback in the batch.
    pub at: HostTime,
    /// Number of callbacks invoked.
    pub callbacks: usize,
}

// ---------------------------------------------------------------------------
// TraceSink trait
// ---------------------------------------------------------------------------

/// Receives trace events from the runner and the fallback scheduler.
///
/// All methods have default no-op implementations, so you only need to
/// override the events you care about.
pub trait TraceSink {
    /// Called when an animation is registered.
    fn on_animation_start(&mut self, e: &AnimationStartEvent) {
        _ = e;
    }

    /// Called after each step callback returns.
    fn on_step(&mut self, e: &StepEvent) {
        _ = e;
    }

    /// Called when a real frame synthesizes catch-up steps.
    fn on_catch_up(&mut self, e: &CatchUpEvent) {
        _ = e;
    }

    /// Called when an animation terminates.
    fn on_animation_end(&mut self, e: &AnimationEndEvent) {
        _ = e;
    }

    /// Called after a registry compaction pass.
    fn on_compaction(&mut self, e: &CompactionEvent) {
        _ = e;
    }

    /// Called when the fallback timer starts or idles.
    fn on_fallback_timer(&mut self, e: &FallbackTimerEvent) {
        _ = e;
    }

    /// Called after the fallback timer dispatches a non-empty batch.
    fn on_fallback_batch(&mut self, e: &FallbackBatchEvent) {
        _ = e;
    }
}

// ---------------------------------------------------------------------------
// NoopSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that discards all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {}

// ---------------------------------------------------------------------------
// Tracer wrapper
// ---------------------------------------------------------------------------

/// Thin, cloneable wrapper around an optional shared [`TraceSink`].
///
/// When the `trace` feature is **off**, every method compiles to nothing. When
/// **on**, each method checks the inner `Option` (one branch) before
/// dispatching to the sink. Events emitted while the sink is already borrowed
/// (a sink that re-enters the runner) are dropped.
#[derive(Clone, Default)]
pub struct Tracer {
    #[cfg(feature = "trace")]
    sink: Option<Rc<RefCell<dyn TraceSink>>>,
}

impl core::fmt::Debug for Tracer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tracer").finish_non_exhaustive()
    }
}

impl Tracer {
    /// Creates a tracer that dispatches to the given sink.
    #[inline]
    #[must_use]
    pub fn new(sink: Rc<RefCell<dyn TraceSink>>) -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: Some(sink) }
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = sink;
            Self {}
        }
    }

    /// Creates a tracer that discards all events.
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    #[cfg(feature = "trace")]
    #[inline]
    fn with_sink(&self, f: impl FnOnce(&mut dyn TraceSink)) {
        if let Some(sink) = &self.sink
            && let Ok(mut sink) = sink.try_borrow_mut()
        {
            f(&mut *sink);
        }
    }

    /// Emits an [`AnimationStartEvent`].
    #[inline]
    pub fn animation_start(&self, e: &AnimationStartEvent) {
        #[cfg(feature = "trace")]
        self.with_sink(|s| s.on_animation_start(e));
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`StepEvent`].
    #[inline]
    pub fn step(&self, e: &StepEvent) {
        #[cfg(feature = "trace")]
        self.with_sink(|s| s.on_step(e));
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`CatchUpEvent`].
    #[inline]
    pub fn catch_up(&self, e: &CatchUpEvent) {
        #[cfg(feature = "trace")]
        self.with_sink(|s| s.on_catch_up(e));
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits an [`AnimationEndEvent`].
    #[inline]
    pub fn animation_end(&self, e: &AnimationEndEvent) {
        #[cfg(feature = "trace")]
        self.with_sink(|s| s.on_animation_end(e));
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`CompactionEvent`].
    #[inline]
    pub fn compaction(&self, e: &CompactionEvent) {
        #[cfg(feature = "trace")]
        self.with_sink(|s| s.on_compaction(e));
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`FallbackTimerEvent`].
    #[inline]
    pub fn fallback_timer(&self, e: &FallbackTimerEvent) {
        #[cfg(feature = "trace")]
        self.with_sink(|s| s.on_fallback_timer(e));
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`FallbackBatchEvent`].
    #[inline]
    pub fn fallback_batch(&self, e: &FallbackBatchEvent) {
        #[cfg(feature = "trace")]
        self.with_sink(|s| s.on_fallback_batch(e));
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }
}

#[cfg(all(test, feature = "trace"))]
mod tests {
    use alloc::vec::Vec;

    use super::*;

    #[derive(Default)]
    struct Counting {
        starts: Vec<AnimationId>,
        batches: usize,
    }

    impl TraceSink for Counting {
        fn on_animation_start(&mut self, e: &AnimationStartEvent) {
            self.starts.push(e.id);
        }

        fn on_fallback_batch(&mut self, e: &FallbackBatchEvent) {
            self.batches += e.callbacks;
        }
    }

    #[test]
    fn tracer_dispatches_to_sink() {
        let sink = Rc::new(RefCell::new(Counting::default()));
        let tracer = Tracer::new(sink.clone());
        let id = AnimationId::first();

        tracer.animation_start(&AnimationStartEvent {
            id,
            at: HostTime(0),
            duration: None,
        });
        tracer.fallback_batch(&FallbackBatchEvent {
            at: HostTime(0),
            callbacks: 3,
        });
        // Not overridden: must be a no-op.
        tracer.compaction(&CompactionEvent {
            trigger: id,
            removed: 0,
            retained: 0,
        });

        assert_eq!(sink.borrow().starts, [id]);
        assert_eq!(sink.borrow().batches, 3);
    }

    #[test]
    fn busy_sink_drops_event() {
        let sink = Rc::new(RefCell::new(Counting::default()));
        let tracer = Tracer::new(sink.clone());

        let held = sink.borrow_mut();
        tracer.fallback_batch(&FallbackBatchEvent {
            at: HostTime(0),
            callbacks: 1,
        });
        drop(held);

        assert_eq!(sink.borrow().batches, 0, "event should have been dropped");
    }

    #[test]
    fn none_tracer_is_silent() {
        let tracer = Tracer::none();
        tracer.fallback_timer(&FallbackTimerEvent::Started {
            period: Duration::from_millis(16),
        });
    }
}
