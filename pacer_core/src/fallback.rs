// Copyright 2026 the Pacer Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Timer-driven stand-in for a native refresh signal.
//!
//! [`TimerFallbackScheduler`] simulates a fixed refresh cadence on hosts that
//! only offer a recurring timer. Pending callbacks are kept in a map keyed by
//! an incrementing request number. On each timer tick the map is swapped out
//! for an empty one before the batch runs, so callbacks scheduled *during* a
//! batch wait for the next tick.
//!
//! The timer is started lazily by the first request and stopped again once
//! no callback has run for longer than
//! [`FallbackConfig::idle_timeout`], so an idle page or process does not keep
//! waking up.
//!
//! Hosts plug in their timer through [`IntervalTimer`] and forward every tick
//! to [`TimerFallbackScheduler::on_timer_tick`]. [`PolledTimer`] is a timer
//! that only records what the host should be doing; event loops (and tests)
//! poll it and tick the scheduler themselves.

use alloc::collections::BTreeMap;
use core::cell::RefCell;
use core::fmt;
use core::mem;

use crate::config::FallbackConfig;
use crate::frame::{FrameCallback, FrameRequestId, FrameScheduler};
use crate::time::{Duration, HostTime};
use crate::trace::{FallbackBatchEvent, FallbackTimerEvent, Tracer};

/// A host's recurring-timer primitive.
pub trait IntervalTimer {
    /// Begins ticking every `period`. Each tick must be forwarded to
    /// [`TimerFallbackScheduler::on_timer_tick`].
    fn start(&mut self, period: Duration);

    /// Stops ticking.
    fn stop(&mut self);
}

/// An [`IntervalTimer`] that records its requested state instead of owning a
/// platform timer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PolledTimer {
    period: Option<Duration>,
    starts: u32,
    stops: u32,
}

impl PolledTimer {
    /// Whether the host should currently be ticking.
    #[inline]
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.period.is_some()
    }

    /// The requested tick period while active.
    #[inline]
    #[must_use]
    pub const fn period(&self) -> Option<Duration> {
        self.period
    }

    /// How many times the timer was started.
    #[inline]
    #[must_use]
    pub const fn starts(&self) -> u32 {
        self.starts
    }

    /// How many times the timer was stopped.
    #[inline]
    #[must_use]
    pub const fn stops(&self) -> u32 {
        self.stops
    }
}

impl IntervalTimer for PolledTimer {
    fn start(&mut self, period: Duration) {
        self.period = Some(period);
        self.starts += 1;
    }

    fn stop(&mut self) {
        self.period = None;
        self.stops += 1;
    }
}

/// Result of a timer tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TimerState {
    /// The timer keeps ticking.
    Active,
    /// The timer has been stopped; the next request restarts it.
    Idle,
}

#[derive(Default)]
struct FallbackState {
    pending: BTreeMap<u64, FrameCallback>,
    next_request: u64,
    running: bool,
    /// Last tick that ran at least one callback. Reset when the timer starts
    /// and seeded by the first tick afterwards.
    last_active: Option<HostTime>,
}

/// Frame scheduler that batches callbacks onto a recurring host timer.
pub struct TimerFallbackScheduler<T> {
    state: RefCell<FallbackState>,
    timer: RefCell<T>,
    config: FallbackConfig,
    tracer: Tracer,
}

impl<T: IntervalTimer> TimerFallbackScheduler<T> {
    /// Creates an idle scheduler around `timer`.
    #[must_use]
    pub fn new(timer: T, config: FallbackConfig) -> Self {
        Self {
            state: RefCell::new(FallbackState::default()),
            timer: RefCell::new(timer),
            config,
            tracer: Tracer::none(),
        }
    }

    /// Attaches a tracer for timer transitions and batch dispatches.
    #[must_use]
    pub fn with_tracer(mut self, tracer: Tracer) -> Self {
        self.tracer = tracer;
        self
    }

    /// Queues `callback` for the next tick, starting the timer if it is idle.
    pub fn request(&self, callback: FrameCallback) -> FrameRequestId {
        let (id, needs_start) = {
            let mut state = self.state.borrow_mut();
            let id = state.next_request;
            state.next_request = id.wrapping_add(1);
            state.pending.insert(id, callback);
            let needs_start = !state.running;
            if needs_start {
                state.running = true;
                state.last_active = None;
            }
            (id, needs_start)
        };

        if needs_start {
            self.timer.borrow_mut().start(self.config.period);
            self.tracer.fallback_timer(&FallbackTimerEvent::Started {
                period: self.config.period,
            });
        }
        FrameRequestId(id)
    }

    /// Runs one timer tick: dispatches the pending batch with `now`, then
    /// idles the timer if nothing has run for longer than the idle timeout.
    ///
    /// Ticks that arrive after the timer went idle are ignored.
    pub fn on_timer_tick(&self, now: HostTime) -> TimerState {
        let batch = {
            let mut state = self.state.borrow_mut();
            if !state.running {
                return TimerState::Idle;
            }
            mem::take(&mut state.pending)
        };

        let callbacks = batch.len();
        for callback in batch.into_values() {
            callback(now);
        }
        if callbacks > 0 {
            self.tracer
                .fallback_batch(&FallbackBatchEvent { at: now, callbacks });
        }

        let idle_for = {
            let mut state = self.state.borrow_mut();
            if callbacks > 0 {
                state.last_active = Some(now);
            }
            let last_active = *state.last_active.get_or_insert(now);
            let idle_for = now.saturating_duration_since(last_active);
            if idle_for > self.config.idle_timeout && state.pending.is_empty() {
                state.running = false;
                state.last_active = None;
                Some(idle_for)
            } else {
                None
            }
        };

        match idle_for {
            Some(idle_for) => {
                self.timer.borrow_mut().stop();
                self.tracer
                    .fallback_timer(&FallbackTimerEvent::Idled { at: now, idle_for });
                TimerState::Idle
            }
            None => TimerState::Active,
        }
    }

    /// Whether the recurring timer is currently running.
    #[must_use]
    pub fn is_timer_running(&self) -> bool {
        self.state.borrow().running
    }

    /// Number of callbacks waiting for the next tick.
    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.state.borrow().pending.len()
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> FallbackConfig {
        self.config
    }

    /// Runs `f` with shared access to the host timer.
    pub fn with_timer<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.timer.borrow())
    }
}

impl<T: IntervalTimer> FrameScheduler for TimerFallbackScheduler<T> {
    type RenderRoot = ();

    #[inline]
    fn schedule_next_frame(&self, callback: FrameCallback, _root: Option<&()>) -> FrameRequestId {
        self.request(callback)
    }
}

impl<T> fmt::Debug for TimerFallbackScheduler<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("TimerFallbackScheduler");
        s.field("config", &self.config);
        if let Ok(state) = self.state.try_borrow() {
            s.field("pending", &state.pending.len())
                .field("running", &state.running)
                .field("last_active", &state.last_active);
        }
        s.finish_non_exhaustive()
    }
}
