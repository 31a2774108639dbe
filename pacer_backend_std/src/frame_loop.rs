// Copyright 2026 the Pacer Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Thread-driven tick source for the timer fallback.
//!
//! Native processes rarely have a display refresh signal to hand, so
//! [`FrameLoop`] plays the host timer: it sleeps on the calling thread until
//! each tick deadline and forwards the tick to a
//! [`TimerFallbackScheduler`]. The loop returns once the scheduler idles its
//! timer.

use std::rc::Rc;
use std::thread;

use pacer_core::clock::Clock;
use pacer_core::config::{FallbackConfig, RunnerConfig};
use pacer_core::fallback::{PolledTimer, TimerFallbackScheduler, TimerState};
use pacer_core::runner::AnimationRunner;
use pacer_core::time::{Duration, HostTime};
use pacer_core::trace::Tracer;

use crate::clock::StdClock;

/// The fallback scheduler a [`FrameLoop`] drives.
pub type LoopScheduler = Rc<TimerFallbackScheduler<PolledTimer>>;

/// A runner whose frames come from a [`FrameLoop`].
pub type LoopRunner<C = StdClock> = AnimationRunner<LoopScheduler, C>;

/// Single-threaded frame loop over a [`PolledTimer`].
#[derive(Debug)]
pub struct FrameLoop<C = StdClock> {
    scheduler: LoopScheduler,
    clock: C,
}

impl FrameLoop<StdClock> {
    /// Creates a loop on a fresh [`StdClock`].
    #[must_use]
    pub fn new(config: FallbackConfig) -> Self {
        Self::with_clock(config, StdClock::new())
    }
}

impl<C: Clock> FrameLoop<C> {
    /// Creates a loop reading tick timestamps from `clock`.
    #[must_use]
    pub fn with_clock(config: FallbackConfig, clock: C) -> Self {
        Self::with_tracer(config, clock, Tracer::none())
    }

    /// Creates a loop whose scheduler reports to `tracer`.
    #[must_use]
    pub fn with_tracer(config: FallbackConfig, clock: C, tracer: Tracer) -> Self {
        Self {
            scheduler: Rc::new(
                TimerFallbackScheduler::new(PolledTimer::default(), config).with_tracer(tracer),
            ),
            clock,
        }
    }

    /// Returns a handle to the scheduler this loop ticks.
    #[must_use]
    pub fn scheduler(&self) -> LoopScheduler {
        Rc::clone(&self.scheduler)
    }

    /// Returns the clock.
    #[must_use]
    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Creates a runner that schedules on this loop and reads its clock.
    #[must_use]
    pub fn runner(&self, config: RunnerConfig, tracer: Tracer) -> LoopRunner<C>
    where
        C: Clone + 'static,
    {
        AnimationRunner::with_config(self.scheduler(), self.clock.clone(), config, tracer)
    }

    /// Whether the scheduler wants ticks.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.scheduler.with_timer(PolledTimer::is_active)
    }

    /// Delivers one tick now, without sleeping.
    pub fn tick(&self) -> TimerState {
        self.scheduler.on_timer_tick(self.clock.now())
    }

    /// Ticks at the timer period until the scheduler idles.
    ///
    /// Deadlines advance by whole periods from the first tick, so slow
    /// batches do not accumulate drift; a batch that overruns several
    /// deadlines is followed by a single late tick. Returns the number of
    /// ticks delivered.
    pub fn run_until_idle(&self) -> u64 {
        self.run_while(|_| true)
    }

    /// Like [`run_until_idle`](Self::run_until_idle), but also stops before
    /// any tick that would fall more than `limit` after the call.
    pub fn run_for(&self, limit: Duration) -> u64 {
        let end = self.clock.now().saturating_add(limit);
        self.run_while(|deadline| deadline <= end)
    }

    fn run_while(&self, mut keep_going: impl FnMut(HostTime) -> bool) -> u64 {
        let mut ticks = 0;
        let mut deadline = self.clock.now();
        while let Some(period) = self.scheduler.with_timer(PolledTimer::period) {
            deadline = deadline.saturating_add(period);
            let now = self.clock.now();
            if deadline < now {
                deadline = now;
            }
            if !keep_going(deadline) {
                break;
            }
            sleep_until(&self.clock, deadline);
            ticks += 1;
            if self.tick() == TimerState::Idle {
                break;
            }
        }
        ticks
    }
}

fn sleep_until(clock: &impl Clock, deadline: HostTime) {
    let remaining = deadline.saturating_duration_since(clock.now());
    if !remaining.is_zero() {
        thread::sleep(std::time::Duration::from_micros(remaining.ticks()));
    }
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};

    use pacer_core::animation::{Animation, Completion};
    use pacer_core::clock::ManualClock;

    use super::*;

    /// Fast cadence so real-time tests stay short.
    const QUICK: FallbackConfig = FallbackConfig {
        period: Duration::from_micros(2_000),
        idle_timeout: Duration::from_millis(20),
    };

    #[test]
    fn idle_loop_returns_immediately() {
        let frame_loop = FrameLoop::new(QUICK);
        assert!(!frame_loop.is_active());
        assert_eq!(frame_loop.run_until_idle(), 0);
    }

    #[test]
    fn runs_animation_to_completion_then_idles() {
        let frame_loop = FrameLoop::new(QUICK);
        let runner = frame_loop.runner(
            RunnerConfig {
                desired_fps: 500.0,
                ..RunnerConfig::STANDARD
            },
            Tracer::none(),
        );

        let done = Rc::new(RefCell::new(None::<Completion>));
        let last = Rc::new(Cell::new(0.0));
        let (d, l) = (done.clone(), last.clone());
        let id = runner.start(
            Animation::new(move |value, _, _| l.set(value))
                .duration(Duration::from_millis(30))
                .on_complete(move |c| *d.borrow_mut() = Some(c)),
        );
        assert!(frame_loop.is_active());

        let ticks = frame_loop.run_until_idle();

        let done = done.borrow().expect("run completed");
        assert_eq!(done.id, id);
        assert!(done.finished);
        assert_eq!(last.get(), 1.0);
        assert!(ticks > 1);
        assert!(!frame_loop.is_active());
        assert!(!runner.is_running(id));
    }

    #[test]
    fn run_for_stops_at_limit_on_manual_clock() {
        // A manual clock never advances on its own, so every deadline after
        // the first lies in the future and only the limit ends the loop.
        let clock = ManualClock::new(HostTime::from_millis(5));
        let frame_loop = FrameLoop::with_clock(QUICK, clock.clone());
        let runner = frame_loop.runner(RunnerConfig::STANDARD, Tracer::none());
        let steps = Rc::new(Cell::new(0_u32));
        let s = steps.clone();
        runner.start(Animation::new(move |_, _, _| s.set(s.get() + 1)));

        let ticks = frame_loop.run_for(Duration::from_micros(7_000));
        assert_eq!(ticks, 3, "deadlines at 2, 4 and 6 ms past start");
        assert_eq!(steps.get(), 3);
        assert!(frame_loop.is_active());
    }

    #[test]
    fn tick_without_work_keeps_timer_until_timeout() {
        let clock = ManualClock::default();
        let frame_loop = FrameLoop::with_clock(QUICK, clock.clone());
        frame_loop.scheduler().request(Box::new(|_| {}));

        assert_eq!(frame_loop.tick(), TimerState::Active);
        clock.advance(Duration::from_millis(20));
        assert_eq!(frame_loop.tick(), TimerState::Active);
        clock.advance(Duration::from_micros(1));
        assert_eq!(frame_loop.tick(), TimerState::Idle);
    }
}
