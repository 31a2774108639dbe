// Copyright 2026 the Pacer Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Concurrent animation runs driven one frame at a time.
//!
//! [`AnimationRunner`] issues a handle per [`Animation`], then drives each run
//! through a per-frame step loop scheduled on a [`FrameScheduler`]:
//!
//! ```text
//!   start() ──► schedule ──► frame fires ──► termination check ──► end
//!                  ▲                              │
//!                  │                              ▼
//!                  │                     catch-up (virtual steps)
//!                  │                              │
//!                  │                              ▼
//!                  └──── not done ◄──────── real step ──► done ──► end
//! ```
//!
//! # Dropped frames
//!
//! When a real frame arrives later than one nominal interval after the
//! previous one, the runner executes up to
//! [`RunnerConfig::max_catch_up`] virtual steps before the real one, so step
//! callbacks that integrate state per frame stay in line with wall-clock
//! time. Each virtual step counts against the effective frame rate reported
//! on completion: `desired_fps - drop_count / elapsed_seconds`.
//!
//! # Re-entrancy
//!
//! All callbacks run on the scheduler's timeline and may call back into the
//! runner (start new runs, stop any run). The runner never holds its registry
//! borrowed across a callback.

use alloc::boxed::Box;
use alloc::rc::Rc;
use core::cell::RefCell;
use core::fmt;

use crate::animation::{
    Animation, AnimationId, CompleteFn, Completion, EasingFn, FrameKind, StepFn, StepOutcome,
    VerifyFn,
};
use crate::clock::Clock;
use crate::config::RunnerConfig;
use crate::frame::FrameScheduler;
use crate::registry::Registry;
use crate::time::{Duration, HostTime};
use crate::trace::{
    AnimationEndEvent, AnimationStartEvent, CatchUpEvent, CompactionEvent, EndReason, StepEvent,
    Tracer,
};

/// Manages concurrently running animations on one frame scheduler.
///
/// The runner is a cheap, cloneable handle; clones share the registry, so a
/// callback can capture a clone to start or stop runs.
pub struct AnimationRunner<S, C> {
    shared: Rc<Shared<S, C>>,
}

struct Shared<S, C> {
    scheduler: S,
    clock: C,
    config: RunnerConfig,
    registry: RefCell<Registry>,
    tracer: Tracer,
}

/// Per-run state, owned by whichever frame callback is pending.
struct Instance<R> {
    id: AnimationId,
    started: HostTime,
    last_frame: HostTime,
    percent: f64,
    drop_count: u32,
    duration: Option<Duration>,
    step: StepFn,
    verify: Option<VerifyFn>,
    completed: Option<CompleteFn>,
    easing: Option<EasingFn>,
    root: Option<Rc<R>>,
}

impl<S, C> Clone for AnimationRunner<S, C> {
    fn clone(&self) -> Self {
        Self {
            shared: Rc::clone(&self.shared),
        }
    }
}

impl<S, C> AnimationRunner<S, C>
where
    S: FrameScheduler + 'static,
    S::RenderRoot: 'static,
    C: Clock + 'static,
{
    /// Creates a runner with [`RunnerConfig::STANDARD`] and no tracing.
    #[must_use]
    pub fn new(scheduler: S, clock: C) -> Self {
        Self::with_config(scheduler, clock, RunnerConfig::STANDARD, Tracer::none())
    }

    /// Creates a runner with the given configuration and tracer.
    #[must_use]
    pub fn with_config(scheduler: S, clock: C, config: RunnerConfig, tracer: Tracer) -> Self {
        Self {
            shared: Rc::new(Shared {
                scheduler,
                clock,
                config,
                registry: RefCell::new(Registry::new()),
                tracer,
            }),
        }
    }

    /// Registers `animation` as running and schedules its first step.
    ///
    /// Returns the new handle synchronously; no callback runs before the
    /// scheduler delivers the first frame.
    pub fn start(&self, animation: Animation<S::RenderRoot>) -> AnimationId {
        let shared = &self.shared;
        let started = shared.clock.now();

        let (id, compacted) = {
            let mut registry = shared.registry.borrow_mut();
            let id = registry.issue();
            let interval = shared.config.compaction_interval;
            let compacted = (interval != 0 && id.get() % interval == 0).then(|| registry.compact());
            registry.mark_running(id);
            (id, compacted)
        };

        if let Some(pass) = compacted {
            shared.tracer.compaction(&CompactionEvent {
                trigger: id,
                removed: pass.removed,
                retained: pass.retained,
            });
        }
        shared.tracer.animation_start(&AnimationStartEvent {
            id,
            at: started,
            duration: animation.duration,
        });

        let instance = Instance {
            id,
            started,
            last_frame: started,
            percent: 0.0,
            drop_count: 0,
            duration: animation.duration,
            step: animation.step,
            verify: animation.verify,
            completed: animation.completed,
            easing: animation.easing,
            root: animation.root.map(Rc::new),
        };
        Shared::schedule(shared, instance);
        id
    }

    /// Stops a running animation.
    ///
    /// Returns `true` if this call stopped it, `false` if it was already
    /// stopped or never issued. The completion callback does not run here;
    /// it runs from the animation's next scheduled frame.
    pub fn stop(&self, id: AnimationId) -> bool {
        self.shared.registry.borrow_mut().stop(id)
    }

    /// Whether `id` is currently running.
    #[must_use]
    pub fn is_running(&self, id: AnimationId) -> bool {
        self.shared.registry.borrow().is_running(id)
    }

    /// Number of animations currently running.
    #[must_use]
    pub fn running_count(&self) -> usize {
        self.shared.registry.borrow().running_count()
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> RunnerConfig {
        self.shared.config
    }

    /// Returns the frame scheduler.
    #[must_use]
    pub fn scheduler(&self) -> &S {
        &self.shared.scheduler
    }

    /// Returns the clock.
    #[must_use]
    pub fn clock(&self) -> &C {
        &self.shared.clock
    }
}

impl<S, C> Shared<S, C>
where
    S: FrameScheduler + 'static,
    S::RenderRoot: 'static,
    C: Clock + 'static,
{
    fn schedule(this: &Rc<Self>, instance: Instance<S::RenderRoot>) {
        let root = instance.root.clone();
        let next = Rc::clone(this);
        this.scheduler.schedule_next_frame(
            Box::new(move |_| Self::run_frame(next, instance)),
            root.as_deref(),
        );
    }

    /// One real frame: termination check, catch-up, real step, then either
    /// completion or rescheduling.
    fn run_frame(this: Rc<Self>, mut inst: Instance<S::RenderRoot>) {
        let now = this.clock.now();

        if let Some(reason) = this.rejection(&mut inst) {
            this.end(inst, now, reason, false);
            return;
        }

        let dropped = this.dropped_frames(inst.last_frame, now);
        let synthesized = dropped.min(this.config.max_catch_up);
        if dropped > 0 {
            this.tracer.catch_up(&CatchUpEvent {
                id: inst.id,
                at: now,
                dropped_frames: dropped,
                synthesized,
            });
        }
        for _ in 0..synthesized {
            if let Some(reason) = this.rejection(&mut inst) {
                this.end(inst, now, reason, false);
                return;
            }
            this.step(&mut inst, now, FrameKind::Virtual);
            inst.drop_count += 1;
        }

        let outcome = this.step(&mut inst, now, FrameKind::Real);
        let elapsed = inst.percent >= 1.0;
        if elapsed || outcome == StepOutcome::Finish {
            this.registry.borrow_mut().stop(inst.id);
            let reason = if elapsed {
                EndReason::Elapsed
            } else {
                EndReason::StepFinished
            };
            let finished = elapsed || inst.duration.is_none();
            this.end(inst, now, reason, finished);
        } else {
            inst.last_frame = now;
            Self::schedule(&this, inst);
        }
    }

    /// Returns why the run must end before its next step, if it must.
    fn rejection(&self, inst: &mut Instance<S::RenderRoot>) -> Option<EndReason> {
        let running = self.registry.borrow().is_running(inst.id);
        if !running {
            return Some(EndReason::Stopped);
        }
        if let Some(verify) = inst.verify.as_mut()
            && !verify(inst.id)
        {
            self.registry.borrow_mut().stop(inst.id);
            return Some(EndReason::Rejected);
        }
        None
    }

    fn step(&self, inst: &mut Instance<S::RenderRoot>, now: HostTime, kind: FrameKind) -> StepOutcome {
        if let Some(duration) = inst.duration {
            inst.percent = inst.percent.max(progress(inst.started, now, duration));
        }
        let value = match &inst.easing {
            Some(easing) => easing(inst.percent),
            None => inst.percent,
        };
        let outcome = (inst.step)(value, now, kind);
        self.tracer.step(&StepEvent {
            id: inst.id,
            at: now,
            percent: inst.percent,
            value,
            kind,
        });
        outcome
    }

    /// Refresh ticks skipped between `last` and `now`, rounding the gap to
    /// whole frame intervals.
    #[expect(
        clippy::cast_possible_truncation,
        reason = "gap is non-negative and frame counts are clamped to u32"
    )]
    fn dropped_frames(&self, last: HostTime, now: HostTime) -> u32 {
        let gap = now.saturating_duration_since(last).as_millis_f64();
        // floor(x + 0.5) rounds halves up, matching the usual JS-style round.
        let frames = (gap / self.config.frame_interval_ms() + 0.5).min(f64::from(u32::MAX)) as u32;
        frames.saturating_sub(1)
    }

    fn end(&self, mut inst: Instance<S::RenderRoot>, now: HostTime, reason: EndReason, finished: bool) {
        let elapsed = now.saturating_duration_since(inst.started);
        let effective_fps = effective_fps(self.config.desired_fps, inst.drop_count, elapsed);
        self.tracer.animation_end(&AnimationEndEvent {
            id: inst.id,
            at: now,
            reason,
            effective_fps,
            drop_count: inst.drop_count,
            finished,
        });
        if let Some(completed) = inst.completed.take() {
            completed(Completion {
                effective_fps,
                id: inst.id,
                finished,
            });
        }
    }
}

/// Fraction of `duration` elapsed since `started`, capped at `1`.
fn progress(started: HostTime, now: HostTime, duration: Duration) -> f64 {
    if duration.is_zero() {
        return 1.0;
    }
    let elapsed = now.saturating_duration_since(started).as_millis_f64();
    (elapsed / duration.as_millis_f64()).min(1.0)
}

/// `desired_fps - drop_count / elapsed_seconds`; `desired_fps` when no time
/// has passed.
fn effective_fps(desired_fps: f64, drop_count: u32, elapsed: Duration) -> f64 {
    let secs = elapsed.as_secs_f64();
    if secs > 0.0 {
        desired_fps - f64::from(drop_count) / secs
    } else {
        desired_fps
    }
}

impl<S: fmt::Debug, C> fmt::Debug for AnimationRunner<S, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("AnimationRunner");
        s.field("scheduler", &self.shared.scheduler)
            .field("config", &self.shared.config);
        if let Ok(registry) = self.shared.registry.try_borrow() {
            s.field("registry", &*registry);
        }
        s.finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;
    use alloc::vec::Vec;
    use core::cell::Cell;

    use super::*;
    use crate::clock::ManualClock;
    use crate::config::FallbackConfig;
    use crate::fallback::{PolledTimer, TimerFallbackScheduler};

    type Frames = Rc<TimerFallbackScheduler<PolledTimer>>;

    /// A runner over a hand-cranked timer scheduler and a manual clock.
    struct Harness {
        clock: ManualClock,
        frames: Frames,
        runner: AnimationRunner<Frames, ManualClock>,
    }

    impl Harness {
        fn new() -> Self {
            let clock = ManualClock::default();
            let frames: Frames = Rc::new(TimerFallbackScheduler::new(
                PolledTimer::default(),
                FallbackConfig::SIXTY_HZ,
            ));
            let runner = AnimationRunner::new(frames.clone(), clock.clone());
            Self {
                clock,
                frames,
                runner,
            }
        }

        /// Delivers one refresh at `at`.
        fn frame(&self, at: HostTime) {
            self.clock.set(at);
            self.frames.on_timer_tick(at);
        }

        fn frame_ms(&self, ms: u64) {
            self.frame(HostTime::from_millis(ms));
        }
    }

    type Completions = Rc<RefCell<Vec<Completion>>>;

    fn collect(into: &Completions) -> impl FnOnce(Completion) + 'static {
        let into = into.clone();
        move |c| into.borrow_mut().push(c)
    }

    #[test]
    fn duration_run_completes_naturally_once() {
        let h = Harness::new();
        let done = Completions::default();
        let last_value = Rc::new(Cell::new(-1.0));
        let steps = Rc::new(Cell::new(0_u32));

        let (lv, st) = (last_value.clone(), steps.clone());
        let id = h.runner.start(
            Animation::new(move |value, _, _| {
                lv.set(value);
                st.set(st.get() + 1);
            })
            .duration(Duration::from_millis(1000))
            .on_complete(collect(&done)),
        );
        assert!(h.runner.is_running(id));
        assert_eq!(steps.get(), 0, "first step must be scheduled, not run");

        let mut t = 0;
        while t <= 1_100 {
            t += 16;
            h.frame_ms(t);
        }

        let done = done.borrow();
        assert_eq!(done.len(), 1, "completion must fire exactly once");
        assert_eq!(done[0].id, id);
        assert!(done[0].finished);
        assert!((done[0].effective_fps - 60.0).abs() < 1e-9, "no frames dropped");
        assert_eq!(last_value.get(), 1.0);
        assert_eq!(steps.get(), 63, "1008ms is the first 16ms frame past 1s");
        assert!(!h.runner.is_running(id));
    }

    #[test]
    fn percent_is_monotonic_and_eased() {
        let h = Harness::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let s = seen.clone();
        h.runner.start(
            Animation::new(move |value, _, _| s.borrow_mut().push(value))
                .duration(Duration::from_millis(40))
                .easing(|p| p * p),
        );

        for ms in [10, 20, 15, 30, 40] {
            h.frame_ms(ms);
        }

        // The clock stepping back to 15ms must not move progress backwards.
        assert_eq!(*seen.borrow(), vec![0.0625, 0.25, 0.25, 0.5625, 1.0]);
    }

    #[test]
    fn stop_is_reported_once_and_completes_on_next_frame() {
        let h = Harness::new();
        let done = Completions::default();
        let id = h.runner.start(
            Animation::new(|_, _, _| {})
                .duration(Duration::from_millis(1000))
                .on_complete(collect(&done)),
        );
        h.frame_ms(16);

        assert!(h.runner.stop(id));
        assert!(!h.runner.stop(id));
        assert!(!h.runner.is_running(id));
        assert!(done.borrow().is_empty(), "stop must not complete synchronously");

        h.frame_ms(32);
        assert_eq!(done.borrow().len(), 1);
        assert!(!done.borrow()[0].finished);

        // No further wakeups.
        assert_eq!(h.frames.pending_len(), 0);
        h.frame_ms(48);
        assert_eq!(done.borrow().len(), 1);
    }

    #[test]
    fn stop_before_first_frame_skips_every_step() {
        let h = Harness::new();
        let done = Completions::default();
        let stepped = Rc::new(Cell::new(false));
        let s = stepped.clone();
        let id = h
            .runner
            .start(Animation::new(move |_, _, _| s.set(true)).on_complete(collect(&done)));
        assert!(h.runner.stop(id));

        h.frame_ms(16);
        assert!(!stepped.get());
        assert_eq!(done.borrow().len(), 1);
    }

    #[test]
    fn verify_failure_ends_run_unfinished() {
        let h = Harness::new();
        let done = Completions::default();
        let calls = Rc::new(Cell::new(0_u32));
        let c = calls.clone();
        let id = h.runner.start(
            Animation::new(|_, _, _| {})
                .duration(Duration::from_millis(1000))
                .verify(move |_| {
                    c.set(c.get() + 1);
                    c.get() < 3
                })
                .on_complete(collect(&done)),
        );

        for ms in [16, 32, 48, 64] {
            h.frame_ms(ms);
        }

        assert_eq!(calls.get(), 3);
        let done = done.borrow();
        assert_eq!(done.len(), 1);
        assert_eq!(done[0].id, id);
        assert!(!done[0].finished);
        assert!(!h.runner.is_running(id));
    }

    #[test]
    fn catch_up_steps_match_dropped_frames() {
        // Gaps of N nominal intervals yield min(N - 1, 4) virtual steps.
        for n in 1..=7_u64 {
            let h = Harness::new();
            let virtuals = Rc::new(Cell::new(0_u32));
            let reals = Rc::new(Cell::new(0_u32));
            let (v, r) = (virtuals.clone(), reals.clone());
            h.runner.start(Animation::new(move |_, _, kind| match kind {
                FrameKind::Real => r.set(r.get() + 1),
                FrameKind::Virtual => v.set(v.get() + 1),
            }));

            h.frame(HostTime(16_667));
            assert_eq!(virtuals.get(), 0);

            h.frame(HostTime(16_667 + n * 16_667));
            let expected = u32::try_from((n - 1).min(4)).unwrap();
            assert_eq!(virtuals.get(), expected, "gap of {n} intervals");
            assert_eq!(reals.get(), 2);
        }
    }

    #[test]
    fn virtual_steps_precede_real_step_with_same_timestamp() {
        let h = Harness::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        let l = log.clone();
        h.runner
            .start(Animation::new(move |_, now, kind| l.borrow_mut().push((now, kind))));

        h.frame_ms(50);

        let at = HostTime::from_millis(50);
        assert_eq!(
            *log.borrow(),
            [
                (at, FrameKind::Virtual),
                (at, FrameKind::Virtual),
                (at, FrameKind::Real)
            ]
        );
    }

    #[test]
    fn effective_fps_accounts_for_catch_up() {
        let h = Harness::new();
        let done = Completions::default();
        h.runner.start(
            Animation::new(|_, _, _| {})
                .duration(Duration::from_millis(500))
                .on_complete(collect(&done)),
        );

        // 16ms, then a 100ms stall (6 intervals -> 5 dropped, 4 synthesized),
        // then straight to the end.
        h.frame_ms(16);
        h.frame_ms(116);
        h.frame_ms(132);
        h.frame_ms(500);

        let done = done.borrow();
        assert_eq!(done.len(), 1);
        // 116 -> 132 is one interval; 132 -> 500 is 22 intervals (capped at 4).
        let drops = 4.0 + 4.0;
        let expected = 60.0 - drops / 0.5;
        assert!(
            (done[0].effective_fps - expected).abs() < 1e-9,
            "expected {expected}, got {}",
            done[0].effective_fps
        );
    }

    #[test]
    fn effective_fps_degrades_with_drop_count() {
        let elapsed = Duration::from_millis(800);
        let fewer = effective_fps(60.0, 2, elapsed);
        let more = effective_fps(60.0, 6, elapsed);
        assert!(more < fewer);
        assert_eq!(effective_fps(60.0, 3, Duration::ZERO), 60.0);
    }

    #[test]
    fn virtual_step_results_are_ignored() {
        let h = Harness::new();
        let done = Completions::default();
        let id = h.runner.start(
            Animation::new(|_, _, kind: FrameKind| kind.is_real()).on_complete(collect(&done)),
        );

        h.frame_ms(100);
        assert!(
            h.runner.is_running(id),
            "false from a virtual step must not finish the run"
        );
        assert!(done.borrow().is_empty());
    }

    #[test]
    fn rejection_during_catch_up_ends_frame() {
        let h = Harness::new();
        let done = Completions::default();
        let reals = Rc::new(Cell::new(0_u32));
        let verifies = Rc::new(Cell::new(0_u32));
        let (r, v) = (reals.clone(), verifies.clone());
        h.runner.start(
            Animation::new(move |_, _, kind: FrameKind| {
                if kind.is_real() {
                    r.set(r.get() + 1);
                }
            })
            .verify(move |_| {
                v.set(v.get() + 1);
                v.get() < 3
            })
            .on_complete(collect(&done)),
        );

        // 5 intervals: the frame check passes, the first virtual passes, the
        // second virtual is rejected.
        h.frame(HostTime(5 * 16_667));

        assert_eq!(reals.get(), 0, "real step must not run after rejection");
        assert_eq!(done.borrow().len(), 1);
        assert!(!done.borrow()[0].finished);
        assert_eq!(h.frames.pending_len(), 0);
    }

    #[test]
    fn open_ended_run_finished_by_step_reports_finished() {
        let h = Harness::new();
        let done = Completions::default();
        let values = Rc::new(RefCell::new(Vec::new()));
        let v = values.clone();
        let frames = Rc::new(Cell::new(0_u32));
        let f = frames.clone();
        h.runner.start(
            Animation::new(move |value, _, _| {
                v.borrow_mut().push(value);
                f.set(f.get() + 1);
                f.get() < 3
            })
            .on_complete(collect(&done)),
        );

        for ms in [16, 32, 48, 64] {
            h.frame_ms(ms);
        }

        assert_eq!(frames.get(), 3);
        assert_eq!(*values.borrow(), [0.0, 0.0, 0.0], "percent is not time-driven");
        assert_eq!(done.borrow().len(), 1);
        assert!(done.borrow()[0].finished);
    }

    #[test]
    fn timed_run_finished_early_by_step_is_not_finished() {
        let h = Harness::new();
        let done = Completions::default();
        h.runner.start(
            Animation::new(|_, _, _| false)
                .duration(Duration::from_millis(1000))
                .on_complete(collect(&done)),
        );
        h.frame_ms(16);
        assert_eq!(done.borrow().len(), 1);
        assert!(!done.borrow()[0].finished);
    }

    #[test]
    fn zero_duration_completes_on_first_frame() {
        let h = Harness::new();
        let done = Completions::default();
        let values = Rc::new(RefCell::new(Vec::new()));
        let v = values.clone();
        h.runner.start(
            Animation::new(move |value, _, _| v.borrow_mut().push(value))
                .duration(Duration::ZERO)
                .on_complete(collect(&done)),
        );
        h.frame_ms(16);
        assert_eq!(*values.borrow(), [1.0]);
        assert!(done.borrow()[0].finished);
    }

    #[test]
    fn concurrent_runs_are_independent() {
        let h = Harness::new();
        let done = Completions::default();
        let b_steps = Rc::new(Cell::new(0_u32));
        let bs = b_steps.clone();

        let a = h.runner.start(
            Animation::new(|_, _, _| {})
                .duration(Duration::from_millis(100))
                .on_complete(collect(&done)),
        );
        let b = h.runner.start(
            Animation::new(move |_, _, _| bs.set(bs.get() + 1))
                .duration(Duration::from_millis(100))
                .on_complete(collect(&done)),
        );
        assert_ne!(a, b);
        assert!(a < b);

        h.frame_ms(16);
        assert!(h.runner.stop(a));
        for ms in (32..=112).step_by(16) {
            h.frame_ms(ms);
        }

        let done = done.borrow();
        assert_eq!(done.len(), 2);
        assert_eq!((done[0].id, done[0].finished), (a, false));
        assert_eq!((done[1].id, done[1].finished), (b, true));
        assert_eq!(b_steps.get(), 7);
    }

    #[test]
    fn runs_in_one_tick_step_in_registration_order() {
        let h = Harness::new();
        let order = Rc::new(RefCell::new(Vec::new()));
        for tag in 0..3_u32 {
            let o = order.clone();
            h.runner
                .start(Animation::new(move |_, _, _| o.borrow_mut().push(tag)));
        }
        h.frame_ms(16);
        h.frame_ms(32);
        assert_eq!(*order.borrow(), [0, 1, 2, 0, 1, 2]);
    }

    #[test]
    fn handles_strictly_increase() {
        let h = Harness::new();
        let ids: Vec<_> = (0..30)
            .map(|_| h.runner.start(Animation::new(|_, _, _| false)))
            .collect();
        assert_eq!(ids[0].get(), 1);
        assert!(ids.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn unknown_handles_are_not_running() {
        let h = Harness::new();
        let never = AnimationId::from_raw(42).unwrap();
        assert!(!h.runner.is_running(never));
        assert!(!h.runner.stop(never));
    }

    #[test]
    fn twentieth_handle_compacts_stopped_entries() {
        let h = Harness::new();
        let mut ids = Vec::new();
        for _ in 0..19 {
            ids.push(h.runner.start(Animation::new(|_, _, _| {})));
        }
        for id in &ids[..5] {
            h.runner.stop(*id);
        }
        h.frame_ms(16);
        assert_eq!(h.runner.shared.registry.borrow().len(), 19);
        assert_eq!(h.runner.running_count(), 14);

        let twentieth = h.runner.start(Animation::new(|_, _, _| {}));
        assert_eq!(twentieth.get(), 20);
        assert_eq!(h.runner.shared.registry.borrow().len(), 15);
        assert!(h.runner.is_running(twentieth));
        for id in &ids[5..] {
            assert!(h.runner.is_running(*id), "{id} must survive compaction");
        }

        // Survivors keep stepping.
        h.frame_ms(32);
        assert_eq!(h.runner.running_count(), 15);

        // The 21st..39th handles do not compact again.
        for _ in 0..19 {
            h.runner.start(Animation::new(|_, _, _| false));
        }
        h.frame_ms(48);
        assert_eq!(h.runner.shared.registry.borrow().len(), 34);
    }

    #[test]
    fn callbacks_may_reenter_runner() {
        let h = Harness::new();
        let done = Completions::default();
        let target = Rc::new(Cell::new(None));
        let follow_up = Rc::new(Cell::new(None));

        // Registered first, so it steps before its target in the same tick.
        let runner = h.runner.clone();
        let t = target.clone();
        let stopped_it = Rc::new(Cell::new(false));
        let s = stopped_it.clone();
        h.runner.start(Animation::new(move |_, _, _| {
            if let Some(id) = t.get() {
                s.set(runner.stop(id));
            }
            false
        }));

        let runner = h.runner.clone();
        let slot = follow_up.clone();
        let d = done.clone();
        let first = h.runner.start(Animation::new(|_, _, _| {}).on_complete(move |c| {
            d.borrow_mut().push(c);
            let next = runner.start(Animation::new(|_, _, _| false).on_complete(collect(&d)));
            slot.set(Some(next));
        }));
        target.set(Some(first));

        h.frame_ms(16);
        assert!(stopped_it.get());
        assert_eq!(done.borrow().len(), 1);
        assert_eq!((done.borrow()[0].id, done.borrow()[0].finished), (first, false));
        let next = follow_up.get().expect("follow-up started from completion");
        assert!(h.runner.is_running(next));

        h.frame_ms(32);
        assert_eq!(done.borrow().len(), 2);
        assert_eq!(done.borrow()[1].id, next);
    }

    #[test]
    fn timer_idles_once_all_runs_end() {
        let h = Harness::new();
        h.runner.start(Animation::new(|_, _, _| false));
        h.frame_ms(16);
        assert!(h.frames.is_timer_running());
        h.frame_ms(3_000);
        assert!(!h.frames.is_timer_running());
    }

    #[cfg(feature = "trace")]
    #[test]
    fn emits_trace_events() {
        use crate::trace::TraceSink;

        #[derive(Default)]
        struct Sink {
            ends: Vec<(AnimationId, EndReason)>,
            catch_ups: Vec<(u32, u32)>,
            compactions: usize,
        }

        impl TraceSink for Sink {
            fn on_animation_end(&mut self, e: &AnimationEndEvent) {
                self.ends.push((e.id, e.reason));
            }
            fn on_catch_up(&mut self, e: &CatchUpEvent) {
                self.catch_ups.push((e.dropped_frames, e.synthesized));
            }
            fn on_compaction(&mut self, _: &CompactionEvent) {
                self.compactions += 1;
            }
        }

        let clock = ManualClock::default();
        let frames: Frames = Rc::new(TimerFallbackScheduler::new(
            PolledTimer::default(),
            FallbackConfig::SIXTY_HZ,
        ));
        let sink = Rc::new(RefCell::new(Sink::default()));
        let runner = AnimationRunner::with_config(
            frames.clone(),
            clock.clone(),
            RunnerConfig::STANDARD,
            Tracer::new(sink.clone()),
        );

        let timed = runner.start(Animation::new(|_, _, _| {}).duration(Duration::from_millis(100)));
        let stopped = runner.start(Animation::new(|_, _, _| {}));
        runner.stop(stopped);

        clock.set(HostTime::from_millis(150));
        frames.on_timer_tick(clock.now());

        let sink = sink.borrow();
        assert_eq!(sink.catch_ups, [(8, 4)]);
        assert_eq!(
            sink.ends,
            [(timed, EndReason::Elapsed), (stopped, EndReason::Stopped)]
        );
        assert_eq!(sink.compactions, 0);
    }
}
