// Copyright 2026 the Pacer Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Simulated frame host that exercises the tracing and diagnostics pipeline.
//!
//! Drives a handful of animations through the timer fallback on a manual
//! clock, injecting stalls so the runner has to catch up. Events go to both a
//! [`PrettyPrintSink`](pacer_debug::pretty::PrettyPrintSink) and a
//! [`RecorderSink`](pacer_debug::recorder::RecorderSink), and the recording
//! is exported as a Chrome trace JSON file.

use std::cell::RefCell;
use std::fs::File;
use std::io::BufWriter;
use std::rc::Rc;

use pacer_core::animation::{Animation, Completion};
use pacer_core::clock::{Clock, ManualClock};
use pacer_core::config::{FallbackConfig, RunnerConfig};
use pacer_core::easing;
use pacer_core::fallback::{PolledTimer, TimerFallbackScheduler, TimerState};
use pacer_core::runner::AnimationRunner;
use pacer_core::time::Duration;
use pacer_core::trace::{
    AnimationEndEvent, AnimationStartEvent, CatchUpEvent, CompactionEvent, FallbackBatchEvent,
    FallbackTimerEvent, StepEvent, TraceSink, Tracer,
};

use pacer_debug::pretty::PrettyPrintSink;
use pacer_debug::recorder::RecorderSink;

/// Nominal refresh interval (≈60 Hz).
const FRAME: Duration = Duration::from_micros(16_667);

/// Frames after which the host stalls, and for how many extra intervals.
const STALLS: [(u32, u64); 3] = [(12, 2), (30, 6), (45, 1)];

type Completions = Rc<RefCell<Vec<Completion>>>;

fn report(completions: &Completions) -> impl FnOnce(Completion) + 'static {
    let completions = completions.clone();
    move |done| completions.borrow_mut().push(done)
}

/// Forwards every event to a pretty printer and a recorder.
struct Tee {
    pretty: PrettyPrintSink,
    recorder: RecorderSink,
}

impl TraceSink for Tee {
    fn on_animation_start(&mut self, e: &AnimationStartEvent) {
        self.pretty.on_animation_start(e);
        self.recorder.on_animation_start(e);
    }

    fn on_step(&mut self, e: &StepEvent) {
        self.pretty.on_step(e);
        self.recorder.on_step(e);
    }

    fn on_catch_up(&mut self, e: &CatchUpEvent) {
        self.pretty.on_catch_up(e);
        self.recorder.on_catch_up(e);
    }

    fn on_animation_end(&mut self, e: &AnimationEndEvent) {
        self.pretty.on_animation_end(e);
        self.recorder.on_animation_end(e);
    }

    fn on_compaction(&mut self, e: &CompactionEvent) {
        self.pretty.on_compaction(e);
        self.recorder.on_compaction(e);
    }

    fn on_fallback_timer(&mut self, e: &FallbackTimerEvent) {
        self.pretty.on_fallback_timer(e);
        self.recorder.on_fallback_timer(e);
    }

    fn on_fallback_batch(&mut self, e: &FallbackBatchEvent) {
        self.pretty.on_fallback_batch(e);
        self.recorder.on_fallback_batch(e);
    }
}

fn main() {
    // -- sinks -------------------------------------------------------------
    let sink = Rc::new(RefCell::new(Tee {
        pretty: PrettyPrintSink::new(Box::new(std::io::stdout())).steps(false),
        recorder: RecorderSink::new(),
    }));
    let tracer = Tracer::new(sink.clone());

    // -- host --------------------------------------------------------------
    let clock = ManualClock::default();
    let frames = Rc::new(
        TimerFallbackScheduler::new(PolledTimer::default(), FallbackConfig::SIXTY_HZ)
            .with_tracer(tracer.clone()),
    );
    let runner = AnimationRunner::with_config(
        frames.clone(),
        clock.clone(),
        RunnerConfig::STANDARD,
        tracer,
    );

    // -- animations --------------------------------------------------------
    let completions = Completions::default();

    runner.start(
        Animation::new(|_, _, _| {})
            .duration(Duration::from_millis(500))
            .easing(easing::ease_out_cubic)
            .on_complete(report(&completions)),
    );
    runner.start(
        Animation::new(|_, _, _| {})
            .duration(Duration::from_millis(800))
            .easing(easing::ease_in_out_cubic)
            .on_complete(report(&completions)),
    );
    let spinner = runner.start(Animation::new(|_, _, _| {}).on_complete(report(&completions)));
    let mut budget = 20;
    runner.start(
        Animation::new(|_, _, _| {})
            .verify(move |_| {
                budget -= 1;
                budget > 0
            })
            .on_complete(report(&completions)),
    );

    // -- simulated refresh loop --------------------------------------------
    let mut frame = 0_u32;
    loop {
        let stall = STALLS
            .iter()
            .find(|(at, _)| *at == frame)
            .map_or(0, |(_, extra)| *extra);
        clock.advance(Duration(FRAME.ticks() * (1 + stall)));
        frame += 1;

        if frame == 36 && runner.stop(spinner) {
            println!("-- frame {frame}: stopped spinner {spinner}");
        }
        if frames.on_timer_tick(clock.now()) == TimerState::Idle {
            break;
        }
    }

    // -- summary -----------------------------------------------------------
    for done in completions.borrow().iter() {
        println!(
            "{}: finished={} effective_fps={:.2}",
            done.id, done.finished, done.effective_fps
        );
    }

    // -- export Chrome trace -----------------------------------------------
    let path = "trace.json";
    let file = File::create(path).expect("failed to create trace.json");
    let mut writer = BufWriter::new(file);
    pacer_debug::chrome::export(sink.borrow().recorder.as_bytes(), &mut writer)
        .expect("failed to write Chrome trace");

    println!("Wrote {path} ({frame} frames)");
}
