// Copyright 2026 the Pacer Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable trace output.
//!
//! [`PrettyPrintSink`] implements [`TraceSink`] and writes one line per event
//! to a [`Write`](std::io::Write) destination (default: stderr). Timestamps
//! are printed in milliseconds.

use std::io::Write;

use pacer_core::animation::FrameKind;
use pacer_core::time::HostTime;
use pacer_core::trace::{
    AnimationEndEvent, AnimationStartEvent, CatchUpEvent, CompactionEvent, EndReason,
    FallbackBatchEvent, FallbackTimerEvent, StepEvent, TraceSink,
};

/// Writes human-readable trace lines to a [`Write`](std::io::Write) destination.
pub struct PrettyPrintSink<W: Write = Box<dyn Write>> {
    writer: W,
    steps: bool,
}

impl<W: Write> std::fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyPrintSink")
            .field("steps", &self.steps)
            .finish_non_exhaustive()
    }
}

impl PrettyPrintSink {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self::new(Box::new(std::io::stderr()))
    }

    /// Creates a sink that writes to a boxed writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write>) -> Self {
        Self::with_writer(writer)
    }
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W) -> Self {
        Self {
            writer,
            steps: true,
        }
    }

    /// Turns per-step lines on or off. Everything else is always printed.
    #[must_use]
    pub fn steps(mut self, steps: bool) -> Self {
        self.steps = steps;
        self
    }

    /// Consumes the sink and returns its writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

fn ms(t: HostTime) -> f64 {
    t.as_millis_f64()
}

fn reason_name(reason: EndReason) -> &'static str {
    match reason {
        EndReason::Elapsed => "elapsed",
        EndReason::StepFinished => "step-finished",
        EndReason::Stopped => "stopped",
        EndReason::Rejected => "rejected",
    }
}

impl<W: Write> TraceSink for PrettyPrintSink<W> {
    fn on_animation_start(&mut self, e: &AnimationStartEvent) {
        let _ = match e.duration {
            Some(d) => writeln!(
                self.writer,
                "[start] {} at {:.3}ms duration={:.1}ms",
                e.id,
                ms(e.at),
                d.as_millis_f64(),
            ),
            None => writeln!(
                self.writer,
                "[start] {} at {:.3}ms open-ended",
                e.id,
                ms(e.at)
            ),
        };
    }

    fn on_step(&mut self, e: &StepEvent) {
        if !self.steps {
            return;
        }
        let tag = match e.kind {
            FrameKind::Real => "step",
            FrameKind::Virtual => "step:virtual",
        };
        let _ = writeln!(
            self.writer,
            "[{tag}] {} at {:.3}ms percent={:.4} value={:.4}",
            e.id,
            ms(e.at),
            e.percent,
            e.value,
        );
    }

    fn on_catch_up(&mut self, e: &CatchUpEvent) {
        let _ = writeln!(
            self.writer,
            "[catch-up] {} at {:.3}ms dropped={} synthesized={}",
            e.id,
            ms(e.at),
            e.dropped_frames,
            e.synthesized,
        );
    }

    fn on_animation_end(&mut self, e: &AnimationEndEvent) {
        let _ = writeln!(
            self.writer,
            "[end] {} at {:.3}ms {} finished={} fps={:.2} drops={}",
            e.id,
            ms(e.at),
            reason_name(e.reason),
            e.finished,
            e.effective_fps,
            e.drop_count,
        );
    }

    fn on_compaction(&mut self, e: &CompactionEvent) {
        let _ = writeln!(
            self.writer,
            "[compact] trigger={} removed={} retained={}",
            e.trigger, e.removed, e.retained,
        );
    }

    fn on_fallback_timer(&mut self, e: &FallbackTimerEvent) {
        let _ = match *e {
            FallbackTimerEvent::Started { period } => writeln!(
                self.writer,
                "[timer] started period={:.3}ms",
                period.as_millis_f64()
            ),
            FallbackTimerEvent::Idled { at, idle_for } => writeln!(
                self.writer,
                "[timer] idled at {:.3}ms after {:.1}ms quiet",
                ms(at),
                idle_for.as_millis_f64()
            ),
        };
    }

    fn on_fallback_batch(&mut self, e: &FallbackBatchEvent) {
        let _ = writeln!(
            self.writer,
            "[batch] at {:.3}ms callbacks={}",
            ms(e.at),
            e.callbacks,
        );
    }
}
