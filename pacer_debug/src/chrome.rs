// Copyright 2026 the Pacer Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Chrome Trace Event Format exporter.
//!
//! [`export`] reads recorded bytes from a [`RecorderSink`](super::recorder::RecorderSink)
//! and writes [Chrome Trace Event Format][format] JSON to the given writer.
//!
//! Each animation run becomes a `B`/`E` span on its own track (`tid` is the
//! animation handle), with steps and catch-ups as instants on that track.
//! Fallback-timer activity lives on track `0`.
//!
//! [format]: https://docs.google.com/document/d/1CvAClvFfyA5R-PhYUmn5OOQtYMH4h6I0nSsKchNAySU

use std::io::{self, Write};

use serde_json::{Value, json};

use pacer_core::time::{Duration, HostTime};
use pacer_core::trace::FallbackTimerEvent;

use crate::recorder::{RecordedEvent, decode};

const PID: u32 = 1;
const SCHEDULER_TID: u64 = 0;

/// Exports recorded events as Chrome Trace Event Format JSON.
///
/// The output is a complete JSON array of trace event objects, suitable for
/// loading into `chrome://tracing` or [Perfetto](https://ui.perfetto.dev/).
/// Host timestamps are already microseconds and are written unchanged.
pub fn export(bytes: &[u8], writer: &mut dyn Write) -> io::Result<()> {
    let mut events: Vec<Value> = Vec::new();

    for recorded in decode(bytes) {
        match recorded {
            RecordedEvent::AnimationStart(e) => {
                events.push(json!({
                    "ph": "B",
                    "name": format!("animation {}", e.id),
                    "cat": "Animation",
                    "ts": us(e.at),
                    "pid": PID,
                    "tid": e.id.get(),
                    "args": {
                        "duration_ms": e.duration.map(Duration::as_millis_f64),
                    }
                }));
            }
            RecordedEvent::Step(e) => {
                let name = if e.kind.is_real() {
                    "Step"
                } else {
                    "VirtualStep"
                };
                events.push(json!({
                    "ph": "i",
                    "name": name,
                    "cat": "Animation",
                    "ts": us(e.at),
                    "pid": PID,
                    "tid": e.id.get(),
                    "s": "t",
                    "args": {
                        "percent": e.percent,
                        "value": e.value,
                    }
                }));
            }
            RecordedEvent::CatchUp(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": "CatchUp",
                    "cat": "Animation",
                    "ts": us(e.at),
                    "pid": PID,
                    "tid": e.id.get(),
                    "s": "t",
                    "args": {
                        "dropped_frames": e.dropped_frames,
                        "synthesized": e.synthesized,
                    }
                }));
            }
            RecordedEvent::AnimationEnd(e) => {
                events.push(json!({
                    "ph": "E",
                    "name": format!("animation {}", e.id),
                    "cat": "Animation",
                    "ts": us(e.at),
                    "pid": PID,
                    "tid": e.id.get(),
                    "args": {
                        "reason": format!("{:?}", e.reason),
                        "effective_fps": e.effective_fps,
                        "drop_count": e.drop_count,
                        "finished": e.finished,
                    }
                }));
            }
            RecordedEvent::Compaction(e) => {
                // Compaction carries no timestamp; pin it to the start of the
                // trace so it stays visible.
                events.push(json!({
                    "ph": "i",
                    "name": "Compaction",
                    "cat": "Registry",
                    "ts": 0,
                    "pid": PID,
                    "tid": SCHEDULER_TID,
                    "s": "p",
                    "args": {
                        "trigger": e.trigger.get(),
                        "removed": e.removed,
                        "retained": e.retained,
                    }
                }));
            }
            RecordedEvent::FallbackTimer(FallbackTimerEvent::Started { period }) => {
                events.push(json!({
                    "ph": "i",
                    "name": "TimerStarted",
                    "cat": "Fallback",
                    "ts": 0,
                    "pid": PID,
                    "tid": SCHEDULER_TID,
                    "s": "p",
                    "args": {
                        "period_ms": period.as_millis_f64(),
                    }
                }));
            }
            RecordedEvent::FallbackTimer(FallbackTimerEvent::Idled { at, idle_for }) => {
                events.push(json!({
                    "ph": "i",
                    "name": "TimerIdled",
                    "cat": "Fallback",
                    "ts": us(at),
                    "pid": PID,
                    "tid": SCHEDULER_TID,
                    "s": "p",
                    "args": {
                        "idle_for_ms": idle_for.as_millis_f64(),
                    }
                }));
            }
            RecordedEvent::FallbackBatch(e) => {
                events.push(json!({
                    "ph": "C",
                    "name": "FallbackBatch",
                    "cat": "Fallback",
                    "ts": us(e.at),
                    "pid": PID,
                    "tid": SCHEDULER_TID,
                    "args": {
                        "callbacks": e.callbacks,
                    }
                }));
            }
        }
    }

    serde_json::to_writer_pretty(writer, &events)?;
    Ok(())
}

fn us(t: HostTime) -> u64 {
    t.ticks()
}
