// Copyright 2026 the Pacer Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Compact binary event recording and decoding.
//!
//! [`RecorderSink`] implements [`TraceSink`] and encodes events into a
//! `Vec<u8>` as tagged little-endian records. [`decode`] reads them back as
//! an iterator of [`RecordedEvent`].

use pacer_core::animation::{AnimationId, FrameKind};
use pacer_core::time::{Duration, HostTime};
use pacer_core::trace::{
    AnimationEndEvent, AnimationStartEvent, CatchUpEvent, CompactionEvent, EndReason,
    FallbackBatchEvent, FallbackTimerEvent, StepEvent, TraceSink,
};

// ---------------------------------------------------------------------------
// Event type discriminants
// ---------------------------------------------------------------------------

const TAG_ANIMATION_START: u8 = 1;
const TAG_STEP: u8 = 2;
const TAG_CATCH_UP: u8 = 3;
const TAG_ANIMATION_END: u8 = 4;
const TAG_COMPACTION: u8 = 5;
const TAG_TIMER_STARTED: u8 = 6;
const TAG_TIMER_IDLED: u8 = 7;
const TAG_FALLBACK_BATCH: u8 = 8;

// ---------------------------------------------------------------------------
// RecorderSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that encodes events into a compact binary buffer.
#[derive(Debug, Default)]
pub struct RecorderSink {
    buf: Vec<u8>,
}

impl RecorderSink {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a view of the recorded bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Consumes the recorder and returns the recorded bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    /// Discards everything recorded so far.
    pub fn clear(&mut self) {
        self.buf.clear();
    }

    // -- encoding helpers --------------------------------------------------

    fn write_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    fn write_u32(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_u64(&mut self, v: u64) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_f64(&mut self, v: f64) {
        self.write_u64(v.to_bits());
    }

    fn write_count(&mut self, v: usize) {
        self.write_u64(u64::try_from(v).unwrap_or(u64::MAX));
    }

    fn write_option_u64(&mut self, v: Option<u64>) {
        match v {
            Some(val) => {
                self.write_u8(1);
                self.write_u64(val);
            }
            None => {
                self.write_u8(0);
                self.write_u64(0);
            }
        }
    }

    fn write_kind(&mut self, kind: FrameKind) {
        self.write_u8(match kind {
            FrameKind::Real => 0,
            FrameKind::Virtual => 1,
        });
    }

    fn write_reason(&mut self, reason: EndReason) {
        self.write_u8(match reason {
            EndReason::Elapsed => 0,
            EndReason::StepFinished => 1,
            EndReason::Stopped => 2,
            EndReason::Rejected => 3,
        });
    }
}

impl TraceSink for RecorderSink {
    fn on_animation_start(&mut self, e: &AnimationStartEvent) {
        self.write_u8(TAG_ANIMATION_START);
        self.write_u64(e.id.get());
        self.write_u64(e.at.ticks());
        self.write_option_u64(e.duration.map(Duration::ticks));
    }

    fn on_step(&mut self, e: &StepEvent) {
        self.write_u8(TAG_STEP);
        self.write_u64(e.id.get());
        self.write_u64(e.at.ticks());
        self.write_f64(e.percent);
        self.write_f64(e.value);
        self.write_kind(e.kind);
    }

    fn on_catch_up(&mut self, e: &CatchUpEvent) {
        self.write_u8(TAG_CATCH_UP);
        self.write_u64(e.id.get());
        self.write_u64(e.at.ticks());
        self.write_u32(e.dropped_frames);
        self.write_u32(e.synthesized);
    }

    fn on_animation_end(&mut self, e: &AnimationEndEvent) {
        self.write_u8(TAG_ANIMATION_END);
        self.write_u64(e.id.get());
        self.write_u64(e.at.ticks());
        self.write_reason(e.reason);
        self.write_f64(e.effective_fps);
        self.write_u32(e.drop_count);
        self.write_u8(u8::from(e.finished));
    }

    fn on_compaction(&mut self, e: &CompactionEvent) {
        self.write_u8(TAG_COMPACTION);
        self.write_u64(e.trigger.get());
        self.write_count(e.removed);
        self.write_count(e.retained);
    }

    fn on_fallback_timer(&mut self, e: &FallbackTimerEvent) {
        match *e {
            FallbackTimerEvent::Started { period } => {
                self.write_u8(TAG_TIMER_STARTED);
                self.write_u64(period.ticks());
            }
            FallbackTimerEvent::Idled { at, idle_for } => {
                self.write_u8(TAG_TIMER_IDLED);
                self.write_u64(at.ticks());
                self.write_u64(idle_for.ticks());
            }
        }
    }

    fn on_fallback_batch(&mut self, e: &FallbackBatchEvent) {
        self.write_u8(TAG_FALLBACK_BATCH);
        self.write_u64(e.at.ticks());
        self.write_count(e.callbacks);
    }
}

// ---------------------------------------------------------------------------
// Decoder
// ---------------------------------------------------------------------------

/// A decoded event from a binary recording.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum RecordedEvent {
    /// An [`AnimationStartEvent`].
    AnimationStart(AnimationStartEvent),
    /// A [`StepEvent`].
    Step(StepEvent),
    /// A [`CatchUpEvent`].
    CatchUp(CatchUpEvent),
    /// An [`AnimationEndEvent`].
    AnimationEnd(AnimationEndEvent),
    /// A [`CompactionEvent`].
    Compaction(CompactionEvent),
    /// A [`FallbackTimerEvent`].
    FallbackTimer(FallbackTimerEvent),
    /// A [`FallbackBatchEvent`].
    FallbackBatch(FallbackBatchEvent),
}

/// Decodes a byte slice produced by [`RecorderSink`] into an iterator of
/// [`RecordedEvent`].
///
/// Iteration stops at the first truncated or unrecognized record.
pub fn decode(bytes: &[u8]) -> DecodeIter<'_> {
    DecodeIter {
        data: bytes,
        pos: 0,
    }
}

/// Iterator over decoded events.
#[derive(Debug)]
pub struct DecodeIter<'a> {
    data: &'a [u8],
    pos: usize,
}

impl DecodeIter<'_> {
    fn take<const N: usize>(&mut self) -> Option<[u8; N]> {
        let bytes = self.data.get(self.pos..self.pos + N)?.try_into().ok()?;
        self.pos += N;
        Some(bytes)
    }

    fn read_u8(&mut self) -> Option<u8> {
        self.take::<1>().map(|[v]| v)
    }

    fn read_u32(&mut self) -> Option<u32> {
        self.take().map(u32::from_le_bytes)
    }

    fn read_u64(&mut self) -> Option<u64> {
        self.take().map(u64::from_le_bytes)
    }

    fn read_f64(&mut self) -> Option<f64> {
        self.read_u64().map(f64::from_bits)
    }

    fn read_count(&mut self) -> Option<usize> {
        Some(usize::try_from(self.read_u64()?).unwrap_or(usize::MAX))
    }

    fn read_id(&mut self) -> Option<AnimationId> {
        AnimationId::from_raw(self.read_u64()?)
    }

    fn read_time(&mut self) -> Option<HostTime> {
        self.read_u64().map(HostTime)
    }

    fn read_duration(&mut self) -> Option<Duration> {
        self.read_u64().map(Duration)
    }

    fn read_option_u64(&mut self) -> Option<Option<u64>> {
        let present = self.read_u8()?;
        let val = self.read_u64()?;
        Some(if present != 0 { Some(val) } else { None })
    }

    fn read_kind(&mut self) -> Option<FrameKind> {
        Some(match self.read_u8()? {
            0 => FrameKind::Real,
            _ => FrameKind::Virtual,
        })
    }

    fn read_reason(&mut self) -> Option<EndReason> {
        Some(match self.read_u8()? {
            0 => EndReason::Elapsed,
            1 => EndReason::StepFinished,
            2 => EndReason::Stopped,
            _ => EndReason::Rejected,
        })
    }

    fn decode_animation_start(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::AnimationStart(AnimationStartEvent {
            id: self.read_id()?,
            at: self.read_time()?,
            duration: self.read_option_u64()?.map(Duration),
        }))
    }

    fn decode_step(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Step(StepEvent {
            id: self.read_id()?,
            at: self.read_time()?,
            percent: self.read_f64()?,
            value: self.read_f64()?,
            kind: self.read_kind()?,
        }))
    }

    fn decode_catch_up(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::CatchUp(CatchUpEvent {
            id: self.read_id()?,
            at: self.read_time()?,
            dropped_frames: self.read_u32()?,
            synthesized: self.read_u32()?,
        }))
    }

    fn decode_animation_end(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::AnimationEnd(AnimationEndEvent {
            id: self.read_id()?,
            at: self.read_time()?,
            reason: self.read_reason()?,
            effective_fps: self.read_f64()?,
            drop_count: self.read_u32()?,
            finished: self.read_u8()? != 0,
        }))
    }

    fn decode_compaction(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::Compaction(CompactionEvent {
            trigger: self.read_id()?,
            removed: self.read_count()?,
            retained: self.read_count()?,
        }))
    }

    fn decode_timer_started(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::FallbackTimer(FallbackTimerEvent::Started {
            period: self.read_duration()?,
        }))
    }

    fn decode_timer_idled(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::FallbackTimer(FallbackTimerEvent::Idled {
            at: self.read_time()?,
            idle_for: self.read_duration()?,
        }))
    }

    fn decode_fallback_batch(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::FallbackBatch(FallbackBatchEvent {
            at: self.read_time()?,
            callbacks: self.read_count()?,
        }))
    }
}

impl Iterator for DecodeIter<'_> {
    type Item = RecordedEvent;

    fn next(&mut self) -> Option<Self::Item> {
        let tag = self.read_u8()?;
        match tag {
            TAG_ANIMATION_START => self.decode_animation_start(),
            TAG_STEP => self.decode_step(),
            TAG_CATCH_UP => self.decode_catch_up(),
            TAG_ANIMATION_END => self.decode_animation_end(),
            TAG_COMPACTION => self.decode_compaction(),
            TAG_TIMER_STARTED => self.decode_timer_started(),
            TAG_TIMER_IDLED => self.decode_timer_idled(),
            TAG_FALLBACK_BATCH => self.decode_fallback_batch(),
            _ => None, // unknown tag → stop iteration
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
