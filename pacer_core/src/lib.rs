// Copyright 2026 the Pacer Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Frame-paced animation runs with dropped-frame catch-up.
//!
//! `pacer_core` drives many concurrent animations from a host's display
//! refresh signal. It is `no_std` compatible (with `alloc`), single-threaded,
//! and platform-agnostic: hosts supply a [`Clock`](clock::Clock) and a
//! [`FrameScheduler`](frame::FrameScheduler), and the runner does the rest.
//!
//! # Architecture
//!
//! ```text
//!   AnimationRunner::start(Animation) ──► AnimationId
//!          │
//!          ▼
//!   FrameScheduler::schedule_next_frame
//!          │                 │
//!          │   native        │   no native signal
//!          ▼                 ▼
//!   host refresh      TimerFallbackScheduler ◄── IntervalTimer ticks
//!          │                 │
//!          └────────┬────────┘
//!                   ▼
//!   per-frame step: verify ─► catch-up (virtual) ─► real step
//!                   │
//!                   ▼
//!   Completion { effective_fps, id, finished }
//! ```
//!
//! **[`runner`]**: [`AnimationRunner`](runner::AnimationRunner) issues
//! handles, drives the per-frame step loop, synthesizes catch-up steps for
//! dropped frames, and reports an effective frame rate on completion.
//!
//! **[`animation`]**: the [`Animation`](animation::Animation) builder and
//! the callback contracts (step, verify, completion, easing).
//!
//! **[`frame`]**: the [`FrameScheduler`](frame::FrameScheduler) trait and
//! [`RefreshScheduler`](frame::RefreshScheduler), which picks the native
//! signal or the timer fallback once per host.
//!
//! **[`fallback`]**: [`TimerFallbackScheduler`](fallback::TimerFallbackScheduler),
//! a batched, lazily started, self-idling recurring-timer scheduler.
//!
//! **[`clock`]** and **[`time`]**: monotonic timestamps in microseconds.
//!
//! **[`easing`]**: stock easing curves.
//!
//! **[`config`]**: runner and fallback tuning.
//!
//! **[`trace`]**: [`TraceSink`](trace::TraceSink) trait and event types for
//! run-lifecycle instrumentation, behind a zero-overhead
//! [`Tracer`](trace::Tracer) wrapper.
//!
//! # Crate features
//!
//! - `trace` (disabled by default): Enables `Tracer` method bodies (one branch
//!   per call site).

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

pub mod animation;
pub mod clock;
pub mod config;
pub mod easing;
pub mod fallback;
pub mod frame;
mod registry;
pub mod runner;
pub mod time;
pub mod trace;
