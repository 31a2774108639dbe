// Copyright 2026 the Pacer Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Native-process host for pacer.
//!
//! - [`StdClock`]: portable `Instant`-anchored clock
//! - [`MonotonicClock`] (Unix): `CLOCK_MONOTONIC` via `rustix`
//! - [`FrameLoop`]: sleeps the calling thread between fallback timer ticks
//!
//! ```rust,no_run
//! use pacer_backend_std::FrameLoop;
//! use pacer_core::animation::Animation;
//! use pacer_core::config::{FallbackConfig, RunnerConfig};
//! use pacer_core::time::Duration;
//! use pacer_core::trace::Tracer;
//!
//! let frame_loop = FrameLoop::new(FallbackConfig::SIXTY_HZ);
//! let runner = frame_loop.runner(RunnerConfig::STANDARD, Tracer::none());
//! runner.start(
//!     Animation::new(|value, _, _| println!("{value:.3}"))
//!         .duration(Duration::from_millis(250)),
//! );
//! frame_loop.run_until_idle();
//! ```

mod clock;
mod frame_loop;

#[cfg(unix)]
pub use clock::MonotonicClock;
pub use clock::StdClock;
pub use frame_loop::{FrameLoop, LoopRunner, LoopScheduler};
