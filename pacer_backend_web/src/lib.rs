// Copyright 2026 the Pacer Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Browser host for pacer.
//!
//! This crate provides integration with browser APIs:
//!
//! - [`now`] / [`WebClock`]: `performance.now()` timestamps
//! - [`RafScheduler`]: native `requestAnimationFrame` scheduling
//! - [`WebInterval`]: `setInterval` timer behind the fallback scheduler
//! - [`frame_scheduler`]: picks one of the two from [`detect_refresh_signal`]
//!
//! ```rust,ignore
//! let runner = pacer_backend_web::runner(RunnerConfig::STANDARD);
//! runner.start(Animation::new(move |value, _, _| set_opacity(&el, value))
//!     .duration(Duration::from_millis(300)));
//! ```

#![no_std]

extern crate alloc;

mod interval;
mod raf;

pub use interval::WebInterval;
pub use raf::RafScheduler;

use alloc::rc::Rc;

use pacer_core::clock::Clock;
use pacer_core::config::{FallbackConfig, RunnerConfig};
use pacer_core::fallback::TimerFallbackScheduler;
use pacer_core::frame::{RefreshScheduler, RefreshSignal};
use pacer_core::runner::AnimationRunner;
use pacer_core::time::HostTime;
use pacer_core::trace::Tracer;

/// The browser's frame scheduler: native refresh or timer fallback.
pub type WebFrameScheduler = RefreshScheduler<RafScheduler, WebInterval>;

/// An animation runner on the browser's refresh signal.
pub type WebRunner = AnimationRunner<WebFrameScheduler, WebClock>;

/// Returns the current host time from `performance.now()`.
#[must_use]
pub fn now() -> HostTime {
    HostTime::from_millis_f64(raf::performance_now())
}

/// [`Clock`] reading `performance.now()`.
#[derive(Clone, Copy, Debug, Default)]
pub struct WebClock;

impl Clock for WebClock {
    #[inline]
    fn now(&self) -> HostTime {
        now()
    }
}

/// Reports whether the global object exposes a native refresh function.
///
/// Vendor-prefixed names are accepted. A function whose source is not the
/// engine's native stub is reported as [`RefreshSignal::Polyfilled`].
#[must_use]
pub fn detect_refresh_signal() -> RefreshSignal {
    match raf::find_request_frame() {
        Some(request) if raf::is_native_function(&request) => RefreshSignal::Native,
        Some(_) => RefreshSignal::Polyfilled,
        None => RefreshSignal::Missing,
    }
}

/// Creates a fallback scheduler driven by `setInterval`.
#[must_use]
pub fn timer_fallback(config: FallbackConfig) -> Rc<TimerFallbackScheduler<WebInterval>> {
    Rc::new_cyclic(|scheduler| {
        TimerFallbackScheduler::new(WebInterval::new(scheduler.clone()), config)
    })
}

/// Creates the frame scheduler for this browser.
#[must_use]
pub fn frame_scheduler(config: FallbackConfig) -> WebFrameScheduler {
    frame_scheduler_with_signal(detect_refresh_signal(), config)
}

/// Creates a frame scheduler for an explicit capability, e.g. to force the
/// timer fallback in tests that install a fake refresh function.
///
/// A native signal with no refresh function on the global object still falls
/// back to the timer.
#[must_use]
pub fn frame_scheduler_with_signal(
    signal: RefreshSignal,
    config: FallbackConfig,
) -> WebFrameScheduler {
    match raf::find_request_frame() {
        Some(request) => RefreshScheduler::select(
            signal,
            || RafScheduler::new(request),
            || timer_fallback(config),
        ),
        None => RefreshScheduler::Fallback(timer_fallback(config)),
    }
}

/// Creates a runner on this browser's frame scheduler.
#[must_use]
pub fn runner(config: RunnerConfig) -> WebRunner {
    AnimationRunner::with_config(
        frame_scheduler(FallbackConfig::SIXTY_HZ),
        WebClock,
        config,
        Tracer::none(),
    )
}
