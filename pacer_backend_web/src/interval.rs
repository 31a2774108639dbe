// Copyright 2026 the Pacer Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! `setInterval` timer for the fallback scheduler.

use alloc::rc::Weak;

use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;

use pacer_core::fallback::{IntervalTimer, TimerFallbackScheduler};
use pacer_core::time::Duration;

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_name = "setInterval")]
    fn set_interval(handler: &JsValue, timeout_ms: f64) -> i32;

    #[wasm_bindgen(js_name = "clearInterval")]
    fn clear_interval(handle: i32);
}

/// An [`IntervalTimer`] that forwards `setInterval` ticks to the
/// [`TimerFallbackScheduler`] owning it.
///
/// The JS closure is created on the first start and kept for the timer's
/// lifetime: stopping only clears the interval, because the scheduler stops
/// its timer from inside a tick.
pub struct WebInterval {
    scheduler: Weak<TimerFallbackScheduler<Self>>,
    tick: Option<Closure<dyn FnMut()>>,
    handle: Option<i32>,
}

impl WebInterval {
    /// Creates a stopped timer that ticks `scheduler` once started.
    ///
    /// Build the scheduler with [`Rc::new_cyclic`](alloc::rc::Rc::new_cyclic)
    /// to obtain the back-reference.
    #[must_use]
    pub fn new(scheduler: Weak<TimerFallbackScheduler<Self>>) -> Self {
        Self {
            scheduler,
            tick: None,
            handle: None,
        }
    }

    /// Whether an interval is currently registered.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.handle.is_some()
    }
}

impl IntervalTimer for WebInterval {
    fn start(&mut self, period: Duration) {
        if self.handle.is_some() {
            return;
        }
        let tick = self.tick.get_or_insert_with(|| {
            let scheduler = self.scheduler.clone();
            Closure::new(move || {
                if let Some(scheduler) = scheduler.upgrade() {
                    scheduler.on_timer_tick(crate::now());
                }
            })
        });
        self.handle = Some(set_interval(tick.as_ref(), period.as_millis_f64()));
    }

    fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            clear_interval(handle);
        }
    }
}

impl Drop for WebInterval {
    fn drop(&mut self) {
        self.stop();
    }
}

impl core::fmt::Debug for WebInterval {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("WebInterval")
            .field("handle", &self.handle)
            .finish_non_exhaustive()
    }
}
