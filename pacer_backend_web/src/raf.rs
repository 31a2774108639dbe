// Copyright 2026 the Pacer Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Native `requestAnimationFrame` scheduling.
//!
//! [`RafScheduler`] hands each [`FrameCallback`] to the browser's refresh
//! function as a one-shot JS closure. The callback receives the
//! [`DOMHighResTimeStamp`][mdn] (milliseconds on the `performance.now()`
//! timeline) converted to microsecond [`HostTime`] ticks.
//!
//! [mdn]: https://developer.mozilla.org/en-US/docs/Web/API/DOMHighResTimeStamp

use alloc::string::String;

use js_sys::{Function, Reflect};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use web_sys::Element;

use pacer_core::frame::{FrameCallback, FrameRequestId, FrameScheduler};
use pacer_core::time::HostTime;

// Direct global binding instead of `web_sys::Window::performance()`, so the
// clock works in workers too and never has to unwrap a missing Window.
#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = performance, js_name = "now")]
    pub(crate) fn performance_now() -> f64;
}

/// Refresh functions probed on the global object, in order.
const REQUEST_FRAME_NAMES: [&str; 4] = [
    "requestAnimationFrame",
    "webkitRequestAnimationFrame",
    "mozRequestAnimationFrame",
    "oRequestAnimationFrame",
];

/// Returns the first refresh function the global object exposes.
pub(crate) fn find_request_frame() -> Option<Function> {
    let global = js_sys::global();
    REQUEST_FRAME_NAMES.iter().find_map(|name| {
        Reflect::get(&global, &JsValue::from_str(name))
            .ok()
            .and_then(|value| value.dyn_into::<Function>().ok())
    })
}

/// Whether `function`'s source text is the engine's `[native code]` stub.
///
/// Test polyfills install a plain JS function under the same name; those
/// report their real source and are treated as non-native.
pub(crate) fn is_native_function(function: &Function) -> bool {
    is_native_source(&String::from(function.to_string()))
}

/// Matches `requestAnimationFrame() { [native code] }`, ignoring case and
/// whitespace around the braces.
pub(crate) fn is_native_source(source: &str) -> bool {
    const NAME: &str = "requestanimationframe()";
    let lower = source.to_ascii_lowercase();
    lower.match_indices(NAME).any(|(at, _)| {
        let rest = lower[at + NAME.len()..].trim_start();
        rest.strip_prefix('{')
            .map(str::trim_start)
            .and_then(|rest| rest.strip_prefix("[native code]"))
            .is_some_and(|rest| rest.trim_start().starts_with('}'))
    })
}

/// A [`FrameScheduler`] backed by the browser's native refresh signal.
///
/// The render root is passed through as the refresh function's second
/// argument, as legacy prefixed implementations accepted an element hint.
pub struct RafScheduler {
    request: Function,
    this: JsValue,
}

impl RafScheduler {
    /// Wraps a refresh function found on the global object.
    pub(crate) fn new(request: Function) -> Self {
        Self {
            request,
            this: js_sys::global().into(),
        }
    }
}

impl FrameScheduler for RafScheduler {
    type RenderRoot = Element;

    fn schedule_next_frame(
        &self,
        callback: FrameCallback,
        root: Option<&Element>,
    ) -> FrameRequestId {
        let closure = Closure::once_into_js(move |timestamp_ms: f64| {
            callback(HostTime::from_millis_f64(timestamp_ms));
        });
        let root = root.map_or(JsValue::UNDEFINED, |root| JsValue::from(root.clone()));

        #[expect(
            clippy::cast_possible_truncation,
            reason = "rAF handles are small positive integers"
        )]
        let id = self
            .request
            .call2(&self.this, &closure, &root)
            .ok()
            .and_then(|handle| handle.as_f64())
            .map_or(0, |handle| handle as u64);
        FrameRequestId(id)
    }
}

impl core::fmt::Debug for RafScheduler {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RafScheduler")
            .field("request", &String::from(self.request.name()))
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn native_stub_source_is_native() {
        assert!(is_native_source(
            "function requestAnimationFrame() { [native code] }"
        ));
        assert!(is_native_source(
            "function webkitRequestAnimationFrame() {\n    [native code]\n}"
        ));
        assert!(is_native_source(
            "FUNCTION REQUESTANIMATIONFRAME(){[NATIVE CODE]}"
        ));
    }

    #[test]
    fn polyfill_source_is_not_native() {
        assert!(!is_native_source(
            "function requestAnimationFrame(cb) { return setTimeout(cb, 16); }"
        ));
        assert!(!is_native_source("(cb) => setTimeout(cb, 16)"));
        assert!(!is_native_source("function raf() { [native code] }"));
    }
}
