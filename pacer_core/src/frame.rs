// Copyright 2026 the Pacer Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Next-refresh callback scheduling.
//!
//! A [`FrameScheduler`] invokes a one-shot [`FrameCallback`] at the host's
//! next display refresh, passing the refresh timestamp. Hosts either expose a
//! native "next repaint" signal (e.g. `requestAnimationFrame`) or only a
//! recurring timer; [`RefreshScheduler`] selects between the two once, from a
//! host-reported [`RefreshSignal`].

use alloc::boxed::Box;
use alloc::rc::Rc;

use crate::fallback::{IntervalTimer, TimerFallbackScheduler};
use crate::time::HostTime;

/// A callback to run once at the next refresh, given the refresh timestamp.
pub type FrameCallback = Box<dyn FnOnce(HostTime)>;

/// Identifier returned for a scheduled [`FrameCallback`].
///
/// Unique among currently pending callbacks of one scheduler; not guaranteed
/// unique across the scheduler's lifetime.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FrameRequestId(pub u64);

/// Schedules callbacks for the next display refresh.
///
/// Implementations invoke each callback asynchronously, at most once, on the
/// host's serialized callback queue. They never invoke it synchronously from
/// [`schedule_next_frame`](Self::schedule_next_frame).
pub trait FrameScheduler {
    /// Opaque rendering-context hint forwarded to native refresh signals.
    type RenderRoot;

    /// Requests that `callback` run at the next refresh.
    fn schedule_next_frame(
        &self,
        callback: FrameCallback,
        root: Option<&Self::RenderRoot>,
    ) -> FrameRequestId;
}

impl<S: FrameScheduler + ?Sized> FrameScheduler for Rc<S> {
    type RenderRoot = S::RenderRoot;

    #[inline]
    fn schedule_next_frame(
        &self,
        callback: FrameCallback,
        root: Option<&Self::RenderRoot>,
    ) -> FrameRequestId {
        (**self).schedule_next_frame(callback, root)
    }
}

/// What the host reports about its native refresh signal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RefreshSignal {
    /// A genuine platform refresh signal is available.
    Native,
    /// A refresh signal exists but is a non-native stand-in (e.g. a testing
    /// polyfill). Treated like [`Missing`](Self::Missing).
    Polyfilled,
    /// No refresh signal is available.
    Missing,
}

impl RefreshSignal {
    /// Returns `true` only for a genuine native signal.
    #[inline]
    #[must_use]
    pub const fn is_native(self) -> bool {
        matches!(self, Self::Native)
    }
}

/// A frame scheduler that is either native or timer-driven, chosen once.
///
/// The fallback arm is reference-counted because hosts wire their recurring
/// timer back into the scheduler it belongs to.
pub enum RefreshScheduler<N, T> {
    /// Delegates to the host's native refresh signal.
    Native(N),
    /// Simulates a fixed refresh cadence with a recurring timer.
    Fallback(Rc<TimerFallbackScheduler<T>>),
}

impl<N, T> RefreshScheduler<N, T> {
    /// Picks the native scheduler if `signal` is native, the fallback
    /// otherwise. Only the chosen constructor runs.
    pub fn select(
        signal: RefreshSignal,
        native: impl FnOnce() -> N,
        fallback: impl FnOnce() -> Rc<TimerFallbackScheduler<T>>,
    ) -> Self {
        if signal.is_native() {
            Self::Native(native())
        } else {
            Self::Fallback(fallback())
        }
    }

    /// Returns `true` if the native arm was selected.
    #[inline]
    #[must_use]
    pub const fn is_native(&self) -> bool {
        matches!(self, Self::Native(_))
    }
}

impl<N, T> FrameScheduler for RefreshScheduler<N, T>
where
    N: FrameScheduler,
    T: IntervalTimer,
{
    type RenderRoot = N::RenderRoot;

    fn schedule_next_frame(
        &self,
        callback: FrameCallback,
        root: Option<&Self::RenderRoot>,
    ) -> FrameRequestId {
        match self {
            Self::Native(native) => native.schedule_next_frame(callback, root),
            // The timer cadence has no use for a render root.
            Self::Fallback(fallback) => fallback.request(callback),
        }
    }
}

impl<N: core::fmt::Debug, T> core::fmt::Debug for RefreshScheduler<N, T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Native(native) => f.debug_tuple("Native").field(native).finish(),
            Self::Fallback(fallback) => f.debug_tuple("Fallback").field(fallback).finish(),
        }
    }
}
