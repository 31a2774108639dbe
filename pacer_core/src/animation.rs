// Copyright 2026 the Pacer Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Animation descriptions and the callback contracts of a run.
//!
//! An [`Animation`] bundles the caller-supplied callbacks and options that
//! [`AnimationRunner::start`](crate::runner::AnimationRunner::start) consumes:
//!
//! - a **step** callback, invoked once per frame with the eased progress
//!   value, the frame timestamp and a [`FrameKind`];
//! - an optional **verify** callback consulted before every step;
//! - an optional **completion** callback, invoked exactly once with a
//!   [`Completion`] when the run ends;
//! - an optional **duration** (absent means the step or verify callback
//!   decides when to stop);
//! - an optional **easing** function applied to the raw percent;
//! - an optional **render root** forwarded to the frame scheduler.

use alloc::boxed::Box;
use core::fmt;
use core::num::NonZeroU64;

use crate::time::{Duration, HostTime};

/// Handle identifying one animation run.
///
/// Handles are issued by a runner starting at `1`, strictly increasing, and
/// never reused.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AnimationId(NonZeroU64);

impl AnimationId {
    /// The first handle a runner issues.
    pub(crate) const fn first() -> Self {
        Self(NonZeroU64::MIN)
    }

    /// The handle issued after this one.
    pub(crate) const fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }

    /// Returns the raw handle value (always `>= 1`).
    #[inline]
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0.get()
    }

    /// Reconstructs a handle from its raw value, or `None` for `0`.
    #[inline]
    #[must_use]
    pub const fn from_raw(raw: u64) -> Option<Self> {
        match NonZeroU64::new(raw) {
            Some(n) => Some(Self(n)),
            None => None,
        }
    }
}

impl fmt::Debug for AnimationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AnimationId({})", self.0)
    }
}

impl fmt::Display for AnimationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Whether a step renders or only brings bookkeeping up to date.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FrameKind {
    /// A step invoked in response to a scheduled frame.
    Real,
    /// A synthetic catch-up step standing in for a frame the host skipped.
    ///
    /// Virtual steps never reschedule and their step-callback result is
    /// ignored.
    Virtual,
}

impl FrameKind {
    /// Returns `true` for [`FrameKind::Real`].
    #[inline]
    #[must_use]
    pub const fn is_real(self) -> bool {
        matches!(self, Self::Real)
    }
}

/// What a step callback asks the runner to do next.
///
/// Step callbacks may return `()` or `bool` as well; both convert into this
/// type (`()` and `true` continue, `false` finishes).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum StepOutcome {
    /// Keep running.
    #[default]
    Continue,
    /// Stop after this step. Only honored on real frames.
    Finish,
}

impl From<()> for StepOutcome {
    #[inline]
    fn from((): ()) -> Self {
        Self::Continue
    }
}

impl From<bool> for StepOutcome {
    #[inline]
    fn from(keep_going: bool) -> Self {
        if keep_going {
            Self::Continue
        } else {
            Self::Finish
        }
    }
}

/// Report passed to the completion callback.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Completion {
    /// Desired frame rate reduced by the rate of virtual catch-up steps:
    /// `desired_fps - drop_count / elapsed_seconds`.
    pub effective_fps: f64,
    /// The run that completed.
    pub id: AnimationId,
    /// `true` when the run ended on its own: the duration elapsed, or an
    /// open-ended run was finished by its step callback. `false` when it was
    /// stopped or rejected by its verify callback.
    pub finished: bool,
}

pub(crate) type StepFn = Box<dyn FnMut(f64, HostTime, FrameKind) -> StepOutcome>;
pub(crate) type VerifyFn = Box<dyn FnMut(AnimationId) -> bool>;
pub(crate) type CompleteFn = Box<dyn FnOnce(Completion)>;
pub(crate) type EasingFn = Box<dyn Fn(f64) -> f64>;

/// Description of an animation run, consumed by
/// [`AnimationRunner::start`](crate::runner::AnimationRunner::start).
///
/// `R` is the scheduler's render-root hint type.
///
/// ```rust,ignore
/// let id = runner.start(
///     Animation::new(move |value, _now, _kind| target.set_opacity(value))
///         .duration(Duration::from_millis(250))
///         .easing(easing::ease_out_cubic)
///         .on_complete(|done| log_fps(done.effective_fps)),
/// );
/// ```
pub struct Animation<R = ()> {
    pub(crate) step: StepFn,
    pub(crate) verify: Option<VerifyFn>,
    pub(crate) completed: Option<CompleteFn>,
    pub(crate) duration: Option<Duration>,
    pub(crate) easing: Option<EasingFn>,
    pub(crate) root: Option<R>,
}

impl<R> Animation<R> {
    /// Creates an open-ended animation driven by `step`.
    pub fn new<F, O>(mut step: F) -> Self
    where
        F: FnMut(f64, HostTime, FrameKind) -> O + 'static,
        O: Into<StepOutcome>,
    {
        Self {
            step: Box::new(move |value, now, kind| step(value, now, kind).into()),
            verify: None,
            completed: None,
            duration: None,
            easing: None,
            root: None,
        }
    }

    /// Sets a callback consulted before each step; returning `false` stops
    /// the run before the step executes.
    #[must_use]
    pub fn verify(mut self, verify: impl FnMut(AnimationId) -> bool + 'static) -> Self {
        self.verify = Some(Box::new(verify));
        self
    }

    /// Sets the callback invoked once when the run ends.
    #[must_use]
    pub fn on_complete(mut self, completed: impl FnOnce(Completion) + 'static) -> Self {
        self.completed = Some(Box::new(completed));
        self
    }

    /// Bounds the run to `duration`; percent then follows elapsed time.
    #[must_use]
    pub fn duration(mut self, duration: Duration) -> Self {
        self.duration = Some(duration);
        self
    }

    /// Sets the easing function applied to the raw percent.
    #[must_use]
    pub fn easing(mut self, easing: impl Fn(f64) -> f64 + 'static) -> Self {
        self.easing = Some(Box::new(easing));
        self
    }

    /// Sets the render-root hint forwarded to the frame scheduler.
    #[must_use]
    pub fn root(mut self, root: R) -> Self {
        self.root = Some(root);
        self
    }
}

impl<R> fmt::Debug for Animation<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Animation")
            .field("duration", &self.duration)
            .field("has_verify", &self.verify.is_some())
            .field("has_completed", &self.completed.is_some())
            .field("has_easing", &self.easing.is_some())
            .field("has_root", &self.root.is_some())
            .finish_non_exhaustive()
    }
}
