// Copyright 2026 the Pacer Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Timestamp sources.
//!
//! The [`AnimationRunner`](crate::runner::AnimationRunner) reads a [`Clock`]
//! when an animation starts and again at every step. Host crates provide real
//! clocks (`performance.now()`, `std::time::Instant`); [`ManualClock`] is a
//! settable clock for simulations and tests.

use alloc::rc::Rc;
use core::cell::Cell;

use crate::time::{Duration, HostTime};

/// A monotonic timestamp source.
pub trait Clock {
    /// Returns the current host time.
    fn now(&self) -> HostTime;
}

impl<C: Clock + ?Sized> Clock for &C {
    #[inline]
    fn now(&self) -> HostTime {
        (**self).now()
    }
}

impl<C: Clock + ?Sized> Clock for Rc<C> {
    #[inline]
    fn now(&self) -> HostTime {
        (**self).now()
    }
}

/// A clock whose time only moves when told to.
///
/// Clones share the same underlying time, so a simulation can hand one clone
/// to a runner and keep another to advance.
#[derive(Clone, Debug, Default)]
pub struct ManualClock {
    now: Rc<Cell<HostTime>>,
}

impl ManualClock {
    /// Creates a clock reading `start`.
    #[must_use]
    pub fn new(start: HostTime) -> Self {
        Self {
            now: Rc::new(Cell::new(start)),
        }
    }

    /// Sets the current time.
    ///
    /// Moving backwards is allowed; consumers saturate elapsed-time
    /// computations at zero.
    pub fn set(&self, now: HostTime) {
        self.now.set(now);
    }

    /// Advances the current time by `by`, saturating at the end of the
    /// timeline.
    pub fn advance(&self, by: Duration) {
        let next = self.now.get().checked_add(by).unwrap_or(HostTime(u64::MAX));
        self.now.set(next);
    }
}

impl Clock for ManualClock {
    #[inline]
    fn now(&self) -> HostTime {
        self.now.get()
    }
}
