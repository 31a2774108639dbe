// Copyright 2026 the Pacer Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Host clocks for native processes.

use std::time::Instant;

use pacer_core::clock::Clock;
use pacer_core::time::HostTime;

/// Microseconds elapsed since the clock was created.
///
/// Portable; timestamps from different `StdClock`s are not comparable.
#[derive(Clone, Copy, Debug)]
pub struct StdClock {
    origin: Instant,
}

impl StdClock {
    /// Creates a clock reading zero now.
    #[must_use]
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for StdClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for StdClock {
    fn now(&self) -> HostTime {
        let micros = self.origin.elapsed().as_micros();
        HostTime(u64::try_from(micros).unwrap_or(u64::MAX))
    }
}

/// `CLOCK_MONOTONIC` in microseconds.
///
/// Shares its timeline with every other reader of the system monotonic
/// clock, so timestamps can be compared across processes.
#[cfg(unix)]
#[derive(Clone, Copy, Debug, Default)]
pub struct MonotonicClock;

#[cfg(unix)]
impl Clock for MonotonicClock {
    fn now(&self) -> HostTime {
        use rustix::time::{ClockId, clock_gettime};
        timespec_to_host_time(clock_gettime(ClockId::Monotonic))
    }
}

#[cfg(unix)]
fn timespec_to_host_time(timespec: rustix::time::Timespec) -> HostTime {
    const MICROS_PER_SECOND: u64 = 1_000_000;

    let seconds = u64::try_from(timespec.tv_sec).unwrap_or(0);
    let nanos = u64::try_from(timespec.tv_nsec)
        .unwrap_or(0)
        .min(999_999_999);
    HostTime(
        seconds
            .saturating_mul(MICROS_PER_SECOND)
            .saturating_add(nanos / 1_000),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn std_clock_starts_near_zero_and_advances() {
        let clock = StdClock::new();
        let first = clock.now();
        std::thread::sleep(std::time::Duration::from_millis(2));
        let second = clock.now();
        assert!(first.ticks() < 1_000_000, "fresh clock read {first:?}");
        assert!(second.saturating_duration_since(first).ticks() >= 2_000);
    }

    #[cfg(unix)]
    #[test]
    fn monotonic_clock_does_not_go_backwards() {
        let first = MonotonicClock.now();
        let second = MonotonicClock.now();
        assert!(second >= first);
    }

    #[cfg(unix)]
    #[test]
    fn timespec_converts_to_micros() {
        let timespec = rustix::time::Timespec {
            tv_sec: 3,
            tv_nsec: 250_999,
        };
        assert_eq!(timespec_to_host_time(timespec), HostTime(3_000_250));

        let negative = rustix::time::Timespec {
            tv_sec: -1,
            tv_nsec: 5_000,
        };
        assert_eq!(timespec_to_host_time(negative), HostTime(5));
    }
}
