// Copyright 2026 the Pacer Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Easing curves for [`Animation::easing`](crate::animation::Animation::easing).
//!
//! Each curve maps a position in `[0, 1]` to an eased value with `f(0) == 0`
//! and `f(1) == 1`.

/// Identity curve.
#[inline]
#[must_use]
pub fn linear(pos: f64) -> f64 {
    pos
}

/// Decelerating cubic: `(pos - 1)³ + 1`.
#[inline]
#[must_use]
pub fn ease_out_cubic(pos: f64) -> f64 {
    cube(pos - 1.0) + 1.0
}

/// Cubic that accelerates through the first half and decelerates through the
/// second.
#[inline]
#[must_use]
pub fn ease_in_out_cubic(pos: f64) -> f64 {
    let scaled = pos * 2.0;
    if scaled < 1.0 {
        0.5 * cube(scaled)
    } else {
        0.5 * (cube(scaled - 2.0) + 2.0)
    }
}

#[inline]
fn cube(x: f64) -> f64 {
    x * x * x
}

#[cfg(test)]
mod tests {
    use super::*;

    const CURVES: [fn(f64) -> f64; 3] = [linear, ease_out_cubic, ease_in_out_cubic];

    #[test]
    fn curves_pin_endpoints() {
        for curve in CURVES {
            assert_eq!(curve(0.0), 0.0);
            assert_eq!(curve(1.0), 1.0);
        }
    }

    #[test]
    fn curves_are_monotonic() {
        for curve in CURVES {
            let mut prev = curve(0.0);
            for i in 1..=100 {
                let next = curve(f64::from(i) / 100.0);
                assert!(next >= prev);
                prev = next;
            }
        }
    }

    #[test]
    fn known_values() {
        assert_eq!(ease_out_cubic(0.5), 0.875);
        assert_eq!(ease_in_out_cubic(0.25), 0.0625);
        assert_eq!(ease_in_out_cubic(0.5), 0.5);
        assert_eq!(ease_in_out_cubic(0.75), 0.9375);
    }
}
