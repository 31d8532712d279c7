#![forbid(unsafe_code)]

//! Motion math shared by the effects.
//!
//! Pure functions only: easing, counter interpolation, stagger delays,
//! parallax offsets, tilt angles, and the number formatting rules the page
//! styles expect.
//!
//! # Invariants
//!
//! 1. `ease_out_cubic(0) == 0`, `ease_out_cubic(1) == 1`, monotonic between.
//! 2. `progress` is clamped to `[0, 1]`; a zero duration is complete.
//! 3. `stagger_delay_ms(i, step, cap) == min(i, cap) × step`.
//! 4. `fixed2` never renders negative zero.

/// Cubic ease-out: fast start, gentle landing.
#[inline]
#[must_use]
pub fn ease_out_cubic(p: f64) -> f64 {
    let p = p.clamp(0.0, 1.0);
    1.0 - (1.0 - p).powi(3)
}

/// Fraction of `duration_ms` covered by `elapsed_ms`, clamped to `[0, 1]`.
#[inline]
#[must_use]
pub fn progress(elapsed_ms: f64, duration_ms: f64) -> f64 {
    if duration_ms <= 0.0 {
        return 1.0;
    }
    (elapsed_ms / duration_ms).clamp(0.0, 1.0)
}

/// Round half toward positive infinity (`Math.round` semantics).
#[inline]
#[must_use]
pub fn round_half_up(v: f64) -> f64 {
    (v + 0.5).floor()
}

/// Counter value at progress `p` when counting from zero to `end`.
#[must_use]
pub fn counter_value(end: f64, p: f64) -> f64 {
    round_half_up(end * ease_out_cubic(p))
}

/// Render a number the way script text interpolation would: integral values
/// without a fractional part, never `-0`.
#[must_use]
pub fn format_number(v: f64) -> String {
    if v == 0.0 {
        return "0".to_string();
    }
    if v.is_finite() && v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else {
        format!("{v}")
    }
}

/// Transition delay for the `index`-th member of a staggered group.
#[inline]
#[must_use]
pub fn stagger_delay_ms(index: usize, step_ms: u32, cap: usize) -> u32 {
    let steps = u32::try_from(index.min(cap)).unwrap_or(u32::MAX);
    steps.saturating_mul(step_ms)
}

/// CSS millisecond literal.
#[must_use]
pub fn css_ms(ms: u32) -> String {
    format!("{ms}ms")
}

/// Vertical parallax offset in pixels for an element whose top edge sits at
/// `top` in a viewport `viewport_height` tall.
#[must_use]
pub fn parallax_offset(top: f64, viewport_height: f64, speed: f64, scale_px: f64) -> f64 {
    let vh = if viewport_height > 0.0 {
        viewport_height
    } else {
        1.0
    };
    (top / vh - 0.5) * speed * scale_px
}

/// Tilt rotation `(rx, ry)` in degrees for a pointer at relative position
/// `(rel_x, rel_y)` inside the element.
#[must_use]
pub fn tilt_angles(rel_x: f64, rel_y: f64, max_deg: f64) -> (f64, f64) {
    ((0.5 - rel_y) * max_deg, (rel_x - 0.5) * max_deg)
}

/// Two-decimal fixed rendering.
#[must_use]
pub fn fixed2(v: f64) -> String {
    let s = format!("{v:.2}");
    if s == "-0.00" { "0.00".to_string() } else { s }
}

/// Parse an attribute as a number, falling back when it is absent, not a
/// number, or zero.
#[must_use]
pub fn parse_number_or(raw: Option<&str>, fallback: f64) -> f64 {
    match raw.map(str::trim).and_then(|s| s.parse::<f64>().ok()) {
        Some(v) if v.is_finite() && v != 0.0 => v,
        _ => fallback,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn easing_endpoints() {
        assert_eq!(ease_out_cubic(0.0), 0.0);
        assert_eq!(ease_out_cubic(1.0), 1.0);
        assert_eq!(ease_out_cubic(2.0), 1.0);
        assert!((ease_out_cubic(0.5) - 0.875).abs() < 1e-12);
    }

    #[test]
    fn progress_clamps() {
        assert_eq!(progress(-10.0, 900.0), 0.0);
        assert_eq!(progress(450.0, 900.0), 0.5);
        assert_eq!(progress(5000.0, 900.0), 1.0);
        assert_eq!(progress(0.0, 0.0), 1.0);
    }

    #[test]
    fn counter_reaches_end() {
        assert_eq!(counter_value(250.0, 0.0), 0.0);
        assert_eq!(counter_value(250.0, 1.0), 250.0);
        assert_eq!(counter_value(250.0, 0.5), 219.0);
    }

    #[test]
    fn rounding_matches_script_semantics() {
        assert_eq!(round_half_up(2.5), 3.0);
        assert_eq!(round_half_up(-2.5), -2.0);
        assert_eq!(round_half_up(-0.4), 0.0);
    }

    #[test]
    fn number_formatting() {
        assert_eq!(format_number(250.0), "250");
        assert_eq!(format_number(-0.0), "0");
        assert_eq!(format_number(-12.0), "-12");
        assert_eq!(format_number(4.5), "4.5");
    }

    #[test]
    fn stagger_caps_at_eight_steps() {
        assert_eq!(stagger_delay_ms(0, 70, 8), 0);
        assert_eq!(stagger_delay_ms(3, 70, 8), 210);
        assert_eq!(stagger_delay_ms(8, 70, 8), 560);
        assert_eq!(stagger_delay_ms(40, 70, 8), 560);
        assert_eq!(css_ms(560), "560ms");
    }

    #[test]
    fn parallax_centered_element_is_still() {
        assert_eq!(parallax_offset(400.0, 800.0, 0.15, 120.0), 0.0);
        assert!((parallax_offset(0.0, 800.0, 0.15, 120.0) + 9.0).abs() < 1e-9);
        // Zero viewport height falls back to 1px instead of dividing by zero.
        assert!(parallax_offset(10.0, 0.0, 0.15, 120.0).is_finite());
    }

    #[test]
    fn tilt_corners() {
        assert_eq!(tilt_angles(0.5, 0.5, 10.0), (0.0, 0.0));
        assert_eq!(tilt_angles(1.0, 0.0, 10.0), (5.0, 5.0));
        assert_eq!(tilt_angles(0.0, 1.0, 10.0), (-5.0, -5.0));
    }

    #[test]
    fn fixed2_drops_negative_zero() {
        assert_eq!(fixed2(-0.001), "0.00");
        assert_eq!(fixed2(-9.0), "-9.00");
        assert_eq!(fixed2(1.005_1), "1.01");
    }

    #[test]
    fn number_fallbacks() {
        assert_eq!(parse_number_or(None, 0.15), 0.15);
        assert_eq!(parse_number_or(Some(""), 0.15), 0.15);
        assert_eq!(parse_number_or(Some("abc"), 10.0), 10.0);
        assert_eq!(parse_number_or(Some("0"), 10.0), 10.0);
        assert_eq!(parse_number_or(Some(" 0.4 "), 0.15), 0.4);
    }

    proptest! {
        #[test]
        fn easing_is_monotonic(a in 0.0f64..1.0, b in 0.0f64..1.0) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(ease_out_cubic(lo) <= ease_out_cubic(hi));
        }

        #[test]
        fn counter_stays_between_zero_and_end(end in 0.0f64..1e6, p in 0.0f64..=1.0) {
            let v = counter_value(end, p);
            prop_assert!(v >= 0.0);
            prop_assert!(v <= round_half_up(end));
        }

        #[test]
        fn parallax_is_bounded_for_on_screen_elements(
            top in 0.0f64..800.0,
            speed in -1.0f64..1.0,
        ) {
            let y = parallax_offset(top, 800.0, speed, 120.0);
            prop_assert!(y.abs() <= 0.5 * speed.abs() * 120.0 + 1e-9);
        }
    }
}
