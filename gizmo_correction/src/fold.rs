//! Periodic folding of normal and radial handle deltas.
//!
//! Rotating the target prograde vector by a handle delta equal to four times
//! its magnitude amounts to two complete direction reversals, so raw deltas
//! are folded into one period before being turned into an angle.

/// Folds `delta` into `[-2 * magnitude, 2 * magnitude]` with period
/// `4 * magnitude`.
///
/// `magnitude` must be strictly positive.
pub fn fold_delta(delta: f64, magnitude: f64) -> f64 {
    let period = 4.0 * magnitude;
    let half = 2.0 * magnitude;
    let remainder = delta % period;

    if remainder > half {
        remainder - period
    } else if remainder < -half {
        remainder + period
    } else {
        remainder
    }
}

/// Sine of half the correction angle, always within `[-1, 1]`.
pub fn half_angle_sine(delta: f64, magnitude: f64) -> f64 {
    (fold_delta(delta, magnitude) / (2.0 * magnitude)).clamp(-1.0, 1.0)
}

/// Angle the target vector rotates by for a folded handle delta.
pub fn rotation_angle(delta: f64, magnitude: f64) -> f64 {
    2.0 * half_angle_sine(delta, magnitude).asin()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use std::f64::consts::PI;

    #[test]
    fn test_small_delta_is_unchanged() {
        assert_eq!(fold_delta(12.5, 100.0), 12.5);
        assert_eq!(fold_delta(-12.5, 100.0), -12.5);
    }

    #[test]
    fn test_full_period_folds_to_zero() {
        assert_abs_diff_eq!(fold_delta(400.0, 100.0), 0.0);
        assert_abs_diff_eq!(fold_delta(-400.0, 100.0), 0.0);
        assert_abs_diff_eq!(fold_delta(4_000.0, 100.0), 0.0);
    }

    #[test]
    fn test_beyond_half_period_wraps_negative() {
        assert_relative_eq!(fold_delta(250.0, 100.0), -150.0);
        assert_relative_eq!(fold_delta(-250.0, 100.0), 150.0);
    }

    #[test]
    fn test_half_period_is_a_reversal() {
        assert_relative_eq!(fold_delta(200.0, 100.0), 200.0);
        assert_relative_eq!(rotation_angle(200.0, 100.0), PI);
    }

    #[test]
    fn test_sine_bound_holds_for_huge_deltas() {
        let magnitude = 7_000.0;
        for multiple in [0.5, 1.0, 1.999, 2.0, 2.001, 3.7, 17.0, 1.0e3, 1.0e6, 1.0e9] {
            for sign in [1.0, -1.0] {
                let delta = sign * multiple * 4.0 * magnitude + 0.123 * sign;
                let sine = half_angle_sine(delta, magnitude);
                assert!((-1.0..=1.0).contains(&sine), "sine {} for delta {}", sine, delta);
                assert!(rotation_angle(delta, magnitude).is_finite());
            }
        }
    }

    #[test]
    fn test_angle_is_odd_in_delta() {
        let magnitude = 50.0;
        for delta in [1.0, 10.0, 60.0, 99.0, 180.0] {
            assert_relative_eq!(
                rotation_angle(delta, magnitude),
                -rotation_angle(-delta, magnitude),
                epsilon = 1e-12
            );
        }
    }
}
