//! Numeric helpers for prices and measurements.

/// Round half away from zero to `decimals` places.
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

/// Whether `value` is reachable from `origin` in whole multiples of `step`.
///
/// `tolerance` absorbs binary floating point noise (e.g. `0.1 + 0.2`).
pub fn on_step(value: f64, origin: f64, step: f64, tolerance: f64) -> bool {
    if step <= 0.0 {
        return true;
    }
    let remainder = (value - origin).rem_euclid(step);
    remainder <= tolerance || (step - remainder) <= tolerance
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn round_to_two_places() {
        assert_eq!(round_to(19.999, 2), 20.0);
        assert_eq!(round_to(2.345, 1), 2.3);
        assert_eq!(round_to(-1.005, 0), -1.0);
    }

    #[test]
    fn step_from_zero() {
        assert!(on_step(1.5, 0.0, 0.5, 0.001));
        assert!(!on_step(1.3, 0.0, 0.5, 0.001));
        assert!(on_step(0.30000000000000004, 0.0, 0.1, 0.001));
    }

    #[test]
    fn step_from_non_zero_origin() {
        assert!(on_step(350.0, 100.0, 50.0, 0.001));
        assert!(!on_step(325.0, 100.0, 50.0, 0.001));
    }

    proptest! {
        /// Property: whole multiples of the step from the origin always pass.
        #[test]
        fn multiples_are_on_step(origin in -100i32..100, k in 0u32..500, step_tenths in 1u32..50) {
            let step = step_tenths as f64 / 10.0;
            let value = origin as f64 + k as f64 * step;
            prop_assert!(on_step(value, origin as f64, step, 0.001));
        }

        /// Property: rounding is idempotent.
        #[test]
        fn rounding_is_idempotent(value in -1.0e6f64..1.0e6, decimals in 0u32..5) {
            let once = round_to(value, decimals);
            prop_assert_eq!(once, round_to(once, decimals));
        }
    }
}
