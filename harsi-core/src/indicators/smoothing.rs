//! Fixed-weight exponential smoothing of the zero-centered RSI.
//!
//! smoothed[i] = (smoothed[i-1] + zrsi[i]) / 2 when smoothed[i-1] is defined,
//! otherwise smoothed[i] = zrsi[i]. Warm-up NaN therefore passes straight
//! through until the first defined input, where the recursion seeds itself.

/// Smooth a zero-centered RSI series with weight 0.5.
pub fn smooth_rsi(zrsi: &[f64]) -> Vec<f64> {
    zrsi.iter()
        .scan(f64::NAN, |prev, &value| {
            let next = if prev.is_nan() {
                value
            } else {
                (*prev + value) / 2.0
            };
            *prev = next;
            Some(next)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, DEFAULT_EPSILON};

    #[test]
    fn constant_input_is_a_fixed_point() {
        let result = smooth_rsi(&[12.5; 8]);
        for v in result {
            assert_approx(v, 12.5, DEFAULT_EPSILON);
        }
    }

    #[test]
    fn warmup_nan_passes_through_then_seeds() {
        let result = smooth_rsi(&[f64::NAN, f64::NAN, 10.0, 20.0, 0.0]);
        assert!(result[0].is_nan());
        assert!(result[1].is_nan());
        assert_approx(result[2], 10.0, DEFAULT_EPSILON);
        assert_approx(result[3], 15.0, DEFAULT_EPSILON);
        assert_approx(result[4], 7.5, DEFAULT_EPSILON);
    }

    #[test]
    fn gap_in_input_resets_the_recursion() {
        let result = smooth_rsi(&[10.0, f64::NAN, 30.0, 10.0]);
        assert_approx(result[0], 10.0, DEFAULT_EPSILON);
        assert!(result[1].is_nan());
        assert_approx(result[2], 30.0, DEFAULT_EPSILON);
        assert_approx(result[3], 20.0, DEFAULT_EPSILON);
    }

    #[test]
    fn empty_input() {
        assert!(smooth_rsi(&[]).is_empty());
    }
}
