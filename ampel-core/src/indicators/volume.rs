//! Volume ratio and bar-over-bar returns.

use super::indicator::{check_input, IndicatorError};
use super::sma::rolling_mean;
use crate::domain::bar::volumes;
use crate::domain::Bar;

/// Rolling average volume over `window` bars, current bar included.
pub fn average_volume(bars: &[Bar], window: usize) -> Result<Vec<f64>, IndicatorError> {
    check_input(bars.len(), window)?;
    Ok(rolling_mean(&volumes(bars), window))
}

/// Current volume divided by the rolling average volume.
///
/// 1.0 means average volume. NaN during warm-up and where the average is zero.
pub fn volume_ratio(bars: &[Bar], window: usize) -> Result<Vec<f64>, IndicatorError> {
    let avg = average_volume(bars, window)?;
    Ok(bars
        .iter()
        .zip(avg)
        .map(|(bar, avg)| {
            if avg > 0.0 {
                bar.volume as f64 / avg
            } else {
                f64::NAN
            }
        })
        .collect())
}

/// Percent change between consecutive values. First entry is NaN.
pub fn pct_change(values: &[f64]) -> Result<Vec<f64>, IndicatorError> {
    check_input(values.len(), 1)?;
    let mut out = vec![f64::NAN; values.len()];
    for i in 1..values.len() {
        let prev = values[i - 1];
        if prev != 0.0 {
            out[i] = (values[i] - prev) / prev * 100.0;
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_bars, DEFAULT_EPSILON};

    #[test]
    fn volume_ratio_against_rolling_mean() {
        let mut bars = make_bars(&[1.0, 1.0, 1.0, 1.0]);
        for (bar, v) in bars.iter_mut().zip([100, 100, 100, 300]) {
            bar.volume = v;
        }
        let result = volume_ratio(&bars, 3).unwrap();
        assert!(result[0].is_nan());
        assert!(result[1].is_nan());
        assert_approx(result[2], 1.0, DEFAULT_EPSILON);
        // avg(100, 100, 300) = 500/3
        assert_approx(result[3], 300.0 / (500.0 / 3.0), DEFAULT_EPSILON);
    }

    #[test]
    fn volume_ratio_zero_average_is_nan() {
        let mut bars = make_bars(&[1.0, 1.0]);
        bars.iter_mut().for_each(|b| b.volume = 0);
        let result = volume_ratio(&bars, 2).unwrap();
        assert!(result[1].is_nan());
    }

    #[test]
    fn pct_change_known_values() {
        let result = pct_change(&[100.0, 101.0, 99.99]).unwrap();
        assert!(result[0].is_nan());
        assert_approx(result[1], 1.0, 1e-9);
        assert_approx(result[2], -1.0, 1e-9);
    }

    #[test]
    fn empty_inputs_error() {
        assert_eq!(pct_change(&[]), Err(IndicatorError::InsufficientData));
        assert_eq!(volume_ratio(&[], 20), Err(IndicatorError::InsufficientData));
    }
}
