// =============================================================================
// Breakout — latest close above the recent high
// =============================================================================
//
// breakout = close[-1] > max(close[-1 - lookback .. -1])
//
// The latest close is excluded from the window and the comparison is strict,
// so a flat market never breaks out.

use crate::error::IndicatorError;

pub const NAME: &str = "Breakout";

/// Default number of prior sessions the latest close is compared against.
pub const DEFAULT_LOOKBACK: usize = 9;

pub fn required_closes(lookback: usize) -> usize {
    lookback + 1
}

/// `true` iff the latest close strictly exceeds the maximum of the `lookback`
/// closes immediately before it.
pub fn is_breakout(closes: &[f64], lookback: usize) -> Result<bool, IndicatorError> {
    if lookback == 0 {
        return Err(IndicatorError::invalid("breakout lookback must be at least 1"));
    }
    IndicatorError::require(NAME, required_closes(lookback), closes.len())?;

    let last = closes.len() - 1;
    let prior_high = closes[last - lookback..last]
        .iter()
        .copied()
        .fold(f64::NEG_INFINITY, f64::max);

    Ok(closes[last] > prior_high)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_high_breaks_out() {
        let closes: Vec<f64> = (1..=10).map(|x| x as f64).collect();
        assert!(is_breakout(&closes, DEFAULT_LOOKBACK).unwrap());

        let mut closes: Vec<f64> = (1..=10).map(|x| x as f64).collect();
        closes.push(20.0);
        assert!(is_breakout(&closes, DEFAULT_LOOKBACK).unwrap());
    }

    #[test]
    fn equal_to_prior_high_is_not_a_breakout() {
        assert!(!is_breakout(&[5.0; 10], DEFAULT_LOOKBACK).unwrap());

        // Prior 9 sessions are 2..=10, so a repeated 10 only ties the high.
        let mut closes: Vec<f64> = (1..=10).map(|x| x as f64).collect();
        closes.push(10.0);
        assert!(!is_breakout(&closes, DEFAULT_LOOKBACK).unwrap());
    }

    #[test]
    fn old_high_outside_window_is_ignored() {
        // 100 sits 10 sessions back, just outside the 9-session window.
        let mut closes = vec![100.0];
        closes.extend(std::iter::repeat(10.0).take(9));
        closes.push(11.0);
        assert!(is_breakout(&closes, DEFAULT_LOOKBACK).unwrap());
    }

    #[test]
    fn requires_ten_closes() {
        assert_eq!(
            is_breakout(&[1.0; 9], DEFAULT_LOOKBACK).unwrap_err(),
            IndicatorError::InsufficientHistory {
                indicator: "Breakout",
                required: 10,
                available: 9,
            }
        );
    }
}
