// =============================================================================
// Simple Moving Average (SMA)
// =============================================================================

use crate::error::IndicatorError;

pub const NAME: &str = "SMA";

/// Arithmetic mean of the last `period` closes.
pub fn current_sma(closes: &[f64], period: usize) -> Result<f64, IndicatorError> {
    if period == 0 {
        return Err(IndicatorError::invalid("SMA period must be at least 1"));
    }
    IndicatorError::require(NAME, period, closes.len())?;

    let window = &closes[closes.len() - period..];
    Ok(window.iter().sum::<f64>() / period as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sma_uses_trailing_window() {
        let closes: Vec<f64> = (1..=25).map(|x| x as f64).collect();
        // Mean of 6..=25.
        assert!((current_sma(&closes, 20).unwrap() - 15.5).abs() < 1e-10);
    }

    #[test]
    fn sma_constant_series_is_exact() {
        let closes = vec![250.25; 20];
        assert_eq!(current_sma(&closes, 20).unwrap(), 250.25);
    }

    #[test]
    fn sma_short_series_names_lengths() {
        let closes = vec![1.0; 14];
        assert_eq!(
            current_sma(&closes, 20).unwrap_err(),
            IndicatorError::InsufficientHistory {
                indicator: "SMA",
                required: 20,
                available: 14,
            }
        );
    }

    #[test]
    fn sma_period_zero() {
        assert!(current_sma(&[1.0], 0).is_err());
    }
}
