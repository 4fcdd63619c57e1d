// =============================================================================
// Exponential Moving Average (EMA)
// =============================================================================
//
// Formula:
//   k     = 2 / (period + 1)
//   EMA_t = EMA_{t-1} + k * (close_t - EMA_{t-1})
//
// The very first EMA value is seeded with the SMA of the first `period` closes.
// Written in the incremental form so a flat input never drifts off its level.
// =============================================================================

use crate::error::IndicatorError;

pub const NAME: &str = "EMA";

/// Compute the EMA series for the given `closes` slice and look-back `period`.
///
/// Each output element corresponds to a close starting at index `period - 1`.
///
/// # Edge cases
/// - `period == 0` => `InvalidInput`
/// - `closes.len() < period` => `InsufficientHistory`
pub fn calculate_ema(closes: &[f64], period: usize) -> Result<Vec<f64>, IndicatorError> {
    calculate_ema_named(NAME, closes, period)
}

/// Same as [`calculate_ema`] but reports shortfalls under `indicator`, so
/// composite indicators (MACD) name themselves in the error.
pub(crate) fn calculate_ema_named(
    indicator: &'static str,
    closes: &[f64],
    period: usize,
) -> Result<Vec<f64>, IndicatorError> {
    if period == 0 {
        return Err(IndicatorError::invalid(format!(
            "{indicator} EMA period must be at least 1"
        )));
    }
    IndicatorError::require(indicator, period, closes.len())?;

    let k = 2.0 / (period + 1) as f64;

    let seed: f64 = closes[..period].iter().sum::<f64>() / period as f64;

    let mut result = Vec::with_capacity(closes.len() - period + 1);
    result.push(seed);

    let mut prev = seed;
    for &close in &closes[period..] {
        prev += k * (close - prev);
        result.push(prev);
    }

    Ok(result)
}

/// Most recent EMA value.
pub fn current_ema(closes: &[f64], period: usize) -> Result<f64, IndicatorError> {
    let series = calculate_ema(closes, period)?;
    Ok(series[series.len() - 1])
}
