// =============================================================================
// MACD — Moving Average Convergence Divergence
// =============================================================================
//
//   MACD line   = EMA(fast) - EMA(slow)
//   Signal line = EMA(signal) of the MACD line
//   Histogram   = MACD line - Signal line
//
// A positive histogram means the MACD line sits above its signal (bullish
// crossover state); negative means bearish. The MACD line exists from close
// index `slow - 1`, so one histogram value needs `slow + signal - 1` closes.
// =============================================================================

use serde::Serialize;

use crate::error::IndicatorError;
use crate::indicators::ema::calculate_ema_named;

pub const NAME: &str = "MACD";

/// Latest MACD components.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MacdResult {
    pub macd: f64,
    pub signal: f64,
    pub histogram: f64,
}

pub fn required_closes(slow: usize, signal: usize) -> usize {
    slow + signal.saturating_sub(1)
}

/// Compute the MACD components at the most recent close.
///
/// # Edge cases
/// - any period zero, or `fast >= slow` => `InvalidInput`
/// - `closes.len() < slow + signal - 1` => `InsufficientHistory`
pub fn calculate_macd(
    closes: &[f64],
    fast: usize,
    slow: usize,
    signal: usize,
) -> Result<MacdResult, IndicatorError> {
    if fast == 0 || slow == 0 || signal == 0 {
        return Err(IndicatorError::invalid("MACD periods must be at least 1"));
    }
    if fast >= slow {
        return Err(IndicatorError::invalid(format!(
            "MACD fast period ({fast}) must be shorter than slow period ({slow})"
        )));
    }
    IndicatorError::require(NAME, required_closes(slow, signal), closes.len())?;

    let ema_fast = calculate_ema_named(NAME, closes, fast)?;
    let ema_slow = calculate_ema_named(NAME, closes, slow)?;

    // Align both series on the close index where the slow EMA starts.
    let offset = slow - fast;
    let macd_line: Vec<f64> = ema_slow
        .iter()
        .zip(&ema_fast[offset..])
        .map(|(s, f)| f - s)
        .collect();

    let signal_line = calculate_ema_named(NAME, &macd_line, signal)?;

    let macd = macd_line[macd_line.len() - 1];
    let signal = signal_line[signal_line.len() - 1];

    Ok(MacdResult {
        macd,
        signal,
        histogram: macd - signal,
    })
}
