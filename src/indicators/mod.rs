// =============================================================================
// Technical Indicators Module
// =============================================================================
//
// Pure, side-effect-free implementations of the indicators shown on the
// dashboard. Every public function returns `Result<_, IndicatorError>` so a
// short series surfaces as `InsufficientHistory` naming the indicator instead
// of an empty or NaN value. Closes are oldest-first.

pub mod breakout;
pub mod ema;
pub mod macd;
pub mod rsi;
pub mod sma;

use crate::error::IndicatorError;

pub use macd::MacdResult;

/// A provider of standard technical indicators over a close-price series.
///
/// Each method evaluates at the most recent close. Implementations may be
/// hand-rolled or wrap a library; the calculator only relies on this surface.
pub trait TechnicalIndicators: Send + Sync {
    fn rsi(&self, closes: &[f64], period: usize) -> Result<f64, IndicatorError>;

    fn macd(
        &self,
        closes: &[f64],
        fast: usize,
        slow: usize,
        signal: usize,
    ) -> Result<MacdResult, IndicatorError>;

    fn sma(&self, closes: &[f64], period: usize) -> Result<f64, IndicatorError>;

    fn ema(&self, closes: &[f64], period: usize) -> Result<f64, IndicatorError>;
}

/// The in-crate implementations: Wilder RSI, SMA-seeded EMA/MACD.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardIndicators;

impl TechnicalIndicators for StandardIndicators {
    fn rsi(&self, closes: &[f64], period: usize) -> Result<f64, IndicatorError> {
        rsi::current_rsi(closes, period)
    }

    fn macd(
        &self,
        closes: &[f64],
        fast: usize,
        slow: usize,
        signal: usize,
    ) -> Result<MacdResult, IndicatorError> {
        macd::calculate_macd(closes, fast, slow, signal)
    }

    fn sma(&self, closes: &[f64], period: usize) -> Result<f64, IndicatorError> {
        sma::current_sma(closes, period)
    }

    fn ema(&self, closes: &[f64], period: usize) -> Result<f64, IndicatorError> {
        ema::current_ema(closes, period)
    }
}
