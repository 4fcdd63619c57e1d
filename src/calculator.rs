// =============================================================================
// Indicator Calculator — one PriceSeries in, one dashboard row out
// =============================================================================
//
// Evaluates RSI, MACD histogram, SMA, EMA and the breakout flag at the latest
// close, then attaches the Gann levels of the latest price. The first failing
// indicator aborts the row; nothing is partially suppressed here.
//
// `compute` returns unrounded values for composition; `compute_row` rounds
// every numeric field to 2 decimals for display.
// =============================================================================

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::IndicatorError;
use crate::gann::GannLevelSet;
use crate::indicators::{breakout, macd, rsi, MacdResult, StandardIndicators, TechnicalIndicators};
use crate::types::{round2, IndicatorRow, PriceSeries};

// =============================================================================
// Default-value helpers (required by serde `default = "..."` attribute)
// =============================================================================

fn default_rsi_period() -> usize {
    14
}

fn default_macd_fast() -> usize {
    12
}

fn default_macd_slow() -> usize {
    26
}

fn default_macd_signal() -> usize {
    9
}

fn default_ma_period() -> usize {
    20
}

fn default_breakout_lookback() -> usize {
    breakout::DEFAULT_LOOKBACK
}

// =============================================================================
// IndicatorParams
// =============================================================================

/// Look-back windows for every indicator on the row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndicatorParams {
    #[serde(default = "default_rsi_period")]
    pub rsi_period: usize,

    #[serde(default = "default_macd_fast")]
    pub macd_fast: usize,

    #[serde(default = "default_macd_slow")]
    pub macd_slow: usize,

    #[serde(default = "default_macd_signal")]
    pub macd_signal: usize,

    #[serde(default = "default_ma_period")]
    pub sma_period: usize,

    #[serde(default = "default_ma_period")]
    pub ema_period: usize,

    /// Prior sessions the latest close must beat.
    #[serde(default = "default_breakout_lookback")]
    pub breakout_lookback: usize,
}

impl Default for IndicatorParams {
    fn default() -> Self {
        Self {
            rsi_period: default_rsi_period(),
            macd_fast: default_macd_fast(),
            macd_slow: default_macd_slow(),
            macd_signal: default_macd_signal(),
            sma_period: default_ma_period(),
            ema_period: default_ma_period(),
            breakout_lookback: default_breakout_lookback(),
        }
    }
}

// =============================================================================
// IndicatorValues
// =============================================================================

/// Unrounded indicator values at the latest close.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndicatorValues {
    pub date: NaiveDate,
    pub price: f64,
    pub rsi: f64,
    pub macd: MacdResult,
    pub sma: f64,
    pub ema: f64,
    pub breakout: bool,
}

// =============================================================================
// IndicatorCalculator
// =============================================================================

/// Stateless calculator; safe to share across tasks and reuse across runs.
#[derive(Debug, Clone)]
pub struct IndicatorCalculator<I = StandardIndicators> {
    params: IndicatorParams,
    indicators: I,
}

impl IndicatorCalculator<StandardIndicators> {
    pub fn new(params: IndicatorParams) -> Self {
        Self::with_indicators(params, StandardIndicators)
    }
}

impl Default for IndicatorCalculator<StandardIndicators> {
    fn default() -> Self {
        Self::new(IndicatorParams::default())
    }
}

impl<I: TechnicalIndicators> IndicatorCalculator<I> {
    pub fn with_indicators(params: IndicatorParams, indicators: I) -> Self {
        Self { params, indicators }
    }

    /// Closes needed for every indicator on the row to produce a value.
    pub fn required_history(&self) -> usize {
        let p = &self.params;
        [
            rsi::required_closes(p.rsi_period),
            macd::required_closes(p.macd_slow, p.macd_signal),
            p.sma_period,
            p.ema_period,
            breakout::required_closes(p.breakout_lookback),
        ]
        .into_iter()
        .max()
        .unwrap_or(0)
    }

    pub fn rsi(&self, series: &PriceSeries) -> Result<f64, IndicatorError> {
        self.indicators.rsi(&series.closes(), self.params.rsi_period)
    }

    /// MACD line minus signal line at the latest close.
    pub fn macd_signal(&self, series: &PriceSeries) -> Result<f64, IndicatorError> {
        self.macd(&series.closes()).map(|m| m.histogram)
    }

    pub fn sma(&self, series: &PriceSeries) -> Result<f64, IndicatorError> {
        self.indicators.sma(&series.closes(), self.params.sma_period)
    }

    pub fn ema(&self, series: &PriceSeries) -> Result<f64, IndicatorError> {
        self.indicators.ema(&series.closes(), self.params.ema_period)
    }

    pub fn breakout(&self, series: &PriceSeries) -> Result<bool, IndicatorError> {
        breakout::is_breakout(&series.closes(), self.params.breakout_lookback)
    }

    fn macd(&self, closes: &[f64]) -> Result<MacdResult, IndicatorError> {
        let p = &self.params;
        self.indicators
            .macd(closes, p.macd_fast, p.macd_slow, p.macd_signal)
    }

    /// Every indicator at the latest close, unrounded.
    pub fn compute(&self, series: &PriceSeries) -> Result<IndicatorValues, IndicatorError> {
        let closes = series.closes();
        let p = &self.params;

        let rsi = self.indicators.rsi(&closes, p.rsi_period)?;
        let macd = self.macd(&closes)?;
        let sma = self.indicators.sma(&closes, p.sma_period)?;
        let ema = self.indicators.ema(&closes, p.ema_period)?;
        let breakout = breakout::is_breakout(&closes, p.breakout_lookback)?;

        // Every indicator above needs at least one close, so this only
        // triggers for a custom provider that accepts empty input.
        let latest = series.latest().ok_or(IndicatorError::InsufficientHistory {
            indicator: "price",
            required: 1,
            available: 0,
        })?;

        Ok(IndicatorValues {
            date: latest.date,
            price: latest.close,
            rsi,
            macd,
            sma,
            ema,
            breakout,
        })
    }

    /// Rounded dashboard row carrying the lowest `gann_shown` Gann levels of
    /// the latest price.
    pub fn compute_row(
        &self,
        series: &PriceSeries,
        gann_shown: usize,
    ) -> Result<IndicatorRow, IndicatorError> {
        let values = self.compute(series)?;
        let gann = GannLevelSet::new(values.price)?;

        Ok(IndicatorRow {
            symbol: series.symbol().to_string(),
            date: values.date,
            price: round2(values.price),
            rsi: round2(values.rsi),
            macd_signal: round2(values.macd.histogram),
            sma: round2(values.sma),
            ema: round2(values.ema),
            breakout: values.breakout,
            gann_levels: gann.lowest(gann_shown).to_vec(),
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    fn series(closes: &[f64]) -> PriceSeries {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        PriceSeries::from_closes("TEST", start, closes).unwrap()
    }

    fn wave(n: usize) -> Vec<f64> {
        (0..n)
            .map(|i| 100.0 + 10.0 * (i as f64 * 0.4).sin() + i as f64 * 0.3)
            .collect()
    }

    #[test]
    fn default_params() {
        let p = IndicatorParams::default();
        assert_eq!(p.rsi_period, 14);
        assert_eq!((p.macd_fast, p.macd_slow, p.macd_signal), (12, 26, 9));
        assert_eq!((p.sma_period, p.ema_period), (20, 20));
        assert_eq!(p.breakout_lookback, 9);
    }

    #[test]
    fn params_fill_defaults_from_partial_json() {
        let p: IndicatorParams = serde_json::from_str(r#"{ "sma_period": 50 }"#).unwrap();
        assert_eq!(p.sma_period, 50);
        assert_eq!(p.ema_period, 20);
        assert_eq!(p.rsi_period, 14);
    }

    #[test]
    fn required_history_is_macd_bound_by_default() {
        assert_eq!(IndicatorCalculator::default().required_history(), 34);

        let params = IndicatorParams {
            sma_period: 50,
            ..IndicatorParams::default()
        };
        assert_eq!(IndicatorCalculator::new(params).required_history(), 50);
    }

    #[test]
    fn fourteen_closes_fail_twenty_period_indicators() {
        let calc = IndicatorCalculator::default();
        let s = series(&[100.0; 14]);
        let expected = |indicator| IndicatorError::InsufficientHistory {
            indicator,
            required: 20,
            available: 14,
        };
        assert_eq!(calc.sma(&s).unwrap_err(), expected("SMA"));
        assert_eq!(calc.ema(&s).unwrap_err(), expected("EMA"));
    }

    #[test]
    fn short_series_row_fails_without_partial_output() {
        let calc = IndicatorCalculator::default();
        // Enough for RSI/SMA/EMA/breakout but not MACD.
        let err = calc.compute_row(&series(&wave(25)), 4).unwrap_err();
        assert!(matches!(
            err,
            IndicatorError::InsufficientHistory { indicator: "MACD", required: 34, available: 25 }
        ));
    }

    #[test]
    fn constant_series_moving_averages_equal_price() {
        let calc = IndicatorCalculator::default();
        let s = series(&[321.0; 40]);
        assert_eq!(calc.sma(&s).unwrap(), 321.0);
        assert_eq!(calc.ema(&s).unwrap(), 321.0);
        assert_eq!(calc.macd_signal(&s).unwrap(), 0.0);
        assert!(!calc.breakout(&s).unwrap());
        assert_eq!(calc.rsi(&s).unwrap(), 100.0);
    }

    #[test]
    fn rising_series_row() {
        let closes: Vec<f64> = (1..=40).map(|x| 100.0 + x as f64).collect();
        let row = IndicatorCalculator::default()
            .compute_row(&series(&closes), 4)
            .unwrap();

        assert_eq!(row.symbol, "TEST");
        assert_eq!(row.price, 140.0);
        assert_eq!(row.rsi, 100.0);
        assert!(row.breakout);
        // Mean of 121..=140.
        assert_eq!(row.sma, 130.5);
        assert_eq!(row.gann_levels, vec![62.22, 70.0, 80.0, 84.03]);
        assert_eq!(row.date, NaiveDate::from_ymd_opt(2024, 2, 9).unwrap());
    }

    #[test]
    fn row_fields_are_rounded() {
        let row = IndicatorCalculator::default()
            .compute_row(&series(&wave(60)), 4)
            .unwrap();
        for v in [row.price, row.rsi, row.macd_signal, row.sma, row.ema] {
            assert!((v * 100.0 - (v * 100.0).round()).abs() < 1e-6, "{v} not rounded");
        }
        assert!((0.0..=100.0).contains(&row.rsi));
        assert_eq!(row.gann_levels.len(), 4);
    }

    #[test]
    fn recomputation_is_idempotent() {
        let calc = IndicatorCalculator::default();
        let s = series(&wave(60));
        assert_eq!(calc.compute(&s).unwrap(), calc.compute(&s).unwrap());
        assert_eq!(calc.compute_row(&s, 4).unwrap(), calc.compute_row(&s, 4).unwrap());
    }

    #[test]
    fn unrounded_values_match_rounded_row() {
        let calc = IndicatorCalculator::default();
        let s = series(&wave(60));
        let values = calc.compute(&s).unwrap();
        let row = calc.compute_row(&s, 4).unwrap();
        assert_eq!(row.ema, round2(values.ema));
        assert_eq!(row.macd_signal, round2(values.macd.histogram));
    }

    /// Stand-in provider proving the calculator only goes through the trait.
    struct FixedIndicators;

    impl TechnicalIndicators for FixedIndicators {
        fn rsi(&self, _: &[f64], _: usize) -> Result<f64, IndicatorError> {
            Ok(55.556)
        }
        fn macd(&self, _: &[f64], _: usize, _: usize, _: usize) -> Result<MacdResult, IndicatorError> {
            Ok(MacdResult { macd: 1.0, signal: 0.25, histogram: 0.75 })
        }
        fn sma(&self, _: &[f64], _: usize) -> Result<f64, IndicatorError> {
            Ok(10.0)
        }
        fn ema(&self, _: &[f64], _: usize) -> Result<f64, IndicatorError> {
            Ok(11.0)
        }
    }

    #[test]
    fn calculator_uses_injected_indicator_provider() {
        let calc = IndicatorCalculator::with_indicators(IndicatorParams::default(), FixedIndicators);
        let row = calc.compute_row(&series(&wave(12)), 2).unwrap();
        assert_eq!(row.rsi, 55.56);
        assert_eq!(row.macd_signal, 0.75);
        assert_eq!(row.sma, 10.0);
        assert_eq!(row.ema, 11.0);
        assert_eq!(row.gann_levels.len(), 2);
    }
}
