// =============================================================================
// Shared types used across the dashboard
// =============================================================================

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::IndicatorError;

/// Shortest series the pipeline runs on. Shorter histories are skipped by the
/// driver before any indicator is evaluated; individual indicators may need
/// more (see `IndicatorCalculator::required_history`).
pub const MIN_SERIES_LEN: usize = 15;

/// Round to 2 decimal places, half away from zero.
///
/// Applied to the binary `f64`, so a value such as `1.005` (stored as
/// `1.00499999...`) rounds down.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// One daily close.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub close: f64,
}

/// Chronological daily closes for one symbol.
///
/// Dates are strictly increasing and every close is finite and positive.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceSeries {
    symbol: String,
    points: Vec<PricePoint>,
}

impl PriceSeries {
    /// Build a series, rejecting unordered or duplicate dates and closes that
    /// are non-finite or not positive.
    pub fn new(symbol: impl Into<String>, points: Vec<PricePoint>) -> Result<Self, IndicatorError> {
        let symbol = symbol.into();

        for pair in points.windows(2) {
            if pair[1].date <= pair[0].date {
                return Err(IndicatorError::invalid(format!(
                    "{symbol}: dates not strictly increasing ({} then {})",
                    pair[0].date, pair[1].date
                )));
            }
        }

        if let Some(bad) = points
            .iter()
            .find(|p| !p.close.is_finite() || p.close <= 0.0)
        {
            return Err(IndicatorError::invalid(format!(
                "{symbol}: close {} on {} is not a positive finite price",
                bad.close, bad.date
            )));
        }

        Ok(Self { symbol, points })
    }

    /// Convenience constructor for consecutive calendar days starting at
    /// `start`.
    pub fn from_closes(
        symbol: impl Into<String>,
        start: NaiveDate,
        closes: &[f64],
    ) -> Result<Self, IndicatorError> {
        let points = start
            .iter_days()
            .zip(closes)
            .map(|(date, &close)| PricePoint { date, close })
            .collect();
        Self::new(symbol, points)
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn closes(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.close).collect()
    }

    pub fn latest(&self) -> Option<&PricePoint> {
        self.points.last()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// One dashboard row: everything derived for a symbol in one run.
///
/// Numeric fields are rounded to 2 decimals; `gann_levels` holds the lowest
/// entries of the level set, already truncated by the driver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorRow {
    pub symbol: String,
    pub date: NaiveDate,
    pub price: f64,
    pub rsi: f64,
    pub macd_signal: f64,
    pub sma: f64,
    pub ema: f64,
    pub breakout: bool,
    pub gann_levels: Vec<f64>,
}

/// Column headings, in display order.
pub const DISPLAY_COLUMNS: [&str; 9] = [
    "Symbol",
    "Date",
    "Current Price",
    "RSI",
    "MACD Signal",
    "SMA 20",
    "EMA 20",
    "Breakout",
    "Gann Levels",
];

/// Flat, ordered mapping of column name to display string.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplayRecord {
    fields: Vec<(&'static str, String)>,
}

impl DisplayRecord {
    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(name, _)| *name == column)
            .map(|(_, value)| value.as_str())
    }

    pub fn fields(&self) -> &[(&'static str, String)] {
        &self.fields
    }
}

impl IndicatorRow {
    pub fn to_display(&self) -> DisplayRecord {
        let gann = self
            .gann_levels
            .iter()
            .map(|level| format!("{level:.2}"))
            .collect::<Vec<_>>()
            .join(", ");

        let values = [
            self.symbol.clone(),
            self.date.to_string(),
            format!("{:.2}", self.price),
            format!("{:.2}", self.rsi),
            format!("{:.2}", self.macd_signal),
            format!("{:.2}", self.sma),
            format!("{:.2}", self.ema),
            if self.breakout { "✅" } else { "❌" }.to_string(),
            gann,
        ];

        DisplayRecord {
            fields: DISPLAY_COLUMNS.iter().copied().zip(values).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    #[test]
    fn round2_half_away_from_zero() {
        assert_eq!(round2(2.345_000_1), 2.35);
        assert_eq!(round2(0.125), 0.13);
        assert_eq!(round2(-0.125), -0.13);
        assert_eq!(round2(88.888_888), 88.89);
    }

    #[test]
    fn series_rejects_duplicate_dates() {
        let points = vec![
            PricePoint { date: day(1), close: 10.0 },
            PricePoint { date: day(1), close: 11.0 },
        ];
        assert!(matches!(
            PriceSeries::new("INFY", points),
            Err(IndicatorError::InvalidInput { .. })
        ));
    }

    #[test]
    fn series_rejects_out_of_order_dates() {
        let points = vec![
            PricePoint { date: day(2), close: 10.0 },
            PricePoint { date: day(1), close: 11.0 },
        ];
        assert!(PriceSeries::new("INFY", points).is_err());
    }

    #[test]
    fn series_rejects_bad_closes() {
        for close in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let points = vec![PricePoint { date: day(1), close }];
            assert!(PriceSeries::new("INFY", points).is_err(), "accepted {close}");
        }
    }

    #[test]
    fn series_from_closes_is_chronological() {
        let series = PriceSeries::from_closes("TCS", day(1), &[1.0, 2.0, 3.0]).unwrap();
        assert_eq!(series.len(), 3);
        assert_eq!(series.closes(), vec![1.0, 2.0, 3.0]);
        assert_eq!(series.latest().unwrap().date, day(3));
        assert_eq!(series.symbol(), "TCS");
    }

    #[test]
    fn display_record_formats_fields() {
        let row = IndicatorRow {
            symbol: "INFY".into(),
            date: day(15),
            price: 1500.5,
            rsi: 61.234,
            macd_signal: -3.1,
            sma: 1490.0,
            ema: 1492.25,
            breakout: true,
            gann_levels: vec![666.89, 750.0, 857.14, 900.6],
        };
        let rec = row.to_display();
        assert_eq!(rec.fields().len(), DISPLAY_COLUMNS.len());
        assert_eq!(rec.get("Symbol"), Some("INFY"));
        assert_eq!(rec.get("Current Price"), Some("1500.50"));
        assert_eq!(rec.get("MACD Signal"), Some("-3.10"));
        assert_eq!(rec.get("Breakout"), Some("✅"));
        assert_eq!(rec.get("Gann Levels"), Some("666.89, 750.00, 857.14, 900.60"));
        assert_eq!(rec.get("Volume"), None);
    }
}
