// =============================================================================
// Gann Price Levels
// =============================================================================
//
// A reference price is multiplied and divided by a fixed ladder of ratios to
// produce price targets above and below it:
//
//   above_i = price * m_i
//   below_i = price / m_i
//
// Every level is rounded to 2 decimals (half away from zero) and the union is
// returned in ascending order. With all multipliers > 1 the two halves never
// overlap, so the set always holds 2 * |ladder| entries. Prices small enough
// for rounding to merge two levels, or to round one down to zero, are
// rejected.
// =============================================================================

use serde::Serialize;

use crate::error::IndicatorError;
use crate::types::round2;

/// Canonical multiplier ladder.
pub const GANN_MULTIPLIERS: [f64; 8] = [1.125, 1.25, 1.333, 1.5, 1.666, 1.75, 2.0, 2.25];

/// Sorted price levels derived from one reference price.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GannLevelSet {
    price: f64,
    levels: Vec<f64>,
}

impl GannLevelSet {
    /// Levels for `price` using [`GANN_MULTIPLIERS`].
    pub fn new(price: f64) -> Result<Self, IndicatorError> {
        Self::with_ladder(price, &GANN_MULTIPLIERS)
    }

    /// Levels for `price` using a custom ladder. Every multiplier must be
    /// finite and strictly greater than 1.
    pub fn with_ladder(price: f64, ladder: &[f64]) -> Result<Self, IndicatorError> {
        if !price.is_finite() || price <= 0.0 {
            return Err(IndicatorError::invalid(format!(
                "Gann levels need a positive finite price, got {price}"
            )));
        }
        if let Some(m) = ladder.iter().find(|m| !m.is_finite() || **m <= 1.0) {
            return Err(IndicatorError::invalid(format!(
                "Gann multiplier {m} must be greater than 1"
            )));
        }

        let mut levels: Vec<f64> = ladder
            .iter()
            .flat_map(|&m| [round2(price * m), round2(price / m)])
            .collect();
        levels.sort_by(f64::total_cmp);

        if levels.first().is_some_and(|&lowest| lowest <= 0.0) {
            return Err(IndicatorError::invalid(format!(
                "price {price} is too small for 2-decimal Gann levels"
            )));
        }
        if levels.windows(2).any(|pair| pair[0] >= pair[1]) {
            return Err(IndicatorError::invalid(format!(
                "Gann levels for price {price} collapse after rounding"
            )));
        }

        Ok(Self { price, levels })
    }

    pub fn price(&self) -> f64 {
        self.price
    }

    /// All levels, ascending.
    pub fn levels(&self) -> &[f64] {
        &self.levels
    }

    /// The first `n` ascending levels (or all of them if fewer).
    pub fn lowest(&self, n: usize) -> &[f64] {
        &self.levels[..n.min(self.levels.len())]
    }

    pub fn into_levels(self) -> Vec<f64> {
        self.levels
    }
}

/// Full ascending level sequence for `price` on the canonical ladder.
pub fn gann_levels(price: f64) -> Result<Vec<f64>, IndicatorError> {
    GannLevelSet::new(price).map(GannLevelSet::into_levels)
}
