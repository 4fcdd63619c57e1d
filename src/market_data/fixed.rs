// =============================================================================
// Fixed (in-memory) price history
// =============================================================================
//
// Serves pre-loaded series, either built in code or read from a JSON file of
// the shape:
//
//   { "INFY.NS": [ { "date": "2024-06-03", "close": 1450.5 }, ... ], ... }
//
// Used for offline runs and as the provider in tests.
// =============================================================================

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::info;

use crate::market_data::provider::{ensure_length, HistoryError, HistoryRequest, PriceHistoryProvider};
use crate::types::{PricePoint, PriceSeries};

#[derive(Debug, Clone)]
enum Entry {
    Series(PriceSeries),
    Failure(String),
}

#[derive(Debug, Clone, Default)]
pub struct FixedHistoryProvider {
    entries: HashMap<String, Entry>,
}

impl FixedHistoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_series(mut self, series: PriceSeries) -> Self {
        self.insert(series);
        self
    }

    /// Make every request for `symbol` fail as a transport error would.
    pub fn with_failure(mut self, symbol: impl Into<String>, reason: impl Into<String>) -> Self {
        self.entries.insert(symbol.into(), Entry::Failure(reason.into()));
        self
    }

    pub fn insert(&mut self, series: PriceSeries) {
        self.entries
            .insert(series.symbol().to_string(), Entry::Series(series));
    }

    /// Load every series from a JSON history file.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read history file {}", path.display()))?;
        let provider = Self::from_json(&content)
            .with_context(|| format!("failed to parse history file {}", path.display()))?;

        info!(
            path = %path.display(),
            symbols = provider.entries.len(),
            "history file loaded"
        );
        Ok(provider)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let raw: HashMap<String, Vec<PricePoint>> =
            serde_json::from_str(content).context("history JSON is not a symbol -> points map")?;

        let mut provider = Self::new();
        for (symbol, points) in raw {
            let series = PriceSeries::new(symbol.clone(), points)
                .with_context(|| format!("invalid history for {symbol}"))?;
            provider.insert(series);
        }
        Ok(provider)
    }
}

#[async_trait]
impl PriceHistoryProvider for FixedHistoryProvider {
    fn name(&self) -> &str {
        "fixed"
    }

    async fn daily_closes(
        &self,
        symbol: &str,
        request: &HistoryRequest,
    ) -> Result<PriceSeries, HistoryError> {
        match self.entries.get(symbol) {
            Some(Entry::Series(series)) => ensure_length(series.clone(), request),
            Some(Entry::Failure(reason)) => Err(HistoryError::fetch(symbol, reason)),
            None => Err(HistoryError::NoData {
                symbol: symbol.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    const REQUEST: HistoryRequest = HistoryRequest {
        lookback_days: 90,
        min_sessions: 2,
    };

    #[tokio::test]
    async fn serves_inserted_series() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let series = PriceSeries::from_closes("TCS.NS", start, &[1.0, 2.0, 3.0]).unwrap();
        let provider = FixedHistoryProvider::new().with_series(series.clone());

        assert_eq!(provider.daily_closes("TCS.NS", &REQUEST).await.unwrap(), series);
        assert!(matches!(
            provider.daily_closes("WIPRO.NS", &REQUEST).await,
            Err(HistoryError::NoData { .. })
        ));
    }

    #[tokio::test]
    async fn failures_surface_as_fetch_errors() {
        let provider = FixedHistoryProvider::new().with_failure("PNB.NS", "connection reset");
        let err = provider.daily_closes("PNB.NS", &REQUEST).await.unwrap_err();
        assert_eq!(err.to_string(), "failed to fetch history for PNB.NS: connection reset");
    }

    #[tokio::test]
    async fn from_json_builds_series() {
        let json = r#"{
            "ITC.NS": [
                { "date": "2024-06-03", "close": 430.1 },
                { "date": "2024-06-04", "close": 425.0 },
                { "date": "2024-06-05", "close": 433.9 }
            ]
        }"#;
        let provider = FixedHistoryProvider::from_json(json).unwrap();
        let series = provider.daily_closes("ITC.NS", &REQUEST).await.unwrap();
        assert_eq!(series.closes(), vec![430.1, 425.0, 433.9]);
    }

    #[test]
    fn from_json_rejects_unordered_dates() {
        let json = r#"{ "ITC.NS": [
            { "date": "2024-06-04", "close": 425.0 },
            { "date": "2024-06-03", "close": 430.1 }
        ] }"#;
        assert!(FixedHistoryProvider::from_json(json).is_err());
    }
}
