// =============================================================================
// Dashboard Driver — per-symbol fetch and compute
// =============================================================================
//
// For each configured symbol:
//   1. ask the price-history provider for daily closes,
//   2. run the indicator calculator on the series,
//   3. keep the row, or record why the symbol was skipped.
//
// Every symbol yields an explicit `Result`; one bad symbol never aborts the
// batch. Fetches run concurrently up to `max_concurrent_fetches` while the
// output keeps the configured symbol order.
// =============================================================================

use std::sync::Arc;

use chrono::Utc;
use futures_util::stream::{self, StreamExt};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::calculator::IndicatorCalculator;
use crate::error::IndicatorError;
use crate::market_data::{HistoryError, HistoryRequest, PriceHistoryProvider};
use crate::runtime_config::RuntimeConfig;
use crate::types::{IndicatorRow, MIN_SERIES_LEN};

/// Why a symbol produced no row.
#[derive(Debug, Error)]
pub enum SymbolError {
    #[error(transparent)]
    History(#[from] HistoryError),

    #[error(transparent)]
    Indicator(#[from] IndicatorError),
}

/// A symbol left off the dashboard, with the reason shown to the user.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedSymbol {
    pub symbol: String,
    pub reason: String,
}

/// One complete dashboard build.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardSnapshot {
    /// RFC 3339 build time.
    pub generated_at: String,
    pub rows: Vec<IndicatorRow>,
    pub skipped: Vec<SkippedSymbol>,
}

pub struct Dashboard {
    provider: Arc<dyn PriceHistoryProvider>,
    calculator: IndicatorCalculator,
    config: Arc<RuntimeConfig>,
}

impl Dashboard {
    pub fn new(provider: Arc<dyn PriceHistoryProvider>, config: Arc<RuntimeConfig>) -> Self {
        let calculator = IndicatorCalculator::new(config.indicators.clone());
        Self {
            provider,
            calculator,
            config,
        }
    }

    /// History request sized for the slowest indicator.
    pub fn history_request(&self) -> HistoryRequest {
        HistoryRequest {
            lookback_days: self.config.lookback_days,
            min_sessions: self.calculator.required_history().max(MIN_SERIES_LEN),
        }
    }

    /// Fetch and compute a single symbol.
    pub async fn evaluate(&self, symbol: &str) -> Result<IndicatorRow, SymbolError> {
        let request = self.history_request();
        let ticker = self.config.provider_symbol(symbol);

        let series = self.provider.daily_closes(&ticker, &request).await?;
        debug!(symbol, sessions = series.len(), "history received");

        let row = self
            .calculator
            .compute_row(&series, self.config.gann_levels_shown)?;

        Ok(IndicatorRow {
            symbol: symbol.to_string(),
            ..row
        })
    }

    /// Build a snapshot over every configured symbol.
    pub async fn build_snapshot(&self) -> DashboardSnapshot {
        self.build_snapshot_for(&self.config.symbols).await
    }

    pub async fn build_snapshot_for(&self, symbols: &[String]) -> DashboardSnapshot {
        info!(
            provider = self.provider.name(),
            symbols = symbols.len(),
            "building dashboard"
        );

        let outcomes: Vec<(String, Result<IndicatorRow, SymbolError>)> =
            stream::iter(symbols.iter().cloned())
                .map(|symbol| async move {
                    let outcome = self.evaluate(&symbol).await;
                    (symbol, outcome)
                })
                .buffered(self.config.max_concurrent_fetches.max(1))
                .collect()
                .await;

        let mut rows = Vec::with_capacity(outcomes.len());
        let mut skipped = Vec::new();

        for (symbol, outcome) in outcomes {
            match outcome {
                Ok(row) => rows.push(row),
                Err(e) => {
                    warn!(symbol = %symbol, error = %e, "skipping symbol");
                    skipped.push(SkippedSymbol {
                        symbol,
                        reason: e.to_string(),
                    });
                }
            }
        }

        info!(
            rows = rows.len(),
            skipped = skipped.len(),
            "dashboard built"
        );

        DashboardSnapshot {
            generated_at: Utc::now().to_rfc3339(),
            rows,
            skipped,
        }
    }
}
