// =============================================================================
// Price-history provider interface
// =============================================================================
//
// The driver asks a provider for a symbol's daily closes over a look-back
// window. A provider never answers with an empty series: "nothing came back"
// and "not enough came back" are distinct errors so the driver can skip the
// symbol with a precise reason.
// =============================================================================

use async_trait::async_trait;
use thiserror::Error;

use crate::types::PriceSeries;

/// How much history the caller wants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryRequest {
    /// Calendar days back from today.
    pub lookback_days: u32,
    /// Fewest sessions the caller can work with.
    pub min_sessions: usize,
}

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("no price history available for {symbol}")]
    NoData { symbol: String },

    #[error("{symbol}: only {available} sessions of history, need {required}")]
    Insufficient {
        symbol: String,
        available: usize,
        required: usize,
    },

    #[error("failed to fetch history for {symbol}: {reason}")]
    Fetch { symbol: String, reason: String },
}

impl HistoryError {
    pub fn fetch(symbol: &str, err: impl std::fmt::Display) -> Self {
        Self::Fetch {
            symbol: symbol.to_string(),
            reason: err.to_string(),
        }
    }
}

/// Source of chronological, gap-tolerant daily closes.
#[async_trait]
pub trait PriceHistoryProvider: Send + Sync {
    /// Short label used in logs.
    fn name(&self) -> &str;

    async fn daily_closes(
        &self,
        symbol: &str,
        request: &HistoryRequest,
    ) -> Result<PriceSeries, HistoryError>;
}

/// Enforce the non-empty / minimum-length contract on a fetched series.
pub fn ensure_length(series: PriceSeries, request: &HistoryRequest) -> Result<PriceSeries, HistoryError> {
    if series.is_empty() {
        return Err(HistoryError::NoData {
            symbol: series.symbol().to_string(),
        });
    }
    if series.len() < request.min_sessions {
        return Err(HistoryError::Insufficient {
            symbol: series.symbol().to_string(),
            available: series.len(),
            required: request.min_sessions,
        });
    }
    Ok(series)
}
