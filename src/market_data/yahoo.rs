// =============================================================================
// Yahoo Finance chart API — daily close history
// =============================================================================
//
// GET {base}/v8/finance/chart/{symbol}?period1=..&period2=..&interval=1d
//
// The response carries parallel `timestamp` and `indicators.quote[0].close`
// arrays. Sessions without a close come back as `null` and are skipped, so the
// resulting series may have gaps. Timestamps are shifted by the exchange's
// `gmtoffset` before taking the calendar date.
// =============================================================================

use std::collections::BTreeMap;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use reqwest::StatusCode;
use tracing::{debug, instrument, warn};

use crate::market_data::provider::{ensure_length, HistoryError, HistoryRequest, PriceHistoryProvider};
use crate::types::{PricePoint, PriceSeries};

const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com";

/// The chart endpoint rejects requests without a browser-like agent.
const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) nse-technicals/1.0";

#[derive(Clone)]
pub struct YahooFinanceProvider {
    base_url: String,
    client: reqwest::Client,
}

impl YahooFinanceProvider {
    pub fn new(timeout: Duration) -> Result<Self> {
        Self::with_base_url(DEFAULT_BASE_URL, timeout)
    }

    pub fn with_base_url(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .context("failed to build reqwest client for Yahoo Finance")?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    async fn fetch_chart(&self, symbol: &str, request: &HistoryRequest) -> Result<Option<serde_json::Value>> {
        let now = Utc::now().timestamp();
        let from = now - i64::from(request.lookback_days) * 86_400;
        let url = format!("{}/v8/finance/chart/{}", self.base_url, symbol);

        let resp = self
            .client
            .get(&url)
            .query(&[
                ("period1", from.to_string()),
                ("period2", now.to_string()),
                ("interval", "1d".to_string()),
                ("events", "history".to_string()),
            ])
            .send()
            .await
            .with_context(|| format!("GET chart for {symbol}"))?;

        let status = resp.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            // Throttling replies (429) come back as plain text.
            let text = resp.text().await.unwrap_or_default();
            anyhow::bail!("chart API returned {}: {}", status, text.trim());
        }

        let body: serde_json::Value = resp
            .json()
            .await
            .context("failed to parse chart response body")?;

        Ok(Some(body))
    }
}

#[async_trait]
impl PriceHistoryProvider for YahooFinanceProvider {
    fn name(&self) -> &str {
        "yahoo"
    }

    #[instrument(skip(self, request), name = "yahoo::daily_closes")]
    async fn daily_closes(
        &self,
        symbol: &str,
        request: &HistoryRequest,
    ) -> Result<PriceSeries, HistoryError> {
        let body = match self.fetch_chart(symbol, request).await {
            Ok(Some(body)) => body,
            Ok(None) => {
                return Err(HistoryError::NoData {
                    symbol: symbol.to_string(),
                })
            }
            Err(e) => return Err(HistoryError::fetch(symbol, format!("{e:#}"))),
        };

        let points = match parse_chart(&body) {
            Ok(points) => points,
            Err(ChartError::NotFound) => {
                return Err(HistoryError::NoData {
                    symbol: symbol.to_string(),
                })
            }
            Err(ChartError::Malformed(e)) => return Err(HistoryError::fetch(symbol, format!("{e:#}"))),
        };

        debug!(symbol, sessions = points.len(), "chart parsed");

        let series = PriceSeries::new(symbol, points).map_err(|e| HistoryError::fetch(symbol, e))?;
        ensure_length(series, request)
    }
}

// =============================================================================
// Response parsing
// =============================================================================

#[derive(Debug)]
enum ChartError {
    /// The API reported the symbol as unknown.
    NotFound,
    Malformed(anyhow::Error),
}

impl From<anyhow::Error> for ChartError {
    fn from(e: anyhow::Error) -> Self {
        Self::Malformed(e)
    }
}

/// Extract (date, close) pairs from a chart response, oldest first.
///
/// Null or non-positive closes are skipped; when two timestamps fall on the
/// same exchange date the later one wins.
fn parse_chart(body: &serde_json::Value) -> std::result::Result<Vec<PricePoint>, ChartError> {
    let chart = &body["chart"];

    let error = &chart["error"];
    if !error.is_null() {
        if error["code"].as_str() == Some("Not Found") {
            return Err(ChartError::NotFound);
        }
        return Err(anyhow::anyhow!("chart API error: {}", error).into());
    }

    let result = chart["result"]
        .as_array()
        .and_then(|r| r.first())
        .context("chart response missing 'result'")?;

    // A listed symbol with no sessions in range omits `timestamp` entirely.
    let Some(timestamps) = result["timestamp"].as_array() else {
        return Ok(Vec::new());
    };

    let closes = result["indicators"]["quote"]
        .as_array()
        .and_then(|q| q.first())
        .and_then(|q| q["close"].as_array())
        .context("chart response missing 'indicators.quote[0].close'")?;

    if closes.len() != timestamps.len() {
        return Err(anyhow::anyhow!(
            "chart response has {} timestamps but {} closes",
            timestamps.len(),
            closes.len()
        )
        .into());
    }

    let gmt_offset = result["meta"]["gmtoffset"].as_i64().unwrap_or(0);

    let mut by_date: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for (ts, close) in timestamps.iter().zip(closes) {
        let ts = ts.as_i64().context("non-integer timestamp in chart response")?;
        let Some(close) = close.as_f64() else {
            debug!(ts, "skipping session without close");
            continue;
        };
        if !close.is_finite() || close <= 0.0 {
            warn!(ts, close, "skipping non-positive close");
            continue;
        }
        let date = DateTime::<Utc>::from_timestamp(ts + gmt_offset, 0)
            .with_context(|| format!("timestamp {ts} out of range"))?
            .date_naive();
        by_date.insert(date, close);
    }

    Ok(by_date
        .into_iter()
        .map(|(date, close)| PricePoint { date, close })
        .collect())
}
