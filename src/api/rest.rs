// =============================================================================
// REST API Endpoints — Axum 0.7
// =============================================================================
//
// Read-only dashboard API. All endpoints live under `/api/v1/` and need no
// authentication. CORS is permissive so a browser front-end on another origin
// can poll the snapshot.
// =============================================================================

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use crate::app_state::AppState;
use crate::dashboard::SymbolError;
use crate::error::{ApiError, IndicatorError};
use crate::market_data::HistoryError;
use crate::runtime_config::parse_symbol_list;

// =============================================================================
// Router construction
// =============================================================================

/// Build the REST API router with CORS middleware and shared state.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/v1/health", get(health))
        .route("/api/v1/dashboard", get(dashboard))
        .route("/api/v1/dashboard/refresh", post(refresh))
        .route("/api/v1/symbols/:symbol", get(symbol_row))
        .layer(cors)
        .with_state(state)
}

// =============================================================================
// Health
// =============================================================================

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    state_version: u64,
    server_time: i64,
}

async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok",
        state_version: state.current_state_version(),
        server_time: chrono::Utc::now().timestamp_millis(),
    })
}

// =============================================================================
// Dashboard snapshot
// =============================================================================

async fn dashboard(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, ApiError> {
    let snapshot = state.latest().ok_or(ApiError::NotReady)?;
    Ok(Json(snapshot))
}

async fn refresh(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    info!("manual dashboard refresh requested");
    Json(state.refresh().await)
}

// =============================================================================
// Single symbol, computed on demand
// =============================================================================

async fn symbol_row(
    State(state): State<Arc<AppState>>,
    Path(symbol): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let symbol = parse_symbol_list(&symbol)
        .into_iter()
        .next()
        .ok_or_else(|| ApiError::NotFound("empty symbol".to_string()))?;

    let row = state.dashboard.evaluate(&symbol).await.map_err(|e| {
        let message = e.to_string();
        match e {
            SymbolError::History(HistoryError::NoData { .. }) => ApiError::NotFound(message),
            SymbolError::History(HistoryError::Insufficient { .. })
            | SymbolError::Indicator(IndicatorError::InsufficientHistory { .. })
            | SymbolError::Indicator(IndicatorError::InvalidInput { .. }) => {
                ApiError::Unprocessable(message)
            }
            SymbolError::History(HistoryError::Fetch { .. }) => ApiError::Upstream(message),
        }
    })?;

    Ok(Json(row))
}

// =============================================================================
// Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use chrono::NaiveDate;
    use tower::ServiceExt;

    use crate::dashboard::Dashboard;
    use crate::market_data::FixedHistoryProvider;
    use crate::runtime_config::RuntimeConfig;
    use crate::types::PriceSeries;

    fn state() -> Arc<AppState> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let closes: Vec<f64> = (0..50).map(|i| 200.0 + i as f64).collect();
        let provider = FixedHistoryProvider::new()
            .with_series(PriceSeries::from_closes("NTPC.NS", start, &closes).unwrap())
            .with_series(PriceSeries::from_closes("BEL.NS", start, &closes[..20]).unwrap())
            .with_failure("IOC.NS", "connection refused");
        let config = RuntimeConfig {
            symbols: vec!["NTPC".into(), "BEL".into()],
            ..RuntimeConfig::default()
        };
        Arc::new(AppState::new(Dashboard::new(Arc::new(provider), Arc::new(config))))
    }

    async fn call(state: Arc<AppState>, method: &str, uri: &str) -> (StatusCode, serde_json::Value) {
        let resp = router(state)
            .oneshot(Request::builder().method(method).uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn health_reports_version() {
        let (status, body) = call(state(), "GET", "/api/v1/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["state_version"], 0);
    }

    #[tokio::test]
    async fn dashboard_before_first_build_is_unavailable() {
        let (status, body) = call(state(), "GET", "/api/v1/dashboard").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn refresh_then_read_snapshot() {
        let state = state();
        let (status, body) = call(state.clone(), "POST", "/api/v1/dashboard/refresh").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["rows"][0]["symbol"], "NTPC");
        assert_eq!(body["skipped"][0]["symbol"], "BEL");

        let (status, body) = call(state, "GET", "/api/v1/dashboard").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["rows"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn symbol_endpoint_maps_errors() {
        let (status, body) = call(state(), "GET", "/api/v1/symbols/ntpc").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["symbol"], "NTPC");
        assert_eq!(body["price"], 249.0);

        let (status, _) = call(state(), "GET", "/api/v1/symbols/BEL").await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

        let (status, _) = call(state(), "GET", "/api/v1/symbols/WIPRO").await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = call(state(), "GET", "/api/v1/symbols/IOC").await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
    }
}
