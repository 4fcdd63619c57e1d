// =============================================================================
// Error types
// =============================================================================
//
// `IndicatorError` is the taxonomy of the pure computation core (Gann levels
// and indicators). `ApiError` maps driver failures onto HTTP responses for the
// serve mode.
// =============================================================================

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

/// Failure of a core computation. Both variants are recoverable by the caller.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum IndicatorError {
    /// The input violates a precondition (non-positive price, zero period,
    /// unordered dates, non-finite close, ...).
    #[error("invalid input: {reason}")]
    InvalidInput { reason: String },

    /// The series is shorter than the lookback `indicator` needs.
    #[error("insufficient history for {indicator}: need {required} closes, have {available}")]
    InsufficientHistory {
        indicator: &'static str,
        required: usize,
        available: usize,
    },
}

impl IndicatorError {
    pub fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            reason: reason.into(),
        }
    }

    /// Return `Err(InsufficientHistory)` when `available < required`.
    pub fn require(indicator: &'static str, required: usize, available: usize) -> Result<(), Self> {
        if available < required {
            Err(Self::InsufficientHistory {
                indicator,
                required,
                available,
            })
        } else {
            Ok(())
        }
    }
}

/// Error returned by the REST handlers.
#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    Unprocessable(String),
    Upstream(String),
    NotReady,
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(msg) => write!(f, "not_found: {msg}"),
            Self::Unprocessable(msg) => write!(f, "unprocessable: {msg}"),
            Self::Upstream(msg) => write!(f, "upstream_error: {msg}"),
            Self::NotReady => write!(f, "not_ready"),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            Self::Unprocessable(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg.clone()),
            Self::Upstream(msg) => (StatusCode::BAD_GATEWAY, msg.clone()),
            Self::NotReady => (
                StatusCode::SERVICE_UNAVAILABLE,
                "dashboard has not been built yet".to_string(),
            ),
        };

        (status, axum::Json(json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn require_passes_when_enough_history() {
        assert!(IndicatorError::require("SMA", 20, 20).is_ok());
        assert!(IndicatorError::require("SMA", 20, 35).is_ok());
    }

    #[test]
    fn require_names_indicator_and_lengths() {
        let err = IndicatorError::require("SMA", 20, 14).unwrap_err();
        assert_eq!(
            err,
            IndicatorError::InsufficientHistory {
                indicator: "SMA",
                required: 20,
                available: 14,
            }
        );
        assert_eq!(
            err.to_string(),
            "insufficient history for SMA: need 20 closes, have 14"
        );
    }

    #[test]
    fn api_error_status_codes() {
        assert_eq!(
            ApiError::NotFound("x".into()).into_response().status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::Unprocessable("x".into()).into_response().status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            ApiError::NotReady.into_response().status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }
}
