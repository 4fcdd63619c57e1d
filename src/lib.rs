// =============================================================================
// NSE Technicals — indicator pipeline and dashboard glue
// =============================================================================
//
// Pure core: `gann`, `indicators`, `calculator` (no I/O, no shared state).
// Glue: `market_data` (price-history providers), `dashboard` (per-symbol
// driver), `render` (tabular output), `api` + `app_state` (serve mode).
// =============================================================================

pub mod api;
pub mod app_state;
pub mod calculator;
pub mod dashboard;
pub mod error;
pub mod gann;
pub mod indicators;
pub mod market_data;
pub mod render;
pub mod runtime_config;
pub mod types;
