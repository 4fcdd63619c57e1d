// =============================================================================
// Runtime Configuration — dashboard settings loaded from JSON + environment
// =============================================================================
//
// Every field carries `#[serde(default)]` so a partial (or empty) config file
// still loads. Environment variables override the file for the settings that
// are most often changed per run (symbols, serve mode, bind address, output
// format).
// =============================================================================

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::calculator::IndicatorParams;

// =============================================================================
// Default-value helpers (required by serde `default = "..."` attribute)
// =============================================================================

fn default_symbols() -> Vec<String> {
    [
        "INFY", "WIPRO", "TCS", "SBIN", "LICI", "ADANIPORTS", "TATAMOTORS", "TATASTEEL", "HAL",
        "IRCTC", "IOC", "COALINDIA", "HINDUNILVR", "PNB", "RELIANCE", "ITC", "VEDL", "JSWSTEEL",
        "NTPC", "POWERGRID", "BPCL", "ONGC", "NHPC", "ADANIGREEN", "GAIL", "TECHM", "HCLTECH",
        "CIPLA", "DIVISLAB", "SUNPHARMA", "BAJAJFINSV", "BAJFINANCE", "MARUTI", "EICHERMOT", "M&M",
        "HDFCBANK", "ICICIBANK", "AXISBANK", "BANKBARODA", "INDUSINDBK", "IDFCFIRSTB", "FEDERALBNK",
        "CANBK", "UNIONBANK", "NAUKRI", "PAYTM", "ZOMATO", "DELHIVERY", "TATAPOWER", "UPL", "LT",
        "SBICARD", "INDIGO", "BHARTIARTL", "IDEA", "BEL", "TITAN", "DMART", "ASIANPAINT", "DIXON",
        "ABB", "BHEL", "IRFC", "RVNL", "PFC", "RECLTD", "SJVN", "HFCL", "TATACHEM", "HDFCLIFE",
        "ICICIPRULI", "ICICIGI", "SBILIFE", "HDFCAMC", "CHOLAFIN", "MUTHOOTFIN", "LTIM",
        "PERSISTENT", "COFORGE", "NESTLEIND", "COLPAL", "GODREJCP", "MARICO", "BRITANNIA",
        "HAVELLS", "BLUEDART", "DRREDDY", "AUROPHARMA", "GLAND", "LUPIN", "BIOCON", "BOSCHLTD",
        "ESCORTS", "ASHOKLEY", "TIINDIA", "SRF", "DEEPAKNTR", "PIIND", "ASTRAL", "TATVA",
        "ADANIENT", "VARUNBEV", "KPRMILL", "AIAENG", "POLYCAB", "INDUSTOWER",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_exchange_suffix() -> String {
    ".NS".to_string()
}

fn default_lookback_days() -> u32 {
    90
}

fn default_gann_levels_shown() -> usize {
    4
}

fn default_max_concurrent_fetches() -> usize {
    8
}

fn default_request_timeout_secs() -> u64 {
    10
}

fn default_refresh_secs() -> u64 {
    300
}

fn default_bind_addr() -> String {
    "127.0.0.1:3001".to_string()
}

// =============================================================================
// OutputFormat
// =============================================================================

/// How the one-shot run prints the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "table" => Ok(Self::Table),
            "json" => Ok(Self::Json),
            other => anyhow::bail!("unknown output format '{other}' (expected table or json)"),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Table => write!(f, "table"),
            Self::Json => write!(f, "json"),
        }
    }
}

// =============================================================================
// RuntimeConfig
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeConfig {
    // --- Universe -----------------------------------------------------------

    /// Bare ticker symbols, shown as-is on the dashboard.
    #[serde(default = "default_symbols")]
    pub symbols: Vec<String>,

    /// Appended to every symbol when querying the price provider.
    #[serde(default = "default_exchange_suffix")]
    pub exchange_suffix: String,

    // --- History ------------------------------------------------------------

    /// Calendar days of history requested per symbol.
    #[serde(default = "default_lookback_days")]
    pub lookback_days: u32,

    /// Serve closes from this JSON file instead of fetching them.
    #[serde(default)]
    pub history_file: Option<PathBuf>,

    #[serde(default = "default_max_concurrent_fetches")]
    pub max_concurrent_fetches: usize,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    // --- Indicators ---------------------------------------------------------

    #[serde(default)]
    pub indicators: IndicatorParams,

    /// Lowest Gann levels carried on each row.
    #[serde(default = "default_gann_levels_shown")]
    pub gann_levels_shown: usize,

    // --- Output -------------------------------------------------------------

    #[serde(default)]
    pub output_format: OutputFormat,

    /// Run the HTTP dashboard instead of printing once.
    #[serde(default)]
    pub serve: bool,

    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Seconds between snapshot rebuilds in serve mode.
    #[serde(default = "default_refresh_secs")]
    pub refresh_secs: u64,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            symbols: default_symbols(),
            exchange_suffix: default_exchange_suffix(),
            lookback_days: default_lookback_days(),
            history_file: None,
            max_concurrent_fetches: default_max_concurrent_fetches(),
            request_timeout_secs: default_request_timeout_secs(),
            indicators: IndicatorParams::default(),
            gann_levels_shown: default_gann_levels_shown(),
            output_format: OutputFormat::default(),
            serve: false,
            bind_addr: default_bind_addr(),
            refresh_secs: default_refresh_secs(),
        }
    }
}

impl RuntimeConfig {
    /// Load configuration from a JSON file at `path`.
    ///
    /// A missing file is an error so the caller can fall back to defaults with
    /// a warning.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read runtime config from {}", path.display()))?;

        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse runtime config from {}", path.display()))?;

        info!(
            path = %path.display(),
            symbols = config.symbols.len(),
            serve = config.serve,
            "runtime config loaded"
        );

        Ok(config)
    }

    /// Apply overrides from a variable lookup (normally `std::env::var`).
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(syms) = lookup("DASHBOARD_SYMBOLS") {
            let symbols = parse_symbol_list(&syms);
            if !symbols.is_empty() {
                self.symbols = symbols;
            }
        }
        if let Some(addr) = lookup("DASHBOARD_BIND_ADDR") {
            self.bind_addr = addr;
        }
        if let Some(serve) = lookup("DASHBOARD_SERVE") {
            self.serve = matches!(
                serve.trim().to_ascii_lowercase().as_str(),
                "1" | "true" | "yes" | "on"
            );
        }
        if let Some(format) = lookup("DASHBOARD_FORMAT") {
            self.output_format = format.parse()?;
        }
        Ok(())
    }

    /// Ticker as the price provider knows it.
    pub fn provider_symbol(&self, symbol: &str) -> String {
        if self.exchange_suffix.is_empty() || symbol.ends_with(&self.exchange_suffix) {
            symbol.to_string()
        } else {
            format!("{symbol}{}", self.exchange_suffix)
        }
    }
}

/// Split a comma-separated symbol list, trimming and upper-casing entries and
/// dropping blanks.
pub fn parse_symbol_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_uppercase())
        .filter(|s| !s.is_empty())
        .collect()
}
