pub mod fixed;
pub mod provider;
pub mod yahoo;

pub use fixed::FixedHistoryProvider;
pub use provider::{HistoryError, HistoryRequest, PriceHistoryProvider};
pub use yahoo::YahooFinanceProvider;
