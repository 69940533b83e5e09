//! Market data access port.

use crate::domain::error::ScanError;
use crate::domain::normalize::RawTable;

/// Supplies raw OHLCV tables for a symbol at a provider interval
/// (`4h`, `1d`, `1wk`, ...). Tables are handed to the normalizer as-is.
pub trait DataPort: Send + Sync {
    fn fetch_ohlcv(&self, symbol: &str, interval: &str) -> Result<RawTable, ScanError>;
}
