//! Bar source trait and structured error types.
//!
//! The `BarSource` trait abstracts over where daily bars come from so the
//! analysis can be fed from files in production and from fixtures in
//! tests. Failures here are precondition errors for the analysis — the
//! core never retries; retry policy belongs to the caller.

use chrono::NaiveDate;
use thiserror::Error;

use crate::domain::RawBar;

/// Structured error types for bar sources.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("symbol not found: {symbol}")]
    SymbolNotFound { symbol: String },

    #[error("no bars for '{symbol}' in the requested range")]
    EmptySeries { symbol: String },

    #[error("malformed bar record: {0}")]
    MalformedRecord(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A provider of daily OHLC history and point-in-time market caps.
///
/// Implementations must return bars sorted ascending by date with no
/// duplicate dates. A missing market cap is `Ok(None)`, not an error.
pub trait BarSource: Send + Sync {
    /// Human-readable name of this source.
    fn name(&self) -> &str;

    /// Daily bars for a symbol over an inclusive date range.
    fn daily_bars(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<RawBar>, DataError>;

    /// Market capitalization for a symbol, if known.
    fn market_cap(&self, symbol: &str) -> Result<Option<f64>, DataError>;
}
