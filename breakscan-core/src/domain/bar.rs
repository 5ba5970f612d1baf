//! Daily price bars — raw provider output and the preprocessed series unit.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Raw daily OHLC bar as supplied by a data source (before preprocessing).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

impl RawBar {
    /// Basic OHLC sanity check: high >= low/open/close, low <= open/close,
    /// positive open and close.
    pub fn is_sane(&self) -> bool {
        self.high >= self.low
            && self.high >= self.open
            && self.high >= self.close
            && self.low <= self.open
            && self.low <= self.close
            && self.open > 0.0
            && self.close > 0.0
    }
}

/// One trading day of the preprocessed series: raw OHLC plus the trailing
/// 3-day and 5-day close means.
///
/// `ma3`/`ma5` are `None` for the first 2/4 bars of the series, where the
/// trailing window is not yet full.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub ma3: Option<f64>,
    pub ma5: Option<f64>,
}
