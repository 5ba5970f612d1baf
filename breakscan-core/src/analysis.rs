//! Single-run orchestration: source → preprocess → classify → scan → aggregate.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

use crate::config::AnalysisConfig;
use crate::data::{BarSource, DataError};
use crate::domain::{ClosedEvent, MarketParams};
use crate::engine::{initial_target, scan_series};
use crate::error::AnalysisError;
use crate::preprocess::preprocess_series;
use crate::quarter::{aggregate_quarters, QuarterSummary};

/// Everything one analysis run produces, ready for rendering or JSON export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub symbol: String,
    pub market: MarketParams,
    pub initial_target: f64,
    /// Closed events in chronological order of closure.
    pub events: Vec<ClosedEvent>,
    pub quarters: BTreeMap<String, QuarterSummary>,
}

#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Data(#[from] DataError),

    #[error(transparent)]
    Analysis(#[from] AnalysisError),
}

/// Run the full analysis for one symbol.
///
/// Bars are fetched from the start of the target window through the end
/// of the analysis window. Source failures propagate untouched — the
/// caller owns any retry policy.
pub fn run_analysis(
    source: &dyn BarSource,
    symbol: &str,
    config: &AnalysisConfig,
) -> Result<AnalysisReport, RunError> {
    let raw = source.daily_bars(symbol, config.target_window_start, config.analysis_end)?;
    let params = MarketParams::from_market_cap(source.market_cap(symbol)?);

    let series = preprocess_series(&raw)?;
    let scan_config = config.scan_config();
    let target = initial_target(&series, &scan_config)?;
    let events = scan_series(&series, &params, &scan_config)?;
    let quarters = aggregate_quarters(&events, &config.analysis_window(), &config.regimes);

    Ok(AnalysisReport {
        symbol: symbol.to_string(),
        market: params,
        initial_target: target,
        events,
        quarters,
    })
}
