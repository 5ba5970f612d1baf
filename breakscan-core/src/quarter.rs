//! Quarterly aggregation of closed events.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::calendar::quarter_label;
use crate::domain::{BreakdownBucket, ClosedEvent};

/// Market regime tag assigned to a quarter.
///
/// Quarters without a regime entry are excluded from the output entirely —
/// the table is a whitelist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MarketRegime {
    Trending,
    RangeBound,
}

impl fmt::Display for MarketRegime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            MarketRegime::Trending => "trending",
            MarketRegime::RangeBound => "range-bound",
        };
        f.write_str(label)
    }
}

/// Inclusive date window the statistics are computed over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl AnalysisWindow {
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// Breakdown counts over the whole analysis window, by reporting bucket.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreakdownStats {
    pub three_break_five: usize,
    pub intraday_high_drop8: usize,
    pub intraday_gap_drop10: usize,
}

/// Summary statistics for one whitelisted quarter with at least one event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuarterSummary {
    pub quarter: String,
    pub market_regime: MarketRegime,
    pub breakout_count: usize,
    pub avg_duration: f64,
    pub avg_amplitude: f64,
    /// Window-wide breakdown counts (not split per quarter).
    pub breakdown_stats: BreakdownStats,
}

/// Group closed events into per-quarter statistics.
///
/// Events are keyed by their relevant date (start date for breakouts,
/// breakdown date for breakdowns), filtered to the window, grouped by
/// quarter, and dropped when their quarter has no regime entry. Durations
/// and amplitudes are pooled across breakouts and breakdowns. The
/// breakdown-type counts are computed once over the full breakdown list,
/// filtered by breakdown date only, and attached to every summary.
pub fn aggregate_quarters(
    events: &[ClosedEvent],
    window: &AnalysisWindow,
    regimes: &BTreeMap<String, MarketRegime>,
) -> BTreeMap<String, QuarterSummary> {
    let mut by_quarter: BTreeMap<String, Vec<&ClosedEvent>> = BTreeMap::new();
    for event in events.iter().filter(|e| window.contains(e.relevant_date())) {
        by_quarter
            .entry(quarter_label(event.relevant_date()))
            .or_default()
            .push(event);
    }

    let breakdown_stats = breakdown_counts(events, window);

    by_quarter
        .into_iter()
        .filter_map(|(quarter, group)| {
            let regime = *regimes.get(&quarter)?;
            let count = group.len();
            let summary = QuarterSummary {
                quarter: quarter.clone(),
                market_regime: regime,
                breakout_count: count,
                avg_duration: group.iter().map(|e| e.duration() as f64).sum::<f64>()
                    / count as f64,
                avg_amplitude: group.iter().map(|e| e.amplitude()).sum::<f64>() / count as f64,
                breakdown_stats: breakdown_stats.clone(),
            };
            Some((quarter, summary))
        })
        .collect()
}

fn breakdown_counts(events: &[ClosedEvent], window: &AnalysisWindow) -> BreakdownStats {
    let mut stats = BreakdownStats::default();
    for breakdown in events
        .iter()
        .filter_map(|e| e.as_breakdown())
        .filter(|b| window.contains(b.breakdown_date))
    {
        match breakdown.breakdown.bucket() {
            BreakdownBucket::ThreeBreakFive => stats.three_break_five += 1,
            BreakdownBucket::IntradayHighDrop8 => stats.intraday_high_drop8 += 1,
            BreakdownBucket::IntradayGapDrop10 => stats.intraday_gap_drop10 += 1,
        }
    }
    stats
}
