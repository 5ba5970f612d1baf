//! Integration tests for the scan engine.
//!
//! Scenarios:
//! 1. Initial breakout fires above the windowed target and exits normally
//! 2. Gap latch + gap-fill re-entry, end-of-series archive
//! 3. Breakdown rule priority (MA cross beats the intraday rules)
//! 4. Three-black-crows vs the mega-cap exemption
//! 5. Intraday high-drop and gap-drop breakdowns
//! 6. Quarterly aggregation round-trip over scan output

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use std::collections::BTreeMap;

use breakscan_core::config::AnalysisConfig;
use breakscan_core::domain::{
    BreakdownKind, BreakoutKind, ClosedEvent, MarketParams, RawBar,
};
use breakscan_core::engine::{scan_series, ScanConfig};
use breakscan_core::error::AnalysisError;
use breakscan_core::preprocess::preprocess_series;
use breakscan_core::quarter::{aggregate_quarters, MarketRegime};

const EPSILON: f64 = 1e-9;

fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Consecutive weekdays starting at `start` (weekends skipped, matching a
/// trading calendar).
fn weekday_dates(start: NaiveDate, n: usize) -> Vec<NaiveDate> {
    let mut dates = Vec::with_capacity(n);
    let mut day = start;
    while dates.len() < n {
        if !matches!(day.weekday(), Weekday::Sat | Weekday::Sun) {
            dates.push(day);
        }
        day = day + Duration::days(1);
    }
    dates
}

/// Bars from (open, high, low, close) rows on consecutive weekdays.
fn make_bars(start: NaiveDate, rows: &[(f64, f64, f64, f64)]) -> Vec<RawBar> {
    weekday_dates(start, rows.len())
        .into_iter()
        .zip(rows)
        .map(|(date, &(open, high, low, close))| RawBar {
            date,
            open,
            high,
            low,
            close,
        })
        .collect()
}

/// Target window = first day only, eligibility from the first day.
fn first_day_config(start: NaiveDate) -> ScanConfig {
    ScanConfig {
        target_window_start: start,
        target_window_end: start,
        eligibility_date: start,
    }
}

fn no_cap() -> MarketParams {
    MarketParams::from_market_cap(None)
}

fn scan(
    rows: &[(f64, f64, f64, f64)],
    params: &MarketParams,
    config: &ScanConfig,
    start: NaiveDate,
) -> Vec<ClosedEvent> {
    let series = preprocess_series(&make_bars(start, rows)).unwrap();
    scan_series(&series, params, config).unwrap()
}

// ──────────────────────────────────────────────
// Initial breakout and normal exit
// ──────────────────────────────────────────────

#[test]
fn initial_breakout_fires_and_exits_normally() {
    // Closes 100..103 then a fall-back through the target.
    let start = ymd(2024, 1, 1); // Monday
    let rows = [
        (99.5, 100.0, 99.0, 100.0),
        (100.5, 101.0, 100.0, 101.0),
        (101.5, 102.0, 101.0, 102.0),
        (102.5, 103.0, 102.0, 103.0),
        (97.5, 98.0, 97.0, 98.0),
        (96.5, 97.0, 96.0, 97.0),
    ];
    // Target window spans the first three days: max high = 102.
    let config = ScanConfig {
        target_window_start: start,
        target_window_end: ymd(2024, 1, 3),
        eligibility_date: start,
    };

    let events = scan(&rows, &no_cap(), &config, start);
    assert_eq!(events.len(), 1);

    let ClosedEvent::Breakout(event) = &events[0] else {
        panic!("expected a plain breakout, got {:?}", events[0]);
    };
    assert_eq!(event.kind, BreakoutKind::Initial);
    // Fired on the fourth day: first close above 102.
    assert_eq!(event.start_date, ymd(2024, 1, 4));
    assert_eq!(event.target_price, 102.0);
    assert_eq!(event.buy_price, 103.0);
    // Closed the next day (Thu -> Fri is one weekday step).
    assert_eq!(event.duration, 1);
    // Final amplitude is the exit close vs the target.
    let expected = (98.0 - 102.0) / 102.0 * 100.0;
    assert!((event.max_amplitude - expected).abs() < EPSILON);
}

#[test]
fn close_equal_to_target_does_not_fire() {
    let start = ymd(2024, 1, 1);
    let rows = [
        (99.5, 100.0, 99.0, 100.0),
        (99.6, 100.0, 99.2, 100.0),
        (99.7, 100.0, 99.3, 100.0),
        (99.8, 100.0, 99.4, 100.0),
        (99.9, 100.0, 99.5, 100.0),
    ];
    let events = scan(&rows, &no_cap(), &first_day_config(start), start);
    assert!(events.is_empty());
}

#[test]
fn scan_rejects_short_series() {
    let start = ymd(2024, 1, 1);
    let bars = make_bars(
        start,
        &[
            (99.5, 100.0, 99.0, 100.0),
            (100.5, 101.0, 100.0, 101.0),
            (101.5, 102.0, 101.0, 102.0),
            (102.5, 103.0, 102.0, 103.0),
            (103.5, 104.0, 103.0, 104.0),
        ],
    );
    let mut series = preprocess_series(&bars).unwrap();
    series.truncate(4);
    assert!(matches!(
        scan_series(&series, &no_cap(), &first_day_config(start)),
        Err(AnalysisError::InsufficientData { got: 4, need: 5 })
    ));
}

// ──────────────────────────────────────────────
// Gap-fill re-entry and end-of-series archive
// ──────────────────────────────────────────────

#[test]
fn gap_fill_reentry_after_first_breakout() {
    let start = ymd(2024, 1, 1);
    let rows = [
        (99.5, 100.0, 99.0, 100.0),    // target window day: target = 100
        (100.2, 101.0, 100.0, 101.0),  // initial breakout (101 > 100)
        (99.2, 99.6, 98.8, 99.0),      // normal exit (99 < 100)
        (100.2, 100.8, 100.0, 100.4),  // quiet day, low = 100
        (91.5, 92.0, 90.0, 91.0),      // gap: (100 - 92) / 100 = 8% -> latch 100
        (95.0, 100.6, 94.9, 100.5),    // close 100.5 > 100 -> gap-fill entry
    ];
    let events = scan(&rows, &no_cap(), &first_day_config(start), start);
    assert_eq!(events.len(), 2);

    let ClosedEvent::Breakout(first) = &events[0] else {
        panic!("expected a plain breakout");
    };
    assert_eq!(first.kind, BreakoutKind::Initial);
    assert_eq!(first.duration, 1);

    // The gap-fill entry was still open when the series ended: archived
    // against the final close.
    let ClosedEvent::Breakout(second) = &events[1] else {
        panic!("expected a plain breakout");
    };
    assert_eq!(second.kind, BreakoutKind::GapFill);
    assert_eq!(second.target_price, 100.0);
    assert_eq!(second.buy_price, 100.5);
    assert_eq!(second.start_date, ymd(2024, 1, 8));
    assert_eq!(second.duration, 0);
    assert!((second.max_amplitude - 0.5).abs() < EPSILON);
}

#[test]
fn gap_is_not_latched_before_first_breakout_completes() {
    let start = ymd(2024, 1, 1);
    // A qualifying gap on day 2, but no breakout has ever completed, so
    // the gap-fill path is ineligible and nothing ever fires.
    let rows = [
        (199.0, 200.0, 198.0, 199.0),
        (180.0, 182.0, 178.0, 180.0), // (198 - 182) / 198 = 8.08%
        (185.0, 186.0, 184.0, 185.0),
        (186.0, 187.0, 185.0, 186.0),
        (187.0, 188.0, 186.0, 187.0),
    ];
    let events = scan(&rows, &no_cap(), &first_day_config(start), start);
    assert!(events.is_empty());
}

// ──────────────────────────────────────────────
// Breakdown rules
// ──────────────────────────────────────────────

/// Shared ramp: tiny target so the entry fires on day 2 at close 100 and
/// the event stays above target while closes drift down.
fn declining_rows() -> [(f64, f64, f64, f64); 6] {
    [
        (9.5, 10.0, 9.0, 10.0),        // target = 10
        (99.0, 100.5, 98.0, 100.0),    // initial breakout, day high 100.5
        (94.0, 96.0, 93.5, 95.0),      // fail count 1
        (89.0, 91.0, 88.5, 90.0),      // fail count 2
        (84.0, 86.0, 83.5, 85.0),      // fail count 3
        (86.0, 92.0, 83.0, 84.0),      // MA3 < MA5 and intraday high-drop
    ]
}

#[test]
fn ma_cross_wins_over_simultaneous_intraday_drop() {
    let start = ymd(2024, 1, 1);
    // Mega-cap: the three-crows rule is exempt, so the scan reaches the
    // final day with the event still active. That day satisfies both the
    // MA cross and the intraday high-drop; priority picks the MA cross.
    let params = MarketParams::from_market_cap(Some(400e9));
    let events = scan(&declining_rows(), &params, &first_day_config(start), start);
    assert_eq!(events.len(), 1);

    let ClosedEvent::Breakdown(event) = &events[0] else {
        panic!("expected a breakdown");
    };
    assert_eq!(event.breakdown, BreakdownKind::MaCross);
    assert_eq!(event.breakdown_date, ymd(2024, 1, 8));
    assert_eq!(event.breakdown_price, 84.0);
    assert_eq!(event.duration, 4);
    assert_eq!(event.effective_pct, Some(-16.0));
}

#[test]
fn three_black_crows_fires_for_small_caps() {
    let start = ymd(2024, 1, 1);
    let events = scan(&declining_rows(), &no_cap(), &first_day_config(start), start);
    assert_eq!(events.len(), 1);

    let ClosedEvent::Breakdown(event) = &events[0] else {
        panic!("expected a breakdown");
    };
    // The third consecutive close below the breakout day's high.
    assert_eq!(event.breakdown, BreakdownKind::ThreeBlackCrows);
    assert_eq!(event.breakdown_date, ymd(2024, 1, 5));
    assert_eq!(event.duration, 3);
}

#[test]
fn intraday_high_drop_breakdown() {
    let start = ymd(2024, 1, 1);
    let rows = [
        (9.5, 10.0, 9.0, 10.0),
        (99.0, 100.5, 98.0, 100.0),   // entry at close 100
        (101.0, 102.0, 92.5, 93.0),   // open above prior close, 8.8% off the high
        (93.5, 94.5, 92.0, 94.0),
        (94.0, 95.5, 93.0, 95.0),
    ];
    let events = scan(&rows, &no_cap(), &first_day_config(start), start);
    assert_eq!(events.len(), 1);

    let ClosedEvent::Breakdown(event) = &events[0] else {
        panic!("expected a breakdown");
    };
    assert_eq!(event.breakdown, BreakdownKind::IntradayHighDrop8);
    assert_eq!(event.breakdown_date, ymd(2024, 1, 3));
    assert_eq!(event.breakdown_price, 93.0);
    assert_eq!(event.effective_pct, Some(-7.0));
    assert_eq!(event.duration, 1);
}

#[test]
fn intraday_gap_drop_breakdown() {
    let start = ymd(2024, 1, 1);
    let rows = [
        (9.5, 10.0, 9.0, 10.0),
        (99.0, 100.5, 98.0, 100.0),   // entry at close 100
        (89.0, 89.5, 87.5, 88.0),     // open below prior close, 12% close-to-close
        (88.5, 89.5, 87.0, 89.0),
        (89.0, 90.5, 88.0, 90.0),
    ];
    let events = scan(&rows, &no_cap(), &first_day_config(start), start);
    assert_eq!(events.len(), 1);

    let ClosedEvent::Breakdown(event) = &events[0] else {
        panic!("expected a breakdown");
    };
    assert_eq!(event.breakdown, BreakdownKind::IntradayGapDrop10);
    assert_eq!(event.breakdown_price, 88.0);
    assert_eq!(event.effective_pct, Some(-12.0));
}

#[test]
fn event_still_active_at_series_end_is_archived() {
    let start = ymd(2024, 1, 1);
    let rows = [
        (9.5, 10.0, 9.0, 10.0),
        (99.0, 100.5, 98.0, 100.0),
        (100.0, 101.5, 99.5, 101.0),
        (101.0, 102.5, 100.5, 102.0),
        (102.0, 103.5, 101.5, 103.0),
    ];
    let events = scan(&rows, &no_cap(), &first_day_config(start), start);
    assert_eq!(events.len(), 1);

    let ClosedEvent::Breakout(event) = &events[0] else {
        panic!("expected a plain breakout");
    };
    assert_eq!(event.kind, BreakoutKind::Initial);
    assert_eq!(event.start_date, ymd(2024, 1, 2));
    assert_eq!(event.duration, 3);
    let expected = (103.0 - 10.0) / 10.0 * 100.0;
    assert!((event.max_amplitude - expected).abs() < EPSILON);
}

// ──────────────────────────────────────────────
// Aggregation round-trip
// ──────────────────────────────────────────────

#[test]
fn quarterly_stats_match_scan_output() {
    let start = ymd(2024, 1, 1);
    let params = MarketParams::from_market_cap(Some(400e9));
    let events = scan(&declining_rows(), &params, &first_day_config(start), start);

    let mut config = AnalysisConfig::default();
    config.analysis_start = ymd(2024, 1, 1);
    config.analysis_end = ymd(2024, 12, 31);
    config.regimes = BTreeMap::from([("2024Q1".to_string(), MarketRegime::Trending)]);

    let summaries = aggregate_quarters(&events, &config.analysis_window(), &config.regimes);
    assert_eq!(summaries.len(), 1);

    let q1 = &summaries["2024Q1"];
    assert_eq!(q1.breakout_count, 1);
    assert_eq!(q1.avg_duration, 4.0);
    assert_eq!(q1.breakdown_stats.three_break_five, 1);
    assert_eq!(q1.breakdown_stats.intraday_high_drop8, 0);

    // Round-trip: summed counts equal the events inside the window whose
    // quarter is whitelisted.
    let in_window: usize = events
        .iter()
        .filter(|e| {
            let date = e.relevant_date();
            config.analysis_window().contains(date)
                && config
                    .regimes
                    .contains_key(&breakscan_core::calendar::quarter_label(date))
        })
        .count();
    let summed: usize = summaries.values().map(|s| s.breakout_count).sum();
    assert_eq!(summed, in_window);
}
