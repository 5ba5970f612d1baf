//! Per-bar scan step and the full-series forward pass.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::calendar::business_day_span;
use crate::domain::{
    BreakdownEvent, BreakdownKind, BreakoutEvent, BreakoutKind, ClosedEvent, MarketParams,
    PriceBar,
};
use crate::error::AnalysisError;
use crate::preprocess::MIN_BARS;

use super::rules::{first_breakdown, BreakdownCtx};
use super::state::ScanState;
use super::{pct_change, round3};

/// Calendar anchors for one scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Start of the window the initial target is taken from.
    pub target_window_start: NaiveDate,
    /// End of that window (inclusive).
    pub target_window_end: NaiveDate,
    /// Earliest date an initial or gap-fill breakout may start.
    pub eligibility_date: NaiveDate,
}

/// Immutable per-run inputs shared by every step.
#[derive(Debug, Clone, Copy)]
pub struct ScanContext {
    pub params: MarketParams,
    pub eligibility_date: NaiveDate,
    /// Maximum high over the target window, rounded to 3 decimals.
    pub initial_target: f64,
}

/// Maximum high over the target window, rounded to 3 decimals.
///
/// Fails when the window matches no bars (or only non-finite highs).
pub fn initial_target(series: &[PriceBar], config: &ScanConfig) -> Result<f64, AnalysisError> {
    let max_high = series
        .iter()
        .filter(|b| b.date >= config.target_window_start && b.date <= config.target_window_end)
        .map(|b| b.high)
        .fold(f64::NEG_INFINITY, f64::max);
    if !max_high.is_finite() {
        return Err(AnalysisError::EmptyTargetWindow {
            start: config.target_window_start,
            end: config.target_window_end,
        });
    }
    Ok(round3(max_high))
}

/// Scan the whole series and return the closed events in order of closure.
///
/// The series must be sorted ascending by date with no duplicates. The
/// first bar has no "yesterday" and is skipped; an event still open when
/// the series ends is archived against the final bar's close.
pub fn scan_series(
    series: &[PriceBar],
    params: &MarketParams,
    config: &ScanConfig,
) -> Result<Vec<ClosedEvent>, AnalysisError> {
    if series.len() < MIN_BARS {
        return Err(AnalysisError::InsufficientData {
            got: series.len(),
            need: MIN_BARS,
        });
    }

    let ctx = ScanContext {
        params: *params,
        eligibility_date: config.eligibility_date,
        initial_target: initial_target(series, config)?,
    };

    let mut state = ScanState::new();
    let mut closed = Vec::new();

    for window in series.windows(2) {
        if let Some(event) = state.step(&ctx, &window[0], &window[1]) {
            closed.push(event);
        }
    }

    if let (Some(mut event), Some(last)) = (state.open_event.take(), series.last()) {
        event.duration = business_day_span(event.start_date, last.date);
        event.max_amplitude = pct_change(last.close, event.target_price);
        closed.push(ClosedEvent::Breakout(event));
    }

    Ok(closed)
}

impl ScanState {
    /// Advance the state by one bar, returning the event closed on this
    /// bar, if any.
    ///
    /// A bar that opens a breakout performs no breakdown checks, and a bar
    /// that closes one performs no entry checks; each bar does at most one
    /// of the two.
    pub fn step(
        &mut self,
        ctx: &ScanContext,
        yesterday: &PriceBar,
        today: &PriceBar,
    ) -> Option<ClosedEvent> {
        match self.open_event.take() {
            Some(event) => self.step_active(ctx, event, yesterday, today),
            None => {
                self.step_inactive(ctx, yesterday, today);
                None
            }
        }
    }

    fn step_active(
        &mut self,
        ctx: &ScanContext,
        mut event: BreakoutEvent,
        yesterday: &PriceBar,
        today: &PriceBar,
    ) -> Option<ClosedEvent> {
        if let Some(day_high) = self.breakout_day_high {
            if today.close < day_high {
                self.consecutive_fail_count += 1;
            } else {
                self.consecutive_fail_count = 0;
            }
        }

        let rule_ctx = BreakdownCtx {
            today,
            yesterday,
            consecutive_fail_count: self.consecutive_fail_count,
            is_mega_cap: ctx.params.is_mega_cap,
        };
        if let Some(kind) = first_breakdown(&rule_ctx) {
            let breakdown = close_into_breakdown(event, kind, today);
            self.clear_active();
            return Some(ClosedEvent::Breakdown(breakdown));
        }

        if today.close < event.target_price {
            // Normal exit: the close fell back below the target level.
            event.duration = business_day_span(event.start_date, today.date);
            event.max_amplitude = pct_change(today.close, event.target_price);
            self.clear_active();
            return Some(ClosedEvent::Breakout(event));
        }

        event.duration = business_day_span(event.start_date, today.date);
        let amplitude = pct_change(today.close, event.target_price);
        if amplitude > event.max_amplitude {
            event.max_amplitude = amplitude;
        }
        self.open_event = Some(event);
        None
    }

    fn step_inactive(&mut self, ctx: &ScanContext, yesterday: &PriceBar, today: &PriceBar) {
        // Candidate target: the fixed initial target until the first
        // breakout completes, then the high-water mark.
        let candidate = round3(if self.first_breakout_completed {
            self.high_water_mark.unwrap_or(ctx.initial_target)
        } else {
            ctx.initial_target
        });

        // The high-water mark folds in today's high on every non-active
        // day; the new-high trigger below compares against the pre-update
        // value so a day cannot break its own high.
        let prior_mark = self.high_water_mark;
        self.high_water_mark = Some(prior_mark.map_or(today.high, |mark| mark.max(today.high)));

        let eligible = today.date >= ctx.eligibility_date;

        if eligible && self.first_breakout_completed {
            if self.gap_down_price.is_none()
                && (yesterday.low - today.high) / yesterday.low >= ctx.params.gap_threshold
            {
                self.gap_down_price = Some(round3(yesterday.low));
            }
            if let Some(gap) = self.gap_down_price {
                if today.close > gap {
                    self.gap_down_price = None;
                    self.begin(open_breakout(BreakoutKind::GapFill, today, gap), today.high);
                    return;
                }
            }
        }

        if eligible && !self.first_breakout_completed && today.close > candidate {
            self.first_breakout_completed = true;
            self.begin(
                open_breakout(BreakoutKind::Initial, today, candidate),
                today.high,
            );
            return;
        }

        if self.first_breakout_completed {
            if let Some(mark) = prior_mark {
                if today.close > mark {
                    self.begin(open_breakout(BreakoutKind::NewHigh, today, mark), today.high);
                    self.high_water_mark = Some(today.high);
                }
            }
        }
    }
}

fn open_breakout(kind: BreakoutKind, today: &PriceBar, target_price: f64) -> BreakoutEvent {
    BreakoutEvent {
        kind,
        start_date: today.date,
        target_price,
        buy_price: round3(today.close),
        duration: 1,
        max_amplitude: pct_change(today.close, target_price),
    }
}

pub(crate) fn close_into_breakdown(
    event: BreakoutEvent,
    kind: BreakdownKind,
    today: &PriceBar,
) -> BreakdownEvent {
    let breakdown_price = round3(today.close);
    let effective_pct = if event.buy_price != 0.0 {
        Some(round3(pct_change(breakdown_price, event.buy_price)))
    } else {
        None
    };
    BreakdownEvent {
        kind: event.kind,
        start_date: event.start_date,
        target_price: event.target_price,
        buy_price: event.buy_price,
        max_amplitude: event.max_amplitude,
        breakdown: kind,
        breakdown_date: today.date,
        breakdown_price,
        effective_pct,
        duration: business_day_span(event.start_date, today.date),
    }
}
