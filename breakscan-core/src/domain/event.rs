//! Breakout and breakdown event records produced by the scan.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// How a breakout entered its active state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BreakoutKind {
    /// First close above the fixed initial target.
    Initial,
    /// Close above the running high-water mark after the first breakout.
    NewHigh,
    /// Close recovering above a previously latched gap-down level.
    GapFill,
}

impl fmt::Display for BreakoutKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            BreakoutKind::Initial => "initial",
            BreakoutKind::NewHigh => "new-high",
            BreakoutKind::GapFill => "gap-fill",
        };
        f.write_str(label)
    }
}

/// Which rule invalidated an active breakout.
///
/// Rules are evaluated in this declaration order, first match wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BreakdownKind {
    /// MA3 closed below MA5.
    MaCross,
    /// Opened above yesterday's close, closed below open, high-to-close drop >= 8%.
    IntradayHighDrop8,
    /// Opened below yesterday's close, close-to-close drop >= 10%.
    IntradayGapDrop10,
    /// Three consecutive closes below the breakout day's high (non-mega-cap only).
    ThreeBlackCrows,
}

impl BreakdownKind {
    /// Reporting bucket: MA-cross and three-black-crows are merged.
    pub fn bucket(self) -> BreakdownBucket {
        match self {
            BreakdownKind::MaCross | BreakdownKind::ThreeBlackCrows => {
                BreakdownBucket::ThreeBreakFive
            }
            BreakdownKind::IntradayHighDrop8 => BreakdownBucket::IntradayHighDrop8,
            BreakdownKind::IntradayGapDrop10 => BreakdownBucket::IntradayGapDrop10,
        }
    }
}

impl fmt::Display for BreakdownKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            BreakdownKind::MaCross => "ma-cross",
            BreakdownKind::IntradayHighDrop8 => "intraday-high-drop-8",
            BreakdownKind::IntradayGapDrop10 => "intraday-gap-drop-10",
            BreakdownKind::ThreeBlackCrows => "three-black-crows",
        };
        f.write_str(label)
    }
}

/// Statistical bucket a breakdown is counted under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BreakdownBucket {
    ThreeBreakFive,
    IntradayHighDrop8,
    IntradayGapDrop10,
}

/// A breakout event — in flight while the scan tracks it, archived as-is
/// when it ends without a breakdown.
///
/// `duration` is the weekday span from the start date to the last tracked
/// day. `max_amplitude` is the running maximum close-over-target percent
/// while the event is active; at termination it is overwritten with the
/// final close-vs-target percent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BreakoutEvent {
    pub kind: BreakoutKind,
    pub start_date: NaiveDate,
    /// The level whose breach started this event, rounded to 3 decimals.
    pub target_price: f64,
    /// Close on the trigger day, rounded to 3 decimals.
    pub buy_price: f64,
    pub duration: i64,
    pub max_amplitude: f64,
}

/// A breakout terminated by one of the breakdown rules.
///
/// Carries the originating breakout's fields plus the breakdown outcome.
/// `effective_pct` is the breakdown-price-vs-buy-price percent change;
/// `None` when the buy price was exactly 0 (rendered as `N/A`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BreakdownEvent {
    pub kind: BreakoutKind,
    pub start_date: NaiveDate,
    pub target_price: f64,
    pub buy_price: f64,
    pub max_amplitude: f64,
    pub breakdown: BreakdownKind,
    pub breakdown_date: NaiveDate,
    /// Close on the breakdown day, rounded to 3 decimals.
    pub breakdown_price: f64,
    pub effective_pct: Option<f64>,
    /// Weekday span from breakout start to breakdown date.
    pub duration: i64,
}

impl BreakdownEvent {
    /// Effective breakout percent for display: `"-3.25%"`, or `"N/A"` when
    /// the buy price was 0.
    pub fn effective_pct_label(&self) -> String {
        match self.effective_pct {
            Some(pct) => format!("{pct}%"),
            None => "N/A".to_string(),
        }
    }
}

/// A closed event in the scan output, in chronological order of closure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "kebab-case")]
pub enum ClosedEvent {
    Breakout(BreakoutEvent),
    Breakdown(BreakdownEvent),
}

impl ClosedEvent {
    /// The date this event is keyed by for windowing and quarter grouping:
    /// the start date for plain breakouts, the breakdown trigger date for
    /// breakdowns.
    pub fn relevant_date(&self) -> NaiveDate {
        match self {
            ClosedEvent::Breakout(ev) => ev.start_date,
            ClosedEvent::Breakdown(ev) => ev.breakdown_date,
        }
    }

    /// The date the underlying breakout started.
    pub fn start_date(&self) -> NaiveDate {
        match self {
            ClosedEvent::Breakout(ev) => ev.start_date,
            ClosedEvent::Breakdown(ev) => ev.start_date,
        }
    }

    /// Weekday-span duration of the underlying breakout.
    pub fn duration(&self) -> i64 {
        match self {
            ClosedEvent::Breakout(ev) => ev.duration,
            ClosedEvent::Breakdown(ev) => ev.duration,
        }
    }

    /// Amplitude pooled by the quarterly statistics.
    pub fn amplitude(&self) -> f64 {
        match self {
            ClosedEvent::Breakout(ev) => ev.max_amplitude,
            ClosedEvent::Breakdown(ev) => ev.max_amplitude,
        }
    }

    pub fn as_breakdown(&self) -> Option<&BreakdownEvent> {
        match self {
            ClosedEvent::Breakdown(ev) => Some(ev),
            ClosedEvent::Breakout(_) => None,
        }
    }
}
