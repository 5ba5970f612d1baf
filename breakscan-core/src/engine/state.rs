//! Mutable scan state — single owner for the duration of one run.

use crate::domain::BreakoutEvent;

/// Everything the per-bar step carries between bars.
///
/// Invariant: `open_event` is `Some` iff a breakout is active, and
/// `breakout_day_high` is `Some` only while a breakout is active.
#[derive(Debug, Default)]
pub struct ScanState {
    /// The breakout currently being tracked, if any.
    pub open_event: Option<BreakoutEvent>,
    /// Latched true forever once the first initial breakout fires.
    pub first_breakout_completed: bool,
    /// Gap-down level waiting to be reclaimed, cleared on use.
    pub gap_down_price: Option<f64>,
    /// Running maximum of daily highs seen on non-active days.
    pub high_water_mark: Option<f64>,
    /// Consecutive closes below the breakout day's high.
    pub consecutive_fail_count: u32,
    /// High of the day the active breakout started.
    pub breakout_day_high: Option<f64>,
}

impl ScanState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn breakout_active(&self) -> bool {
        self.open_event.is_some()
    }

    /// Enter the active state with a freshly opened event.
    pub(crate) fn begin(&mut self, event: BreakoutEvent, day_high: f64) {
        self.open_event = Some(event);
        self.breakout_day_high = Some(day_high);
        self.consecutive_fail_count = 0;
    }

    /// Reset everything tied to the active breakout.
    pub(crate) fn clear_active(&mut self) {
        self.open_event = None;
        self.breakout_day_high = None;
        self.consecutive_fail_count = 0;
    }
}
