//! Breakdown rules — an ordered predicate table, first match wins.

use crate::domain::{BreakdownKind, PriceBar};

/// High-to-close intraday drop that invalidates a breakout opened above
/// yesterday's close.
pub const INTRADAY_HIGH_DROP: f64 = 0.08;

/// Close-to-close drop that invalidates a breakout opened below
/// yesterday's close.
pub const INTRADAY_GAP_DROP: f64 = 0.10;

/// Consecutive closes below the breakout day's high before the
/// three-black-crows rule fires.
pub const THREE_CROWS_LIMIT: u32 = 3;

/// Inputs to one day's breakdown evaluation.
#[derive(Debug, Clone, Copy)]
pub struct BreakdownCtx<'a> {
    pub today: &'a PriceBar,
    pub yesterday: &'a PriceBar,
    pub consecutive_fail_count: u32,
    pub is_mega_cap: bool,
}

/// Priority order is authoritative: a bar satisfying several rules is
/// recorded under the first.
const BREAKDOWN_RULES: &[(BreakdownKind, fn(&BreakdownCtx) -> bool)] = &[
    (BreakdownKind::MaCross, ma_cross),
    (BreakdownKind::IntradayHighDrop8, intraday_high_drop),
    (BreakdownKind::IntradayGapDrop10, intraday_gap_drop),
    (BreakdownKind::ThreeBlackCrows, three_black_crows),
];

/// Evaluate the rule table for one day.
pub fn first_breakdown(ctx: &BreakdownCtx) -> Option<BreakdownKind> {
    BREAKDOWN_RULES
        .iter()
        .find(|(_, rule)| rule(ctx))
        .map(|(kind, _)| *kind)
}

/// MA3 below MA5. Skipped (false) while either window is still filling.
fn ma_cross(ctx: &BreakdownCtx) -> bool {
    matches!(
        (ctx.today.ma3, ctx.today.ma5),
        (Some(ma3), Some(ma5)) if ma3 < ma5
    )
}

fn intraday_high_drop(ctx: &BreakdownCtx) -> bool {
    let t = ctx.today;
    t.open > ctx.yesterday.close
        && t.close < t.open
        && (t.high - t.close) / t.high >= INTRADAY_HIGH_DROP
}

fn intraday_gap_drop(ctx: &BreakdownCtx) -> bool {
    let y_close = ctx.yesterday.close;
    ctx.today.open < y_close && (y_close - ctx.today.close) / y_close >= INTRADAY_GAP_DROP
}

/// Mega-caps are exempt from the three-black-crows rule.
fn three_black_crows(ctx: &BreakdownCtx) -> bool {
    ctx.consecutive_fail_count >= THREE_CROWS_LIMIT && !ctx.is_mega_cap
}
