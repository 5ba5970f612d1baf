//! Domain types for the breakout analysis.

pub mod bar;
pub mod event;
pub mod market;

pub use bar::{PriceBar, RawBar};
pub use event::{
    BreakdownBucket, BreakdownEvent, BreakdownKind, BreakoutEvent, BreakoutKind, ClosedEvent,
};
pub use market::MarketParams;
