//! Static per-symbol market parameters derived from market capitalization.

use serde::{Deserialize, Serialize};

/// Market cap above which a symbol counts as large-cap (USD).
pub const LARGE_CAP_THRESHOLD: f64 = 50e9;

/// Market cap above which a symbol counts as mega-cap (USD).
pub const MEGA_CAP_THRESHOLD: f64 = 300e9;

/// Gap-down detection threshold for large-cap symbols.
pub const GAP_THRESHOLD_LARGE_CAP: f64 = 0.06;

/// Gap-down detection threshold for everything else (and unknown caps).
pub const GAP_THRESHOLD_DEFAULT: f64 = 0.08;

/// Per-symbol parameters fixed for the duration of one analysis run.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MarketParams {
    pub market_cap: f64,
    pub is_large_cap: bool,
    pub is_mega_cap: bool,
    pub gap_threshold: f64,
}

impl MarketParams {
    /// Classify a symbol from its market capitalization.
    ///
    /// An unknown cap is treated as 0, which selects the strictest regime:
    /// not large-cap, not mega-cap, 8% gap threshold.
    pub fn from_market_cap(cap: Option<f64>) -> Self {
        let market_cap = cap.unwrap_or(0.0);
        let is_large_cap = market_cap > LARGE_CAP_THRESHOLD;
        let is_mega_cap = market_cap > MEGA_CAP_THRESHOLD;
        let gap_threshold = if is_large_cap {
            GAP_THRESHOLD_LARGE_CAP
        } else {
            GAP_THRESHOLD_DEFAULT
        };
        Self {
            market_cap,
            is_large_cap,
            is_mega_cap,
            gap_threshold,
        }
    }
}
