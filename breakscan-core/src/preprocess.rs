//! Series preprocessing: trailing 3-day and 5-day close means.

use crate::domain::{PriceBar, RawBar};
use crate::error::AnalysisError;

/// Minimum series length for any trigger evaluation (the MA5 window).
pub const MIN_BARS: usize = 5;

/// Populate MA3/MA5 over a raw series.
///
/// The input must be sorted ascending by date with no duplicate dates;
/// sources are responsible for that contract. Each mean is the simple
/// arithmetic mean of close over the trailing window including the
/// current bar, `None` while the window is not yet full.
pub fn preprocess_series(raw: &[RawBar]) -> Result<Vec<PriceBar>, AnalysisError> {
    if raw.len() < MIN_BARS {
        return Err(AnalysisError::InsufficientData {
            got: raw.len(),
            need: MIN_BARS,
        });
    }

    Ok(raw
        .iter()
        .enumerate()
        .map(|(i, bar)| PriceBar {
            date: bar.date,
            open: bar.open,
            high: bar.high,
            low: bar.low,
            close: bar.close,
            ma3: trailing_mean(raw, i, 3),
            ma5: trailing_mean(raw, i, 5),
        })
        .collect())
}

fn trailing_mean(bars: &[RawBar], index: usize, window: usize) -> Option<f64> {
    if index + 1 < window {
        return None;
    }
    let sum: f64 = bars[index + 1 - window..=index]
        .iter()
        .map(|b| b.close)
        .sum();
    Some(sum / window as f64)
}
