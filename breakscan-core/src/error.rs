//! Analysis-level error types.

use chrono::NaiveDate;
use thiserror::Error;

/// Fatal precondition failures for one analysis run. No partial results
/// are produced once one of these fires.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("insufficient data: got {got} bars, need at least {need}")]
    InsufficientData { got: usize, need: usize },

    #[error("no bars in the initial-target window {start}..={end}")]
    EmptyTargetWindow { start: NaiveDate, end: NaiveDate },
}
