//! Breakscan Core — breakout/breakdown detection over daily OHLC series,
//! with quarterly aggregation.
//!
//! The pipeline, leaf-first:
//! - Series preprocessing: trailing MA3/MA5 over closes
//! - Market classification: cap-derived gap thresholds and exemptions
//! - Scan engine: the per-bar breakout/breakdown state machine
//! - Quarterly aggregation: windowed, regime-whitelisted statistics
//!
//! The engine is a strict forward pass over an immutable series with one
//! owner of the mutable scan state; analyses for different instruments
//! parallelize by running independent scans.

pub mod analysis;
pub mod calendar;
pub mod config;
pub mod data;
pub mod domain;
pub mod engine;
pub mod error;
pub mod preprocess;
pub mod quarter;

pub use analysis::{run_analysis, AnalysisReport, RunError};
pub use config::AnalysisConfig;
pub use error::AnalysisError;
