//! Serializable analysis configuration.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

use crate::engine::ScanConfig;
use crate::quarter::{AnalysisWindow, MarketRegime};

/// All calendar anchors and the quarter-regime whitelist for one run.
///
/// Missing fields in a TOML file fall back to the defaults, which
/// reproduce the reference study: initial target from H2 2022, entries
/// eligible from 2023-01-01, statistics over 2023-07-01..2025-02-23.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub target_window_start: NaiveDate,
    pub target_window_end: NaiveDate,
    pub eligibility_date: NaiveDate,
    pub analysis_start: NaiveDate,
    pub analysis_end: NaiveDate,
    pub regimes: BTreeMap<String, MarketRegime>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            target_window_start: ymd(2022, 7, 1),
            target_window_end: ymd(2023, 1, 1),
            eligibility_date: ymd(2023, 1, 1),
            analysis_start: ymd(2023, 7, 1),
            analysis_end: ymd(2025, 2, 23),
            regimes: default_regime_table(),
        }
    }
}

impl AnalysisConfig {
    pub fn scan_config(&self) -> ScanConfig {
        ScanConfig {
            target_window_start: self.target_window_start,
            target_window_end: self.target_window_end,
            eligibility_date: self.eligibility_date,
        }
    }

    pub fn analysis_window(&self) -> AnalysisWindow {
        AnalysisWindow {
            start: self.analysis_start,
            end: self.analysis_end,
        }
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(raw)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml_str(&raw)
    }
}

/// The reference study's quarter-regime table.
pub fn default_regime_table() -> BTreeMap<String, MarketRegime> {
    [
        ("2023Q3", MarketRegime::Trending),
        ("2023Q4", MarketRegime::Trending),
        ("2024Q1", MarketRegime::Trending),
        ("2024Q2", MarketRegime::RangeBound),
        ("2024Q3", MarketRegime::Trending),
        ("2024Q4", MarketRegime::Trending),
        ("2025Q1", MarketRegime::RangeBound),
    ]
    .into_iter()
    .map(|(quarter, regime)| (quarter.to_string(), regime))
    .collect()
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid calendar date")
}
