//! CSV-directory bar source.
//!
//! Layout: one `<SYMBOL>.csv` per symbol with `date,open,high,low,close`
//! columns, plus an optional `market_caps.csv` sidecar with
//! `symbol,market_cap` rows.

use chrono::NaiveDate;
use serde::Deserialize;
use std::io::Read;
use std::path::PathBuf;

use crate::domain::RawBar;

use super::provider::{BarSource, DataError};

pub struct CsvDir {
    root: PathBuf,
}

#[derive(Debug, Deserialize)]
struct BarRow {
    date: NaiveDate,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
}

#[derive(Debug, Deserialize)]
struct CapRow {
    symbol: String,
    market_cap: f64,
}

impl CsvDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Parse bar rows from any reader, sort ascending, and drop duplicate
    /// dates (first occurrence wins).
    fn read_bars(reader: impl Read, start: NaiveDate, end: NaiveDate) -> Result<Vec<RawBar>, DataError> {
        let mut rows = csv::Reader::from_reader(reader)
            .deserialize::<BarRow>()
            .collect::<Result<Vec<_>, _>>()?;
        rows.sort_by_key(|row| row.date);
        rows.dedup_by_key(|row| row.date);
        Ok(rows
            .into_iter()
            .filter(|row| start <= row.date && row.date <= end)
            .map(|row| RawBar {
                date: row.date,
                open: row.open,
                high: row.high,
                low: row.low,
                close: row.close,
            })
            .collect())
    }
}

impl BarSource for CsvDir {
    fn name(&self) -> &str {
        "csv-dir"
    }

    fn daily_bars(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<RawBar>, DataError> {
        let path = self.root.join(format!("{symbol}.csv"));
        let file = std::fs::File::open(&path).map_err(|err| {
            if err.kind() == std::io::ErrorKind::NotFound {
                DataError::SymbolNotFound {
                    symbol: symbol.to_string(),
                }
            } else {
                DataError::Io(err)
            }
        })?;
        let bars = Self::read_bars(file, start, end)?;
        if bars.is_empty() {
            return Err(DataError::EmptySeries {
                symbol: symbol.to_string(),
            });
        }
        Ok(bars)
    }

    fn market_cap(&self, symbol: &str) -> Result<Option<f64>, DataError> {
        let path = self.root.join("market_caps.csv");
        let file = match std::fs::File::open(&path) {
            Ok(file) => file,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(DataError::Io(err)),
        };
        for row in csv::Reader::from_reader(file).deserialize::<CapRow>() {
            let row = row?;
            if row.symbol == symbol {
                return Ok(Some(row.market_cap));
            }
        }
        Ok(None)
    }
}
