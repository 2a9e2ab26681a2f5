//! CSV import provider — offline price history from `<dir>/<SYMBOL>.csv`.
//!
//! Expected header: `date,open,high,low,close,volume` with ISO dates. Empty
//! numeric cells become NaN (close) or 0 (volume); ingest drops bars without a
//! close.

use super::provider::{DataError, DataProvider, DataSource, FetchResult, RawBar};
use chrono::NaiveDate;
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize)]
struct CsvRow {
    date: NaiveDate,
    open: Option<f64>,
    high: Option<f64>,
    low: Option<f64>,
    close: Option<f64>,
    volume: Option<f64>,
}

/// Read every bar from a CSV file.
pub fn read_csv_bars(path: &Path) -> Result<Vec<RawBar>, DataError> {
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_path(path)?;
    let mut bars = Vec::new();
    for row in reader.deserialize::<CsvRow>() {
        let row = row?;
        bars.push(RawBar {
            date: row.date,
            open: row.open.unwrap_or(f64::NAN),
            high: row.high.unwrap_or(f64::NAN),
            low: row.low.unwrap_or(f64::NAN),
            close: row.close.unwrap_or(f64::NAN),
            volume: row.volume.map(|v| v.max(0.0) as u64).unwrap_or(0),
        });
    }
    Ok(bars)
}

pub struct CsvProvider {
    dir: PathBuf,
}

impl CsvProvider {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, symbol: &str) -> PathBuf {
        self.dir.join(format!("{symbol}.csv"))
    }
}

impl DataProvider for CsvProvider {
    fn name(&self) -> &str {
        "csv_import"
    }

    fn fetch(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<FetchResult, DataError> {
        let path = self.path_for(symbol);
        if !path.exists() {
            return Err(DataError::SymbolNotFound {
                symbol: symbol.to_string(),
            });
        }
        let bars = read_csv_bars(&path)?
            .into_iter()
            .filter(|b| b.date >= start && b.date <= end)
            .collect();
        Ok(FetchResult {
            symbol: symbol.to_string(),
            bars,
            source: DataSource::CsvImport,
        })
    }

    fn is_available(&self) -> bool {
        self.dir.is_dir()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_csv(dir: &Path, symbol: &str, body: &str) {
        let mut f = std::fs::File::create(dir.join(format!("{symbol}.csv"))).unwrap();
        f.write_all(body.as_bytes()).unwrap();
    }

    fn jan(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    #[test]
    fn reads_and_filters_range() {
        let dir = tempfile::tempdir().unwrap();
        write_csv(
            dir.path(),
            "INFY.NS",
            "date,open,high,low,close,volume\n\
             2024-01-02,100,101,99,100.5,1000\n\
             2024-01-03,100.5,102,100,,900\n\
             2024-01-04,101,103,100,102,\n",
        );
        let provider = CsvProvider::new(dir.path());
        assert!(provider.is_available());

        let result = provider.fetch("INFY.NS", jan(1), jan(3)).unwrap();
        assert_eq!(result.source, DataSource::CsvImport);
        assert_eq!(result.bars.len(), 2);
        assert_eq!(result.bars[0].close, 100.5);
        assert!(result.bars[1].close.is_nan());

        let all = provider.fetch("INFY.NS", jan(1), jan(31)).unwrap();
        assert_eq!(all.bars[2].volume, 0);
    }

    #[test]
    fn missing_file_is_symbol_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let provider = CsvProvider::new(dir.path());
        let err = provider.fetch("NOPE", jan(1), jan(31)).unwrap_err();
        assert!(matches!(err, DataError::SymbolNotFound { .. }));
    }
}
