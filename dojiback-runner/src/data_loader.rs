//! CSV bar loading with timezone conversion.
//!
//! Expected header (exact names, extra columns ignored):
//! `Timestamp, Open, High, Low, Close, Volume`.
//!
//! Timestamp handling:
//! 1. Values with an explicit offset are taken as the instant they name
//! 2. Naive values are localized in `from_tz`; DST gaps and overlaps are errors
//! 3. Every instant is converted to `to_tz` and stored with that fixed offset
//!
//! The bar sequence is not sorted or otherwise repaired here. Ordering is
//! checked by the engine before a run.

use std::io::Read;
use std::path::Path;

use chrono::offset::LocalResult;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeZone};
use chrono_tz::Tz;
use serde::Deserialize;
use thiserror::Error;
use tracing::{info, warn};

use dojiback_core::domain::Bar;

use crate::config::DataConfig;

/// Columns every input file must carry.
pub const REQUIRED_COLUMNS: [&str; 6] = ["Timestamp", "Open", "High", "Low", "Close", "Volume"];

const NAIVE_DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];

/// Errors from the data loading layer.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to open {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("missing required column '{0}'")]
    MissingColumn(String),

    #[error("unknown timezone '{0}'")]
    UnknownTimezone(String),

    #[error("row {row}: cannot parse timestamp '{value}'")]
    BadTimestamp { row: usize, value: String },

    #[error("row {row}: local time '{value}' is {reason} in {tz}")]
    LocalTime {
        row: usize,
        value: String,
        tz: String,
        reason: &'static str,
    },
}

/// Options controlling how timestamps are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataOptions {
    /// Zone naive timestamps are written in.
    pub from_tz: Tz,
    /// Zone every timestamp is converted to.
    pub to_tz: Tz,
}

impl Default for DataOptions {
    fn default() -> Self {
        Self {
            from_tz: chrono_tz::US::Central,
            to_tz: chrono_tz::Asia::Kolkata,
        }
    }
}

impl DataOptions {
    /// Options from IANA zone names, e.g. `"US/Central"`.
    pub fn from_names(from_tz: &str, to_tz: &str) -> Result<Self, LoadError> {
        Ok(Self {
            from_tz: parse_tz(from_tz)?,
            to_tz: parse_tz(to_tz)?,
        })
    }

    pub fn from_config(config: &DataConfig) -> Result<Self, LoadError> {
        Self::from_names(&config.from_tz, &config.to_tz)
    }
}

/// Parsed bars plus their fingerprint.
#[derive(Debug, Clone)]
pub struct LoadedData {
    pub bars: Vec<Bar>,
    /// BLAKE3 over every timestamp and OHLCV value.
    pub dataset_hash: String,
    /// Rows whose high/low do not bound open and close. Kept as read.
    pub inconsistent_rows: usize,
}

#[derive(Debug, Deserialize)]
struct CsvRow {
    #[serde(rename = "Timestamp")]
    timestamp: String,
    #[serde(rename = "Open")]
    open: f64,
    #[serde(rename = "High")]
    high: f64,
    #[serde(rename = "Low")]
    low: f64,
    #[serde(rename = "Close")]
    close: f64,
    #[serde(rename = "Volume")]
    volume: f64,
}

/// Load bars from a CSV file on disk.
pub fn load_csv(path: &Path, opts: &DataOptions) -> Result<LoadedData, LoadError> {
    let file = std::fs::File::open(path).map_err(|source| LoadError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let loaded = parse_csv(file, opts)?;
    info!(
        path = %path.display(),
        bars = loaded.bars.len(),
        from_tz = %opts.from_tz,
        to_tz = %opts.to_tz,
        "loaded CSV"
    );
    Ok(loaded)
}

/// Parse bars from any CSV source (file, request body, test string).
pub fn parse_csv<R: Read>(reader: R, opts: &DataOptions) -> Result<LoadedData, LoadError> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    for column in REQUIRED_COLUMNS {
        if !headers.iter().any(|h| h == column) {
            return Err(LoadError::MissingColumn(column.to_string()));
        }
    }

    let mut bars = Vec::new();
    let mut inconsistent_rows = 0;
    for (i, row) in rdr.deserialize::<CsvRow>().enumerate() {
        let row = row?;
        let timestamp = parse_timestamp(&row.timestamp, i + 1, opts)?;
        let bar = Bar {
            timestamp,
            open: row.open,
            high: row.high,
            low: row.low,
            close: row.close,
            volume: row.volume,
        };
        if !bar.is_sane() {
            inconsistent_rows += 1;
            warn!(row = i + 1, value = %row.timestamp, "OHLC values are inconsistent");
        }
        bars.push(bar);
    }

    let dataset_hash = compute_dataset_hash(&bars);
    Ok(LoadedData {
        bars,
        dataset_hash,
        inconsistent_rows,
    })
}

fn parse_tz(name: &str) -> Result<Tz, LoadError> {
    name.parse::<Tz>()
        .map_err(|_| LoadError::UnknownTimezone(name.to_string()))
}

/// Resolve one timestamp cell to an instant in `opts.to_tz`.
fn parse_timestamp(
    value: &str,
    row: usize,
    opts: &DataOptions,
) -> Result<DateTime<FixedOffset>, LoadError> {
    if let Some(instant) = parse_with_offset(value) {
        return Ok(instant.with_timezone(&opts.to_tz).fixed_offset());
    }

    let naive = parse_naive(value).ok_or_else(|| LoadError::BadTimestamp {
        row,
        value: value.to_string(),
    })?;

    let local_error = |reason| LoadError::LocalTime {
        row,
        value: value.to_string(),
        tz: opts.from_tz.name().to_string(),
        reason,
    };
    let local = match opts.from_tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) => dt,
        LocalResult::Ambiguous(..) => return Err(local_error("ambiguous")),
        LocalResult::None => return Err(local_error("nonexistent")),
    };
    Ok(local.with_timezone(&opts.to_tz).fixed_offset())
}

fn parse_with_offset(value: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(value)
        .or_else(|_| DateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S%:z"))
        .or_else(|_| DateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S%z"))
        .ok()
}

fn parse_naive(value: &str) -> Option<NaiveDateTime> {
    NAIVE_DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// Deterministic BLAKE3 hash over all bar data.
pub fn compute_dataset_hash(bars: &[Bar]) -> String {
    let mut hasher = blake3::Hasher::new();
    for bar in bars {
        hasher.update(bar.timestamp.to_rfc3339().as_bytes());
        hasher.update(&bar.open.to_le_bytes());
        hasher.update(&bar.high.to_le_bytes());
        hasher.update(&bar.low.to_le_bytes());
        hasher.update(&bar.close.to_le_bytes());
        hasher.update(&bar.volume.to_le_bytes());
    }
    hasher.finalize().to_hex().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    const SAMPLE: &str = "\
Timestamp,Open,High,Low,Close,Volume
2024-01-02 09:30:00,100.0,101.0,99.5,100.5,1200
2024-01-02 09:31:00,100.5,101.5,100.0,101.0,900
";

    #[test]
    fn naive_central_converts_to_kolkata() {
        let loaded = parse_csv(SAMPLE.as_bytes(), &DataOptions::default()).unwrap();
        assert_eq!(loaded.bars.len(), 2);
        let ts = loaded.bars[0].timestamp;
        // 09:30 CST (UTC-6) is 15:30 UTC, 21:00 IST.
        assert_eq!(ts.offset().local_minus_utc(), 5 * 3600 + 1800);
        assert_eq!((ts.hour(), ts.minute()), (21, 0));
        assert_eq!(ts.day(), 2);
        assert_eq!(loaded.bars[1].volume, 900.0);
    }

    #[test]
    fn offset_timestamps_keep_their_instant() {
        let csv = "Timestamp,Open,High,Low,Close,Volume\n2024-01-02T15:30:00+00:00,1,1,1,1,1\n";
        let loaded = parse_csv(csv.as_bytes(), &DataOptions::default()).unwrap();
        let ts = loaded.bars[0].timestamp;
        assert_eq!((ts.hour(), ts.minute()), (21, 0));
    }

    #[test]
    fn accepted_naive_formats() {
        for value in ["2024-01-02 09:30:00", "2024-01-02T09:30:00", "2024-01-02 09:30"] {
            assert!(parse_naive(value).is_some(), "{value}");
        }
        let midnight = parse_naive("2024-01-02").unwrap();
        assert_eq!((midnight.hour(), midnight.minute()), (0, 0));
        assert!(parse_naive("02/01/2024").is_none());
    }

    #[test]
    fn extra_columns_ignored() {
        let csv = "Symbol,Timestamp,Open,High,Low,Close,Volume\nNIFTY,2024-01-02 09:30:00,1,2,0.5,1.5,10\n";
        let loaded = parse_csv(csv.as_bytes(), &DataOptions::default()).unwrap();
        assert_eq!(loaded.bars[0].high, 2.0);
    }

    #[test]
    fn missing_column_reported() {
        let csv = "Time,Open,High,Low,Close,Volume\n2024-01-02 09:30:00,1,1,1,1,1\n";
        let err = parse_csv(csv.as_bytes(), &DataOptions::default()).unwrap_err();
        assert!(matches!(err, LoadError::MissingColumn(ref c) if c == "Timestamp"));

        let csv = "Timestamp,Open,High,Low,Close\n2024-01-02 09:30:00,1,1,1,1\n";
        let err = parse_csv(csv.as_bytes(), &DataOptions::default()).unwrap_err();
        assert!(matches!(err, LoadError::MissingColumn(ref c) if c == "Volume"));
    }

    #[test]
    fn unknown_timezone_rejected() {
        let err = DataOptions::from_names("Mars/Olympus", "UTC").unwrap_err();
        assert!(matches!(err, LoadError::UnknownTimezone(ref z) if z == "Mars/Olympus"));
        assert!(DataOptions::from_names("US/Central", "Asia/Kolkata").is_ok());
    }

    #[test]
    fn dst_gap_and_overlap_are_errors() {
        let opts = DataOptions::default();
        // US spring-forward 2024-03-10 02:00 -> 03:00.
        let err = parse_timestamp("2024-03-10 02:30:00", 1, &opts).unwrap_err();
        assert!(matches!(err, LoadError::LocalTime { reason: "nonexistent", .. }));
        // US fall-back 2024-11-03 01:00-02:00 happens twice.
        let err = parse_timestamp("2024-11-03 01:30:00", 7, &opts).unwrap_err();
        assert!(matches!(err, LoadError::LocalTime { row: 7, reason: "ambiguous", .. }));
    }

    #[test]
    fn bad_timestamp_names_row() {
        let csv = "Timestamp,Open,High,Low,Close,Volume\n2024-01-02 09:30:00,1,1,1,1,1\nyesterday,1,1,1,1,1\n";
        let err = parse_csv(csv.as_bytes(), &DataOptions::default()).unwrap_err();
        assert!(matches!(err, LoadError::BadTimestamp { row: 2, .. }));
    }

    #[test]
    fn inconsistent_rows_counted_but_kept() {
        let csv = "Timestamp,Open,High,Low,Close,Volume\n\
2024-01-02 09:30:00,100,101,99,100.5,10\n\
2024-01-02 09:31:00,100,99,101,100.5,10\n\
2024-01-02 09:32:00,100,100.2,99,100.5,10\n";
        let loaded = parse_csv(csv.as_bytes(), &DataOptions::default()).unwrap();
        assert_eq!(loaded.bars.len(), 3);
        assert_eq!(loaded.inconsistent_rows, 2);
        assert_eq!(loaded.bars[1].high, 99.0);

        let clean = parse_csv(SAMPLE.as_bytes(), &DataOptions::default()).unwrap();
        assert_eq!(clean.inconsistent_rows, 0);
    }

    #[test]
    fn non_numeric_price_is_csv_error() {
        let csv = "Timestamp,Open,High,Low,Close,Volume\n2024-01-02 09:30:00,abc,1,1,1,1\n";
        let err = parse_csv(csv.as_bytes(), &DataOptions::default()).unwrap_err();
        assert!(matches!(err, LoadError::Csv(_)));
    }

    #[test]
    fn dataset_hash_is_deterministic() {
        let a = parse_csv(SAMPLE.as_bytes(), &DataOptions::default()).unwrap();
        let b = parse_csv(SAMPLE.as_bytes(), &DataOptions::default()).unwrap();
        assert_eq!(a.dataset_hash, b.dataset_hash);

        let utc = DataOptions::from_names("UTC", "UTC").unwrap();
        let c = parse_csv(SAMPLE.as_bytes(), &utc).unwrap();
        assert_ne!(a.dataset_hash, c.dataset_hash);
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_csv(Path::new("/nonexistent/bars.csv"), &DataOptions::default()).unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
    }
}
