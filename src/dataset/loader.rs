//! CSV ingest for the funding dataset.
//!
//! The header must carry every required column; a missing column or a
//! structurally broken record fails the whole load. Bad field values are
//! handled per row: unusable rows are skipped with a warning, bad amounts are
//! coerced to the undisclosed sentinel `0`, empty categories become `Unknown`.

use crate::dataset::Dataset;
use crate::error::LoadError;
use crate::models::{FundingRecord, UNKNOWN};
use chrono::{Datelike, NaiveDate, NaiveDateTime};
use csv::StringRecord;
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info, warn};

/// Columns every dataset must provide.
pub const REQUIRED_COLUMNS: [&str; 10] = [
    "date",
    "startup",
    "vertical",
    "subvertical",
    "city",
    "round",
    "amount",
    "investors_clean",
    "year",
    "month",
];

const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%d/%m/%Y"];
const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// How to read the source file.
#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// CSV field delimiter.
    pub delimiter: u8,
    /// Separator between names in the investor column.
    pub investor_delimiter: String,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            investor_delimiter: ", ".to_string(),
        }
    }
}

impl From<&crate::config::DatasetConfig> for LoadOptions {
    fn from(config: &crate::config::DatasetConfig) -> Self {
        Self {
            delimiter: config.delimiter_byte(),
            investor_delimiter: config.investor_delimiter.clone(),
        }
    }
}

/// A row that was dropped during load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRow {
    /// 1-indexed line in the source file.
    pub line: u64,
    pub reason: String,
}

/// Outcome counters for a load.
#[derive(Debug, Clone, Default)]
pub struct LoadSummary {
    pub rows_read: usize,
    pub rows_loaded: usize,
    /// Rows whose amount was replaced by `0`.
    pub coerced_amounts: usize,
    pub skipped: Vec<SkippedRow>,
}

/// Position of each required column in the header.
struct ColumnIndex {
    date: usize,
    startup: usize,
    vertical: usize,
    subvertical: usize,
    city: usize,
    round: usize,
    amount: usize,
    investors: usize,
    year: usize,
    month: usize,
}

impl ColumnIndex {
    fn resolve(headers: &StringRecord) -> Result<Self, LoadError> {
        let positions: HashMap<String, usize> = headers
            .iter()
            .enumerate()
            .map(|(i, name)| (name.trim().to_lowercase(), i))
            .collect();

        let missing: Vec<String> = REQUIRED_COLUMNS
            .iter()
            .filter(|c| !positions.contains_key(**c))
            .map(|c| c.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(LoadError::MissingColumns(missing));
        }

        let at = |name: &str| positions[name];
        Ok(Self {
            date: at("date"),
            startup: at("startup"),
            vertical: at("vertical"),
            subvertical: at("subvertical"),
            city: at("city"),
            round: at("round"),
            amount: at("amount"),
            investors: at("investors_clean"),
            year: at("year"),
            month: at("month"),
        })
    }
}

/// Open `path` and load it.
pub fn load_path(path: &Path, options: &LoadOptions) -> Result<Dataset, LoadError> {
    let file = File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    info!("Loading dataset from {}", path.display());
    read_dataset(file, options)
}

/// Parse CSV text into a dataset.
pub fn read_dataset<R: Read>(reader: R, options: &LoadOptions) -> Result<Dataset, LoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(options.delimiter)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader.headers()?.clone();
    let index = ColumnIndex::resolve(&headers)?;

    let columns: Vec<String> = headers.iter().map(|h| h.trim().to_string()).collect();
    for extra in columns
        .iter()
        .filter(|c| !REQUIRED_COLUMNS.contains(&c.to_lowercase().as_str()))
    {
        debug!("Ignoring extra column '{}'", extra);
    }

    let mut records = Vec::new();
    let mut summary = LoadSummary::default();

    for result in reader.records() {
        let row = result?;
        summary.rows_read += 1;
        let line = row.position().map(|p| p.line()).unwrap_or(0);

        match parse_row(&row, &index, options) {
            Ok((record, coerced)) => {
                if coerced {
                    summary.coerced_amounts += 1;
                }
                records.push(record);
            }
            Err(reason) => {
                warn!("Skipping line {}: {}", line, reason);
                summary.skipped.push(SkippedRow { line, reason });
            }
        }
    }

    summary.rows_loaded = records.len();
    info!(
        "Loaded {} of {} rows ({} skipped, {} amounts treated as undisclosed)",
        summary.rows_loaded,
        summary.rows_read,
        summary.skipped.len(),
        summary.coerced_amounts
    );

    Ok(Dataset::from_parts(records, columns, summary))
}

/// Turn one CSV row into a record. The flag reports whether the amount was coerced.
fn parse_row(
    row: &StringRecord,
    index: &ColumnIndex,
    options: &LoadOptions,
) -> Result<(FundingRecord, bool), String> {
    let field = |i: usize| row.get(i).unwrap_or("").trim();

    let startup = field(index.startup);
    if startup.is_empty() {
        return Err("empty startup name".to_string());
    }

    let raw_date = field(index.date);
    let date = parse_date(raw_date).ok_or_else(|| format!("unparseable date '{}'", raw_date))?;

    let (amount, coerced) = match parse_amount(field(index.amount)) {
        Some(amount) => (amount, false),
        None => {
            debug!(
                "Treating amount '{}' for {} as undisclosed",
                field(index.amount),
                startup
            );
            (0.0, true)
        }
    };

    let year = field(index.year)
        .parse::<i32>()
        .unwrap_or_else(|_| date.year());
    let month = field(index.month)
        .parse::<u32>()
        .ok()
        .filter(|m| (1..=12).contains(m))
        .unwrap_or_else(|| date.month());

    let investors_raw = or_unknown(field(index.investors));
    let investors = split_investors(&investors_raw, &options.investor_delimiter);

    let record = FundingRecord {
        date,
        startup: startup.to_string(),
        vertical: or_unknown(field(index.vertical)),
        subvertical: or_unknown(field(index.subvertical)),
        city: or_unknown(field(index.city)),
        round: or_unknown(field(index.round)),
        amount,
        investors_raw,
        investors,
        year,
        month,
    };

    Ok((record, coerced))
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(s, format).ok())
        .or_else(|| {
            NaiveDateTime::parse_from_str(s, DATETIME_FORMAT)
                .ok()
                .map(|dt| dt.date())
        })
}

/// A usable amount, or `None` when the value must fall back to undisclosed.
fn parse_amount(s: &str) -> Option<f64> {
    s.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && *v >= 0.0)
}

fn or_unknown(s: &str) -> String {
    if s.is_empty() {
        UNKNOWN.to_string()
    } else {
        s.to_string()
    }
}

/// Split a delimited investor field into trimmed, non-empty names.
pub fn split_investors(raw: &str, delimiter: &str) -> Vec<String> {
    if delimiter.is_empty() {
        return vec![raw.trim().to_string()];
    }

    raw.split(delimiter)
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const HEADER: &str = "date,startup,vertical,subvertical,city,round,amount,investors_clean,year,month\n";

    fn load(body: &str) -> Result<Dataset, LoadError> {
        let csv = format!("{}{}", HEADER, body);
        Dataset::from_reader(csv.as_bytes(), &LoadOptions::default())
    }

    #[test]
    fn test_load_well_formed_rows() {
        let dataset = load(
            "2020-01-09,BYJU'S,Edtech,Online Learning,Bengaluru,Series F,200,\"Tiger Global, General Atlantic\",2020,1\n\
             2020-02-13,Shuttl,Transport,Bus Aggregator,Gurgaon,Series C,8,\"Sequoia Capital, Amazon\",2020,2\n",
        )
        .unwrap();

        assert_eq!(dataset.len(), 2);
        let first = dataset.records().next().unwrap();
        assert_eq!(first.startup, "BYJU'S");
        assert_eq!(first.amount, 200.0);
        assert_eq!(first.investors, vec!["Tiger Global", "General Atlantic"]);
        assert_eq!(first.investors_raw, "Tiger Global, General Atlantic");
        assert_eq!(first.date, NaiveDate::from_ymd_opt(2020, 1, 9).unwrap());
    }

    #[test]
    fn test_missing_columns_fail_the_load() {
        let csv = "date,startup,vertical,amount\n2020-01-01,A,Fintech,1\n";
        let err = read_dataset(csv.as_bytes(), &LoadOptions::default()).unwrap_err();

        match err {
            LoadError::MissingColumns(missing) => {
                assert!(missing.contains(&"investors_clean".to_string()));
                assert!(missing.contains(&"city".to_string()));
                assert!(!missing.contains(&"amount".to_string()));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_wrong_field_count_fails_the_load() {
        let err = load("2020-01-01,A,Fintech\n").unwrap_err();
        assert!(matches!(err, LoadError::Csv(_)));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = load_path(Path::new("/definitely/not/here.csv"), &LoadOptions::default())
            .unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            "{}2021-05-01,Zomato,Food,Delivery,Gurugram,Pre-IPO,150,Kora,2021,5\n",
            HEADER
        )
        .unwrap();

        let dataset = load_path(file.path(), &LoadOptions::default()).unwrap();
        assert_eq!(dataset.len(), 1);
        assert_eq!(dataset.column_count(), 10);
    }

    #[test]
    fn test_bad_amount_is_coerced_to_zero() {
        let dataset = load(
            "2020-01-01,A,Fintech,Payments,Mumbai,Seed,n/a,X,2020,1\n\
             2020-01-02,B,Fintech,Payments,Mumbai,Seed,-4,X,2020,1\n",
        )
        .unwrap();

        assert_eq!(dataset.len(), 2);
        assert!(dataset.records().all(|r| r.amount == 0.0));
        assert_eq!(dataset.load_summary().coerced_amounts, 2);
    }

    #[test]
    fn test_bad_date_skips_only_that_row() {
        let dataset = load(
            "not-a-date,A,Fintech,Payments,Mumbai,Seed,1,X,2020,1\n\
             2020-01-02,B,Fintech,Payments,Mumbai,Seed,2,X,2020,1\n",
        )
        .unwrap();

        assert_eq!(dataset.len(), 1);
        let summary = dataset.load_summary();
        assert_eq!(summary.rows_read, 2);
        assert_eq!(summary.skipped.len(), 1);
        assert_eq!(summary.skipped[0].line, 2);
    }

    #[test]
    fn test_empty_categories_become_unknown() {
        let dataset = load("2020-01-01,A,,,,,5,,2020,1\n").unwrap();
        let record = dataset.records().next().unwrap();

        assert_eq!(record.vertical, UNKNOWN);
        assert_eq!(record.subvertical, UNKNOWN);
        assert_eq!(record.city, UNKNOWN);
        assert_eq!(record.round, UNKNOWN);
        assert_eq!(record.investors, vec![UNKNOWN]);
    }

    #[test]
    fn test_year_and_month_fall_back_to_date() {
        let dataset = load("15/08/2019,A,Fintech,Payments,Mumbai,Seed,5,X,,13\n").unwrap();
        let record = dataset.records().next().unwrap();

        assert_eq!(record.year, 2019);
        assert_eq!(record.month, 8);
    }

    #[test]
    fn test_split_investors_trims_and_keeps_every_name() {
        assert_eq!(
            split_investors("Accel,  Sequoia Capital , Kalaari", ", "),
            vec!["Accel", "Sequoia Capital", "Kalaari"]
        );
        assert_eq!(split_investors("A, , B", ", "), vec!["A", "B"]);
    }
}
