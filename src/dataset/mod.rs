//! In-memory dataset store.
//!
//! The dataset is loaded once from a CSV file and is read-only afterwards.
//! Queries borrow rows through a [`Selection`], so filtering never copies
//! records.

pub mod loader;

use crate::error::LoadError;
use crate::models::FundingRecord;
use std::path::Path;

pub use loader::{LoadOptions, LoadSummary, SkippedRow, REQUIRED_COLUMNS};

/// The full funding dataset, in source row order.
#[derive(Debug, Clone)]
pub struct Dataset {
    records: Vec<FundingRecord>,
    columns: Vec<String>,
    summary: LoadSummary,
}

impl Dataset {
    /// Load the dataset from a CSV file.
    pub fn load(path: &Path, options: &LoadOptions) -> Result<Self, LoadError> {
        loader::load_path(path, options)
    }

    /// Load the dataset from any reader producing CSV text.
    pub fn from_reader<R: std::io::Read>(reader: R, options: &LoadOptions) -> Result<Self, LoadError> {
        loader::read_dataset(reader, options)
    }

    /// Build a dataset from records already in memory.
    pub fn from_records(records: Vec<FundingRecord>) -> Self {
        let summary = LoadSummary {
            rows_read: records.len(),
            rows_loaded: records.len(),
            ..LoadSummary::default()
        };

        Self {
            records,
            columns: REQUIRED_COLUMNS.iter().map(|c| c.to_string()).collect(),
            summary,
        }
    }

    pub(crate) fn from_parts(records: Vec<FundingRecord>, columns: Vec<String>, summary: LoadSummary) -> Self {
        Self {
            records,
            columns,
            summary,
        }
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Column names as they appeared in the source header.
    pub fn column_names(&self) -> &[String] {
        &self.columns
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Full scan over the records in source order.
    pub fn records(&self) -> impl Iterator<Item = &FundingRecord> {
        self.records.iter()
    }

    /// Every row, as a selection.
    pub fn all(&self) -> Selection<'_> {
        self.records.iter().collect()
    }

    /// What happened while the dataset was loaded.
    pub fn load_summary(&self) -> &LoadSummary {
        &self.summary
    }
}

/// A borrowed, ordered subset of dataset rows.
#[derive(Debug, Clone, Default)]
pub struct Selection<'a> {
    rows: Vec<&'a FundingRecord>,
}

impl<'a> Selection<'a> {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows in order.
    pub fn iter(&self) -> impl Iterator<Item = &'a FundingRecord> + '_ {
        self.rows.iter().copied()
    }

    /// Rows satisfying `predicate`, order preserved.
    pub fn filter<F>(&self, predicate: F) -> Selection<'a>
    where
        F: Fn(&FundingRecord) -> bool,
    {
        self.iter().filter(|r| predicate(r)).collect()
    }
}

impl<'a> FromIterator<&'a FundingRecord> for Selection<'a> {
    fn from_iter<I: IntoIterator<Item = &'a FundingRecord>>(iter: I) -> Self {
        Self {
            rows: iter.into_iter().collect(),
        }
    }
}
