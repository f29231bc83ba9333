//! Data models for the funding dashboard.
//!
//! This module contains the core data structures shared by the dataset
//! store, the aggregation layer and the view composer: funding records,
//! grouping dimensions and the derived tables produced by aggregation.

use chrono::NaiveDate;
use serde::{Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;

/// Category value used for missing text fields. It groups like any other value.
pub const UNKNOWN: &str = "Unknown";

/// One row of the funding dataset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FundingRecord {
    /// Announcement date.
    pub date: NaiveDate,
    /// Name of the funded startup.
    pub startup: String,
    /// Industry sector.
    pub vertical: String,
    /// Finer-grained sector.
    pub subvertical: String,
    /// City the startup is based in.
    pub city: String,
    /// Funding round label.
    pub round: String,
    /// Funding amount. Zero means undisclosed, not unfunded.
    pub amount: f64,
    /// The investor field exactly as it appeared in the source.
    #[serde(rename = "investors_clean")]
    pub investors_raw: String,
    /// Investor names split out of `investors_raw`.
    #[serde(skip_serializing)]
    pub investors: Vec<String>,
    /// Year of funding.
    pub year: i32,
    /// Month of funding (1-12).
    pub month: u32,
}

impl FundingRecord {
    /// The value of a single-valued dimension, as a grouping key.
    pub fn group_key(&self, dimension: Dimension) -> GroupKey {
        match dimension {
            Dimension::Year => GroupKey::Year(self.year),
            Dimension::YearMonth => GroupKey::YearMonth {
                year: self.year,
                month: self.month,
            },
            Dimension::Startup => GroupKey::Text(self.startup.clone()),
            Dimension::Vertical => GroupKey::Text(self.vertical.clone()),
            Dimension::Subvertical => GroupKey::Text(self.subvertical.clone()),
            Dimension::City => GroupKey::Text(self.city.clone()),
            Dimension::Round => GroupKey::Text(self.round.clone()),
        }
    }

    /// The values held by a text column. Single-valued columns yield one element.
    pub fn values(&self, column: TextColumn) -> Vec<&str> {
        match column {
            TextColumn::Startup => vec![self.startup.as_str()],
            TextColumn::Vertical => vec![self.vertical.as_str()],
            TextColumn::Subvertical => vec![self.subvertical.as_str()],
            TextColumn::City => vec![self.city.as_str()],
            TextColumn::Round => vec![self.round.as_str()],
            TextColumn::Investors => self.investors.iter().map(String::as_str).collect(),
        }
    }
}

/// Single-valued grouping dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dimension {
    Year,
    /// Calendar month within a year.
    YearMonth,
    Startup,
    Vertical,
    Subvertical,
    City,
    Round,
}

impl Dimension {
    /// Column label used in reports.
    pub fn label(&self) -> &'static str {
        match self {
            Dimension::Year => "Year",
            Dimension::YearMonth => "Month-Year",
            Dimension::Startup => "Startup",
            Dimension::Vertical => "Vertical",
            Dimension::Subvertical => "Subvertical",
            Dimension::City => "City",
            Dimension::Round => "Round",
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Text columns that can be exploded into a stream of values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextColumn {
    Startup,
    Vertical,
    Subvertical,
    City,
    Round,
    /// The multi-valued investor list.
    Investors,
}

impl TextColumn {
    pub fn label(&self) -> &'static str {
        match self {
            TextColumn::Startup => "Startup",
            TextColumn::Vertical => "Vertical",
            TextColumn::Subvertical => "Subvertical",
            TextColumn::City => "City",
            TextColumn::Round => "Round",
            TextColumn::Investors => "Investor",
        }
    }
}

/// Key of one group in a derived table.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum GroupKey {
    Year(i32),
    YearMonth { year: i32, month: u32 },
    Text(String),
}

impl GroupKey {
    /// Shorthand for a text key.
    pub fn text(value: impl Into<String>) -> Self {
        GroupKey::Text(value.into())
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupKey::Year(year) => write!(f, "{}", year),
            GroupKey::YearMonth { year, month } => write!(f, "{}-{}", month, year),
            GroupKey::Text(s) => write!(f, "{}", s),
        }
    }
}

impl Serialize for GroupKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Whether a table's values are row counts or summed amounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    Count,
    Amount,
}

/// Sort direction for value-based ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    Ascending,
    #[default]
    Descending,
}

/// One (key, value) pair of a derived table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Entry {
    pub key: GroupKey,
    pub value: f64,
}

/// An ordered sequence of (key, value) pairs produced by aggregation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DerivedTable {
    /// Label of the grouped column.
    pub dimension: &'static str,
    /// What the values measure.
    pub kind: ValueKind,
    /// Entries in table order.
    pub entries: Vec<Entry>,
}

impl DerivedTable {
    /// Creates an empty table.
    pub fn new(dimension: &'static str, kind: ValueKind) -> Self {
        Self {
            dimension,
            kind,
            entries: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Value stored for `key`, if the group exists.
    pub fn get(&self, key: &GroupKey) -> Option<f64> {
        self.entries.iter().find(|e| &e.key == key).map(|e| e.value)
    }

    /// Keys in table order.
    pub fn keys(&self) -> Vec<&GroupKey> {
        self.entries.iter().map(|e| &e.key).collect()
    }

    /// Sum of all values.
    pub fn total(&self) -> f64 {
        self.entries.iter().map(|e| e.value).sum()
    }

    /// Re-orders entries by their natural key order (chronological for dates).
    pub fn sort_by_key(mut self) -> Self {
        self.entries.sort_by(|a, b| a.key.cmp(&b.key));
        self
    }

    /// Re-orders entries by value. Stable: equal values keep their order.
    pub fn sort_by_value(mut self, order: SortOrder) -> Self {
        self.entries.sort_by(|a, b| compare_values(a.value, b.value, order));
        self
    }

    /// Keeps the first `n` entries in table order.
    pub fn head(mut self, n: usize) -> Self {
        self.entries.truncate(n);
        self
    }
}

/// Orders two values so that the preferred one comes first.
pub(crate) fn compare_values(a: f64, b: f64, order: SortOrder) -> Ordering {
    match order {
        SortOrder::Ascending => a.total_cmp(&b),
        SortOrder::Descending => b.total_cmp(&a),
    }
}

/// Narrows the dataset to rows about one startup or one investor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntityFilter {
    /// Exact match on the startup name.
    Startup(String),
    /// Substring containment on the raw investor field. Coarse: "Sequoia"
    /// also matches "Sequoia Capital".
    Investor(String),
}

impl EntityFilter {
    /// Kind of entity, for messages.
    pub fn entity(&self) -> &'static str {
        match self {
            EntityFilter::Startup(_) => "startup",
            EntityFilter::Investor(_) => "investor",
        }
    }

    pub fn name(&self) -> &str {
        match self {
            EntityFilter::Startup(name) | EntityFilter::Investor(name) => name,
        }
    }

    /// Whether `record` belongs to the selected entity.
    pub fn matches(&self, record: &FundingRecord) -> bool {
        match self {
            EntityFilter::Startup(name) => record.startup == *name,
            EntityFilter::Investor(name) => record.investors_raw.contains(name.as_str()),
        }
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    /// Builds a record with sensible defaults for the fields a test ignores.
    pub(crate) fn record(startup: &str, vertical: &str, amount: f64, year: i32) -> FundingRecord {
        FundingRecord {
            date: NaiveDate::from_ymd_opt(year, 1, 15).unwrap(),
            startup: startup.to_string(),
            vertical: vertical.to_string(),
            subvertical: UNKNOWN.to_string(),
            city: "Bengaluru".to_string(),
            round: "Seed".to_string(),
            amount,
            investors_raw: UNKNOWN.to_string(),
            investors: vec![UNKNOWN.to_string()],
            year,
            month: 1,
        }
    }

    /// Replaces the investor field, splitting it the way the loader does.
    pub(crate) fn with_investors(mut record: FundingRecord, raw: &str) -> FundingRecord {
        record.investors_raw = raw.to_string();
        record.investors = raw.split(", ").map(|s| s.trim().to_string()).collect();
        record
    }

    /// The three-row dataset used throughout the aggregation tests.
    pub(crate) fn three_rows() -> Vec<FundingRecord> {
        vec![
            record("A", "Fintech", 10.0, 2020),
            record("A", "Fintech", 0.0, 2021),
            record("B", "Edtech", 5.0, 2020),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    #[test]
    fn test_year_month_key_display_and_order() {
        let march = GroupKey::YearMonth {
            year: 2020,
            month: 3,
        };
        let dec_prior = GroupKey::YearMonth {
            year: 2019,
            month: 12,
        };
        assert_eq!(march.to_string(), "3-2020");
        assert!(dec_prior < march);
    }

    #[test]
    fn test_sort_by_value_is_stable() {
        let mut table = DerivedTable::new("Startup", ValueKind::Amount);
        for (name, value) in [("a", 1.0), ("b", 3.0), ("c", 1.0), ("d", 3.0)] {
            table.entries.push(Entry {
                key: GroupKey::text(name),
                value,
            });
        }

        let sorted = table.sort_by_value(SortOrder::Descending);
        let keys: Vec<String> = sorted.keys().iter().map(|k| k.to_string()).collect();
        assert_eq!(keys, vec!["b", "d", "a", "c"]);
    }

    #[test]
    fn test_investor_filter_is_substring_match() {
        let row = with_investors(record("A", "Fintech", 1.0, 2020), "Sequoia Capital, Accel");

        assert!(EntityFilter::Investor("Sequoia".to_string()).matches(&row));
        assert!(EntityFilter::Investor("Accel".to_string()).matches(&row));
        assert!(!EntityFilter::Investor("Accel India".to_string()).matches(&row));
    }

    #[test]
    fn test_startup_filter_is_exact_match() {
        let row = record("Ola", "Transport", 1.0, 2020);

        assert!(EntityFilter::Startup("Ola".to_string()).matches(&row));
        assert!(!EntityFilter::Startup("Ol".to_string()).matches(&row));
    }

    #[test]
    fn test_values_explodes_only_investors() {
        let row = with_investors(record("A", "Fintech", 1.0, 2020), "X, Y, Z");

        assert_eq!(row.values(TextColumn::Investors), vec!["X", "Y", "Z"]);
        assert_eq!(row.values(TextColumn::Vertical), vec!["Fintech"]);
    }

    #[test]
    fn test_group_key_serializes_as_string() {
        let json = serde_json::to_string(&GroupKey::Year(2021)).unwrap();
        assert_eq!(json, "\"2021\"");
    }
}
