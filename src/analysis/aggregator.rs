//! Aggregation queries over the funding dataset.
//!
//! Every function here is pure: it reads a [`Selection`] of rows and returns
//! a freshly built result. Group-bys keep groups in the order they are first
//! encountered; callers re-sort for display.

use crate::dataset::{Dataset, Selection};
use crate::error::QueryError;
use crate::models::{
    compare_values, DerivedTable, Dimension, EntityFilter, Entry, FundingRecord, GroupKey,
    SortOrder, TextColumn, ValueKind,
};
use std::collections::{BTreeSet, HashMap, HashSet};

/// Count rows per distinct value of `dimension`.
pub fn count_by(rows: &Selection<'_>, dimension: Dimension) -> DerivedTable {
    group_by(rows, dimension, ValueKind::Count, |_| 1.0)
}

/// Sum amounts per distinct value of `dimension`.
///
/// Groups whose amounts are all undisclosed still appear, with a value of `0`.
pub fn sum_by(rows: &Selection<'_>, dimension: Dimension) -> DerivedTable {
    group_by(rows, dimension, ValueKind::Amount, |r| r.amount)
}

fn group_by<F>(rows: &Selection<'_>, dimension: Dimension, kind: ValueKind, measure: F) -> DerivedTable
where
    F: Fn(&FundingRecord) -> f64,
{
    let mut table = DerivedTable::new(dimension.label(), kind);
    let mut positions: HashMap<GroupKey, usize> = HashMap::new();

    for record in rows.iter() {
        let key = record.group_key(dimension);
        match positions.get(&key) {
            Some(&i) => table.entries[i].value += measure(record),
            None => {
                positions.insert(key.clone(), table.entries.len());
                table.entries.push(Entry {
                    key,
                    value: measure(record),
                });
            }
        }
    }

    table
}

/// Count occurrences of each distinct value, in first-encountered order.
pub fn count_values<'a, I>(values: I, dimension: &'static str) -> DerivedTable
where
    I: IntoIterator<Item = &'a str>,
{
    let mut table = DerivedTable::new(dimension, ValueKind::Count);
    let mut positions: HashMap<&'a str, usize> = HashMap::new();

    for value in values {
        match positions.get(value) {
            Some(&i) => table.entries[i].value += 1.0,
            None => {
                positions.insert(value, table.entries.len());
                table.entries.push(Entry {
                    key: GroupKey::text(value),
                    value: 1.0,
                });
            }
        }
    }

    table
}

/// Keep the `n` entries with the highest (or lowest) values.
///
/// Ties go to the earlier entry. Kept entries stay in their input order, so
/// asking for at least as many entries as the table holds returns it as is.
pub fn top_n(table: &DerivedTable, n: usize, order: SortOrder) -> DerivedTable {
    if n >= table.len() {
        return table.clone();
    }

    let mut ranked: Vec<usize> = (0..table.len()).collect();
    ranked.sort_by(|&a, &b| compare_values(table.entries[a].value, table.entries[b].value, order));
    ranked.truncate(n);
    ranked.sort_unstable();

    DerivedTable {
        dimension: table.dimension,
        kind: table.kind,
        entries: ranked.into_iter().map(|i| table.entries[i].clone()).collect(),
    }
}

/// Every value of `column` across the rows, one element per occurrence.
pub fn explode_multivalued<'a>(rows: &Selection<'a>, column: TextColumn) -> Vec<&'a str> {
    rows.iter().flat_map(|r| r.values(column)).collect()
}

/// Number of distinct values of `column` after exploding.
pub fn unique_count(rows: &Selection<'_>, column: TextColumn) -> usize {
    explode_multivalued(rows, column)
        .into_iter()
        .collect::<HashSet<_>>()
        .len()
}

/// Rows belonging to the selected startup or investor.
pub fn filter_by_entity<'a>(rows: &Selection<'a>, filter: &EntityFilter) -> Selection<'a> {
    rows.filter(|r| filter.matches(r))
}

fn narrow<'a>(rows: &Selection<'a>, filter: Option<&EntityFilter>) -> Selection<'a> {
    match filter {
        Some(filter) => filter_by_entity(rows, filter),
        None => rows.clone(),
    }
}

/// The `n` most frequent investors among the filtered rows.
pub fn top_investors_for(rows: &Selection<'_>, filter: Option<&EntityFilter>, n: usize) -> DerivedTable {
    let selected = narrow(rows, filter);
    let investors = explode_multivalued(&selected, TextColumn::Investors);

    count_values(investors, TextColumn::Investors.label())
        .sort_by_value(SortOrder::Descending)
        .head(n)
}

/// The first `n` filtered rows, in source order. No date sort is applied.
pub fn recent_n<'a>(rows: &Selection<'a>, filter: Option<&EntityFilter>, n: usize) -> Vec<&'a FundingRecord> {
    narrow(rows, filter).iter().take(n).collect()
}

/// Sum of every amount in the rows.
pub fn total_amount(rows: &Selection<'_>) -> f64 {
    rows.iter().map(|r| r.amount).sum()
}

/// Arithmetic mean; undefined over zero values.
pub fn average<I>(values: I, what: &'static str) -> Result<f64, QueryError>
where
    I: IntoIterator<Item = f64>,
{
    let (sum, count) = values
        .into_iter()
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));

    if count == 0 {
        return Err(QueryError::DivisionUndefined { what });
    }

    Ok(sum / count as f64)
}

/// Distinct startup names, sorted.
pub fn list_startups(dataset: &Dataset) -> Vec<String> {
    dataset
        .records()
        .map(|r| r.startup.as_str())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(String::from)
        .collect()
}

/// Distinct investor names after splitting the investor field, sorted.
pub fn list_investors(dataset: &Dataset) -> Vec<String> {
    dataset
        .records()
        .flat_map(|r| r.investors.iter().map(String::as_str))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fixtures::{record, three_rows, with_investors};

    const ALL_DIMENSIONS: [Dimension; 7] = [
        Dimension::Year,
        Dimension::YearMonth,
        Dimension::Startup,
        Dimension::Vertical,
        Dimension::Subvertical,
        Dimension::City,
        Dimension::Round,
    ];

    fn investor_rows() -> Vec<FundingRecord> {
        vec![
            with_investors(record("A", "Fintech", 10.0, 2020), "Sequoia Capital, Accel"),
            with_investors(record("B", "Edtech", 5.0, 2020), "Accel, Kalaari Capital"),
            with_investors(record("C", "Fintech", 0.0, 2021), "Accel"),
            with_investors(record("D", "Health", 7.0, 2021), "Sequoia Capital"),
        ]
    }

    #[test]
    fn test_three_row_scenario() {
        let dataset = Dataset::from_records(three_rows());
        let rows = dataset.all();

        let by_year = sum_by(&rows, Dimension::Year);
        assert_eq!(by_year.len(), 2);
        assert_eq!(by_year.get(&GroupKey::Year(2020)), Some(15.0));
        assert_eq!(by_year.get(&GroupKey::Year(2021)), Some(0.0));

        let by_vertical = count_by(&rows, Dimension::Vertical);
        assert_eq!(by_vertical.get(&GroupKey::text("Fintech")), Some(2.0));
        assert_eq!(by_vertical.get(&GroupKey::text("Edtech")), Some(1.0));

        let top = top_n(&sum_by(&rows, Dimension::Startup), 1, SortOrder::Descending);
        assert_eq!(top.len(), 1);
        assert_eq!(top.get(&GroupKey::text("A")), Some(10.0));
    }

    #[test]
    fn test_sum_and_count_invariants_hold_for_every_dimension() {
        let dataset = Dataset::from_records(investor_rows());
        let rows = dataset.all();
        let total = total_amount(&rows);

        for dimension in ALL_DIMENSIONS {
            assert_eq!(sum_by(&rows, dimension).total(), total, "{dimension}");
            assert_eq!(
                count_by(&rows, dimension).total(),
                dataset.len() as f64,
                "{dimension}"
            );
        }
    }

    #[test]
    fn test_all_zero_group_is_kept() {
        let dataset = Dataset::from_records(vec![
            record("A", "Fintech", 0.0, 2020),
            record("B", "Fintech", 0.0, 2020),
            record("C", "Edtech", 3.0, 2020),
        ]);

        let by_vertical = sum_by(&dataset.all(), Dimension::Vertical);
        assert_eq!(by_vertical.get(&GroupKey::text("Fintech")), Some(0.0));
    }

    #[test]
    fn test_groups_keep_first_encountered_order() {
        let dataset = Dataset::from_records(vec![
            record("A", "Health", 1.0, 2021),
            record("B", "Edtech", 1.0, 2019),
            record("C", "Health", 1.0, 2020),
        ]);

        let by_vertical = count_by(&dataset.all(), Dimension::Vertical);
        let keys: Vec<String> = by_vertical.keys().iter().map(|k| k.to_string()).collect();
        assert_eq!(keys, vec!["Health", "Edtech"]);

        let by_year = count_by(&dataset.all(), Dimension::Year).sort_by_key();
        assert_eq!(by_year.keys(), vec![&GroupKey::Year(2019), &GroupKey::Year(2020), &GroupKey::Year(2021)]);
    }

    #[test]
    fn test_unknown_is_an_ordinary_group() {
        let dataset = Dataset::from_records(vec![
            record("A", "Unknown", 2.0, 2020),
            record("B", "Fintech", 1.0, 2020),
        ]);

        let by_vertical = sum_by(&dataset.all(), Dimension::Vertical);
        assert_eq!(by_vertical.get(&GroupKey::text("Unknown")), Some(2.0));
    }

    #[test]
    fn test_empty_selection_gives_empty_tables() {
        let dataset = Dataset::from_records(three_rows());
        let none = dataset.all().filter(|r| r.year == 1999);

        assert!(count_by(&none, Dimension::Year).is_empty());
        assert!(sum_by(&none, Dimension::City).is_empty());
        assert!(top_investors_for(&none, None, 5).is_empty());
    }

    #[test]
    fn test_top_n_is_stable_when_n_covers_the_table() {
        let dataset = Dataset::from_records(investor_rows());
        let table = sum_by(&dataset.all(), Dimension::Startup);

        let once = top_n(&table, table.len(), SortOrder::Descending);
        let twice = top_n(&once, 10, SortOrder::Descending);
        assert_eq!(twice, table);
    }

    #[test]
    fn test_top_n_prefers_earlier_entry_on_ties() {
        let dataset = Dataset::from_records(vec![
            record("A", "Fintech", 4.0, 2020),
            record("B", "Fintech", 9.0, 2020),
            record("C", "Fintech", 4.0, 2020),
        ]);
        let table = sum_by(&dataset.all(), Dimension::Startup);

        let top = top_n(&table, 2, SortOrder::Descending);
        assert_eq!(top.keys(), vec![&GroupKey::text("A"), &GroupKey::text("B")]);

        let bottom = top_n(&table, 1, SortOrder::Ascending);
        assert_eq!(bottom.keys(), vec![&GroupKey::text("A")]);
    }

    #[test]
    fn test_explode_preserves_multiplicity() {
        let dataset = Dataset::from_records(investor_rows());
        let exploded = explode_multivalued(&dataset.all(), TextColumn::Investors);

        assert_eq!(exploded.len(), 6);
        assert_eq!(exploded.iter().filter(|n| **n == "Accel").count(), 3);
    }

    #[test]
    fn test_unique_count_uses_exploded_values() {
        let dataset = Dataset::from_records(investor_rows());
        let rows = dataset.all();

        // Four distinct raw strings, three distinct investors.
        assert_eq!(unique_count(&rows, TextColumn::Investors), 3);
        assert_eq!(unique_count(&rows, TextColumn::Startup), 4);
        assert_eq!(unique_count(&rows, TextColumn::Vertical), 3);
    }

    #[test]
    fn test_investor_filter_substring_scenario() {
        let dataset = Dataset::from_records(investor_rows());
        let rows = dataset.all();

        let sequoia = filter_by_entity(&rows, &EntityFilter::Investor("Sequoia".to_string()));
        assert_eq!(sequoia.len(), 2);

        let accel_india = filter_by_entity(&rows, &EntityFilter::Investor("Accel India".to_string()));
        assert!(accel_india.is_empty());
    }

    #[test]
    fn test_startup_filter_is_exact() {
        let dataset = Dataset::from_records(three_rows());
        let a = filter_by_entity(&dataset.all(), &EntityFilter::Startup("A".to_string()));

        assert_eq!(a.len(), 2);
        assert_eq!(total_amount(&a), 10.0);
    }

    #[test]
    fn test_top_investors_for_counts_appearances() {
        let dataset = Dataset::from_records(investor_rows());

        let top = top_investors_for(&dataset.all(), None, 2);
        assert_eq!(top.keys(), vec![&GroupKey::text("Accel"), &GroupKey::text("Sequoia Capital")]);
        assert_eq!(top.get(&GroupKey::text("Accel")), Some(3.0));

        let filter = EntityFilter::Startup("B".to_string());
        let for_b = top_investors_for(&dataset.all(), Some(&filter), 5);
        assert_eq!(for_b.len(), 2);
    }

    #[test]
    fn test_recent_n_follows_row_order() {
        let mut rows = investor_rows();
        // Out of date order on purpose; row order wins.
        rows[0].date = chrono::NaiveDate::from_ymd_opt(2015, 1, 1).unwrap();
        let dataset = Dataset::from_records(rows);
        let filter = EntityFilter::Investor("Accel".to_string());

        let recent = recent_n(&dataset.all(), Some(&filter), 2);
        let startups: Vec<&str> = recent.iter().map(|r| r.startup.as_str()).collect();
        assert_eq!(startups, vec!["A", "B"]);

        assert_eq!(recent_n(&dataset.all(), None, 10).len(), 4);
    }

    #[test]
    fn test_average_over_nothing_is_undefined() {
        assert_eq!(
            average(Vec::<f64>::new(), "average investment"),
            Err(QueryError::DivisionUndefined {
                what: "average investment"
            })
        );
        assert_eq!(average(vec![2.0, 4.0], "x"), Ok(3.0));
    }

    #[test]
    fn test_selection_lists_are_sorted_and_distinct() {
        let dataset = Dataset::from_records(investor_rows());

        assert_eq!(list_startups(&dataset), vec!["A", "B", "C", "D"]);
        assert_eq!(
            list_investors(&dataset),
            vec!["Accel", "Kalaari Capital", "Sequoia Capital"]
        );
    }
}
