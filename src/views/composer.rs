//! Maps a view request to aggregation queries.
//!
//! Each view is an independent composition over the dataset; nothing is
//! cached between requests.

use crate::analysis::{
    average, count_by, filter_by_entity, recent_n, sum_by, top_investors_for, top_n,
    total_amount, unique_count,
};
use crate::dataset::Dataset;
use crate::error::QueryError;
use crate::models::{DerivedTable, Dimension, EntityFilter, FundingRecord, SortOrder, TextColumn};
use crate::views::{MetricValue, SlotContent, ViewModel, ViewOutcome, ViewRequest, ViewSettings};
use tracing::{debug, warn};

const COLUMN_DESCRIPTIONS: [&str; 10] = [
    "date: Date when the funding was announced.",
    "startup: Name of the funded startup.",
    "vertical: Sector or industry vertical of the startup.",
    "subvertical: Sub-sector or industry sub-vertical of the startup.",
    "city: City where the startup is based.",
    "round: Funding round.",
    "amount: Funding amount.",
    "investors_clean: Name(s) of the investors involved.",
    "year: Year of funding.",
    "month: Month of funding.",
];

const DATA_QUALITY_NOTES: [&str; 4] = [
    "Vertical, Subvertical and City contain entries labeled \"Unknown\" where the original sources had no data; they are kept for transparency.",
    "Funding amounts of 0 stand for undisclosed or unreported amounts, not for no funding.",
    "Investor views match names by substring, so \"Sequoia\" also covers \"Sequoia Capital\".",
    "Most recent investments follow the dataset's row order; no date sort is applied.",
];

/// Build the requested view, turning a missing entity into a not-found outcome.
pub fn compose(dataset: &Dataset, request: &ViewRequest, settings: &ViewSettings) -> ViewOutcome {
    match try_compose(dataset, request, settings) {
        Ok(model) => ViewOutcome::Ready(model),
        Err(QueryError::EntityNotFound { entity, name }) => {
            warn!("No {} matches '{}'", entity, name);
            ViewOutcome::NotFound { entity, name }
        }
        Err(err) => {
            warn!("View unavailable: {}", err);
            ViewOutcome::Unavailable {
                reason: err.to_string(),
            }
        }
    }
}

/// Build the requested view.
pub fn try_compose(
    dataset: &Dataset,
    request: &ViewRequest,
    settings: &ViewSettings,
) -> Result<ViewModel, QueryError> {
    debug!("Composing {:?}", request);

    match request {
        ViewRequest::Overview => Ok(overview(dataset)),
        ViewRequest::Overall => Ok(overall(dataset, settings)),
        ViewRequest::Startup(name) => startup(dataset, name, settings),
        ViewRequest::Investor(name) => investor(dataset, name, settings),
    }
}

/// Highest `n` entries, sorted for display.
fn ranked(table: DerivedTable, n: usize) -> DerivedTable {
    top_n(&table, n, SortOrder::Descending).sort_by_value(SortOrder::Descending)
}

fn metric_or_unavailable(result: Result<f64, QueryError>) -> MetricValue {
    match result {
        Ok(value) => MetricValue::Amount(value),
        Err(err) => {
            debug!("{}", err);
            MetricValue::Unavailable
        }
    }
}

fn overview(dataset: &Dataset) -> ViewModel {
    let mut view = ViewModel::new("overview", "Startup Funding Analysis - Overview");

    view.push("rows", "Rows", SlotContent::Metric(MetricValue::Count(dataset.len())));
    view.push(
        "columns",
        "Columns",
        SlotContent::Metric(MetricValue::Count(dataset.column_count())),
    );
    view.push(
        "skipped_rows",
        "Rows Skipped At Load",
        SlotContent::Metric(MetricValue::Count(dataset.load_summary().skipped.len())),
    );
    view.push(
        "column_names",
        "Column Names",
        SlotContent::Names(dataset.column_names().to_vec()),
    );
    view.push(
        "column_descriptions",
        "Dataset Descriptions",
        SlotContent::Notes(COLUMN_DESCRIPTIONS.iter().map(|s| s.to_string()).collect()),
    );
    view.push(
        "data_quality",
        "Note on Data Quality",
        SlotContent::Notes(DATA_QUALITY_NOTES.iter().map(|s| s.to_string()).collect()),
    );

    view
}

fn overall(dataset: &Dataset, settings: &ViewSettings) -> ViewModel {
    let rows = dataset.all();
    let n = settings.top_n;
    let mut view = ViewModel::new("overall", "Overall Analysis");

    let per_startup = sum_by(&rows, Dimension::Startup);
    let average_investment = average(
        per_startup.entries.iter().map(|e| e.value),
        "average investment",
    );

    view.push(
        "startups_funded",
        "Startups Funded",
        SlotContent::Metric(MetricValue::Count(unique_count(&rows, TextColumn::Startup))),
    );
    view.push(
        "unique_investors",
        "Unique Investors",
        SlotContent::Metric(MetricValue::Count(unique_count(&rows, TextColumn::Investors))),
    );
    view.push(
        "total_investment",
        "Total Investment",
        SlotContent::Metric(MetricValue::Amount(total_amount(&rows))),
    );
    view.push(
        "average_investment",
        "Average Investment",
        SlotContent::Metric(metric_or_unavailable(average_investment)),
    );

    view.push(
        "deals_by_year",
        "Deals Over the Years",
        SlotContent::Table(count_by(&rows, Dimension::Year).sort_by_key()),
    );
    view.push(
        "deals_by_month",
        "Deals Over the Months",
        SlotContent::Table(count_by(&rows, Dimension::YearMonth).sort_by_key()),
    );
    view.push(
        "amount_by_month",
        "Invested Amount Over the Months",
        SlotContent::Table(sum_by(&rows, Dimension::YearMonth).sort_by_key()),
    );
    view.push(
        "top_startups",
        "Maximum Funding Raised By",
        SlotContent::Table(ranked(per_startup, n)),
    );
    view.push(
        "top_verticals",
        format!("Top {} Categories By Funding", n),
        SlotContent::Table(ranked(sum_by(&rows, Dimension::Vertical), n)),
    );
    view.push(
        "top_rounds",
        format!("Top {} Rounds By Funding", n),
        SlotContent::Table(ranked(sum_by(&rows, Dimension::Round), n)),
    );
    view.push(
        "top_cities_by_deals",
        "Deals Location Wise",
        SlotContent::Table(ranked(count_by(&rows, Dimension::City), n)),
    );
    view.push(
        "top_cities_by_amount",
        "Amount Invested By Location",
        SlotContent::Table(ranked(sum_by(&rows, Dimension::City), n)),
    );

    view
}

fn startup(dataset: &Dataset, name: &str, settings: &ViewSettings) -> Result<ViewModel, QueryError> {
    let all = dataset.all();
    let filter = EntityFilter::Startup(name.to_string());
    let rows = filter_by_entity(&all, &filter);

    if rows.is_empty() {
        return Err(QueryError::EntityNotFound {
            entity: filter.entity(),
            name: name.to_string(),
        });
    }

    let n = settings.top_n;
    let mut view = ViewModel::new("startup", name);

    view.push(
        "total_funding",
        "Total Funding Raised",
        SlotContent::Metric(MetricValue::Amount(total_amount(&rows))),
    );

    let investors = top_investors_for(&all, Some(&filter), n);
    view.push(
        "top_investors",
        "Top Investors",
        SlotContent::Names(investors.keys().iter().map(|k| k.to_string()).collect()),
    );
    view.push(
        "top_investor_counts",
        "Investor Appearances",
        SlotContent::Table(investors),
    );

    view.push(
        "top_verticals",
        "Verticals",
        SlotContent::Table(ranked(count_by(&rows, Dimension::Vertical), n)),
    );
    view.push(
        "top_subverticals",
        "Subverticals",
        SlotContent::Table(ranked(count_by(&rows, Dimension::Subvertical), n)),
    );
    view.push(
        "funding_by_round",
        "Funding by Round Type",
        SlotContent::Table(sum_by(&rows, Dimension::Round).sort_by_value(SortOrder::Descending)),
    );
    view.push(
        "funding_by_city",
        "Geographic Funding Focus",
        SlotContent::Table(sum_by(&rows, Dimension::City).sort_by_value(SortOrder::Descending)),
    );

    Ok(view)
}

fn investor(dataset: &Dataset, name: &str, settings: &ViewSettings) -> Result<ViewModel, QueryError> {
    let filter = EntityFilter::Investor(name.to_string());
    let not_found = || QueryError::EntityNotFound {
        entity: filter.entity(),
        name: name.to_string(),
    };

    // An empty pattern would match every row.
    if name.trim().is_empty() {
        return Err(not_found());
    }

    let all = dataset.all();
    let rows = filter_by_entity(&all, &filter);
    if rows.is_empty() {
        return Err(not_found());
    }

    let limit = settings.breakdown_limit;
    let mut view = ViewModel::new("investor", name);

    let recent: Vec<FundingRecord> = recent_n(&all, Some(&filter), settings.recent_n)
        .into_iter()
        .cloned()
        .collect();
    view.push(
        "recent_investments",
        "Most Recent Investments",
        SlotContent::Records(recent),
    );
    view.push(
        "biggest_investments",
        "Biggest Investments",
        SlotContent::Table(ranked(sum_by(&rows, Dimension::Startup), settings.top_n)),
    );
    view.push(
        "sectors",
        "Sectors Invested In",
        SlotContent::Table(sum_by(&rows, Dimension::Vertical).sort_by_key().head(limit)),
    );
    view.push(
        "rounds",
        "Rounds Invested In",
        SlotContent::Table(sum_by(&rows, Dimension::Round).sort_by_key().head(limit)),
    );
    view.push(
        "cities",
        "City Invested In",
        SlotContent::Table(sum_by(&rows, Dimension::City).sort_by_key().head(limit)),
    );
    view.push(
        "yoy_investment",
        "YoY Investment",
        SlotContent::Table(sum_by(&rows, Dimension::Year).sort_by_key()),
    );

    Ok(view)
}
