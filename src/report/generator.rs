//! Markdown and JSON report generation.
//!
//! This module renders composed views. It never queries the dataset itself.

use crate::models::{DerivedTable, FundingRecord, ValueKind};
use crate::views::{MetricValue, Slot, SlotContent, ViewModel, ViewOutcome};
use anyhow::Result;

/// Generate a complete Markdown report for a composed view.
pub fn generate_markdown_report(outcome: &ViewOutcome, currency_unit: &str) -> String {
    match outcome {
        ViewOutcome::Ready(view) => generate_view_markdown(view, currency_unit),
        ViewOutcome::NotFound { entity, name } => {
            let mut output = String::new();
            output.push_str("# Not Found\n\n");
            output.push_str(&format!(
                "No {} named **{}** appears in the dataset. Use `--list {}s` to see valid names.\n\n",
                entity, name, entity
            ));
            output.push_str(&generate_footer());
            output
        }
        ViewOutcome::Unavailable { reason } => {
            let mut output = String::new();
            output.push_str("# Unavailable\n\n");
            output.push_str(&format!("{}\n\n", reason));
            output.push_str(&generate_footer());
            output
        }
    }
}

fn generate_view_markdown(view: &ViewModel, currency_unit: &str) -> String {
    let mut output = String::new();

    output.push_str(&format!("# {}\n\n", view.title));

    // Metrics first, then everything else in slot order
    output.push_str(&generate_metrics_section(&view.slots, currency_unit));

    for slot in &view.slots {
        let section = match &slot.content {
            SlotContent::Metric(_) => continue,
            SlotContent::Table(table) => generate_table_section(table, currency_unit),
            SlotContent::Records(records) => generate_records_section(records, currency_unit),
            SlotContent::Names(names) => generate_numbered_list(names),
            SlotContent::Notes(notes) => generate_bullet_list(notes),
        };
        output.push_str(&format!("## {}\n\n", slot.title));
        output.push_str(&section);
    }

    output.push_str(&generate_footer());

    output
}

/// Generate the key metrics section.
fn generate_metrics_section(slots: &[Slot], currency_unit: &str) -> String {
    let metrics: Vec<(&str, MetricValue)> = slots
        .iter()
        .filter_map(|slot| match slot.content {
            SlotContent::Metric(value) => Some((slot.title.as_str(), value)),
            _ => None,
        })
        .collect();

    if metrics.is_empty() {
        return String::new();
    }

    let mut section = String::new();
    section.push_str("## Key Metrics\n\n");
    for (title, value) in metrics {
        section.push_str(&format!(
            "- **{}:** {}\n",
            title,
            format_metric(value, currency_unit)
        ));
    }
    section.push('\n');

    section
}

fn generate_table_section(table: &DerivedTable, currency_unit: &str) -> String {
    if table.is_empty() {
        return "_No data._\n\n".to_string();
    }

    let mut section = String::new();
    let value_header = match table.kind {
        ValueKind::Count => "Count".to_string(),
        ValueKind::Amount => format!("Amount ({})", currency_unit),
    };

    section.push_str(&format!("| {} | {} |\n", table.dimension, value_header));
    section.push_str("|:---|---:|\n");
    for entry in &table.entries {
        section.push_str(&format!(
            "| {} | {} |\n",
            escape_cell(&entry.key.to_string()),
            format_value(entry.value, table.kind)
        ));
    }
    section.push('\n');

    section
}

fn generate_records_section(records: &[FundingRecord], currency_unit: &str) -> String {
    if records.is_empty() {
        return "_No data._\n\n".to_string();
    }

    let mut section = String::new();
    section.push_str(&format!(
        "| Date | Startup | Vertical | City | Round | Amount ({}) |\n",
        currency_unit
    ));
    section.push_str("|:---|:---|:---|:---|:---|---:|\n");
    for record in records {
        section.push_str(&format!(
            "| {} | {} | {} | {} | {} | {} |\n",
            record.date.format("%Y-%m-%d"),
            escape_cell(&record.startup),
            escape_cell(&record.vertical),
            escape_cell(&record.city),
            escape_cell(&record.round),
            format_value(record.amount, ValueKind::Amount)
        ));
    }
    section.push('\n');

    section
}

fn generate_numbered_list(items: &[String]) -> String {
    if items.is_empty() {
        return "_No data._\n\n".to_string();
    }

    let mut section = String::new();
    for (i, item) in items.iter().enumerate() {
        section.push_str(&format!("{}. {}\n", i + 1, item));
    }
    section.push('\n');

    section
}

fn generate_bullet_list(items: &[String]) -> String {
    let mut section = String::new();
    for item in items {
        section.push_str(&format!("- {}\n", item));
    }
    section.push('\n');

    section
}

/// Generate the report footer.
fn generate_footer() -> String {
    let mut footer = String::new();

    footer.push_str("---\n\n");
    footer.push_str("*Report generated by fundscope*\n");

    footer
}

fn format_metric(value: MetricValue, currency_unit: &str) -> String {
    match value {
        MetricValue::Count(count) => count.to_string(),
        MetricValue::Amount(amount) => format!("{:.2} {}", amount, currency_unit),
        MetricValue::Unavailable => "N/A".to_string(),
    }
}

fn format_value(value: f64, kind: ValueKind) -> String {
    match kind {
        ValueKind::Count => format!("{:.0}", value),
        ValueKind::Amount => format!("{:.2}", value),
    }
}

/// Keep user data from breaking table layout.
fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|")
}

/// Generate a JSON report.
pub fn generate_json_report(outcome: &ViewOutcome) -> Result<String> {
    serde_json::to_string_pretty(outcome).map_err(Into::into)
}
