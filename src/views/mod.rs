//! View models and the composer that builds them.
//!
//! A view model is a named bundle of slots (metrics, derived tables, record
//! lists, name lists, notes) that a renderer can lay out without knowing how
//! any of it was computed.

pub mod composer;

use crate::config::ReportConfig;
use crate::models::{DerivedTable, FundingRecord};
use serde::Serialize;

pub use composer::{compose, try_compose};

/// What the user asked to see.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewRequest {
    Overview,
    Overall,
    Startup(String),
    Investor(String),
}

/// Sizing knobs for the composed views.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewSettings {
    /// Entries kept in top-N rankings.
    pub top_n: usize,
    /// Investments listed under "most recent".
    pub recent_n: usize,
    /// Groups kept in investor breakdowns.
    pub breakdown_limit: usize,
}

impl Default for ViewSettings {
    fn default() -> Self {
        Self {
            top_n: 5,
            recent_n: 5,
            breakdown_limit: 10,
        }
    }
}

impl From<&ReportConfig> for ViewSettings {
    fn from(config: &ReportConfig) -> Self {
        Self {
            top_n: config.top_n,
            recent_n: config.recent_n,
            breakdown_limit: config.breakdown_limit,
        }
    }
}

/// A scalar metric.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum MetricValue {
    Count(usize),
    Amount(f64),
    /// No data to compute from; shown as "N/A".
    Unavailable,
}

/// The payload of one slot.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum SlotContent {
    Metric(MetricValue),
    Table(DerivedTable),
    Records(Vec<FundingRecord>),
    Names(Vec<String>),
    Notes(Vec<String>),
}

/// One named section of a view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Slot {
    /// Stable identifier, e.g. `deals_by_year`.
    pub name: &'static str,
    /// Human-readable heading.
    pub title: String,
    pub content: SlotContent,
}

/// Everything needed to render one view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewModel {
    pub view: &'static str,
    pub title: String,
    pub slots: Vec<Slot>,
}

impl ViewModel {
    pub fn new(view: &'static str, title: impl Into<String>) -> Self {
        Self {
            view,
            title: title.into(),
            slots: Vec::new(),
        }
    }

    /// Append a slot.
    pub fn push(&mut self, name: &'static str, title: impl Into<String>, content: SlotContent) {
        self.slots.push(Slot {
            name,
            title: title.into(),
            content,
        });
    }

    pub fn slot(&self, name: &str) -> Option<&Slot> {
        self.slots.iter().find(|s| s.name == name)
    }

    pub fn metric(&self, name: &str) -> Option<MetricValue> {
        match self.slot(name)?.content {
            SlotContent::Metric(value) => Some(value),
            _ => None,
        }
    }

    pub fn table(&self, name: &str) -> Option<&DerivedTable> {
        match &self.slot(name)?.content {
            SlotContent::Table(table) => Some(table),
            _ => None,
        }
    }

    pub fn records(&self, name: &str) -> Option<&[FundingRecord]> {
        match &self.slot(name)?.content {
            SlotContent::Records(records) => Some(records),
            _ => None,
        }
    }

    pub fn names(&self, name: &str) -> Option<&[String]> {
        match &self.slot(name)?.content {
            SlotContent::Names(names) | SlotContent::Notes(names) => Some(names),
            _ => None,
        }
    }
}

/// The composer's answer to a request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ViewOutcome {
    Ready(ViewModel),
    /// The requested startup or investor has no rows.
    NotFound { entity: &'static str, name: String },
    /// The view could not be computed for another reason.
    Unavailable { reason: String },
}
