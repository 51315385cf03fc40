//! Data models for procurement analysis.
//!
//! This module contains the core data structures shared by the loader,
//! the aggregator, the answer collector and the report generator.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

/// One procurement line item, as read from the input CSV.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub supplier: String,
    pub item_category: String,
    pub quantity: f64,
    pub unit_price: f64,
}

impl Record {
    /// Quantity × unit price. Never stored back on the record.
    pub fn line_amount(&self) -> f64 {
        self.quantity * self.unit_price
    }
}

/// Names of the manually computed metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKey {
    TotalRecords,
    TotalAmount,
    DistinctSuppliers,
    DistinctCategories,
    MeanUnitPrice,
    SupplierTotalAmount,
    CategoryMeanUnitPrice,
    MaxOrderAmount,
    MinOrderAmount,
    MedianOrderAmount,
}

/// A scalar or keyed-scalar metric result.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MetricValue {
    Count(usize),
    Amount(f64),
    /// Key/value pairs in first-seen key order.
    Keyed(Vec<(String, f64)>),
}

impl fmt::Display for MetricValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricValue::Count(n) => write!(f, "{}", n),
            MetricValue::Amount(v) => write!(f, "{:.2}", v),
            MetricValue::Keyed(pairs) => {
                let body = pairs
                    .iter()
                    .map(|(key, value)| format!("{}: {:.2}", key, value))
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "{{{}}}", body)
            }
        }
    }
}

/// The fixed set of statistics computed once per run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateReport {
    pub total_records: usize,
    pub total_amount: f64,
    pub distinct_suppliers: usize,
    pub distinct_categories: usize,
    pub mean_unit_price: f64,
    pub supplier_total_amount: Vec<(String, f64)>,
    pub category_mean_unit_price: Vec<(String, f64)>,
    pub max_order_amount: f64,
    pub min_order_amount: f64,
    pub median_order_amount: f64,
}

impl AggregateReport {
    /// Look up a metric by key.
    pub fn metric(&self, key: MetricKey) -> MetricValue {
        match key {
            MetricKey::TotalRecords => MetricValue::Count(self.total_records),
            MetricKey::TotalAmount => MetricValue::Amount(self.total_amount),
            MetricKey::DistinctSuppliers => MetricValue::Count(self.distinct_suppliers),
            MetricKey::DistinctCategories => MetricValue::Count(self.distinct_categories),
            MetricKey::MeanUnitPrice => MetricValue::Amount(self.mean_unit_price),
            MetricKey::SupplierTotalAmount => {
                MetricValue::Keyed(self.supplier_total_amount.clone())
            }
            MetricKey::CategoryMeanUnitPrice => {
                MetricValue::Keyed(self.category_mean_unit_price.clone())
            }
            MetricKey::MaxOrderAmount => MetricValue::Amount(self.max_order_amount),
            MetricKey::MinOrderAmount => MetricValue::Amount(self.min_order_amount),
            MetricKey::MedianOrderAmount => MetricValue::Amount(self.median_order_amount),
        }
    }
}

/// A single question asked of the answer provider.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuestionEntry {
    /// 1-based position within its section.
    pub index: usize,
    pub question: String,
    /// Metric to print as the manual cross-check, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metric: Option<MetricKey>,
}

/// Report section kind; decides the file name in split mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionKind {
    Basic,
    Difficult,
    Trend,
}

impl SectionKind {
    /// Output file name used when each section is written separately.
    pub fn file_name(&self) -> &'static str {
        match self {
            SectionKind::Basic => "basic_analysis_results.txt",
            SectionKind::Difficult => "difficult_analysis_results.txt",
            SectionKind::Trend => "trend_analysis_results.txt",
        }
    }
}

/// An ordered group of questions under one title.
#[derive(Debug, Clone, Serialize)]
pub struct Section {
    pub kind: SectionKind,
    pub title: String,
    pub entries: Vec<QuestionEntry>,
}

/// A question together with the text that goes on its answer line.
#[derive(Debug, Clone, Serialize)]
pub struct AnsweredQuestion {
    pub entry: QuestionEntry,
    pub answer: String,
    /// True when `answer` is a provider error message.
    pub failed: bool,
}

/// A section whose questions have all been answered, in order.
#[derive(Debug, Clone, Serialize)]
pub struct AnsweredSection {
    pub kind: SectionKind,
    pub title: String,
    pub answers: Vec<AnsweredQuestion>,
}

impl AnsweredSection {
    /// Number of questions whose answer is an error message.
    pub fn failed_count(&self) -> usize {
        self.answers.iter().filter(|a| a.failed).count()
    }
}

/// Metadata about a run, included in the JSON report.
#[derive(Debug, Clone, Serialize)]
pub struct ReportMetadata {
    pub dataset_path: String,
    pub generated_at: DateTime<Utc>,
    pub model_used: String,
    pub total_records: usize,
    pub total_questions: usize,
    pub failed_answers: usize,
    pub duration_seconds: f64,
}

/// Complete result of one analysis run.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub metadata: ReportMetadata,
    pub aggregates: AggregateReport,
    pub sections: Vec<AnsweredSection>,
}
