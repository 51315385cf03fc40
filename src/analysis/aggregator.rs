//! Descriptive statistics over procurement records.
//!
//! This module computes the [`AggregateReport`] that is printed next to the
//! AI answers as a manual cross-check.

use crate::errors::InsightError;
use crate::models::{AggregateReport, Record};
use std::collections::{HashMap, HashSet};

/// Compute every metric of the aggregate report.
///
/// Fails with [`InsightError::Data`] on an empty record set, where mean and
/// median are undefined.
pub fn compute_aggregates(records: &[Record]) -> Result<AggregateReport, InsightError> {
    if records.is_empty() {
        return Err(InsightError::Data(
            "cannot compute statistics over an empty dataset".to_string(),
        ));
    }

    let count = records.len() as f64;
    let amounts: Vec<f64> = records.iter().map(Record::line_amount).collect();

    let total_amount: f64 = amounts.iter().sum();
    let mean_unit_price = records.iter().map(|r| r.unit_price).sum::<f64>() / count;

    let distinct_suppliers = records
        .iter()
        .map(|r| r.supplier.as_str())
        .collect::<HashSet<_>>()
        .len();
    let distinct_categories = records
        .iter()
        .map(|r| r.item_category.as_str())
        .collect::<HashSet<_>>()
        .len();

    let supplier_total_amount: Vec<(String, f64)> = group_in_order(records, |r| &r.supplier)
        .into_iter()
        .map(|(supplier, group)| {
            let total: f64 = group.iter().map(|r| r.line_amount()).sum();
            (supplier, total)
        })
        .collect();

    let by_category = group_in_order(records, |r| &r.item_category);
    let category_mean_unit_price: Vec<(String, f64)> = by_category
        .into_iter()
        .map(|(category, group)| {
            let mean = group.iter().map(|r| r.unit_price).sum::<f64>() / group.len() as f64;
            (category, mean)
        })
        .collect();

    let max_order_amount = amounts.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let min_order_amount = amounts.iter().copied().fold(f64::INFINITY, f64::min);

    Ok(AggregateReport {
        total_records: records.len(),
        total_amount,
        distinct_suppliers,
        distinct_categories,
        mean_unit_price,
        supplier_total_amount,
        category_mean_unit_price,
        max_order_amount,
        min_order_amount,
        median_order_amount: median(&amounts)?,
    })
}

/// Median of a sample: the middle value for odd sizes, the mean of the two
/// middle values for even sizes.
pub fn median(values: &[f64]) -> Result<f64, InsightError> {
    if values.is_empty() {
        return Err(InsightError::Data(
            "median of an empty sample is undefined".to_string(),
        ));
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Ok((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Ok(sorted[mid])
    }
}

/// Partition records by key, keeping groups in first-seen key order.
fn group_in_order<'a, F>(records: &'a [Record], key: F) -> Vec<(String, Vec<&'a Record>)>
where
    F: Fn(&Record) -> &String,
{
    let mut positions: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<(String, Vec<&Record>)> = Vec::new();

    for record in records {
        let k = key(record);
        match positions.get(k.as_str()) {
            Some(&idx) => groups[idx].1.push(record),
            None => {
                positions.insert(k.as_str(), groups.len());
                groups.push((k.clone(), vec![record]));
            }
        }
    }

    groups
}
