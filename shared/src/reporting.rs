//! Comparison and aggregation views over snapshot rows

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::models::Item;

/// One (SKU, month) cell of a comparison table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComparisonCell {
    pub sku: String,
    pub month: String,
    pub amount: i64,
    pub is_roll: bool,
}

/// Container counts for selected items across selected months
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComparisonTable {
    cells: BTreeMap<(String, String), (i64, bool)>,
    months: Vec<String>,
}

impl ComparisonTable {
    /// Amount for a pair; pairs outside the selection are `None`
    pub fn get(&self, sku: &str, month: &str) -> Option<i64> {
        self.cells
            .get(&(sku.to_string(), month.to_string()))
            .map(|(amount, _)| *amount)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Cells grouped by SKU, months in the order they were requested
    pub fn cells(&self) -> Vec<ComparisonCell> {
        let skus: BTreeSet<&String> = self.cells.keys().map(|(sku, _)| sku).collect();
        let mut out = Vec::with_capacity(self.cells.len());
        for sku in skus {
            for month in &self.months {
                if let Some((amount, is_roll)) = self.cells.get(&(sku.clone(), month.clone())) {
                    out.push(ComparisonCell {
                        sku: sku.clone(),
                        month: month.clone(),
                        amount: *amount,
                        is_roll: *is_roll,
                    });
                }
            }
        }
        out
    }
}

/// Build the comparison table for `items` x `months` from snapshot `records`.
///
/// Missing pairs resolve to 0. When several rows exist for one pair the
/// first row in `records` wins.
pub fn compare_items_across_months(
    items: &BTreeSet<String>,
    months: &[String],
    records: &[Item],
) -> ComparisonTable {
    let mut found: BTreeMap<(&str, &str), &Item> = BTreeMap::new();
    for record in records {
        found
            .entry((record.sku.as_str(), record.month.as_str()))
            .or_insert(record);
    }

    let mut cells = BTreeMap::new();
    for sku in items {
        for month in months {
            let value = found
                .get(&(sku.as_str(), month.as_str()))
                .map(|item| (item.bundles_boxes_spools, item.is_roll))
                .unwrap_or((0, false));
            cells.insert((sku.clone(), month.clone()), value);
        }
    }

    let mut seen = BTreeSet::new();
    let months = months
        .iter()
        .filter(|m| seen.insert(m.as_str()))
        .cloned()
        .collect();

    ComparisonTable { cells, months }
}

/// Totals for one category
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryTotal {
    pub total_amount: i64,
    pub member_descriptions: BTreeSet<String>,
}

/// Sum container counts and collect unique descriptions per category
pub fn aggregate_by_category(records: &[Item]) -> BTreeMap<String, CategoryTotal> {
    let mut totals: BTreeMap<String, CategoryTotal> = BTreeMap::new();
    for record in records {
        let entry = totals.entry(record.item_type.clone()).or_default();
        entry.total_amount = entry.total_amount.saturating_add(record.bundles_boxes_spools);
        entry.member_descriptions.insert(record.description.clone());
    }
    totals
}

/// Share of the overall container count held by one category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryShare {
    pub category: String,
    pub total_amount: i64,
    pub percent: f64,
}

/// Percentage of total inventory space per category; 0 when the total is 0
pub fn category_shares(totals: &BTreeMap<String, CategoryTotal>) -> Vec<CategoryShare> {
    // Summed as f64 so very large counts cannot overflow
    let grand_total: f64 = totals.values().map(|t| t.total_amount as f64).sum();
    totals
        .iter()
        .map(|(category, total)| CategoryShare {
            category: category.clone(),
            total_amount: total.total_amount,
            percent: if grand_total == 0.0 {
                0.0
            } else {
                total.total_amount as f64 / grand_total * 100.0
            },
        })
        .collect()
}
