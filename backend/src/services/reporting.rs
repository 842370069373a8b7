//! Comparison and category reports over the item master

use std::collections::BTreeSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use shared::{aggregate_by_category, category_shares, compare_items_across_months, ComparisonCell};

use super::item_master::parse_month;
use crate::error::{AppError, AppResult};
use crate::repositories::InventoryStore;

/// Reporting service for the comparison and inventory-space views
#[derive(Clone)]
pub struct ReportingService {
    store: Arc<dyn InventoryStore>,
}

/// Container counts of the selected items across the selected months
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComparisonReport {
    pub items: Vec<String>,
    pub months: Vec<String>,
    pub cells: Vec<ComparisonCell>,
}

/// One category of the inventory-space view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryBreakdown {
    pub category: String,
    pub total_amount: i64,
    pub percent: f64,
    pub member_descriptions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorySummary {
    pub month: String,
    pub total_amount: i64,
    pub categories: Vec<CategoryBreakdown>,
}

impl ReportingService {
    /// Create a new ReportingService instance
    pub fn new(store: Arc<dyn InventoryStore>) -> Self {
        Self { store }
    }

    /// Build the (SKU, month) comparison table; missing pairs read 0
    pub async fn compare_items_across_months(
        &self,
        items: &[String],
        months: &[String],
    ) -> AppResult<ComparisonReport> {
        let skus: BTreeSet<String> = items
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
        if skus.is_empty() {
            return Err(AppError::Validation {
                field: "items".to_string(),
                message: "Select at least one item".to_string(),
            });
        }

        let months = months
            .iter()
            .map(|m| parse_month(m).map(|label| label.to_string()))
            .collect::<AppResult<Vec<_>>>()?;
        if months.is_empty() {
            return Err(AppError::Validation {
                field: "months".to_string(),
                message: "Select at least one month".to_string(),
            });
        }

        let sku_list: Vec<String> = skus.iter().cloned().collect();
        let records = self.store.items_for_selection(&sku_list, &months).await?;
        let table = compare_items_across_months(&skus, &months, &records);

        tracing::debug!(
            items = sku_list.len(),
            months = months.len(),
            rows = records.len(),
            "Built comparison table"
        );

        let mut seen = BTreeSet::new();
        let months = months.into_iter().filter(|m| seen.insert(m.clone())).collect();

        Ok(ComparisonReport {
            items: sku_list,
            months,
            cells: table.cells(),
        })
    }

    /// Container totals and share of inventory space per category for a month
    pub async fn category_summary(&self, month: &str) -> AppResult<CategorySummary> {
        let month = parse_month(month)?.to_string();
        let records = self.store.items_for_month(&month).await?;

        let totals = aggregate_by_category(&records);
        let shares = category_shares(&totals);
        let total_amount = shares
            .iter()
            .map(|s| s.total_amount)
            .fold(0i64, i64::saturating_add);

        let categories = shares
            .into_iter()
            .map(|share| CategoryBreakdown {
                member_descriptions: totals
                    .get(&share.category)
                    .map(|t| t.member_descriptions.iter().cloned().collect())
                    .unwrap_or_default(),
                category: share.category,
                total_amount: share.total_amount,
                percent: share.percent,
            })
            .collect();

        Ok(CategorySummary {
            month,
            total_amount,
            categories,
        })
    }
}
