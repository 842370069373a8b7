//! Adjustment ledger service: running balances per SKU

use std::sync::Arc;

use shared::validate_adjustment;

use crate::error::AppResult;
use crate::models::{Adjustment, AdjustmentLogEntry, AdjustmentRequest, StockPosition};
use crate::repositories::InventoryStore;

/// Ledger service for reading balances and appending adjustments
#[derive(Clone)]
pub struct LedgerService {
    store: Arc<dyn InventoryStore>,
}

impl LedgerService {
    /// Create a new LedgerService instance
    pub fn new(store: Arc<dyn InventoryStore>) -> Self {
        Self { store }
    }

    /// Balance after the most recent adjustment, or 0 for an unseen SKU
    pub async fn get_current_balance(&self, sku: &str) -> AppResult<i64> {
        let latest = self.store.latest_adjustment(sku.trim()).await?;
        Ok(latest.map(|entry| entry.amount_after_change).unwrap_or(0))
    }

    /// Units per container of the most recent adjustment, or 0
    pub async fn get_units_per_container(&self, sku: &str) -> AppResult<i64> {
        let latest = self.store.latest_adjustment(sku.trim()).await?;
        Ok(latest.map(|entry| entry.units_per_box).unwrap_or(0))
    }

    /// Balance, units per container and total units in one read
    pub async fn get_stock_position(&self, sku: &str) -> AppResult<StockPosition> {
        let sku = sku.trim();
        let latest = self.store.latest_adjustment(sku).await?;
        Ok(StockPosition::from_latest(sku, latest.as_ref()))
    }

    /// Append an adjustment on top of the current balance
    pub async fn record_adjustment(&self, request: AdjustmentRequest) -> AppResult<Adjustment> {
        // Reject bad input before touching the store
        validate_adjustment(&request)?;

        let entry = self.store.append_adjustment(&request).await?;

        tracing::info!(
            sku = %entry.sku,
            delta = entry.amount_change,
            before = entry.amount_before_change,
            after = entry.amount_after_change,
            total_units = entry.new_total_units,
            "Recorded stock adjustment"
        );

        Ok(entry)
    }

    /// Adjustment log, oldest first
    pub async fn get_history(&self, sku: &str) -> AppResult<Vec<AdjustmentLogEntry>> {
        let history = self.store.adjustment_history(sku.trim()).await?;
        tracing::debug!(sku = sku.trim(), entries = history.len(), "Loaded adjustment history");
        Ok(history.iter().map(Adjustment::to_log_entry).collect())
    }
}
