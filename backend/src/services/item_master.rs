//! Item master service: monthly snapshots and item descriptors

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use shared::validate_snapshot;

use crate::config::DuplicateSnapshotPolicy;
use crate::error::{AppError, AppResult};
use crate::models::{Item, ItemDescriptor, MonthLabel, NewItem};
use crate::repositories::InventoryStore;

/// Item master service for recording end-of-month counts
#[derive(Clone)]
pub struct ItemMasterService {
    store: Arc<dyn InventoryStore>,
    policy: DuplicateSnapshotPolicy,
}

/// Input for an end-of-month count.
///
/// Descriptor fields left out are copied from the latest snapshot of the SKU.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SubmitSnapshotInput {
    pub sku: String,
    pub month: String,
    pub description: Option<String>,
    #[serde(alias = "category")]
    pub item_type: Option<String>,
    pub count_details: Option<String>,
    pub vendor: Option<String>,
    #[serde(default)]
    pub pallets: i64,
    #[serde(default)]
    pub units_pieces_each: i64,
    #[serde(default)]
    pub bundles_boxes_spools: i64,
    #[serde(default)]
    pub is_roll: bool,
}

/// Confirmation returned after a snapshot is stored
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotReceipt {
    pub id: i64,
    pub sku: String,
    pub description: String,
    pub month: String,
}

/// Pre-filled values for the end-of-month form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotDraft {
    pub sku: String,
    pub descriptor: ItemDescriptor,
    /// Current ledger balance
    pub container_count: i64,
    /// Current ledger total units
    pub units_each: i64,
    pub is_roll: bool,
}

impl ItemMasterService {
    /// Create a new ItemMasterService instance
    pub fn new(store: Arc<dyn InventoryStore>, policy: DuplicateSnapshotPolicy) -> Self {
        Self { store, policy }
    }

    /// Descriptor of the most recent snapshot; empty for an unseen SKU
    pub async fn get_latest_descriptor(&self, sku: &str) -> AppResult<ItemDescriptor> {
        let latest = self.store.latest_item(sku.trim()).await?;
        Ok(latest.as_ref().map(ItemDescriptor::from).unwrap_or_default())
    }

    /// Descriptor from the item master, counts from the ledger
    pub async fn get_snapshot_draft(&self, sku: &str) -> AppResult<SnapshotDraft> {
        let sku = sku.trim();
        let latest_item = self.store.latest_item(sku).await?;
        let latest_entry = self.store.latest_adjustment(sku).await?;

        let is_roll = match (&latest_entry, &latest_item) {
            (Some(entry), _) => entry.is_roll,
            (None, Some(item)) => item.is_roll,
            (None, None) => false,
        };

        Ok(SnapshotDraft {
            sku: sku.to_string(),
            descriptor: latest_item
                .as_ref()
                .map(ItemDescriptor::from)
                .unwrap_or_default(),
            container_count: latest_entry.as_ref().map_or(0, |e| e.amount_after_change),
            units_each: latest_entry.as_ref().map_or(0, |e| e.new_total_units),
            is_roll,
        })
    }

    /// Validate and store one end-of-month count
    pub async fn submit_monthly_snapshot(
        &self,
        input: SubmitSnapshotInput,
    ) -> AppResult<SnapshotReceipt> {
        let sku = input.sku.trim().to_string();

        let needs_descriptor = input.description.is_none()
            || input.item_type.is_none()
            || input.count_details.is_none()
            || input.vendor.is_none();
        let fallback = if needs_descriptor && !sku.is_empty() {
            self.get_latest_descriptor(&sku).await?
        } else {
            ItemDescriptor::default()
        };

        let mut item = NewItem {
            sku,
            description: input.description.unwrap_or(fallback.description),
            item_type: input.item_type.unwrap_or(fallback.category),
            count_details: input.count_details.unwrap_or(fallback.count_details),
            vendor: input.vendor.unwrap_or(fallback.vendor),
            pallets: input.pallets,
            bundles_boxes_spools: input.bundles_boxes_spools,
            units_pieces_each: input.units_pieces_each,
            month: input.month,
            is_roll: input.is_roll,
        };

        let month = validate_snapshot(&item)?;
        item.month = month.to_string();

        let stored = self.store.insert_snapshot(item, self.policy).await?;

        tracing::info!(
            id = stored.id,
            sku = %stored.sku,
            month = %stored.month,
            containers = stored.bundles_boxes_spools,
            "Recorded monthly snapshot"
        );

        Ok(SnapshotReceipt {
            id: stored.id,
            sku: stored.sku,
            description: stored.description,
            month: stored.month,
        })
    }

    /// Every SKU with at least one snapshot, ascending
    pub async fn list_distinct_skus(&self) -> AppResult<Vec<String>> {
        self.store.distinct_skus().await
    }

    /// Snapshot rows for a month, optionally narrowed by SKU or description
    pub async fn items_for_month(&self, month: &str, search: Option<&str>) -> AppResult<Vec<Item>> {
        let month = parse_month(month)?;
        let items = self.store.items_for_month(&month.to_string()).await?;

        let term = search.map(str::trim).filter(|t| !t.is_empty());
        let items: Vec<Item> = match term {
            Some(term) => {
                let needle = term.to_lowercase();
                items
                    .into_iter()
                    .filter(|item| {
                        item.sku == term || item.description.to_lowercase().contains(&needle)
                    })
                    .collect()
            }
            None => items,
        };

        tracing::debug!(month = %month, rows = items.len(), "Loaded items for month");
        Ok(items)
    }
}

/// Parse a month label supplied by a caller
pub(crate) fn parse_month(label: &str) -> AppResult<MonthLabel> {
    label.parse::<MonthLabel>().map_err(|_| AppError::Validation {
        field: "month".to_string(),
        message: format!("Month must be formatted like 'January 2024', got '{}'", label.trim()),
    })
}
