//! Storage for the item master and the adjustment ledger
//!
//! Services talk to an `InventoryStore`. The PostgreSQL store is used in
//! production; the memory store backs tests and local runs.

use async_trait::async_trait;

use crate::config::DuplicateSnapshotPolicy;
use crate::error::AppResult;
use crate::models::{Adjustment, AdjustmentRequest, Item, NewItem};

mod memory;
mod postgres;

pub use memory::MemoryInventoryStore;
pub use postgres::PgInventoryStore;

#[async_trait]
pub trait InventoryStore: Send + Sync {
    /// Most recent ledger entry for a SKU, by timestamp then id
    async fn latest_adjustment(&self, sku: &str) -> AppResult<Option<Adjustment>>;

    /// All ledger entries for a SKU, oldest first
    async fn adjustment_history(&self, sku: &str) -> AppResult<Vec<Adjustment>>;

    /// Append the entry that follows the current balance of `request.sku`.
    ///
    /// Reading the balance, appending, and copying `is_roll` onto the item
    /// master happen as one unit; concurrent calls for the same SKU are
    /// serialized.
    async fn append_adjustment(&self, request: &AdjustmentRequest) -> AppResult<Adjustment>;

    /// Snapshot row with the highest id for a SKU
    async fn latest_item(&self, sku: &str) -> AppResult<Option<Item>>;

    /// Store one snapshot, applying the duplicate policy atomically
    async fn insert_snapshot(
        &self,
        item: NewItem,
        policy: DuplicateSnapshotPolicy,
    ) -> AppResult<Item>;

    /// Store a batch of snapshots; either all rows are written or none
    async fn insert_snapshots(
        &self,
        items: Vec<NewItem>,
        policy: DuplicateSnapshotPolicy,
    ) -> AppResult<Vec<Item>>;

    /// Distinct SKUs in ascending order
    async fn distinct_skus(&self) -> AppResult<Vec<String>>;

    /// Snapshot rows for a month label, in insertion order
    async fn items_for_month(&self, month: &str) -> AppResult<Vec<Item>>;

    /// Snapshot rows for a SKU, in insertion order
    async fn items_for_sku(&self, sku: &str) -> AppResult<Vec<Item>>;

    /// Snapshot rows matching any of `skus` and any of `months`, in insertion order
    async fn items_for_selection(&self, skus: &[String], months: &[String]) -> AppResult<Vec<Item>>;

    /// Check that the store is reachable
    async fn ping(&self) -> AppResult<()>;
}

pub(crate) fn duplicate_snapshot(sku: &str, month: &str) -> crate::error::AppError {
    crate::error::AppError::DuplicateEntry(format!("A snapshot for {} in {}", sku, month))
}
