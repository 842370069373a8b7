//! Process-local store

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::{duplicate_snapshot, InventoryStore};
use crate::config::DuplicateSnapshotPolicy;
use crate::error::AppResult;
use crate::models::{latest_entry, Adjustment, AdjustmentRequest, Item, NewAdjustment, NewItem};

#[derive(Debug, Clone, Default)]
struct MemoryState {
    items: Vec<Item>,
    adjustments: Vec<Adjustment>,
    next_item_id: i64,
    next_adjustment_id: i64,
}

impl MemoryState {
    fn insert_snapshot(&mut self, item: NewItem, policy: DuplicateSnapshotPolicy) -> AppResult<Item> {
        let same_month = |existing: &Item| existing.sku == item.sku && existing.month == item.month;

        match policy {
            DuplicateSnapshotPolicy::Allow => {}
            DuplicateSnapshotPolicy::Reject => {
                if self.items.iter().any(same_month) {
                    return Err(duplicate_snapshot(&item.sku, &item.month));
                }
            }
            DuplicateSnapshotPolicy::Replace => self.items.retain(|existing| !same_month(existing)),
        }

        self.next_item_id += 1;
        let stored = item.into_item(self.next_item_id);
        self.items.push(stored.clone());
        Ok(stored)
    }
}

/// Store that keeps everything behind a single lock
#[derive(Debug, Default)]
pub struct MemoryInventoryStore {
    state: RwLock<MemoryState>,
}

impl MemoryInventoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl InventoryStore for MemoryInventoryStore {
    async fn latest_adjustment(&self, sku: &str) -> AppResult<Option<Adjustment>> {
        let state = self.state.read().await;
        Ok(latest_entry(state.adjustments.iter().filter(|a| a.sku == sku)).cloned())
    }

    async fn adjustment_history(&self, sku: &str) -> AppResult<Vec<Adjustment>> {
        let state = self.state.read().await;
        let mut history: Vec<Adjustment> = state
            .adjustments
            .iter()
            .filter(|a| a.sku == sku)
            .cloned()
            .collect();
        history.sort_by(|a, b| a.recency(b));
        Ok(history)
    }

    async fn append_adjustment(&self, request: &AdjustmentRequest) -> AppResult<Adjustment> {
        // The write lock covers the read of the previous balance
        let mut state = self.state.write().await;
        let sku = request.sku.trim();

        let previous = latest_entry(state.adjustments.iter().filter(|a| a.sku == sku));
        let next = NewAdjustment::following(previous, request)?;

        // Never stamp an entry earlier than the one it follows
        let now = Utc::now();
        let timestamp = previous.map_or(now, |p| p.change_timestamp.max(now));

        state.next_adjustment_id += 1;
        let entry = next.into_adjustment(state.next_adjustment_id, timestamp);
        state.adjustments.push(entry.clone());

        for item in state.items.iter_mut().filter(|i| i.sku == sku) {
            item.is_roll = entry.is_roll;
        }

        Ok(entry)
    }

    async fn latest_item(&self, sku: &str) -> AppResult<Option<Item>> {
        let state = self.state.read().await;
        Ok(state
            .items
            .iter()
            .filter(|i| i.sku == sku)
            .max_by_key(|i| i.id)
            .cloned())
    }

    async fn insert_snapshot(
        &self,
        item: NewItem,
        policy: DuplicateSnapshotPolicy,
    ) -> AppResult<Item> {
        let mut state = self.state.write().await;
        state.insert_snapshot(item, policy)
    }

    async fn insert_snapshots(
        &self,
        items: Vec<NewItem>,
        policy: DuplicateSnapshotPolicy,
    ) -> AppResult<Vec<Item>> {
        let mut state = self.state.write().await;

        // Stage on a copy so a rejected row leaves nothing behind
        let mut staged = state.clone();
        let stored = items
            .into_iter()
            .map(|item| staged.insert_snapshot(item, policy))
            .collect::<AppResult<Vec<_>>>()?;

        *state = staged;
        Ok(stored)
    }

    async fn distinct_skus(&self) -> AppResult<Vec<String>> {
        let state = self.state.read().await;
        let mut skus: Vec<String> = state.items.iter().map(|i| i.sku.clone()).collect();
        skus.sort();
        skus.dedup();
        Ok(skus)
    }

    async fn items_for_month(&self, month: &str) -> AppResult<Vec<Item>> {
        let state = self.state.read().await;
        Ok(state
            .items
            .iter()
            .filter(|i| i.month == month)
            .cloned()
            .collect())
    }

    async fn items_for_sku(&self, sku: &str) -> AppResult<Vec<Item>> {
        let state = self.state.read().await;
        Ok(state.items.iter().filter(|i| i.sku == sku).cloned().collect())
    }

    async fn items_for_selection(&self, skus: &[String], months: &[String]) -> AppResult<Vec<Item>> {
        let state = self.state.read().await;
        Ok(state
            .items
            .iter()
            .filter(|i| skus.contains(&i.sku) && months.contains(&i.month))
            .cloned()
            .collect())
    }

    async fn ping(&self) -> AppResult<()> {
        Ok(())
    }
}
