//! Adjustment ledger tests
//!
//! Tests for the running-balance ledger including:
//! - Balance equals the sum of recorded deltas
//! - Each entry chains from the previous balance
//! - Rejected input leaves the ledger untouched
//! - Concurrent adjustments on one SKU do not lose updates

use std::sync::Arc;

use async_trait::async_trait;
use plu_inventory_backend::config::DuplicateSnapshotPolicy;
use plu_inventory_backend::error::{AppError, AppResult};
use plu_inventory_backend::models::{Adjustment, AdjustmentRequest, Item, NewItem};
use plu_inventory_backend::repositories::{InventoryStore, MemoryInventoryStore};
use plu_inventory_backend::services::LedgerService;
use proptest::prelude::*;

fn ledger() -> (Arc<MemoryInventoryStore>, LedgerService) {
    let store = Arc::new(MemoryInventoryStore::new());
    let service = LedgerService::new(store.clone());
    (store, service)
}

fn adjustment(sku: &str, delta: i64, units: i64) -> AdjustmentRequest {
    AdjustmentRequest {
        sku: sku.to_string(),
        amount_change: delta,
        units_per_box: units,
        is_roll: false,
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[tokio::test]
    async fn test_unseen_sku_reads_zero() {
        let (_, service) = ledger();
        assert_eq!(service.get_current_balance("BSKU-0000").await.unwrap(), 0);
        assert_eq!(service.get_units_per_container("BSKU-0000").await.unwrap(), 0);

        let position = service.get_stock_position("BSKU-0000").await.unwrap();
        assert_eq!(position.balance, 0);
        assert_eq!(position.total_units, 0);
        assert!(service.get_history("BSKU-0000").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_record_chains_balances() {
        let (_, service) = ledger();

        let first = service
            .record_adjustment(adjustment("BSKU-5230", 12, 500))
            .await
            .unwrap();
        assert_eq!(first.amount_before_change, 0);
        assert_eq!(first.amount_after_change, 12);
        assert_eq!(first.new_total_units, 6000);

        let second = service
            .record_adjustment(adjustment("BSKU-5230", -5, 500))
            .await
            .unwrap();
        assert_eq!(second.amount_before_change, 12);
        assert_eq!(second.amount_after_change, 7);
        assert_eq!(second.new_total_units, 3500);
        assert!(second.change_timestamp >= first.change_timestamp);

        assert_eq!(service.get_current_balance("BSKU-5230").await.unwrap(), 7);
        assert_eq!(service.get_units_per_container("BSKU-5230").await.unwrap(), 500);
    }

    #[tokio::test]
    async fn test_units_per_container_follows_latest_entry() {
        let (_, service) = ledger();
        service.record_adjustment(adjustment("A", 4, 100)).await.unwrap();
        service.record_adjustment(adjustment("A", 1, 250)).await.unwrap();

        let position = service.get_stock_position("A").await.unwrap();
        assert_eq!(position.balance, 5);
        assert_eq!(position.units_per_container, 250);
        assert_eq!(position.total_units, 1250);
    }

    #[tokio::test]
    async fn test_zero_delta_appends_nothing() {
        let (store, service) = ledger();
        service.record_adjustment(adjustment("A", 3, 10)).await.unwrap();

        let err = service
            .record_adjustment(adjustment("A", 0, 10))
            .await
            .unwrap_err();
        assert!(err.is_validation());
        assert_eq!(store.adjustment_history("A").await.unwrap().len(), 1);
        assert_eq!(service.get_current_balance("A").await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_non_positive_units_rejected() {
        let (store, service) = ledger();
        for units in [0, -12] {
            let err = service
                .record_adjustment(adjustment("A", 3, units))
                .await
                .unwrap_err();
            assert!(matches!(err, AppError::Validation { ref field, .. } if field == "units_per_box"));
        }
        assert!(store.adjustment_history("A").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_blank_sku_rejected() {
        let (_, service) = ledger();
        let err = service
            .record_adjustment(adjustment("   ", 3, 10))
            .await
            .unwrap_err();
        assert!(err.is_validation());
    }

    #[tokio::test]
    async fn test_balance_can_go_negative() {
        let (_, service) = ledger();
        let entry = service.record_adjustment(adjustment("A", -4, 10)).await.unwrap();
        assert_eq!(entry.amount_after_change, -4);
        assert_eq!(entry.new_total_units, -40);
    }

    #[tokio::test]
    async fn test_balance_read_is_idempotent() {
        let (_, service) = ledger();
        service.record_adjustment(adjustment("A", 9, 10)).await.unwrap();

        let first = service.get_current_balance("A").await.unwrap();
        let second = service.get_current_balance("A").await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_skus_are_independent() {
        let (_, service) = ledger();
        service.record_adjustment(adjustment("A", 9, 10)).await.unwrap();
        service.record_adjustment(adjustment("B", 2, 10)).await.unwrap();

        assert_eq!(service.get_current_balance("A").await.unwrap(), 9);
        assert_eq!(service.get_current_balance("B").await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_history_oldest_first_with_readable_timestamps() {
        let (_, service) = ledger();
        for delta in [5, -2, 7] {
            service.record_adjustment(adjustment("A", delta, 10)).await.unwrap();
        }

        let history = service.get_history("A").await.unwrap();
        let deltas: Vec<i64> = history.iter().map(|e| e.adjustment).collect();
        assert_eq!(deltas, vec![5, -2, 7]);
        assert_eq!(history[2].after, 10);
        // "YYYY-MM-DD HH:MM:SS"
        assert_eq!(history[0].timestamp.len(), 19);
    }

    #[tokio::test]
    async fn test_adjustment_copies_roll_flag_to_item_master() {
        let (store, service) = ledger();
        store
            .insert_snapshot(
                NewItem {
                    sku: "A".to_string(),
                    description: "Apple PLU".to_string(),
                    item_type: "Chelan PLU".to_string(),
                    count_details: "Per roll".to_string(),
                    vendor: "Acme".to_string(),
                    pallets: 0,
                    bundles_boxes_spools: 3,
                    units_pieces_each: 0,
                    month: "January 2024".to_string(),
                    is_roll: false,
                },
                DuplicateSnapshotPolicy::Allow,
            )
            .await
            .unwrap();

        let mut request = adjustment("A", 2, 1000);
        request.is_roll = true;
        service.record_adjustment(request).await.unwrap();

        let item = store.latest_item("A").await.unwrap().unwrap();
        assert!(item.is_roll);
    }

    #[tokio::test]
    async fn test_concurrent_adjustments_keep_chain() {
        let (store, service) = ledger();

        let handles: Vec<_> = (0..32)
            .map(|i| {
                let service = service.clone();
                let delta = if i % 3 == 0 { -1 } else { 2 };
                tokio::spawn(async move {
                    service.record_adjustment(adjustment("A", delta, 10)).await
                })
            })
            .collect();

        let mut expected = 0;
        for (i, handle) in handles.into_iter().enumerate() {
            handle.await.unwrap().unwrap();
            expected += if i % 3 == 0 { -1 } else { 2 };
        }

        assert_eq!(service.get_current_balance("A").await.unwrap(), expected);

        let history = store.adjustment_history("A").await.unwrap();
        assert_eq!(history.len(), 32);
        for pair in history.windows(2) {
            assert_eq!(pair[1].amount_before_change, pair[0].amount_after_change);
        }
    }
}

// ============================================================================
// Store Failures
// ============================================================================

#[cfg(test)]
mod failure_tests {
    use super::*;

    /// Store whose backend is unreachable
    struct UnreachableStore;

    fn down<T>() -> AppResult<T> {
        Err(AppError::DatabaseError(sqlx::Error::PoolTimedOut))
    }

    #[async_trait]
    impl InventoryStore for UnreachableStore {
        async fn latest_adjustment(&self, _sku: &str) -> AppResult<Option<Adjustment>> {
            down()
        }
        async fn adjustment_history(&self, _sku: &str) -> AppResult<Vec<Adjustment>> {
            down()
        }
        async fn append_adjustment(&self, _request: &AdjustmentRequest) -> AppResult<Adjustment> {
            down()
        }
        async fn latest_item(&self, _sku: &str) -> AppResult<Option<Item>> {
            down()
        }
        async fn insert_snapshot(
            &self,
            _item: NewItem,
            _policy: DuplicateSnapshotPolicy,
        ) -> AppResult<Item> {
            down()
        }
        async fn insert_snapshots(
            &self,
            _items: Vec<NewItem>,
            _policy: DuplicateSnapshotPolicy,
        ) -> AppResult<Vec<Item>> {
            down()
        }
        async fn distinct_skus(&self) -> AppResult<Vec<String>> {
            down()
        }
        async fn items_for_month(&self, _month: &str) -> AppResult<Vec<Item>> {
            down()
        }
        async fn items_for_sku(&self, _sku: &str) -> AppResult<Vec<Item>> {
            down()
        }
        async fn items_for_selection(
            &self,
            _skus: &[String],
            _months: &[String],
        ) -> AppResult<Vec<Item>> {
            down()
        }
        async fn ping(&self) -> AppResult<()> {
            down()
        }
    }

    #[tokio::test]
    async fn test_storage_failure_surfaces_as_storage_error() {
        let service = LedgerService::new(Arc::new(UnreachableStore));

        let err = service.get_current_balance("A").await.unwrap_err();
        assert!(err.is_storage());

        let err = service
            .record_adjustment(adjustment("A", 1, 1))
            .await
            .unwrap_err();
        assert!(err.is_storage());
    }

    #[tokio::test]
    async fn test_storage_failure_is_service_unavailable() {
        use axum::{http::StatusCode, response::IntoResponse};

        let service = LedgerService::new(Arc::new(UnreachableStore));
        let err = service.get_history("A").await.unwrap_err();
        assert_eq!(err.into_response().status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_validation_runs_before_storage() {
        let service = LedgerService::new(Arc::new(UnreachableStore));
        let err = service
            .record_adjustment(adjustment("A", 0, 1))
            .await
            .unwrap_err();
        assert!(err.is_validation());
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    fn delta_strategy() -> impl Strategy<Value = i64> {
        prop_oneof![-500i64..=-1, 1i64..=500]
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Final balance equals the sum of all deltas
        #[test]
        fn prop_balance_is_sum_of_deltas(
            deltas in prop::collection::vec(delta_strategy(), 1..30),
            units in 1i64..=1000
        ) {
            let (_, service) = ledger();
            let balance = tokio_test::block_on(async {
                for delta in &deltas {
                    service.record_adjustment(adjustment("P", *delta, units)).await.unwrap();
                }
                service.get_current_balance("P").await.unwrap()
            });

            prop_assert_eq!(balance, deltas.iter().sum::<i64>());
        }

        /// Every entry starts where the previous one ended
        #[test]
        fn prop_entries_chain(
            deltas in prop::collection::vec(delta_strategy(), 1..30),
            units in 1i64..=1000
        ) {
            let (store, service) = ledger();
            let history = tokio_test::block_on(async {
                for delta in &deltas {
                    service.record_adjustment(adjustment("P", *delta, units)).await.unwrap();
                }
                store.adjustment_history("P").await.unwrap()
            });

            prop_assert_eq!(history.len(), deltas.len());
            prop_assert_eq!(history[0].amount_before_change, 0);
            for pair in history.windows(2) {
                prop_assert_eq!(pair[1].amount_before_change, pair[0].amount_after_change);
            }
            for entry in &history {
                prop_assert_eq!(entry.amount_after_change, entry.amount_before_change + entry.amount_change);
                prop_assert_eq!(entry.new_total_units, entry.amount_after_change * entry.units_per_box);
            }
        }
    }
}
