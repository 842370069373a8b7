//! Item master tests
//!
//! Tests for monthly snapshot recording including:
//! - Validation order and bounds
//! - Descriptor carry-forward from the latest snapshot
//! - Duplicate (SKU, month) policies
//! - Draft pre-fill from the ledger

use std::sync::Arc;

use plu_inventory_backend::config::DuplicateSnapshotPolicy;
use plu_inventory_backend::error::AppError;
use plu_inventory_backend::models::AdjustmentRequest;
use plu_inventory_backend::repositories::{InventoryStore, MemoryInventoryStore};
use plu_inventory_backend::services::item_master::SubmitSnapshotInput;
use plu_inventory_backend::services::{ItemMasterService, LedgerService};

fn service(policy: DuplicateSnapshotPolicy) -> (Arc<MemoryInventoryStore>, ItemMasterService) {
    let store = Arc::new(MemoryInventoryStore::new());
    let service = ItemMasterService::new(store.clone(), policy);
    (store, service)
}

fn snapshot(sku: &str, month: &str, containers: i64) -> SubmitSnapshotInput {
    SubmitSnapshotInput {
        sku: sku.to_string(),
        month: month.to_string(),
        description: Some("Gala PLU 4133".to_string()),
        item_type: Some("Chelan PLU".to_string()),
        count_details: Some("Per roll".to_string()),
        vendor: Some("Sinclair".to_string()),
        pallets: 1,
        units_pieces_each: 20_000,
        bundles_boxes_spools: containers,
        is_roll: true,
    }
}

fn field_of(err: &AppError) -> Option<&str> {
    match err {
        AppError::Validation { field, .. } => Some(field.as_str()),
        _ => None,
    }
}

fn message_of(err: &AppError) -> Option<&str> {
    match err {
        AppError::Validation { message, .. } => Some(message.as_str()),
        _ => None,
    }
}

// ============================================================================
// Submission
// ============================================================================

#[tokio::test]
async fn test_submit_returns_receipt() {
    let (store, service) = service(DuplicateSnapshotPolicy::Allow);

    let receipt = service
        .submit_monthly_snapshot(snapshot("BSKU-1", "January 2024", 8))
        .await
        .unwrap();
    assert_eq!(receipt.sku, "BSKU-1");
    assert_eq!(receipt.description, "Gala PLU 4133");
    assert_eq!(receipt.month, "January 2024");

    let stored = store.latest_item("BSKU-1").await.unwrap().unwrap();
    assert_eq!(stored.id, receipt.id);
    assert_eq!(stored.bundles_boxes_spools, 8);
    assert!(stored.is_roll);
}

#[tokio::test]
async fn test_month_label_is_normalized() {
    let (_, service) = service(DuplicateSnapshotPolicy::Allow);
    let receipt = service
        .submit_monthly_snapshot(snapshot("BSKU-1", "  february   2024 ", 8))
        .await
        .unwrap();
    assert_eq!(receipt.month, "February 2024");
}

#[tokio::test]
async fn test_too_many_pallets_inserts_nothing() {
    let (store, service) = service(DuplicateSnapshotPolicy::Allow);
    let mut input = snapshot("BSKU-1", "January 2024", 8);
    input.pallets = 11;

    let err = service.submit_monthly_snapshot(input).await.unwrap_err();
    assert_eq!(message_of(&err), Some("Pallets is too large"));
    assert!(store.items_for_sku("BSKU-1").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_bounds_are_inclusive() {
    let (_, service) = service(DuplicateSnapshotPolicy::Allow);
    let mut input = snapshot("BSKU-1", "January 2024", 10_000);
    input.pallets = 10;
    input.units_pieces_each = 1_000_000_000;
    assert!(service.submit_monthly_snapshot(input).await.is_ok());

    let mut input = snapshot("BSKU-1", "January 2024", 10_001);
    input.pallets = 10;
    let err = service.submit_monthly_snapshot(input).await.unwrap_err();
    assert_eq!(message_of(&err), Some("Bundles/Boxes/Spools is too large"));
}

#[tokio::test]
async fn test_first_violation_is_reported() {
    let (_, service) = service(DuplicateSnapshotPolicy::Allow);
    let mut input = snapshot("BSKU-1", "not a month", 8);
    input.vendor = Some(String::new());
    input.pallets = -1;

    let err = service.submit_monthly_snapshot(input).await.unwrap_err();
    assert_eq!(field_of(&err), Some("vendor"));
    assert_eq!(message_of(&err), Some("Vendor cannot be empty"));
}

#[tokio::test]
async fn test_negative_units_checked_before_containers() {
    let (_, service) = service(DuplicateSnapshotPolicy::Allow);
    let mut input = snapshot("BSKU-1", "January 2024", -3);
    input.units_pieces_each = -1;

    let err = service.submit_monthly_snapshot(input).await.unwrap_err();
    assert_eq!(message_of(&err), Some("Units/Pieces Each cannot be negative"));
}

#[tokio::test]
async fn test_bad_month_rejected_last() {
    let (store, service) = service(DuplicateSnapshotPolicy::Allow);
    let err = service
        .submit_monthly_snapshot(snapshot("BSKU-1", "2024-01", 8))
        .await
        .unwrap_err();
    assert_eq!(field_of(&err), Some("month"));
    assert!(store.distinct_skus().await.unwrap().is_empty());
}

// ============================================================================
// Descriptors
// ============================================================================

#[tokio::test]
async fn test_descriptor_is_empty_for_new_sku() {
    let (_, service) = service(DuplicateSnapshotPolicy::Allow);
    let descriptor = service.get_latest_descriptor("NEW").await.unwrap();
    assert!(descriptor.description.is_empty());
    assert!(descriptor.category.is_empty());
    assert!(descriptor.count_details.is_empty());
    assert!(descriptor.vendor.is_empty());
}

#[tokio::test]
async fn test_descriptor_comes_from_latest_row() {
    let (_, service) = service(DuplicateSnapshotPolicy::Allow);
    service
        .submit_monthly_snapshot(snapshot("BSKU-1", "January 2024", 8))
        .await
        .unwrap();
    let mut renamed = snapshot("BSKU-1", "February 2024", 6);
    renamed.description = Some("Gala PLU 4133 (new art)".to_string());
    service.submit_monthly_snapshot(renamed).await.unwrap();

    let descriptor = service.get_latest_descriptor("BSKU-1").await.unwrap();
    assert_eq!(descriptor.description, "Gala PLU 4133 (new art)");
    assert_eq!(descriptor.category, "Chelan PLU");
}

#[tokio::test]
async fn test_omitted_descriptor_fields_are_carried_forward() {
    let (_, service) = service(DuplicateSnapshotPolicy::Allow);
    service
        .submit_monthly_snapshot(snapshot("BSKU-1", "January 2024", 8))
        .await
        .unwrap();

    let input = SubmitSnapshotInput {
        sku: "BSKU-1".to_string(),
        month: "February 2024".to_string(),
        bundles_boxes_spools: 5,
        ..Default::default()
    };
    let receipt = service.submit_monthly_snapshot(input).await.unwrap();
    assert_eq!(receipt.description, "Gala PLU 4133");

    let descriptor = service.get_latest_descriptor("BSKU-1").await.unwrap();
    assert_eq!(descriptor.vendor, "Sinclair");
}

#[tokio::test]
async fn test_new_sku_without_descriptor_fails_validation() {
    let (_, service) = service(DuplicateSnapshotPolicy::Allow);
    let input = SubmitSnapshotInput {
        sku: "NEW".to_string(),
        month: "January 2024".to_string(),
        ..Default::default()
    };
    let err = service.submit_monthly_snapshot(input).await.unwrap_err();
    assert_eq!(message_of(&err), Some("Description cannot be empty"));
}

#[tokio::test]
async fn test_distinct_skus_sorted() {
    let (_, service) = service(DuplicateSnapshotPolicy::Allow);
    for sku in ["C-3", "A-1", "C-3", "B-2"] {
        service
            .submit_monthly_snapshot(snapshot(sku, "January 2024", 1))
            .await
            .unwrap();
    }
    assert_eq!(
        service.list_distinct_skus().await.unwrap(),
        vec!["A-1".to_string(), "B-2".to_string(), "C-3".to_string()]
    );
}

#[tokio::test]
async fn test_items_for_month_search() {
    let (_, service) = service(DuplicateSnapshotPolicy::Allow);
    service
        .submit_monthly_snapshot(snapshot("BSKU-1", "January 2024", 1))
        .await
        .unwrap();
    let mut other = snapshot("BSKU-2", "January 2024", 2);
    other.description = Some("Fuji PLU 4131".to_string());
    service.submit_monthly_snapshot(other).await.unwrap();
    service
        .submit_monthly_snapshot(snapshot("BSKU-3", "February 2024", 3))
        .await
        .unwrap();

    let all = service.items_for_month("January 2024", None).await.unwrap();
    assert_eq!(all.len(), 2);

    let by_sku = service.items_for_month("January 2024", Some("BSKU-2")).await.unwrap();
    assert_eq!(by_sku.len(), 1);
    assert_eq!(by_sku[0].sku, "BSKU-2");

    let by_description = service.items_for_month("January 2024", Some("gala")).await.unwrap();
    assert_eq!(by_description.len(), 1);
    assert_eq!(by_description[0].sku, "BSKU-1");

    assert!(service.items_for_month("Jan", None).await.unwrap_err().is_validation());
}

#[tokio::test]
async fn test_draft_uses_ledger_counts() {
    let (store, service) = service(DuplicateSnapshotPolicy::Allow);
    service
        .submit_monthly_snapshot(snapshot("BSKU-1", "January 2024", 8))
        .await
        .unwrap();
    LedgerService::new(store.clone())
        .record_adjustment(AdjustmentRequest {
            sku: "BSKU-1".to_string(),
            amount_change: 6,
            units_per_box: 2500,
            is_roll: true,
        })
        .await
        .unwrap();

    let draft = service.get_snapshot_draft("BSKU-1").await.unwrap();
    assert_eq!(draft.descriptor.description, "Gala PLU 4133");
    assert_eq!(draft.container_count, 6);
    assert_eq!(draft.units_each, 15_000);
    assert!(draft.is_roll);
}

// ============================================================================
// Duplicate Policies
// ============================================================================

#[tokio::test]
async fn test_allow_policy_keeps_both_rows() {
    let (store, service) = service(DuplicateSnapshotPolicy::Allow);
    service
        .submit_monthly_snapshot(snapshot("BSKU-1", "January 2024", 8))
        .await
        .unwrap();
    service
        .submit_monthly_snapshot(snapshot("BSKU-1", "January 2024", 9))
        .await
        .unwrap();

    assert_eq!(store.items_for_sku("BSKU-1").await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_reject_policy_refuses_second_submission() {
    let (store, service) = service(DuplicateSnapshotPolicy::Reject);
    service
        .submit_monthly_snapshot(snapshot("BSKU-1", "January 2024", 8))
        .await
        .unwrap();
    let err = service
        .submit_monthly_snapshot(snapshot("BSKU-1", "January 2024", 9))
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::DuplicateEntry(_)));
    let rows = store.items_for_sku("BSKU-1").await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].bundles_boxes_spools, 8);

    // Another month is still accepted
    service
        .submit_monthly_snapshot(snapshot("BSKU-1", "February 2024", 9))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_replace_policy_keeps_latest_row() {
    let (store, service) = service(DuplicateSnapshotPolicy::Replace);
    service
        .submit_monthly_snapshot(snapshot("BSKU-1", "January 2024", 8))
        .await
        .unwrap();
    let second = service
        .submit_monthly_snapshot(snapshot("BSKU-1", "January 2024", 9))
        .await
        .unwrap();

    let rows = store.items_for_sku("BSKU-1").await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].id, second.id);
    assert_eq!(rows[0].bundles_boxes_spools, 9);
}
