//! HTTP handlers for the item master

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;

use crate::error::AppResult;
use crate::models::{Item, ItemDescriptor};
use crate::services::item_master::SnapshotDraft;
use crate::AppState;

#[derive(Deserialize)]
pub struct ItemsQuery {
    pub month: String,
    pub search: Option<String>,
}

/// List snapshot rows for a month
pub async fn list_items(
    State(state): State<AppState>,
    Query(query): Query<ItemsQuery>,
) -> AppResult<Json<Vec<Item>>> {
    let service = state.item_master();
    let items = service
        .items_for_month(&query.month, query.search.as_deref())
        .await?;
    Ok(Json(items))
}

/// List every SKU in the item master
pub async fn list_skus(State(state): State<AppState>) -> AppResult<Json<Vec<String>>> {
    let service = state.item_master();
    let skus = service.list_distinct_skus().await?;
    Ok(Json(skus))
}

/// Get the latest descriptor of a SKU
pub async fn get_descriptor(
    State(state): State<AppState>,
    Path(sku): Path<String>,
) -> AppResult<Json<ItemDescriptor>> {
    let service = state.item_master();
    let descriptor = service.get_latest_descriptor(&sku).await?;
    Ok(Json(descriptor))
}

/// Get the pre-filled end-of-month form for a SKU
pub async fn get_snapshot_draft(
    State(state): State<AppState>,
    Path(sku): Path<String>,
) -> AppResult<Json<SnapshotDraft>> {
    let service = state.item_master();
    let draft = service.get_snapshot_draft(&sku).await?;
    Ok(Json(draft))
}
