//! Reporting handlers for comparison and inventory-space views

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use validator::Validate;

use crate::error::AppResult;
use crate::services::reporting::{CategorySummary, ComparisonReport};
use crate::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct ComparisonRequest {
    #[validate(length(min = 1, message = "Select at least one item"))]
    pub items: Vec<String>,
    #[validate(length(min = 1, max = 12, message = "Select between 1 and 12 months"))]
    pub months: Vec<String>,
}

#[derive(Deserialize)]
pub struct CategoryQuery {
    pub month: String,
}

/// Compare container counts of items across months
pub async fn compare_items(
    State(state): State<AppState>,
    Json(request): Json<ComparisonRequest>,
) -> AppResult<Json<ComparisonReport>> {
    request.validate()?;
    let report = state
        .reporting()
        .compare_items_across_months(&request.items, &request.months)
        .await?;
    Ok(Json(report))
}

/// Container totals and share of inventory space per category
pub async fn category_summary(
    State(state): State<AppState>,
    Query(query): Query<CategoryQuery>,
) -> AppResult<Json<CategorySummary>> {
    let summary = state.reporting().category_summary(&query.month).await?;
    Ok(Json(summary))
}
