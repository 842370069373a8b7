//! HTTP handlers for the adjustment ledger

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;

use crate::error::AppResult;
use crate::models::{Adjustment, AdjustmentLogEntry, AdjustmentRequest, StockPosition};
use crate::AppState;

#[derive(Serialize)]
pub struct BalanceResponse {
    pub sku: String,
    pub balance: i64,
}

#[derive(Serialize)]
pub struct UnitsPerContainerResponse {
    pub sku: String,
    pub units_per_container: i64,
}

/// Record a stock adjustment
pub async fn record_adjustment(
    State(state): State<AppState>,
    Json(request): Json<AdjustmentRequest>,
) -> AppResult<(StatusCode, Json<Adjustment>)> {
    let entry = state.ledger().record_adjustment(request).await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

/// Get the stock position of a SKU
pub async fn get_stock_position(
    State(state): State<AppState>,
    Path(sku): Path<String>,
) -> AppResult<Json<StockPosition>> {
    let position = state.ledger().get_stock_position(&sku).await?;
    Ok(Json(position))
}

/// Get the current balance of a SKU
pub async fn get_balance(
    State(state): State<AppState>,
    Path(sku): Path<String>,
) -> AppResult<Json<BalanceResponse>> {
    let balance = state.ledger().get_current_balance(&sku).await?;
    Ok(Json(BalanceResponse { sku, balance }))
}

/// Get the units per container of a SKU
pub async fn get_units_per_container(
    State(state): State<AppState>,
    Path(sku): Path<String>,
) -> AppResult<Json<UnitsPerContainerResponse>> {
    let units_per_container = state.ledger().get_units_per_container(&sku).await?;
    Ok(Json(UnitsPerContainerResponse {
        sku,
        units_per_container,
    }))
}

/// Get the adjustment log of a SKU
pub async fn get_history(
    State(state): State<AppState>,
    Path(sku): Path<String>,
) -> AppResult<Json<Vec<AdjustmentLogEntry>>> {
    let history = state.ledger().get_history(&sku).await?;
    Ok(Json(history))
}
