//! HTTP handlers for usage forecasts

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::error::AppResult;
use crate::services::forecast::SkuForecast;
use crate::AppState;

#[derive(Deserialize)]
pub struct ForecastRequest {
    pub values: Vec<f64>,
}

#[derive(Serialize)]
pub struct ForecastResponse {
    pub observations: usize,
    pub forecast: f64,
}

/// Forecast the next value of a posted series
pub async fn forecast_values(
    State(state): State<AppState>,
    Json(request): Json<ForecastRequest>,
) -> AppResult<Json<ForecastResponse>> {
    let forecast = state.forecaster().forecast_values(&request.values)?;
    Ok(Json(ForecastResponse {
        observations: request.values.len(),
        forecast,
    }))
}

/// Forecast next month's container count for a SKU
pub async fn forecast_for_sku(
    State(state): State<AppState>,
    Path(sku): Path<String>,
) -> AppResult<Json<SkuForecast>> {
    let forecast = state.forecaster().forecast_for_sku(&sku).await?;
    Ok(Json(forecast))
}
