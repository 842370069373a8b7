//! Usage forecast service

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use shared::{forecast_next_with, ForecastOptions};

use crate::error::{AppError, AppResult};
use crate::models::MonthLabel;
use crate::repositories::InventoryStore;

/// Forecast service projecting next month's container count
#[derive(Clone)]
pub struct ForecastService {
    store: Arc<dyn InventoryStore>,
    options: ForecastOptions,
}

/// One month of observed history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyObservation {
    pub month: MonthLabel,
    pub value: i64,
}

/// Projection for a single SKU
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkuForecast {
    pub sku: String,
    pub observations: usize,
    pub history: Vec<MonthlyObservation>,
    pub next_month: MonthLabel,
    pub forecast: f64,
}

impl ForecastService {
    /// Create a new ForecastService instance
    pub fn new(store: Arc<dyn InventoryStore>, options: ForecastOptions) -> Self {
        Self { store, options }
    }

    /// Project the next value of an arbitrary series
    pub fn forecast_values(&self, values: &[f64]) -> AppResult<f64> {
        Ok(forecast_next_with(values, self.options)?)
    }

    /// Project next month's container count from the SKU's snapshot history
    pub async fn forecast_for_sku(&self, sku: &str) -> AppResult<SkuForecast> {
        let sku = sku.trim();
        let items = self.store.items_for_sku(sku).await?;

        // Rows come back in id order, so the last row of a month wins.
        // Rows whose month label does not parse cannot be placed on the axis.
        let mut by_month: BTreeMap<MonthLabel, i64> = BTreeMap::new();
        for item in &items {
            match item.month.parse::<MonthLabel>() {
                Ok(month) => {
                    by_month.insert(month, item.bundles_boxes_spools);
                }
                Err(err) => tracing::warn!(sku, id = item.id, "Skipping snapshot: {}", err),
            }
        }

        let history: Vec<MonthlyObservation> = by_month
            .into_iter()
            .map(|(month, value)| MonthlyObservation { month, value })
            .collect();
        let values: Vec<f64> = history.iter().map(|o| o.value as f64).collect();

        let forecast = self.forecast_values(&values)?;
        let next_month = history
            .last()
            .map(|o| o.month.succ())
            .ok_or_else(|| AppError::Internal("Forecast without history".to_string()))?;

        tracing::debug!(sku, observations = values.len(), forecast, "Forecast usage");

        Ok(SkuForecast {
            sku: sku.to_string(),
            observations: values.len(),
            history,
            next_month,
            forecast,
        })
    }
}
