//! Linear-trend usage forecast
//!
//! Fits an ordinary least-squares line to monthly values indexed `0..n` and
//! evaluates it one step past the last observation.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Minimum number of observations needed to fit a line
pub const MIN_OBSERVATIONS: usize = 2;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ForecastError {
    #[error("At least {required} data points are needed to forecast, got {actual}")]
    InsufficientData { required: usize, actual: usize },

    #[error("Value at position {index} is not a finite number")]
    NonFinite { index: usize },

    #[error("Values are too large to fit a trend")]
    OutOfRange,
}

/// Forecast behaviour switches
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForecastOptions {
    /// Floor the projection at zero
    #[serde(default)]
    pub clamp_non_negative: bool,
}

/// Slope and intercept of a fitted line
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrendLine {
    pub slope: f64,
    pub intercept: f64,
}

impl TrendLine {
    pub fn at(&self, x: f64) -> f64 {
        self.intercept + self.slope * x
    }
}

/// Fit a least-squares line of `values` against their index positions
pub fn fit_trend(values: &[f64]) -> Result<TrendLine, ForecastError> {
    if values.len() < MIN_OBSERVATIONS {
        return Err(ForecastError::InsufficientData {
            required: MIN_OBSERVATIONS,
            actual: values.len(),
        });
    }
    if let Some(index) = values.iter().position(|v| !v.is_finite()) {
        return Err(ForecastError::NonFinite { index });
    }

    let n = values.len() as f64;
    let mean_x = (n - 1.0) / 2.0;
    let mean_y = values.iter().sum::<f64>() / n;

    let (covariance, variance) = values
        .iter()
        .enumerate()
        .fold((0.0, 0.0), |(cov, var), (i, y)| {
            let dx = i as f64 - mean_x;
            (cov + dx * (y - mean_y), var + dx * dx)
        });

    // n >= 2 keeps the variance of the indices positive
    let slope = covariance / variance;
    let intercept = mean_y - slope * mean_x;
    if !slope.is_finite() || !intercept.is_finite() {
        return Err(ForecastError::OutOfRange);
    }
    Ok(TrendLine { slope, intercept })
}

/// Project the value at index `n`, one step beyond the observed range
pub fn forecast_next(values: &[f64]) -> Result<f64, ForecastError> {
    forecast_next_with(values, ForecastOptions::default())
}

pub fn forecast_next_with(values: &[f64], options: ForecastOptions) -> Result<f64, ForecastError> {
    let line = fit_trend(values)?;
    let projection = line.at(values.len() as f64);
    if !projection.is_finite() {
        return Err(ForecastError::OutOfRange);
    }

    if options.clamp_non_negative {
        Ok(projection.max(0.0))
    } else {
        Ok(projection)
    }
}
