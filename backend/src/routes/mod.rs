//! Route definitions for the PLU inventory API

use axum::{
    routing::{get, post},
    Router,
};

use crate::{handlers, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Item master
        .nest("/items", item_routes())
        // Monthly snapshots
        .nest("/snapshots", snapshot_routes())
        // Adjustment ledger
        .nest("/ledger", ledger_routes())
        // Usage forecast
        .route("/forecast", post(handlers::forecast_values))
        .route("/forecast/:sku", get(handlers::forecast_for_sku))
        // Reports
        .nest("/reports", report_routes())
}

/// Item master routes
fn item_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_items))
        .route("/skus", get(handlers::list_skus))
        .route("/:sku/descriptor", get(handlers::get_descriptor))
        .route("/:sku/draft", get(handlers::get_snapshot_draft))
}

/// Snapshot routes
fn snapshot_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(handlers::submit_snapshot))
        .route("/import", post(handlers::import_snapshots))
}

/// Ledger routes
fn ledger_routes() -> Router<AppState> {
    Router::new()
        .route("/adjustments", post(handlers::record_adjustment))
        .route("/:sku", get(handlers::get_stock_position))
        .route("/:sku/balance", get(handlers::get_balance))
        .route(
            "/:sku/units-per-container",
            get(handlers::get_units_per_container),
        )
        .route("/:sku/history", get(handlers::get_history))
}

/// Reporting routes
fn report_routes() -> Router<AppState> {
    Router::new()
        .route("/comparison", post(handlers::compare_items))
        .route("/categories", get(handlers::category_summary))
}
