//! PLU Inventory - Backend
//!
//! Tracks PLU label stock for a packing operation: a per-SKU adjustment
//! ledger, end-of-month counts, usage forecasts and comparison reports.

use std::sync::Arc;
use std::time::Duration;

use axum::{routing::get, Router};
use shared::ForecastOptions;
use sqlx::postgres::PgPoolOptions;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;

pub use crate::config::Config;

use crate::config::StorageBackend;
use crate::repositories::{InventoryStore, MemoryInventoryStore, PgInventoryStore};
use crate::services::{
    ForecastService, ImportService, ItemMasterService, LedgerService, ReportingService,
};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn InventoryStore>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(store: Arc<dyn InventoryStore>, config: Config) -> Self {
        Self {
            store,
            config: Arc::new(config),
        }
    }

    pub fn ledger(&self) -> LedgerService {
        LedgerService::new(self.store.clone())
    }

    pub fn item_master(&self) -> ItemMasterService {
        ItemMasterService::new(
            self.store.clone(),
            self.config.inventory.duplicate_snapshot_policy,
        )
    }

    pub fn importer(&self) -> ImportService {
        ImportService::new(
            self.store.clone(),
            self.config.inventory.duplicate_snapshot_policy,
        )
    }

    pub fn forecaster(&self) -> ForecastService {
        ForecastService::new(
            self.store.clone(),
            ForecastOptions {
                clamp_non_negative: self.config.inventory.forecast_clamp_non_negative,
            },
        )
    }

    pub fn reporting(&self) -> ReportingService {
        ReportingService::new(self.store.clone())
    }
}

/// Open the configured store, running migrations in development
pub async fn connect_store(config: &Config) -> anyhow::Result<Arc<dyn InventoryStore>> {
    match config.storage.backend {
        StorageBackend::Memory => {
            tracing::warn!("Using the in-memory store; data is lost on restart");
            Ok(Arc::new(MemoryInventoryStore::new()))
        }
        StorageBackend::Postgres => {
            tracing::info!("Connecting to database...");
            let db_pool = PgPoolOptions::new()
                .max_connections(config.database.max_connections)
                .min_connections(config.database.min_connections)
                .acquire_timeout(Duration::from_secs(30))
                .connect(&config.database.url)
                .await?;

            tracing::info!("Database connection established");

            // Run migrations in development
            if config.environment == "development" {
                tracing::info!("Running database migrations...");
                sqlx::migrate!("./migrations").run(&db_pool).await?;
                tracing::info!("Migrations completed");
            }

            Ok(Arc::new(PgInventoryStore::new(db_pool)))
        }
    }
}

/// Create the application router with all routes and middleware
pub fn create_app(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .nest("/api/v1", routes::api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Root endpoint
async fn root() -> &'static str {
    "PLU Inventory API v1.0"
}
