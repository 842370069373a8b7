//! Shared types and rules for the PLU inventory service
//!
//! Everything here is pure: the running-balance arithmetic of the adjustment
//! ledger, snapshot validation, the usage forecast, quantity-text parsing and
//! the comparison/aggregation views. Storage lives in the backend crate.

pub mod forecast;
pub mod import;
pub mod models;
pub mod reporting;
pub mod types;
pub mod validation;

pub use forecast::*;
pub use import::*;
pub use models::*;
pub use reporting::*;
pub use types::*;
pub use validation::*;
