//! Inventory models
//!
//! Re-exports the item master and ledger models from the shared crate

pub use shared::models::*;
pub use shared::types::MonthLabel;
