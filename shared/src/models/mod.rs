//! Domain models for the PLU inventory service

mod item;
mod ledger;

pub use item::*;
pub use ledger::*;
