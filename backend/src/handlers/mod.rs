//! HTTP handlers for the PLU inventory API

pub mod forecast;
pub mod health;
pub mod items;
pub mod ledger;
pub mod reporting;
pub mod snapshots;

pub use forecast::*;
pub use health::*;
pub use items::*;
pub use ledger::*;
pub use reporting::*;
pub use snapshots::*;
