//! Business logic services for the PLU inventory service

pub mod forecast;
pub mod import;
pub mod item_master;
pub mod ledger;
pub mod reporting;

pub use forecast::ForecastService;
pub use import::ImportService;
pub use item_master::ItemMasterService;
pub use ledger::LedgerService;
pub use reporting::ReportingService;
