//! Validation rules for snapshot submissions and ledger adjustments
//!
//! Rules are checked in a fixed order and the first failure is reported.

use thiserror::Error;

use crate::models::{AdjustmentRequest, NewItem};
use crate::types::MonthLabel;

/// Upper bounds accepted on a monthly count
pub const MAX_PALLETS: i64 = 10;
pub const MAX_UNITS_EACH: i64 = 1_000_000_000;
pub const MAX_CONTAINER_COUNT: i64 = 10_000;

/// A violated input rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ValidationIssue {
    pub field: &'static str,
    pub message: &'static str,
}

impl ValidationIssue {
    pub const fn new(field: &'static str, message: &'static str) -> Self {
        Self { field, message }
    }
}

fn require_text(value: &str, field: &'static str, message: &'static str) -> Result<(), ValidationIssue> {
    if value.trim().is_empty() {
        return Err(ValidationIssue::new(field, message));
    }
    Ok(())
}

// ============================================================================
// Monthly Snapshot
// ============================================================================

/// Validate an end-of-month count and return its parsed month
pub fn validate_snapshot(item: &NewItem) -> Result<MonthLabel, ValidationIssue> {
    require_text(&item.sku, "sku", "BTN_SKU cannot be empty")?;
    require_text(&item.description, "description", "Description cannot be empty")?;
    require_text(&item.item_type, "item_type", "Type cannot be empty")?;
    require_text(&item.count_details, "count_details", "Count Details cannot be empty")?;
    require_text(&item.vendor, "vendor", "Vendor cannot be empty")?;

    if item.pallets < 0 {
        return Err(ValidationIssue::new("pallets", "Pallets cannot be negative"));
    }
    if item.units_pieces_each < 0 {
        return Err(ValidationIssue::new(
            "units_pieces_each",
            "Units/Pieces Each cannot be negative",
        ));
    }
    if item.bundles_boxes_spools < 0 {
        return Err(ValidationIssue::new(
            "bundles_boxes_spools",
            "Bundles/Boxes/Spools cannot be negative",
        ));
    }
    if item.pallets > MAX_PALLETS {
        return Err(ValidationIssue::new("pallets", "Pallets is too large"));
    }
    if item.units_pieces_each > MAX_UNITS_EACH {
        return Err(ValidationIssue::new(
            "units_pieces_each",
            "Units/Pieces Each is too large",
        ));
    }
    if item.bundles_boxes_spools > MAX_CONTAINER_COUNT {
        return Err(ValidationIssue::new(
            "bundles_boxes_spools",
            "Bundles/Boxes/Spools is too large",
        ));
    }

    item.month.parse::<MonthLabel>().map_err(|_| {
        ValidationIssue::new("month", "Month must be formatted like 'January 2024'")
    })
}

// ============================================================================
// Ledger Adjustment
// ============================================================================

/// Validate a stock adjustment before any balance is read
pub fn validate_adjustment(request: &AdjustmentRequest) -> Result<(), ValidationIssue> {
    require_text(&request.sku, "sku", "BTN_SKU cannot be empty")?;
    if request.amount_change == 0 {
        return Err(ValidationIssue::new(
            "amount_change",
            "Amount change cannot be zero",
        ));
    }
    if request.units_per_box <= 0 {
        return Err(ValidationIssue::new(
            "units_per_box",
            "Units per box/roll must be positive",
        ));
    }
    Ok(())
}
