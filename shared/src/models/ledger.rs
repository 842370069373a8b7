//! Adjustment ledger models and running-balance arithmetic

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::validation::{validate_adjustment, ValidationIssue};

/// Timestamp format shown in the adjustment log
pub const LOG_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// An immutable ledger entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Adjustment {
    pub id: i64,
    pub sku: String,
    pub amount_change: i64,
    pub amount_before_change: i64,
    pub units_per_box: i64,
    pub new_total_units: i64,
    pub amount_after_change: i64,
    pub is_roll: bool,
    pub change_timestamp: DateTime<Utc>,
}

impl Adjustment {
    /// Ordering used to pick the most recent entry: timestamp, then id
    pub fn recency(&self, other: &Adjustment) -> Ordering {
        self.change_timestamp
            .cmp(&other.change_timestamp)
            .then(self.id.cmp(&other.id))
    }

    pub fn to_log_entry(&self) -> AdjustmentLogEntry {
        AdjustmentLogEntry {
            id: self.id,
            sku: self.sku.clone(),
            before: self.amount_before_change,
            adjustment: self.amount_change,
            after: self.amount_after_change,
            units_per_box: self.units_per_box,
            new_total_units: self.new_total_units,
            timestamp: self.change_timestamp.format(LOG_TIMESTAMP_FORMAT).to_string(),
        }
    }
}

/// Pick the most recent entry of a slice
pub fn latest_entry<'a, I>(entries: I) -> Option<&'a Adjustment>
where
    I: IntoIterator<Item = &'a Adjustment>,
{
    entries.into_iter().max_by(|a, b| a.recency(b))
}

/// Caller input for a stock adjustment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdjustmentRequest {
    pub sku: String,
    /// Signed change; positive adds stock, negative removes it
    pub amount_change: i64,
    pub units_per_box: i64,
    #[serde(default)]
    pub is_roll: bool,
}

/// Entry computed from the previous balance, ready to append
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewAdjustment {
    pub sku: String,
    pub amount_change: i64,
    pub amount_before_change: i64,
    pub units_per_box: i64,
    pub new_total_units: i64,
    pub amount_after_change: i64,
    pub is_roll: bool,
}

impl NewAdjustment {
    /// Compute the next entry given the most recent entry for the same SKU.
    ///
    /// `amount_before_change` is the previous `amount_after_change`, or 0.
    pub fn following(
        previous: Option<&Adjustment>,
        request: &AdjustmentRequest,
    ) -> Result<Self, ValidationIssue> {
        validate_adjustment(request)?;

        let before = previous.map(|p| p.amount_after_change).unwrap_or(0);
        let after = before
            .checked_add(request.amount_change)
            .ok_or(ValidationIssue::new(
                "amount_change",
                "Adjustment would overflow the balance",
            ))?;
        let total_units = after
            .checked_mul(request.units_per_box)
            .ok_or(ValidationIssue::new(
                "units_per_box",
                "Total units would overflow",
            ))?;

        Ok(Self {
            sku: request.sku.trim().to_string(),
            amount_change: request.amount_change,
            amount_before_change: before,
            units_per_box: request.units_per_box,
            new_total_units: total_units,
            amount_after_change: after,
            is_roll: request.is_roll,
        })
    }

    pub fn into_adjustment(self, id: i64, change_timestamp: DateTime<Utc>) -> Adjustment {
        Adjustment {
            id,
            sku: self.sku,
            amount_change: self.amount_change,
            amount_before_change: self.amount_before_change,
            units_per_box: self.units_per_box,
            new_total_units: self.new_total_units,
            amount_after_change: self.amount_after_change,
            is_roll: self.is_roll,
            change_timestamp,
        }
    }
}

/// One line of the adjustment history log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdjustmentLogEntry {
    pub id: i64,
    pub sku: String,
    pub before: i64,
    pub adjustment: i64,
    pub after: i64,
    pub units_per_box: i64,
    pub new_total_units: i64,
    pub timestamp: String,
}

/// Current stock for a SKU as derived from the ledger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockPosition {
    pub sku: String,
    pub balance: i64,
    pub units_per_container: i64,
    pub total_units: i64,
}

impl StockPosition {
    pub fn from_latest(sku: &str, latest: Option<&Adjustment>) -> Self {
        match latest {
            Some(entry) => Self {
                sku: sku.to_string(),
                balance: entry.amount_after_change,
                units_per_container: entry.units_per_box,
                total_units: entry.new_total_units,
            },
            None => Self {
                sku: sku.to_string(),
                balance: 0,
                units_per_container: 0,
                total_units: 0,
            },
        }
    }
}
