//! Bulk import of monthly count sheets

use std::collections::BTreeSet;
use std::io::Read;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use shared::{ParsedQuantity, MAX_CONTAINER_COUNT};

use super::item_master::parse_month;
use crate::config::DuplicateSnapshotPolicy;
use crate::error::{AppError, AppResult};
use crate::models::NewItem;
use crate::repositories::InventoryStore;

/// Import service for CSV count sheets
#[derive(Clone)]
pub struct ImportService {
    store: Arc<dyn InventoryStore>,
    policy: DuplicateSnapshotPolicy,
}

/// One line of a count sheet, as written by the counting team
#[derive(Debug, Deserialize)]
struct CountSheetRow {
    #[serde(rename = "BTN_SKU", default)]
    sku: String,
    #[serde(rename = "Description", default)]
    description: String,
    #[serde(rename = "item_type", alias = "Type", default)]
    item_type: String,
    #[serde(rename = "Count_Details", default)]
    count_details: String,
    #[serde(rename = "Vendor", default)]
    vendor: String,
    #[serde(rename = "Pallets", default)]
    pallets: String,
    #[serde(rename = "Bundles_Boxes_Spools", default)]
    bundles_boxes_spools: String,
    #[serde(rename = "Units_Pieces_Each", default)]
    units_pieces_each: String,
    #[serde(rename = "Month", default)]
    month: String,
}

/// Outcome of a successful import
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportSummary {
    pub rows_imported: usize,
    pub roll_rows: usize,
    pub skus: Vec<String>,
    pub months: Vec<String>,
}

impl ImportService {
    /// Create a new ImportService instance
    pub fn new(store: Arc<dyn InventoryStore>, policy: DuplicateSnapshotPolicy) -> Self {
        Self { store, policy }
    }

    /// Parse every row, then store them all in one batch.
    ///
    /// A single bad row rejects the whole sheet before anything is written.
    pub async fn import_count_sheet<R: Read>(&self, source: R) -> AppResult<ImportSummary> {
        let items = parse_count_sheet(source)?;
        if items.is_empty() {
            return Err(AppError::ValidationError(
                "The count sheet has no rows".to_string(),
            ));
        }

        let stored = self.store.insert_snapshots(items, self.policy).await?;

        let skus: BTreeSet<String> = stored.iter().map(|i| i.sku.clone()).collect();
        let months: BTreeSet<String> = stored.iter().map(|i| i.month.clone()).collect();
        let summary = ImportSummary {
            rows_imported: stored.len(),
            roll_rows: stored.iter().filter(|i| i.is_roll).count(),
            skus: skus.into_iter().collect(),
            months: months.into_iter().collect(),
        };

        tracing::info!(
            rows = summary.rows_imported,
            rolls = summary.roll_rows,
            months = ?summary.months,
            "Imported count sheet"
        );

        Ok(summary)
    }
}

/// Turn a CSV count sheet into snapshot rows
pub fn parse_count_sheet<R: Read>(source: R) -> AppResult<Vec<NewItem>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(source);

    let mut items = Vec::new();
    for (index, result) in reader.deserialize::<CountSheetRow>().enumerate() {
        // Line 1 is the header
        let line = index + 2;
        let row = result?;
        items.push(row_to_item(row, line)?);
    }

    Ok(items)
}

fn row_to_item(row: CountSheetRow, line: usize) -> AppResult<NewItem> {
    if row.sku.is_empty() {
        return Err(AppError::ValidationError(format!(
            "Row {}: BTN_SKU cannot be empty",
            line
        )));
    }

    let month = parse_month(&row.month).map_err(|_| {
        AppError::ValidationError(format!(
            "Row {}: Month must be formatted like 'January 2024', got '{}'",
            line, row.month
        ))
    })?;

    let quantity = ParsedQuantity::parse(&row.bundles_boxes_spools);
    if quantity.count > MAX_CONTAINER_COUNT {
        return Err(AppError::ValidationError(format!(
            "Row {}: Bundles_Boxes_Spools cannot exceed {}, got '{}'",
            line, MAX_CONTAINER_COUNT, row.bundles_boxes_spools
        )));
    }

    Ok(NewItem {
        pallets: parse_count(&row.pallets, "Pallets", line)?,
        units_pieces_each: parse_count(&row.units_pieces_each, "Units_Pieces_Each", line)?,
        bundles_boxes_spools: quantity.count,
        is_roll: quantity.kind.is_roll(),
        month: month.to_string(),
        sku: row.sku,
        description: row.description,
        item_type: row.item_type,
        count_details: row.count_details,
        vendor: row.vendor,
    })
}

/// Numeric cell: blank reads as 0, whole-number decimals like "3.0" are accepted
fn parse_count(cell: &str, column: &str, line: usize) -> AppResult<i64> {
    let cell = cell.trim();
    if cell.is_empty() {
        return Ok(0);
    }

    let value = cell.parse::<i64>().ok().or_else(|| {
        cell.parse::<f64>()
            .ok()
            .filter(|v| v.is_finite() && v.fract() == 0.0 && v.abs() < i64::MAX as f64)
            .map(|v| v as i64)
    });

    match value {
        Some(v) if v >= 0 => Ok(v),
        Some(_) => Err(AppError::ValidationError(format!(
            "Row {}: {} cannot be negative",
            line, column
        ))),
        None => Err(AppError::ValidationError(format!(
            "Row {}: {} must be a whole number, got '{}'",
            line, column, cell
        ))),
    }
}
