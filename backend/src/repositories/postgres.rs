//! PostgreSQL store

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool, Postgres, Transaction};

use super::{duplicate_snapshot, InventoryStore};
use crate::config::DuplicateSnapshotPolicy;
use crate::error::AppResult;
use crate::models::{Adjustment, AdjustmentRequest, Item, NewAdjustment, NewItem};

const ITEM_COLUMNS: &str = "id, btn_sku, description, item_type, count_details, vendor, pallets, \
     bundles_boxes_spools, units_pieces_each, month, is_roll";

const ADJUSTMENT_COLUMNS: &str = "id, btn_sku, amount_change, amount_before_change, units_per_box, \
     new_total_units, amount_after_change, is_roll, change_timestamp";

/// Row of `items_table`
#[derive(Debug, FromRow)]
struct ItemRow {
    id: i64,
    btn_sku: String,
    description: String,
    item_type: String,
    count_details: String,
    vendor: String,
    pallets: i64,
    bundles_boxes_spools: i64,
    units_pieces_each: i64,
    month: String,
    is_roll: bool,
}

impl From<ItemRow> for Item {
    fn from(row: ItemRow) -> Self {
        Item {
            id: row.id,
            sku: row.btn_sku,
            description: row.description,
            item_type: row.item_type,
            count_details: row.count_details,
            vendor: row.vendor,
            pallets: row.pallets,
            bundles_boxes_spools: row.bundles_boxes_spools,
            units_pieces_each: row.units_pieces_each,
            month: row.month,
            is_roll: row.is_roll,
        }
    }
}

/// Row of `current_amount_items`
#[derive(Debug, FromRow)]
struct AdjustmentRow {
    id: i64,
    btn_sku: String,
    amount_change: i64,
    amount_before_change: i64,
    units_per_box: i64,
    new_total_units: i64,
    amount_after_change: i64,
    is_roll: bool,
    change_timestamp: DateTime<Utc>,
}

impl From<AdjustmentRow> for Adjustment {
    fn from(row: AdjustmentRow) -> Self {
        Adjustment {
            id: row.id,
            sku: row.btn_sku,
            amount_change: row.amount_change,
            amount_before_change: row.amount_before_change,
            units_per_box: row.units_per_box,
            new_total_units: row.new_total_units,
            amount_after_change: row.amount_after_change,
            is_roll: row.is_roll,
            change_timestamp: row.change_timestamp,
        }
    }
}

/// Store backed by the `items_table` and `current_amount_items` tables
#[derive(Clone)]
pub struct PgInventoryStore {
    db: PgPool,
}

impl PgInventoryStore {
    /// Create a new PgInventoryStore instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    async fn insert_snapshot_tx(
        tx: &mut Transaction<'_, Postgres>,
        item: NewItem,
        policy: DuplicateSnapshotPolicy,
    ) -> AppResult<Item> {
        // Serialize writers of the same (SKU, month)
        sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1), hashtext($2))")
            .bind(&item.sku)
            .bind(&item.month)
            .execute(&mut **tx)
            .await?;

        match policy {
            DuplicateSnapshotPolicy::Allow => {}
            DuplicateSnapshotPolicy::Reject => {
                let exists = sqlx::query_scalar::<_, bool>(
                    "SELECT EXISTS(SELECT 1 FROM items_table WHERE btn_sku = $1 AND month = $2)",
                )
                .bind(&item.sku)
                .bind(&item.month)
                .fetch_one(&mut **tx)
                .await?;

                if exists {
                    return Err(duplicate_snapshot(&item.sku, &item.month));
                }
            }
            DuplicateSnapshotPolicy::Replace => {
                let removed = sqlx::query("DELETE FROM items_table WHERE btn_sku = $1 AND month = $2")
                    .bind(&item.sku)
                    .bind(&item.month)
                    .execute(&mut **tx)
                    .await?;
                tracing::debug!(
                    sku = %item.sku,
                    month = %item.month,
                    removed = removed.rows_affected(),
                    "Replacing earlier snapshots"
                );
            }
        }

        let row = sqlx::query_as::<_, ItemRow>(&format!(
            r#"
            INSERT INTO items_table (
                btn_sku, description, item_type, count_details, vendor,
                pallets, bundles_boxes_spools, units_pieces_each, month, is_roll
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {}
            "#,
            ITEM_COLUMNS
        ))
        .bind(&item.sku)
        .bind(&item.description)
        .bind(&item.item_type)
        .bind(&item.count_details)
        .bind(&item.vendor)
        .bind(item.pallets)
        .bind(item.bundles_boxes_spools)
        .bind(item.units_pieces_each)
        .bind(&item.month)
        .bind(item.is_roll)
        .fetch_one(&mut **tx)
        .await?;

        Ok(row.into())
    }
}

#[async_trait]
impl InventoryStore for PgInventoryStore {
    async fn latest_adjustment(&self, sku: &str) -> AppResult<Option<Adjustment>> {
        let row = sqlx::query_as::<_, AdjustmentRow>(&format!(
            r#"
            SELECT {}
            FROM current_amount_items
            WHERE btn_sku = $1
            ORDER BY change_timestamp DESC, id DESC
            LIMIT 1
            "#,
            ADJUSTMENT_COLUMNS
        ))
        .bind(sku)
        .fetch_optional(&self.db)
        .await?;

        Ok(row.map(Adjustment::from))
    }

    async fn adjustment_history(&self, sku: &str) -> AppResult<Vec<Adjustment>> {
        let rows = sqlx::query_as::<_, AdjustmentRow>(&format!(
            r#"
            SELECT {}
            FROM current_amount_items
            WHERE btn_sku = $1
            ORDER BY change_timestamp ASC, id ASC
            "#,
            ADJUSTMENT_COLUMNS
        ))
        .bind(sku)
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(Adjustment::from).collect())
    }

    async fn append_adjustment(&self, request: &AdjustmentRequest) -> AppResult<Adjustment> {
        let sku = request.sku.trim();
        let mut tx = self.db.begin().await?;

        // Per-SKU lock held until commit/rollback
        sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1))")
            .bind(sku)
            .execute(&mut *tx)
            .await?;

        let previous = sqlx::query_as::<_, AdjustmentRow>(&format!(
            r#"
            SELECT {}
            FROM current_amount_items
            WHERE btn_sku = $1
            ORDER BY change_timestamp DESC, id DESC
            LIMIT 1
            "#,
            ADJUSTMENT_COLUMNS
        ))
        .bind(sku)
        .fetch_optional(&mut *tx)
        .await?
        .map(Adjustment::from);

        let next = NewAdjustment::following(previous.as_ref(), request)?;

        // clock_timestamp() rather than NOW(): NOW() is fixed at transaction
        // start, which may precede the entry we waited on
        let row = sqlx::query_as::<_, AdjustmentRow>(&format!(
            r#"
            INSERT INTO current_amount_items (
                btn_sku, amount_change, amount_before_change, units_per_box,
                new_total_units, amount_after_change, is_roll, change_timestamp
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, GREATEST(clock_timestamp(), $8))
            RETURNING {}
            "#,
            ADJUSTMENT_COLUMNS
        ))
        .bind(&next.sku)
        .bind(next.amount_change)
        .bind(next.amount_before_change)
        .bind(next.units_per_box)
        .bind(next.new_total_units)
        .bind(next.amount_after_change)
        .bind(next.is_roll)
        .bind(previous.as_ref().map(|p| p.change_timestamp))
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("UPDATE items_table SET is_roll = $1 WHERE btn_sku = $2")
            .bind(next.is_roll)
            .bind(&next.sku)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(row.into())
    }

    async fn latest_item(&self, sku: &str) -> AppResult<Option<Item>> {
        let row = sqlx::query_as::<_, ItemRow>(&format!(
            "SELECT {} FROM items_table WHERE btn_sku = $1 ORDER BY id DESC LIMIT 1",
            ITEM_COLUMNS
        ))
        .bind(sku)
        .fetch_optional(&self.db)
        .await?;

        Ok(row.map(Item::from))
    }

    async fn insert_snapshot(
        &self,
        item: NewItem,
        policy: DuplicateSnapshotPolicy,
    ) -> AppResult<Item> {
        let mut tx = self.db.begin().await?;
        let stored = Self::insert_snapshot_tx(&mut tx, item, policy).await?;
        tx.commit().await?;
        Ok(stored)
    }

    async fn insert_snapshots(
        &self,
        items: Vec<NewItem>,
        policy: DuplicateSnapshotPolicy,
    ) -> AppResult<Vec<Item>> {
        let mut tx = self.db.begin().await?;
        let mut stored = Vec::with_capacity(items.len());
        for item in items {
            stored.push(Self::insert_snapshot_tx(&mut tx, item, policy).await?);
        }
        tx.commit().await?;
        Ok(stored)
    }

    async fn distinct_skus(&self) -> AppResult<Vec<String>> {
        let skus = sqlx::query_scalar::<_, String>(
            "SELECT DISTINCT btn_sku FROM items_table ORDER BY btn_sku",
        )
        .fetch_all(&self.db)
        .await?;

        Ok(skus)
    }

    async fn items_for_month(&self, month: &str) -> AppResult<Vec<Item>> {
        let rows = sqlx::query_as::<_, ItemRow>(&format!(
            "SELECT {} FROM items_table WHERE month = $1 ORDER BY id",
            ITEM_COLUMNS
        ))
        .bind(month)
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(Item::from).collect())
    }

    async fn items_for_sku(&self, sku: &str) -> AppResult<Vec<Item>> {
        let rows = sqlx::query_as::<_, ItemRow>(&format!(
            "SELECT {} FROM items_table WHERE btn_sku = $1 ORDER BY id",
            ITEM_COLUMNS
        ))
        .bind(sku)
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(Item::from).collect())
    }

    async fn items_for_selection(&self, skus: &[String], months: &[String]) -> AppResult<Vec<Item>> {
        let rows = sqlx::query_as::<_, ItemRow>(&format!(
            r#"
            SELECT {}
            FROM items_table
            WHERE btn_sku = ANY($1) AND month = ANY($2)
            ORDER BY id
            "#,
            ITEM_COLUMNS
        ))
        .bind(skus)
        .bind(months)
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(Item::from).collect())
    }

    async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.db).await?;
        Ok(())
    }
}
