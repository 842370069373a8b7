//! Item master models

use serde::{Deserialize, Serialize};

/// One end-of-month snapshot row of the item master
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: i64,
    pub sku: String,
    pub description: String,
    /// Category (e.g. "Chelan PLU")
    pub item_type: String,
    pub count_details: String,
    pub vendor: String,
    pub pallets: i64,
    /// Container count: bundles, boxes or spools depending on the count method
    pub bundles_boxes_spools: i64,
    pub units_pieces_each: i64,
    /// Month label, e.g. "January 2024"
    pub month: String,
    pub is_roll: bool,
}

/// A snapshot row that has not been stored yet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewItem {
    pub sku: String,
    pub description: String,
    pub item_type: String,
    pub count_details: String,
    pub vendor: String,
    pub pallets: i64,
    pub bundles_boxes_spools: i64,
    pub units_pieces_each: i64,
    pub month: String,
    pub is_roll: bool,
}

impl NewItem {
    /// Attach a store-assigned id
    pub fn into_item(self, id: i64) -> Item {
        Item {
            id,
            sku: self.sku,
            description: self.description,
            item_type: self.item_type,
            count_details: self.count_details,
            vendor: self.vendor,
            pallets: self.pallets,
            bundles_boxes_spools: self.bundles_boxes_spools,
            units_pieces_each: self.units_pieces_each,
            month: self.month,
            is_roll: self.is_roll,
        }
    }
}

/// Descriptive fields carried forward from the latest snapshot of a SKU
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemDescriptor {
    pub description: String,
    pub category: String,
    pub count_details: String,
    pub vendor: String,
}

impl From<&Item> for ItemDescriptor {
    fn from(item: &Item) -> Self {
        Self {
            description: item.description.clone(),
            category: item.item_type.clone(),
            count_details: item.count_details.clone(),
            vendor: item.vendor.clone(),
        }
    }
}

/// How an item is counted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContainerKind {
    Unit,
    Box,
    Roll,
}

impl ContainerKind {
    pub fn is_roll(&self) -> bool {
        matches!(self, ContainerKind::Roll)
    }
}
