use serde::{Deserialize, Serialize};

use super::annotate::{ItemComparison, Summary};
use super::model::{BadgeKind, Coordinates, ItemDetail, ShoppingListItem, SortCriterion, VendorId};
use super::services::ComparisonResult;

#[derive(Debug, Deserialize)]
pub struct CompareRequest {
    pub items: Vec<ShoppingListItem>,
    #[serde(default)]
    pub criterion: SortCriterion,
    #[serde(default)]
    pub location: Option<Coordinates>,
}

#[derive(Debug, Serialize)]
pub struct RankedVendor {
    pub vendor_id: VendorId,
    pub name: String,
    pub is_open: Option<bool>,
    pub total: f64,
    pub distance_km: Option<f64>,
    pub items_with_price: usize,
    pub total_items: usize,
    pub is_complete: bool,
    pub diff_from_cheapest: f64,
    pub badges: Vec<BadgeKind>,
    pub item_details: Vec<ItemDetail>,
}

#[derive(Debug, Serialize)]
pub struct CompareResponse {
    pub criterion: SortCriterion,
    pub ranked: Vec<RankedVendor>,
    pub summary: Summary,
    pub items: Vec<ItemComparison>,
    pub total_units: i64,
}

impl From<ComparisonResult> for CompareResponse {
    fn from(r: ComparisonResult) -> Self {
        let ranked = r
            .ranked
            .iter()
            .map(|c| RankedVendor {
                vendor_id: c.vendor.id.clone(),
                name: c.vendor.name.clone(),
                is_open: c.vendor.is_open,
                total: c.total,
                distance_km: c.calculated_distance,
                items_with_price: c.items_with_price,
                total_items: c.total_items,
                is_complete: c.is_complete,
                diff_from_cheapest: r.diff_from_cheapest(c),
                badges: r.badges_for(&c.vendor.id).to_vec(),
                item_details: c.item_details.clone(),
            })
            .collect();
        Self {
            criterion: r.criterion,
            ranked,
            summary: r.summary,
            items: r.items,
            total_units: r.total_units,
        }
    }
}
