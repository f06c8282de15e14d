use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

pub type VendorId = String;
pub type ProductId = String;

/// A point on the globe, in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShoppingListItem {
    pub product_id: ProductId,
    pub quantity: i64,
}

impl ShoppingListItem {
    pub fn new(product_id: impl Into<ProductId>, quantity: i64) -> Self {
        Self {
            product_id: product_id.into(),
            quantity,
        }
    }
}

/// A seller that can be compared. Coordinates are all-or-nothing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vendor {
    pub id: VendorId,
    pub name: String,
    #[serde(default)]
    pub coordinates: Option<Coordinates>,
    #[serde(default)]
    pub is_open: Option<bool>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub last_update: Option<OffsetDateTime>,
}

impl Vendor {
    pub fn new(id: impl Into<VendorId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            coordinates: None,
            is_open: None,
            last_update: None,
        }
    }

    pub fn at(mut self, latitude: f64, longitude: f64) -> Self {
        self.coordinates = Some(Coordinates::new(latitude, longitude));
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct PriceEntry {
    pub vendor_id: VendorId,
    pub product_id: ProductId,
    pub price: f64,
}

impl PriceEntry {
    pub fn new(vendor_id: impl Into<VendorId>, product_id: impl Into<ProductId>, price: f64) -> Self {
        Self {
            vendor_id: vendor_id.into(),
            product_id: product_id.into(),
            price,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemDetail {
    pub product_id: ProductId,
    pub quantity: i64,
    pub price: Option<f64>,
    pub has_price: bool,
    pub subtotal: f64,
}

/// One vendor priced against the whole list. Built fresh per comparison.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VendorComparison {
    pub vendor: Vendor,
    pub total: f64,
    /// Kilometers from the user. `None` when either end is unknown.
    pub calculated_distance: Option<f64>,
    pub items_with_price: usize,
    pub total_items: usize,
    pub is_complete: bool,
    pub item_details: Vec<ItemDetail>,
}

impl VendorComparison {
    pub fn vendor_id(&self) -> &str {
        &self.vendor.id
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortCriterion {
    #[default]
    Price,
    Distance,
    Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BadgeKind {
    Favorite,
    Cheapest,
    Closest,
    BestValue,
    MostComplete,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Badge {
    pub kind: BadgeKind,
    pub vendor_id: VendorId,
}
