//! Vendor, price and favorite sources consumed by the comparison engine.

mod memory;
pub mod repo;

use std::collections::HashSet;

use async_trait::async_trait;

use crate::comparison::model::{PriceEntry, Vendor, VendorId};

pub use memory::InMemoryCatalog;
pub use repo::PgCatalog;

#[async_trait]
pub trait VendorCatalog: Send + Sync {
    /// All vendors in catalog order.
    async fn list(&self) -> anyhow::Result<Vec<Vendor>>;
}

#[async_trait]
pub trait PriceCatalog: Send + Sync {
    /// One vendor's full price list. Comparisons use `list_for_products`.
    async fn list_by_vendor(&self, vendor_id: &str) -> anyhow::Result<Vec<PriceEntry>>;

    /// Prices for the given products across every vendor.
    async fn list_for_products(&self, product_ids: &[String]) -> anyhow::Result<Vec<PriceEntry>>;
}

#[async_trait]
pub trait FavoriteStore: Send + Sync {
    async fn ids(&self, session_id: &str) -> anyhow::Result<HashSet<VendorId>>;
}
