use std::collections::{HashMap, HashSet};

use async_trait::async_trait;

use super::{FavoriteStore, PriceCatalog, VendorCatalog};
use crate::comparison::model::{PriceEntry, Vendor, VendorId};

/// Fixed catalog held in memory. Used by tests and local demos.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    vendors: Vec<Vendor>,
    prices: Vec<PriceEntry>,
    favorites: HashMap<String, HashSet<VendorId>>,
}

impl InMemoryCatalog {
    pub fn new(vendors: Vec<Vendor>, prices: Vec<PriceEntry>) -> Self {
        Self {
            vendors,
            prices,
            favorites: HashMap::new(),
        }
    }

    pub fn with_favorite(mut self, session_id: &str, vendor_id: &str) -> Self {
        self.favorites
            .entry(session_id.to_string())
            .or_default()
            .insert(vendor_id.to_string());
        self
    }
}

#[async_trait]
impl VendorCatalog for InMemoryCatalog {
    async fn list(&self) -> anyhow::Result<Vec<Vendor>> {
        Ok(self.vendors.clone())
    }
}

#[async_trait]
impl PriceCatalog for InMemoryCatalog {
    async fn list_by_vendor(&self, vendor_id: &str) -> anyhow::Result<Vec<PriceEntry>> {
        Ok(self
            .prices
            .iter()
            .filter(|p| p.vendor_id == vendor_id)
            .cloned()
            .collect())
    }

    async fn list_for_products(&self, product_ids: &[String]) -> anyhow::Result<Vec<PriceEntry>> {
        Ok(self
            .prices
            .iter()
            .filter(|p| product_ids.contains(&p.product_id))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl FavoriteStore for InMemoryCatalog {
    async fn ids(&self, session_id: &str) -> anyhow::Result<HashSet<VendorId>> {
        Ok(self.favorites.get(session_id).cloned().unwrap_or_default())
    }
}
