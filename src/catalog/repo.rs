use std::collections::HashSet;

use anyhow::Context;
use async_trait::async_trait;
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;

use super::{FavoriteStore, PriceCatalog, VendorCatalog};
use crate::comparison::model::{Coordinates, PriceEntry, Vendor, VendorId};

#[derive(Debug, FromRow)]
pub struct VendorRow {
    pub id: String,
    pub name: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub is_open: Option<bool>,
    pub last_update: Option<OffsetDateTime>,
}

impl From<VendorRow> for Vendor {
    fn from(r: VendorRow) -> Self {
        // a lone latitude or longitude is as good as none
        let coordinates = match (r.latitude, r.longitude) {
            (Some(lat), Some(lng)) => Some(Coordinates::new(lat, lng)),
            _ => None,
        };
        Self {
            id: r.id,
            name: r.name,
            coordinates,
            is_open: r.is_open,
            last_update: r.last_update,
        }
    }
}

#[derive(Clone)]
pub struct PgCatalog {
    db: PgPool,
}

impl PgCatalog {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl VendorCatalog for PgCatalog {
    async fn list(&self) -> anyhow::Result<Vec<Vendor>> {
        let rows = sqlx::query_as::<_, VendorRow>(
            r#"
            SELECT id, name, latitude, longitude, is_open, last_update
              FROM vendors
             ORDER BY position ASC, id ASC
            "#,
        )
        .fetch_all(&self.db)
        .await
        .context("list vendors")?;
        Ok(rows.into_iter().map(Vendor::from).collect())
    }
}

#[async_trait]
impl PriceCatalog for PgCatalog {
    async fn list_by_vendor(&self, vendor_id: &str) -> anyhow::Result<Vec<PriceEntry>> {
        let rows = sqlx::query_as::<_, PriceEntry>(
            r#"
            SELECT vendor_id, product_id, price
              FROM prices
             WHERE vendor_id = $1
            "#,
        )
        .bind(vendor_id)
        .fetch_all(&self.db)
        .await
        .context("list prices by vendor")?;
        Ok(rows)
    }

    async fn list_for_products(&self, product_ids: &[String]) -> anyhow::Result<Vec<PriceEntry>> {
        if product_ids.is_empty() {
            return Ok(Vec::new());
        }
        let rows = sqlx::query_as::<_, PriceEntry>(
            r#"
            SELECT vendor_id, product_id, price
              FROM prices
             WHERE product_id = ANY($1)
            "#,
        )
        .bind(product_ids)
        .fetch_all(&self.db)
        .await
        .context("list prices for products")?;
        Ok(rows)
    }
}

#[async_trait]
impl FavoriteStore for PgCatalog {
    async fn ids(&self, session_id: &str) -> anyhow::Result<HashSet<VendorId>> {
        let rows: Vec<(String,)> = sqlx::query_as(
            r#"
            SELECT vendor_id
              FROM favorite_vendors
             WHERE session_id = $1
            "#,
        )
        .bind(session_id)
        .fetch_all(&self.db)
        .await
        .context("list favorite vendors")?;
        Ok(rows.into_iter().map(|(id,)| id).collect())
    }
}
