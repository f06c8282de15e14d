use std::collections::{BTreeMap, HashSet};

use anyhow::Context;
use serde::Serialize;
use tracing::{debug, instrument};

use super::aggregate::{aggregate, validate_list, PriceIndex};
use super::annotate::{annotate, compare_items, ItemComparison, Summary, DEFAULT_BEST_VALUE_RADIUS_KM};
use super::distance;
use super::error::ComparisonError;
use super::model::{
    Badge, BadgeKind, Coordinates, PriceEntry, ShoppingListItem, SortCriterion, Vendor, VendorComparison,
    VendorId,
};
use super::ranking::{rank, DEFAULT_DISTANCE_WEIGHT};
use crate::catalog::{FavoriteStore, PriceCatalog, VendorCatalog};
use crate::config::CompareConfig;

/// Tunables of the ranking heuristics.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ComparisonOptions {
    /// Currency per kilometer charged by the Value score.
    pub distance_weight: f64,
    pub best_value_radius_km: f64,
}

impl Default for ComparisonOptions {
    fn default() -> Self {
        Self {
            distance_weight: DEFAULT_DISTANCE_WEIGHT,
            best_value_radius_km: DEFAULT_BEST_VALUE_RADIUS_KM,
        }
    }
}

impl From<&CompareConfig> for ComparisonOptions {
    fn from(cfg: &CompareConfig) -> Self {
        Self {
            distance_weight: cfg.distance_weight,
            best_value_radius_km: cfg.best_value_radius_km,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonResult {
    pub criterion: SortCriterion,
    pub ranked: Vec<VendorComparison>,
    pub badges: BTreeMap<VendorId, Vec<BadgeKind>>,
    pub summary: Summary,
    pub items: Vec<ItemComparison>,
    /// Sum of quantities across the list.
    pub total_units: i64,
}

impl ComparisonResult {
    pub fn badges_for(&self, vendor_id: &str) -> &[BadgeKind] {
        self.badges.get(vendor_id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Every badge as a `(kind, vendor)` pair, in ranked order.
    pub fn badge_list(&self) -> Vec<Badge> {
        self.ranked
            .iter()
            .flat_map(|c| {
                self.badges_for(&c.vendor.id).iter().map(|kind| Badge {
                    kind: *kind,
                    vendor_id: c.vendor.id.clone(),
                })
            })
            .collect()
    }

    /// How much more this vendor costs than the cheapest complete one.
    pub fn diff_from_cheapest(&self, comparison: &VendorComparison) -> f64 {
        self.summary
            .cheapest
            .as_ref()
            .map(|c| comparison.total - c.total)
            .unwrap_or(0.0)
    }

    pub fn find(&self, vendor_id: &str) -> Option<&VendorComparison> {
        self.ranked.iter().find(|c| c.vendor.id == vendor_id)
    }
}

/// Aggregates, ranks and annotates one comparison. Pure and deterministic.
pub fn compare(
    list: &[ShoppingListItem],
    vendors: &[Vendor],
    prices: &[PriceEntry],
    criterion: SortCriterion,
    location: Option<Coordinates>,
    favorites: &HashSet<VendorId>,
    options: &ComparisonOptions,
) -> Result<ComparisonResult, ComparisonError> {
    let total_units = validate_list(list)?;
    validate_vendors(vendors)?;
    if let Some(loc) = location.filter(|c| !distance::is_valid(*c)) {
        return Err(ComparisonError::InvalidCoordinates {
            latitude: loc.latitude,
            longitude: loc.longitude,
        });
    }
    let index = PriceIndex::new(prices)?;

    let comparisons = vendors
        .iter()
        .map(|vendor| {
            let mut c = aggregate(list, vendor, &index)?;
            c.calculated_distance = distance::from_user(location, vendor.coordinates);
            Ok(c)
        })
        .collect::<Result<Vec<_>, ComparisonError>>()?;

    let ranked = rank(
        comparisons,
        criterion,
        favorites,
        location.is_some(),
        options.distance_weight,
    );
    let annotations = annotate(&ranked, favorites, options.best_value_radius_km);
    let items = compare_items(list, &ranked);

    debug!(
        vendors = ranked.len(),
        items = list.len(),
        ?criterion,
        cheapest = ?annotations.summary.cheapest.as_ref().map(|c| &c.vendor_id),
        "comparison computed"
    );

    Ok(ComparisonResult {
        criterion,
        ranked,
        badges: annotations.badges,
        summary: annotations.summary,
        items,
        total_units,
    })
}

fn validate_vendors(vendors: &[Vendor]) -> Result<(), ComparisonError> {
    let mut seen = HashSet::with_capacity(vendors.len());
    for vendor in vendors {
        if !seen.insert(vendor.id.as_str()) {
            return Err(ComparisonError::DuplicateVendor(vendor.id.clone()));
        }
        if let Some(c) = vendor.coordinates.filter(|c| !distance::is_valid(*c)) {
            return Err(ComparisonError::InvalidCoordinates {
                latitude: c.latitude,
                longitude: c.longitude,
            });
        }
    }
    Ok(())
}

#[derive(Debug, thiserror::Error)]
pub enum CompareForSessionError {
    #[error(transparent)]
    Invalid(#[from] ComparisonError),
    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

/// Loads vendors, prices and favorites from the collaborators and compares.
///
/// A failing favorites lookup degrades to no favorites.
#[allow(clippy::too_many_arguments)]
#[instrument(skip(vendors, prices, favorites, list), fields(items = list.len()))]
pub async fn compare_for_session(
    vendors: &dyn VendorCatalog,
    prices: &dyn PriceCatalog,
    favorites: &dyn FavoriteStore,
    session_id: Option<&str>,
    list: &[ShoppingListItem],
    criterion: SortCriterion,
    location: Option<Coordinates>,
    options: &ComparisonOptions,
) -> Result<ComparisonResult, CompareForSessionError> {
    let vendor_list = vendors.list().await.context("list vendors")?;
    let product_ids: Vec<String> = list.iter().map(|i| i.product_id.clone()).collect();
    let price_list = prices
        .list_for_products(&product_ids)
        .await
        .context("list prices")?;

    let favorite_ids = match session_id {
        Some(session) => favorites.ids(session).await.unwrap_or_else(|e| {
            tracing::warn!(error = %e, "favorites lookup failed; continuing without favorites");
            HashSet::new()
        }),
        None => HashSet::new(),
    };

    let result = compare(
        list,
        &vendor_list,
        &price_list,
        criterion,
        location,
        &favorite_ids,
        options,
    )?;
    Ok(result)
}
