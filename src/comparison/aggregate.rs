use std::collections::HashMap;

use tracing::debug;

use super::error::ComparisonError;
use super::model::{ItemDetail, PriceEntry, ShoppingListItem, Vendor, VendorComparison};

/// Price lookup keyed by (vendor, product). Built once per comparison.
#[derive(Debug, Default)]
pub struct PriceIndex<'a> {
    by_pair: HashMap<(&'a str, &'a str), f64>,
}

impl<'a> PriceIndex<'a> {
    /// Rejects negative or non-finite prices. The first entry for a pair wins.
    pub fn new(prices: &'a [PriceEntry]) -> Result<Self, ComparisonError> {
        let mut by_pair = HashMap::with_capacity(prices.len());
        for entry in prices {
            if !entry.price.is_finite() || entry.price < 0.0 {
                return Err(ComparisonError::InvalidPrice {
                    vendor_id: entry.vendor_id.clone(),
                    product_id: entry.product_id.clone(),
                    price: entry.price,
                });
            }
            let key = (entry.vendor_id.as_str(), entry.product_id.as_str());
            if by_pair.contains_key(&key) {
                debug!(vendor_id = %entry.vendor_id, product_id = %entry.product_id, "duplicate price entry ignored");
                continue;
            }
            by_pair.insert(key, entry.price);
        }
        Ok(Self { by_pair })
    }

    pub fn get(&self, vendor_id: &str, product_id: &str) -> Option<f64> {
        self.by_pair.get(&(vendor_id, product_id)).copied()
    }
}

/// Checks every quantity and returns the total number of units on the list.
pub fn validate_list(list: &[ShoppingListItem]) -> Result<i64, ComparisonError> {
    list.iter().try_fold(0i64, |units, item| {
        if item.quantity < 1 {
            return Err(ComparisonError::InvalidQuantity {
                product_id: item.product_id.clone(),
                quantity: item.quantity,
            });
        }
        units
            .checked_add(item.quantity)
            .ok_or(ComparisonError::QuantityOverflow)
    })
}

/// Prices `list` at `vendor`. Distance is attached later by the caller.
///
/// Fails when the prices multiply out past the range of `f64`.
pub fn aggregate(
    list: &[ShoppingListItem],
    vendor: &Vendor,
    prices: &PriceIndex<'_>,
) -> Result<VendorComparison, ComparisonError> {
    let mut items_with_price = 0;
    let item_details: Vec<ItemDetail> = list
        .iter()
        .map(|item| {
            let price = prices.get(&vendor.id, &item.product_id);
            if price.is_some() {
                items_with_price += 1;
            }
            ItemDetail {
                product_id: item.product_id.clone(),
                quantity: item.quantity,
                price,
                has_price: price.is_some(),
                subtotal: price.map(|p| p * item.quantity as f64).unwrap_or(0.0),
            }
        })
        .collect();

    let total: f64 = item_details.iter().map(|d| d.subtotal).sum();
    if !total.is_finite() {
        return Err(ComparisonError::NonFiniteTotal {
            vendor_id: vendor.id.clone(),
        });
    }

    Ok(VendorComparison {
        vendor: vendor.clone(),
        total,
        calculated_distance: None,
        items_with_price,
        total_items: list.len(),
        is_complete: items_with_price == list.len(),
        item_details,
    })
}

/// Convenience form that indexes `prices` on the fly.
pub fn aggregate_with_prices(
    list: &[ShoppingListItem],
    vendor: &Vendor,
    prices: &[PriceEntry],
) -> Result<VendorComparison, ComparisonError> {
    validate_list(list)?;
    let index = PriceIndex::new(prices)?;
    aggregate(list, vendor, &index)
}
