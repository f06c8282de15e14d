use std::collections::{BTreeMap, HashSet};

use serde::Serialize;

use super::model::{BadgeKind, ProductId, ShoppingListItem, VendorComparison, VendorId};

/// Radius under which the cheapest vendor is also the best value.
pub const DEFAULT_BEST_VALUE_RADIUS_KM: f64 = 5.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VendorPick {
    pub vendor_id: VendorId,
    pub name: String,
    pub total: f64,
    pub distance_km: Option<f64>,
}

impl VendorPick {
    fn of(c: &VendorComparison) -> Self {
        Self {
            vendor_id: c.vendor.id.clone(),
            name: c.vendor.name.clone(),
            total: c.total,
            distance_km: c.calculated_distance,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub cheapest: Option<VendorPick>,
    pub most_expensive: Option<VendorPick>,
    pub savings: f64,
    pub savings_percent: f64,
    pub closest: Option<VendorPick>,
    pub most_complete: Option<VendorPick>,
    pub best_value: Option<VendorPick>,
    pub has_incomplete: bool,
}

/// One list item priced across every vendor that carries it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemComparison {
    pub product_id: ProductId,
    pub quantity: i64,
    pub offers: Vec<ItemOffer>,
    pub cheapest: Option<ItemOffer>,
    pub most_expensive: Option<ItemOffer>,
    /// `(most expensive − cheapest) × quantity`
    pub savings: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemOffer {
    pub vendor_id: VendorId,
    pub price: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Annotations {
    pub summary: Summary,
    pub badges: BTreeMap<VendorId, Vec<BadgeKind>>,
}

/// Summary metrics and badges over an already-ranked set.
///
/// Every "first" below means first in ranked order.
pub fn annotate(
    ranked: &[VendorComparison],
    favorites: &HashSet<VendorId>,
    best_value_radius_km: f64,
) -> Annotations {
    let cheapest = first_by(ranked.iter().filter(|c| c.is_complete), |c| c.total, Extreme::Min);
    let most_expensive =
        first_by(ranked.iter().filter(|c| c.is_complete), |c| c.total, Extreme::Max);
    let closest = first_by(
        ranked.iter().filter(|c| c.calculated_distance.is_some()),
        |c| c.calculated_distance.unwrap_or(f64::INFINITY),
        Extreme::Min,
    );
    let most_complete = first_by(ranked.iter(), |c| c.items_with_price as f64, Extreme::Max);

    let best_value = match cheapest {
        Some(c) if c.calculated_distance.is_some_and(|d| d < best_value_radius_km) => Some(c),
        _ => closest,
    };

    let savings = match (cheapest, most_expensive) {
        (Some(lo), Some(hi)) => hi.total - lo.total,
        _ => 0.0,
    };
    let savings_percent = match cheapest {
        Some(lo) if lo.total != 0.0 => savings / lo.total * 100.0,
        _ => 0.0,
    };

    let is = |pick: Option<&VendorComparison>, c: &VendorComparison| {
        pick.is_some_and(|p| p.vendor.id == c.vendor.id)
    };

    let badges = ranked
        .iter()
        .map(|c| {
            let mut kinds = Vec::new();
            if favorites.contains(&c.vendor.id) {
                kinds.push(BadgeKind::Favorite);
            }
            let is_cheapest = is(cheapest, c);
            if is_cheapest {
                kinds.push(BadgeKind::Cheapest);
            }
            if is(closest, c) && c.calculated_distance.is_some() {
                kinds.push(BadgeKind::Closest);
            }
            if is(best_value, c) && !is_cheapest {
                kinds.push(BadgeKind::BestValue);
            }
            if is(most_complete, c) && kinds.is_empty() && c.is_complete {
                kinds.push(BadgeKind::MostComplete);
            }
            (c.vendor.id.clone(), kinds)
        })
        .collect();

    Annotations {
        summary: Summary {
            cheapest: cheapest.map(VendorPick::of),
            most_expensive: most_expensive.map(VendorPick::of),
            savings,
            savings_percent,
            closest: closest.map(VendorPick::of),
            most_complete: most_complete.map(VendorPick::of),
            best_value: best_value.map(VendorPick::of),
            has_incomplete: ranked.iter().any(|c| !c.is_complete),
        },
        badges,
    }
}

/// Per-item prices across the ranked vendors.
pub fn compare_items(list: &[ShoppingListItem], ranked: &[VendorComparison]) -> Vec<ItemComparison> {
    list.iter()
        .enumerate()
        .map(|(i, item)| {
            let offers: Vec<ItemOffer> = ranked
                .iter()
                .filter_map(|c| {
                    let detail = c.item_details.get(i)?;
                    detail.price.map(|price| ItemOffer {
                        vendor_id: c.vendor.id.clone(),
                        price,
                    })
                })
                .collect();
            let cheapest = first_by(offers.iter(), |o| o.price, Extreme::Min).cloned();
            let most_expensive = first_by(offers.iter(), |o| o.price, Extreme::Max).cloned();
            let savings = match (&cheapest, &most_expensive) {
                (Some(lo), Some(hi)) => (hi.price - lo.price) * item.quantity as f64,
                _ => 0.0,
            };
            ItemComparison {
                product_id: item.product_id.clone(),
                quantity: item.quantity,
                offers,
                cheapest,
                most_expensive,
                savings,
            }
        })
        .collect()
}

#[derive(Clone, Copy)]
enum Extreme {
    Min,
    Max,
}

/// First element holding the extreme key; later ties never replace it.
fn first_by<'a, T>(
    items: impl Iterator<Item = &'a T>,
    key: impl Fn(&T) -> f64,
    extreme: Extreme,
) -> Option<&'a T>
where
    T: 'a,
{
    let mut best: Option<(&'a T, f64)> = None;
    for item in items {
        let k = key(item);
        let better = match (best, extreme) {
            (None, _) => true,
            (Some((_, b)), Extreme::Min) => k < b,
            (Some((_, b)), Extreme::Max) => k > b,
        };
        if better {
            best = Some((item, k));
        }
    }
    best.map(|(item, _)| item)
}
