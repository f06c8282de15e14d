use std::cmp::Ordering;
use std::collections::HashSet;

use super::model::{SortCriterion, VendorComparison, VendorId};

/// Currency cost charged per kilometer in the Value score.
pub const DEFAULT_DISTANCE_WEIGHT: f64 = 0.50;

/// Orders comparisons by favorite flag, then completeness, then `criterion`.
///
/// The sort is stable: vendors tied on every key keep their input order.
/// When `user_location_known` is false every distance counts as unknown.
pub fn rank(
    comparisons: Vec<VendorComparison>,
    criterion: SortCriterion,
    favorites: &HashSet<VendorId>,
    user_location_known: bool,
    distance_weight: f64,
) -> Vec<VendorComparison> {
    if comparisons.len() < 2 {
        return comparisons;
    }

    let cheapest_total = comparisons
        .iter()
        .map(|c| c.total)
        .fold(f64::INFINITY, f64::min);

    let mut keyed: Vec<(RankKey, VendorComparison)> = comparisons
        .into_iter()
        .map(|c| {
            let distance = c.calculated_distance.filter(|_| user_location_known);
            let criterion_key = match criterion {
                SortCriterion::Price => Some(c.total),
                SortCriterion::Distance => distance,
                SortCriterion::Value => {
                    distance.map(|d| value_score(c.total, cheapest_total, d, distance_weight))
                }
            };
            let key = RankKey {
                favorite: favorites.contains(&c.vendor.id),
                complete: c.is_complete,
                criterion: criterion_key,
            };
            (key, c)
        })
        .collect();

    // slice::sort_by is stable
    keyed.sort_by(|(a, _), (b, _)| a.compare(b));
    keyed.into_iter().map(|(_, c)| c).collect()
}

/// Cost-benefit score for the Value criterion. Lower ranks first.
pub fn value_score(total: f64, cheapest_total: f64, distance_km: f64, distance_weight: f64) -> f64 {
    (total - cheapest_total) - distance_km * distance_weight
}

struct RankKey {
    favorite: bool,
    complete: bool,
    /// `None` sorts after every known value.
    criterion: Option<f64>,
}

impl RankKey {
    fn compare(&self, other: &Self) -> Ordering {
        other
            .favorite
            .cmp(&self.favorite)
            .then_with(|| other.complete.cmp(&self.complete))
            .then_with(|| match (self.criterion, other.criterion) {
                (Some(a), Some(b)) => a.total_cmp(&b),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            })
    }
}
