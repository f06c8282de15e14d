use base64ct::{Base64Unpadded, Encoding};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::comparison::services::ComparisonResult;

#[derive(Debug, Error, PartialEq)]
pub enum SnapshotError {
    #[error("not enough data to compute savings")]
    MissingCheapest,
    #[error("list name must not be blank")]
    BlankListName,
    #[error("vendor {0} is not part of the comparison")]
    UnknownVendor(String),
    #[error("vendor {0} does not price every item on the list")]
    IncompleteVendor(String),
}

/// What the user chose, before it is stamped and hashed.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SnapshotInput {
    pub vendor_chosen: String,
    pub list_name: String,
    pub total_chosen: f64,
    pub total_cheapest: f64,
    pub items_count: i64,
}

impl SnapshotInput {
    /// Builds the input from a finished comparison and the vendor the user picked.
    pub fn from_result(
        result: &ComparisonResult,
        vendor_id: &str,
        list_name: &str,
    ) -> Result<Self, SnapshotError> {
        let chosen = result
            .find(vendor_id)
            .ok_or_else(|| SnapshotError::UnknownVendor(vendor_id.to_string()))?;
        if !chosen.is_complete {
            return Err(SnapshotError::IncompleteVendor(vendor_id.to_string()));
        }
        let cheapest = result
            .summary
            .cheapest
            .as_ref()
            .ok_or(SnapshotError::MissingCheapest)?;
        Ok(Self {
            vendor_chosen: chosen.vendor.name.clone(),
            list_name: list_name.to_string(),
            total_chosen: chosen.total,
            total_cheapest: cheapest.total,
            items_count: result.total_units,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct ComparisonSnapshot {
    pub id: Uuid,
    pub session_id: String,
    pub vendor_chosen: String,
    pub list_name: String,
    pub total_chosen: f64,
    pub total_cheapest: f64,
    pub savings: f64,
    pub items_count: i64,
    pub comparison_hash: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

pub fn build_snapshot(
    session_id: &str,
    input: SnapshotInput,
    now: OffsetDateTime,
) -> Result<ComparisonSnapshot, SnapshotError> {
    if input.total_cheapest == 0.0 || !input.total_cheapest.is_finite() {
        return Err(SnapshotError::MissingCheapest);
    }
    let list_name = input.list_name.trim().to_string();
    if list_name.is_empty() {
        return Err(SnapshotError::BlankListName);
    }

    let savings = (input.total_chosen - input.total_cheapest).max(0.0);
    let comparison_hash = comparison_hash(
        now,
        &list_name,
        input.items_count,
        input.total_chosen,
        input.total_cheapest,
    );

    Ok(ComparisonSnapshot {
        id: Uuid::new_v4(),
        session_id: session_id.to_string(),
        vendor_chosen: input.vendor_chosen,
        list_name,
        total_chosen: input.total_chosen,
        total_cheapest: input.total_cheapest,
        savings,
        items_count: input.items_count,
        comparison_hash,
        created_at: now,
    })
}

/// Content key for dedup: unpadded base64 of the joined fields.
pub fn comparison_hash(
    at: OffsetDateTime,
    list_name: &str,
    items_count: i64,
    total_chosen: f64,
    total_cheapest: f64,
) -> String {
    let stamp = at
        .format(&Rfc3339)
        .unwrap_or_else(|_| at.unix_timestamp().to_string());
    let raw = format!("{stamp}_{list_name}_{items_count}_{total_chosen}_{total_cheapest}");
    Base64Unpadded::encode_string(raw.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn input() -> SnapshotInput {
        SnapshotInput {
            vendor_chosen: "Carrefour".into(),
            list_name: "  Weekly  ".into(),
            total_chosen: 25.5,
            total_cheapest: 20.0,
            items_count: 4,
        }
    }

    #[test]
    fn builds_snapshot_with_savings() {
        let now = datetime!(2024-05-01 12:00 UTC);
        let s = build_snapshot("sess-0001", input(), now).unwrap();
        assert_eq!(s.list_name, "Weekly");
        assert_eq!(s.savings, 5.5);
        assert_eq!(s.created_at, now);
        assert_eq!(s.comparison_hash, comparison_hash(now, "Weekly", 4, 25.5, 20.0));
    }

    #[test]
    fn savings_never_negative() {
        let mut i = input();
        i.total_chosen = 10.0;
        let s = build_snapshot("sess-0001", i, OffsetDateTime::UNIX_EPOCH).unwrap();
        assert_eq!(s.savings, 0.0);
    }

    #[test]
    fn rejects_missing_data() {
        let mut i = input();
        i.total_cheapest = 0.0;
        assert_eq!(
            build_snapshot("s", i, OffsetDateTime::UNIX_EPOCH).unwrap_err(),
            SnapshotError::MissingCheapest
        );

        let mut i = input();
        i.list_name = "   ".into();
        assert_eq!(
            build_snapshot("s", i, OffsetDateTime::UNIX_EPOCH).unwrap_err(),
            SnapshotError::BlankListName
        );
    }

    #[test]
    fn hash_is_content_derived() {
        let at = datetime!(2024-05-01 12:00 UTC);
        let h = comparison_hash(at, "Weekly", 4, 25.5, 20.0);
        assert_eq!(h, comparison_hash(at, "Weekly", 4, 25.5, 20.0));
        assert_ne!(h, comparison_hash(at, "Weekly", 5, 25.5, 20.0));
        assert!(!h.contains('='));
        let decoded = Base64Unpadded::decode_vec(&h).unwrap();
        assert_eq!(
            String::from_utf8(decoded).unwrap(),
            "2024-05-01T12:00:00Z_Weekly_4_25.5_20"
        );
    }

    #[test]
    fn input_from_comparison_result() {
        use crate::comparison::model::{PriceEntry, ShoppingListItem, SortCriterion, Vendor};
        use crate::comparison::services::{compare, ComparisonOptions};
        use std::collections::HashSet;

        let list = vec![ShoppingListItem::new("p1", 3)];
        let vendors = vec![Vendor::new("a", "Extra"), Vendor::new("b", "Dia"), Vendor::new("c", "Nope")];
        let prices = vec![PriceEntry::new("a", "p1", 2.0), PriceEntry::new("b", "p1", 3.0)];
        let result = compare(
            &list,
            &vendors,
            &prices,
            SortCriterion::Price,
            None,
            &HashSet::new(),
            &ComparisonOptions::default(),
        )
        .unwrap();

        let i = SnapshotInput::from_result(&result, "b", "Weekly").unwrap();
        assert_eq!(i.vendor_chosen, "Dia");
        assert_eq!(i.total_chosen, 9.0);
        assert_eq!(i.total_cheapest, 6.0);
        assert_eq!(i.items_count, 3);

        assert_eq!(
            SnapshotInput::from_result(&result, "c", "Weekly").unwrap_err(),
            SnapshotError::IncompleteVendor("c".into())
        );
        assert_eq!(
            SnapshotInput::from_result(&result, "zz", "Weekly").unwrap_err(),
            SnapshotError::UnknownVendor("zz".into())
        );
    }
}
