use anyhow::Context;
use async_trait::async_trait;
use sqlx::PgPool;
use tokio::sync::RwLock;

use super::services::ComparisonSnapshot;

#[async_trait]
pub trait SavingsStore: Send + Sync {
    /// Returns `false` when the session already saved a snapshot with this hash.
    async fn insert_if_absent(&self, snapshot: &ComparisonSnapshot) -> anyhow::Result<bool>;
    async fn exists(&self, session_id: &str, comparison_hash: &str) -> anyhow::Result<bool>;
    /// Newest first.
    async fn list_by_session(
        &self,
        session_id: &str,
        limit: i64,
        offset: i64,
    ) -> anyhow::Result<Vec<ComparisonSnapshot>>;
}

#[derive(Clone)]
pub struct PgSavingsStore {
    db: PgPool,
}

impl PgSavingsStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl SavingsStore for PgSavingsStore {
    async fn insert_if_absent(&self, s: &ComparisonSnapshot) -> anyhow::Result<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO savings_snapshots
                (id, session_id, vendor_chosen, list_name, total_chosen,
                 total_cheapest, savings, items_count, comparison_hash, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ON CONFLICT (session_id, comparison_hash) DO NOTHING
            "#,
        )
        .bind(s.id)
        .bind(&s.session_id)
        .bind(&s.vendor_chosen)
        .bind(&s.list_name)
        .bind(s.total_chosen)
        .bind(s.total_cheapest)
        .bind(s.savings)
        .bind(s.items_count)
        .bind(&s.comparison_hash)
        .bind(s.created_at)
        .execute(&self.db)
        .await
        .context("insert savings snapshot")?;
        Ok(result.rows_affected() == 1)
    }

    async fn exists(&self, session_id: &str, comparison_hash: &str) -> anyhow::Result<bool> {
        let (exists,): (bool,) = sqlx::query_as(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM savings_snapshots
                 WHERE session_id = $1 AND comparison_hash = $2
            )
            "#,
        )
        .bind(session_id)
        .bind(comparison_hash)
        .fetch_one(&self.db)
        .await
        .context("check savings snapshot")?;
        Ok(exists)
    }

    async fn list_by_session(
        &self,
        session_id: &str,
        limit: i64,
        offset: i64,
    ) -> anyhow::Result<Vec<ComparisonSnapshot>> {
        let rows = sqlx::query_as::<_, ComparisonSnapshot>(
            r#"
            SELECT id, session_id, vendor_chosen, list_name, total_chosen,
                   total_cheapest, savings, items_count, comparison_hash, created_at
              FROM savings_snapshots
             WHERE session_id = $1
             ORDER BY created_at DESC
             LIMIT $2 OFFSET $3
            "#,
        )
        .bind(session_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.db)
        .await
        .context("list savings snapshots")?;
        Ok(rows)
    }
}

#[derive(Default)]
pub struct InMemorySavingsStore {
    rows: RwLock<Vec<ComparisonSnapshot>>,
}

#[async_trait]
impl SavingsStore for InMemorySavingsStore {
    async fn insert_if_absent(&self, snapshot: &ComparisonSnapshot) -> anyhow::Result<bool> {
        let mut rows = self.rows.write().await;
        if rows.iter().any(|r| {
            r.session_id == snapshot.session_id && r.comparison_hash == snapshot.comparison_hash
        }) {
            return Ok(false);
        }
        rows.push(snapshot.clone());
        Ok(true)
    }

    async fn exists(&self, session_id: &str, comparison_hash: &str) -> anyhow::Result<bool> {
        let rows = self.rows.read().await;
        Ok(rows
            .iter()
            .any(|r| r.session_id == session_id && r.comparison_hash == comparison_hash))
    }

    async fn list_by_session(
        &self,
        session_id: &str,
        limit: i64,
        offset: i64,
    ) -> anyhow::Result<Vec<ComparisonSnapshot>> {
        let rows = self.rows.read().await;
        let mut mine: Vec<ComparisonSnapshot> = rows
            .iter()
            .filter(|r| r.session_id == session_id)
            .cloned()
            .collect();
        mine.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(mine
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::savings::services::{build_snapshot, SnapshotInput};
    use time::macros::datetime;

    fn snap(session: &str, name: &str, at: time::OffsetDateTime) -> ComparisonSnapshot {
        let input = SnapshotInput {
            vendor_chosen: "Extra".into(),
            list_name: name.into(),
            total_chosen: 12.0,
            total_cheapest: 10.0,
            items_count: 2,
        };
        build_snapshot(session, input, at).unwrap()
    }

    #[tokio::test]
    async fn dedups_by_hash() {
        let store = InMemorySavingsStore::default();
        let at = datetime!(2024-05-01 12:00 UTC);
        let first = snap("s1", "Weekly", at);
        let mut again = snap("s1", "Weekly", at);
        again.id = uuid::Uuid::new_v4();

        assert!(store.insert_if_absent(&first).await.unwrap());
        assert!(!store.insert_if_absent(&again).await.unwrap());
        assert!(store.exists("s1", &first.comparison_hash).await.unwrap());
        assert!(!store.exists("s1", "nope").await.unwrap());
    }

    #[tokio::test]
    async fn hashes_are_scoped_to_the_session() {
        let store = InMemorySavingsStore::default();
        let at = datetime!(2024-05-01 12:00 UTC);
        let mine = snap("s1", "Weekly", at);
        let theirs = snap("s2", "Weekly", at);
        assert_eq!(mine.comparison_hash, theirs.comparison_hash);

        assert!(store.insert_if_absent(&mine).await.unwrap());
        assert!(!store.exists("s2", &mine.comparison_hash).await.unwrap());
        assert!(store.insert_if_absent(&theirs).await.unwrap());
        assert!(store.exists("s2", &theirs.comparison_hash).await.unwrap());
    }

    #[tokio::test]
    async fn lists_newest_first_per_session() {
        let store = InMemorySavingsStore::default();
        store.insert_if_absent(&snap("s1", "Old", datetime!(2024-05-01 12:00 UTC))).await.unwrap();
        store.insert_if_absent(&snap("s1", "New", datetime!(2024-05-02 12:00 UTC))).await.unwrap();
        store.insert_if_absent(&snap("s2", "Other", datetime!(2024-05-03 12:00 UTC))).await.unwrap();

        let rows = store.list_by_session("s1", 20, 0).await.unwrap();
        let names: Vec<_> = rows.iter().map(|r| r.list_name.as_str()).collect();
        assert_eq!(names, vec!["New", "Old"]);

        let page = store.list_by_session("s1", 1, 1).await.unwrap();
        assert_eq!(page[0].list_name, "Old");
    }
}
