use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use time::OffsetDateTime;
use tracing::{error, info, instrument, warn};

use super::dto::{CheckQuery, CheckResponse, Pagination, SaveSnapshotResponse};
use super::services::{build_snapshot, ComparisonSnapshot, SnapshotInput};
use crate::{session::SessionId, state::AppState};

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/savings", get(list_savings))
        .route("/savings/check", get(check_savings))
}

pub fn write_routes() -> Router<AppState> {
    Router::new().route("/savings", post(save_snapshot))
}

#[instrument(skip(state, body))]
pub async fn save_snapshot(
    State(state): State<AppState>,
    SessionId(session_id): SessionId,
    Json(body): Json<SnapshotInput>,
) -> Result<(StatusCode, Json<SaveSnapshotResponse>), (StatusCode, String)> {
    let snapshot = build_snapshot(&session_id, body, OffsetDateTime::now_utc()).map_err(|e| {
        warn!(error = %e, "snapshot rejected");
        (StatusCode::UNPROCESSABLE_ENTITY, e.to_string())
    })?;

    let inserted = state.savings.insert_if_absent(&snapshot).await.map_err(|e| {
        error!(error = %e, "insert snapshot failed");
        internal(e)
    })?;

    if !inserted {
        info!(hash = %snapshot.comparison_hash, "duplicate snapshot ignored");
        return Ok((
            StatusCode::OK,
            Json(SaveSnapshotResponse {
                duplicate: true,
                snapshot,
            }),
        ));
    }

    info!(id = %snapshot.id, savings = snapshot.savings, "snapshot saved");
    Ok((
        StatusCode::CREATED,
        Json(SaveSnapshotResponse {
            duplicate: false,
            snapshot,
        }),
    ))
}

#[instrument(skip(state))]
pub async fn check_savings(
    State(state): State<AppState>,
    SessionId(session_id): SessionId,
    Query(q): Query<CheckQuery>,
) -> Result<Json<CheckResponse>, (StatusCode, String)> {
    let exists = state
        .savings
        .exists(&session_id, &q.comparison_hash)
        .await
        .map_err(internal)?;
    Ok(Json(CheckResponse { exists }))
}

#[instrument(skip(state))]
pub async fn list_savings(
    State(state): State<AppState>,
    SessionId(session_id): SessionId,
    Query(p): Query<Pagination>,
) -> Result<Json<Vec<ComparisonSnapshot>>, (StatusCode, String)> {
    let rows = state
        .savings
        .list_by_session(&session_id, p.limit.clamp(1, 100), p.offset.max(0))
        .await
        .map_err(internal)?;
    Ok(Json(rows))
}

fn internal(e: anyhow::Error) -> (StatusCode, String) {
    (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(name: &str) -> SnapshotInput {
        SnapshotInput {
            vendor_chosen: "Extra".into(),
            list_name: name.into(),
            total_chosen: 30.0,
            total_cheapest: 24.0,
            items_count: 5,
        }
    }

    fn session() -> SessionId {
        SessionId("guest_12345678".into())
    }

    #[tokio::test]
    async fn save_then_check_then_list() {
        let state = AppState::fake();
        let (status, Json(saved)) =
            save_snapshot(State(state.clone()), session(), Json(body("Weekly")))
                .await
                .unwrap();
        assert_eq!(status, StatusCode::CREATED);
        assert!(!saved.duplicate);
        assert_eq!(saved.snapshot.savings, 6.0);

        let Json(check) = check_savings(
            State(state.clone()),
            session(),
            Query(CheckQuery {
                comparison_hash: saved.snapshot.comparison_hash.clone(),
            }),
        )
        .await
        .unwrap();
        assert!(check.exists);

        let Json(other) = check_savings(
            State(state.clone()),
            SessionId("guest_someone_else".into()),
            Query(CheckQuery {
                comparison_hash: saved.snapshot.comparison_hash.clone(),
            }),
        )
        .await
        .unwrap();
        assert!(!other.exists);

        let Json(rows) = list_savings(
            State(state),
            session(),
            Query(Pagination { limit: 20, offset: 0 }),
        )
        .await
        .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].list_name, "Weekly");
    }

    #[tokio::test]
    async fn rejects_zero_cheapest_total() {
        let state = AppState::fake();
        let mut b = body("Weekly");
        b.total_cheapest = 0.0;
        let (status, _) = save_snapshot(State(state), session(), Json(b))
            .await
            .unwrap_err();
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }
}
