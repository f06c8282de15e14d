use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use tracing::{error, instrument, warn};

use super::dto::{CompareRequest, CompareResponse};
use super::services::{compare_for_session, CompareForSessionError};
use crate::{session::SessionId, state::AppState};

pub fn compare_routes() -> Router<AppState> {
    Router::new().route("/comparisons", post(create_comparison))
}

/// POST /comparisons { items, criterion?, location? }
#[instrument(skip(state, body), fields(items = body.items.len(), criterion = ?body.criterion))]
pub async fn create_comparison(
    State(state): State<AppState>,
    session: Option<SessionId>,
    Json(body): Json<CompareRequest>,
) -> Result<Json<CompareResponse>, (StatusCode, String)> {
    let session_id = session.as_ref().map(|s| s.0.as_str());
    let result = compare_for_session(
        state.vendors.as_ref(),
        state.prices.as_ref(),
        state.favorites.as_ref(),
        session_id,
        &body.items,
        body.criterion,
        body.location,
        &state.options,
    )
    .await
    .map_err(|e| match e {
        CompareForSessionError::Invalid(e) => {
            warn!(error = %e, "comparison input rejected");
            (StatusCode::UNPROCESSABLE_ENTITY, e.to_string())
        }
        CompareForSessionError::Store(e) => {
            error!(error = %e, "comparison inputs unavailable");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    })?;

    Ok(Json(CompareResponse::from(result)))
}
