mod dto;
pub mod handlers;
pub mod repo;
pub mod services;

use crate::state::AppState;
use axum::Router;

pub use repo::{InMemorySavingsStore, PgSavingsStore, SavingsStore};
pub use services::{build_snapshot, ComparisonSnapshot, SnapshotError, SnapshotInput};

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(handlers::read_routes())
        .merge(handlers::write_routes())
}
