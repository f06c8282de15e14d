pub mod aggregate;
pub mod annotate;
pub mod distance;
mod dto;
pub mod error;
pub mod handlers;
pub mod model;
pub mod ranking;
pub mod services;

use crate::state::AppState;
use axum::Router;

pub use error::ComparisonError;
pub use services::{compare, ComparisonOptions, ComparisonResult};

pub fn router() -> Router<AppState> {
    Router::new().merge(handlers::compare_routes())
}
