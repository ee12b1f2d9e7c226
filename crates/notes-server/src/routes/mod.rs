//! Route definitions for the HTTP API.

pub mod health;
pub mod notes;

use axum::Router;

use crate::error::ApiError;
use crate::state::AppState;

/// Prefix of the versioned API.
pub const API_PREFIX: &str = "/api/v1";

/// Build the complete router with all routes.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(health::routes())
        .nest(API_PREFIX, notes::routes())
        .fallback(route_not_found)
        .with_state(state)
}

async fn route_not_found() -> ApiError {
    ApiError::NotFound("Route not found".to_string())
}
