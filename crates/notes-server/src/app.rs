//! Assembles the router and the middleware stack.

use axum::{Router, middleware};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::ServerConfig;
use crate::middleware::request_id::{make_request_span, propagate_request_id, request_id_layer};
use crate::routes;
use crate::state::AppState;

/// The complete application: routes plus CORS, tracing and request ids.
pub fn build_app(state: AppState, config: &ServerConfig) -> Router {
    routes::build_router(state)
        .layer(middleware::from_fn(propagate_request_id))
        .layer(TraceLayer::new_for_http().make_span_with(make_request_span))
        .layer(request_id_layer())
        .layer(build_cors_layer(config))
}

/// Build CORS layer from configuration.
fn build_cors_layer(config: &ServerConfig) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    match config.cors_origins() {
        None => layer.allow_origin(Any),
        Some(origins) => layer.allow_origin(origins),
    }
}
