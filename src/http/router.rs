//! Router configuration for the HTTP API.
//!
//! This module sets up all routes, middleware (CORS, compression, tracing),
//! and creates the axum router ready for serving. The same handler set is
//! mounted under `/api/v1` and `/api/v2`.

use axum::{
    extract::DefaultBodyLimit,
    routing::get,
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers;
use super::state::AppState;

/// Create the main application router with all routes and middleware.
pub fn create_router(state: AppState) -> Router {
    // CORS configuration - permissive for development, should be restricted in production
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Beer CRUD endpoints; mounted once per API version below.
    let beer_api = Router::new()
        .route(
            "/beer",
            get(handlers::list_beers).post(handlers::create_beer),
        )
        .route(
            "/beer/{beer_id}",
            get(handlers::get_beer_by_id)
                .put(handlers::update_beer)
                .delete(handlers::delete_beer),
        )
        .route("/beerUpc/{upc}", get(handlers::get_beer_by_upc));

    // Combine all routes
    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/api/v1", beer_api.clone())
        .nest("/api/v2", beer_api)
        .layer(DefaultBodyLimit::max(1024 * 1024))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
