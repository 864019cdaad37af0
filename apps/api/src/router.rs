use std::sync::Arc;

use axum::{
    Router,
    routing::get,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::{self, TraceLayer};
use tracing::Level;

use booking_cell::router::booking_routes;
use catalog_cell::router::catalog_routes;
use doctor_cell::router::doctor_routes;
use shared_config::AppConfig;
use user_cell::router::user_routes;

pub fn create_router(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/", get(|| async { "Clinic booking API is running!" }))
        .merge(catalog_routes(state.clone()))
        .merge(booking_routes(state.clone()))
        .merge(user_routes(state.clone()))
        .merge(doctor_routes(state))
}

/// The full application: routes plus tracing and CORS layers.
pub fn create_app(state: Arc<AppConfig>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    create_router(state)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(trace::DefaultMakeSpan::new()
                    .level(Level::INFO))
                .on_response(trace::DefaultOnResponse::new()
                    .level(Level::INFO)),
        )
        .layer(cors)
}
