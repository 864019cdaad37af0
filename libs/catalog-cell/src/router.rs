use std::sync::Arc;

use axum::{
    Router,
    routing::get,
};

use shared_config::AppConfig;

use crate::handlers;

pub fn catalog_routes(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/service", get(handlers::list_services))
        .route("/available", get(handlers::get_available))
        .with_state(state)
}
