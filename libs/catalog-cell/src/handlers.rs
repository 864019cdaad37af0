use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};

use shared_config::AppConfig;
use shared_models::error::AppError;

use crate::models::{AvailabilityQuery, Service, ServiceName};
use crate::services::CatalogService;

#[axum::debug_handler]
pub async fn list_services(
    State(state): State<Arc<AppConfig>>,
) -> Result<Json<Vec<ServiceName>>, AppError> {
    let catalog = CatalogService::new(&state);

    let services = catalog.list_service_names().await?;

    Ok(Json(services))
}

#[axum::debug_handler]
pub async fn get_available(
    State(state): State<Arc<AppConfig>>,
    Query(query): Query<AvailabilityQuery>,
) -> Result<Json<Vec<Service>>, AppError> {
    let catalog = CatalogService::new(&state);

    let available = catalog.available_on(query.date_or_default()).await?;

    Ok(Json(available))
}
