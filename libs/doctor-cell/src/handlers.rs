use std::sync::Arc;

use axum::{
    extract::State,
    Json,
};
use serde_json::{Map, Value};

use shared_config::AppConfig;
use shared_models::error::AppError;

use crate::services::DoctorService;

#[axum::debug_handler]
pub async fn create_doctor(
    State(state): State<Arc<AppConfig>>,
    Json(doctor): Json<Map<String, Value>>,
) -> Result<Json<Value>, AppError> {
    let doctor_service = DoctorService::new(&state);

    let created = doctor_service.create_doctor(doctor).await?;

    Ok(Json(created))
}
