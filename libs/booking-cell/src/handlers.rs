use std::sync::Arc;

use axum::{
    extract::{Extension, Query, State},
    Json,
};
use serde_json::{json, Value};
use tracing::debug;

use shared_config::AppConfig;
use shared_models::auth::Identity;
use shared_models::error::AppError;

use crate::models::{Booking, BookingOutcome, PatientQuery};
use crate::services::{dispatch_confirmation, BookingService};

#[axum::debug_handler]
pub async fn create_booking(
    State(state): State<Arc<AppConfig>>,
    Json(booking): Json<Booking>,
) -> Result<Json<Value>, AppError> {
    let booking_service = BookingService::new(&state);

    match booking_service.create_booking(booking).await? {
        BookingOutcome::Created(created) => {
            // Delivery outcome is logged by the spawned task.
            let _ = dispatch_confirmation(&state, created.clone());

            Ok(Json(json!({
                "success": true,
                "result": created
            })))
        }
        BookingOutcome::Duplicate(existing) => Ok(Json(json!({
            "success": false,
            "booking": existing
        }))),
    }
}

#[axum::debug_handler]
pub async fn list_patient_bookings(
    State(state): State<Arc<AppConfig>>,
    Extension(identity): Extension<Identity>,
    Query(query): Query<PatientQuery>,
) -> Result<Json<Vec<Booking>>, AppError> {
    let patient = match query.patient {
        Some(patient) if patient == identity.email => patient,
        other => {
            debug!("{} may not read bookings of {:?}", identity.email, other);
            return Err(AppError::Forbidden);
        }
    };

    let booking_service = BookingService::new(&state);

    let bookings = booking_service.bookings_for_patient(&patient).await?;

    Ok(Json(bookings))
}
