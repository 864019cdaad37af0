use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use shared_database::DatabaseError;
use shared_models::error::AppError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub treatment: String,
    pub booking_date: String,
    pub patient_name: String,
    pub patient_email: String,
    pub slot: String,
    /// Stored columns beyond the booking itself (row id, timestamps).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Booking {
    pub fn new(treatment: &str, booking_date: &str, patient_name: &str, patient_email: &str, slot: &str) -> Self {
        Self {
            treatment: treatment.to_string(),
            booking_date: booking_date.to_string(),
            patient_name: patient_name.to_string(),
            patient_email: patient_email.to_string(),
            slot: slot.to_string(),
            extra: Map::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum BookingOutcome {
    Created(Booking),
    /// A booking with the same treatment, date and patient name already
    /// exists; nothing was written.
    Duplicate(Booking),
}

#[derive(Debug, Deserialize)]
pub struct PatientQuery {
    pub patient: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DeliveryStatus {
    Sent,
    Skipped(String),
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct DeliveryReceipt {
    pub id: uuid::Uuid,
    pub recipient: String,
    pub status: DeliveryStatus,
}

#[derive(Error, Debug)]
pub enum BookingError {
    #[error(transparent)]
    Database(#[from] DatabaseError),

    #[error("Booking for {0} conflicted but no existing record was found")]
    MissingDuplicate(String),
}

impl From<BookingError> for AppError {
    fn from(err: BookingError) -> Self {
        match err {
            BookingError::Database(e) => e.into(),
            BookingError::MissingDuplicate(_) => AppError::Database(err.to_string()),
        }
    }
}
