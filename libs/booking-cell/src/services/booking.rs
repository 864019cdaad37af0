use tracing::{debug, info};

use shared_config::AppConfig;
use shared_database::{DatabaseError, DbResult, SupabaseClient};

use crate::models::{Booking, BookingError, BookingOutcome};

pub const BOOKINGS_TABLE: &str = "bookings";

pub struct BookingService {
    supabase: SupabaseClient,
}

impl BookingService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    /// Inserts `booking` unless one with the same treatment, date and patient
    /// name exists. The bookings table carries a unique index on those three
    /// columns, so the insert itself is the existence check and concurrent
    /// submissions cannot both succeed.
    pub async fn create_booking(&self, booking: Booking) -> Result<BookingOutcome, BookingError> {
        debug!(
            "Creating booking for {} on {} ({})",
            booking.patient_name, booking.booking_date, booking.treatment
        );

        match self.supabase.insert_one::<_, Booking>(BOOKINGS_TABLE, &booking).await {
            Ok(created) => {
                info!("Booking created for {} on {}", created.patient_email, created.booking_date);
                Ok(BookingOutcome::Created(created))
            }
            Err(DatabaseError::Conflict(detail)) => {
                debug!("Duplicate booking rejected: {}", detail);

                let existing = self.find_duplicate(&booking).await?
                    .ok_or_else(|| BookingError::MissingDuplicate(booking.patient_name.clone()))?;

                Ok(BookingOutcome::Duplicate(existing))
            }
            Err(e) => Err(e.into()),
        }
    }

    pub async fn find_duplicate(&self, booking: &Booking) -> DbResult<Option<Booking>> {
        self.supabase.find_one(
            BOOKINGS_TABLE,
            &[
                ("treatment", booking.treatment.as_str()),
                ("bookingDate", booking.booking_date.as_str()),
                ("patientName", booking.patient_name.as_str()),
            ],
        ).await
    }

    pub async fn bookings_for_patient(&self, patient_email: &str) -> DbResult<Vec<Booking>> {
        debug!("Fetching bookings for {}", patient_email);

        self.supabase.find(BOOKINGS_TABLE, &[("patientEmail", patient_email)], None).await
    }
}
