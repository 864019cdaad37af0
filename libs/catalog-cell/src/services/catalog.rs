use tracing::debug;

use shared_config::AppConfig;
use shared_database::{DbResult, SupabaseClient};

use crate::models::{BookedSlot, Service, ServiceName};
use crate::services::availability::compute_availability;

pub const SERVICES_TABLE: &str = "services";
pub const BOOKINGS_TABLE: &str = "bookings";

pub struct CatalogService {
    supabase: SupabaseClient,
}

impl CatalogService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    pub async fn list_service_names(&self) -> DbResult<Vec<ServiceName>> {
        debug!("Listing service names");

        self.supabase.find(SERVICES_TABLE, &[], Some("name")).await
    }

    /// Every service with the slots still open on `date`.
    pub async fn available_on(&self, date: &str) -> DbResult<Vec<Service>> {
        debug!("Computing availability for {}", date);

        let services: Vec<Service> = self.supabase.find(SERVICES_TABLE, &[], None).await?;
        let bookings: Vec<BookedSlot> = self.supabase.find(
            BOOKINGS_TABLE,
            &[("bookingDate", date)],
            Some("treatment,bookingDate,slot"),
        ).await?;

        debug!("{} services, {} bookings on {}", services.len(), bookings.len(), date);

        Ok(compute_availability(date, &services, &bookings))
    }
}
