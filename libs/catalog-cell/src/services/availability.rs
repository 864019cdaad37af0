use std::collections::{HashMap, HashSet};

use crate::models::{BookedSlot, Service};

/// Remaining open slots per service on `date`.
///
/// Each service keeps the slots of its template that no booking for the same
/// treatment on `date` has taken, in template order. Bookings on other dates
/// or for unknown treatments are ignored, and labels compare byte for byte.
/// The catalog is only borrowed; the result is a fresh copy.
pub fn compute_availability(date: &str, services: &[Service], bookings: &[BookedSlot]) -> Vec<Service> {
    let mut booked: HashMap<&str, HashSet<&str>> = HashMap::new();
    for booking in bookings.iter().filter(|b| b.booking_date == date) {
        booked
            .entry(booking.treatment.as_str())
            .or_default()
            .insert(booking.slot.as_str());
    }

    services
        .iter()
        .map(|service| {
            let taken = booked.get(service.name.as_str());
            let slots = service
                .slots
                .iter()
                .filter(|slot| taken.map_or(true, |t| !t.contains(slot.as_str())))
                .cloned()
                .collect();

            Service {
                name: service.name.clone(),
                slots,
                extra: service.extra.clone(),
            }
        })
        .collect()
}
