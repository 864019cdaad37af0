use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const DEFAULT_AVAILABILITY_DATE: &str = "may 15, 2022";

/// A bookable treatment and its fixed slot template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Service {
    pub name: String,
    #[serde(default)]
    pub slots: Vec<String>,
    /// Any other stored columns, passed through untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Service {
    pub fn new(name: &str, slots: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            slots: slots.iter().map(|s| s.to_string()).collect(),
            extra: Map::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceName {
    pub name: String,
}

/// The columns of a booking the availability computation needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookedSlot {
    pub treatment: String,
    pub booking_date: String,
    pub slot: String,
}

#[derive(Debug, Deserialize)]
pub struct AvailabilityQuery {
    pub date: Option<String>,
}

impl AvailabilityQuery {
    /// An absent or empty `date` falls back to the default label.
    pub fn date_or_default(&self) -> &str {
        self.date
            .as_deref()
            .filter(|date| !date.is_empty())
            .unwrap_or(DEFAULT_AVAILABILITY_DATE)
    }
}
