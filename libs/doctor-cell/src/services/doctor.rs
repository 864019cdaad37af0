use serde_json::{json, Map, Value};
use tracing::{debug, info};

use shared_config::AppConfig;
use shared_database::{DbResult, SupabaseClient};

pub const DOCTORS_TABLE: &str = "doctors";

pub struct DoctorService {
    supabase: SupabaseClient,
}

impl DoctorService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    /// Stores the submitted doctor document as-is in the `data` jsonb
    /// column and returns it flattened together with the row's own columns.
    pub async fn create_doctor(&self, doctor: Map<String, Value>) -> DbResult<Value> {
        debug!("Creating doctor record with {} fields", doctor.len());

        let row: Map<String, Value> = self
            .supabase
            .insert_one(DOCTORS_TABLE, &json!({ "data": doctor }))
            .await?;

        info!("Doctor record created");
        Ok(Value::Object(flatten_row(row)))
    }
}

/// Lifts the fields of the `data` column to the top level. Table columns
/// such as `id` take precedence over document fields of the same name.
fn flatten_row(mut row: Map<String, Value>) -> Map<String, Value> {
    let mut document = match row.remove("data") {
        Some(Value::Object(data)) => data,
        _ => Map::new(),
    };
    document.extend(row);
    document
}
