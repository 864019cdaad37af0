use serde_json::{json, Map, Value};
use tracing::{debug, info};

use shared_config::AppConfig;
use shared_database::{DbResult, SupabaseClient};
use shared_models::auth::ADMIN_ROLE;

use crate::models::{User, UserRecord};

pub const USERS_TABLE: &str = "users";

pub struct UserService {
    supabase: SupabaseClient,
}

impl UserService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    /// Inserts or merges the submitted fields into the user keyed by
    /// `email`. Submitted fields overwrite stored ones of the same name and
    /// leave the rest alone. The path email wins over any `email` in the
    /// body, and a submitted `role` is dropped: roles only change through
    /// promotion.
    pub async fn upsert_profile(&self, email: &str, mut submitted: Map<String, Value>) -> DbResult<User> {
        debug!("Upserting user: {}", email);

        submitted.remove("role");
        submitted.remove("email");

        let mut profile = self
            .find_by_email(email)
            .await?
            .map(|user| user.profile)
            .unwrap_or_default();
        profile.extend(submitted);

        let row = json!({
            "email": email,
            "profile": profile,
        });

        let stored: UserRecord = self.supabase.upsert_one(USERS_TABLE, "email", &row).await?;
        Ok(stored.into())
    }

    pub async fn find_by_email(&self, email: &str) -> DbResult<Option<User>> {
        let record: Option<UserRecord> = self.supabase.find_one(USERS_TABLE, &[("email", email)]).await?;
        Ok(record.map(User::from))
    }

    pub async fn list_users(&self) -> DbResult<Vec<User>> {
        let records: Vec<UserRecord> = self.supabase.find(USERS_TABLE, &[], None).await?;
        Ok(records.into_iter().map(User::from).collect())
    }

    /// Sets the role of `email` to admin. Returns the number of records
    /// changed; zero when no such user exists.
    pub async fn promote_to_admin(&self, email: &str) -> DbResult<usize> {
        let updated: Vec<UserRecord> = self.supabase.update(
            USERS_TABLE,
            &[("email", email)],
            &json!({ "role": ADMIN_ROLE }),
        ).await?;

        info!("Promoted {} to admin ({} records)", email, updated.len());
        Ok(updated.len())
    }

    pub async fn is_admin(&self, email: &str) -> DbResult<bool> {
        Ok(self.find_by_email(email).await?.is_some_and(|user| user.is_admin()))
    }
}
