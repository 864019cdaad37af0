use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use shared_models::auth::ADMIN_ROLE;

/// A user record. `email` is the natural key; everything the client sent on
/// login besides `email` and `role` is kept in `profile`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(flatten)]
    pub profile: Map<String, Value>,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role.as_deref() == Some(ADMIN_ROLE)
    }
}

/// A row of the `users` table. Free-form login fields live in the `profile`
/// jsonb column; only `email` and `role` are real columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub profile: Map<String, Value>,
}

impl From<UserRecord> for User {
    fn from(record: UserRecord) -> Self {
        let mut profile = record.profile;
        profile.remove("email");
        profile.remove("role");

        Self {
            email: record.email,
            role: record.role,
            profile,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminStatus {
    pub admin: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOutcome {
    pub modified_count: usize,
}
