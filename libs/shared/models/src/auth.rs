use serde::{Deserialize, Serialize};

pub const ADMIN_ROLE: &str = "admin";

/// Claims carried by an access token. Only the identity is signed; profile
/// fields live in the users table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    pub iat: i64,
    pub exp: i64,
}

/// The authenticated caller, attached to request extensions by the guard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Identity {
    pub email: String,
    pub role: Option<String>,
}

impl Identity {
    pub fn is_admin(&self) -> bool {
        self.role.as_deref() == Some(ADMIN_ROLE)
    }
}

impl From<Claims> for Identity {
    fn from(claims: Claims) -> Self {
        Self {
            email: claims.email,
            role: claims.role,
        }
    }
}
