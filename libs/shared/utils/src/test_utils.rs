use std::sync::Arc;
use chrono::{Duration, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use base64::{Engine as _, engine::general_purpose};
use serde_json::{json, Value};

use shared_config::{AppConfig, DEFAULT_EMAIL_BASE_URL, DEFAULT_PORT, DEFAULT_TOKEN_TTL_SECS};
use shared_models::auth::Identity;

pub struct TestConfig {
    pub jwt_secret: String,
    pub supabase_url: String,
    pub supabase_anon_key: String,
    pub email_base_url: Option<String>,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "test-secret-key-for-jwt-validation-must-be-long-enough".to_string(),
            supabase_url: "http://localhost:54321".to_string(),
            supabase_anon_key: "test-anon-key".to_string(),
            email_base_url: None,
        }
    }
}

impl TestConfig {
    /// Config whose database calls go to `uri` (usually a wiremock server).
    pub fn with_database(uri: &str) -> Self {
        Self {
            supabase_url: uri.to_string(),
            ..Self::default()
        }
    }

    /// Also routes outbound email to `uri`.
    pub fn with_email(mut self, uri: &str) -> Self {
        self.email_base_url = Some(uri.to_string());
        self
    }

    pub fn to_app_config(&self) -> AppConfig {
        let (email_api_key, email_sender, email_base_url) = match &self.email_base_url {
            Some(url) => ("SG.test-key".to_string(), "clinic@example.com".to_string(), url.clone()),
            None => (String::new(), String::new(), DEFAULT_EMAIL_BASE_URL.to_string()),
        };

        AppConfig {
            supabase_url: self.supabase_url.clone(),
            supabase_anon_key: self.supabase_anon_key.clone(),
            jwt_secret: self.jwt_secret.clone(),
            token_ttl_secs: DEFAULT_TOKEN_TTL_SECS,
            port: DEFAULT_PORT,
            email_api_key,
            email_sender,
            email_base_url,
            http_client: reqwest::Client::new(),
        }
    }

    pub fn to_arc(&self) -> Arc<AppConfig> {
        Arc::new(self.to_app_config())
    }
}

pub struct TestUser {
    pub email: String,
    pub role: Option<String>,
}

impl Default for TestUser {
    fn default() -> Self {
        Self {
            email: "test@example.com".to_string(),
            role: None,
        }
    }
}

impl TestUser {
    pub fn new(email: &str, role: Option<&str>) -> Self {
        Self {
            email: email.to_string(),
            role: role.map(str::to_string),
        }
    }

    pub fn patient(email: &str) -> Self {
        Self::new(email, None)
    }

    pub fn admin(email: &str) -> Self {
        Self::new(email, Some("admin"))
    }

    pub fn to_identity(&self) -> Identity {
        Identity {
            email: self.email.clone(),
            role: self.role.clone(),
        }
    }
}

/// Builds HS256 tokens by hand so the validator is checked against an
/// encoder other than its own.
pub struct JwtTestUtils;

impl JwtTestUtils {
    pub fn create_test_token(user: &TestUser, secret: &str, exp_hours: Option<i64>) -> String {
        let now = Utc::now();
        let exp = now + Duration::hours(exp_hours.unwrap_or(1));

        let header = json!({
            "alg": "HS256",
            "typ": "JWT"
        });

        let mut payload = json!({
            "email": user.email,
            "iat": now.timestamp(),
            "exp": exp.timestamp()
        });
        if let Some(role) = &user.role {
            payload["role"] = json!(role);
        }

        let header_encoded = general_purpose::URL_SAFE_NO_PAD.encode(header.to_string());
        let payload_encoded = general_purpose::URL_SAFE_NO_PAD.encode(payload.to_string());

        let signing_input = format!("{}.{}", header_encoded, payload_encoded);

        let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes())
            .expect("HMAC can take key of any size");
        mac.update(signing_input.as_bytes());
        let signature = mac.finalize().into_bytes();
        let signature_encoded = general_purpose::URL_SAFE_NO_PAD.encode(signature);

        format!("{}.{}", signing_input, signature_encoded)
    }

    pub fn create_expired_token(user: &TestUser, secret: &str) -> String {
        Self::create_test_token(user, secret, Some(-1))
    }

    pub fn create_invalid_signature_token(user: &TestUser) -> String {
        Self::create_test_token(user, "wrong-secret", Some(1))
    }

    pub fn create_malformed_token() -> String {
        "invalid.token.format".to_string()
    }
}

pub struct MockSupabaseResponses;

impl MockSupabaseResponses {
    pub fn service_row(name: &str, slots: &[&str]) -> Value {
        json!({
            "name": name,
            "slots": slots
        })
    }

    pub fn booking_row(treatment: &str, date: &str, patient_name: &str, patient_email: &str, slot: &str) -> Value {
        json!({
            "treatment": treatment,
            "bookingDate": date,
            "patientName": patient_name,
            "patientEmail": patient_email,
            "slot": slot
        })
    }

    pub fn user_row(email: &str, role: Option<&str>) -> Value {
        let mut row = json!({
            "email": email,
            "profile": { "name": "Test User" }
        });
        if let Some(role) = role {
            row["role"] = json!(role);
        }
        row
    }

    pub fn error_response(message: &str, code: &str) -> Value {
        json!({
            "message": message,
            "code": code
        })
    }
}
