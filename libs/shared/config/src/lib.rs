use std::env;
use reqwest::Client;
use tracing::warn;

pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_TOKEN_TTL_SECS: i64 = 3600;
pub const DEFAULT_EMAIL_BASE_URL: &str = "https://api.sendgrid.com";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub supabase_url: String,
    pub supabase_anon_key: String,
    pub jwt_secret: String,
    pub token_ttl_secs: i64,
    pub port: u16,
    pub email_api_key: String,
    pub email_sender: String,
    pub email_base_url: String,
    /// Outbound HTTP client. Clones share one connection pool.
    pub http_client: Client,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let config = Self {
            supabase_url: env::var("SUPABASE_URL")
                .unwrap_or_else(|_| {
                    warn!("SUPABASE_URL not set, using empty value");
                    String::new()
                }),
            supabase_anon_key: env::var("SUPABASE_ANON_PUBLIC_KEY")
                .unwrap_or_else(|_| {
                    warn!("SUPABASE_ANON_PUBLIC_KEY not set, using empty value");
                    String::new()
                }),
            jwt_secret: env::var("ACCESS_TOKEN_SECRET")
                .unwrap_or_else(|_| {
                    warn!("ACCESS_TOKEN_SECRET not set, using empty value");
                    String::new()
                }),
            token_ttl_secs: parse_or_default("TOKEN_TTL_SECONDS", DEFAULT_TOKEN_TTL_SECS),
            port: parse_or_default("PORT", DEFAULT_PORT),
            email_api_key: env::var("SENDGRID_API_KEY")
                .unwrap_or_else(|_| {
                    warn!("SENDGRID_API_KEY not set, booking emails are disabled");
                    String::new()
                }),
            email_sender: env::var("EMAIL_SENDER")
                .unwrap_or_else(|_| {
                    warn!("EMAIL_SENDER not set, booking emails are disabled");
                    String::new()
                }),
            email_base_url: env::var("SENDGRID_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_EMAIL_BASE_URL.to_string()),
            http_client: Client::new(),
        };

        if !config.is_configured() {
            warn!("Application not fully configured - missing environment variables");
        }

        config
    }

    pub fn is_configured(&self) -> bool {
        !self.supabase_url.is_empty()
            && !self.supabase_anon_key.is_empty()
            && !self.jwt_secret.is_empty()
    }

    pub fn is_email_configured(&self) -> bool {
        !self.email_api_key.is_empty()
            && !self.email_sender.is_empty()
            && !self.email_base_url.is_empty()
    }
}

fn parse_or_default<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw.parse().unwrap_or_else(|_| {
            warn!("{} has invalid value '{}', using default {}", key, raw, default);
            default
        }),
        Err(_) => default,
    }
}
