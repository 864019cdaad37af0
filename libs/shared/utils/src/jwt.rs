use chrono::Utc;
use jsonwebtoken::{decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use thiserror::Error;
use tracing::debug;

use shared_models::auth::{Claims, Identity};
use shared_models::error::AppError;

#[derive(Error, Debug)]
pub enum TokenError {
    #[error("JWT secret is not set")]
    MissingSecret,

    #[error("Token expired")]
    Expired,

    #[error("Invalid token: {0}")]
    Invalid(String),

    #[error("Failed to sign token: {0}")]
    Signing(String),
}

impl From<TokenError> for AppError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::MissingSecret | TokenError::Signing(_) => AppError::Internal(err.to_string()),
            TokenError::Expired | TokenError::Invalid(_) => AppError::Forbidden,
        }
    }
}

/// Signs an HS256 access token for `email`, valid for `ttl_secs`.
pub fn issue_token(
    email: &str,
    role: Option<&str>,
    jwt_secret: &str,
    ttl_secs: i64,
) -> Result<String, TokenError> {
    if jwt_secret.is_empty() {
        return Err(TokenError::MissingSecret);
    }

    let iat = Utc::now().timestamp();
    let claims = Claims {
        email: email.to_string(),
        role: role.map(str::to_string),
        iat,
        exp: iat + ttl_secs,
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(jwt_secret.as_bytes()),
    )
    .map_err(|e| TokenError::Signing(e.to_string()))
}

pub fn validate_token(token: &str, jwt_secret: &str) -> Result<Identity, TokenError> {
    if jwt_secret.is_empty() {
        return Err(TokenError::MissingSecret);
    }

    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;

    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(jwt_secret.as_bytes()),
        &validation,
    )
    .map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => TokenError::Expired,
        _ => {
            debug!("Token rejected: {}", e);
            TokenError::Invalid(e.to_string())
        }
    })?;

    debug!("Token validated successfully for: {}", data.claims.email);
    Ok(data.claims.into())
}
