use std::sync::Arc;

use axum::{
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
    body::Body,
};
use axum_extra::{typed_header::TypedHeaderRejection, TypedHeader};
use headers::{authorization::Bearer, Authorization};
use tracing::debug;

use shared_models::error::AppError;
use shared_config::AppConfig;

use crate::jwt::validate_token;

/// Bearer-token guard. A missing header is `401 unauthorized`; anything that
/// is present but unusable (wrong scheme, bad signature, expired) is
/// `403 forbidden`. On success the caller's `Identity` is placed in the
/// request extensions.
pub async fn auth_middleware(
    State(config): State<Arc<AppConfig>>,
    bearer: Result<TypedHeader<Authorization<Bearer>>, TypedHeaderRejection>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let TypedHeader(auth) = match bearer {
        Ok(header) => header,
        Err(rejection) if rejection.is_missing() => return Err(AppError::Unauthorized),
        Err(rejection) => {
            debug!("Unusable authorization header: {}", rejection);
            return Err(AppError::Forbidden);
        }
    };

    let identity = validate_token(auth.token(), &config.jwt_secret)?;

    request.extensions_mut().insert(identity);

    Ok(next.run(request).await)
}
