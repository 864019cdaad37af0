use std::sync::Arc;

use axum::{
    extract::{Extension, Path, State},
    Json,
};
use serde_json::{json, Map, Value};
use tracing::{debug, warn};

use shared_config::AppConfig;
use shared_models::auth::Identity;
use shared_models::error::AppError;
use shared_utils::jwt::issue_token;

use crate::models::{AdminStatus, UpdateOutcome, User};
use crate::services::UserService;

/// Login: store the profile and hand back a fresh access token.
#[axum::debug_handler]
pub async fn upsert_user(
    State(state): State<Arc<AppConfig>>,
    Path(email): Path<String>,
    Json(profile): Json<Map<String, Value>>,
) -> Result<Json<Value>, AppError> {
    let user_service = UserService::new(&state);

    let user = user_service.upsert_profile(&email, profile).await?;

    let token = issue_token(&user.email, user.role.as_deref(), &state.jwt_secret, state.token_ttl_secs)?;

    Ok(Json(json!({
        "result": user,
        "token": token
    })))
}

#[axum::debug_handler]
pub async fn make_admin(
    State(state): State<Arc<AppConfig>>,
    Extension(identity): Extension<Identity>,
    Path(email): Path<String>,
) -> Result<Json<UpdateOutcome>, AppError> {
    let user_service = UserService::new(&state);

    // The stored role decides, not the role claimed in the token.
    let requester_is_admin = user_service.is_admin(&identity.email).await?;
    if !requester_is_admin {
        warn!("{} attempted to promote {} without admin role", identity.email, email);
        return Err(AppError::Forbidden);
    }

    let modified_count = user_service.promote_to_admin(&email).await?;

    Ok(Json(UpdateOutcome { modified_count }))
}

#[axum::debug_handler]
pub async fn list_users(
    State(state): State<Arc<AppConfig>>,
    Extension(identity): Extension<Identity>,
) -> Result<Json<Vec<User>>, AppError> {
    debug!("{} listing users", identity.email);

    let user_service = UserService::new(&state);

    let users = user_service.list_users().await?;

    Ok(Json(users))
}

#[axum::debug_handler]
pub async fn check_admin(
    State(state): State<Arc<AppConfig>>,
    Path(email): Path<String>,
) -> Result<Json<AdminStatus>, AppError> {
    let user_service = UserService::new(&state);

    let admin = user_service.is_admin(&email).await?;

    Ok(Json(AdminStatus { admin }))
}
