use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{error, info, instrument, warn};

use crate::auth::dto::{LoginRequest, LoginResponse, PublicUser, RegisterRequest};
use crate::auth::jwt::{AuthUser, JwtKeys};
use crate::auth::password::{hash_password, verify_password};
use crate::auth::repo::User;
use crate::error::ApiError;
use crate::state::AppState;

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
}

pub fn account_routes() -> Router<AppState> {
    Router::new().route("/users/me", get(get_me).delete(delete_me))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<PublicUser>), ApiError> {
    if payload.first_name.trim().is_empty()
        || payload.last_name.trim().is_empty()
        || payload.email.trim().is_empty()
        || payload.password.is_empty()
    {
        return Err(ApiError::validation("all fields are required"));
    }

    // Uniqueness is enforced here, not by the schema.
    if User::find_by_email(&state.db, &payload.email).await?.is_some() {
        warn!(email = %payload.email, "email already registered");
        return Err(ApiError::DuplicateEmail);
    }

    let hash = hash_password(&payload.password).map_err(|e| {
        error!(error = %e, "hash_password failed");
        ApiError::internal("failed to register user")
    })?;

    let user = User::create(
        &state.db,
        &payload.first_name,
        &payload.last_name,
        &payload.email,
        &hash,
    )
    .await?;

    info!(user_id = user.meta.id, "user registered");
    Ok((StatusCode::CREATED, Json(user.into())))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    if payload.email.is_empty() || payload.password.is_empty() {
        return Err(ApiError::validation("email and password are required"));
    }

    let user = User::find_by_email(&state.db, &payload.email)
        .await?
        .ok_or_else(|| {
            warn!("login with unknown email");
            ApiError::not_found("account does not exist")
        })?;

    let ok = verify_password(&payload.password, &user.password_hash).map_err(|e| {
        error!(error = %e, "verify_password failed");
        ApiError::unauthorized("invalid email or password")
    })?;
    if !ok {
        warn!(user_id = user.meta.id, "login with invalid password");
        return Err(ApiError::unauthorized("invalid email or password"));
    }

    let keys = JwtKeys::from_ref(&state);
    let token = keys.sign(user.meta.id, &user.email)?;

    info!(user_id = user.meta.id, "user logged in");
    Ok(Json(LoginResponse {
        message: "login successful".to_string(),
        token,
    }))
}

#[instrument(skip(state, claims))]
pub async fn get_me(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
) -> Result<Json<PublicUser>, ApiError> {
    let user = User::find_by_id(&state.db, claims.sub)
        .await?
        .ok_or_else(|| ApiError::not_found("user not found"))?;
    Ok(Json(user.into()))
}

#[instrument(skip(state, claims))]
pub async fn delete_me(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
) -> Result<StatusCode, ApiError> {
    User::find_by_id(&state.db, claims.sub)
        .await?
        .ok_or_else(|| ApiError::not_found("user not found"))?;

    let deleted = User::delete(&state.db, claims.sub).await?;
    if deleted == 0 {
        return Err(ApiError::internal("failed to delete user"));
    }

    info!(user_id = claims.sub, "account deleted");
    Ok(StatusCode::NO_CONTENT)
}
