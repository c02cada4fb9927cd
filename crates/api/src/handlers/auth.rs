//! Login endpoint and the current-user lookup.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use stocktake_core::error::CoreError;
use stocktake_core::status::UserStatus;
use stocktake_db::models::user::UserResponse;
use stocktake_db::repositories::UserRepo;

use crate::auth::jwt::generate_access_token;
use crate::auth::password::verify_password;
use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAuth;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub token_type: &'static str,
    pub expires_in_mins: i64,
    pub user: UserResponse,
}

/// Uniform rejection for bad credentials. Wrong email and wrong
/// password are indistinguishable to the caller.
fn invalid_credentials() -> AppError {
    AppError::Core(CoreError::Unauthorized(
        "Invalid email or password".to_string(),
    ))
}

/// POST /api/v1/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginRequest>,
) -> AppResult<impl IntoResponse> {
    let user = UserRepo::find_by_email(&state.pool, &input.email)
        .await?
        .ok_or_else(invalid_credentials)?;

    let status = UserStatus::from_str(&user.status)
        .ok_or_else(|| AppError::InternalError(format!("Unknown user status '{}'", user.status)))?;
    if !status.may_log_in() {
        return Err(AppError::Core(CoreError::Forbidden(
            "Account is not allowed to log in".to_string(),
        )));
    }

    let valid = verify_password(&input.password, &user.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification failed: {e}")))?;
    if !valid {
        return Err(invalid_credentials());
    }

    UserRepo::record_login(&state.pool, user.id).await?;
    let roles = UserRepo::get_roles(&state.pool, user.id).await?;

    let access_token = generate_access_token(user.id, &roles, &state.config.jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation failed: {e}")))?;

    tracing::info!(user_id = user.id, email = %user.email, "User logged in");

    Ok(Json(LoginResponse {
        access_token,
        token_type: "Bearer",
        expires_in_mins: state.config.jwt.access_token_expiry_mins,
        user: UserResponse::from_user(user, roles),
    }))
}

/// GET /api/v1/auth/me
///
/// Profile of the caller identified by the bearer token.
pub async fn me(
    RequireAuth(auth): RequireAuth,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let user = UserRepo::find_by_id(&state.pool, auth.user_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: auth.user_id,
        }))?;
    let roles = UserRepo::get_roles(&state.pool, user.id).await?;
    Ok(Json(DataResponse {
        data: UserResponse::from_user(user, roles),
    }))
}
