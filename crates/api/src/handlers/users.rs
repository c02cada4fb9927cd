//! Admin user management plus the password change endpoint.
//!
//! Users are never hard-deleted; DELETE disables the account, which
//! keeps authorship references on movements and documents intact.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use stocktake_core::error::CoreError;
use stocktake_core::export::Table;
use stocktake_core::status::UserStatus;
use stocktake_core::types::DbId;
use stocktake_core::validation;
use stocktake_core::view::{filter_and_sort, paginate, ViewSpec};
use stocktake_db::models::user::{ChangePassword, CreateUser, UpdateUser, UserResponse};
use stocktake_db::repositories::UserRepo;

use crate::auth::password::hash_password;
use crate::error::{AppError, AppResult, FieldError};
use crate::handlers::export::{export_attachment, ExportFormat};
use crate::middleware::rbac::{RequireAdmin, RequireAuth};
use crate::query::ListParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// Resolve role names, rejecting any the `roles` table does not know.
async fn resolve_roles(pool: &sqlx::PgPool, names: &[String]) -> AppResult<Vec<DbId>> {
    let ids = UserRepo::find_role_ids(pool, names).await?;
    if ids.len() != names.len() {
        return Err(AppError::Core(CoreError::Validation(format!(
            "Unknown role in: {}",
            names.join(", ")
        ))));
    }
    Ok(ids)
}

async fn ensure_email_free(
    pool: &sqlx::PgPool,
    email: &str,
    exclude_id: Option<DbId>,
) -> AppResult<()> {
    if let Some(existing) = UserRepo::find_by_email(pool, email).await? {
        if Some(existing.id) != exclude_id {
            return Err(AppError::Core(CoreError::Conflict(format!(
                "Email '{email}' is already registered"
            ))));
        }
    }
    Ok(())
}

fn hash_or_500(password: &str) -> AppResult<String> {
    hash_password(password)
        .map_err(|e| AppError::InternalError(format!("Password hashing failed: {e}")))
}

// ---------------------------------------------------------------------------
// CRUD (admin only)
// ---------------------------------------------------------------------------

/// GET /api/v1/users
pub async fn list_users(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> AppResult<impl IntoResponse> {
    let rows = UserRepo::list_rows(&state.pool).await?;
    let spec = params.view_spec();
    let filtered = filter_and_sort(&rows, &spec).map_err(CoreError::from)?;
    let page = paginate(
        filtered.into_iter().cloned().collect::<Vec<_>>(),
        params.page_spec(),
    );
    Ok(Json(page))
}

/// POST /api/v1/users
pub async fn create_user(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Json(input): Json<CreateUser>,
) -> AppResult<impl IntoResponse> {
    let mut fields = Vec::new();
    if let Err(e) = validation::validate_email(&input.email) {
        fields.push(FieldError::new("email", e.to_string()));
    }
    if let Err(e) = validation::require_text("Full name", &input.full_name) {
        fields.push(FieldError::new("full_name", e.to_string()));
    }
    if let Err(e) = validation::validate_new_password(&input.password, &input.password_confirmation)
    {
        fields.push(FieldError::new("password", e.to_string()));
    }
    if !fields.is_empty() {
        return Err(AppError::Fields(fields));
    }

    let role_ids = resolve_roles(&state.pool, &input.roles).await?;
    ensure_email_free(&state.pool, &input.email, None).await?;
    let password_hash = hash_or_500(&input.password)?;

    let status = input.status.unwrap_or(UserStatus::PendingApproval);
    let user = UserRepo::create(
        &state.pool,
        &input.email,
        &input.full_name,
        input.phone.as_deref(),
        status.as_str(),
        input.avatar_url.as_deref(),
        &password_hash,
        &role_ids,
    )
    .await?;
    let roles = UserRepo::get_roles(&state.pool, user.id).await?;

    tracing::info!(
        user_id = user.id,
        email = %user.email,
        admin_id = admin.user_id,
        "User created",
    );

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: UserResponse::from_user(user, roles),
        }),
    ))
}

/// GET /api/v1/users/{id}
pub async fn get_user(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let user = UserRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "User", id }))?;
    let roles = UserRepo::get_roles(&state.pool, id).await?;
    Ok(Json(DataResponse {
        data: UserResponse::from_user(user, roles),
    }))
}

/// PUT /api/v1/users/{id}
pub async fn update_user(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateUser>,
) -> AppResult<impl IntoResponse> {
    if let Some(email) = &input.email {
        validation::validate_email(email)?;
        ensure_email_free(&state.pool, email, Some(id)).await?;
    }
    if let Some(name) = &input.full_name {
        validation::require_text("Full name", name)?;
    }
    let role_ids = match &input.roles {
        Some(names) => Some(resolve_roles(&state.pool, names).await?),
        None => None,
    };

    let user = UserRepo::update(&state.pool, id, &input, role_ids.as_deref())
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "User", id }))?;
    let roles = UserRepo::get_roles(&state.pool, id).await?;

    tracing::info!(user_id = id, admin_id = admin.user_id, "User updated");

    Ok(Json(DataResponse {
        data: UserResponse::from_user(user, roles),
    }))
}

/// DELETE /api/v1/users/{id}
///
/// Disables the account. An already-disabled account 404s here so the
/// operation stays idempotent-visible to the admin screens.
pub async fn delete_user(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    if admin.user_id == id {
        return Err(AppError::Core(CoreError::Validation(
            "You cannot disable your own account".to_string(),
        )));
    }
    if !UserRepo::disable(&state.pool, id).await? {
        return Err(AppError::Core(CoreError::NotFound { entity: "User", id }));
    }
    tracing::info!(user_id = id, admin_id = admin.user_id, "User disabled");
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Password change
// ---------------------------------------------------------------------------

/// PUT /api/v1/users/{id}/password
///
/// A user changes their own password; admins can change anyone's.
pub async fn change_password(
    RequireAuth(auth): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<ChangePassword>,
) -> AppResult<impl IntoResponse> {
    if auth.user_id != id && !auth.has_role(crate::middleware::rbac::ROLE_ADMIN) {
        return Err(AppError::Core(CoreError::Forbidden(
            "You can only change your own password".to_string(),
        )));
    }
    validation::validate_new_password(&input.new_password, &input.confirmation)?;

    let password_hash = hash_or_500(&input.new_password)?;
    if !UserRepo::set_password_hash(&state.pool, id, &password_hash).await? {
        return Err(AppError::Core(CoreError::NotFound { entity: "User", id }));
    }

    tracing::info!(user_id = id, changed_by = auth.user_id, "Password changed");
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Export
// ---------------------------------------------------------------------------

/// POST /api/v1/users/export/{format}
pub async fn export_users(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(format): Path<String>,
    Json(spec): Json<ViewSpec>,
) -> AppResult<impl IntoResponse> {
    let format = ExportFormat::from_path(&format)?;
    let rows = UserRepo::list_rows(&state.pool).await?;
    let filtered = filter_and_sort(&rows, &spec).map_err(CoreError::from)?;
    let table = Table::from_records("Users", &filtered);
    export_attachment(&state, "users", format, table).await
}
