//! Handlers for supplier companies.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use stocktake_core::error::CoreError;
use stocktake_core::export::Table;
use stocktake_core::types::DbId;
use stocktake_core::validation;
use stocktake_core::view::{filter_and_sort, ViewSpec};
use stocktake_db::models::company::{Company, CreateCompany, UpdateCompany};
use stocktake_db::repositories::CompanyRepo;

use crate::error::{AppError, AppResult};
use crate::handlers::export::{export_attachment, ExportFormat};
use crate::middleware::rbac::{RequireAuth, RequireManager};
use crate::response::DataResponse;
use crate::state::AppState;

async fn ensure_name_free(
    pool: &sqlx::PgPool,
    name: &str,
    exclude_id: Option<DbId>,
) -> AppResult<()> {
    if let Some(existing) = CompanyRepo::find_by_name(pool, name).await? {
        if Some(existing.id) != exclude_id {
            return Err(AppError::Core(CoreError::Conflict(format!(
                "Company '{name}' already exists"
            ))));
        }
    }
    Ok(())
}

/// GET /api/v1/companies
///
/// Companies are a short reference list; no pagination.
pub async fn list_companies(
    RequireAuth(_auth): RequireAuth,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let companies: Vec<Company> = CompanyRepo::list(&state.pool).await?;
    Ok(Json(DataResponse { data: companies }))
}

/// POST /api/v1/companies
pub async fn create_company(
    RequireManager(user): RequireManager,
    State(state): State<AppState>,
    Json(input): Json<CreateCompany>,
) -> AppResult<impl IntoResponse> {
    validation::require_text("Company name", &input.name)?;
    validation::validate_length("Company name", &input.name, validation::MAX_TEXT_LENGTH)?;
    if let Some(email) = &input.email {
        validation::validate_email(email)?;
    }
    ensure_name_free(&state.pool, &input.name, None).await?;

    let company = CompanyRepo::create(&state.pool, &input).await?;
    tracing::info!(
        company_id = company.id,
        name = %company.name,
        user_id = user.user_id,
        "Company created",
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: company })))
}

/// GET /api/v1/companies/{id}
pub async fn get_company(
    RequireAuth(_auth): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let company = CompanyRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Company",
            id,
        }))?;
    Ok(Json(DataResponse { data: company }))
}

/// PUT /api/v1/companies/{id}
pub async fn update_company(
    RequireManager(user): RequireManager,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateCompany>,
) -> AppResult<impl IntoResponse> {
    if let Some(name) = &input.name {
        validation::require_text("Company name", name)?;
        ensure_name_free(&state.pool, name, Some(id)).await?;
    }
    if let Some(email) = &input.email {
        validation::validate_email(email)?;
    }

    let company = CompanyRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Company",
            id,
        }))?;
    tracing::info!(company_id = id, user_id = user.user_id, "Company updated");
    Ok(Json(DataResponse { data: company }))
}

/// DELETE /api/v1/companies/{id}
pub async fn delete_company(
    RequireManager(user): RequireManager,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    if !CompanyRepo::soft_delete(&state.pool, id).await? {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Company",
            id,
        }));
    }
    tracing::info!(company_id = id, user_id = user.user_id, "Company soft-deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /api/v1/companies/{id}/restore
pub async fn restore_company(
    RequireManager(user): RequireManager,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    if !CompanyRepo::restore(&state.pool, id).await? {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Company",
            id,
        }));
    }
    let company = CompanyRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Company",
            id,
        }))?;
    tracing::info!(company_id = id, user_id = user.user_id, "Company restored");
    Ok(Json(DataResponse { data: company }))
}

/// POST /api/v1/companies/export/{format}
pub async fn export_companies(
    RequireAuth(_auth): RequireAuth,
    State(state): State<AppState>,
    Path(format): Path<String>,
    Json(spec): Json<ViewSpec>,
) -> AppResult<impl IntoResponse> {
    let format = ExportFormat::from_path(&format)?;
    let companies = CompanyRepo::list(&state.pool).await?;
    let filtered = filter_and_sort(&companies, &spec).map_err(CoreError::from)?;
    let table = Table::from_records("Supplier Companies", &filtered);
    export_attachment(&state, "companies", format, table).await
}
