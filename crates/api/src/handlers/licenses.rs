//! Handlers for software licenses: CRUD with derived status, export,
//! and CSV import.

use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use serde::Serialize;
use stocktake_core::error::CoreError;
use stocktake_core::export::Table;
use stocktake_core::import::{self, ImportReport};
use stocktake_core::status::{license_status, DerivedStatus, LicenseType};
use stocktake_core::types::DbId;
use stocktake_core::validation;
use stocktake_core::view::{filter_and_sort, paginate, ViewSpec};
use stocktake_db::models::license::{CreateLicense, License, LicenseRow, UpdateLicense};
use stocktake_db::repositories::{AssetRepo, CompanyRepo, LicenseRepo, UserRepo};

use crate::error::{AppError, AppResult};
use crate::handlers::export::{export_attachment, ExportFormat};
use crate::handlers::{ensure_asset_exists, ensure_company_exists, ensure_user_exists};
use crate::middleware::rbac::{RequireAuth, RequireManager};
use crate::query::{IncludeDeletedParams, ListParams};
use crate::response::DataResponse;
use crate::state::AppState;

/// A license detail payload with its status derived for today.
#[derive(Debug, Serialize)]
pub struct LicenseDetail {
    #[serde(flatten)]
    pub license: License,
    pub status: DerivedStatus,
}

impl LicenseDetail {
    fn new(license: License, window_days: i64) -> Self {
        let status = license_status(
            license.expiry_date,
            license.deleted_at.is_some(),
            Utc::now().date_naive(),
            window_days,
        );
        Self { license, status }
    }
}

async fn derived_rows(state: &AppState) -> AppResult<Vec<LicenseRow>> {
    let today = Utc::now().date_naive();
    let window = state.config.expiring_soon_days;
    let rows = LicenseRepo::list_join_rows(&state.pool).await?;
    Ok(rows
        .into_iter()
        .map(|row| LicenseRow::derive(row, today, window))
        .collect())
}

async fn ensure_key_free(
    pool: &sqlx::PgPool,
    key: &str,
    exclude_id: Option<DbId>,
) -> AppResult<()> {
    if let Some(existing) = LicenseRepo::find_by_key(pool, key).await? {
        if Some(existing.id) != exclude_id {
            return Err(AppError::Core(CoreError::Conflict(
                "License key is already registered".to_string(),
            )));
        }
    }
    Ok(())
}

async fn check_references(
    pool: &sqlx::PgPool,
    asset_id: Option<DbId>,
    assigned_user_id: Option<DbId>,
    supplier_company_id: Option<DbId>,
) -> AppResult<()> {
    ensure_asset_exists(pool, asset_id).await?;
    ensure_user_exists(pool, assigned_user_id).await?;
    ensure_company_exists(pool, supplier_company_id).await?;
    Ok(())
}

// ---------------------------------------------------------------------------
// CRUD
// ---------------------------------------------------------------------------

/// GET /api/v1/licenses
pub async fn list_licenses(
    RequireAuth(_auth): RequireAuth,
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> AppResult<impl IntoResponse> {
    let rows = derived_rows(&state).await?;
    let spec = params.view_spec();
    let filtered = filter_and_sort(&rows, &spec).map_err(CoreError::from)?;
    let page = paginate(
        filtered.into_iter().cloned().collect::<Vec<_>>(),
        params.page_spec(),
    );
    Ok(Json(page))
}

/// POST /api/v1/licenses
pub async fn create_license(
    RequireManager(user): RequireManager,
    State(state): State<AppState>,
    Json(input): Json<CreateLicense>,
) -> AppResult<impl IntoResponse> {
    validation::require_text("Software name", &input.software_name)?;
    validation::validate_length(
        "Software name",
        &input.software_name,
        validation::MAX_TEXT_LENGTH,
    )?;
    validation::require_text("License key", &input.license_key)?;
    if let Some(seats) = input.seats {
        validation::validate_seats(seats)?;
    }
    check_references(
        &state.pool,
        input.asset_id,
        input.assigned_user_id,
        input.supplier_company_id,
    )
    .await?;
    ensure_key_free(&state.pool, &input.license_key, None).await?;

    let license = LicenseRepo::create(&state.pool, &input).await?;

    tracing::info!(
        license_id = license.id,
        software = %license.software_name,
        user_id = user.user_id,
        "License created",
    );

    let detail = LicenseDetail::new(license, state.config.expiring_soon_days);
    Ok((StatusCode::CREATED, Json(DataResponse { data: detail })))
}

/// GET /api/v1/licenses/{id}
pub async fn get_license(
    RequireAuth(_auth): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Query(params): Query<IncludeDeletedParams>,
) -> AppResult<impl IntoResponse> {
    let license = if params.include_deleted {
        LicenseRepo::find_by_id_include_deleted(&state.pool, id).await?
    } else {
        LicenseRepo::find_by_id(&state.pool, id).await?
    }
    .ok_or(AppError::Core(CoreError::NotFound {
        entity: "License",
        id,
    }))?;

    let detail = LicenseDetail::new(license, state.config.expiring_soon_days);
    Ok(Json(DataResponse { data: detail }))
}

/// PUT /api/v1/licenses/{id}
pub async fn update_license(
    RequireManager(user): RequireManager,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateLicense>,
) -> AppResult<impl IntoResponse> {
    if let Some(name) = &input.software_name {
        validation::require_text("Software name", name)?;
    }
    if let Some(key) = &input.license_key {
        validation::require_text("License key", key)?;
        ensure_key_free(&state.pool, key, Some(id)).await?;
    }
    if let Some(seats) = input.seats {
        validation::validate_seats(seats)?;
    }
    // Cleared references need no lookup; only newly set ones do.
    check_references(
        &state.pool,
        input.asset_id.as_set().copied(),
        input.assigned_user_id.as_set().copied(),
        input.supplier_company_id.as_set().copied(),
    )
    .await?;

    let license = LicenseRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "License",
            id,
        }))?;

    tracing::info!(license_id = id, user_id = user.user_id, "License updated");

    let detail = LicenseDetail::new(license, state.config.expiring_soon_days);
    Ok(Json(DataResponse { data: detail }))
}

/// DELETE /api/v1/licenses/{id}
pub async fn delete_license(
    RequireManager(user): RequireManager,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    if !LicenseRepo::soft_delete(&state.pool, id).await? {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "License",
            id,
        }));
    }
    tracing::info!(license_id = id, user_id = user.user_id, "License soft-deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /api/v1/licenses/{id}/restore
pub async fn restore_license(
    RequireManager(user): RequireManager,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    if !LicenseRepo::restore(&state.pool, id).await? {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "License",
            id,
        }));
    }
    let license = LicenseRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "License",
            id,
        }))?;
    tracing::info!(license_id = id, user_id = user.user_id, "License restored");
    let detail = LicenseDetail::new(license, state.config.expiring_soon_days);
    Ok(Json(DataResponse { data: detail }))
}

// ---------------------------------------------------------------------------
// Export
// ---------------------------------------------------------------------------

/// POST /api/v1/licenses/export/{format}
pub async fn export_licenses(
    RequireAuth(_auth): RequireAuth,
    State(state): State<AppState>,
    Path(format): Path<String>,
    Json(spec): Json<ViewSpec>,
) -> AppResult<impl IntoResponse> {
    let format = ExportFormat::from_path(&format)?;
    let rows = derived_rows(&state).await?;
    let filtered = filter_and_sort(&rows, &spec).map_err(CoreError::from)?;
    let table = Table::from_records("Software Licenses", &filtered);
    export_attachment(&state, "licenses", format, table).await
}

// ---------------------------------------------------------------------------
// CSV import
// ---------------------------------------------------------------------------

/// POST /api/v1/licenses/import
///
/// Same contract as the asset importer: 400 for structural problems,
/// per-row errors otherwise, 201 clean or 207 partial.
pub async fn import_licenses(
    RequireManager(user): RequireManager,
    State(state): State<AppState>,
    body: Bytes,
) -> AppResult<impl IntoResponse> {
    let rows = import::parse_rows(&body, import::LICENSE_COLUMNS)
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let mut report = ImportReport::new(rows.len());
    for row in rows {
        match import_one_license(&state, &row).await {
            Ok(()) => report.record_success(),
            Err(ImportRowError::Row(message)) => report.record_failure(row.line, message),
            Err(ImportRowError::Fatal(err)) => return Err(err),
        }
    }

    tracing::info!(
        imported = report.imported,
        failed = report.failed,
        user_id = user.user_id,
        "License import finished",
    );

    let status = if report.is_clean() {
        StatusCode::CREATED
    } else {
        StatusCode::MULTI_STATUS
    };
    Ok((status, Json(report)))
}

enum ImportRowError {
    Row(String),
    Fatal(AppError),
}

impl From<sqlx::Error> for ImportRowError {
    fn from(err: sqlx::Error) -> Self {
        ImportRowError::Fatal(AppError::Database(err))
    }
}

async fn import_one_license(state: &AppState, row: &import::RawRow) -> Result<(), ImportRowError> {
    let software_name = row.required("software_name").map_err(ImportRowError::Row)?;
    let license_key = row.required("license_key").map_err(ImportRowError::Row)?;
    let type_raw = row.required("license_type").map_err(ImportRowError::Row)?;
    let license_type = LicenseType::from_input(type_raw)
        .ok_or_else(|| ImportRowError::Row(format!("Unknown license type '{type_raw}'")))?;

    let seats = match row.integer("seats").map_err(ImportRowError::Row)? {
        None => None,
        Some(n) => {
            let n = i32::try_from(n)
                .map_err(|_| ImportRowError::Row(format!("Seat count {n} is out of range")))?;
            if n < 1 {
                return Err(ImportRowError::Row(
                    "Seat count must be at least 1".to_string(),
                ));
            }
            Some(n)
        }
    };

    let supplier = match row.get("supplier") {
        None => None,
        Some(name) => Some(
            CompanyRepo::find_by_name(&state.pool, name)
                .await?
                .ok_or_else(|| ImportRowError::Row(format!("Unknown supplier '{name}'")))?,
        ),
    };
    let assignee = match row.get("assigned_email") {
        None => None,
        Some(email) => Some(
            UserRepo::find_by_email(&state.pool, email)
                .await?
                .ok_or_else(|| ImportRowError::Row(format!("Unknown user '{email}'")))?,
        ),
    };
    let asset = match row.get("inventory_code") {
        None => None,
        Some(code) => Some(
            AssetRepo::find_by_inventory_code(&state.pool, code)
                .await?
                .ok_or_else(|| ImportRowError::Row(format!("Unknown asset '{code}'")))?,
        ),
    };

    if LicenseRepo::find_by_key(&state.pool, license_key)
        .await?
        .is_some()
    {
        return Err(ImportRowError::Row(
            "License key is already registered".to_string(),
        ));
    }

    let input = CreateLicense {
        software_name: software_name.to_string(),
        license_key: license_key.to_string(),
        license_type,
        version: row.get("version").map(str::to_string),
        seats,
        purchase_date: row.date("purchase_date").map_err(ImportRowError::Row)?,
        expiry_date: row.date("expiry_date").map_err(ImportRowError::Row)?,
        asset_id: asset.as_ref().map(|a| a.id),
        assigned_user_id: assignee.as_ref().map(|u| u.id),
        supplier_company_id: supplier.as_ref().map(|c| c.id),
    };
    LicenseRepo::create(&state.pool, &input).await?;
    Ok(())
}
