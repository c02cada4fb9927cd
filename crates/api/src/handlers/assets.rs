//! Handlers for fixed assets: CRUD, movement history, export, and CSV
//! import.

use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use stocktake_core::error::CoreError;
use stocktake_core::export::Table;
use stocktake_core::import::{self, ImportReport};
use stocktake_core::movement::{kind_from_legacy_notes, MovementKind};
use stocktake_core::status::AssetStatus;
use stocktake_core::types::DbId;
use stocktake_core::validation;
use stocktake_core::view::{filter_and_sort, paginate, ViewSpec};
use stocktake_db::models::asset::{Asset, CreateAsset, UpdateAsset};
use stocktake_db::models::transfer::{CreateTransfer, ReceiveTransfer};
use stocktake_db::repositories::{
    AssetRepo, CompanyRepo, LocationRepo, SectionRepo, TransferRepo,
};

use crate::error::{AppError, AppResult};
use crate::handlers::export::{export_attachment, ExportFormat};
use crate::handlers::{ensure_company_exists, ensure_place_exists};
use crate::middleware::rbac::{RequireAuth, RequireManager};
use crate::query::{IncludeDeletedParams, ListParams};
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

/// Fetch a live asset or fail with 404.
async fn fetch_asset(pool: &sqlx::PgPool, id: DbId) -> AppResult<Asset> {
    AssetRepo::find_by_id(pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Asset", id }))
}

/// Uniqueness pre-check for inventory codes; the `uq_` index is the
/// backstop for the race between this check and the write.
async fn ensure_code_free(
    pool: &sqlx::PgPool,
    code: &str,
    exclude_id: Option<DbId>,
) -> AppResult<()> {
    if let Some(existing) = AssetRepo::find_by_inventory_code(pool, code).await? {
        if Some(existing.id) != exclude_id {
            return Err(AppError::Core(CoreError::Conflict(format!(
                "Inventory code '{code}' is already in use"
            ))));
        }
    }
    Ok(())
}

fn validate_create(input: &CreateAsset) -> AppResult<()> {
    validation::require_text("Inventory code", &input.inventory_code)?;
    validation::validate_length(
        "Inventory code",
        &input.inventory_code,
        validation::MAX_TEXT_LENGTH,
    )?;
    validation::require_text("Product name", &input.product_name)?;
    validation::validate_length(
        "Product name",
        &input.product_name,
        validation::MAX_TEXT_LENGTH,
    )?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Asset CRUD
// ---------------------------------------------------------------------------

/// GET /api/v1/assets
///
/// Filtered, sorted, paginated asset listing.
pub async fn list_assets(
    RequireAuth(_auth): RequireAuth,
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> AppResult<impl IntoResponse> {
    let rows = AssetRepo::list_rows(&state.pool).await?;
    let spec = params.view_spec();
    let filtered = filter_and_sort(&rows, &spec).map_err(CoreError::from)?;
    let page = paginate(
        filtered.into_iter().cloned().collect::<Vec<_>>(),
        params.page_spec(),
    );
    Ok(Json(page))
}

/// POST /api/v1/assets
///
/// Register a new asset. Manager or admin.
pub async fn create_asset(
    RequireManager(user): RequireManager,
    State(state): State<AppState>,
    Json(input): Json<CreateAsset>,
) -> AppResult<impl IntoResponse> {
    validate_create(&input)?;
    ensure_place_exists(
        &state.pool,
        input.current_section_id,
        input.current_location_id,
    )
    .await?;
    ensure_company_exists(&state.pool, input.supplier_company_id).await?;
    ensure_code_free(&state.pool, &input.inventory_code, None).await?;

    let asset = AssetRepo::create(&state.pool, &input).await?;

    tracing::info!(
        asset_id = asset.id,
        inventory_code = %asset.inventory_code,
        user_id = user.user_id,
        "Asset created",
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: asset })))
}

/// GET /api/v1/assets/{id}
///
/// Asset detail. `?include_deleted=true` surfaces soft-deleted rows
/// for audit.
pub async fn get_asset(
    RequireAuth(_auth): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Query(params): Query<IncludeDeletedParams>,
) -> AppResult<impl IntoResponse> {
    let asset = if params.include_deleted {
        AssetRepo::find_by_id_include_deleted(&state.pool, id).await?
    } else {
        AssetRepo::find_by_id(&state.pool, id).await?
    }
    .ok_or(AppError::Core(CoreError::NotFound { entity: "Asset", id }))?;

    Ok(Json(DataResponse { data: asset }))
}

/// PUT /api/v1/assets/{id}
///
/// Update an asset's descriptive fields. The current place changes
/// through movements. Manager or admin.
pub async fn update_asset(
    RequireManager(user): RequireManager,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateAsset>,
) -> AppResult<impl IntoResponse> {
    if let Some(code) = &input.inventory_code {
        validation::require_text("Inventory code", code)?;
        ensure_code_free(&state.pool, code, Some(id)).await?;
    }
    if let Some(name) = &input.product_name {
        validation::require_text("Product name", name)?;
    }
    // A cleared supplier needs no lookup; only a newly set one does.
    ensure_company_exists(&state.pool, input.supplier_company_id.as_set().copied()).await?;

    let asset = AssetRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Asset", id }))?;

    tracing::info!(asset_id = id, user_id = user.user_id, "Asset updated");

    Ok(Json(DataResponse { data: asset }))
}

/// DELETE /api/v1/assets/{id}
///
/// Soft-delete an asset. Manager or admin.
pub async fn delete_asset(
    RequireManager(user): RequireManager,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    if !AssetRepo::soft_delete(&state.pool, id).await? {
        return Err(AppError::Core(CoreError::NotFound { entity: "Asset", id }));
    }
    tracing::info!(asset_id = id, user_id = user.user_id, "Asset soft-deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /api/v1/assets/{id}/restore
///
/// Restore a soft-deleted asset. Manager or admin.
pub async fn restore_asset(
    RequireManager(user): RequireManager,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    if !AssetRepo::restore(&state.pool, id).await? {
        return Err(AppError::Core(CoreError::NotFound { entity: "Asset", id }));
    }
    let asset = fetch_asset(&state.pool, id).await?;
    tracing::info!(asset_id = id, user_id = user.user_id, "Asset restored");
    Ok(Json(DataResponse { data: asset }))
}

// ---------------------------------------------------------------------------
// Movements
// ---------------------------------------------------------------------------

/// GET /api/v1/assets/{id}/movements
///
/// Movement history, newest first, with the same filter semantics as
/// any other list.
pub async fn list_movements(
    RequireAuth(_auth): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Query(params): Query<ListParams>,
) -> AppResult<impl IntoResponse> {
    fetch_asset(&state.pool, id).await?;
    let rows = TransferRepo::list_rows_for_asset(&state.pool, id).await?;
    let spec = params.view_spec();
    let filtered = filter_and_sort(&rows, &spec).map_err(CoreError::from)?;
    let page = paginate(
        filtered.into_iter().cloned().collect::<Vec<_>>(),
        params.page_spec(),
    );
    Ok(Json(page))
}

/// POST /api/v1/assets/{id}/movements
///
/// Record a movement; relocates the asset atomically. Manager or admin.
pub async fn create_movement(
    RequireManager(user): RequireManager,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<CreateTransfer>,
) -> AppResult<impl IntoResponse> {
    ensure_place_exists(&state.pool, Some(input.to_section_id), input.to_location_id).await?;

    let transfer_date = input.transfer_date.unwrap_or_else(|| Utc::now().date_naive());
    let transfer = TransferRepo::create(&state.pool, id, &input, user.user_id, transfer_date)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Asset", id }))?;

    tracing::info!(
        asset_id = id,
        transfer_id = transfer.id,
        movement = %transfer.movement,
        user_id = user.user_id,
        "Movement recorded",
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: transfer })))
}

/// PUT /api/v1/assets/{id}/movements/{movement_id}/receive
///
/// Confirm receipt of a pending movement. Transfers are otherwise
/// immutable; receiving twice is a conflict.
pub async fn receive_movement(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path((id, movement_id)): Path<(DbId, DbId)>,
    Json(input): Json<ReceiveTransfer>,
) -> AppResult<impl IntoResponse> {
    let existing = TransferRepo::find_by_id(&state.pool, id, movement_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Movement",
            id: movement_id,
        }))?;
    if existing.received_date.is_some() {
        return Err(AppError::Core(CoreError::Conflict(
            "Movement has already been received".to_string(),
        )));
    }

    let received_date = input.received_date.unwrap_or_else(|| Utc::now().date_naive());
    let transfer = TransferRepo::receive(&state.pool, id, movement_id, user.user_id, received_date)
        .await?
        .ok_or(AppError::Core(CoreError::Conflict(
            "Movement has already been received".to_string(),
        )))?;

    tracing::info!(
        asset_id = id,
        transfer_id = movement_id,
        user_id = user.user_id,
        "Movement received",
    );

    Ok(Json(DataResponse { data: transfer }))
}

// ---------------------------------------------------------------------------
// Exports
// ---------------------------------------------------------------------------

/// POST /api/v1/assets/export/{format}
///
/// Export the filtered asset list. The body carries the same spec the
/// list endpoint takes as query params, so the file matches the screen.
pub async fn export_assets(
    RequireAuth(_auth): RequireAuth,
    State(state): State<AppState>,
    Path(format): Path<String>,
    Json(spec): Json<ViewSpec>,
) -> AppResult<impl IntoResponse> {
    let format = ExportFormat::from_path(&format)?;
    let rows = AssetRepo::list_rows(&state.pool).await?;
    let filtered = filter_and_sort(&rows, &spec).map_err(CoreError::from)?;
    let table = Table::from_records("Assets", &filtered);
    export_attachment(&state, "assets", format, table).await
}

/// POST /api/v1/assets/{id}/movements/export/{format}
///
/// Export one asset's movement history.
pub async fn export_movements(
    RequireAuth(_auth): RequireAuth,
    State(state): State<AppState>,
    Path((id, format)): Path<(DbId, String)>,
    Json(spec): Json<ViewSpec>,
) -> AppResult<impl IntoResponse> {
    let format = ExportFormat::from_path(&format)?;
    let asset = fetch_asset(&state.pool, id).await?;
    let rows = TransferRepo::list_rows_for_asset(&state.pool, id).await?;
    let filtered = filter_and_sort(&rows, &spec).map_err(CoreError::from)?;
    let table = Table::from_records(
        format!("Movement History for {}", asset.inventory_code),
        &filtered,
    );
    export_attachment(&state, &format!("asset-{id}-movements"), format, table).await
}

// ---------------------------------------------------------------------------
// CSV import
// ---------------------------------------------------------------------------

/// POST /api/v1/assets/import
///
/// Header-driven CSV import. Structural problems (malformed file,
/// missing required columns) fail the request with 400; cell problems
/// fail only their row. Returns 201 when every row imported, 207
/// otherwise. Manager or admin.
pub async fn import_assets(
    RequireManager(user): RequireManager,
    State(state): State<AppState>,
    body: Bytes,
) -> AppResult<impl IntoResponse> {
    let rows = import::parse_rows(&body, import::ASSET_COLUMNS)
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let mut report = ImportReport::new(rows.len());
    for row in rows {
        match import_one_asset(&state, &row, user.user_id).await {
            Ok(()) => report.record_success(),
            Err(ImportRowError::Row(message)) => report.record_failure(row.line, message),
            Err(ImportRowError::Fatal(err)) => return Err(err),
        }
    }

    tracing::info!(
        imported = report.imported,
        failed = report.failed,
        user_id = user.user_id,
        "Asset import finished",
    );

    let status = if report.is_clean() {
        StatusCode::CREATED
    } else {
        StatusCode::MULTI_STATUS
    };
    Ok((status, Json(report)))
}

/// A row-level failure is reported; a database failure aborts the batch.
enum ImportRowError {
    Row(String),
    Fatal(AppError),
}

impl From<sqlx::Error> for ImportRowError {
    fn from(err: sqlx::Error) -> Self {
        ImportRowError::Fatal(AppError::Database(err))
    }
}

async fn import_one_asset(
    state: &AppState,
    row: &import::RawRow,
    user_id: DbId,
) -> Result<(), ImportRowError> {
    let inventory_code = row.required("inventory_code").map_err(ImportRowError::Row)?;
    let product_name = row.required("product_name").map_err(ImportRowError::Row)?;

    let status = match row.get("status") {
        None => None,
        Some(raw) => Some(
            AssetStatus::from_input(raw)
                .ok_or_else(|| ImportRowError::Row(format!("Unknown status '{raw}'")))?,
        ),
    };

    // Natural-key resolution; an unresolvable reference fails this row
    // without touching the batch.
    let section = match row.get("section") {
        None => None,
        Some(name) => Some(
            SectionRepo::find_by_name(&state.pool, name)
                .await?
                .ok_or_else(|| ImportRowError::Row(format!("Unknown section '{name}'")))?,
        ),
    };
    let location = match (row.get("location"), &section) {
        (None, _) => None,
        (Some(name), None) => {
            return Err(ImportRowError::Row(format!(
                "Location '{name}' given without a section"
            )));
        }
        (Some(name), Some(section)) => Some(
            LocationRepo::find_by_name_in_section(&state.pool, section.id, name)
                .await?
                .ok_or_else(|| {
                    ImportRowError::Row(format!(
                        "Unknown location '{name}' in section '{}'",
                        section.name
                    ))
                })?,
        ),
    };
    let supplier = match row.get("supplier") {
        None => None,
        Some(name) => Some(
            CompanyRepo::find_by_name(&state.pool, name)
                .await?
                .ok_or_else(|| ImportRowError::Row(format!("Unknown supplier '{name}'")))?,
        ),
    };

    if AssetRepo::find_by_inventory_code(&state.pool, inventory_code)
        .await?
        .is_some()
    {
        return Err(ImportRowError::Row(format!(
            "Inventory code '{inventory_code}' is already in use"
        )));
    }

    let input = CreateAsset {
        inventory_code: inventory_code.to_string(),
        product_name: product_name.to_string(),
        serial_number: row.get("serial_number").map(str::to_string),
        description: row.get("description").map(str::to_string),
        status,
        current_section_id: section.as_ref().map(|s| s.id),
        current_location_id: location.as_ref().map(|l| l.id),
        purchase_date: row.date("purchase_date").map_err(ImportRowError::Row)?,
        invoice_number: row.get("invoice_number").map(str::to_string),
        supplier_company_id: supplier.as_ref().map(|c| c.id),
        warranty_expiry_date: row
            .date("warranty_expiry_date")
            .map_err(ImportRowError::Row)?,
    };
    let asset = AssetRepo::create(&state.pool, &input).await?;

    // Legacy shim: files from the old system encoded an initial movement
    // inside free-text notes. Record it when the row landed in a section.
    if let (Some(notes), Some(section)) = (row.get("movement_notes"), &section) {
        let movement = kind_from_legacy_notes(notes).unwrap_or(MovementKind::Transfer);
        let transfer = CreateTransfer {
            movement,
            to_section_id: section.id,
            to_location_id: location.as_ref().map(|l| l.id),
            transfer_date: None,
            notes: Some(notes.to_string()),
        };
        TransferRepo::create(
            &state.pool,
            asset.id,
            &transfer,
            user_id,
            Utc::now().date_naive(),
        )
        .await?;
    }

    Ok(())
}
