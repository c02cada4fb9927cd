//! Handlers for sections and the locations nested inside them.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use stocktake_core::error::CoreError;
use stocktake_core::export::Table;
use stocktake_core::types::DbId;
use stocktake_core::validation;
use stocktake_core::view::{filter_and_sort, ViewSpec};
use stocktake_db::models::place::{
    CreateLocation, CreateSection, UpdateLocation, UpdateSection,
};
use stocktake_db::repositories::{LocationRepo, SectionRepo};

use crate::error::{AppError, AppResult};
use crate::handlers::export::{export_attachment, ExportFormat};
use crate::middleware::rbac::{RequireAuth, RequireManager};
use crate::response::DataResponse;
use crate::state::AppState;

async fn ensure_section_name_free(
    pool: &sqlx::PgPool,
    name: &str,
    exclude_id: Option<DbId>,
) -> AppResult<()> {
    if let Some(existing) = SectionRepo::find_by_name(pool, name).await? {
        if Some(existing.id) != exclude_id {
            return Err(AppError::Core(CoreError::Conflict(format!(
                "Section '{name}' already exists"
            ))));
        }
    }
    Ok(())
}

/// Location names are unique per section, not globally.
async fn ensure_location_name_free(
    pool: &sqlx::PgPool,
    section_id: DbId,
    name: &str,
    exclude_id: Option<DbId>,
) -> AppResult<()> {
    if let Some(existing) = LocationRepo::find_by_name_in_section(pool, section_id, name).await? {
        if Some(existing.id) != exclude_id {
            return Err(AppError::Core(CoreError::Conflict(format!(
                "Location '{name}' already exists in this section"
            ))));
        }
    }
    Ok(())
}

async fn fetch_section(
    pool: &sqlx::PgPool,
    id: DbId,
) -> AppResult<stocktake_db::models::place::Section> {
    SectionRepo::find_by_id(pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Section",
            id,
        }))
}

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

/// GET /api/v1/sections
pub async fn list_sections(
    RequireAuth(_auth): RequireAuth,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let sections = SectionRepo::list(&state.pool).await?;
    Ok(Json(DataResponse { data: sections }))
}

/// POST /api/v1/sections
pub async fn create_section(
    RequireManager(user): RequireManager,
    State(state): State<AppState>,
    Json(input): Json<CreateSection>,
) -> AppResult<impl IntoResponse> {
    validation::require_text("Section name", &input.name)?;
    validation::validate_length("Section name", &input.name, validation::MAX_TEXT_LENGTH)?;
    ensure_section_name_free(&state.pool, &input.name, None).await?;

    let section = SectionRepo::create(&state.pool, &input).await?;
    tracing::info!(
        section_id = section.id,
        name = %section.name,
        user_id = user.user_id,
        "Section created",
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: section })))
}

/// GET /api/v1/sections/{id}
pub async fn get_section(
    RequireAuth(_auth): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let section = fetch_section(&state.pool, id).await?;
    Ok(Json(DataResponse { data: section }))
}

/// PUT /api/v1/sections/{id}
pub async fn update_section(
    RequireManager(user): RequireManager,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateSection>,
) -> AppResult<impl IntoResponse> {
    if let Some(name) = &input.name {
        validation::require_text("Section name", name)?;
        ensure_section_name_free(&state.pool, name, Some(id)).await?;
    }
    let section = SectionRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Section",
            id,
        }))?;
    tracing::info!(section_id = id, user_id = user.user_id, "Section updated");
    Ok(Json(DataResponse { data: section }))
}

/// DELETE /api/v1/sections/{id}
pub async fn delete_section(
    RequireManager(user): RequireManager,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    if !SectionRepo::soft_delete(&state.pool, id).await? {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Section",
            id,
        }));
    }
    tracing::info!(section_id = id, user_id = user.user_id, "Section soft-deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /api/v1/sections/{id}/restore
pub async fn restore_section(
    RequireManager(user): RequireManager,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    if !SectionRepo::restore(&state.pool, id).await? {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Section",
            id,
        }));
    }
    let section = fetch_section(&state.pool, id).await?;
    tracing::info!(section_id = id, user_id = user.user_id, "Section restored");
    Ok(Json(DataResponse { data: section }))
}

/// POST /api/v1/sections/export/{format}
pub async fn export_sections(
    RequireAuth(_auth): RequireAuth,
    State(state): State<AppState>,
    Path(format): Path<String>,
    Json(spec): Json<ViewSpec>,
) -> AppResult<impl IntoResponse> {
    let format = ExportFormat::from_path(&format)?;
    let sections = SectionRepo::list(&state.pool).await?;
    let filtered = filter_and_sort(&sections, &spec).map_err(CoreError::from)?;
    let table = Table::from_records("Sections", &filtered);
    export_attachment(&state, "sections", format, table).await
}

// ---------------------------------------------------------------------------
// Locations
// ---------------------------------------------------------------------------

/// GET /api/v1/locations
///
/// Flattened across sections, each row carrying its section name.
pub async fn list_locations(
    RequireAuth(_auth): RequireAuth,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let locations = LocationRepo::list_rows(&state.pool).await?;
    Ok(Json(DataResponse { data: locations }))
}

/// POST /api/v1/locations
pub async fn create_location(
    RequireManager(user): RequireManager,
    State(state): State<AppState>,
    Json(input): Json<CreateLocation>,
) -> AppResult<impl IntoResponse> {
    validation::require_text("Location name", &input.name)?;
    validation::validate_length("Location name", &input.name, validation::MAX_TEXT_LENGTH)?;
    fetch_section(&state.pool, input.section_id).await?;
    ensure_location_name_free(&state.pool, input.section_id, &input.name, None).await?;

    let location = LocationRepo::create(&state.pool, &input).await?;
    tracing::info!(
        location_id = location.id,
        section_id = location.section_id,
        name = %location.name,
        user_id = user.user_id,
        "Location created",
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: location })))
}

/// GET /api/v1/locations/{id}
pub async fn get_location(
    RequireAuth(_auth): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let location = LocationRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Location",
            id,
        }))?;
    Ok(Json(DataResponse { data: location }))
}

/// PUT /api/v1/locations/{id}
pub async fn update_location(
    RequireManager(user): RequireManager,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateLocation>,
) -> AppResult<impl IntoResponse> {
    let current = LocationRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Location",
            id,
        }))?;

    // Uniqueness is judged against the section the row will end up in.
    let target_section = input.section_id.unwrap_or(current.section_id);
    if input.section_id.is_some() {
        fetch_section(&state.pool, target_section).await?;
    }
    let target_name = input.name.as_deref().unwrap_or(&current.name);
    if let Some(name) = &input.name {
        validation::require_text("Location name", name)?;
    }
    ensure_location_name_free(&state.pool, target_section, target_name, Some(id)).await?;

    let location = LocationRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Location",
            id,
        }))?;
    tracing::info!(location_id = id, user_id = user.user_id, "Location updated");
    Ok(Json(DataResponse { data: location }))
}

/// DELETE /api/v1/locations/{id}
pub async fn delete_location(
    RequireManager(user): RequireManager,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    if !LocationRepo::soft_delete(&state.pool, id).await? {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Location",
            id,
        }));
    }
    tracing::info!(location_id = id, user_id = user.user_id, "Location soft-deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /api/v1/locations/{id}/restore
pub async fn restore_location(
    RequireManager(user): RequireManager,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    if !LocationRepo::restore(&state.pool, id).await? {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Location",
            id,
        }));
    }
    let location = LocationRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Location",
            id,
        }))?;
    tracing::info!(location_id = id, user_id = user.user_id, "Location restored");
    Ok(Json(DataResponse { data: location }))
}

/// POST /api/v1/locations/export/{format}
///
/// Exports the flattened rows, so each line names its section.
pub async fn export_locations(
    RequireAuth(_auth): RequireAuth,
    State(state): State<AppState>,
    Path(format): Path<String>,
    Json(spec): Json<ViewSpec>,
) -> AppResult<impl IntoResponse> {
    let format = ExportFormat::from_path(&format)?;
    let rows = LocationRepo::list_rows(&state.pool).await?;
    let filtered = filter_and_sort(&rows, &spec).map_err(CoreError::from)?;
    let table = Table::from_records("Locations", &filtered);
    export_attachment(&state, "locations", format, table).await
}
