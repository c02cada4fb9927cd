//! Request handlers, one module per resource.

pub mod assets;
pub mod auth;
pub mod companies;
pub mod documents;
pub mod export;
pub mod health;
pub mod licenses;
pub mod places;
pub mod users;

use sqlx::PgPool;
use stocktake_core::error::CoreError;
use stocktake_core::types::DbId;
use stocktake_db::repositories::{AssetRepo, CompanyRepo, LocationRepo, SectionRepo, UserRepo};

use crate::error::{AppError, AppResult};

/// Check a section/location pair before writing a row that references
/// it: the section must exist, and the location must belong to that
/// section. A location without a section is always rejected.
pub(crate) async fn ensure_place_exists(
    pool: &PgPool,
    section_id: Option<DbId>,
    location_id: Option<DbId>,
) -> AppResult<()> {
    let section = match section_id {
        None => {
            if location_id.is_some() {
                return Err(AppError::Core(CoreError::Validation(
                    "A location requires a section".to_string(),
                )));
            }
            return Ok(());
        }
        Some(id) => SectionRepo::find_by_id(pool, id)
            .await?
            .ok_or(AppError::Core(CoreError::NotFound {
                entity: "Section",
                id,
            }))?,
    };

    if let Some(id) = location_id {
        let location = LocationRepo::find_by_id(pool, id)
            .await?
            .ok_or(AppError::Core(CoreError::NotFound {
                entity: "Location",
                id,
            }))?;
        if location.section_id != section.id {
            return Err(AppError::Core(CoreError::Validation(format!(
                "Location '{}' does not belong to section '{}'",
                location.name, section.name
            ))));
        }
    }
    Ok(())
}

/// Check an optional supplier reference.
pub(crate) async fn ensure_company_exists(pool: &PgPool, id: Option<DbId>) -> AppResult<()> {
    if let Some(id) = id {
        CompanyRepo::find_by_id(pool, id)
            .await?
            .ok_or(AppError::Core(CoreError::NotFound {
                entity: "Company",
                id,
            }))?;
    }
    Ok(())
}

/// Check an optional asset reference (license installation target).
pub(crate) async fn ensure_asset_exists(pool: &PgPool, id: Option<DbId>) -> AppResult<()> {
    if let Some(id) = id {
        AssetRepo::find_by_id(pool, id)
            .await?
            .ok_or(AppError::Core(CoreError::NotFound { entity: "Asset", id }))?;
    }
    Ok(())
}

/// Check an optional user reference (license assignee).
pub(crate) async fn ensure_user_exists(pool: &PgPool, id: Option<DbId>) -> AppResult<()> {
    if let Some(id) = id {
        UserRepo::find_by_id(pool, id)
            .await?
            .ok_or(AppError::Core(CoreError::NotFound { entity: "User", id }))?;
    }
    Ok(())
}
