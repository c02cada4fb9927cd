//! Repositories for the `sections` and `locations` tables.
//!
//! Section names are the natural key CSV imports resolve against;
//! location names are unique within their section.

use sqlx::PgPool;
use stocktake_core::types::DbId;

use crate::models::place::{
    CreateLocation, CreateSection, Location, LocationRow, Section, UpdateLocation, UpdateSection,
};

const SECTION_COLUMNS: &str = "id, name, description, deleted_at, created_at, updated_at";
const LOCATION_COLUMNS: &str =
    "id, section_id, name, description, deleted_at, created_at, updated_at";

/// Provides CRUD operations for sections.
pub struct SectionRepo;

impl SectionRepo {
    /// Insert a new section, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateSection) -> Result<Section, sqlx::Error> {
        let query = format!(
            "INSERT INTO sections (name, description) VALUES ($1, $2) RETURNING {SECTION_COLUMNS}"
        );
        sqlx::query_as::<_, Section>(&query)
            .bind(&input.name)
            .bind(&input.description)
            .fetch_one(pool)
            .await
    }

    /// Find a section by its internal ID. Excludes soft-deleted rows.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Section>, sqlx::Error> {
        let query =
            format!("SELECT {SECTION_COLUMNS} FROM sections WHERE id = $1 AND deleted_at IS NULL");
        sqlx::query_as::<_, Section>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a section by ID, including soft-deleted rows. Audit access.
    pub async fn find_by_id_include_deleted(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<Section>, sqlx::Error> {
        let query = format!("SELECT {SECTION_COLUMNS} FROM sections WHERE id = $1");
        sqlx::query_as::<_, Section>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a section by name (case-insensitive), for import resolution.
    pub async fn find_by_name(pool: &PgPool, name: &str) -> Result<Option<Section>, sqlx::Error> {
        let query = format!(
            "SELECT {SECTION_COLUMNS} FROM sections \
             WHERE lower(name) = lower($1) AND deleted_at IS NULL"
        );
        sqlx::query_as::<_, Section>(&query)
            .bind(name)
            .fetch_optional(pool)
            .await
    }

    /// Fetch all non-deleted sections, ordered by name.
    pub async fn list(pool: &PgPool) -> Result<Vec<Section>, sqlx::Error> {
        let query = format!(
            "SELECT {SECTION_COLUMNS} FROM sections WHERE deleted_at IS NULL ORDER BY name, id"
        );
        sqlx::query_as::<_, Section>(&query).fetch_all(pool).await
    }

    /// Update a section. Only non-`None` fields in `input` are applied.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateSection,
    ) -> Result<Option<Section>, sqlx::Error> {
        let query = format!(
            "UPDATE sections SET \
                name = COALESCE($2, name), \
                description = COALESCE($3, description), \
                updated_at = NOW() \
             WHERE id = $1 AND deleted_at IS NULL \
             RETURNING {SECTION_COLUMNS}"
        );
        sqlx::query_as::<_, Section>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.description)
            .fetch_optional(pool)
            .await
    }

    /// Soft-delete a section by ID. Returns `true` if a row was marked.
    pub async fn soft_delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE sections SET deleted_at = NOW() WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Restore a soft-deleted section. Returns `true` if a row was restored.
    pub async fn restore(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE sections SET deleted_at = NULL WHERE id = $1 AND deleted_at IS NOT NULL",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}

/// Provides CRUD operations for locations.
pub struct LocationRepo;

impl LocationRepo {
    /// Insert a new location, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateLocation) -> Result<Location, sqlx::Error> {
        let query = format!(
            "INSERT INTO locations (section_id, name, description) \
             VALUES ($1, $2, $3) RETURNING {LOCATION_COLUMNS}"
        );
        sqlx::query_as::<_, Location>(&query)
            .bind(input.section_id)
            .bind(&input.name)
            .bind(&input.description)
            .fetch_one(pool)
            .await
    }

    /// Find a location by its internal ID. Excludes soft-deleted rows.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Location>, sqlx::Error> {
        let query = format!(
            "SELECT {LOCATION_COLUMNS} FROM locations WHERE id = $1 AND deleted_at IS NULL"
        );
        sqlx::query_as::<_, Location>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a location by ID, including soft-deleted rows. Audit access.
    pub async fn find_by_id_include_deleted(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<Location>, sqlx::Error> {
        let query = format!("SELECT {LOCATION_COLUMNS} FROM locations WHERE id = $1");
        sqlx::query_as::<_, Location>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a location by name within one section (case-insensitive),
    /// for import resolution.
    pub async fn find_by_name_in_section(
        pool: &PgPool,
        section_id: DbId,
        name: &str,
    ) -> Result<Option<Location>, sqlx::Error> {
        let query = format!(
            "SELECT {LOCATION_COLUMNS} FROM locations \
             WHERE section_id = $1 AND lower(name) = lower($2) AND deleted_at IS NULL"
        );
        sqlx::query_as::<_, Location>(&query)
            .bind(section_id)
            .bind(name)
            .fetch_optional(pool)
            .await
    }

    /// Fetch all non-deleted locations with their section names, the
    /// flattened shape the places list and export use.
    pub async fn list_rows(pool: &PgPool) -> Result<Vec<LocationRow>, sqlx::Error> {
        sqlx::query_as::<_, LocationRow>(
            "SELECT l.id, l.name, l.description, l.section_id, s.name AS section_name \
             FROM locations l \
             JOIN sections s ON s.id = l.section_id \
             WHERE l.deleted_at IS NULL AND s.deleted_at IS NULL \
             ORDER BY s.name, l.name, l.id",
        )
        .fetch_all(pool)
        .await
    }

    /// Update a location. Only non-`None` fields in `input` are applied.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateLocation,
    ) -> Result<Option<Location>, sqlx::Error> {
        let query = format!(
            "UPDATE locations SET \
                section_id = COALESCE($2, section_id), \
                name = COALESCE($3, name), \
                description = COALESCE($4, description), \
                updated_at = NOW() \
             WHERE id = $1 AND deleted_at IS NULL \
             RETURNING {LOCATION_COLUMNS}"
        );
        sqlx::query_as::<_, Location>(&query)
            .bind(id)
            .bind(input.section_id)
            .bind(&input.name)
            .bind(&input.description)
            .fetch_optional(pool)
            .await
    }

    /// Soft-delete a location by ID. Returns `true` if a row was marked.
    pub async fn soft_delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE locations SET deleted_at = NOW() WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Restore a soft-deleted location. Returns `true` if a row was restored.
    pub async fn restore(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE locations SET deleted_at = NULL WHERE id = $1 AND deleted_at IS NOT NULL",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
