//! Repository for the `companies` (supplier) table.

use sqlx::PgPool;
use stocktake_core::types::DbId;

use crate::models::company::{Company, CreateCompany, UpdateCompany};

const COLUMNS: &str =
    "id, name, trade_name, tax_id, email, phone, deleted_at, created_at, updated_at";

/// Provides CRUD operations for supplier companies.
pub struct CompanyRepo;

impl CompanyRepo {
    /// Insert a new company, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateCompany) -> Result<Company, sqlx::Error> {
        let query = format!(
            "INSERT INTO companies (name, trade_name, tax_id, email, phone) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Company>(&query)
            .bind(&input.name)
            .bind(&input.trade_name)
            .bind(&input.tax_id)
            .bind(&input.email)
            .bind(&input.phone)
            .fetch_one(pool)
            .await
    }

    /// Find a company by its internal ID. Excludes soft-deleted rows.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Company>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM companies WHERE id = $1 AND deleted_at IS NULL");
        sqlx::query_as::<_, Company>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a company by ID, including soft-deleted rows. Audit access.
    pub async fn find_by_id_include_deleted(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<Company>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM companies WHERE id = $1");
        sqlx::query_as::<_, Company>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a company by name (case-insensitive). The CSV importers
    /// resolve supplier cells through this.
    pub async fn find_by_name(pool: &PgPool, name: &str) -> Result<Option<Company>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM companies WHERE lower(name) = lower($1) AND deleted_at IS NULL"
        );
        sqlx::query_as::<_, Company>(&query)
            .bind(name)
            .fetch_optional(pool)
            .await
    }

    /// Fetch all non-deleted companies, ordered by name.
    pub async fn list(pool: &PgPool) -> Result<Vec<Company>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM companies WHERE deleted_at IS NULL ORDER BY name, id");
        sqlx::query_as::<_, Company>(&query).fetch_all(pool).await
    }

    /// Update a company. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no live row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateCompany,
    ) -> Result<Option<Company>, sqlx::Error> {
        let query = format!(
            "UPDATE companies SET \
                name = COALESCE($2, name), \
                trade_name = COALESCE($3, trade_name), \
                tax_id = COALESCE($4, tax_id), \
                email = COALESCE($5, email), \
                phone = COALESCE($6, phone), \
                updated_at = NOW() \
             WHERE id = $1 AND deleted_at IS NULL \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Company>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.trade_name)
            .bind(&input.tax_id)
            .bind(&input.email)
            .bind(&input.phone)
            .fetch_optional(pool)
            .await
    }

    /// Soft-delete a company by ID. Returns `true` if a row was marked.
    pub async fn soft_delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE companies SET deleted_at = NOW() WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Restore a soft-deleted company. Returns `true` if a row was restored.
    pub async fn restore(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE companies SET deleted_at = NULL WHERE id = $1 AND deleted_at IS NOT NULL",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
