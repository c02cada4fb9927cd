//! Repository for the `software_licenses` table.

use sqlx::PgPool;
use stocktake_core::types::DbId;

use crate::models::license::{CreateLicense, License, LicenseJoinRow, UpdateLicense};

const COLUMNS: &str = "id, software_name, version, license_key, license_type, seats, \
     purchase_date, expiry_date, asset_id, assigned_user_id, supplier_company_id, \
     deleted_at, created_at, updated_at";

/// Provides CRUD operations for software licenses.
pub struct LicenseRepo;

impl LicenseRepo {
    /// Insert a new license, returning the created row.
    ///
    /// Seats default to 1. The `uq_licenses_license_key` partial index
    /// backstops the handler's uniqueness pre-check.
    pub async fn create(pool: &PgPool, input: &CreateLicense) -> Result<License, sqlx::Error> {
        let query = format!(
            "INSERT INTO software_licenses (software_name, version, license_key, \
                license_type, seats, purchase_date, expiry_date, asset_id, \
                assigned_user_id, supplier_company_id) \
             VALUES ($1, $2, $3, $4, COALESCE($5, 1), $6, $7, $8, $9, $10) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, License>(&query)
            .bind(&input.software_name)
            .bind(&input.version)
            .bind(&input.license_key)
            .bind(input.license_type.as_str())
            .bind(input.seats)
            .bind(input.purchase_date)
            .bind(input.expiry_date)
            .bind(input.asset_id)
            .bind(input.assigned_user_id)
            .bind(input.supplier_company_id)
            .fetch_one(pool)
            .await
    }

    /// Find a license by its internal ID. Excludes soft-deleted rows.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<License>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM software_licenses WHERE id = $1 AND deleted_at IS NULL"
        );
        sqlx::query_as::<_, License>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a license by ID, including soft-deleted rows. Audit access.
    pub async fn find_by_id_include_deleted(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<License>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM software_licenses WHERE id = $1");
        sqlx::query_as::<_, License>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a license by key. Excludes soft-deleted rows, so the key of
    /// a retired license can be registered again.
    pub async fn find_by_key(pool: &PgPool, key: &str) -> Result<Option<License>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM software_licenses WHERE license_key = $1 AND deleted_at IS NULL"
        );
        sqlx::query_as::<_, License>(&query)
            .bind(key)
            .fetch_optional(pool)
            .await
    }

    /// Fetch all non-deleted licenses as joined rows. Status derivation,
    /// filtering, and paging happen above this layer.
    pub async fn list_join_rows(pool: &PgPool) -> Result<Vec<LicenseJoinRow>, sqlx::Error> {
        sqlx::query_as::<_, LicenseJoinRow>(
            "SELECT sl.id, sl.software_name, sl.version, sl.license_key, sl.license_type, \
                sl.seats, sl.purchase_date, sl.expiry_date, c.name AS supplier_name, \
                u.email AS assigned_email, a.inventory_code, sl.deleted_at \
             FROM software_licenses sl \
             LEFT JOIN companies c ON c.id = sl.supplier_company_id \
             LEFT JOIN users u ON u.id = sl.assigned_user_id \
             LEFT JOIN assets a ON a.id = sl.asset_id \
             WHERE sl.deleted_at IS NULL \
             ORDER BY sl.software_name, sl.id",
        )
        .fetch_all(pool)
        .await
    }

    /// Update a license. Omitted fields keep their stored value; the
    /// nullable `Patch` fields can also be cleared to NULL, which for
    /// `expiry_date` turns the license Perpetual.
    ///
    /// Returns `None` if no live row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateLicense,
    ) -> Result<Option<License>, sqlx::Error> {
        // Patch fields bind a touched flag plus the target value, so a
        // NULL value is applied rather than swallowed by COALESCE.
        let query = format!(
            "UPDATE software_licenses SET \
                software_name = COALESCE($2, software_name), \
                license_key = COALESCE($3, license_key), \
                license_type = COALESCE($4, license_type), \
                seats = COALESCE($5, seats), \
                version = CASE WHEN $6 THEN $7 ELSE version END, \
                purchase_date = CASE WHEN $8 THEN $9 ELSE purchase_date END, \
                expiry_date = CASE WHEN $10 THEN $11 ELSE expiry_date END, \
                asset_id = CASE WHEN $12 THEN $13 ELSE asset_id END, \
                assigned_user_id = CASE WHEN $14 THEN $15 ELSE assigned_user_id END, \
                supplier_company_id = CASE WHEN $16 THEN $17 ELSE supplier_company_id END, \
                updated_at = NOW() \
             WHERE id = $1 AND deleted_at IS NULL \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, License>(&query)
            .bind(id)
            .bind(&input.software_name)
            .bind(&input.license_key)
            .bind(input.license_type.map(|t| t.as_str()))
            .bind(input.seats)
            .bind(input.version.is_touched())
            .bind(input.version.to_column().map(String::as_str))
            .bind(input.purchase_date.is_touched())
            .bind(input.purchase_date.to_column().copied())
            .bind(input.expiry_date.is_touched())
            .bind(input.expiry_date.to_column().copied())
            .bind(input.asset_id.is_touched())
            .bind(input.asset_id.to_column().copied())
            .bind(input.assigned_user_id.is_touched())
            .bind(input.assigned_user_id.to_column().copied())
            .bind(input.supplier_company_id.is_touched())
            .bind(input.supplier_company_id.to_column().copied())
            .fetch_optional(pool)
            .await
    }

    /// Soft-delete a license by ID. Returns `true` if a row was marked.
    pub async fn soft_delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE software_licenses SET deleted_at = NOW() \
             WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Restore a soft-deleted license. Returns `true` if a row was restored.
    pub async fn restore(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE software_licenses SET deleted_at = NULL \
             WHERE id = $1 AND deleted_at IS NOT NULL",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
