//! Repository for the `assets` table.

use sqlx::PgPool;
use stocktake_core::types::DbId;

use crate::models::asset::{Asset, AssetRow, CreateAsset, UpdateAsset};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, inventory_code, serial_number, product_name, description, status, \
     current_section_id, current_location_id, purchase_date, invoice_number, \
     supplier_company_id, warranty_expiry_date, deleted_at, created_at, updated_at";

/// Join used by list views and exports: place and supplier names
/// resolved, soft-deleted assets excluded.
const ROW_SELECT: &str = "SELECT a.id, a.inventory_code, a.product_name, a.serial_number, \
            a.description, a.status, s.name AS section_name, l.name AS location_name, \
            c.name AS supplier_name, a.purchase_date, a.invoice_number, a.warranty_expiry_date \
     FROM assets a \
     LEFT JOIN sections s ON s.id = a.current_section_id \
     LEFT JOIN locations l ON l.id = a.current_location_id \
     LEFT JOIN companies c ON c.id = a.supplier_company_id \
     WHERE a.deleted_at IS NULL \
     ORDER BY a.inventory_code";

/// Provides CRUD operations for fixed assets.
pub struct AssetRepo;

impl AssetRepo {
    /// Insert a new asset, returning the created row.
    ///
    /// Status defaults to `in_storage`. The `uq_assets_inventory_code`
    /// partial index backstops the handler's uniqueness pre-check.
    pub async fn create(pool: &PgPool, input: &CreateAsset) -> Result<Asset, sqlx::Error> {
        let query = format!(
            "INSERT INTO assets (inventory_code, serial_number, product_name, description, \
                status, current_section_id, current_location_id, purchase_date, \
                invoice_number, supplier_company_id, warranty_expiry_date) \
             VALUES ($1, $2, $3, $4, COALESCE($5, 'in_storage'), $6, $7, $8, $9, $10, $11) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Asset>(&query)
            .bind(&input.inventory_code)
            .bind(&input.serial_number)
            .bind(&input.product_name)
            .bind(&input.description)
            .bind(input.status.map(|s| s.as_str()))
            .bind(input.current_section_id)
            .bind(input.current_location_id)
            .bind(input.purchase_date)
            .bind(&input.invoice_number)
            .bind(input.supplier_company_id)
            .bind(input.warranty_expiry_date)
            .fetch_one(pool)
            .await
    }

    /// Find an asset by its internal ID. Excludes soft-deleted rows.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Asset>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM assets WHERE id = $1 AND deleted_at IS NULL");
        sqlx::query_as::<_, Asset>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find an asset by ID, including soft-deleted rows. Audit access.
    pub async fn find_by_id_include_deleted(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<Asset>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM assets WHERE id = $1");
        sqlx::query_as::<_, Asset>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find an asset by inventory code. Excludes soft-deleted rows, so a
    /// retired code can be reused by a new asset.
    pub async fn find_by_inventory_code(
        pool: &PgPool,
        code: &str,
    ) -> Result<Option<Asset>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM assets WHERE inventory_code = $1 AND deleted_at IS NULL"
        );
        sqlx::query_as::<_, Asset>(&query)
            .bind(code)
            .fetch_optional(pool)
            .await
    }

    /// Fetch all non-deleted assets as joined list rows. Filtering,
    /// sorting, and paging happen in `stocktake_core::view`.
    pub async fn list_rows(pool: &PgPool) -> Result<Vec<AssetRow>, sqlx::Error> {
        sqlx::query_as::<_, AssetRow>(ROW_SELECT)
            .fetch_all(pool)
            .await
    }

    /// Update an asset. Omitted fields keep their stored value; the
    /// nullable `Patch` fields can also be cleared to NULL. The current
    /// place changes through transfers, never here.
    ///
    /// Returns `None` if no live row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateAsset,
    ) -> Result<Option<Asset>, sqlx::Error> {
        // Patch fields bind a touched flag plus the target value, so a
        // NULL value is applied rather than swallowed by COALESCE.
        let query = format!(
            "UPDATE assets SET \
                inventory_code = COALESCE($2, inventory_code), \
                product_name = COALESCE($3, product_name), \
                status = COALESCE($4, status), \
                serial_number = CASE WHEN $5 THEN $6 ELSE serial_number END, \
                description = CASE WHEN $7 THEN $8 ELSE description END, \
                purchase_date = CASE WHEN $9 THEN $10 ELSE purchase_date END, \
                invoice_number = CASE WHEN $11 THEN $12 ELSE invoice_number END, \
                supplier_company_id = CASE WHEN $13 THEN $14 ELSE supplier_company_id END, \
                warranty_expiry_date = CASE WHEN $15 THEN $16 ELSE warranty_expiry_date END, \
                updated_at = NOW() \
             WHERE id = $1 AND deleted_at IS NULL \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Asset>(&query)
            .bind(id)
            .bind(&input.inventory_code)
            .bind(&input.product_name)
            .bind(input.status.map(|s| s.as_str()))
            .bind(input.serial_number.is_touched())
            .bind(input.serial_number.to_column().map(String::as_str))
            .bind(input.description.is_touched())
            .bind(input.description.to_column().map(String::as_str))
            .bind(input.purchase_date.is_touched())
            .bind(input.purchase_date.to_column().copied())
            .bind(input.invoice_number.is_touched())
            .bind(input.invoice_number.to_column().map(String::as_str))
            .bind(input.supplier_company_id.is_touched())
            .bind(input.supplier_company_id.to_column().copied())
            .bind(input.warranty_expiry_date.is_touched())
            .bind(input.warranty_expiry_date.to_column().copied())
            .fetch_optional(pool)
            .await
    }

    /// Soft-delete an asset by ID. Returns `true` if a row was marked.
    pub async fn soft_delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE assets SET deleted_at = NOW() WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Restore a soft-deleted asset. Returns `true` if a row was restored.
    ///
    /// Restoring can collide with a live asset that took over the same
    /// inventory code; the `uq_` index turns that into a conflict.
    pub async fn restore(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE assets SET deleted_at = NULL WHERE id = $1 AND deleted_at IS NOT NULL",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
