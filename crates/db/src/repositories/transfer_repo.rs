//! Repository for the `asset_transfers` table.

use chrono::NaiveDate;
use sqlx::PgPool;
use stocktake_core::types::DbId;

use crate::models::transfer::{AssetTransfer, CreateTransfer, TransferRow};

const COLUMNS: &str = "id, asset_id, movement, from_section_id, from_location_id, \
     to_section_id, to_location_id, authorized_by, received_by, transfer_date, \
     received_date, notes, created_at";

/// Provides movement-history operations for assets.
pub struct TransferRepo;

impl TransferRepo {
    /// Record a movement and relocate the asset, atomically.
    ///
    /// The `from` side is read from the asset row under a row lock, the
    /// transfer is inserted, and the asset's current section/location
    /// are updated, all in one transaction. Returns `None` if the asset
    /// does not exist or is soft-deleted (nothing is written).
    pub async fn create(
        pool: &PgPool,
        asset_id: DbId,
        input: &CreateTransfer,
        authorized_by: DbId,
        transfer_date: NaiveDate,
    ) -> Result<Option<AssetTransfer>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let current: Option<(Option<DbId>, Option<DbId>)> = sqlx::query_as(
            "SELECT current_section_id, current_location_id FROM assets \
             WHERE id = $1 AND deleted_at IS NULL FOR UPDATE",
        )
        .bind(asset_id)
        .fetch_optional(&mut *tx)
        .await?;
        let Some((from_section_id, from_location_id)) = current else {
            return Ok(None);
        };

        let insert_query = format!(
            "INSERT INTO asset_transfers (asset_id, movement, from_section_id, \
                from_location_id, to_section_id, to_location_id, authorized_by, \
                transfer_date, notes) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             RETURNING {COLUMNS}"
        );
        let transfer = sqlx::query_as::<_, AssetTransfer>(&insert_query)
            .bind(asset_id)
            .bind(input.movement.as_str())
            .bind(from_section_id)
            .bind(from_location_id)
            .bind(input.to_section_id)
            .bind(input.to_location_id)
            .bind(authorized_by)
            .bind(transfer_date)
            .bind(&input.notes)
            .fetch_one(&mut *tx)
            .await?;

        sqlx::query(
            "UPDATE assets SET current_section_id = $2, current_location_id = $3, \
                updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(asset_id)
        .bind(input.to_section_id)
        .bind(input.to_location_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(Some(transfer))
    }

    /// Find one transfer belonging to the given asset.
    pub async fn find_by_id(
        pool: &PgPool,
        asset_id: DbId,
        id: DbId,
    ) -> Result<Option<AssetTransfer>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM asset_transfers WHERE id = $1 AND asset_id = $2");
        sqlx::query_as::<_, AssetTransfer>(&query)
            .bind(id)
            .bind(asset_id)
            .fetch_optional(pool)
            .await
    }

    /// Fetch an asset's full movement history as joined rows, newest
    /// first. Filtering and export slicing happen in core.
    pub async fn list_rows_for_asset(
        pool: &PgPool,
        asset_id: DbId,
    ) -> Result<Vec<TransferRow>, sqlx::Error> {
        sqlx::query_as::<_, TransferRow>(
            "SELECT t.id, t.movement, fs.name AS from_section, fl.name AS from_location, \
                ts.name AS to_section, tl.name AS to_location, \
                au.full_name AS authorized_by_name, ru.full_name AS received_by_name, \
                t.transfer_date, t.received_date, t.notes \
             FROM asset_transfers t \
             LEFT JOIN sections fs ON fs.id = t.from_section_id \
             LEFT JOIN locations fl ON fl.id = t.from_location_id \
             JOIN sections ts ON ts.id = t.to_section_id \
             LEFT JOIN locations tl ON tl.id = t.to_location_id \
             JOIN users au ON au.id = t.authorized_by \
             LEFT JOIN users ru ON ru.id = t.received_by \
             WHERE t.asset_id = $1 \
             ORDER BY t.transfer_date DESC, t.id DESC",
        )
        .bind(asset_id)
        .fetch_all(pool)
        .await
    }

    /// Fill in the receipt fields of a pending transfer. Returns `None`
    /// if the transfer does not exist or was already received; transfers
    /// are otherwise immutable.
    pub async fn receive(
        pool: &PgPool,
        asset_id: DbId,
        id: DbId,
        received_by: DbId,
        received_date: NaiveDate,
    ) -> Result<Option<AssetTransfer>, sqlx::Error> {
        let query = format!(
            "UPDATE asset_transfers SET received_by = $3, received_date = $4 \
             WHERE id = $1 AND asset_id = $2 AND received_date IS NULL \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, AssetTransfer>(&query)
            .bind(id)
            .bind(asset_id)
            .bind(received_by)
            .bind(received_date)
            .fetch_optional(pool)
            .await
    }
}
