//! Asset transfer (movement) models and DTOs.
//!
//! Transfers are append-only: once created, only the receipt fields
//! (`received_by`, `received_date`) may change. The movement kind is a
//! first-class column; see `stocktake_core::movement` for the legacy
//! notes shim the importer uses.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use stocktake_core::movement::MovementKind;
use stocktake_core::types::{DbId, Timestamp};
use stocktake_core::view::{CellValue, Column, ColumnKind, ListRecord};

/// A transfer row from the `asset_transfers` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AssetTransfer {
    pub id: DbId,
    pub asset_id: DbId,
    pub movement: String,
    pub from_section_id: Option<DbId>,
    pub from_location_id: Option<DbId>,
    pub to_section_id: DbId,
    pub to_location_id: Option<DbId>,
    pub authorized_by: DbId,
    pub received_by: Option<DbId>,
    pub transfer_date: NaiveDate,
    pub received_date: Option<NaiveDate>,
    pub notes: Option<String>,
    pub created_at: Timestamp,
}

/// DTO for recording a movement. The `from` side is taken from the
/// asset's current place, not from the caller.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTransfer {
    pub movement: MovementKind,
    pub to_section_id: DbId,
    pub to_location_id: Option<DbId>,
    /// Defaults to today (UTC) if omitted.
    pub transfer_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

/// DTO for confirming receipt of a movement.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReceiveTransfer {
    /// Defaults to today (UTC) if omitted.
    pub received_date: Option<NaiveDate>,
}

/// A transfer joined with place and user names, as shown in an asset's
/// movement history and its exports.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TransferRow {
    pub id: DbId,
    pub movement: String,
    pub from_section: Option<String>,
    pub from_location: Option<String>,
    pub to_section: String,
    pub to_location: Option<String>,
    pub authorized_by_name: String,
    pub received_by_name: Option<String>,
    pub transfer_date: NaiveDate,
    pub received_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

impl TransferRow {
    fn movement_label(&self) -> String {
        MovementKind::from_str(&self.movement)
            .map(|k| k.label().to_string())
            .unwrap_or_else(|| self.movement.clone())
    }
}

impl ListRecord for TransferRow {
    fn columns() -> &'static [Column] {
        const COLS: &[Column] = &[
            Column { key: "movement", label: "Movement", kind: ColumnKind::Text },
            Column { key: "from_section", label: "From Section", kind: ColumnKind::Text },
            Column { key: "from_location", label: "From Location", kind: ColumnKind::Text },
            Column { key: "to_section", label: "To Section", kind: ColumnKind::Text },
            Column { key: "to_location", label: "To Location", kind: ColumnKind::Text },
            Column { key: "authorized_by", label: "Authorized By", kind: ColumnKind::Text },
            Column { key: "received_by", label: "Received By", kind: ColumnKind::Text },
            Column { key: "transfer_date", label: "Transfer Date", kind: ColumnKind::Date },
            Column { key: "received_date", label: "Received Date", kind: ColumnKind::Date },
            Column { key: "notes", label: "Notes", kind: ColumnKind::Text },
        ];
        COLS
    }

    fn cell(&self, key: &str) -> CellValue {
        let text = |v: &Option<String>| {
            v.as_ref()
                .map(|s| CellValue::Text(s.clone()))
                .unwrap_or(CellValue::Missing)
        };
        match key {
            "movement" => CellValue::Text(self.movement_label()),
            "from_section" => text(&self.from_section),
            "from_location" => text(&self.from_location),
            "to_section" => CellValue::Text(self.to_section.clone()),
            "to_location" => text(&self.to_location),
            "authorized_by" => CellValue::Text(self.authorized_by_name.clone()),
            "received_by" => text(&self.received_by_name),
            "transfer_date" => CellValue::Date(self.transfer_date),
            "received_date" => self
                .received_date
                .map(CellValue::Date)
                .unwrap_or(CellValue::Missing),
            "notes" => text(&self.notes),
            _ => CellValue::Missing,
        }
    }

    /// The movement kind doubles as the multi-select facet for history
    /// screens ("show repairs and disposals only").
    fn status_column() -> Option<&'static str> {
        Some("movement")
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn movement_cell_shows_the_label() {
        let row = TransferRow {
            id: 1,
            movement: "under_repair".to_string(),
            from_section: None,
            from_location: None,
            to_section: "Workshop".to_string(),
            to_location: None,
            authorized_by_name: "Ana Ruiz".to_string(),
            received_by_name: None,
            transfer_date: NaiveDate::from_ymd_opt(2024, 4, 2).unwrap(),
            received_date: None,
            notes: None,
        };
        // Unknown keys fall back to the raw value instead of panicking.
        assert_eq!(row.cell("movement"), CellValue::Text("under_repair".to_string()));

        let row = TransferRow { movement: "repair".to_string(), ..row };
        assert_eq!(row.cell("movement"), CellValue::Text("Repair".to_string()));
        assert_eq!(row.cell("received_date"), CellValue::Missing);
    }
}
