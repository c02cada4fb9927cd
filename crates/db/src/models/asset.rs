//! Fixed asset model and DTOs.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use stocktake_core::patch::Patch;
use stocktake_core::status::AssetStatus;
use stocktake_core::types::{DbId, Timestamp};
use stocktake_core::view::{CellValue, Column, ColumnKind, ListRecord};

/// An asset row from the `assets` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Asset {
    pub id: DbId,
    pub inventory_code: String,
    pub serial_number: Option<String>,
    pub product_name: String,
    pub description: Option<String>,
    pub status: String,
    pub current_section_id: Option<DbId>,
    pub current_location_id: Option<DbId>,
    pub purchase_date: Option<NaiveDate>,
    pub invoice_number: Option<String>,
    pub supplier_company_id: Option<DbId>,
    pub warranty_expiry_date: Option<NaiveDate>,
    pub deleted_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new asset.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateAsset {
    pub inventory_code: String,
    pub product_name: String,
    pub serial_number: Option<String>,
    pub description: Option<String>,
    /// Defaults to `in_storage` if omitted.
    pub status: Option<AssetStatus>,
    pub current_section_id: Option<DbId>,
    pub current_location_id: Option<DbId>,
    pub purchase_date: Option<NaiveDate>,
    pub invoice_number: Option<String>,
    pub supplier_company_id: Option<DbId>,
    pub warranty_expiry_date: Option<NaiveDate>,
}

/// DTO for updating an existing asset. Omitted fields are untouched;
/// the nullable ones are [`Patch`]es, so sending `null` clears them
/// (e.g. detaching the supplier). The current section/location are
/// changed through movements, not here.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateAsset {
    pub inventory_code: Option<String>,
    pub product_name: Option<String>,
    pub status: Option<AssetStatus>,
    #[serde(default)]
    pub serial_number: Patch<String>,
    #[serde(default)]
    pub description: Patch<String>,
    #[serde(default)]
    pub purchase_date: Patch<NaiveDate>,
    #[serde(default)]
    pub invoice_number: Patch<String>,
    #[serde(default)]
    pub supplier_company_id: Patch<DbId>,
    #[serde(default)]
    pub warranty_expiry_date: Patch<NaiveDate>,
}

/// An asset joined with place and supplier names, as listed and exported.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AssetRow {
    pub id: DbId,
    pub inventory_code: String,
    pub product_name: String,
    pub serial_number: Option<String>,
    pub description: Option<String>,
    pub status: String,
    pub section_name: Option<String>,
    pub location_name: Option<String>,
    pub supplier_name: Option<String>,
    pub purchase_date: Option<NaiveDate>,
    pub invoice_number: Option<String>,
    pub warranty_expiry_date: Option<NaiveDate>,
}

impl AssetRow {
    /// Status display label; falls back to the raw key for values the
    /// enum does not know (cannot happen with the CHECK in place).
    fn status_label(&self) -> String {
        AssetStatus::from_str(&self.status)
            .map(|s| s.label().to_string())
            .unwrap_or_else(|| self.status.clone())
    }
}

impl ListRecord for AssetRow {
    fn columns() -> &'static [Column] {
        // Keys line up with `stocktake_core::import::ASSET_COLUMNS` so
        // an exported file re-imports unchanged.
        const COLS: &[Column] = &[
            Column { key: "inventory_code", label: "Inventory Code", kind: ColumnKind::Text },
            Column { key: "product_name", label: "Product", kind: ColumnKind::Text },
            Column { key: "serial_number", label: "Serial Number", kind: ColumnKind::Text },
            Column { key: "description", label: "Description", kind: ColumnKind::Text },
            Column { key: "status", label: "Status", kind: ColumnKind::Text },
            Column { key: "section", label: "Section", kind: ColumnKind::Text },
            Column { key: "location", label: "Location", kind: ColumnKind::Text },
            Column { key: "supplier", label: "Supplier", kind: ColumnKind::Text },
            Column { key: "purchase_date", label: "Purchase Date", kind: ColumnKind::Date },
            Column { key: "invoice_number", label: "Invoice Number", kind: ColumnKind::Text },
            Column { key: "warranty_expiry_date", label: "Warranty Expiry", kind: ColumnKind::Date },
        ];
        COLS
    }

    fn cell(&self, key: &str) -> CellValue {
        let text = |v: &Option<String>| {
            v.as_ref()
                .map(|s| CellValue::Text(s.clone()))
                .unwrap_or(CellValue::Missing)
        };
        let date = |v: &Option<NaiveDate>| v.map(CellValue::Date).unwrap_or(CellValue::Missing);
        match key {
            "inventory_code" => CellValue::Text(self.inventory_code.clone()),
            "product_name" => CellValue::Text(self.product_name.clone()),
            "serial_number" => text(&self.serial_number),
            "description" => text(&self.description),
            "status" => CellValue::Text(self.status_label()),
            "section" => text(&self.section_name),
            "location" => text(&self.location_name),
            "supplier" => text(&self.supplier_name),
            "purchase_date" => date(&self.purchase_date),
            "invoice_number" => text(&self.invoice_number),
            "warranty_expiry_date" => date(&self.warranty_expiry_date),
            _ => CellValue::Missing,
        }
    }

    fn status_column() -> Option<&'static str> {
        Some("status")
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn row() -> AssetRow {
        AssetRow {
            id: 1,
            inventory_code: "INV-0001".to_string(),
            product_name: "Latitude 5440".to_string(),
            serial_number: None,
            description: None,
            status: "under_repair".to_string(),
            section_name: Some("IT".to_string()),
            location_name: None,
            supplier_name: None,
            purchase_date: NaiveDate::from_ymd_opt(2024, 3, 15),
            invoice_number: None,
            warranty_expiry_date: None,
        }
    }

    #[test]
    fn status_cell_shows_the_human_label() {
        assert_eq!(
            row().cell("status"),
            CellValue::Text("Under Repair".to_string())
        );
    }

    #[test]
    fn date_cells_carry_dates_and_blanks_are_missing() {
        let r = row();
        assert_eq!(
            r.cell("purchase_date"),
            CellValue::Date(NaiveDate::from_ymd_opt(2024, 3, 15).unwrap())
        );
        assert_eq!(r.cell("warranty_expiry_date"), CellValue::Missing);
        assert_eq!(r.cell("serial_number"), CellValue::Missing);
    }

    #[test]
    fn update_form_tells_cleared_from_untouched() {
        let upd: UpdateAsset =
            serde_json::from_str(r#"{"supplier_company_id": null, "product_name": "X1"}"#)
                .unwrap();
        assert_eq!(upd.supplier_company_id, Patch::Clear);
        assert_eq!(upd.warranty_expiry_date, Patch::Keep);
        assert_eq!(upd.product_name.as_deref(), Some("X1"));

        let upd: UpdateAsset = serde_json::from_str(r#"{"supplier_company_id": 3}"#).unwrap();
        assert_eq!(upd.supplier_company_id, Patch::Set(3));
    }

    #[test]
    fn list_columns_cover_the_import_columns() {
        // Everything the importer understands (minus the legacy notes
        // shim) must appear in exports, so round-trips lose nothing.
        let export_keys: Vec<&str> = AssetRow::columns().iter().map(|c| c.key).collect();
        for col in stocktake_core::import::ASSET_COLUMNS {
            if col.key == "movement_notes" {
                continue;
            }
            assert!(
                export_keys.contains(&col.key),
                "import column {} missing from the list view",
                col.key
            );
        }
    }
}
