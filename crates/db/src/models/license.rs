//! Software license models and DTOs.
//!
//! A license's display status (Active, Expiring Soon, Expired,
//! Perpetual, Deleted) is never stored. [`LicenseRow::derive`] stamps it
//! onto the list row by calling the one status function in
//! `stocktake_core`, the same call the detail endpoint makes.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use stocktake_core::patch::Patch;
use stocktake_core::status::{license_status, LicenseType};
use stocktake_core::types::{DbId, Timestamp};
use stocktake_core::view::{CellValue, Column, ColumnKind, ListRecord};

/// A license row from the `software_licenses` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct License {
    pub id: DbId,
    pub software_name: String,
    pub version: Option<String>,
    pub license_key: String,
    pub license_type: String,
    pub seats: i32,
    pub purchase_date: Option<NaiveDate>,
    pub expiry_date: Option<NaiveDate>,
    pub asset_id: Option<DbId>,
    pub assigned_user_id: Option<DbId>,
    pub supplier_company_id: Option<DbId>,
    pub deleted_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new license.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateLicense {
    pub software_name: String,
    pub license_key: String,
    pub license_type: LicenseType,
    pub version: Option<String>,
    /// Defaults to 1 if omitted.
    pub seats: Option<i32>,
    pub purchase_date: Option<NaiveDate>,
    pub expiry_date: Option<NaiveDate>,
    pub asset_id: Option<DbId>,
    pub assigned_user_id: Option<DbId>,
    pub supplier_company_id: Option<DbId>,
}

/// DTO for updating an existing license. Omitted fields are untouched.
/// The nullable fields are [`Patch`]es, so sending `null` clears them;
/// clearing `expiry_date` in particular makes the license Perpetual.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateLicense {
    pub software_name: Option<String>,
    pub license_key: Option<String>,
    pub license_type: Option<LicenseType>,
    pub seats: Option<i32>,
    #[serde(default)]
    pub version: Patch<String>,
    #[serde(default)]
    pub purchase_date: Patch<NaiveDate>,
    #[serde(default)]
    pub expiry_date: Patch<NaiveDate>,
    #[serde(default)]
    pub asset_id: Patch<DbId>,
    #[serde(default)]
    pub assigned_user_id: Patch<DbId>,
    #[serde(default)]
    pub supplier_company_id: Patch<DbId>,
}

/// A license joined with supplier, assignee, and asset natural keys,
/// before status derivation.
#[derive(Debug, Clone, FromRow)]
pub struct LicenseJoinRow {
    pub id: DbId,
    pub software_name: String,
    pub version: Option<String>,
    pub license_key: String,
    pub license_type: String,
    pub seats: i32,
    pub purchase_date: Option<NaiveDate>,
    pub expiry_date: Option<NaiveDate>,
    pub supplier_name: Option<String>,
    pub assigned_email: Option<String>,
    pub inventory_code: Option<String>,
    pub deleted_at: Option<Timestamp>,
}

/// The listed/exported license shape with its derived status stamped on.
#[derive(Debug, Clone, Serialize)]
pub struct LicenseRow {
    pub id: DbId,
    pub software_name: String,
    pub version: Option<String>,
    pub license_key: String,
    pub license_type: String,
    pub seats: i32,
    pub purchase_date: Option<NaiveDate>,
    pub expiry_date: Option<NaiveDate>,
    pub supplier_name: Option<String>,
    pub assigned_email: Option<String>,
    pub inventory_code: Option<String>,
    /// Derived display label, e.g. `"Expiring Soon"`.
    pub status: &'static str,
}

impl LicenseRow {
    /// Stamp the derived status for `today` onto a joined row.
    pub fn derive(row: LicenseJoinRow, today: NaiveDate, window_days: i64) -> Self {
        let status = license_status(
            row.expiry_date,
            row.deleted_at.is_some(),
            today,
            window_days,
        );
        Self {
            id: row.id,
            software_name: row.software_name,
            version: row.version,
            license_key: row.license_key,
            license_type: row.license_type,
            seats: row.seats,
            purchase_date: row.purchase_date,
            expiry_date: row.expiry_date,
            supplier_name: row.supplier_name,
            assigned_email: row.assigned_email,
            inventory_code: row.inventory_code,
            status: status.label,
        }
    }

    fn type_label(&self) -> String {
        LicenseType::from_str(&self.license_type)
            .map(|t| t.label().to_string())
            .unwrap_or_else(|| self.license_type.clone())
    }
}

impl ListRecord for LicenseRow {
    fn columns() -> &'static [Column] {
        // Keys line up with `stocktake_core::import::LICENSE_COLUMNS` so
        // an exported file re-imports unchanged; "status" is derived and
        // ignored by the importer.
        const COLS: &[Column] = &[
            Column { key: "software_name", label: "Software", kind: ColumnKind::Text },
            Column { key: "version", label: "Version", kind: ColumnKind::Text },
            Column { key: "license_key", label: "License Key", kind: ColumnKind::Text },
            Column { key: "license_type", label: "Type", kind: ColumnKind::Text },
            Column { key: "status", label: "Status", kind: ColumnKind::Text },
            Column { key: "seats", label: "Seats", kind: ColumnKind::Integer },
            Column { key: "purchase_date", label: "Purchase Date", kind: ColumnKind::Date },
            Column { key: "expiry_date", label: "Expiry Date", kind: ColumnKind::Date },
            Column { key: "supplier", label: "Supplier", kind: ColumnKind::Text },
            Column { key: "assigned_email", label: "Assigned To", kind: ColumnKind::Text },
            Column { key: "inventory_code", label: "Installed On", kind: ColumnKind::Text },
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
            "software_name" => CellValue::Text(self.software_name.clone()),
            "version" => text(&self.version),
            "license_key" => CellValue::Text(self.license_key.clone()),
            "license_type" => CellValue::Text(self.type_label()),
            "status" => CellValue::Text(self.status.to_string()),
            "seats" => CellValue::Integer(self.seats as i64),
            "purchase_date" => date(&self.purchase_date),
            "expiry_date" => date(&self.expiry_date),
            "supplier" => text(&self.supplier_name),
            "assigned_email" => text(&self.assigned_email),
            "inventory_code" => text(&self.inventory_code),
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

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn join_row(expiry: Option<NaiveDate>) -> LicenseJoinRow {
        LicenseJoinRow {
            id: 1,
            software_name: "AutoCAD".to_string(),
            version: Some("2024".to_string()),
            license_key: "AC-1234".to_string(),
            license_type: "subscription".to_string(),
            seats: 5,
            purchase_date: None,
            expiry_date: expiry,
            supplier_name: None,
            assigned_email: None,
            inventory_code: None,
            deleted_at: None,
        }
    }

    #[test]
    fn derive_stamps_the_status_for_the_given_day() {
        let today = date(2024, 6, 1);
        let row = LicenseRow::derive(join_row(Some(date(2024, 6, 20))), today, 30);
        assert_eq!(row.status, "Expiring Soon");
        let row = LicenseRow::derive(join_row(None), today, 30);
        assert_eq!(row.status, "Perpetual");
    }

    #[test]
    fn type_and_status_cells_show_labels() {
        let row = LicenseRow::derive(join_row(None), date(2024, 6, 1), 30);
        assert_eq!(row.cell("license_type"), CellValue::Text("Subscription".to_string()));
        assert_eq!(row.cell("status"), CellValue::Text("Perpetual".to_string()));
        assert_eq!(row.cell("seats"), CellValue::Integer(5));
    }

    #[test]
    fn update_form_tells_cleared_from_untouched() {
        // `"expiry_date": null` clears the date (making the license
        // Perpetual); leaving it out keeps the stored one.
        let upd: UpdateLicense =
            serde_json::from_str(r#"{"expiry_date": null, "seats": 10}"#).unwrap();
        assert_eq!(upd.expiry_date, Patch::Clear);
        assert_eq!(upd.supplier_company_id, Patch::Keep);
        assert_eq!(upd.seats, Some(10));

        let upd: UpdateLicense =
            serde_json::from_str(r#"{"expiry_date": "2025-01-31"}"#).unwrap();
        assert_eq!(upd.expiry_date, Patch::Set(date(2025, 1, 31)));
    }

    #[test]
    fn list_columns_cover_the_import_columns() {
        let export_keys: Vec<&str> = LicenseRow::columns().iter().map(|c| c.key).collect();
        for col in stocktake_core::import::LICENSE_COLUMNS {
            assert!(
                export_keys.contains(&col.key),
                "import column {} missing from the list view",
                col.key
            );
        }
    }
}
